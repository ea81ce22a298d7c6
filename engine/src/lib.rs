//! # Snake Simulation Engine
//!
//! The authoritative per-peer game simulation. Every connected peer runs its
//! own instance of [`game::SnakeGame`]; each instance is the source of truth
//! for its local player and (on the host) for shared world entities, while
//! remote players are overwritten by the sync layer between ticks.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The discrete world simulation:
//! - Per-player variable-rate movement stepping
//! - Collision detection and power-up effects
//! - Food and power-up spawning with occupancy rejection
//! - Win-condition evaluation and match timing
//!
//! ### AI Module (`ai`)
//! Per-bot decision making:
//! - Manhattan-distance food seeking with a safety filter
//! - Bounded flood-fill survival fallback
//! - Difficulty-based reaction delay and simulated error
//!
//! The engine never blocks and never touches a network or a render surface;
//! it is driven entirely by `update(delta_ms)` calls from the frame loop and
//! reports what happened through returned [`game::TickEvent`]s.

pub mod ai;
pub mod game;
