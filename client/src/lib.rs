//! # Game Client Library
//!
//! Everything that surrounds the simulation engine in a running peer: the
//! room transport abstraction, the state-sync coordinator, rendering, and
//! input mapping.
//!
//! ## Architecture Overview
//!
//! Every peer runs its own full simulation. Each peer is authoritative for
//! its local player; the room host is additionally authoritative for shared
//! world entities (food, power-ups, the match timer). The sync coordinator
//! keeps the independently stepping simulations convergent by broadcasting
//! local state on a fixed interval and reconciling whatever arrives, with
//! per-sender sequence numbers rejecting stale or duplicated deliveries.
//!
//! ## Module Organization
//!
//! ### Channel Module (`channel`)
//! The abstract room transport: a send/poll-receive trait pair for state
//! and event messages plus a room directory (create/join/status). Includes
//! an in-process loopback hub used by the netplay demo and the tests.
//!
//! ### Sync Module (`sync`)
//! The state-sync coordinator: outbound broadcast cadence, sequence
//! numbering, stale-update rejection, host-authority enforcement, and the
//! FIFO event queue for direction changes, pickups, deaths, and game over.
//!
//! ### Rendering Module (`rendering`)
//! Pure read of the simulation state onto a macroquad surface: board grid,
//! food, power-ups, snakes, and the score/timer overlay.
//!
//! ### Input Module (`input`)
//! Maps raw key presses to the four directions plus pause/reset, with
//! edge detection so a held key fires once.

pub mod channel;
pub mod input;
pub mod rendering;
pub mod sync;
