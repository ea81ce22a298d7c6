//! Synchronization envelopes carried by the room channel. These are
//! transient messages; the concrete wire encoding belongs to the transport.

use crate::{Direction, Food, Position, PowerUp, Rgb};
use serde::{Deserialize, Serialize};

/// The slice of a player the owning peer is authoritative for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: String,
    pub name: String,
    pub snake: Vec<Position>,
    pub direction: Direction,
    pub score: u32,
    pub color: Rgb,
    pub alive: bool,
}

/// Periodic full-state broadcast. `sequence` is strictly increasing per
/// sender; receivers drop anything at or below the last accepted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    pub sender_id: String,
    pub sequence: u64,
    pub players: Vec<PlayerSnapshot>,
    pub food: Vec<Food>,
    pub power_ups: Vec<PowerUp>,
    pub time_remaining: Option<f32>,
}

/// Discrete notifications that must not wait for the next state broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    DirectionChange {
        player_id: String,
        direction: Direction,
    },
    FoodCollected {
        player_id: String,
        food_id: String,
    },
    PowerUpCollected {
        player_id: String,
        power_up_id: String,
    },
    PlayerDied {
        player_id: String,
    },
    GameOver {
        winner_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    pub sender_id: String,
    pub event: GameEvent,
}
