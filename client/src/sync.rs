//! State-sync coordinator. Bridges one local simulation instance and the
//! room channel: periodic full-state broadcasts outbound, sequence-gated
//! reconciliation and a FIFO event queue inbound.
//!
//! Authority split: every peer owns its local player; the room host
//! additionally owns food, power-ups, and the match timer. Sync is
//! best-effort: a failed send is logged and forgotten, the next periodic
//! broadcast is the recovery mechanism.

use crate::channel::RoomChannel;
use engine::game::{SnakeGame, TickEvent};
use log::{debug, warn};
use shared::protocol::{EventMessage, GameEvent, PlayerSnapshot, StateMessage};
use shared::{Direction, SYNC_INTERVAL_MS};
use std::collections::{HashMap, VecDeque};

pub struct SyncCoordinator<C: RoomChannel> {
    channel: C,
    player_id: String,
    host_id: String,
    sequence: u64,
    last_accepted: HashMap<String, u64>,
    sync_accum_ms: f32,
    event_queue: VecDeque<EventMessage>,
}

impl<C: RoomChannel> SyncCoordinator<C> {
    pub fn new(channel: C, player_id: &str, host_id: &str) -> Self {
        Self {
            channel,
            player_id: player_id.to_string(),
            host_id: host_id.to_string(),
            sequence: 0,
            last_accepted: HashMap::new(),
            // The first tick broadcasts immediately so late joiners see the
            // host's initial world without waiting a full interval.
            sync_accum_ms: SYNC_INTERVAL_MS,
            event_queue: VecDeque::new(),
        }
    }

    pub fn is_host(&self) -> bool {
        self.player_id == self.host_id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// One network tick: drain everything the channel delivered, then
    /// broadcast local state if the sync interval elapsed.
    pub fn tick(&mut self, game: &mut SnakeGame, dt_ms: f32) {
        self.drain_incoming(game);

        self.sync_accum_ms += dt_ms;
        if self.sync_accum_ms >= SYNC_INTERVAL_MS {
            self.sync_accum_ms = 0.0;
            self.broadcast_state(game);
        }
    }

    /// Forwards this tick's local-player happenings as channel events, so
    /// remote peers learn about them ahead of the next state broadcast.
    pub fn publish_local_events(&mut self, events: &[TickEvent]) {
        for event in events {
            match event {
                TickEvent::FoodCollected { player_id, food_id } if player_id == &self.player_id => {
                    self.send_event(GameEvent::FoodCollected {
                        player_id: player_id.clone(),
                        food_id: food_id.clone(),
                    });
                }
                TickEvent::PowerUpCollected {
                    player_id,
                    power_up_id,
                } if player_id == &self.player_id => {
                    self.send_event(GameEvent::PowerUpCollected {
                        player_id: player_id.clone(),
                        power_up_id: power_up_id.clone(),
                    });
                }
                TickEvent::PlayerDied { player_id } if player_id == &self.player_id => {
                    self.send_event(GameEvent::PlayerDied {
                        player_id: player_id.clone(),
                    });
                }
                TickEvent::GameOver {
                    winner_id: Some(winner),
                } if self.is_host() => {
                    self.send_event(GameEvent::GameOver {
                        winner_id: winner.clone(),
                    });
                }
                _ => {}
            }
        }
    }

    pub fn send_direction_change(&mut self, direction: Direction) {
        self.send_event(GameEvent::DirectionChange {
            player_id: self.player_id.clone(),
            direction,
        });
    }

    fn send_event(&mut self, event: GameEvent) {
        let msg = EventMessage {
            sender_id: self.player_id.clone(),
            event,
        };
        if let Err(e) = self.channel.send_event(&msg) {
            warn!("Failed to send event: {}", e);
        }
    }

    fn drain_incoming(&mut self, game: &mut SnakeGame) {
        while let Some(msg) = self.channel.try_recv_state() {
            if msg.sender_id != self.player_id {
                self.apply_remote_state(game, msg);
            }
        }

        while let Some(msg) = self.channel.try_recv_event() {
            // Local events are never self-consumed.
            if msg.sender_id != self.player_id {
                self.event_queue.push_back(msg);
            }
        }
        self.process_event_queue(game);
    }

    /// Merges one remote state message. Stale or duplicated deliveries
    /// (sequence at or below the last accepted from that sender) are
    /// discarded; they are expected under unreliable delivery, not errors.
    fn apply_remote_state(&mut self, game: &mut SnakeGame, msg: StateMessage) {
        let last = self.last_accepted.get(&msg.sender_id).copied().unwrap_or(0);
        if msg.sequence <= last {
            debug!(
                "Discarding stale state from {} (seq {} <= {})",
                msg.sender_id, msg.sequence, last
            );
            return;
        }
        self.last_accepted.insert(msg.sender_id.clone(), msg.sequence);

        for snapshot in &msg.players {
            // The local player is always locally authoritative.
            if snapshot.id != self.player_id {
                game.apply_remote_player(snapshot);
            }
        }

        // Only the host's word counts for shared world entities.
        if msg.sender_id == self.host_id {
            game.set_food(msg.food);
            game.set_power_ups(msg.power_ups);
            if let Some(remaining) = msg.time_remaining {
                game.set_time_remaining(remaining);
            }
        }
    }

    fn process_event_queue(&mut self, game: &mut SnakeGame) {
        while let Some(msg) = self.event_queue.pop_front() {
            match msg.event {
                GameEvent::DirectionChange {
                    player_id,
                    direction,
                } => {
                    game.change_direction(&player_id, direction);
                }
                GameEvent::FoodCollected { food_id, .. } => {
                    // Fast path for the authoritative copy; guests wait for
                    // the host's next state broadcast instead.
                    if self.is_host() {
                        game.remove_food_by_id(&food_id);
                    }
                }
                GameEvent::PowerUpCollected { power_up_id, .. } => {
                    if self.is_host() {
                        game.remove_power_up_by_id(&power_up_id);
                    }
                }
                GameEvent::PlayerDied { player_id } => {
                    game.mark_dead(&player_id);
                }
                GameEvent::GameOver { winner_id } => {
                    game.force_game_over(&winner_id);
                }
            }
        }
    }

    fn broadcast_state(&mut self, game: &SnakeGame) {
        self.sequence += 1;

        let msg = StateMessage {
            sender_id: self.player_id.clone(),
            sequence: self.sequence,
            players: game
                .players()
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    snake: p.snake.clone(),
                    direction: p.direction,
                    score: p.score,
                    color: p.color,
                    alive: p.alive,
                })
                .collect(),
            food: game.food().to_vec(),
            power_ups: game.power_ups().to_vec(),
            time_remaining: game.time_remaining(),
        };

        if let Err(e) = self.channel.send_state(&msg) {
            warn!("Failed to sync state: {}", e);
        }
    }

    /// Leaves the room and clears all buffered remote bookkeeping.
    pub fn shutdown(&mut self) {
        self.channel.close();
        self.event_queue.clear();
        self.last_accepted.clear();
    }
}
