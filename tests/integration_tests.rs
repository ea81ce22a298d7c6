//! Integration tests for the multiplayer snake stack
//!
//! These tests validate cross-component interactions: wire encoding, full
//! game setup scenarios, and two peers converging over a room channel.

use client::channel::{LoopbackHub, RoomChannel};
use client::sync::SyncCoordinator;
use engine::game::{PlayerSpec, SnakeGame, TickEvent};
use shared::protocol::{EventMessage, GameEvent, PlayerSnapshot, StateMessage};
use shared::{Direction, GameMode, GameStatus, Position, PLAYER_COLORS, SYNC_INTERVAL_MS};

fn pvp_pair(seed_a: u64, seed_b: u64) -> (SnakeGame, SnakeGame) {
    let roster = [
        ("host".to_string(), "Host".to_string()),
        ("guest".to_string(), "Guest".to_string()),
    ];
    let mut host = SnakeGame::with_seed(GameMode::Pvp, seed_a);
    host.init_multiplayer_game(&roster);
    let mut guest = SnakeGame::with_seed(GameMode::Pvp, seed_b);
    guest.init_multiplayer_game(&roster);
    (host, guest)
}

/// WIRE PROTOCOL TESTS
mod protocol_tests {
    use super::*;

    #[test]
    fn state_message_roundtrip() {
        let msg = StateMessage {
            sender_id: "host".to_string(),
            sequence: 17,
            players: vec![PlayerSnapshot {
                id: "host".to_string(),
                name: "Host".to_string(),
                snake: vec![Position::new(5, 5), Position::new(4, 5)],
                direction: Direction::Right,
                score: 30,
                color: PLAYER_COLORS[0],
                alive: true,
            }],
            food: Vec::new(),
            power_ups: Vec::new(),
            time_remaining: Some(42.5),
        };

        let bytes = bincode::serialize(&msg).unwrap();
        let decoded: StateMessage = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn event_message_roundtrip() {
        let events = vec![
            GameEvent::DirectionChange {
                player_id: "a".to_string(),
                direction: Direction::Up,
            },
            GameEvent::FoodCollected {
                player_id: "a".to_string(),
                food_id: "food-3".to_string(),
            },
            GameEvent::PlayerDied {
                player_id: "b".to_string(),
            },
            GameEvent::GameOver {
                winner_id: "a".to_string(),
            },
        ];

        for event in events {
            let msg = EventMessage {
                sender_id: "a".to_string(),
                event,
            };
            let bytes = bincode::serialize(&msg).unwrap();
            let decoded: EventMessage = bincode::deserialize(&bytes).unwrap();
            assert_eq!(decoded, msg);
        }
    }
}

/// GAME SETUP SCENARIOS
mod scenario_tests {
    use super::*;

    #[test]
    fn solo_game_setup() {
        let mut game = SnakeGame::with_seed(GameMode::Solo, 1);
        game.init_solo_game("p1", "Solo");

        assert_eq!(game.board().width, 30);
        assert_eq!(game.board().height, 25);
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.food().len(), 3);
        assert_eq!(game.time_remaining(), None);

        let player = game.player("p1").unwrap();
        assert_eq!(player.snake.len(), 4);
        assert_eq!(player.direction, Direction::Right);
        assert_eq!(player.head(), Position::new(15, 12));
    }

    #[test]
    fn pvp_game_setup() {
        let mut game = SnakeGame::with_seed(GameMode::Pvp, 1);
        game.init_pvp_game(&[
            PlayerSpec::human("p1", "One"),
            PlayerSpec::human("p2", "Two"),
        ]);

        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.food().len(), 5);
        assert_eq!(game.time_remaining(), Some(120.0));

        // Colors come from the fixed palette in join order.
        assert_eq!(game.players()[0].color, PLAYER_COLORS[0]);
        assert_eq!(game.players()[1].color, PLAYER_COLORS[1]);
        assert_ne!(game.players()[0].color, game.players()[1].color);
    }
}

/// TWO-PEER SYNC TESTS
mod sync_tests {
    use super::*;

    #[tokio::test]
    async fn guest_converges_to_host_world() {
        let hub = LoopbackHub::new();
        // Different seeds, so both start with different food layouts.
        let (mut host_game, mut guest_game) = pvp_pair(1, 2);
        assert_ne!(host_game.food(), guest_game.food());

        let mut host_sync = SyncCoordinator::new(hub.join("host"), "host", "host");
        let mut guest_sync = SyncCoordinator::new(hub.join("guest"), "guest", "host");

        // First host tick broadcasts immediately; guest applies on its tick.
        host_sync.tick(&mut host_game, 0.0);
        guest_sync.tick(&mut guest_game, 0.0);

        assert_eq!(guest_game.food(), host_game.food());
        assert_eq!(guest_game.time_remaining(), host_game.time_remaining());
    }

    #[tokio::test]
    async fn host_sees_guest_movement() {
        let hub = LoopbackHub::new();
        let (mut host_game, mut guest_game) = pvp_pair(1, 2);

        let mut host_sync = SyncCoordinator::new(hub.join("host"), "host", "host");
        let mut guest_sync = SyncCoordinator::new(hub.join("guest"), "guest", "host");

        // Guest advances its own player by one move locally.
        let before = guest_game.player("guest").unwrap().snake.clone();
        guest_game.update(100.0);
        let after = guest_game.player("guest").unwrap().snake.clone();
        assert_ne!(before, after);

        guest_sync.tick(&mut guest_game, SYNC_INTERVAL_MS);
        host_sync.tick(&mut host_game, 0.0);

        assert_eq!(host_game.player("guest").unwrap().snake, after);
        // The host's own player stays untouched by the guest broadcast.
        assert_eq!(host_game.player("host").unwrap().snake.len(), 3);
    }

    #[tokio::test]
    async fn direction_change_event_propagates() {
        let hub = LoopbackHub::new();
        let (mut host_game, _) = pvp_pair(1, 2);

        let mut host_sync = SyncCoordinator::new(hub.join("host"), "host", "host");
        let mut guest_sync = SyncCoordinator::new(hub.join("guest"), "guest", "host");

        guest_sync.send_direction_change(Direction::Up);
        host_sync.tick(&mut host_game, 0.0);

        assert_eq!(
            host_game.player("guest").unwrap().next_direction,
            Some(Direction::Up)
        );
    }

    #[tokio::test]
    async fn out_of_order_states_are_gated() {
        let hub = LoopbackHub::new();
        let (_, mut guest_game) = pvp_pair(1, 2);
        let mut guest_sync = SyncCoordinator::new(hub.join("guest"), "guest", "host");

        let mut sender = hub.join("relay");
        let snapshot_with_score = |score: u32| PlayerSnapshot {
            id: "host".to_string(),
            name: "Host".to_string(),
            snake: vec![Position::new(5, 12), Position::new(4, 12)],
            direction: Direction::Right,
            score,
            color: PLAYER_COLORS[0],
            alive: true,
        };

        let newer = StateMessage {
            sender_id: "host".to_string(),
            sequence: 5,
            players: vec![snapshot_with_score(50)],
            food: Vec::new(),
            power_ups: Vec::new(),
            time_remaining: None,
        };
        let older = StateMessage {
            sequence: 3,
            players: vec![snapshot_with_score(99)],
            ..newer.clone()
        };

        // Delivered out of order: the late, lower-sequence message must not apply.
        sender.send_state(&newer).unwrap();
        sender.send_state(&older).unwrap();
        guest_sync.tick(&mut guest_game, 0.0);

        assert_eq!(guest_game.player("host").unwrap().score, 50);
    }

    #[tokio::test]
    async fn game_over_propagates_to_guest() {
        let hub = LoopbackHub::new();
        let (_, mut guest_game) = pvp_pair(1, 2);

        let mut host_sync = SyncCoordinator::new(hub.join("host"), "host", "host");
        let mut guest_sync = SyncCoordinator::new(hub.join("guest"), "guest", "host");

        host_sync.publish_local_events(&[TickEvent::GameOver {
            winner_id: Some("host".to_string()),
        }]);
        guest_sync.tick(&mut guest_game, 0.0);

        assert_eq!(guest_game.status(), GameStatus::GameOver);
        assert_eq!(guest_game.winner(), Some("host"));
    }

    #[tokio::test]
    async fn guest_pickup_event_updates_host_entities() {
        let hub = LoopbackHub::new();
        let (mut host_game, _) = pvp_pair(1, 2);
        let food_id = host_game.food()[0].id.clone();

        let mut host_sync = SyncCoordinator::new(hub.join("host"), "host", "host");
        let mut guest_sync = SyncCoordinator::new(hub.join("guest"), "guest", "host");

        guest_sync.publish_local_events(&[TickEvent::FoodCollected {
            player_id: "guest".to_string(),
            food_id: food_id.clone(),
        }]);
        host_sync.tick(&mut host_game, 0.0);

        assert!(!host_game.food().iter().any(|f| f.id == food_id));
    }
}
