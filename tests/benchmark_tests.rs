//! Performance benchmarks for critical game systems

use engine::ai::{BotController, Difficulty};
use engine::game::{PlayerSpec, SnakeGame};
use shared::protocol::{PlayerSnapshot, StateMessage};
use shared::{Direction, GameMode, Position, PLAYER_COLORS};
use std::time::Instant;

/// Benchmarks the full tick path with a board of hard bots
#[test]
fn benchmark_bot_match_ticks() {
    let mut game = SnakeGame::with_seed(GameMode::Tournament, 9);
    game.init_pvp_game(&[
        PlayerSpec::bot("b1", "Bot 1", Difficulty::Hard),
        PlayerSpec::bot("b2", "Bot 2", Difficulty::Hard),
        PlayerSpec::bot("b3", "Bot 3", Difficulty::Hard),
        PlayerSpec::bot("b4", "Bot 4", Difficulty::Hard),
    ]);

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        game.update(16.0);
    }

    let duration = start.elapsed();
    println!(
        "Game ticks: {} iterations in {:?} ({:.2} µs/tick)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks AI pathing against a crowded board
#[test]
fn benchmark_bot_decisions() {
    let mut bot = BotController::with_seed(Difficulty::Insane, 3);
    let board = shared::Board::LARGE;

    let snake: Vec<Position> = (0..20).map(|i| Position::new(20 - i, 15)).collect();
    let mut player = shared::Player::new("bot", "Bot", snake, PLAYER_COLORS[0]);
    player.direction = Direction::Right;

    let obstacle_snake: Vec<Position> = (0..20).map(|i| Position::new(25, 5 + i)).collect();
    let obstacle = shared::Player::new("other", "Other", obstacle_snake, PLAYER_COLORS[1]);

    let food = [
        Position::new(35, 5),
        Position::new(2, 28),
        Position::new(30, 20),
    ];

    let iterations = 50_000;
    let start = Instant::now();

    for i in 0..iterations {
        let _ = bot.next_direction(&player, &food, board, &[&obstacle], (i * 500) as f64);
    }

    let duration = start.elapsed();
    println!(
        "Bot decisions: {} iterations in {:?} ({:.2} µs/decision)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks wire encoding of a full state broadcast
#[test]
fn benchmark_state_serialization() {
    let players: Vec<PlayerSnapshot> = (0..4)
        .map(|i| PlayerSnapshot {
            id: format!("player-{}", i),
            name: format!("Player {}", i),
            snake: (0..30).map(|s| Position::new(s, i)).collect(),
            direction: Direction::Right,
            score: 120,
            color: PLAYER_COLORS[i as usize],
            alive: true,
        })
        .collect();

    let msg = StateMessage {
        sender_id: "host".to_string(),
        sequence: 1000,
        players,
        food: Vec::new(),
        power_ups: Vec::new(),
        time_remaining: Some(60.0),
    };

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let bytes = bincode::serialize(&msg).unwrap();
        let _: StateMessage = bincode::deserialize(&bytes).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "State encode+decode: {} iterations in {:?} ({:.2} µs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}
