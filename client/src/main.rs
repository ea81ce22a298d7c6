use clap::Parser;
use client::channel::{LocalRooms, LoopbackHub, RoomDirectory, RoomStatus};
use client::input;
use client::rendering::Renderer;
use client::sync::SyncCoordinator;
use engine::ai::Difficulty;
use engine::game::{PlayerSpec, SnakeGame};
use log::{error, info};
use macroquad::prelude::*;
use shared::{GameMode, GameStatus};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game mode: solo, bots, or netplay
    #[arg(short = 'm', long, default_value = "solo")]
    mode: String,

    /// Number of bot opponents (bots mode)
    #[arg(short = 'b', long, default_value = "1")]
    bots: usize,

    /// Bot difficulty: easy, medium, hard, insane
    #[arg(short = 'd', long, default_value = "medium")]
    difficulty: Difficulty,

    /// Display name
    #[arg(short = 'n', long, default_value = "Player")]
    name: String,

    /// Move speed: slow, normal, fast
    #[arg(long, default_value = "normal")]
    speed: String,

    /// Board preset override: small, medium, large, massive
    #[arg(long)]
    board: Option<String>,

    /// Seed for deterministic food and power-up placement
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_speed(name: &str) -> Result<f32, Box<dyn std::error::Error>> {
    match name {
        "slow" => Ok(shared::GAME_SPEED_SLOW_MS),
        "normal" => Ok(shared::GAME_SPEED_NORMAL_MS),
        "fast" => Ok(shared::GAME_SPEED_FAST_MS),
        other => Err(format!("unknown speed '{}' (slow, normal, fast)", other).into()),
    }
}

fn parse_board(name: &str) -> Result<shared::Board, Box<dyn std::error::Error>> {
    match name {
        "small" => Ok(shared::Board::SMALL),
        "medium" => Ok(shared::Board::MEDIUM),
        "large" => Ok(shared::Board::LARGE),
        "massive" => Ok(shared::Board::MASSIVE),
        other => Err(format!(
            "unknown board '{}' (small, medium, large, massive)",
            other
        )
        .into()),
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Neon Snake".to_string(),
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting in {} mode", args.mode);
    info!("Controls: arrows/WASD to steer, P to pause, R to restart");

    let result = match args.mode.as_str() {
        "solo" => run_solo(&args).await,
        "bots" => run_bots(&args).await,
        "netplay" => run_netplay(&args).await,
        other => Err(format!("unknown mode '{}' (solo, bots, netplay)", other).into()),
    };

    if let Err(e) = result {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

fn new_game(
    mode: GameMode,
    seed: Option<u64>,
    interval_ms: f32,
    board: Option<shared::Board>,
) -> SnakeGame {
    let mut game = match seed {
        Some(seed) => SnakeGame::with_seed(mode, seed),
        None => SnakeGame::new(mode),
    };
    game.set_base_interval(interval_ms);
    if let Some(board) = board {
        game.set_board(board);
    }
    game
}

async fn run_solo(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let interval = parse_speed(&args.speed)?;
    let board = args.board.as_deref().map(parse_board).transpose()?;

    let mut game = new_game(GameMode::Solo, args.seed, interval, board);
    game.init_solo_game("local", &args.name);

    let mut renderer = Renderer::new(&game)?;
    let (w, h) = renderer.window_size();
    request_new_screen_size(w, h);

    loop {
        let frame = input::poll();
        if let Some(direction) = frame.direction {
            game.change_direction("local", direction);
        }
        handle_meta_keys(&mut game, frame.pause, frame.reset, || {
            let mut g = new_game(GameMode::Solo, args.seed, interval, board);
            g.init_solo_game("local", &args.name);
            g
        });

        game.update(get_frame_time() * 1000.0);
        renderer.render(&game);
        next_frame().await;
    }
}

async fn run_bots(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let bot_count = args.bots.clamp(1, 5);
    let mode = if bot_count > 1 {
        GameMode::Tournament
    } else {
        GameMode::Pvp
    };

    let interval = parse_speed(&args.speed)?;
    let board = args.board.as_deref().map(parse_board).transpose()?;

    let build = || {
        let mut specs = vec![PlayerSpec::human("local", &args.name)];
        for i in 0..bot_count {
            specs.push(PlayerSpec::bot(
                &format!("bot-{}", i + 1),
                &format!("Bot {}", i + 1),
                args.difficulty,
            ));
        }
        let mut game = new_game(mode, args.seed, interval, board);
        game.init_pvp_game(&specs);
        game
    };

    let mut game = build();
    let mut renderer = Renderer::new(&game)?;
    let (w, h) = renderer.window_size();
    request_new_screen_size(w, h);

    loop {
        let frame = input::poll();
        if let Some(direction) = frame.direction {
            game.change_direction("local", direction);
        }
        handle_meta_keys(&mut game, frame.pause, frame.reset, build);

        game.update(get_frame_time() * 1000.0);
        renderer.render(&game);
        next_frame().await;
    }
}

/// Two full peers in one process, wired through the loopback hub: the local
/// human hosts, a bot drives the remote peer's simulation. Exercises the
/// same sync path a networked transport would.
async fn run_netplay(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut rooms = LocalRooms::new();
    let room = rooms.create_room("host", "pvp")?;
    info!("Room {} open, code {}", room.id, room.code);
    rooms.join_room(&room.code, "rival")?;
    rooms.update_status(&room.id, RoomStatus::Playing)?;

    let hub = LoopbackHub::new();

    let roster = [
        ("host".to_string(), args.name.clone()),
        ("rival".to_string(), "Rival".to_string()),
    ];

    let interval = parse_speed(&args.speed)?;
    let board = args.board.as_deref().map(parse_board).transpose()?;

    let mut host_game = new_game(GameMode::Pvp, args.seed, interval, board);
    host_game.init_multiplayer_game(&roster);
    let mut host_sync = SyncCoordinator::new(hub.join("host"), "host", "host");

    // The rival peer steps its own engine; only its own player is a bot there.
    let mut rival_game = new_game(
        GameMode::Pvp,
        args.seed.map(|s| s.wrapping_add(1)),
        interval,
        board,
    );
    rival_game.init_pvp_game(&[
        PlayerSpec::human("host", &roster[0].1),
        PlayerSpec::bot("rival", "Rival", args.difficulty),
    ]);
    let mut rival_sync = SyncCoordinator::new(hub.join("rival"), "rival", "host");

    let mut renderer = Renderer::new(&host_game)?;
    let (w, h) = renderer.window_size();
    request_new_screen_size(w, h);

    loop {
        let dt_ms = get_frame_time() * 1000.0;
        let frame = input::poll();
        if let Some(direction) = frame.direction {
            host_game.change_direction("host", direction);
            host_sync.send_direction_change(direction);
        }

        let host_events = host_game.update(dt_ms);
        host_sync.publish_local_events(&host_events);
        host_sync.tick(&mut host_game, dt_ms);

        let rival_events = rival_game.update(dt_ms);
        rival_sync.publish_local_events(&rival_events);
        rival_sync.tick(&mut rival_game, dt_ms);

        renderer.render(&host_game);
        next_frame().await;
    }
}

fn handle_meta_keys<F: FnOnce() -> SnakeGame>(
    game: &mut SnakeGame,
    pause: bool,
    reset: bool,
    rebuild: F,
) {
    if pause {
        match game.status() {
            GameStatus::Playing => game.pause(),
            GameStatus::Paused => game.resume(),
            _ => {}
        }
    }
    if reset && game.status() == GameStatus::GameOver {
        *game = rebuild();
    }
}
