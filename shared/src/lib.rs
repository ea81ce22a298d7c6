use serde::{Deserialize, Serialize};

pub mod protocol;

pub const FOOD_VALUE: u32 = 10;
pub const SOLO_FOOD_COUNT: usize = 3;
pub const MULTI_FOOD_COUNT: usize = 5;
pub const MATCH_TIME_SECS: f32 = 120.0;

pub const MAX_POWER_UPS_ON_BOARD: usize = 3;
pub const POWER_UP_SPAWN_CHANCE: f64 = 0.02;
pub const SPAWN_ATTEMPTS: u32 = 100;
pub const MIN_SNAKE_LEN: usize = 3;

/// Milliseconds a snake needs to advance one cell at multiplier 1.0.
pub const GAME_SPEED_SLOW_MS: f32 = 150.0;
pub const GAME_SPEED_NORMAL_MS: f32 = 100.0;
pub const GAME_SPEED_FAST_MS: f32 = 60.0;

/// Wall-clock interval between outbound state broadcasts.
pub const SYNC_INTERVAL_MS: f32 = 50.0;

/// Solo mode gains +0.05x base speed per 100 points, capped at 1.5x.
pub const SOLO_SPEED_STEP: f32 = 0.05;
pub const SOLO_SPEED_POINTS: u32 = 100;
pub const SOLO_SPEED_CAP: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell one step from here in the given direction.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Solo,
    Pvp,
    Tournament,
}

/// Match lifecycle. Only moves forward, except Playing <-> Paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    Menu,
    Waiting,
    Countdown,
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    pub cell_size: i32,
}

impl Board {
    pub const SMALL: Board = Board {
        width: 20,
        height: 20,
        cell_size: 20,
    };
    pub const MEDIUM: Board = Board {
        width: 30,
        height: 25,
        cell_size: 18,
    };
    pub const LARGE: Board = Board {
        width: 40,
        height: 30,
        cell_size: 16,
    };
    pub const MASSIVE: Board = Board {
        width: 60,
        height: 40,
        cell_size: 14,
    };

    pub fn for_mode(mode: GameMode) -> Board {
        match mode {
            GameMode::Tournament => Board::MASSIVE,
            _ => Board::MEDIUM,
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Neon palette, assigned to players in join order.
pub const PLAYER_COLORS: [Rgb; 6] = [
    Rgb::new(0x39, 0xFF, 0x14), // green
    Rgb::new(0xFF, 0x10, 0xF0), // pink
    Rgb::new(0x00, 0xD9, 0xFF), // blue
    Rgb::new(0xFF, 0xFF, 0x00), // yellow
    Rgb::new(0xFF, 0x66, 0x00), // orange
    Rgb::new(0x9D, 0x00, 0xFF), // purple
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Speed,
    SlowOthers,
    Ghost,
    DoubleScore,
    Shield,
    Growth,
    FreezeOthers,
    Teleport,
    ShrinkOthers,
}

/// Display and timing metadata for a power-up kind. Only the kind travels
/// over the wire; receivers re-expand it through this table.
#[derive(Debug, Clone, Copy)]
pub struct PowerUpInfo {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: Rgb,
    pub duration_secs: Option<f32>,
    pub tournament_only: bool,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 9] = [
        PowerUpKind::Speed,
        PowerUpKind::SlowOthers,
        PowerUpKind::Ghost,
        PowerUpKind::DoubleScore,
        PowerUpKind::Shield,
        PowerUpKind::Growth,
        PowerUpKind::FreezeOthers,
        PowerUpKind::Teleport,
        PowerUpKind::ShrinkOthers,
    ];

    pub fn info(self) -> PowerUpInfo {
        match self {
            PowerUpKind::Speed => PowerUpInfo {
                name: "Speed Boost",
                icon: "S",
                color: Rgb::new(0xFF, 0xFF, 0x00),
                duration_secs: Some(5.0),
                tournament_only: false,
            },
            PowerUpKind::SlowOthers => PowerUpInfo {
                name: "Slow Motion",
                icon: "~",
                color: Rgb::new(0x00, 0xFF, 0xFF),
                duration_secs: Some(5.0),
                tournament_only: false,
            },
            PowerUpKind::Ghost => PowerUpInfo {
                name: "Ghost Mode",
                icon: "G",
                color: Rgb::new(0x9D, 0x00, 0xFF),
                duration_secs: Some(5.0),
                tournament_only: false,
            },
            PowerUpKind::DoubleScore => PowerUpInfo {
                name: "Double Points",
                icon: "2",
                color: Rgb::new(0xFF, 0x00, 0xFF),
                duration_secs: Some(10.0),
                tournament_only: false,
            },
            PowerUpKind::Shield => PowerUpInfo {
                name: "Shield",
                icon: "#",
                color: Rgb::new(0x00, 0xFF, 0x00),
                duration_secs: None,
                tournament_only: false,
            },
            PowerUpKind::Growth => PowerUpInfo {
                name: "Mega Growth",
                icon: "+",
                color: Rgb::new(0xFF, 0x66, 0x00),
                duration_secs: None,
                tournament_only: true,
            },
            PowerUpKind::FreezeOthers => PowerUpInfo {
                name: "Freeze",
                icon: "*",
                color: Rgb::new(0x00, 0xD9, 0xFF),
                duration_secs: Some(2.0),
                tournament_only: true,
            },
            PowerUpKind::Teleport => PowerUpInfo {
                name: "Teleport",
                icon: "@",
                color: Rgb::new(0xFF, 0x10, 0xF0),
                duration_secs: None,
                tournament_only: true,
            },
            PowerUpKind::ShrinkOthers => PowerUpInfo {
                name: "Shrink Ray",
                icon: "-",
                color: Rgb::new(0xFF, 0x00, 0x00),
                duration_secs: None,
                tournament_only: true,
            },
        }
    }

    /// Kinds eligible to spawn in the given mode.
    pub fn pool(mode: GameMode) -> Vec<PowerUpKind> {
        PowerUpKind::ALL
            .iter()
            .copied()
            .filter(|kind| mode == GameMode::Tournament || !kind.info().tournament_only)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: String,
    pub position: Position,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: String,
    pub position: Position,
    pub kind: PowerUpKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    /// Head first. Never empty for a player that has been initialized.
    pub snake: Vec<Position>,
    pub direction: Direction,
    pub next_direction: Option<Direction>,
    pub score: u32,
    pub speed: f32,
    pub color: Rgb,
    pub alive: bool,
    pub active_power_ups: Vec<ActivePowerUp>,
}

impl Player {
    pub fn new(id: &str, name: &str, snake: Vec<Position>, color: Rgb) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            snake,
            direction: Direction::Right,
            next_direction: None,
            score: 0,
            speed: 1.0,
            color,
            alive: true,
            active_power_ups: Vec::new(),
        }
    }

    pub fn head(&self) -> Position {
        self.snake[0]
    }

    pub fn has_power_up(&self, kind: PowerUpKind) -> bool {
        self.active_power_ups.iter().any(|p| p.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposites() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
    }

    #[test]
    fn test_position_step() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.step(Direction::Up), Position::new(5, 4));
        assert_eq!(pos.step(Direction::Down), Position::new(5, 6));
        assert_eq!(pos.step(Direction::Left), Position::new(4, 5));
        assert_eq!(pos.step(Direction::Right), Position::new(6, 5));
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(Position::new(0, 0).manhattan(Position::new(3, 4)), 7);
        assert_eq!(Position::new(3, 4).manhattan(Position::new(0, 0)), 7);
        assert_eq!(Position::new(2, 2).manhattan(Position::new(2, 2)), 0);
    }

    #[test]
    fn test_board_bounds() {
        let board = Board::MEDIUM;
        assert!(board.contains(Position::new(0, 0)));
        assert!(board.contains(Position::new(29, 24)));
        assert!(!board.contains(Position::new(30, 24)));
        assert!(!board.contains(Position::new(29, 25)));
        assert!(!board.contains(Position::new(-1, 0)));
    }

    #[test]
    fn test_board_for_mode() {
        assert_eq!(Board::for_mode(GameMode::Solo), Board::MEDIUM);
        assert_eq!(Board::for_mode(GameMode::Pvp), Board::MEDIUM);
        assert_eq!(Board::for_mode(GameMode::Tournament), Board::MASSIVE);
    }

    #[test]
    fn test_power_up_pool_excludes_tournament_kinds() {
        let pool = PowerUpKind::pool(GameMode::Pvp);
        assert_eq!(pool.len(), 5);
        assert!(!pool.contains(&PowerUpKind::Teleport));
        assert!(!pool.contains(&PowerUpKind::Growth));

        let pool = PowerUpKind::pool(GameMode::Tournament);
        assert_eq!(pool.len(), 9);
    }

    #[test]
    fn test_power_up_durations() {
        assert_eq!(PowerUpKind::Speed.info().duration_secs, Some(5.0));
        assert_eq!(PowerUpKind::DoubleScore.info().duration_secs, Some(10.0));
        assert_eq!(PowerUpKind::FreezeOthers.info().duration_secs, Some(2.0));
        assert_eq!(PowerUpKind::Shield.info().duration_secs, None);
        assert_eq!(PowerUpKind::Teleport.info().duration_secs, None);
    }

    #[test]
    fn test_player_serialization_roundtrip() {
        let player = Player::new(
            "p1",
            "Alice",
            vec![Position::new(5, 5), Position::new(4, 5)],
            PLAYER_COLORS[0],
        );

        let serialized = bincode::serialize(&player).unwrap();
        let deserialized: Player = bincode::deserialize(&serialized).unwrap();

        assert_eq!(deserialized, player);
    }

    #[test]
    fn test_has_power_up() {
        let mut player = Player::new("p1", "Alice", vec![Position::new(5, 5)], PLAYER_COLORS[0]);
        assert!(!player.has_power_up(PowerUpKind::Shield));

        player.active_power_ups.push(ActivePowerUp {
            kind: PowerUpKind::Shield,
            remaining_secs: 5.0,
        });
        assert!(player.has_power_up(PowerUpKind::Shield));
        assert!(!player.has_power_up(PowerUpKind::Ghost));
    }
}
