//! The per-peer world simulation. One instance owns the canonical state for
//! its local players; the sync layer overwrites remote players between ticks.

use crate::ai::{BotController, Difficulty};
use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::protocol::PlayerSnapshot;
use shared::{
    Board, Direction, Food, GameMode, GameStatus, Player, Position, PowerUp, PowerUpKind,
    FOOD_VALUE, GAME_SPEED_NORMAL_MS, MATCH_TIME_SECS, MAX_POWER_UPS_ON_BOARD, MIN_SNAKE_LEN,
    MULTI_FOOD_COUNT, PLAYER_COLORS, POWER_UP_SPAWN_CHANCE, SOLO_FOOD_COUNT, SOLO_SPEED_CAP,
    SOLO_SPEED_POINTS, SOLO_SPEED_STEP, SPAWN_ATTEMPTS,
};
use std::collections::HashMap;

/// Bots recompute their intent at this fraction of the base move interval,
/// so thinking stays slightly ahead of movement.
const AI_THINK_RATIO: f32 = 0.8;

/// Segments appended by the growth power-up.
const GROWTH_SEGMENTS: usize = 5;
/// Segments removed from every opponent by the shrink power-up.
const SHRINK_SEGMENTS: usize = 3;

/// A seat in a match. `difficulty` marks the player as locally bot-driven.
#[derive(Debug, Clone)]
pub struct PlayerSpec {
    pub id: String,
    pub name: String,
    pub difficulty: Option<Difficulty>,
}

impl PlayerSpec {
    pub fn human(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            difficulty: None,
        }
    }

    pub fn bot(id: &str, name: &str, difficulty: Difficulty) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            difficulty: Some(difficulty),
        }
    }
}

/// What happened during an `update` call, in occurrence order. The sync
/// layer forwards the local player's entries as channel events.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    FoodCollected { player_id: String, food_id: String },
    PowerUpCollected { player_id: String, power_up_id: String },
    PlayerDied { player_id: String },
    GameOver { winner_id: Option<String> },
}

pub struct SnakeGame {
    mode: GameMode,
    board: Board,
    status: GameStatus,
    /// Join order is significant: colors and the winner tie-break follow it.
    players: Vec<Player>,
    food: Vec<Food>,
    power_ups: Vec<PowerUp>,
    time_remaining: Option<f32>,
    winner: Option<String>,

    base_interval_ms: f32,
    base_accum_ms: f32,
    ai_accum_ms: f32,
    clock_ms: f64,
    move_accum_ms: HashMap<String, f32>,
    bots: HashMap<String, BotController>,
    food_seq: u64,
    power_up_seq: u64,
    rng: StdRng,
}

impl SnakeGame {
    pub fn new(mode: GameMode) -> Self {
        Self::with_rng(mode, StdRng::from_entropy())
    }

    /// Deterministic instance for tests.
    pub fn with_seed(mode: GameMode, seed: u64) -> Self {
        Self::with_rng(mode, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mode: GameMode, rng: StdRng) -> Self {
        Self {
            mode,
            board: Board::for_mode(mode),
            status: GameStatus::Menu,
            players: Vec::new(),
            food: Vec::new(),
            power_ups: Vec::new(),
            time_remaining: None,
            winner: None,
            base_interval_ms: GAME_SPEED_NORMAL_MS,
            base_accum_ms: 0.0,
            ai_accum_ms: 0.0,
            clock_ms: 0.0,
            move_accum_ms: HashMap::new(),
            bots: HashMap::new(),
            food_seq: 0,
            power_up_seq: 0,
            rng,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn food(&self) -> &[Food] {
        &self.food
    }

    pub fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    pub fn time_remaining(&self) -> Option<f32> {
        self.time_remaining
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn init_solo_game(&mut self, player_id: &str, player_name: &str) {
        let center = self.board.center();
        let snake = (0..4)
            .map(|i| Position::new(center.x - i, center.y))
            .collect();

        self.players
            .push(Player::new(player_id, player_name, snake, PLAYER_COLORS[0]));

        for _ in 0..SOLO_FOOD_COUNT {
            self.spawn_food();
        }

        self.status = GameStatus::Playing;
        info!("Solo game started for {} ({})", player_name, player_id);
    }

    /// Seats every participant and starts the match clock. Bot seats get a
    /// locally driven controller; human seats are expected to be fed through
    /// `change_direction` (local input or the sync layer).
    pub fn init_pvp_game(&mut self, specs: &[PlayerSpec]) {
        let positions = self.start_positions(specs.len());

        for (index, spec) in specs.iter().enumerate() {
            let start = positions[index];
            let snake = (0..3).map(|i| Position::new(start.x - i, start.y)).collect();
            let color = PLAYER_COLORS[index % PLAYER_COLORS.len()];

            self.players
                .push(Player::new(&spec.id, &spec.name, snake, color));

            if let Some(difficulty) = spec.difficulty {
                self.bots
                    .insert(spec.id.clone(), BotController::new(difficulty));
            }
        }

        for _ in 0..MULTI_FOOD_COUNT {
            self.spawn_food();
        }

        self.time_remaining = Some(MATCH_TIME_SECS);
        self.status = GameStatus::Playing;
        info!("Match started with {} players", specs.len());
    }

    /// Synced-match variant: all seats are human (remote peers drive theirs
    /// through the sync layer).
    pub fn init_multiplayer_game(&mut self, players: &[(String, String)]) {
        let specs: Vec<PlayerSpec> = players
            .iter()
            .map(|(id, name)| PlayerSpec::human(id, name))
            .collect();
        self.init_pvp_game(&specs);
    }

    /// Advances the world by `dt_ms` of wall-clock time. No-op unless the
    /// game is in the Playing state.
    pub fn update(&mut self, dt_ms: f32) -> Vec<TickEvent> {
        let mut events = Vec::new();

        if self.status != GameStatus::Playing {
            return events;
        }

        self.clock_ms += dt_ms as f64;
        self.expire_power_ups(dt_ms);

        if let Some(remaining) = self.time_remaining.as_mut() {
            *remaining -= dt_ms / 1000.0;
            if *remaining <= 0.0 {
                *remaining = 0.0;
                self.end_game(&mut events);
                return events;
            }
        }

        self.ai_accum_ms += dt_ms;
        if self.ai_accum_ms >= self.base_interval_ms * AI_THINK_RATIO {
            self.ai_accum_ms = 0.0;
            self.think_bots();
        }

        let ids: Vec<String> = self
            .players
            .iter()
            .filter(|p| p.alive)
            .map(|p| p.id.clone())
            .collect();

        for id in ids {
            let multiplier = self.speed_multiplier(&id);
            if multiplier <= 0.0 {
                continue; // frozen
            }
            let interval = self.base_interval_ms / multiplier;

            let crossed = {
                let accum = self.move_accum_ms.entry(id.clone()).or_insert(0.0);
                *accum += dt_ms;
                if *accum >= interval {
                    *accum = 0.0;
                    true
                } else {
                    false
                }
            };

            if crossed {
                self.move_player(&id, &mut events);
            }
        }

        self.base_accum_ms += dt_ms;
        if self.base_accum_ms >= self.base_interval_ms {
            self.base_accum_ms = 0.0;
            if self.power_ups.len() < MAX_POWER_UPS_ON_BOARD
                && self.rng.gen_bool(POWER_UP_SPAWN_CHANCE)
            {
                self.spawn_power_up();
            }
        }

        self.check_win_conditions(&mut events);
        events
    }

    fn think_bots(&mut self) {
        let food_positions: Vec<Position> = self.food.iter().map(|f| f.position).collect();
        let board = self.board;
        let clock = self.clock_ms;
        let mut intents: Vec<(String, Direction)> = Vec::new();

        for (id, bot) in self.bots.iter_mut() {
            let Some(player) = self.players.iter().find(|p| &p.id == id) else {
                continue;
            };
            if !player.alive {
                continue;
            }
            let others: Vec<&Player> = self.players.iter().filter(|p| &p.id != id).collect();
            let direction = bot.next_direction(player, &food_positions, board, &others, clock);
            intents.push((id.clone(), direction));
        }

        for (id, direction) in intents {
            if let Some(player) = self.players.iter_mut().find(|p| p.id == id) {
                player.next_direction = Some(direction);
            }
        }
    }

    /// One discrete move for one player: queued turn, collision, eating.
    fn move_player(&mut self, id: &str, events: &mut Vec<TickEvent>) {
        let Some(idx) = self.players.iter().position(|p| p.id == id) else {
            return;
        };

        {
            let player = &mut self.players[idx];
            if !player.alive {
                return;
            }
            // A queued reversal is dropped silently.
            if let Some(next) = player.next_direction.take() {
                if next != player.direction.opposite() {
                    player.direction = next;
                }
            }
        }

        let new_head = {
            let player = &self.players[idx];
            player.head().step(player.direction)
        };

        if self.is_fatal(idx, new_head) {
            if self.players[idx].has_power_up(PowerUpKind::Shield) {
                self.players[idx]
                    .active_power_ups
                    .retain(|p| p.kind != PowerUpKind::Shield);
                debug!("{} burned a shield", id);
            } else {
                self.players[idx].alive = false;
                debug!("{} died at ({}, {})", id, new_head.x, new_head.y);
                events.push(TickEvent::PlayerDied {
                    player_id: id.to_string(),
                });
                return;
            }
        }

        self.players[idx].snake.insert(0, new_head);

        let mut grew = false;

        if let Some(food_idx) = self.food.iter().position(|f| f.position == new_head) {
            let food = self.food.remove(food_idx);
            let multiplier = if self.players[idx].has_power_up(PowerUpKind::DoubleScore) {
                2
            } else {
                1
            };
            self.players[idx].score += food.value * multiplier;
            grew = true;
            self.spawn_food();

            if self.mode == GameMode::Solo {
                let player = &mut self.players[idx];
                let steps = (player.score / SOLO_SPEED_POINTS) as f32;
                player.speed = (1.0 + steps * SOLO_SPEED_STEP).min(SOLO_SPEED_CAP);
            }

            events.push(TickEvent::FoodCollected {
                player_id: id.to_string(),
                food_id: food.id,
            });
        }

        if let Some(pu_idx) = self.power_ups.iter().position(|p| p.position == new_head) {
            let power_up = self.power_ups.remove(pu_idx);
            self.apply_power_up(idx, power_up.kind);
            grew = true;
            events.push(TickEvent::PowerUpCollected {
                player_id: id.to_string(),
                power_up_id: power_up.id,
            });
        }

        if !grew {
            self.players[idx].snake.pop();
        }
    }

    /// Collision check for a prospective head cell. Ghost mode skips every
    /// check, including the wall: the head may leave the board while ghost
    /// is active and the wall check re-applies once it expires.
    fn is_fatal(&self, idx: usize, head: Position) -> bool {
        let player = &self.players[idx];

        if player.has_power_up(PowerUpKind::Ghost) {
            return false;
        }

        if !self.board.contains(head) {
            return true;
        }

        // Own body, excluding the tail cell that vacates this move.
        let body_len = player.snake.len().saturating_sub(1);
        if player.snake[..body_len].contains(&head) {
            return true;
        }

        if self.mode != GameMode::Solo {
            for other in &self.players {
                if other.id != player.id && other.alive && other.snake.contains(&head) {
                    return true;
                }
            }
        }

        false
    }

    fn apply_power_up(&mut self, idx: usize, kind: PowerUpKind) {
        match kind {
            PowerUpKind::Growth => {
                let player = &mut self.players[idx];
                if let Some(&tail) = player.snake.last() {
                    player.snake.extend(std::iter::repeat(tail).take(GROWTH_SEGMENTS));
                }
            }
            PowerUpKind::Teleport => {
                if let Some(pos) = self.random_empty_position() {
                    let player = &mut self.players[idx];
                    let (dx, dy) = player.direction.offset();
                    player.snake = vec![
                        pos,
                        Position::new(pos.x - dx, pos.y - dy),
                        Position::new(pos.x - dx * 2, pos.y - dy * 2),
                    ];
                }
            }
            PowerUpKind::ShrinkOthers => {
                let owner = self.players[idx].id.clone();
                for other in &mut self.players {
                    if other.id != owner && other.alive && other.snake.len() > MIN_SNAKE_LEN {
                        let new_len = (other.snake.len() - SHRINK_SEGMENTS).max(MIN_SNAKE_LEN);
                        other.snake.truncate(new_len);
                    }
                }
            }
            PowerUpKind::Shield => {
                // No expiry; consumed by the next fatal collision.
                self.players[idx]
                    .active_power_ups
                    .push(shared::ActivePowerUp {
                        kind,
                        remaining_secs: f32::INFINITY,
                    });
            }
            _ => {
                if let Some(duration) = kind.info().duration_secs {
                    self.players[idx]
                        .active_power_ups
                        .push(shared::ActivePowerUp {
                            kind,
                            remaining_secs: duration,
                        });
                }
            }
        }
    }

    fn expire_power_ups(&mut self, dt_ms: f32) {
        for player in &mut self.players {
            for active in &mut player.active_power_ups {
                active.remaining_secs -= dt_ms / 1000.0;
            }
            player.active_power_ups.retain(|p| p.remaining_secs > 0.0);
        }
    }

    /// Effective moves-per-interval multiplier: base speed, doubled by an
    /// own speed boost, halved by any living opponent's slow, zeroed by any
    /// living opponent's freeze.
    pub fn speed_multiplier(&self, id: &str) -> f32 {
        let Some(player) = self.player(id) else {
            return 0.0;
        };

        let mut multiplier = player.speed;

        if player.has_power_up(PowerUpKind::Speed) {
            multiplier *= 2.0;
        }

        let mut slowed = false;
        let mut frozen = false;
        for other in &self.players {
            if other.id == player.id || !other.alive {
                continue;
            }
            slowed |= other.has_power_up(PowerUpKind::SlowOthers);
            frozen |= other.has_power_up(PowerUpKind::FreezeOthers);
        }

        if slowed {
            multiplier *= 0.5;
        }
        if frozen {
            multiplier = 0.0;
        }

        multiplier
    }

    fn check_win_conditions(&mut self, events: &mut Vec<TickEvent>) {
        if self.players.is_empty() {
            return;
        }
        let alive = self.players.iter().filter(|p| p.alive).count();

        let over = match self.mode {
            GameMode::Solo => alive == 0,
            _ => alive <= 1,
        };

        if over {
            self.end_game(events);
        }
    }

    fn end_game(&mut self, events: &mut Vec<TickEvent>) {
        self.status = GameStatus::GameOver;

        // First strictly-greatest score in join order wins.
        let mut winner: Option<&Player> = None;
        for player in &self.players {
            if winner.map_or(true, |w| player.score > w.score) {
                winner = Some(player);
            }
        }

        self.winner = winner.map(|w| w.id.clone());
        if let Some(id) = &self.winner {
            info!("Game over, winner: {}", id);
        }
        events.push(TickEvent::GameOver {
            winner_id: self.winner.clone(),
        });
    }

    /// Queues a turn for the next move. Ignored for dead or unknown players;
    /// reversals are filtered at move time.
    pub fn change_direction(&mut self, player_id: &str, direction: Direction) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
            if player.alive {
                player.next_direction = Some(direction);
            }
        }
    }

    /// Overrides the mode's board preset. Only honored before seating
    /// players; snake placement depends on the board.
    pub fn set_board(&mut self, board: Board) {
        if self.status == GameStatus::Menu {
            self.board = board;
        }
    }

    /// Overrides the base move interval (ms per cell at 1.0x speed).
    pub fn set_base_interval(&mut self, ms: f32) {
        if self.status == GameStatus::Menu && ms > 0.0 {
            self.base_interval_ms = ms;
        }
    }

    pub fn pause(&mut self) {
        if self.status == GameStatus::Playing {
            self.status = GameStatus::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.status == GameStatus::Paused {
            self.status = GameStatus::Playing;
        }
    }

    pub fn reset(&mut self) {
        self.players.clear();
        self.food.clear();
        self.power_ups.clear();
        self.status = GameStatus::Menu;
        self.time_remaining = None;
        self.winner = None;
        self.base_accum_ms = 0.0;
        self.ai_accum_ms = 0.0;
        self.clock_ms = 0.0;
        self.move_accum_ms.clear();
        self.bots.clear();
        self.food_seq = 0;
        self.power_up_seq = 0;
    }

    fn start_positions(&self, count: usize) -> Vec<Position> {
        let Board { width, height, .. } = self.board;
        let margin = 5;

        match count {
            1 => vec![self.board.center()],
            2 => vec![
                Position::new(margin, height / 2),
                Position::new(width - margin, height / 2),
            ],
            _ => {
                let center = self.board.center();
                let radius = width.min(height) as f32 / 3.0;
                (0..count)
                    .map(|i| {
                        let angle = (i as f32) * 2.0 * std::f32::consts::PI / count as f32;
                        Position::new(
                            center.x + (radius * angle.cos()).floor() as i32,
                            center.y + (radius * angle.sin()).floor() as i32,
                        )
                    })
                    .collect()
            }
        }
    }

    fn spawn_food(&mut self) {
        if let Some(position) = self.random_empty_position() {
            let id = format!("food-{}", self.food_seq);
            self.food_seq += 1;
            self.food.push(Food {
                id,
                position,
                value: FOOD_VALUE,
            });
        }
    }

    fn spawn_power_up(&mut self) {
        let Some(position) = self.random_empty_position() else {
            return;
        };
        let pool = PowerUpKind::pool(self.mode);
        let kind = pool[self.rng.gen_range(0..pool.len())];
        let id = format!("powerup-{}", self.power_up_seq);
        self.power_up_seq += 1;

        debug!("Spawned {:?} at ({}, {})", kind, position.x, position.y);
        self.power_ups.push(PowerUp { id, position, kind });
    }

    /// Uniform draw over the grid, rejecting occupied cells. Gives up after
    /// a fixed attempt bound; callers treat None as "skip this spawn".
    fn random_empty_position(&mut self) -> Option<Position> {
        for _ in 0..SPAWN_ATTEMPTS {
            let pos = Position::new(
                self.rng.gen_range(0..self.board.width),
                self.rng.gen_range(0..self.board.height),
            );

            let occupied = self.players.iter().any(|p| p.snake.contains(&pos))
                || self.food.iter().any(|f| f.position == pos)
                || self.power_ups.iter().any(|p| p.position == pos);

            if !occupied {
                return Some(pos);
            }
        }
        None
    }

    // --- entry points for the sync layer ---

    /// Overwrites a remote player's authoritative fields, creating the
    /// player on first sight. Callers must not route the local player here.
    pub fn apply_remote_player(&mut self, snapshot: &PlayerSnapshot) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == snapshot.id) {
            player.snake = snapshot.snake.clone();
            player.direction = snapshot.direction;
            player.score = snapshot.score;
            player.alive = snapshot.alive;
        } else {
            debug!("Creating remote player {}", snapshot.id);
            let mut player = Player::new(
                &snapshot.id,
                &snapshot.name,
                snapshot.snake.clone(),
                snapshot.color,
            );
            player.direction = snapshot.direction;
            player.score = snapshot.score;
            player.alive = snapshot.alive;
            self.players.push(player);
        }
    }

    pub fn remove_player(&mut self, id: &str) {
        self.players.retain(|p| p.id != id);
        self.move_accum_ms.remove(id);
        self.bots.remove(id);
    }

    pub fn set_food(&mut self, food: Vec<Food>) {
        self.food = food;
    }

    pub fn set_power_ups(&mut self, power_ups: Vec<PowerUp>) {
        self.power_ups = power_ups;
    }

    pub fn set_time_remaining(&mut self, secs: f32) {
        self.time_remaining = Some(secs);
    }

    pub fn remove_food_by_id(&mut self, id: &str) {
        self.food.retain(|f| f.id != id);
    }

    pub fn remove_power_up_by_id(&mut self, id: &str) {
        self.power_ups.retain(|p| p.id != id);
    }

    pub fn mark_dead(&mut self, id: &str) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == id) {
            player.alive = false;
        }
    }

    pub fn force_game_over(&mut self, winner_id: &str) {
        self.status = GameStatus::GameOver;
        self.winner = Some(winner_id.to_string());
    }
}
