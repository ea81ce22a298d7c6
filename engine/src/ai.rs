//! Bot decision making. Each bot keeps a remembered target food and the
//! timestamp of its last real decision; between decisions it reports the
//! player's current heading unchanged.

use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::{Board, Direction, Player, Position};
use std::collections::HashSet;
use std::collections::VecDeque;

/// Visited-cell bound for the survival flood fill.
const OPEN_SPACE_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Insane,
}

impl Difficulty {
    /// Minimum wall-clock gap between two real decisions.
    pub fn reaction_delay_ms(self) -> f64 {
        match self {
            Difficulty::Easy => 300.0,
            Difficulty::Medium => 150.0,
            Difficulty::Hard => 50.0,
            Difficulty::Insane => 0.0,
        }
    }

    /// Chance per eligible decision of deviating from the optimal move.
    fn blunder_chance(self) -> f64 {
        match self {
            Difficulty::Easy => 0.2,
            Difficulty::Medium => 0.1,
            _ => 0.0,
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "insane" => Ok(Difficulty::Insane),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

pub struct BotController {
    difficulty: Difficulty,
    target_food: Option<Position>,
    last_decision_ms: f64,
    rng: StdRng,
}

impl BotController {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_rng(difficulty, StdRng::from_entropy())
    }

    /// Deterministic controller for tests.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, StdRng::seed_from_u64(seed))
    }

    fn with_rng(difficulty: Difficulty, rng: StdRng) -> Self {
        Self {
            difficulty,
            target_food: None,
            last_decision_ms: f64::NEG_INFINITY,
            rng,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Produces the desired heading for this bot. Calls arriving before the
    /// difficulty's reaction delay has elapsed return the current heading.
    pub fn next_direction(
        &mut self,
        player: &Player,
        food: &[Position],
        board: Board,
        others: &[&Player],
        now_ms: f64,
    ) -> Direction {
        if now_ms - self.last_decision_ms < self.difficulty.reaction_delay_ms() {
            return player.direction;
        }
        self.last_decision_ms = now_ms;

        let head = player.head();

        // Re-target only when the remembered food is gone.
        if !self
            .target_food
            .map_or(false, |target| food.contains(&target))
        {
            self.target_food = Self::nearest_food(head, food);
        }

        let safe: Vec<Direction> = Direction::ALL
            .iter()
            .copied()
            .filter(|&dir| dir != player.direction.opposite())
            .filter(|&dir| Self::is_safe(head.step(dir), player, board, others))
            .collect();

        if safe.is_empty() {
            return self.survival_direction(player, board, others);
        }

        if self.difficulty == Difficulty::Easy && self.rng.gen_bool(self.difficulty.blunder_chance())
        {
            return safe[self.rng.gen_range(0..safe.len())];
        }

        let target = match self.target_food {
            Some(target) => target,
            None => {
                // Nothing to chase; hold course if that stays safe.
                return if safe.contains(&player.direction) {
                    player.direction
                } else {
                    safe[0]
                };
            }
        };

        let mut best = safe[0];
        let mut best_dist = i32::MAX;
        for &dir in &safe {
            let dist = head.step(dir).manhattan(target);
            if dist < best_dist {
                best_dist = dist;
                best = dir;
            }
        }

        if self.difficulty == Difficulty::Medium
            && self.rng.gen_bool(self.difficulty.blunder_chance())
        {
            let alternatives: Vec<Direction> =
                safe.iter().copied().filter(|&dir| dir != best).collect();
            if !alternatives.is_empty() {
                return alternatives[self.rng.gen_range(0..alternatives.len())];
            }
        }

        best
    }

    fn nearest_food(head: Position, food: &[Position]) -> Option<Position> {
        food.iter().copied().min_by_key(|f| head.manhattan(*f))
    }

    /// One-step-ahead safety: wall, own body (tail excluded, it vacates),
    /// and every other living player's body.
    fn is_safe(cell: Position, player: &Player, board: Board, others: &[&Player]) -> bool {
        if !board.contains(cell) {
            return false;
        }

        let body_len = player.snake.len().saturating_sub(1);
        if player.snake[..body_len].contains(&cell) {
            return false;
        }

        for other in others {
            if other.alive && other.snake.contains(&cell) {
                return false;
            }
        }

        true
    }

    /// No strictly safe move exists: pick the non-reversing, in-bounds
    /// direction whose cell reaches the most open space. Local heuristic,
    /// not lookahead.
    fn survival_direction(&self, player: &Player, board: Board, others: &[&Player]) -> Direction {
        let head = player.head();
        let mut best = player.direction;
        let mut best_open = 0;

        for dir in Direction::ALL {
            if dir == player.direction.opposite() {
                continue;
            }
            let cell = head.step(dir);
            if !board.contains(cell) {
                continue;
            }
            let open = Self::open_space(cell, player, board, others);
            if open > best_open {
                best_open = open;
                best = dir;
            }
        }

        best
    }

    fn open_space(start: Position, player: &Player, board: Board, others: &[&Player]) -> usize {
        let mut visited: HashSet<Position> = HashSet::new();
        let mut queue: VecDeque<Position> = VecDeque::new();
        queue.push_back(start);
        let mut count = 0;

        while let Some(pos) = queue.pop_front() {
            if count >= OPEN_SPACE_LIMIT {
                break;
            }
            if !visited.insert(pos) {
                continue;
            }
            count += 1;

            for dir in Direction::ALL {
                let next = pos.step(dir);
                if !visited.contains(&next) && Self::cell_is_free(next, player, board, others) {
                    queue.push_back(next);
                }
            }
        }

        count
    }

    fn cell_is_free(pos: Position, player: &Player, board: Board, others: &[&Player]) -> bool {
        if !board.contains(pos) {
            return false;
        }
        if player.snake.contains(&pos) {
            return false;
        }
        for other in others {
            if other.alive && other.snake.contains(&pos) {
                return false;
            }
        }
        true
    }
}
