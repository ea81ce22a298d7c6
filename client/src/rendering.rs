use engine::game::SnakeGame;
use macroquad::prelude::*;
use shared::{GameStatus, Player, Position, PowerUpKind, Rgb};

const HUD_HEIGHT: f32 = 48.0;

pub struct Renderer {
    cell: f32,
    board_w: f32,
    board_h: f32,
}

impl Renderer {
    pub fn new(game: &SnakeGame) -> Result<Self, Box<dyn std::error::Error>> {
        let board = game.board();
        if board.width == 0 || board.height == 0 {
            return Err("board dimensions must be non-zero".into());
        }
        let cell = board.cell_size as f32;
        Ok(Renderer {
            cell,
            board_w: board.width as f32 * cell,
            board_h: board.height as f32 * cell,
        })
    }

    pub fn render(&mut self, game: &SnakeGame) {
        clear_background(Color::from_rgba(10, 10, 18, 255));

        self.draw_grid();

        for food in game.food() {
            self.draw_food(food.position);
        }

        for power_up in game.power_ups() {
            self.draw_power_up(power_up.position, power_up.kind);
        }

        // Dead snakes stay on the board as dimmed corpses.
        for player in game.players() {
            self.draw_snake(player);
        }

        self.draw_hud(game);
        self.draw_overlay(game);
    }

    fn cell_rect(&self, pos: Position) -> (f32, f32) {
        (pos.x as f32 * self.cell, HUD_HEIGHT + pos.y as f32 * self.cell)
    }

    fn draw_grid(&mut self) {
        let top = HUD_HEIGHT;
        let grid_color = Color::from_rgba(30, 30, 46, 255);

        let mut x = 0.0;
        while x <= self.board_w {
            draw_line(x, top, x, top + self.board_h, 1.0, grid_color);
            x += self.cell;
        }
        let mut y = top;
        while y <= top + self.board_h {
            draw_line(0.0, y, self.board_w, y, 1.0, grid_color);
            y += self.cell;
        }

        draw_rectangle_lines(
            0.0,
            top,
            self.board_w,
            self.board_h,
            2.0,
            Color::from_rgba(57, 255, 20, 255),
        );
    }

    fn draw_food(&mut self, pos: Position) {
        let (x, y) = self.cell_rect(pos);
        let pad = self.cell * 0.15;
        draw_rectangle(
            x + pad,
            y + pad,
            self.cell - pad * 2.0,
            self.cell - pad * 2.0,
            Color::from_rgba(255, 71, 87, 255),
        );
    }

    fn draw_power_up(&mut self, pos: Position, kind: PowerUpKind) {
        let (x, y) = self.cell_rect(pos);
        let info = kind.info();
        let cx = x + self.cell / 2.0;
        let cy = y + self.cell / 2.0;

        draw_circle(cx, cy, self.cell * 0.45, to_color(info.color, 255));
        draw_text(
            info.icon,
            cx - self.cell * 0.25,
            cy + self.cell * 0.3,
            self.cell,
            WHITE,
        );
    }

    fn draw_snake(&mut self, player: &Player) {
        let ghost = player.has_power_up(PowerUpKind::Ghost);
        for (i, segment) in player.snake.iter().enumerate() {
            let (x, y) = self.cell_rect(*segment);

            let color = if !player.alive {
                Color::from_rgba(90, 90, 90, 140)
            } else {
                let alpha = if ghost { 110 } else { 255 };
                let mut c = to_color(player.color, alpha);
                if i > 0 {
                    // Body segments slightly darker than the head.
                    c.r *= 0.7;
                    c.g *= 0.7;
                    c.b *= 0.7;
                }
                c
            };

            draw_rectangle(x + 1.0, y + 1.0, self.cell - 2.0, self.cell - 2.0, color);
        }
    }

    fn draw_hud(&mut self, game: &SnakeGame) {
        draw_rectangle(
            0.0,
            0.0,
            self.board_w,
            HUD_HEIGHT,
            Color::from_rgba(18, 18, 28, 255),
        );

        let mut x = 10.0;
        for player in game.players() {
            let label = format!("{}: {}", player.name, player.score);
            let color = if player.alive {
                to_color(player.color, 255)
            } else {
                GRAY
            };
            draw_text(&label, x, 20.0, 18.0, color);

            // Active effect badges under the score.
            let mut badge_x = x;
            for active in &player.active_power_ups {
                draw_text(active.kind.info().icon, badge_x, 40.0, 16.0, WHITE);
                badge_x += 18.0;
            }

            x += measure_text(&label, None, 18, 1.0).width.max(80.0) + 20.0;
        }

        if let Some(remaining) = game.time_remaining() {
            let secs = remaining.max(0.0).ceil() as u32;
            let text = format!("{}:{:02}", secs / 60, secs % 60);
            let color = if secs <= 10 { RED } else { WHITE };
            draw_text(&text, self.board_w - 60.0, 28.0, 26.0, color);
        }
    }

    fn draw_overlay(&mut self, game: &SnakeGame) {
        let text = match game.status() {
            GameStatus::Paused => Some(("PAUSED", WHITE)),
            GameStatus::GameOver => Some(("GAME OVER", RED)),
            GameStatus::Waiting => Some(("WAITING FOR PLAYERS", WHITE)),
            _ => None,
        };
        let Some((text, color)) = text else {
            return;
        };

        draw_rectangle(
            0.0,
            HUD_HEIGHT,
            self.board_w,
            self.board_h,
            Color::from_rgba(0, 0, 0, 150),
        );

        let size = 48.0;
        let dims = measure_text(text, None, size as u16, 1.0);
        let cx = (self.board_w - dims.width) / 2.0;
        let cy = HUD_HEIGHT + self.board_h / 2.0;
        draw_text(text, cx, cy, size, color);

        if game.status() == GameStatus::GameOver {
            let line = match game.winner() {
                Some(id) => {
                    let name = game
                        .player(id)
                        .map(|p| p.name.as_str())
                        .unwrap_or(id)
                        .to_string();
                    format!("{} wins! Press R to restart", name)
                }
                None => "Draw! Press R to restart".to_string(),
            };
            let dims = measure_text(&line, None, 22, 1.0);
            draw_text(&line, (self.board_w - dims.width) / 2.0, cy + 40.0, 22.0, WHITE);
        }
    }

    pub fn window_size(&self) -> (f32, f32) {
        (self.board_w, HUD_HEIGHT + self.board_h)
    }
}

fn to_color(rgb: Rgb, alpha: u8) -> Color {
    Color::from_rgba(rgb.r, rgb.g, rgb.b, alpha)
}
