//! Terminal renderer for the binary.
//!
//! The simulation works in pixels; this module letterboxes a pixel viewport
//! onto terminal cells and translates drawables, HUD values and overlays into
//! terminal commands.  No game logic is performed here.

use std::io::Write;
use std::time::Duration;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use wave_shooter::config::Orientation;
use wave_shooter::entities::{Drawable, GameState, GameStatus, Pending, SpriteKind};
use wave_shooter::events::FrameEvent;
use wave_shooter::geometry::{Rect, Vec2};
use wave_shooter::hud::HudSnapshot;
use wave_shooter::leaderboard::ScoreEntry;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LEVEL: Color = Color::Green;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_BOMB: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_GRUNT: Color = Color::Green;
const C_BOSS: Color = Color::Magenta;
const C_BOSS_HP: Color = Color::Red;
const C_SHOT_PLAYER: Color = Color::Cyan;
const C_SHOT_HOSTILE: Color = Color::Magenta;
const C_BLAST: Color = Color::Yellow;
const C_OVERLAY: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

// ── Viewport mapping ──────────────────────────────────────────────────────────

/// Pixels per terminal cell.  Cells are roughly twice as tall as wide.
pub const CELL_W: f32 = 8.0;
pub const CELL_H: f32 = 16.0;
/// The play field is letterboxed to this width / height ratio.
const FIELD_ASPECT: f32 = 4.0 / 3.0;
const BLAST_LIFETIME: Duration = Duration::from_millis(500);

/// Where the play field sits on the terminal.
#[derive(Clone, Copy, Debug)]
pub struct View {
    pub left: u16,
    pub top: u16,
    pub cols: u16,
    pub rows: u16,
    pub term_w: u16,
    pub term_h: u16,
}

impl View {
    /// Row 0 is the HUD, rows 1 and h-2 are borders, the last row the hint.
    pub fn fit(term_w: u16, term_h: u16) -> View {
        let rows = term_h.saturating_sub(4).max(1);
        let max_cols = term_w.saturating_sub(2).max(1);
        let wanted = (rows as f32 * CELL_H * FIELD_ASPECT / CELL_W) as u16;
        let cols = wanted.clamp(1, max_cols);
        View {
            left: 1 + (max_cols - cols) / 2,
            top: 2,
            cols,
            rows,
            term_w,
            term_h,
        }
    }

    /// Viewport size handed to the simulation.
    pub fn pixel_size(&self) -> (f32, f32) {
        (self.cols as f32 * CELL_W, self.rows as f32 * CELL_H)
    }

    /// Cell span covered by `rect`, clipped to the field.  Anything visible
    /// covers at least one cell.
    fn cells(&self, rect: &Rect) -> Option<(u16, u16, u16, u16)> {
        let (px_w, px_h) = self.pixel_size();
        if rect.right < 0.0 || rect.bottom < 0.0 || rect.left >= px_w || rect.top >= px_h {
            return None;
        }
        let c0 = (rect.left.max(0.0) / CELL_W) as u16;
        let r0 = (rect.top.max(0.0) / CELL_H) as u16;
        let c1 = ((rect.right.min(px_w - 1.0) / CELL_W) as u16).max(c0);
        let r1 = ((rect.bottom.min(px_h - 1.0) / CELL_H) as u16).max(r0);
        Some((
            self.left + c0.min(self.cols - 1),
            self.top + r0.min(self.rows - 1),
            (c1 - c0 + 1).min(self.cols - c0.min(self.cols - 1)),
            (r1 - r0 + 1).min(self.rows - r0.min(self.rows - 1)),
        ))
    }

    fn point(&self, p: Vec2) -> Option<(u16, u16)> {
        let rect = Rect { left: p.x, top: p.y, right: p.x, bottom: p.y };
        self.cells(&rect).map(|(c, r, _, _)| (c, r))
    }
}

// ── Renderer-owned effects ────────────────────────────────────────────────────

struct Blast {
    center: Vec2,
    size: f32,
    until: Duration,
}

/// What the renderer keeps between frames: short-lived explosions and the
/// last HUD values it was sent.  None of this feeds back into the game.
#[derive(Default)]
pub struct Screen {
    blasts: Vec<Blast>,
    hud: Option<HudSnapshot>,
}

impl Screen {
    pub fn absorb(&mut self, events: &[FrameEvent], now: Duration) {
        for event in events {
            match event {
                FrameEvent::Explosion { center, size } => self.blasts.push(Blast {
                    center: *center,
                    size: *size,
                    until: now + BLAST_LIFETIME,
                }),
                FrameEvent::Hud(snapshot) => self.hud = Some(*snapshot),
                _ => {}
            }
        }
        self.blasts.retain(|b| b.until > now);
    }

    pub fn clear(&mut self) {
        self.blasts.clear();
        self.hud = None;
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &View,
    screen: &Screen,
    best: &[ScoreEntry],
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    let best_score = best.first().map_or(0, |e| e.score);
    draw_hud(out, state, view, screen, best_score)?;

    for drawable in state.drawables() {
        draw_sprite(out, view, &drawable, state.config.orientation)?;
    }
    for blast in &screen.blasts {
        draw_blast(out, view, blast)?;
    }

    draw_controls_hint(out, view)?;
    draw_overlay(out, state, view, best)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.term_h.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &View) -> std::io::Result<()> {
    let w = view.cols as usize;
    let left = view.left - 1;
    let right = view.left + view.cols;
    let bottom = view.top + view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(left, view.top - 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w))))?;
    out.queue(cursor::MoveTo(left, bottom))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w))))?;

    for row in view.top..bottom {
        out.queue(cursor::MoveTo(left, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(right, row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &View,
    screen: &Screen,
    best_score: u32,
) -> std::io::Result<()> {
    let Some(hud) = screen.hud else {
        return Ok(());
    };

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", hud.score)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(format!("  Best:{:>6}", best_score.max(hud.score))))?;

    let level_str = format!("[ LEVEL {} ]", hud.level.min(state.config.max_level));
    let lx = (view.term_w / 2).saturating_sub(level_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(&level_str))?;

    let bomb_str = format!("{}  ", hud.bomb_label());
    let lives_str = format!("Lives:{}", "♥".repeat(hud.lives as usize));
    let width = (bomb_str.chars().count() + lives_str.chars().count()) as u16;
    out.queue(cursor::MoveTo(view.term_w.saturating_sub(width + 1), 0))?;
    out.queue(style::SetForegroundColor(C_HUD_BOMB))?;
    out.queue(Print(&bomb_str))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives_str))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn fill<W: Write>(
    out: &mut W,
    (col, row, w, h): (u16, u16, u16, u16),
    glyph: &str,
) -> std::io::Result<()> {
    let line = glyph.repeat(w as usize);
    for r in row..row + h {
        out.queue(cursor::MoveTo(col, r))?;
        out.queue(Print(&line))?;
    }
    Ok(())
}

fn draw_sprite<W: Write>(
    out: &mut W,
    view: &View,
    drawable: &Drawable,
    orientation: Orientation,
) -> std::io::Result<()> {
    let along_x = orientation == Orientation::SideScroll;
    match drawable.kind {
        SpriteKind::Player => {
            let Some(cells) = view.cells(&drawable.rect) else {
                return Ok(());
            };
            out.queue(style::SetForegroundColor(C_PLAYER))?;
            fill(out, cells, "█")?;
        }
        SpriteKind::Grunt => {
            let Some(cells) = view.cells(&drawable.rect) else {
                return Ok(());
            };
            out.queue(style::SetForegroundColor(C_GRUNT))?;
            fill(out, cells, "▓")?;
        }
        SpriteKind::Boss => {
            let Some(cells) = view.cells(&drawable.rect) else {
                return Ok(());
            };
            out.queue(style::SetForegroundColor(C_BOSS))?;
            fill(out, cells, "▒")?;
            if let Some(fraction) = drawable.hp_fraction {
                draw_hp_bar(out, view, cells, fraction)?;
            }
        }
        // Shots are drawn at their hit box; the sprite padding would be
        // several cells of nothing.
        SpriteKind::PlayerShot => {
            let Some(cells) = view.cells(&drawable.hitbox) else {
                return Ok(());
            };
            out.queue(style::SetForegroundColor(C_SHOT_PLAYER))?;
            fill(out, cells, if along_x { "─" } else { "║" })?;
        }
        SpriteKind::HostileShot => {
            let Some(cells) = view.cells(&drawable.hitbox) else {
                return Ok(());
            };
            out.queue(style::SetForegroundColor(C_SHOT_HOSTILE))?;
            fill(out, cells, if along_x { "◄" } else { "↓" })?;
        }
    }
    Ok(())
}

fn draw_hp_bar<W: Write>(
    out: &mut W,
    view: &View,
    (col, row, w, _): (u16, u16, u16, u16),
    fraction: f32,
) -> std::io::Result<()> {
    let bar_row = if row > view.top { row - 1 } else { row };
    let filled = (w as f32 * fraction.clamp(0.0, 1.0)).ceil() as usize;
    out.queue(cursor::MoveTo(col, bar_row))?;
    out.queue(style::SetForegroundColor(C_BOSS_HP))?;
    out.queue(Print("━".repeat(filled)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("─".repeat(w as usize - filled.min(w as usize))))?;
    Ok(())
}

fn draw_blast<W: Write>(out: &mut W, view: &View, blast: &Blast) -> std::io::Result<()> {
    let half = blast.size / 2.0;
    let rect = Rect {
        left: blast.center.x - half,
        top: blast.center.y - half / 2.0,
        right: blast.center.x + half,
        bottom: blast.center.y + half / 2.0,
    };
    let cells = view
        .cells(&rect)
        .or_else(|| view.point(blast.center).map(|(c, r)| (c, r, 1, 1)));
    let Some(cells) = cells else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_BLAST))?;
    fill(out, cells, "*")
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &View) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.term_h.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "Arrows / WASD : Move   SPACE / Z / ENTER : Fire   B : Bomb   P : Pause   Q : Quit",
    ))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn overlay_lines(state: &GameState, best: &[ScoreEntry]) -> Vec<(String, Color)> {
    match (state.status, state.pending) {
        (GameStatus::Intro, _) => vec![
            ("★  WAVE  SHOOTER  ★".to_string(), C_OVERLAY),
            (String::new(), C_OVERLAY),
            ("Press ENTER / Z / SPACE to start!".to_string(), Color::White),
        ],
        (GameStatus::InProgress, Some(Pending::Respawn { .. })) => {
            vec![("Respawning...".to_string(), C_OVERLAY)]
        }
        (GameStatus::InProgress, _) if state.user_paused => {
            vec![("Paused  (P to resume)".to_string(), C_OVERLAY)]
        }
        (GameStatus::LevelClear, _) => vec![(format!("Level {}", state.level), C_OVERLAY)],
        (GameStatus::Won, _) => vec![
            ("YOU WON!".to_string(), Color::Yellow),
            (format!("Final Score: {:>6}", state.score), Color::Yellow),
            ("ENTER / Z - Play Again   Q - Quit".to_string(), Color::White),
        ],
        (GameStatus::Lost, _) => {
            let mut lines = vec![
                ("╔════════════════════╗".to_string(), Color::Red),
                ("║    GAME  OVER      ║".to_string(), Color::Red),
                ("╚════════════════════╝".to_string(), Color::Red),
                (format!("Final Score: {:>6}", state.score), Color::Yellow),
            ];
            for (i, entry) in best.iter().take(5).enumerate() {
                lines.push((
                    format!("{}. {:<12} {:>6}", i + 1, entry.name, entry.score),
                    C_HINT,
                ));
            }
            lines.push(("ENTER / Z - Play Again   Q - Quit".to_string(), Color::White));
            lines
        }
        _ => Vec::new(),
    }
}

fn draw_overlay<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &View,
    best: &[ScoreEntry],
) -> std::io::Result<()> {
    let lines = overlay_lines(state, best);
    let cx = view.term_w / 2;
    let start_row = (view.term_h / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}
