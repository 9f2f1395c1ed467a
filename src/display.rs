/// Terminal drawing for the game, end, leaderboard and store screens.
///
/// Reads `World` and `Profile`, never changes them.  Commands are queued and
/// flushed once per screen.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use wave_shooter::config::{ItemCategory, StoreConfig};
use wave_shooter::entities::{Enemy, EnemyKind, Explosion, GameMode, Laser, World};
use wave_shooter::persistence::{LastRun, Profile, ScoreGateway};
use wave_shooter::run::{countdown_label, timer_label};
use wave_shooter::store;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_DANGER: Color = Color::DarkRed;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_MODE: Color = Color::Cyan;
const C_HUD_TIMER: Color = Color::White;
const C_HUD_LIVES: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_ENEMY_NORMAL: Color = Color::Green;
const C_ENEMY_TIME_ADD: Color = Color::Cyan;
const C_ENEMY_TIME_SUB: Color = Color::Magenta;
const C_LASER: Color = Color::Cyan;
const C_EXPLOSION: Color = Color::Yellow;
const C_COUNTDOWN: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

fn cell(v: f32) -> u16 {
    v.round().max(0.0) as u16
}

fn centered<W: Write>(out: &mut W, width: u16, row: u16, text: &str, color: Color) -> std::io::Result<()> {
    let col = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one complete game frame.
pub fn render<W: Write>(out: &mut W, world: &World) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, world)?;
    draw_hud(out, world)?;

    for enemy in &world.enemies {
        draw_enemy(out, enemy, world)?;
    }
    for laser in &world.lasers {
        draw_laser(out, laser)?;
    }
    for explosion in &world.explosions {
        draw_explosion(out, explosion)?;
    }

    draw_player(out, world)?;
    draw_controls_hint(out, world.bounds.term_height)?;

    if let Some(label) = countdown_label(&world.run) {
        let row = world.bounds.term_height / 2;
        centered(out, world.bounds.term_width, row, &label, C_COUNTDOWN)?;
    }

    // Cursor parked on the hint row.
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, world.bounds.term_height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, world: &World) -> std::io::Result<()> {
    let w = world.bounds.term_width as usize;
    let h = world.bounds.term_height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1 — top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2 — bottom bar doubles as the danger zone
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(style::SetForegroundColor(C_DANGER))?;
    out.queue(Print(format!("└{}┘", "╌".repeat(w.saturating_sub(2)))))?;

    // Side walls
    out.queue(style::SetForegroundColor(C_BORDER))?;
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(world.bounds.term_width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, world: &World) -> std::io::Result<()> {
    let run = &world.run;

    // Score — left
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", run.score)))?;

    // Mode — centre
    let mode_str = format!("[ {} ]", run.mode.display_name());
    centered(out, world.bounds.term_width, 0, &mode_str, C_HUD_MODE)?;

    // Lives (Survival only) + timer — right
    let lives_str = match run.mode {
        GameMode::Survival => format!("Lives:{}  ", "♥".repeat(run.lives as usize)),
        GameMode::Timed => String::new(),
    };
    let timer_str = timer_label(run.clock);
    let right_len = lives_str.chars().count() + timer_str.chars().count();
    let rx = world.bounds.term_width.saturating_sub(right_len as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;

    if !lives_str.is_empty() {
        out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
        out.queue(Print(&lives_str))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_TIMER))?;
    out.queue(Print(&timer_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, world: &World) -> std::io::Result<()> {
    // Sprite (2 rows, 3 cols):
    //   ▲       ← row y      (tip)
    //  /█\      ← row y+1    (fuselage + wings)
    let p = &world.player;
    out.queue(style::SetForegroundColor(C_PLAYER))?;

    out.queue(cursor::MoveTo(cell(p.x), cell(p.y)))?;
    out.queue(Print("▲"))?;
    out.queue(cursor::MoveTo(cell(p.x - 1.0), cell(p.y + 1.0)))?;
    out.queue(Print("/█\\"))?;

    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &Enemy, world: &World) -> std::io::Result<()> {
    let (top, bottom, color) = match enemy.kind {
        EnemyKind::Normal => ("«▼»", "╚═╝", C_ENEMY_NORMAL),
        EnemyKind::TimeAdd => ("(+)", "╰─╯", C_ENEMY_TIME_ADD),
        EnemyKind::TimeSubtract => ("(-)", "╰─╯", C_ENEMY_TIME_SUB),
    };
    let lx = cell(enemy.x - 1.0);
    let row = cell(enemy.y);

    out.queue(style::SetForegroundColor(color))?;
    out.queue(cursor::MoveTo(lx, row))?;
    out.queue(Print(top))?;
    if (enemy.y + 1.0) < world.bounds.danger_y + 1.0 {
        out.queue(cursor::MoveTo(lx, row + 1))?;
        out.queue(Print(bottom))?;
    }
    Ok(())
}

fn draw_laser<W: Write>(out: &mut W, laser: &Laser) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(cell(laser.x), cell(laser.y)))?;
    out.queue(style::SetForegroundColor(C_LASER))?;
    out.queue(Print("║"))?;
    Ok(())
}

fn draw_explosion<W: Write>(out: &mut W, explosion: &Explosion) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(cell(explosion.x - 1.0), cell(explosion.y)))?;
    out.queue(style::SetForegroundColor(C_EXPLOSION))?;
    out.queue(Print("*✸*"))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → ↑ ↓ / WASD : Move   SPACE : Shoot   Q : Quit"))?;
    Ok(())
}

// ── End scene ─────────────────────────────────────────────────────────────────

/// Results of the run that just finished, with the mode's leaderboard.
pub fn render_end<W: Write>(
    out: &mut W,
    last: &LastRun,
    mode: GameMode,
    profile: &Profile,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;

    let banner = format!("║ {:^18} ║", last.message);
    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Red),
        (banner.as_str(), Color::Red),
        ("╚════════════════════╝", Color::Red),
    ];

    let start_row = (height / 2).saturating_sub(8);
    for (i, (msg, color)) in lines.iter().enumerate() {
        centered(out, width, start_row + i as u16, msg, *color)?;
    }

    let mut row = start_row + lines.len() as u16 + 1;
    centered(out, width, row, &format!("Score: {:>6}", last.score), Color::Yellow)?;
    row += 1;
    centered(out, width, row, &format!("Coins earned: {:>3}", last.coins), Color::Yellow)?;
    row += 1;
    centered(out, width, row, &format!("Total coins: {:>4}", profile.total_coins()), Color::DarkGrey)?;

    row += 2;
    row = draw_leaderboard(out, width, row, mode, &profile.leaderboard(mode), Some(last.score))?;

    centered(out, width, row + 1, "R - Play Again   M - Menu   Q - Quit", Color::White)?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

/// Returns the row after the last line drawn.
fn draw_leaderboard<W: Write>(
    out: &mut W,
    width: u16,
    row: u16,
    mode: GameMode,
    scores: &[u32],
    highlight: Option<u32>,
) -> std::io::Result<u16> {
    centered(out, width, row, &format!("── {} top 5 ──", mode.display_name()), Color::Cyan)?;
    if scores.is_empty() {
        centered(out, width, row + 1, "no scores yet", C_HINT)?;
        return Ok(row + 2);
    }
    let mut highlighted = false;
    for (rank, score) in scores.iter().enumerate() {
        let mine = !highlighted && highlight == Some(*score);
        highlighted |= mine;
        let color = if mine { Color::Yellow } else { Color::White };
        let line = format!("{}. {:>6}", rank + 1, score);
        centered(out, width, row + 1 + rank as u16, &line, color)?;
    }
    Ok(row + 1 + scores.len() as u16)
}

// ── Menu screens ──────────────────────────────────────────────────────────────

pub fn render_leaderboards<W: Write>(out: &mut W, profile: &Profile) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;

    let mut row = (height / 2).saturating_sub(8);
    centered(out, width, row, "★  LEADERBOARDS  ★", Color::Cyan)?;
    row += 2;
    for mode in [GameMode::Timed, GameMode::Survival] {
        row = draw_leaderboard(out, width, row, mode, &profile.leaderboard(mode), None)?;
        row += 1;
    }
    centered(out, width, row + 1, "Any key - Back", C_HINT)?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

pub fn render_store<W: Write>(
    out: &mut W,
    catalogue: &StoreConfig,
    profile: &Profile,
    notice: Option<&str>,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;

    let mut row = (height / 2).saturating_sub(8);
    centered(out, width, row, "★  STORE  ★", Color::Cyan)?;
    row += 1;
    let balance = format!("Coin Balance: {}", profile.total_coins());
    centered(out, width, row, &balance, Color::Yellow)?;
    row += 2;

    // Slots run on across tabs, matching `store::listing`.
    let left = (width / 2).saturating_sub(14);
    let mut slot = 1;
    for category in ItemCategory::ALL {
        out.queue(cursor::MoveTo(left, row))?;
        out.queue(style::SetForegroundColor(Color::Cyan))?;
        out.queue(Print(format!("── {} ──", category.title())))?;
        row += 1;

        for item in store::items_in(catalogue, category) {
            let price = if profile.is_unlocked(&item.name) {
                "Owned".to_string()
            } else {
                format!("{} Coins", item.price)
            };
            out.queue(cursor::MoveTo(left, row))?;
            out.queue(style::SetForegroundColor(Color::DarkGrey))?;
            out.queue(Print(format!("[{}] ", slot)))?;
            out.queue(style::SetForegroundColor(Color::White))?;
            out.queue(Print(format!("{:<12} {:>9}", item.name, price)))?;
            slot += 1;
            row += 1;
        }
        row += 1;
    }

    if let Some(msg) = notice {
        centered(out, width, row, msg, Color::Red)?;
    }
    centered(out, width, row + 2, "1-9 - Buy   Esc - Back", C_HINT)?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}
