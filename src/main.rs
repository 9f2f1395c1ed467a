mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wave_shooter::config::GameConfig;
use wave_shooter::entities::{GameMode, RunOutcome};
use wave_shooter::error::StoreError;
use wave_shooter::persistence::{LastRun, Prefs, Profile, ScoreGateway};
use wave_shooter::session::{Scene, Session};
use wave_shooter::store;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest step fed to the simulation after a stalled frame.
const MAX_DT: f32 = 0.1;

// ── Held keys ─────────────────────────────────────────────────────────────────

/// Min frames between ship movements while a direction key is held.
/// 2 frames @ 30 FPS ≈ 15 moves/sec.
const MOVE_COOLDOWN: u32 = 2;

/// Frames a key stays held after its last press or repeat.  Terminals
/// without release events rely on key repeat (15 Hz or faster) to keep it
/// fresh.
const HOLD_WINDOW: u64 = 4;

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── Files ─────────────────────────────────────────────────────────────────────

fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".wave_shooter")
}

fn config_path() -> PathBuf {
    std::env::var_os("WAVE_SHOOTER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join("config.json"))
}

/// Log to a file: the terminal belongs to the game while it runs.
fn init_logging(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    let path = dir.join("wave_shooter.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {:?}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Block until the next key press.
fn next_key(rx: &mpsc::Receiver<Event>) -> Option<KeyEvent> {
    loop {
        match rx.recv() {
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => return Some(key),
            Ok(_) => {}
            Err(_) => return None,
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(GameMode),
    Leaderboards,
    Store,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    profile: &Profile,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  WAVE  SHOOTER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    let coins = format!("Coins: {}", profile.total_coins());
    out.queue(cursor::MoveTo(
        cx.saturating_sub(coins.chars().count() as u16 / 2),
        cy.saturating_sub(5),
    ))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(&coins))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select mode:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Timed   ", Color::Green,  "Beat the clock, shoot ± for time"),
        ("2", "Survival", Color::Red,    "Three lives, waves keep speeding up"),
        ("L", "Scores  ", Color::Cyan,   "Top 5 per mode"),
        ("S", "Store   ", Color::Yellow, "Spend your coins"),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<9}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" — {}", desc)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 5))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    while let Some(key) = next_key(rx) {
        match key.code {
            KeyCode::Char('1') => return Ok(MenuResult::Start(GameMode::Timed)),
            KeyCode::Char('2') => return Ok(MenuResult::Start(GameMode::Survival)),
            KeyCode::Char('l') | KeyCode::Char('L') => return Ok(MenuResult::Leaderboards),
            KeyCode::Char('s') | KeyCode::Char('S') => return Ok(MenuResult::Store),
            KeyCode::Esc => return Ok(MenuResult::Quit),
            _ if is_quit(&key) => return Ok(MenuResult::Quit),
            _ => {}
        }
    }
    Ok(MenuResult::Quit)
}

fn show_store<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    profile: &mut Profile,
    config: &GameConfig,
) -> std::io::Result<()> {
    let mut notice: Option<String> = None;
    loop {
        display::render_store(out, &config.store, profile, notice.as_deref())?;
        let Some(key) = next_key(rx) else { return Ok(()) };
        let KeyCode::Char(c) = key.code else {
            if key.code == KeyCode::Esc {
                return Ok(());
            }
            continue;
        };
        let Some(slot) = c.to_digit(10).filter(|d| *d >= 1) else {
            if is_quit(&key) || c == 'b' || c == 'B' {
                return Ok(());
            }
            continue;
        };
        let Some(item) = store::listing(&config.store).get(slot as usize - 1).copied() else {
            continue;
        };
        notice = match store::purchase(profile, &config.store, &item.name) {
            Ok(()) => Some(format!("Purchased {}!", item.name)),
            Err(StoreError::InsufficientCoins { .. }) => Some("Not enough coins!".to_string()),
            Err(StoreError::AlreadyOwned(_)) => Some("Already owned.".to_string()),
            Err(e) => {
                warn!("Purchase of {} not saved: {}", item.name, e);
                Some(format!("Purchased {} (not saved)", item.name))
            }
        };
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum GameExit {
    Quit,
    Ended(RunOutcome),
}

/// Runs one session until it ends or the player quits.  Keys are tracked by
/// the frame they were last seen, so steering and firing combine freely.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut Session<&mut Profile>,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<GameExit> {
    let mut rng = thread_rng();

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut move_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Input ────────────────────────────────────────────────────────────
        while let Ok(Event::Key(key)) = rx.try_recv() {
            match key.kind {
                KeyEventKind::Press => {
                    if is_quit(&key) || key.code == KeyCode::Esc {
                        return Ok(GameExit::Quit);
                    }
                    key_frame.insert(key.code, frame);
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(key.code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&key.code);
                }
            }
        }

        // ── Held keys ────────────────────────────────────────────────────────
        let left = any_held(&key_frame, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame);
        let right = any_held(&key_frame, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame);
        let up = any_held(&key_frame, &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')], frame);
        let down = any_held(&key_frame, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')], frame);

        if move_cooldown == 0 && (left || right || up || down) {
            let dx = if left { -2.0 } else if right { 2.0 } else { 0.0 };
            let dy = if up { -1.0 } else if down { 1.0 } else { 0.0 };
            session.move_player(dx, dy);
            move_cooldown = MOVE_COOLDOWN;
        }
        move_cooldown = move_cooldown.saturating_sub(1);

        // Fire rate is enforced by the simulation.
        if is_held(&key_frame, &KeyCode::Char(' '), frame) {
            session.fire();
        }

        let dt = last_tick.elapsed().as_secs_f32().min(MAX_DT);
        last_tick = Instant::now();
        if let Some(Scene::End(outcome)) = session.advance(dt, &mut rng) {
            return Ok(GameExit::Ended(outcome));
        }

        display::render(out, session.world())?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── End scene ─────────────────────────────────────────────────────────────────

enum EndChoice {
    Again,
    Menu,
    Quit,
}

fn show_end<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    profile: &Profile,
    outcome: &RunOutcome,
) -> std::io::Result<EndChoice> {
    // Keys still queued from the run shouldn't skip the results.
    while rx.try_recv().is_ok() {}

    let last = profile.last_run().unwrap_or_else(|| LastRun {
        score: outcome.score,
        coins: outcome.coins,
        message: outcome.reason.message().to_string(),
    });
    display::render_end(out, &last, outcome.mode, profile)?;

    while let Some(key) = next_key(rx) {
        match key.code {
            KeyCode::Char('r') | KeyCode::Char('R') => return Ok(EndChoice::Again),
            KeyCode::Char('m') | KeyCode::Char('M') | KeyCode::Esc => return Ok(EndChoice::Menu),
            _ if is_quit(&key) => return Ok(EndChoice::Quit),
            _ => {}
        }
    }
    Ok(EndChoice::Quit)
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let dir = data_dir();
    if let Err(e) = init_logging(&dir) {
        eprintln!("logging disabled: {:#}", e);
    }
    info!("Starting wave shooter");

    let config = GameConfig::load_or_default(&config_path());
    let mut profile = Profile::load(Prefs::load_or_empty(&dir.join("prefs.json")));

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode().context("enabling raw mode")?;
    out.execute(terminal::EnterAlternateScreen)
        .context("entering alternate screen")?;
    out.execute(cursor::Hide)?;

    // Release events where the terminal supports them; the hold window
    // covers the rest.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread; the loops poll the channel.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &config, &mut profile);

    // Restore the terminal whatever happened.
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!("Exiting");
    result.context("terminal I/O failed")
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &GameConfig,
    profile: &mut Profile,
) -> std::io::Result<()> {
    loop {
        match show_menu(out, rx, profile)? {
            MenuResult::Quit => return Ok(()),
            MenuResult::Leaderboards => {
                display::render_leaderboards(out, profile)?;
                next_key(rx);
            }
            MenuResult::Store => show_store(out, rx, profile, config)?,
            MenuResult::Start(mode) => loop {
                let (width, height) = terminal::size()?;
                let mut session = Session::start(mode, config.clone(), &mut *profile, width, height);
                let outcome = match game_loop(out, &mut session, rx)? {
                    GameExit::Quit => return Ok(()),
                    GameExit::Ended(outcome) => outcome,
                };
                drop(session);

                match show_end(out, rx, profile, &outcome)? {
                    EndChoice::Again => continue,
                    EndChoice::Menu => break,
                    EndChoice::Quit => return Ok(()),
                }
            },
        }
    }
}
