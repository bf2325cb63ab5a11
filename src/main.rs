mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use wave_shooter::audio::{AudioError, AudioSink, Sound};
use wave_shooter::compute::{
    init_state, player_shoot, press_bomb, press_fire, resize, restart, tick, toggle_pause,
    FrameGate, InputState,
};
use wave_shooter::config::GameConfig;
use wave_shooter::entities::{GameState, GameStatus};
use wave_shooter::events::dispatch;
use wave_shooter::leaderboard::ScoreFile;

use display::{Screen, View};

/// A key counts as held if its last press/repeat arrived within this window.
/// Covers terminals that never send release events: OS key repeat runs at
/// 15 Hz or more, so a held key refreshes before it expires.
const HOLD_WINDOW: Duration = Duration::from_millis(130);

/// Sleep between input polls; the frame gate decides when a tick runs.
const POLL_SLEEP: Duration = Duration::from_millis(2);

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Variant {
    /// Player on the left, waves sweeping in from the right.
    SideScroller,
    /// Player at the bottom, waves flying in from the top.
    TopDown,
}

#[derive(Debug, Parser)]
#[command(name = "wave_shooter", about = "Fixed-timestep arcade shooter in the terminal")]
struct Args {
    #[arg(long, value_enum, default_value = "side-scroller")]
    variant: Variant,

    /// JSON game configuration; overrides --variant.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name recorded on the score table.
    #[arg(long, default_value = "Pilot")]
    player: String,

    /// Score table file [default: $HOME/.wave_shooter_scores.json]
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Write logs here.  Without it logs go to wave_shooter.log, and only
    /// when RUST_LOG is set.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fixed RNG seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Ring the terminal bell on every shot.
    #[arg(long)]
    bell: bool,
}

impl Args {
    fn scores_path(&self) -> PathBuf {
        self.scores.clone().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".wave_shooter_scores.json")
        })
    }

    fn game_config(&self) -> Result<GameConfig> {
        if let Some(path) = &self.config {
            return GameConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()));
        }
        Ok(match self.variant {
            Variant::SideScroller => GameConfig::side_scroller(),
            Variant::TopDown => GameConfig::top_down(),
        })
    }
}

// The terminal is in raw mode, so logs go to a file or nowhere.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None if std::env::var_os("RUST_LOG").is_some() => PathBuf::from("wave_shooter.log"),
        None => return Ok(()),
    };
    let file = File::create(&path).with_context(|| format!("creating log {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// The only sound a terminal has.  Shots ring the bell when enabled; there
/// is no way to loop music.
struct TerminalBell {
    enabled: bool,
}

impl AudioSink for TerminalBell {
    fn play(&mut self, sound: Sound) -> Result<(), AudioError> {
        match sound {
            Sound::Shoot if self.enabled => {
                let mut err = std::io::stderr();
                err.write_all(b"\x07")
                    .and_then(|_| err.flush())
                    .map_err(|_| AudioError::Blocked(sound))
            }
            Sound::Shoot => Ok(()),
            Sound::Music => Err(AudioError::Blocked(sound)),
        }
    }
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Returns true if `key` was seen within the last `HOLD_WINDOW`.
fn is_held(held: &HashMap<KeyCode, Instant>, key: &KeyCode, now: Instant) -> bool {
    held.get(key)
        .map(|&last| now.saturating_duration_since(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(held: &HashMap<KeyCode, Instant>, keys: &[KeyCode], now: Instant) -> bool {
    keys.iter().any(|k| is_held(held, k, now))
}

fn held_input(held: &HashMap<KeyCode, Instant>, now: Instant) -> InputState {
    use KeyCode::{Char, Down, Left, Right, Up};
    InputState {
        up: any_held(held, &[Up, Char('w'), Char('W')], now),
        down: any_held(held, &[Down, Char('s'), Char('S')], now),
        left: any_held(held, &[Left, Char('a'), Char('A')], now),
        right: any_held(held, &[Right, Char('d'), Char('D')], now),
    }
}

fn fire_held(held: &HashMap<KeyCode, Instant>, now: Instant) -> bool {
    any_held(
        held,
        &[KeyCode::Char(' '), KeyCode::Enter, KeyCode::Char('z'), KeyCode::Char('Z')],
        now,
    )
}

fn is_fire(code: &KeyCode) -> bool {
    matches!(code, KeyCode::Char(' ' | 'z' | 'Z') | KeyCode::Enter)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

struct Session {
    state: GameState,
    view: View,
    screen: Screen,
    scores: ScoreFile,
    audio: TerminalBell,
    rng: StdRng,
    player: String,
}

enum Flow {
    Continue,
    Quit,
}

impl Session {
    /// One-shot actions on press.  Movement and held fire are sampled per tick.
    fn on_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Duration) -> Flow {
        match code {
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Flow::Quit,
            KeyCode::Char('r' | 'R') => {
                restart(&mut self.state);
                self.screen.clear();
            }
            KeyCode::Char('p' | 'P') => {
                toggle_pause(&mut self.state);
            }
            KeyCode::Char('b' | 'B') => {
                press_bomb(&mut self.state, now, &mut self.rng);
            }
            code if is_fire(&code) => {
                let was_over = matches!(self.state.status, GameStatus::Won | GameStatus::Lost);
                press_fire(&mut self.state, now, &mut self.rng);
                if was_over {
                    self.screen.clear();
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn on_resize(&mut self, cols: u16, rows: u16) {
        self.view = View::fit(cols, rows);
        let (w, h) = self.view.pixel_size();
        resize(&mut self.state, w, h);
    }

    fn step(&mut self, now: Duration, input: InputState, fire: bool) {
        if fire && self.state.status == GameStatus::InProgress && !self.state.paused() {
            player_shoot(&mut self.state);
        }
        tick(&mut self.state, now, input, &mut self.rng);
        let events = self.state.drain_events();
        let rest = dispatch(events, &mut self.audio, &mut self.scores, &self.player);
        self.screen.absorb(&rest, now);
    }
}

/// Input model: a `held` map records when each key was last pressed or
/// repeated.  Every tick samples which keys are still fresh, so fire and a
/// direction can be held together.  Keyboard-enhancement terminals send
/// releases and keys drop out at once; classic terminals only send presses
/// and keys expire after `HOLD_WINDOW` of silence.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
) -> Result<()> {
    let epoch = Instant::now();
    let mut gate = FrameGate::new(session.state.config.tick_interval());
    let mut held: HashMap<KeyCode, Instant> = HashMap::new();

    loop {
        let wall = Instant::now();
        let now = wall.duration_since(epoch);

        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        held.insert(code, wall);
                        if let Flow::Quit = session.on_key(code, modifiers, now) {
                            return Ok(());
                        }
                    }
                    KeyEventKind::Repeat => {
                        held.insert(code, wall);
                    }
                    KeyEventKind::Release => {
                        held.remove(&code);
                    }
                },
                Event::Resize(cols, rows) => session.on_resize(cols, rows),
                _ => {}
            }
        }

        if gate.ready(now) {
            session.step(now, held_input(&held, wall), fire_held(&held, wall));
            display::render(
                out,
                &session.state,
                &session.view,
                &session.screen,
                session.scores.board().entries(),
            )
            .context("drawing frame")?;
        }

        thread::sleep(POLL_SLEEP);
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = args.game_config()?;
    let scores_path = args.scores_path();
    let scores = ScoreFile::open(&scores_path)
        .with_context(|| format!("opening score table {}", scores_path.display()))?;
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (cols, rows) = terminal::size().context("reading terminal size")?;
    let view = View::fit(cols, rows);
    let (w, h) = view.pixel_size();
    info!("starting {:?} at {}x{} px", config.orientation, w, h);

    let mut session = Session {
        state: init_state(config, w, h),
        view,
        screen: Screen::default(),
        scores,
        audio: TerminalBell { enabled: args.bell },
        rng,
        player: args.player.clone(),
    };

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Terminals without the kitty protocol fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking event reads live on their own thread so the loop never waits.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = game_loop(&mut out, &mut session, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        warn!("exiting on error: {e:#}");
    }
    result
}
