mod ui;

use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use itertools::Itertools;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tracing_subscriber::EnvFilter;

use quizbit::{
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, QuizConfig},
    error::SessionError,
    leaderboard::{JsonLeaderboardStore, Leaderboard, LeaderboardStore, PlayerRecord},
    player::PlayerIdentity,
    question::{OptionLetter, QuestionRecord},
    repository::{
        seed_default_bank, EmbeddedQuestionRepository, JsonQuestionRepository, QuestionRepository,
    },
    runtime::{EventLoop, QuizEvent, TerminalInput},
    session::{Phase, Session, SessionContext, SessionEvent},
    util::SessionSummary,
};

const TICK_RATE_MS: u64 = 100;

const RIGHT_ANSWER: [&str; 3] = ["Well done!", "Correct!", "Nice work!"];
const WRONG_ANSWER: [&str; 3] = ["Oops!", "Incorrect!", "Not quite!"];
const TIMED_OUT: &str = "Time's up!";

/// timed multiple-choice trivia with time bonuses and a local top-10 leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Answer multiple-choice questions against the clock. Faster correct answers earn bigger bonuses, and the best ten results are kept on a local leaderboard."
)]
pub struct Cli {
    /// player name shown on the leaderboard
    #[clap(short = 'n', long, required_unless_present = "show_leaderboard")]
    name: Option<String>,

    /// optional contact e-mail, validated but never stored on the leaderboard
    #[clap(short = 'e', long)]
    email: Option<String>,

    /// question bank to play (defaults to the bank in the data directory)
    #[clap(short = 'q', long)]
    questions: Option<PathBuf>,

    /// leaderboard file (defaults to the data directory)
    #[clap(long)]
    leaderboard: Option<PathBuf>,

    /// number of rounds to play
    #[clap(short = 'r', long)]
    rounds: Option<usize>,

    /// seconds allowed to answer each question
    #[clap(long)]
    max_response_secs: Option<f64>,

    /// seconds between rounds
    #[clap(long)]
    delay_secs: Option<f64>,

    /// points for every correct answer, before the time bonus
    #[clap(long)]
    base_points: Option<u32>,

    /// seed question selection for a reproducible order
    #[clap(long)]
    seed: Option<u64>,

    /// restore the built-in question bank in the data directory
    #[clap(long)]
    reset_data: bool,

    /// print the leaderboard and exit
    #[clap(long)]
    show_leaderboard: bool,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command-line overrides on top of the stored configuration
    fn apply_to(&self, mut cfg: QuizConfig) -> QuizConfig {
        if let Some(rounds) = self.rounds {
            cfg.total_rounds_target = rounds;
        }
        if let Some(secs) = self.max_response_secs {
            cfg.max_response_secs = secs;
        }
        if let Some(secs) = self.delay_secs {
            cfg.inter_round_delay_secs = secs;
        }
        if let Some(points) = self.base_points {
            cfg.base_points = points;
        }
        cfg
    }

    fn leaderboard_path(&self) -> PathBuf {
        self.leaderboard
            .clone()
            .unwrap_or_else(AppDirs::leaderboard_path)
    }
}

/// What the results screen shows once a session completes
#[derive(Debug)]
pub struct Results {
    pub record: PlayerRecord,
    pub board: Leaderboard,
    pub rank: Option<usize>,
    pub save_error: Option<String>,
    pub summary: SessionSummary,
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub feedback: Option<&'static str>,
    pub results: Option<Results>,
    questions: Vec<QuestionRecord>,
    leaderboard: JsonLeaderboardStore,
    seed: Option<u64>,
    games_played: u64,
    rng: StdRng,
}

impl App {
    pub fn new(
        context: SessionContext,
        questions: Vec<QuestionRecord>,
        leaderboard: JsonLeaderboardStore,
        seed: Option<u64>,
    ) -> Result<Self, SessionError> {
        let session = Session::new(context, questions.clone(), Self::session_rng(seed, 0))?;
        Ok(Self {
            session,
            feedback: None,
            results: None,
            questions,
            leaderboard,
            seed,
            games_played: 0,
            rng: StdRng::from_entropy(),
        })
    }

    fn session_rng(seed: Option<u64>, game: u64) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(game)),
            None => StdRng::from_entropy(),
        }
    }

    /// Start over with the same player and settings
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.games_played += 1;
        let context = self.session.context().clone();
        self.session = Session::new(
            context,
            self.questions.clone(),
            Self::session_rng(self.seed, self.games_played),
        )?;
        self.feedback = None;
        self.results = None;
        Ok(())
    }

    /// Put the first question on screen
    pub fn begin(&mut self) {
        self.session.load_next();
        self.handle_session_events();
    }

    pub fn on_tick(&mut self, dt: Duration) {
        self.session.on_tick(dt);
        self.handle_session_events();
    }

    /// Answer after bringing the clock up to date, so the time since the
    /// last tick counts. If that runs the clock out, the answer is too late.
    pub fn answer(&mut self, letter: OptionLetter, since_tick: Duration) {
        self.on_tick(since_tick);
        if self.session.submit_answer(letter).is_some() {
            self.handle_session_events();
        }
    }

    fn handle_session_events(&mut self) {
        let events: Vec<SessionEvent> = self.session.drain_events().collect();
        for event in events {
            match event {
                SessionEvent::RoundScored(result) => {
                    let phrases: &[&'static str] = if result.timed_out() {
                        &[TIMED_OUT]
                    } else if result.correct {
                        &RIGHT_ANSWER
                    } else {
                        &WRONG_ANSWER
                    };
                    self.feedback = phrases.choose(&mut self.rng).copied();
                }
                SessionEvent::QuestionShown { .. } => self.feedback = None,
                SessionEvent::Completed(record) => self.record_result(record),
                _ => {}
            }
        }
    }

    fn record_result(&mut self, record: PlayerRecord) {
        let summary = SessionSummary::from_rounds(self.session.history());
        let (board, rank, save_error) = match self.leaderboard.insert(record.clone()) {
            Ok((board, rank)) => (board, rank, None),
            Err(e) => {
                tracing::error!("{e}");
                // the score still shows, it just isn't saved
                let mut board = self.leaderboard.load_or_empty();
                let rank = board.insert(record.clone());
                (board, rank, Some(e.to_string()))
            }
        };
        self.results = Some(Results {
            record,
            board,
            rank,
            save_error,
            summary,
        });
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    // the terminal belongs to the TUI, so logs go to a file
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizbit=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn load_questions(cli: &Cli) -> Result<Vec<QuestionRecord>, quizbit::error::RepositoryError> {
    if let Some(path) = &cli.questions {
        return JsonQuestionRepository::new(path).load();
    }

    let path = AppDirs::questions_path();
    match seed_default_bank(&path, cli.reset_data) {
        Ok(_) => JsonQuestionRepository::new(&path).load(),
        Err(e) => {
            tracing::warn!("cannot seed {}: {e}; using the built-in bank", path.display());
            EmbeddedQuestionRepository.load()
        }
    }
}

fn print_leaderboard(board: &Leaderboard) {
    if board.is_empty() {
        println!("No results yet.");
        return;
    }
    let lines = board
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{:>2}. {:<32} {:>7}", i + 1, e.name, e.score))
        .join("\n");
    println!("{lines}");
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let store = JsonLeaderboardStore::new(cli.leaderboard_path());
    if cli.show_leaderboard {
        print_leaderboard(&store.load_or_empty());
        return Ok(());
    }

    let mut cmd = Cli::command();
    let config_store = FileConfigStore::new();
    let config = cli.apply_to(config_store.load());
    if let Err(e) = config.validate() {
        cmd.error(ErrorKind::ValueValidation, e).exit();
    }
    if cli.save_config {
        config_store.save(&config)?;
    }

    let player = match PlayerIdentity::register(cli.name.as_deref().unwrap_or_default(), cli.email.as_deref()) {
        Ok(player) => player,
        Err(e) => cmd.error(ErrorKind::ValueValidation, e).exit(),
    };

    let questions = match load_questions(&cli) {
        Ok(questions) => questions,
        Err(e) => cmd.error(ErrorKind::Io, e).exit(),
    };

    let mut app = match App::new(SessionContext::new(player, config), questions, store, cli.seed) {
        Ok(app) => app,
        Err(e) => cmd.error(ErrorKind::InvalidValue, e).exit(),
    };

    if !stdin().is_tty() {
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut events = EventLoop::new(
        TerminalInput::spawn(),
        Duration::from_millis(TICK_RATE_MS),
    );

    // show the first question straight away
    app.begin();
    events.catch_up();
    terminal.draw(|f| ui(app, f))?;

    loop {
        match events.step() {
            QuizEvent::Tick(dt) => app.on_tick(dt),
            QuizEvent::Resize => {}
            QuizEvent::Key(key) => match key.code {
                KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char(c) => match app.session.phase() {
                    Phase::AnswerPending => {
                        if let Some(letter) = OptionLetter::from_key(c) {
                            app.answer(letter, events.catch_up());
                        }
                    }
                    Phase::Completed => match c {
                        'n' => {
                            app.reset()?;
                            app.begin();
                            events.catch_up();
                        }
                        'q' => break,
                        _ => {}
                    },
                    _ => {}
                },
                _ => {}
            },
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
