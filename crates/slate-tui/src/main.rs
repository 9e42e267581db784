#![forbid(unsafe_code)]

mod remote;
mod tui;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use remote::MockRemote;
use slate_core::config::load_config;
use std::env;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tui::{agenda::AgendaView, board::BoardView, Shared, ViewAction};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "slate: task and schedule dashboard",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding `.slate/config.toml` (defaults to the cwd).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Seed for the demo backend, for reproducible runs.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Probability in [0, 1] that a remote call fails.
    #[arg(long, default_value_t = 0.15)]
    fail_rate: f64,

    /// Start with the board narrowed to this folder.
    #[arg(long)]
    folder: Option<String>,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SLATE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "slate=debug,info"
        } else {
            "slate=warn"
        })
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(io::stderr))
        .init();
}

enum Active {
    Board,
    Agenda,
}

struct App {
    shared: Shared,
    board: BoardView,
    agenda: AgendaView,
    active: Active,
}

impl App {
    fn new(shared: Shared, folder: Option<String>) -> Self {
        let show_completed = shared.config.show_completed;
        Self {
            shared,
            board: BoardView::new(show_completed, folder),
            agenda: AgendaView::new(),
            active: Active::Board,
        }
    }

    /// Refetch the partition behind the active view.
    ///
    /// The fetch is committed under the epoch taken before it started, so a
    /// mutation landing in between cancels it and the result is dropped.
    fn refresh(&mut self, remote: &MockRemote) {
        let page_size = self.shared.config.page_size;
        match self.active {
            Active::Board => {
                let filter = self.board.filter();
                let epoch = self.shared.cache.begin_task_fetch(&filter);
                let (pages, total) = remote.fetch_tasks(&filter, page_size);
                self.shared
                    .cache
                    .commit_task_fetch(&filter, epoch, pages, total);
            }
            Active::Agenda => {
                let now = Utc::now();
                let filter = self.agenda.filter();
                let epoch = self.shared.cache.begin_schedule_fetch(&filter);
                let (pages, total) = remote.fetch_schedules(&filter, page_size, now);
                self.shared
                    .cache
                    .commit_schedule_fetch(&filter, epoch, pages, total);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = match cli.root {
        Some(root) => root,
        None => env::current_dir().context("resolving working directory")?,
    };
    let config = load_config(&root)?;
    info!(?config, "loaded configuration");

    let remote = MockRemote::new(cli.seed, cli.fail_rate);
    let mut app = App::new(Shared::new(config), cli.folder);

    // Populate both views before the first frame.
    app.refresh(&remote);
    app.active = Active::Agenda;
    app.refresh(&remote);
    app.active = Active::Board;

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("initializing terminal")?;

    let result = run(&mut terminal, &mut app, &remote);

    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("leaving alternate screen")?;
    terminal.show_cursor().context("restoring cursor")?;

    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    remote: &MockRemote,
) -> anyhow::Result<()> {
    let bridge = slate_core::bridge::LogBridge;
    let tick = Duration::from_millis(100);
    let toast_ttl = chrono::Duration::milliseconds(
        i64::try_from(app.shared.config.toast_ttl_ms).unwrap_or(i64::MAX),
    );

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            match app.active {
                Active::Board => app.board.render(frame, area, &app.shared),
                Active::Agenda => app.agenda.render(frame, area, &app.shared, Utc::now()),
            }
        })?;

        if event::poll(tick).context("polling terminal events")? {
            if let Event::Key(key) = event::read().context("reading terminal event")? {
                let action = match app.active {
                    Active::Board => {
                        app.board
                            .handle_key(key, &mut app.shared, remote, &bridge)
                    }
                    Active::Agenda => app.agenda.handle_key(
                        key,
                        &mut app.shared,
                        remote,
                        &bridge,
                        Utc::now(),
                    ),
                };
                match action {
                    Some(ViewAction::Quit) => return Ok(()),
                    Some(ViewAction::SwitchView) => {
                        app.active = match app.active {
                            Active::Board => Active::Agenda,
                            Active::Agenda => Active::Board,
                        };
                        app.refresh(remote);
                    }
                    Some(ViewAction::Refresh) => app.refresh(remote),
                    None => {}
                }
            }
        } else {
            app.shared.toasts.expire(Utc::now(), toast_ttl);
            app.board.on_tick(Instant::now());
        }
    }
}
