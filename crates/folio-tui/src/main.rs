#![forbid(unsafe_code)]

//! Folio binary entry point.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use folio_core::content::Portfolio;
use folio_tui::app::App;
use folio_tui::cli::Opts;
use folio_tui::links::SystemBrowser;
use folio_tui::logging::{self, LogConfig};
use folio_tui::session::{SessionOptions, TerminalSession};
use folio_tui::transport::HttpTransport;
use folio_tui::view;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Frame interval while something is moving.
const TICK: Duration = Duration::from_millis(16);

/// Input poll interval when the screen is still.
const IDLE_TICK: Duration = Duration::from_millis(100);

fn main() {
    let opts = Opts::parse();

    let log_config = LogConfig::from_env(|key| std::env::var(key).ok());
    if let Err(e) = logging::init(log_config.as_ref()) {
        eprintln!("Failed to start logging: {e}");
        std::process::exit(1);
    }

    let portfolio = match &opts.content {
        Some(path) => Portfolio::load(path),
        None => Portfolio::builtin(),
    };
    let portfolio = match portfolio {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to load content: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&opts, portfolio) {
        eprintln!("Runtime error: {e}");
        std::process::exit(1);
    }
}

fn run(opts: &Opts, portfolio: Portfolio) -> io::Result<()> {
    let session = TerminalSession::new(SessionOptions {
        alternate_screen: true,
        mouse_capture: opts.mouse,
    })?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let size = terminal.size()?;
    let app = App::new(
        portfolio,
        opts,
        (size.width, size.height),
        Arc::new(HttpTransport::default()),
        Box::new(SystemBrowser),
    );
    let result = run_loop(&mut terminal, app, opts.exit_after_ms);
    drop(session);
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App,
    exit_after_ms: u64,
) -> io::Result<()> {
    let start = Instant::now();
    let exit_at = (exit_after_ms > 0).then(|| Duration::from_millis(exit_after_ms));
    loop {
        let now = start.elapsed();
        app.tick(now);
        terminal.draw(|f| view::draw(f, &app))?;

        if app.should_quit() {
            break;
        }
        if exit_at.is_some_and(|at| now >= at) {
            tracing::info!("exit-after deadline reached");
            break;
        }

        let wait = if app.is_animating() { TICK } else { IDLE_TICK };
        if event::poll(wait)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }
    }
    Ok(())
}
