use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use tvgrid_lib::api::{GuideBackend, JsonFileBackend};
use tvgrid_lib::app::{App, AsyncAction};
use tvgrid_lib::config::AppConfig;
use tvgrid_lib::handlers::{async_actions, input};
use tvgrid_lib::ui;

#[derive(clap::Parser, Debug)]
#[command(version, about = "Terminal electronic program guide", long_about = None)]
struct Args {
    /// Guide data JSON file (omit to browse a built-in sample guide)
    #[arg(short, long)]
    data: Option<std::path::PathBuf>,

    /// IANA timezone override (e.g. Europe/Berlin)
    #[arg(short, long)]
    timezone: Option<String>,

    /// Validate the data file and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();
    init_tracing();

    if args.check {
        match &args.data {
            Some(path) => {
                let backend = JsonFileBackend::from_file(path)?;
                println!("OK: {} channels in {}", backend.channel_count(), path.display());
            }
            None => println!("No data file given; nothing to check."),
        }
        return Ok(());
    }

    let backend: Arc<dyn GuideBackend> = match &args.data {
        Some(path) => Arc::new(JsonFileBackend::from_file(path)?),
        None => Arc::new(JsonFileBackend::sample(Utc::now())),
    };

    let mut config = AppConfig::load().unwrap_or_default();
    if let Some(tz) = args.timezone {
        config.timezone = Some(tz);
    }

    // Setup Terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let mut app = App::new(config, backend, Utc::now());
    let (tx, mut rx) = mpsc::channel::<AsyncAction>(32);
    app.request_guide(&tx);

    let res = run_app(&mut terminal, &mut app, tx, &mut rx).await;

    // Restore Terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tx: mpsc::Sender<AsyncAction>,
    rx: &mut mpsc::Receiver<AsyncAction>,
) -> io::Result<()>
where
    std::io::Error: From<<B as ratatui::backend::Backend>::Error>,
{
    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        // completed async work, non-blocking
        while let Ok(action) = rx.try_recv() {
            async_actions::handle_async_action(app, action);
        }

        // shell boundary: the binary just logs these
        for signal in app.drain_signals() {
            tracing::info!(?signal, "shell signal");
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(app, key, Utc::now(), Instant::now(), &tx);
            }
        }

        app.tick(Instant::now(), Utc::now(), &tx);

        if app.should_quit {
            app.scheduler.stop_all();
            return Ok(());
        }
    }
}

/// The TUI owns the terminal, so logs go to a file, and only when
/// RUST_LOG asks for them.
fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let Some(proj_dirs) = directories::ProjectDirs::from("com", "tvgrid", "tvgrid") else {
        return;
    };
    let dir = proj_dirs.data_local_dir();
    if std::fs::create_dir_all(dir).is_err() {
        return;
    }
    if let Ok(file) = std::fs::File::create(dir.join("tvgrid.log")) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .try_init();
    }
}
