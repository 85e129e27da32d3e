mod app_state;
mod ui;

use anyhow::{Context, Result};
use app_state::App;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use squiggles_core::{Config, JsonSettingsStore, SettingsStore, ToggleEngine};
use std::{
    env,
    fs::{self, File},
    io,
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config_path = env::var_os("SQUIGGLES_CONFIG").map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("loading squiggles config")?;
    init_tracing(&config);

    let settings = config
        .resolve_settings_path(None)
        .context("could not determine the editor settings path; set SQUIGGLES_SETTINGS")?;
    tracing::info!(path = %settings.display(), "starting squiggles tui");
    let engine = ToggleEngine::new(JsonSettingsStore::new(&settings));
    let mut app = App::new(engine, settings);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "tui loop failed");
        eprintln!("Squiggles TUI error: {err}");
    }

    Ok(())
}

/// Log to a file under the cache dir; stdout belongs to the terminal UI.
fn init_tracing(config: &Config) {
    let Some(dir) = dirs::cache_dir().map(|dir| dir.join("squiggles")) else {
        return;
    };
    let file = fs::create_dir_all(&dir).and_then(|_| File::create(dir.join("squiggles-tui.log")));
    let Ok(file) = file else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn run<B: ratatui::prelude::Backend, S: SettingsStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    while !app.should_quit() {
        app.tick(Instant::now());

        let mut indicator_area = Default::default();
        terminal.draw(|f| indicator_area = ui::draw(f, app))?;
        app.set_indicator_area(indicator_area);

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key.code),
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    app.click(mouse.column, mouse.row)
                }
                _ => {}
            }
        }
    }

    Ok(())
}
