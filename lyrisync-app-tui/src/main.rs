mod keys;
mod logging;
mod ui;

use crate::keys::{KeyAction, KeyMap};
use crate::logging::{file_logging_requested, init_tracing};
use crate::ui::View;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lyrisync_core::{
    LyricsCache, LyricsProvider, LyricsProviderType, LyricsResolver, LyrisyncConfig, SyncEngine,
};
use lyrisync_lyrics_lrclib::LrclibProvider;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, Stdout};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn main() {
    // Tracing comes up before the config is fully loaded and validated
    init_tracing(file_logging_requested(&LyrisyncConfig::config_path()));

    let config = match LyrisyncConfig::load_or_create() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            eprintln!("lyrisync: {e}");
            std::process::exit(1);
        }
    };

    let runtime = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            eprintln!("lyrisync: failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let cache_dir = config.lyrics.cache_dir();
    let cache = match LyricsCache::open(&cache_dir) {
        Ok(cache) => cache,
        Err(e) => {
            error!("Failed to initialize lyrics cache at {:?}: {}", cache_dir, e);
            eprintln!("lyrisync: cannot create {}: {e}", cache_dir.display());
            std::process::exit(1);
        }
    };

    let resolver = LyricsResolver::new(cache, create_provider(&config))
        .with_embedded_lyrics(config.lyrics.embedded_lyrics());
    let player = lyrisync_player::player_for(&config.player);
    info!(
        "Following {} (poll every {}ms)",
        config.player.source, config.player.poll_interval_ms
    );
    let mut engine = SyncEngine::new(
        player,
        resolver,
        config.query_timeout(),
        config.ui.scroll_timeout(),
    );

    // Shared by the quit key and SIGINT/SIGTERM
    let cancel_token = CancellationToken::new();
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received termination signal, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    let mut terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(e) => {
            error!("Failed to set up terminal: {e}");
            // Leave the terminal usable even if setup failed halfway
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            eprintln!("lyrisync: failed to set up terminal: {e}");
            std::process::exit(1);
        }
    };

    let result = run(&mut terminal, &runtime, &mut engine, &config, &cancel_token);

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {e}");
    }

    if let Err(e) = result {
        error!("{e}");
        eprintln!("lyrisync: {e}");
        std::process::exit(1);
    }
    info!("Bye");
}

fn create_provider(config: &LyrisyncConfig) -> Option<Box<dyn LyricsProvider>> {
    if !config.lyrics.fetch_enabled {
        info!("Online lyrics fetching disabled");
        return None;
    }

    match config.lyrics.provider {
        LyricsProviderType::Lrclib => {
            info!("Initializing LRCLIB provider");
            match LrclibProvider::new() {
                Ok(provider) => Some(Box::new(provider)),
                Err(e) => {
                    error!("Failed to create LRCLIB provider: {}", e);
                    None
                }
            }
        }
    }
}

fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Tick until quit: poll and match, draw, then wait up to one poll interval for a key.
fn run(
    terminal: &mut Tui,
    runtime: &Runtime,
    engine: &mut SyncEngine,
    config: &LyrisyncConfig,
    cancel_token: &CancellationToken,
) -> io::Result<()> {
    let keymap = KeyMap::new(&config.sync);
    let mut view = View::new(&config.ui);
    let tick = config.poll_interval();

    while !cancel_token.is_cancelled() {
        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        let (lyrics_area, _) = ui::layout(area, view.show_status);

        let frame = runtime.block_on(engine.tick(usize::from(lyrics_area.height)));
        terminal.draw(|f| ui::draw(f, engine.session(), &frame, &view))?;

        if !event::poll(tick)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match keymap.action(key) {
            Some(KeyAction::Quit) => {
                info!("Quit requested");
                cancel_token.cancel();
            }
            Some(KeyAction::CycleAlignment) => view.cycle_alignment(),
            Some(KeyAction::Engine(command)) => engine.apply(command),
            None => {}
        }
    }

    Ok(())
}
