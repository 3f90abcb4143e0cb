mod app;
mod cache;
mod config;
mod error;
mod filter;
mod github;
mod logging;
mod message;
mod platform;
mod selection;
mod store;
mod ui;

use anyhow::{bail, Result};
use app::App;
use cache::CacheManager;
use clap::{Parser, Subcommand};
use config::Settings;
use crossterm::{
    event::{
        DisableFocusChange, EnableFocusChange, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use github::GitHubClient;
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use store::{FileCacheStore, FileSettingsStore, SettingsStore};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

type Manager = CacheManager<FileCacheStore, GitHubClient>;

#[derive(Parser, Debug)]
#[command(name = "reposcout", version)]
#[command(about = "Search repositories across your GitHub organizations", long_about = None)]
struct Args {
    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    config: Option<String>,

    /// GitHub token for this run, overrides the saved one
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive search (default)
    Tui {
        /// Keep running after opening a repository
        #[arg(long)]
        keep_open: bool,
    },
    /// Print the repositories matching a query
    List {
        /// Keywords, all of which must match
        query: Vec<String>,
    },
    /// Save settings and clear the cached repository list
    Configure {
        /// Organization to search (repeatable, order is kept)
        #[arg(long = "org", required = true)]
        orgs: Vec<String>,

        /// Token to save; keeps the saved one when omitted
        #[arg(long)]
        token: Option<String>,

        /// Minutes a fetched list stays fresh
        #[arg(long)]
        cache_minutes: Option<u64>,
    },
    /// Delete the cached repository list
    ClearCache,
}

/// Where settings and the cache live, plus per-run overrides
struct Context {
    settings_store: FileSettingsStore,
    cache_path: PathBuf,
    token_override: Option<String>,
}

impl Context {
    async fn load_settings(&self) -> Settings {
        let mut settings = self.settings_store.load_or_default().await;
        if let Some(ref token) = self.token_override {
            settings.token = token.clone();
        }
        settings
    }

    fn cache_store(&self) -> FileCacheStore {
        FileCacheStore::new(&self.cache_path)
    }

    fn manager(&self, settings: &Settings) -> Result<Manager> {
        let client = GitHubClient::from_settings(settings)?;
        Ok(CacheManager::new(self.cache_store(), client))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = match logging::init(&Settings::cache_dir(), args.debug) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };

    // Expand ~ in path
    let config_path = args
        .config
        .as_deref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()))
        .unwrap_or_else(Settings::config_path);

    let ctx = Context {
        settings_store: FileSettingsStore::new(config_path),
        cache_path: Settings::cache_path(),
        token_override: args.token.filter(|t| !t.trim().is_empty()),
    };

    match args.command.unwrap_or(Commands::Tui { keep_open: false }) {
        Commands::Tui { keep_open } => run_tui(&ctx, keep_open).await,
        Commands::List { query } => run_list(&ctx, &query.join(" ")).await,
        Commands::Configure { orgs, token, cache_minutes } => {
            run_configure(&ctx, &orgs, token, cache_minutes).await
        }
        Commands::ClearCache => run_clear_cache(&ctx).await,
    }
}

async fn run_list(ctx: &Context, query: &str) -> Result<()> {
    let settings = ctx.load_settings().await;
    if !settings.has_organizations() {
        bail!("No organizations configured. Run `reposcout configure --org <name>` first.");
    }

    let manager = ctx.manager(&settings)?;
    let repos = manager
        .load_repos(&settings, &CancellationToken::new())
        .await?;

    let mut app = App::new(settings);
    app.set_repos(repos);
    app.set_query(query);

    for repo in app.filtered_repos() {
        match repo.description {
            Some(ref desc) => println!("{}/{}\t{}\t{}", repo.org, repo.name, repo.url, desc),
            None => println!("{}/{}\t{}", repo.org, repo.name, repo.url),
        }
    }
    let count = app.count_text();
    if count.is_empty() {
        eprintln!("No repositories found");
    } else {
        eprintln!("{count}");
    }
    Ok(())
}

async fn run_configure(
    ctx: &Context,
    orgs: &[String],
    token: Option<String>,
    cache_minutes: Option<u64>,
) -> Result<()> {
    let current = ctx.settings_store.load_or_default().await;
    let settings = Settings::from_input(
        orgs,
        token.as_deref().unwrap_or(&current.token),
        cache_minutes.unwrap_or(current.cache_minutes),
        &current,
    )?;

    ctx.settings_store.save(&settings).await?;
    info!(orgs = settings.organizations.len(), "Settings saved");

    // Saved settings always invalidate the cached list
    let response = message::handle(&message::Request::ClearCache, &ctx.cache_store()).await;
    if !response.success {
        bail!("Settings saved, but the repository cache could not be cleared");
    }

    println!(
        "Settings saved to {} ({} organization{})",
        ctx.settings_store.path().display(),
        settings.organizations.len(),
        if settings.organizations.len() == 1 { "" } else { "s" },
    );
    Ok(())
}

async fn run_clear_cache(ctx: &Context) -> Result<()> {
    let response = message::handle(&message::Request::ClearCache, &ctx.cache_store()).await;
    if response.success {
        println!("Cache cleared");
        Ok(())
    } else {
        bail!("Could not clear the repository cache");
    }
}

async fn run_tui(ctx: &Context, keep_open: bool) -> Result<()> {
    let settings = ctx.load_settings().await;
    let mut app = App::new(settings);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, ctx, keep_open).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableFocusChange)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// What the event loop should do after a key press
#[derive(Debug, PartialEq)]
enum Outcome {
    Continue,
    Quit,
    Open(String),
    Copy(String),
    Reload,
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    ctx: &Context,
    keep_open: bool,
) -> Result<()> {
    let mut events = EventStream::new();
    // Redraw periodically so transient notices expire
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let mut manager = ctx.manager(&app.settings)?;

    if !app.needs_setup() && !load(terminal, app, &manager, &mut events).await? {
        return Ok(());
    }

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let event = tokio::select! {
            _ = ticker.tick() => continue,
            event = events.next() => event,
        };

        let Some(event) = event else {
            return Ok(());
        };

        match event? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match handle_key(app, key) {
                Outcome::Continue => {}
                Outcome::Quit => return Ok(()),
                Outcome::Open(url) => match platform::open_url(&url).await {
                    Ok(()) if !keep_open => return Ok(()),
                    Ok(()) => app.notify(format!("Opened {url}")),
                    Err(e) => {
                        warn!("{e:#}");
                        app.notify(format!("Error: {e}"));
                    }
                },
                Outcome::Copy(command) => match platform::copy_to_clipboard(&command) {
                    Ok(()) => app.notify("Copied!"),
                    Err(e) => {
                        warn!("Failed to copy: {e:#}");
                        app.notify(format!("Error: {e}"));
                    }
                },
                Outcome::Reload => {
                    if let Err(e) = manager.invalidate().await {
                        warn!("Error clearing cache: {e}");
                    }
                    if !load(terminal, app, &manager, &mut events).await? {
                        return Ok(());
                    }
                }
            },
            Event::FocusGained => {
                let settings = ctx.load_settings().await;
                if app.reload_settings(settings) {
                    info!("Organizations changed, reinitializing");
                    manager = ctx.manager(&app.settings)?;
                    if !app.needs_setup() && !load(terminal, app, &manager, &mut events).await? {
                        return Ok(());
                    }
                }
            }
            _ => {}
        }
    }
}

/// Load the repository list while still listening for keys. Query edits are
/// kept and applied to the list once it arrives; focus changes are ignored
/// until the load finishes. Returns `false` when the user quit mid-load.
async fn load<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    manager: &Manager,
    events: &mut EventStream,
) -> Result<bool> {
    app.set_loading();
    terminal.draw(|f| ui::draw(f, app))?;

    let cancel = CancellationToken::new();
    let settings = app.settings.clone();
    let loading = manager.load_repos(&settings, &cancel);
    tokio::pin!(loading);

    loop {
        tokio::select! {
            result = &mut loading => {
                app.finish_load(result);
                return Ok(true);
            }
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press && is_quit(&key) => {
                    cancel.cancel();
                    info!("Load cancelled");
                    return Ok(false);
                }
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    handle_loading_key(app, key);
                    terminal.draw(|f| ui::draw(f, app))?;
                }
                None => {
                    cancel.cancel();
                    return Ok(false);
                }
                _ => {}
            },
        }
    }
}

fn handle_loading_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => app.clear_query(),
        KeyCode::Backspace => app.handle_backspace(),
        KeyCode::Char(c) if !ctrl => app.handle_char(c),
        _ => {}
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn handle_key(app: &mut App, key: KeyEvent) -> Outcome {
    // Help overlay swallows everything but close
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
            app.toggle_help();
        }
        return Outcome::Continue;
    }

    if is_quit(&key) {
        return Outcome::Quit;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::F(1) => app.toggle_help(),
        _ if app.needs_setup() => {}

        // Actions
        KeyCode::Char('r') if ctrl => return Outcome::Reload,
        KeyCode::Char('y') if ctrl => return copy_outcome(app),
        KeyCode::Tab => return copy_outcome(app),
        KeyCode::Enter => {
            if let Some(url) = app.activate() {
                return Outcome::Open(url);
            }
        }

        // Navigation
        KeyCode::Down => app.next(),
        KeyCode::Up => app.previous(),
        KeyCode::Char('n') if ctrl => app.next(),
        KeyCode::Char('p') if ctrl => app.previous(),

        // Query editing
        KeyCode::Char('u') if ctrl => app.clear_query(),
        KeyCode::Backspace => app.handle_backspace(),
        KeyCode::Char(c) if !ctrl && c.is_ascii_digit() => app.handle_digit(c),
        KeyCode::Char(c) if !ctrl => app.handle_char(c),
        _ => {}
    }
    Outcome::Continue
}

fn copy_outcome(app: &App) -> Outcome {
    app.clone_command()
        .map(Outcome::Copy)
        .unwrap_or(Outcome::Continue)
}
