use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use triagist::agentic::{AgenticController, AgenticPhase, EnableOutcome, ResetOutcome};
use triagist::analyses::{AnalysisStore, format_age};
use triagist::api::{AssistantApi, CachedAnalysisItem, HttpAssistantApi, SessionId};
use triagist::config::{self, Config};
use triagist::keymap::KeyRegistry;
use triagist::notify::{Notice, NoticeLevel, Notifier};
use triagist::tui::{self, keymap as bindings};

#[derive(Parser)]
#[command(
    name = "triagist",
    version = triagist::VERSION,
    about = "Keyboard-first client for the issue triage assistant"
)]
struct Cli {
    /// Session to operate on (overrides TRIAGIST_SESSION and config.toml)
    #[arg(long, global = true)]
    session: Option<String>,

    /// Assistant backend root (overrides TRIAGIST_BACKEND_URL and config.toml)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the TUI dashboard (default)
    Dashboard,
    /// Create ~/.triagist/ and a default config.toml
    Init,
    /// Show the agentic-mode status of the session
    Status,
    /// Enable agentic mode for the session
    Enable,
    /// Clear the session's agentic conversation memory
    ResetMemory,
    /// Work with cached issue analyses
    Analyses {
        #[command(subcommand)]
        action: AnalysesAction,
    },
    /// Print the dashboard key bindings
    Keys,
}

#[derive(Subcommand)]
enum AnalysesAction {
    /// List cached analyses, most recent first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one cached analysis
    Show {
        /// Issue URL the analysis was computed for
        issue_url: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Delete one cached analysis
    Delete {
        /// Issue URL the analysis was computed for
        issue_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        session,
        backend_url,
        verbose,
        command,
    } = Cli::parse();
    let command = command.unwrap_or(Commands::Dashboard);

    init_logging(verbose, matches!(command, Commands::Dashboard))?;

    let config = config::load()?;

    match command {
        Commands::Init => {
            config::ensure_dirs()?;
            let path = config::config_path()?;
            if config::write_default(&path)? {
                println!("triagist initialized at {}", path.display());
            } else {
                println!("{} already exists, left untouched", path.display());
            }
            Ok(())
        }
        Commands::Keys => {
            print_keys(&config);
            Ok(())
        }
        Commands::Dashboard => {
            let api = connect(&config, backend_url.as_deref())?;
            tui::run(&config, api, config.session(session.as_deref()))
        }
        Commands::Status => {
            let (ctx, mut notices) = Mounted::new(&config, session.as_deref(), backend_url.as_deref())?;
            let result = ctx.agentic.fetch_status().await;
            drain(&mut notices);
            result.context("failed to fetch agentic status")?;
            print_status(&ctx.agentic);
            Ok(())
        }
        Commands::Enable => {
            let (ctx, mut notices) = Mounted::new(&config, session.as_deref(), backend_url.as_deref())?;
            // A failed pre-check only means the enable call decides.
            let _ = ctx.agentic.fetch_status().await;
            let result = ctx.agentic.enable().await;
            drain(&mut notices);
            match result.context("failed to enable agentic mode")? {
                EnableOutcome::AlreadyEnabled => println!("agentic mode is already enabled"),
                EnableOutcome::Enabled(_) | EnableOutcome::InFlight | EnableOutcome::Stale => {}
            }
            print_status(&ctx.agentic);
            Ok(())
        }
        Commands::ResetMemory => {
            let (ctx, mut notices) = Mounted::new(&config, session.as_deref(), backend_url.as_deref())?;
            let result = ctx.agentic.reset_memory().await;
            drain(&mut notices);
            if result.context("failed to reset agentic memory")? == ResetOutcome::Reset {
                println!("agentic memory reset for session {}", ctx.session);
            }
            Ok(())
        }
        Commands::Analyses { action } => {
            let (ctx, mut notices) = Mounted::new(&config, session.as_deref(), backend_url.as_deref())?;
            let result = run_analyses(&ctx.analyses, action).await;
            drain(&mut notices);
            result
        }
    }
}

/// Everything a one-shot command needs for the resolved session.
struct Mounted {
    session: SessionId,
    agentic: AgenticController,
    analyses: AnalysisStore,
}

impl Mounted {
    fn new(
        config: &Config,
        session: Option<&str>,
        backend_url: Option<&str>,
    ) -> Result<(Self, UnboundedReceiver<Notice>)> {
        let session = config.session(session).context(
            "no session selected: pass --session, set TRIAGIST_SESSION, or set session_id in config.toml",
        )?;
        let api = connect(config, backend_url)?;
        let (notifier, notices) = Notifier::channel();

        let agentic = AgenticController::new(api.clone(), notifier.clone());
        agentic.set_session(session.clone());
        let analyses = AnalysisStore::new(api, notifier, session.clone());

        Ok((
            Mounted {
                session,
                agentic,
                analyses,
            },
            notices,
        ))
    }
}

fn connect(config: &Config, flag: Option<&str>) -> Result<Arc<dyn AssistantApi>> {
    let base_url = config.backend_url(flag);
    let api = HttpAssistantApi::new(&base_url, config.backend.timeout())
        .with_context(|| format!("cannot use backend {base_url}"))?;
    Ok(Arc::new(api))
}

/// CLI commands log to stderr; the dashboard logs to a file so the terminal
/// stays clean.
fn init_logging(verbose: bool, to_file: bool) -> Result<()> {
    let default = match (verbose, to_file) {
        (true, _) => "triagist=debug",
        (false, true) => "triagist=info",
        // Notices and command errors are printed directly.
        (false, false) => "triagist=error",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let registry = tracing_subscriber::registry().with(filter);

    if to_file {
        config::ensure_dirs()?;
        let path = config::log_path()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        registry
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

/// Print the notices a command raised. Error notices are skipped: the same
/// failure comes back as the command's `Err`.
fn drain(notices: &mut UnboundedReceiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        match notice.level {
            NoticeLevel::Info => eprintln!("{}", notice.message),
            NoticeLevel::Success => eprintln!("✓ {}", notice.message),
            NoticeLevel::Error => {}
        }
    }
}

fn print_status(agentic: &AgenticController) {
    let snapshot = agentic.snapshot();
    if let Some(session) = &snapshot.session {
        println!("session  {session}");
    }
    println!("agentic  {}", snapshot.phase.label());
    if let Some(status) = &snapshot.status
        && !status.available_tools().is_empty()
    {
        println!("tools    {}", status.available_tools().join(", "));
    } else if snapshot.phase == (AgenticPhase::Enabled { initialized: false }) {
        println!("tools    (initializing)");
    }
}

async fn run_analyses(store: &AnalysisStore, action: AnalysesAction) -> Result<()> {
    match action {
        AnalysesAction::List { json } => {
            store.list().await.context("failed to list cached analyses")?;
            let items = store.items();
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("No cached analyses for session {}", store.session());
            } else {
                if let Some(repo) = store.repository() {
                    println!("{repo}");
                }
                let now = chrono::Utc::now();
                for item in &items {
                    print_row(item, now);
                }
            }
            Ok(())
        }
        AnalysesAction::Show { issue_url, json } => {
            store.list().await.context("failed to list cached analyses")?;
            let Some(item) = store.select(&issue_url) else {
                bail!("no cached analysis for {issue_url}");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&item)?);
            } else {
                let display = item.display();
                println!("issue   {} ({})", display.label, display.number);
                if let Some(title) = &display.title {
                    println!("title   {title}");
                }
                println!("status  {}", item.status.as_str());
                println!(
                    "cached  {}",
                    format_age(item.cached_at, chrono::Utc::now())
                );
                println!("url     {}", item.issue_url);
            }
            Ok(())
        }
        AnalysesAction::Delete { issue_url } => {
            store
                .delete(&issue_url)
                .await
                .with_context(|| format!("failed to delete analysis for {issue_url}"))?;
            Ok(())
        }
    }
}

fn print_row(item: &CachedAnalysisItem, now: chrono::DateTime<chrono::Utc>) {
    let display = item.display();
    let title = display
        .title
        .filter(|t| *t != display.label)
        .unwrap_or_default();
    println!(
        "{} {:<28} {:<10} {:<9} {title}",
        item.status.symbol(),
        display.label,
        item.status.as_str(),
        format_age(item.cached_at, now),
    );
}

fn print_keys(config: &Config) {
    let registry = KeyRegistry::new();
    let mut global = bindings::global_bindings();
    bindings::apply_overrides(&mut global, &config.keybindings);
    let mut analyses = bindings::analyses_bindings();
    bindings::apply_overrides(&mut analyses, &config.keybindings);
    let _global = registry.register(global);
    let _analyses = registry.register(analyses);

    for (category, entries) in registry.help_entries() {
        println!("{category}");
        for entry in entries {
            println!("  {:<14} {}", entry.label, entry.description);
        }
    }
}
