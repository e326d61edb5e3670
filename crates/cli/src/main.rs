//! Coffee Compass CLI - Browse cafés and check in brews from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # List cafés from the bundled demo data
//! coffee-compass --demo cafes
//!
//! # Search cafés by name against the hosted store (COFFEE_STORE_URL)
//! coffee-compass cafes --search brew
//!
//! # Check in a brew by scanning a café link
//! coffee-compass --demo checkin --payload https://example.com/cafe/1 \
//!     --bean ethiopian-yirgacheffe --method pour-over --rating 5 --note "great cup"
//! ```
//!
//! # Commands
//!
//! - `cafes` - List or search cafés
//! - `cafe` / `bean` - Show a café or bean detail
//! - `history` - Order history grouped by day
//! - `favorite` - Toggle a favorite café or bean
//! - `checkin` - Run the scan → bean → brew flow
//! - `profile` - Profile summary

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coffee_compass_app::config::AppConfig;
use coffee_compass_app::preferences::FilePreferences;
use coffee_compass_app::{
    AppCoordinator, Collaborators, FavoriteTarget, RecordingNotifier, RemoteStore, RestStore,
};
use coffee_compass_core::{BeanId, BrewMethod, CafeId};

mod commands;
mod seed;

#[derive(Parser)]
#[command(name = "coffee-compass")]
#[command(author, version, about = "Find cafés, explore beans and log your brews")]
struct Cli {
    /// Use the bundled demo data instead of the hosted store
    #[arg(long, global = true)]
    demo: bool,

    /// Seed an in-memory store from a YAML file
    #[arg(long, global = true, value_name = "FILE", conflicts_with = "demo")]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cafés, optionally filtered by name
    Cafes {
        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a café with its beans
    Cafe {
        /// Café id
        id: String,
    },
    /// Show a bean and where it is offered
    Bean {
        /// Bean id
        id: String,
    },
    /// Show order history grouped by day
    History,
    /// Toggle a favorite
    Favorite {
        /// What to favorite
        #[arg(value_enum)]
        kind: FavoriteArg,
        /// Café or bean id
        id: String,
    },
    /// Record a brew: scan a café, pick a bean, rate the cup
    Checkin {
        /// Scanned code (café link or bare café id)
        #[arg(short, long)]
        payload: String,

        /// Bean id offered at the scanned café
        #[arg(short, long)]
        bean: String,

        /// Brew method (`espresso`, `pour-over`, `french-press`, `cold-brew`, `aeropress`, `chemex`)
        #[arg(short, long)]
        method: BrewMethod,

        /// Star rating, 1-5
        #[arg(short, long)]
        rating: Option<u8>,

        /// Tasting note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Show order count, top tastes and favorites
    Profile,
}

#[derive(Clone, Copy, ValueEnum)]
enum FavoriteArg {
    Cafe,
    Bean,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "coffee_compass=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = AppConfig::from_env();
    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = build_store(&cli, config)?;
    let notifier = RecordingNotifier::new();
    let collaborators = Collaborators::new(store)
        .with_notifier(Arc::new(notifier.clone()))
        .with_preferences(Arc::new(FilePreferences::new(&config.preferences_path)));

    let (mut app, summary) = AppCoordinator::start(collaborators).await;
    if !summary.is_complete() {
        tracing::warn!(failed = ?summary.failed, "Some data could not be loaded");
    }

    let result = match cli.command {
        Commands::Cafes { search } => commands::browse::list_cafes(&app, search.as_deref()),
        Commands::Cafe { id } => commands::browse::show_cafe(&mut app, CafeId::new(id)),
        Commands::Bean { id } => commands::browse::show_bean(&mut app, BeanId::new(id)),
        Commands::History => commands::account::history(&mut app),
        Commands::Favorite { kind, id } => {
            let target = match kind {
                FavoriteArg::Cafe => FavoriteTarget::Cafe(CafeId::new(id)),
                FavoriteArg::Bean => FavoriteTarget::Bean(BeanId::new(id)),
            };
            commands::account::toggle_favorite(&mut app, target)
        }
        Commands::Checkin {
            payload,
            bean,
            method,
            rating,
            note,
        } => {
            let input = commands::checkin::CheckinInput {
                payload,
                bean_id: BeanId::new(bean),
                method,
                rating,
                note,
            };
            commands::checkin::run(&mut app, input).await
        }
        Commands::Profile => commands::account::profile(&mut app),
    };

    // Queued favorite calls finish before the process exits
    app.flush_favorites().await;
    commands::print_notifications(&notifier)?;

    result
}

fn build_store(
    cli: &Cli,
    config: &AppConfig,
) -> Result<Arc<dyn RemoteStore>, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.seed {
        tracing::info!(path = %path.display(), "Using seeded in-memory store");
        return Ok(Arc::new(seed::load_file(path)?.into_store()));
    }

    match (&config.store, cli.demo) {
        (Some(store_config), false) => Ok(Arc::new(RestStore::new(store_config)?)),
        (None, false) => {
            tracing::warn!("COFFEE_STORE_URL not set; using demo data");
            Ok(Arc::new(seed::demo()?.into_store()))
        }
        (_, true) => Ok(Arc::new(seed::demo()?.into_store())),
    }
}
