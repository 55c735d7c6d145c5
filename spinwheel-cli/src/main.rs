use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use spinwheel_common::models::SessionIdentity;
use spinwheel_core::catalog::JsonFileCatalog;
use spinwheel_core::cooldown::GateState;
use spinwheel_core::session::SessionHandle;
use spinwheel_core::store::PersistentDrawStore;
use spinwheel_core::{DrawError, SpinOrchestrator, WheelConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "spinwheel")]
#[command(author, version, about = "Spin-to-win voucher wheel with a per-user cooldown")]
struct Args {
    /// JSON file holding the voucher catalog (array of offers)
    #[arg(long)]
    catalog: PathBuf,

    /// Optional JSON wheel configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite file for draw history. Overrides the configured database_url.
    #[arg(long)]
    db: Option<String>,

    /// Logged-in user id. Omit to act as an anonymous visitor.
    #[arg(long)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Spin the wheel once for the user
    Spin,
    /// Show the user's last result and cooldown
    Status,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("spinwheel=info".parse().unwrap_or_default());
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    debug!("spinwheel starting: {:?}", args);

    let mut config = WheelConfig::load(args.config.as_deref())
        .context("failed to load wheel configuration")?;
    if let Some(db) = args.db.clone() {
        config.database_url = Some(db);
    }
    if config.database_url.is_none() {
        warn!("No database configured; draw history will not outlive this process.");
    }

    let store = Arc::new(PersistentDrawStore::new(config.database_url.clone()));
    let session = SessionHandle::new(SessionIdentity::from_user_id(args.user.as_deref()));
    let wheel = SpinOrchestrator::new(
        config,
        Arc::new(JsonFileCatalog::new(args.catalog.clone())),
        store,
        session.subscribe(),
    );
    wheel.mount().await;

    match args.command {
        Command::Spin => run_spin(&wheel).await,
        Command::Status => run_status(&wheel),
    }

    wheel.unmount();
    info!("Done.");
    Ok(())
}

async fn run_spin(wheel: &SpinOrchestrator) {
    let eligible = wheel.eligible(Utc::now());
    if !eligible.is_empty() {
        println!("Spinning for one of {} voucher(s)...", eligible.len());
    }

    match wheel.draw(Utc::now()).await {
        Ok(outcome) => {
            println!(
                "You won: {} ({}% off, min purchase {})",
                outcome.offer.name, outcome.offer.discount, outcome.offer.min_purchase
            );
            match outcome.code {
                Some(code) => println!("Redemption code: {}", code),
                None => println!("No redemption code is left for this voucher."),
            }
        }
        Err(DrawError::AnimationInterrupted) => {}
        Err(e) => {
            if let Some(msg) = e.user_message() {
                println!("{}", msg);
            }
        }
    }
}

fn run_status(wheel: &SpinOrchestrator) {
    let view = wheel.view();
    if view.identity.is_anonymous() {
        println!("Not logged in.");
        return;
    }

    match &view.last_record {
        Some(record) => println!(
            "Last win: {} at {}",
            record.offer.name,
            record.drawn_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("No spins yet."),
    }

    let now = Utc::now();
    match wheel.gate_state(now) {
        GateState::Ready => println!("The wheel is ready to spin."),
        GateState::Waiting(_) => println!("Next spin in {}.", wheel.countdown(now)),
    }
}
