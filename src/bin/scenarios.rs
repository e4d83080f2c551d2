use std::env;
use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use gridcast::config::AppConfig;
use gridcast::overlay::OverlayStore;
use gridcast::print;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// root of the league data tree
    #[clap(short = 'd', long, default_value = "data")]
    data_root: PathBuf,

    /// season whose scenarios to inspect
    #[clap(short = 's', long)]
    season: u32,

    /// describe one scenario instead of listing all of them
    #[clap(long)]
    id: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    debug!("args: {args:?}");

    let config = AppConfig::new(&args.data_root, args.season);
    let store = OverlayStore::new(&config);

    match &args.id {
        Some(scenario_id) => {
            let overlay = store.load(Some(scenario_id));
            let summary = overlay.summary();
            info!(
                "scenario {} (season {}): {}",
                summary.scenario_id,
                summary.season,
                overlay.metadata.label_or_id()
            );
            if let Some(description) = &overlay.metadata.description {
                info!("  {description}");
            }
            info!("  completed-week overrides: {:?}", summary.completed_weeks);
            info!("  projection-week overrides: {:?}", summary.projection_weeks);
        }
        None => {
            let scenarios = store.list();
            info!(
                "{} scenarios for season {}:\n{}",
                scenarios.len(),
                args.season,
                Console::default().render(&print::tabulate_scenarios(&scenarios))
            );
        }
    }

    Ok(())
}
