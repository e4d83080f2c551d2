use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use gridcast::config::AppConfig;
use gridcast::print;
use gridcast::sim::{
    RestOfSeasonSimulator, SimOptions, DEFAULT_ITERATIONS, DEFAULT_PLAYOFF_SLOTS, DEFAULT_SIGMA,
};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// root of the league data tree
    #[clap(short = 'd', long, default_value = "data")]
    data_root: PathBuf,

    /// season to simulate
    #[clap(short = 's', long)]
    season: u32,

    /// first projected week (defaults to the week after the last completed one)
    #[clap(long)]
    start_week: Option<u32>,

    /// last projected week (defaults to the latest projection table)
    #[clap(long)]
    end_week: Option<u32>,

    /// point-spread standard deviation for the win-probability model
    #[clap(long, default_value_t = DEFAULT_SIGMA)]
    sigma: f64,

    /// Monte Carlo iterations; 0 skips the estimator
    #[clap(short = 'i', long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: u32,

    /// playoff berths up for grabs
    #[clap(long, default_value_t = DEFAULT_PLAYOFF_SLOTS)]
    playoff_slots: usize,

    /// random seed for reproducible Monte Carlo runs
    #[clap(long)]
    seed: Option<u64>,

    /// scenario overlay id ("baseline" means unmodified league data)
    #[clap(long)]
    scenario: Option<String>,

    /// output file (defaults to out/simulations/<season>/rest_of_season.json)
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if let (Some(start_week), Some(end_week)) = (self.start_week, self.end_week) {
            if start_week > end_week {
                bail!("--start-week must not exceed --end-week");
            }
        }
        Ok(())
    }
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
    args.validate()?;
    debug!("args: {args:?}");

    let config = AppConfig::new(&args.data_root, args.season);
    let simulator = RestOfSeasonSimulator::new(&config);
    let dataset = simulator.build_dataset(&SimOptions {
        start_week: args.start_week,
        end_week: args.end_week,
        sigma: args.sigma,
        iterations: args.iterations,
        playoff_slots: args.playoff_slots,
        random_seed: args.seed,
        scenario: args.scenario.clone(),
    })?;

    let output = args.output.unwrap_or_else(|| config.default_dataset_json());
    dataset.write(&output)?;
    info!(
        "season {} weeks {}-{} ({} scenario) → {}",
        dataset.season,
        dataset.start_week,
        dataset.end_week,
        dataset.scenario.scenario_id,
        output.display()
    );

    info!(
        "projected standings:\n{}",
        Console::default().render(&print::tabulate_standings(&dataset))
    );
    if let Some(monte_carlo) = &dataset.monte_carlo {
        info!(
            "playoff odds over {} trials:\n{}",
            monte_carlo.iterations,
            Console::default().render(&print::tabulate_monte_carlo(monte_carlo))
        );
    }

    Ok(())
}
