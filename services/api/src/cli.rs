use crate::demo::{run_classify, run_demo, run_weights, ClassifyArgs, DemoArgs, WeightsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use climate_risk::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Climate Risk Engine",
    about = "Score climate transition risks and opportunities with sector-dependent weights",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Show the weight summary for a sector, or resolve one category/subcategory
    Weights(WeightsArgs),
    /// Classify a category/subcategory label pair into the canonical taxonomy
    Classify(ClassifyArgs),
    /// Run a full assessment for one company and print the scored records
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Use the deterministic offline generator instead of the remote service
    #[arg(long)]
    pub(crate) offline: bool,
    /// Sector profile CSV to supply as generation context
    #[arg(long)]
    pub(crate) profiles_csv: Option<PathBuf>,
    /// Scenario impact CSV to supply as generation context
    #[arg(long)]
    pub(crate) scenarios_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Weights(args) => run_weights(args),
        Command::Classify(args) => run_classify(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
