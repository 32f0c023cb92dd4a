use crate::quote::{run_compare, run_estimate, CompareArgs, EstimateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fare_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Truck Fare Engine",
    about = "Estimate truck booking fares from the command line or serve them over HTTP",
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
    /// Produce a one-off fare quote with the full cost breakdown
    Estimate(EstimateArgs),
    /// Print a price/distance comparison table across vehicle categories
    Compare(CompareArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Estimate(args) => run_estimate(args),
        Command::Compare(args) => run_compare(args),
    }
}
