use crate::demo::{run_demo, run_derive, DemoArgs, DeriveArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use evalmate::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "evalmate",
    about = "Derive employee performance scores and serve evaluations over HTTP",
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
    /// Derive every score for a CSV dataset and write the enriched copy
    Derive(DeriveArgs),
    /// Evaluate sample employees end to end and print the reports
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
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Derive(args) => run_derive(args),
        Command::Demo(args) => run_demo(args),
    }
}
