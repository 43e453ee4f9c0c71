use crate::plan::{run_plan, run_signing, PlanArgs, SigningArgs};
use crate::server;
use cap_engine::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Cap Compliance Engine",
    about = "Plan discount pool allocations and check signings against the salary budget",
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
    /// Run the automatic allocation for a roster CSV and print the cap report
    Plan(PlanArgs),
    /// Check whether a hypothetical signing fits the planned roster
    Signing(SigningArgs),
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
        Command::Plan(args) => run_plan(args),
        Command::Signing(args) => run_signing(args),
    }
}
