use crate::commands::{run_evaluate, run_export, run_normalize, EvaluateArgs, ExportArgs, NormalizeArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use bid_desk::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Bid Desk",
    about = "Price Gulf auction vehicles for the German market and triage AI damage reports",
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
    /// Evaluate vehicles from a JSON file and print costs and verdicts
    Evaluate(EvaluateArgs),
    /// Work with raw damage-describer output
    Damage {
        #[command(subcommand)]
        command: DamageCommand,
    },
    /// Write evaluations for a JSON vehicle list as CSV
    Export(ExportArgs),
    /// Run an end-to-end demo with sample lots, reviews and a damage report
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum DamageCommand {
    /// Repair, normalize and reconcile a describer response
    Normalize(NormalizeArgs),
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
        Command::Evaluate(args) => run_evaluate(args),
        Command::Damage {
            command: DamageCommand::Normalize(args),
        } => run_normalize(args),
        Command::Export(args) => run_export(args),
        Command::Demo(args) => run_demo(args),
    }
}
