use crate::demo::{run_demo, run_evaluate, DemoArgs, EvaluateArgs};
use crate::server;
use crate::train::{run_train, TrainArgs};
use clap::{Args, Parser, Subcommand};
use loan_screen::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Screen",
    about = "Train kernel SVM loan classifiers and serve creditworthiness decisions",
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
    /// Fit every kernel from a historical loan export and write the artifacts
    Train(TrainArgs),
    /// Evaluate a single applicant from the command line
    Evaluate(EvaluateArgs),
    /// Evaluate a sample applicant against every trained kernel
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
        Command::Train(args) => run_train(args),
        Command::Evaluate(args) => run_evaluate(args),
        Command::Demo(args) => run_demo(args),
    }
}
