use crate::demo::{run_dashboard, run_demo, DashboardArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use resource_eval::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Resource Evaluation Tracker",
    about = "Track two-track associate evaluations and their analytics from the command line",
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
    /// Print dashboard analytics for a stored evaluation document
    Dashboard(DashboardArgs),
    /// Walk through registration, track updates, a reopen and the dashboard in memory
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
    /// JSON document to persist evaluations in (defaults to APP_DATA_PATH)
    #[arg(long)]
    pub(crate) data_path: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Dashboard(args) => run_dashboard(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_a_subcommand() {
        let cli = Cli::try_parse_from(["resource-eval-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_dashboard_and_demo_flags() {
        let cli = Cli::try_parse_from([
            "resource-eval-api",
            "dashboard",
            "--data-path",
            "/tmp/evaluations.json",
            "--today",
            "2025-06-30",
            "--json",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Dashboard(args)) => {
                assert_eq!(
                    args.data_path.as_deref(),
                    Some(std::path::Path::new("/tmp/evaluations.json"))
                );
                assert!(args.today.is_some());
                assert!(args.json);
            }
            other => panic!("expected dashboard command, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["resource-eval-api", "demo", "--today", "June 30"]);
        assert!(cli.is_err(), "non-ISO dates are rejected");
    }
}
