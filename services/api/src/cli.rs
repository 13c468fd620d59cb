use crate::draw::{run_draw, DrawArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use secret_santa::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Secret Santa",
    about = "Run the Secret Santa exchange service or draw assignments from the command line",
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
    /// Draw assignments from CSV files and print them
    Draw(DrawArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Keep the exchange in memory instead of the configured JSON file
    #[arg(long)]
    pub(crate) in_memory: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Draw(args) => run_draw(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["secret-santa"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn draw_arguments_parse() {
        let cli = Cli::try_parse_from([
            "secret-santa",
            "draw",
            "--participants",
            "roster.csv",
            "--rules",
            "rules.csv",
            "--seed",
            "7",
            "--attempts",
            "20",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Draw(args)) => {
                assert_eq!(args.participants, PathBuf::from("roster.csv"));
                assert_eq!(args.rules, Some(PathBuf::from("rules.csv")));
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.attempts, Some(20));
                assert!(args.event_name.is_none());
            }
            other => panic!("expected draw command, got {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from(["secret-santa", "serve", "--port", "8080", "--in-memory"])
            .expect("parses");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.in_memory);
                assert!(args.host.is_none());
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }
}
