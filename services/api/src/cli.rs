use crate::commands::{run_audit, run_rules, AuditArgs, RulesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mail_audit::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "mail-audit-api",
    about = "Score emails against a configurable catalog of communication rules",
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
    /// Audit one or more email files as a single thread
    Audit(AuditArgs),
    /// List the rules a catalog resolves to, with any load warnings
    Rules(RulesArgs),
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
        Command::Audit(args) => run_audit(args),
        Command::Rules(args) => run_rules(args),
    }
}
