mod cli;
mod commands;
mod infra;
mod ingest;
mod render;
mod routes;
mod server;

use mail_audit::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
