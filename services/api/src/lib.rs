mod cli;
mod draw;
mod infra;
mod routes;
mod server;

use secret_santa::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
