mod cli;
mod demo;
mod infra;
mod routes;
mod server;
mod train;

use loan_screen::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
