mod cli;
mod commands;
mod demo;
mod infra;
mod render;

use job_portal::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
