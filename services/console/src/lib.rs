mod cli;
mod infra;
mod report;

use stage_flow::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
