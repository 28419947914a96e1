pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod facade;
pub mod output;
pub mod validate;

use cli::Cli;
use error::AppResult;

pub async fn run(cli: Cli) -> AppResult<()> {
    app::run(cli).await
}
