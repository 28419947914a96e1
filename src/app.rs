use crate::cli::{Cli, Command};
use crate::commands;
use crate::context::AppContext;
use crate::error::AppResult;

pub async fn run(cli: Cli) -> AppResult<()> {
    let Cli {
        profile,
        json,
        verbose: _,
        base_url,
        command,
    } = cli;

    let ctx = AppContext::bootstrap(profile, json, base_url)?;

    match command {
        Command::List(args) => commands::list::run(&ctx, args).await,
        Command::Folder(args) => commands::list::run_folder(&ctx, args).await,
        Command::Get(args) => commands::get::run(&ctx, args).await,
        Command::Send(args) => commands::send::run(&ctx, args).await,
        Command::Read(args) => commands::mark::run_read(&ctx, args).await,
        Command::Move(args) => commands::mark::run_move(&ctx, args).await,
        Command::Delete(args) => commands::delete::run(&ctx, args).await,
        Command::Stats => commands::stats::run(&ctx).await,
        Command::Health => commands::health::run(&ctx).await,
        Command::Config(args) => commands::config::run(&ctx, args.command),
    }
}
