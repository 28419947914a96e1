use serde::Serialize;

use crate::cli::{ConfigCommand, ConfigSetArgs};
use crate::config::{self, Settings};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
struct ConfigView {
    profile: String,
    file: String,
    base_url: String,
    request_timeout_ms: u128,
    cache_ttl_ms: u128,
    letters_endpoint: String,
    letter_by_id_endpoint: String,
    folder_endpoint: String,
}

pub fn run(ctx: &AppContext, command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Show => show(ctx, &ctx.settings),
        ConfigCommand::Set(args) => set(ctx, args),
    }
}

fn show(ctx: &AppContext, settings: &Settings) -> AppResult<()> {
    let view = ConfigView {
        profile: ctx.profile.clone(),
        file: ctx.paths.settings_file(&ctx.profile).display().to_string(),
        base_url: settings.base_url()?.to_string(),
        request_timeout_ms: settings.request_timeout().as_millis(),
        cache_ttl_ms: settings.cache_ttl().as_millis(),
        letters_endpoint: settings.endpoints.letters.clone(),
        letter_by_id_endpoint: settings.endpoints.letter_by_id.clone(),
        folder_endpoint: settings.endpoints.folder.clone(),
    };

    let text = format!(
        "profile {} ({})\nbase_url: {}\ntimeout: {} ms\ncache ttl: {} ms",
        view.profile, view.file, view.base_url, view.request_timeout_ms, view.cache_ttl_ms
    );
    ctx.output.emit(&text, &view)
}

fn set(ctx: &AppContext, args: ConfigSetArgs) -> AppResult<()> {
    if args.url.is_none() && args.timeout_ms.is_none() && args.cache_ttl_ms.is_none() {
        return Err(AppError::InvalidInput(
            "pass at least one of --url, --timeout-ms, --cache-ttl-ms".to_string(),
        ));
    }

    if args.timeout_ms == Some(0) {
        return Err(AppError::InvalidInput(
            "--timeout-ms must be greater than 0".to_string(),
        ));
    }

    let mut settings = config::load_settings(&ctx.paths, &ctx.profile)?;
    if let Some(url) = args.url {
        settings.base_url = Some(url);
        settings.base_url()?;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.request_timeout_ms = Some(timeout_ms);
    }
    if let Some(cache_ttl_ms) = args.cache_ttl_ms {
        settings.cache_ttl_ms = Some(cache_ttl_ms);
    }

    config::save_settings(&ctx.paths, &ctx.profile, &settings)?;
    show(ctx, &settings)
}
