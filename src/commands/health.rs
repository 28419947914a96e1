use serde::Serialize;

use crate::context::AppContext;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
struct HealthReport {
    base_url: String,
    online: bool,
}

pub async fn run(ctx: &AppContext) -> AppResult<()> {
    let report = HealthReport {
        base_url: ctx.settings.base_url()?.to_string(),
        online: ctx.letters.health().await,
    };

    let state = if report.online { "online" } else { "offline" };
    let text = format!("letter store at {} is {state}", report.base_url);
    ctx.output.emit(&text, &report)
}
