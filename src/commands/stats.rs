use crate::context::AppContext;
use crate::error::AppResult;

pub async fn run(ctx: &AppContext) -> AppResult<()> {
    let stats = ctx.letters.stats().await?;
    let text = format!(
        "{} letters, {} unread (inbox {}, sent {}, drafts {}, trash {}, other {})",
        stats.total, stats.unread, stats.inbox, stats.sent, stats.drafts, stats.trash, stats.other
    );
    ctx.output.emit(&text, &stats)
}
