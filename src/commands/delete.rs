use crate::cli::IdArgs;
use crate::context::AppContext;
use crate::error::{AppResult, StoreError};

pub async fn run(ctx: &AppContext, args: IdArgs) -> AppResult<()> {
    let outcome = ctx.letters.soft_delete(args.id).await?;
    if !outcome.deleted {
        return Err(StoreError::NotFound(format!("letter {} does not exist", args.id)).into());
    }

    let text = format!("letter #{} moved to trash", args.id);
    ctx.output.emit(&text, &outcome)
}
