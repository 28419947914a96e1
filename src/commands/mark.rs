use crate::api::models::{Folder, LetterPatch, UpdateOutcome};
use crate::cli::{MoveArgs, ReadArgs};
use crate::context::AppContext;
use crate::error::{AppResult, StoreError};

pub async fn run_read(ctx: &AppContext, args: ReadArgs) -> AppResult<()> {
    let patch = LetterPatch::Read(!args.unread);
    let outcome = apply(ctx, args.id, &patch).await?;

    let state = if args.unread { "unread" } else { "read" };
    let text = format!("letter #{} marked {state}", args.id);
    ctx.output.emit(&text, &outcome)
}

pub async fn run_move(ctx: &AppContext, args: MoveArgs) -> AppResult<()> {
    let folder = args.folder;
    let patch = LetterPatch::Move(folder.clone());
    let outcome = apply(ctx, args.id, &patch).await?;

    let text = format!("letter #{} moved to {}", args.id, folder.display_name());
    ctx.output.emit(&text, &outcome)
}

async fn apply(ctx: &AppContext, id: i64, patch: &LetterPatch) -> AppResult<UpdateOutcome> {
    let outcome = ctx.letters.update(id, patch).await?;
    if !outcome.updated {
        return Err(StoreError::NotFound(format!("letter {id} does not exist")).into());
    }
    Ok(outcome)
}
