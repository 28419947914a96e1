use crate::api::models::LetterDraft;
use crate::cli::SendArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::validate;

pub async fn run(ctx: &AppContext, args: SendArgs) -> AppResult<()> {
    let draft = build_draft(args);
    validate::validate_draft(&draft)?;

    let letter = ctx.letters.create(&draft).await?;
    let text = format!(
        "created letter #{} in {}",
        letter.id,
        letter.folder.display_name()
    );
    ctx.output.emit(&text, &letter)
}

fn build_draft(args: SendArgs) -> LetterDraft {
    let draft = LetterDraft::new(args.to.trim(), args.subject, args.body);
    match args.folder {
        Some(folder) => draft.with_folder(folder),
        None => draft,
    }
}
