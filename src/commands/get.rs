use crate::cli::IdArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::output::OutputMode;

pub async fn run(ctx: &AppContext, args: IdArgs) -> AppResult<()> {
    let letter = ctx.letters.get(args.id).await?;

    if ctx.output.mode() == OutputMode::Text {
        println!("#{} [{}]", letter.id, letter.folder.display_name());
        println!("from: {}", letter.from_email);
        println!("to: {}", letter.to_email);
        println!("subject: {}", letter.subject);
        println!("date: {}", letter.date.as_deref().unwrap_or("(no date)"));
        println!();
        println!("{}", html_escape::decode_html_entities(&letter.body));
        return Ok(());
    }

    let text = format!("{} | {} | {}", letter.id, letter.from_email, letter.subject);
    ctx.output.emit(&text, &letter)
}
