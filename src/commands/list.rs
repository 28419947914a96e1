use crate::api::models::Letter;
use crate::cli::{FolderArgs, ListArgs};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::output::OutputMode;

pub async fn run(ctx: &AppContext, args: ListArgs) -> AppResult<()> {
    check_limit(args.limit)?;
    let letters = ctx.letters.list(args.folder.as_ref()).await?;
    render(ctx, letters, args.offset, args.limit)
}

pub async fn run_folder(ctx: &AppContext, args: FolderArgs) -> AppResult<()> {
    check_limit(args.limit)?;
    let letters = ctx.letters.list_by_folder(&args.name).await?;
    render(ctx, letters, args.offset, args.limit)
}

fn check_limit(limit: usize) -> AppResult<()> {
    if limit == 0 {
        return Err(AppError::InvalidInput(
            "--limit must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn render(ctx: &AppContext, letters: Vec<Letter>, offset: usize, limit: usize) -> AppResult<()> {
    let total = letters.len();
    let letters = page(letters, offset, limit);

    if ctx.output.mode() == OutputMode::Text {
        if letters.is_empty() {
            println!("0 letters");
            return Ok(());
        }

        for (index, letter) in letters.iter().enumerate() {
            let marker = if letter.is_read { " " } else { "*" };
            let from = non_empty(&letter.from_email, "(unknown sender)");
            let subject = non_empty(&letter.subject, "(no subject)");
            let date = letter.date.as_deref().unwrap_or("(no date)");
            let preview = format_preview(&letter.body);

            println!(
                "{marker} {}. #{} [{}]",
                offset + index + 1,
                letter.id,
                letter.folder.display_name()
            );
            println!("   from: {from}");
            println!("   subject: {subject}");
            println!("   date: {date}");
            println!();
            println!("   {preview}");

            if index + 1 < letters.len() {
                println!();
            }
        }

        if total > offset + letters.len() {
            println!();
            println!("showing {} of {total} letters", letters.len());
        }

        return Ok(());
    }

    let text = format!("{} letters", letters.len());
    ctx.output.emit(&text, &letters)
}

fn page(letters: Vec<Letter>, offset: usize, limit: usize) -> Vec<Letter> {
    letters.into_iter().skip(offset).take(limit).collect()
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}

fn format_preview(body: &str) -> String {
    let decoded = html_escape::decode_html_entities(body).to_string();
    let compact = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.is_empty() {
        return "(empty letter)".to_string();
    }

    if compact.len() <= 120 {
        return compact;
    }

    let mut end = 120;
    while !compact.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &compact[..end])
}
