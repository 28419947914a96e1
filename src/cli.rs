use clap::{ArgAction, Args, Parser, Subcommand};

use crate::api::models::Folder;

#[derive(Debug, Parser)]
#[command(name = "webmail", version, about = "Command line client for the webmail letter store")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "default",
        help = "Profile name to use"
    )]
    pub profile: String,
    #[arg(long, global = true, help = "Emit JSON output")]
    pub json: bool,
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Verbose logging")]
    pub verbose: u8,
    #[arg(long, global = true, help = "Override the letter store base URL")]
    pub base_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    List(ListArgs),
    Folder(FolderArgs),
    Get(IdArgs),
    Send(SendArgs),
    Read(ReadArgs),
    Move(MoveArgs),
    Delete(IdArgs),
    Stats,
    Health,
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, help = "Only letters in this folder (inbox, sent, drafts, trash)")]
    pub folder: Option<Folder>,
    #[arg(long, default_value_t = 20, help = "Maximum letters to show")]
    pub limit: usize,
    #[arg(long, default_value_t = 0, help = "Letters to skip")]
    pub offset: usize,
}

#[derive(Debug, Args)]
pub struct FolderArgs {
    #[arg(help = "Folder to open (inbox, sent, drafts, trash)")]
    pub name: Folder,
    #[arg(long, default_value_t = 20, help = "Maximum letters to show")]
    pub limit: usize,
    #[arg(long, default_value_t = 0, help = "Letters to skip")]
    pub offset: usize,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    #[arg(help = "Letter id")]
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    #[arg(long, help = "Recipient address")]
    pub to: String,
    #[arg(long, visible_alias = "subj", help = "Letter subject")]
    pub subject: String,
    #[arg(long, help = "Letter body")]
    pub body: String,
    #[arg(long, help = "Folder to file the letter under (default: sent)")]
    pub folder: Option<Folder>,
}

#[derive(Debug, Args)]
pub struct ReadArgs {
    #[arg(help = "Letter id")]
    pub id: i64,
    #[arg(long, help = "Mark as unread instead")]
    pub unread: bool,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    #[arg(help = "Letter id")]
    pub id: i64,
    #[arg(help = "Destination folder")]
    pub folder: Folder,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    Show,
    Set(ConfigSetArgs),
}

#[derive(Debug, Args)]
pub struct ConfigSetArgs {
    #[arg(long = "url", help = "Letter store base URL")]
    pub url: Option<String>,
    #[arg(long, help = "Per-request timeout in milliseconds")]
    pub timeout_ms: Option<u64>,
    #[arg(long, help = "Response cache time-to-live in milliseconds")]
    pub cache_ttl_ms: Option<u64>,
}
