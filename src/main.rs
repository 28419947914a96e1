use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = webmail::cli::Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = webmail::run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "webmail=info",
        2 => "webmail=debug",
        _ => "webmail=trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}
