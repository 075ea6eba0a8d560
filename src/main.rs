use std::path::PathBuf;

use clap::Parser;

use quickinfo_lsp::lsp::server::run_server;

/// Language server speaking the LSP over stdio.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Write the log to this file instead of the default data directory.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    run_server(args.log_file).await
}
