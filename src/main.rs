use std::process::ExitCode;

use clap::Parser;
use session_viewer::cli::{self, Cli, Console};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            Console::new().print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
