//! Command-line entrypoint
//!
//! With no subcommand the viewer serves the HTTP API and UI. `list` and
//! `export` work against the same storage directory without starting a server.

mod console;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::analysis::AnalysisCapability;
use crate::config::{ModelConfig, ViewerConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_STORAGE_DIR};
use crate::core::ViewerError;
use crate::export::{self, ExportFormat};
use crate::logging::{init_logging, LogConfig};
use crate::server::{self, AppState};
use crate::session::SessionRepository;

pub use console::Console;

const STDOUT_MARKER: &str = "-";

#[derive(Debug, Parser)]
#[command(
    name = "session-viewer",
    version,
    about = "Browse, export and analyze stored agent sessions",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Directory containing session_* folders
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Same as DIRECTORY
    #[arg(long = "dir", value_name = "DIR", conflicts_with = "directory")]
    pub dir: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Do not open a browser window
    #[arg(long)]
    pub no_open: bool,

    /// Also write JSON logs to this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl ServeArgs {
    pub fn storage_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .or_else(|| self.directory.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List sessions, most recently updated first
    List {
        #[arg(long, default_value = DEFAULT_STORAGE_DIR)]
        dir: PathBuf,
    },

    /// Export one session to a file
    Export {
        session_id: String,

        #[arg(long, default_value = DEFAULT_STORAGE_DIR)]
        dir: PathBuf,

        /// markdown, json or text
        #[arg(long, default_value = "markdown")]
        format: ExportFormat,

        /// Output file, or "-" for stdout (default: session_<id>.<ext>)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Run the parsed command line
pub async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        None => serve(cli.serve).await,
        Some(Command::List { dir }) => {
            let _guard = init_logging(&LogConfig::new().with_default_directive("warn"))?;
            list(&dir)
        }
        Some(Command::Export {
            session_id,
            dir,
            format,
            output,
        }) => {
            let _guard = init_logging(&LogConfig::new().with_default_directive("warn"))?;
            export_session(&dir, &session_id, format, output.as_deref())
        }
    }
}

async fn serve(args: ServeArgs) -> Result<ExitCode> {
    let _guard = init_logging(&LogConfig::new().with_log_dir(args.log_dir.clone()))?;
    let console = Console::new();

    let model = match ModelConfig::from_env() {
        Ok(model) => model,
        Err(e) => {
            tracing::warn!("Ignoring model configuration: {}", e);
            None
        }
    };
    let config = ViewerConfig::new(args.storage_dir())
        .with_host(args.host.clone())
        .with_port(args.port)
        .with_open_browser(!args.no_open)
        .with_model(model);

    let Some(repository) = open_repository(&console, &config.storage_dir) else {
        return Ok(ExitCode::FAILURE);
    };
    let session_count = repository.list_sessions().len();

    let analysis = AnalysisCapability::from_model_config(config.model.as_ref());
    console.print_banner(&config, session_count, &analysis.status());

    let listener = server::bind(&config.bind_address()).await?;
    if config.open_browser {
        open_url_in_browser(&config.display_url());
    }

    server::serve(listener, AppState::new(repository, analysis)).await?;
    Ok(ExitCode::SUCCESS)
}

fn list(dir: &Path) -> Result<ExitCode> {
    let console = Console::new();
    let Some(repository) = open_repository(&console, dir) else {
        return Ok(ExitCode::FAILURE);
    };

    console.print_sessions(&repository.list_sessions());
    Ok(ExitCode::SUCCESS)
}

fn export_session(
    dir: &Path,
    session_id: &str,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let console = Console::new();
    let Some(repository) = open_repository(&console, dir) else {
        return Ok(ExitCode::FAILURE);
    };

    let Some(session) = repository.get_session(session_id) else {
        console.print_error(&ViewerError::SessionNotFound(session_id.to_string()).to_string());
        return Ok(ExitCode::FAILURE);
    };
    let body = export::format_session(&session, format)?;

    match output {
        Some(path) if path == Path::new(STDOUT_MARKER) => {
            print!("{}", body);
        }
        _ => {
            let path = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(export::export_filename(session_id, format)));
            std::fs::write(&path, body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            console.print_success(&format!("Exported {} to {}", session_id, path.display()));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Open the storage root, reporting a missing or invalid directory to the user
fn open_repository(console: &Console, dir: &Path) -> Option<SessionRepository> {
    match SessionRepository::open(dir) {
        Ok(repository) => Some(repository),
        Err(e) => {
            console.print_error(&e.to_string());
            None
        }
    }
}

fn open_url_in_browser(url: &str) {
    tracing::debug!("Opening browser at {}", url);
    launch_browser(browser_command(url), url);
}

fn browser_command(url: &str) -> Option<std::process::Command> {
    let (program, args): (&str, Vec<&str>) = if cfg!(target_os = "macos") {
        ("open", vec![url])
    } else if cfg!(target_os = "windows") {
        ("cmd", vec!["/C", "start", "", url])
    } else if cfg!(target_os = "linux") {
        ("xdg-open", vec![url])
    } else {
        return None;
    };

    let mut command = std::process::Command::new(program);
    command.args(args);
    Some(command)
}

/// Start the browser; failures are logged, never fatal
fn launch_browser(command: Option<std::process::Command>, url: &str) -> bool {
    let Some(mut command) = command else {
        tracing::warn!("No known browser opener on this platform; open {} manually", url);
        return false;
    };

    match command.spawn() {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(
                "Failed to open browser ({}); open {} manually or pass --no-open",
                e,
                url
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::write_sample_sessions;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["session-viewer"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.storage_dir(), PathBuf::from(DEFAULT_STORAGE_DIR));
        assert_eq!(cli.serve.port, 8000);
        assert_eq!(cli.serve.host, "0.0.0.0");
        assert!(!cli.serve.no_open);
    }

    #[test]
    fn test_serve_directory_forms() {
        let positional = Cli::try_parse_from(["session-viewer", "/data/sessions"]).unwrap();
        assert_eq!(positional.serve.storage_dir(), PathBuf::from("/data/sessions"));

        let flag = Cli::try_parse_from([
            "session-viewer",
            "--dir",
            "/data/other",
            "--port",
            "9000",
            "--no-open",
        ])
        .unwrap();
        assert_eq!(flag.serve.storage_dir(), PathBuf::from("/data/other"));
        assert_eq!(flag.serve.port, 9000);
        assert!(flag.serve.no_open);

        assert!(Cli::try_parse_from(["session-viewer", "/a", "--dir", "/b"]).is_err());
    }

    #[test]
    fn test_export_arguments() {
        let cli = Cli::try_parse_from([
            "session-viewer",
            "export",
            "abc",
            "--format",
            "json",
            "--output",
            "-",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Export {
                session_id,
                format,
                output,
                dir,
            }) => {
                assert_eq!(session_id, "abc");
                assert_eq!(format, ExportFormat::Json);
                assert_eq!(output, Some(PathBuf::from("-")));
                assert_eq!(dir, PathBuf::from(DEFAULT_STORAGE_DIR));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_export_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["session-viewer", "export", "abc", "--format", "pdf"]).is_err());
    }

    #[test]
    fn test_export_writes_file() {
        let temp = tempfile::TempDir::new().unwrap();
        write_sample_sessions(temp.path());
        let out = temp.path().join("out.md");

        let code = export_session(temp.path(), "test_1", ExportFormat::Markdown, Some(&out)).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("test_1"));
        assert!(written.contains("Hello, agent!"));
    }

    #[test]
    fn test_missing_directory_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        assert_eq!(list(&missing).unwrap(), ExitCode::FAILURE);
        assert_eq!(
            export_session(&missing, "test_1", ExportFormat::Text, None).unwrap(),
            ExitCode::FAILURE
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_browser_command_linux() {
        let command = browser_command("http://localhost:8000").unwrap();
        assert_eq!(command.get_program(), "xdg-open");
        assert_eq!(command.get_args().collect::<Vec<_>>(), ["http://localhost:8000"]);
    }

    #[test]
    fn test_browser_launch_failure_is_reported() {
        let missing = std::process::Command::new("session-viewer-no-such-browser");
        assert!(!launch_browser(Some(missing), "http://localhost:8000"));
        assert!(!launch_browser(None, "http://localhost:8000"));
    }

    #[test]
    fn test_unknown_session_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        write_sample_sessions(temp.path());

        let code = export_session(temp.path(), "missing", ExportFormat::Json, None).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }
}
