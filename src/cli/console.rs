use colored::*;

use crate::analysis::AnalysisStatus;
use crate::config::ViewerConfig;
use crate::export::format_timestamp;
use crate::session::SessionSummary;

/// Console handles all terminal output with colored formatting
pub struct Console {
    accent_color: Color,
    muted_color: Color,
}

impl Console {
    pub fn new() -> Self {
        Self {
            accent_color: Color::Cyan,
            muted_color: Color::BrightBlack,
        }
    }

    /// Print the startup banner for `serve`
    pub fn print_banner(&self, config: &ViewerConfig, session_count: usize, ai: &AnalysisStatus) {
        let rule = "=".repeat(60);
        println!("{}", rule.color(self.accent_color));
        println!("{}", "  Session Viewer".color(self.accent_color).bold());
        println!("{}", rule.color(self.accent_color));
        println!(
            "  {} {}",
            "Sessions:".bold(),
            config.storage_dir.display()
        );
        println!("  {} {}", "Found:".bold(), session_count);
        println!("  {} {}", "URL:".bold(), config.display_url().underline());

        match (&ai.provider, &ai.model) {
            (Some(provider), Some(model)) if ai.available => {
                println!("  {} {} ({})", "AI:".bold(), "enabled".green(), format!("{}/{}", provider, model));
            }
            _ => {
                println!("  {} {}", "AI:".bold(), "disabled".yellow());
                if let Some(reason) = &ai.reason {
                    println!("      {}", reason.color(self.muted_color));
                }
            }
        }

        println!("{}", rule.color(self.accent_color));
        println!("{}", "  Press Ctrl+C to stop".color(self.muted_color));
        println!();
    }

    /// Print one line per session, newest first
    pub fn print_sessions(&self, sessions: &[SessionSummary]) {
        if sessions.is_empty() {
            println!("{}", "No sessions found.".color(self.muted_color));
            return;
        }

        for session in sessions {
            println!(
                "{}  {}  {}  {}",
                session.session_id.color(self.accent_color).bold(),
                session.session_type,
                format!("{} messages", session.message_count),
                format!("updated {}", format_timestamp(&session.updated_at)).color(self.muted_color)
            );
        }
        println!();
        println!("{} session(s)", sessions.len());
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
