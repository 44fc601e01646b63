pub mod config;
pub mod standard_loop;

pub use config::AgentConfig;
pub use standard_loop::StandardAgent;
