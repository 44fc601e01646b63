pub mod core;
pub mod session;
pub mod export;

// Runtime configuration and logging
pub mod config;
pub mod logging;

// AI analysis: model providers, tools, the agent loop and the analyzer
pub mod llm;
pub mod tools;
pub mod agent;
pub mod analysis;

// Outer surfaces
pub mod server;
pub mod cli;
