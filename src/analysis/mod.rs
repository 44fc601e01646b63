//! Optional AI analysis of sessions
//!
//! - `insights` - deterministic statistics, error extraction and search
//! - `analyzer` - `SessionAnalyzer`, prompts run through a tool-calling agent
//! - `capability` - `AnalysisCapability`, injected into the HTTP layer

pub mod analyzer;
pub mod capability;
pub mod insights;

pub use analyzer::{ChatTurn, SessionAnalyzer};
pub use capability::{AnalysisCapability, AnalysisStatus};
