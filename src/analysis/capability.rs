//! Whether AI analysis can run in this process
//!
//! Built once at startup from the optional model configuration and handed to
//! the HTTP layer, which consults it per request.

use std::sync::Arc;

use serde::Serialize;

use super::analyzer::SessionAnalyzer;
use crate::config::ModelConfig;
use crate::core::{ViewerError, ViewerResult};

const NOT_CONFIGURED: &str = "No model configured. Set ANTHROPIC_API_KEY or OPENAI_API_KEY, \
or set SESSION_VIEWER_PROVIDER=ollama.";

#[derive(Clone)]
pub enum AnalysisCapability {
    Available(Arc<SessionAnalyzer>),
    Unavailable { reason: String },
}

/// Body of `GET /api/ai/status`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisStatus {
    pub available: bool,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub reason: Option<String>,
}

impl AnalysisCapability {
    pub fn available(analyzer: SessionAnalyzer) -> Self {
        AnalysisCapability::Available(Arc::new(analyzer))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        AnalysisCapability::Unavailable {
            reason: reason.into(),
        }
    }

    /// Resolve from an optional model configuration
    ///
    /// A provider that fails to build disables analysis instead of aborting
    /// startup; the reason is logged and reported by the status endpoint.
    pub fn from_model_config(config: Option<&ModelConfig>) -> Self {
        let Some(config) = config else {
            tracing::info!("AI analysis disabled: no model configured");
            return Self::unavailable(NOT_CONFIGURED);
        };

        match SessionAnalyzer::from_config(config) {
            Ok(analyzer) => {
                tracing::info!(provider = %config.provider, model = %config.model_id, "AI analysis enabled");
                Self::available(analyzer)
            }
            Err(e) => {
                tracing::warn!("AI analysis disabled: {:#}", e);
                Self::unavailable(format!("{:#}", e))
            }
        }
    }

    /// The analyzer, or `ViewerError::AnalysisUnavailable`
    pub fn analyzer(&self) -> ViewerResult<Arc<SessionAnalyzer>> {
        match self {
            AnalysisCapability::Available(analyzer) => Ok(analyzer.clone()),
            AnalysisCapability::Unavailable { reason } => {
                Err(ViewerError::AnalysisUnavailable(reason.clone()))
            }
        }
    }

    pub fn status(&self) -> AnalysisStatus {
        match self {
            AnalysisCapability::Available(analyzer) => AnalysisStatus {
                available: true,
                provider: Some(analyzer.provider_name().to_string()),
                model: Some(analyzer.model()),
                reason: None,
            },
            AnalysisCapability::Unavailable { reason } => AnalysisStatus {
                available: false,
                provider: None,
                model: None,
                reason: Some(reason.clone()),
            },
        }
    }
}

impl std::fmt::Debug for AnalysisCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AnalysisCapability").field(&self.status()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::standard_loop::testing::ScriptedProvider;

    #[test]
    fn test_unconfigured_is_unavailable() {
        let capability = AnalysisCapability::from_model_config(None);
        assert!(!capability.status().available);
        assert!(matches!(
            capability.analyzer(),
            Err(ViewerError::AnalysisUnavailable(_))
        ));

        let status = capability.status();
        assert!(!status.available);
        assert!(status.reason.unwrap().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_configured_is_available() {
        let config = ModelConfig::ollama(None, None).unwrap();
        let capability = AnalysisCapability::from_model_config(Some(&config));

        let status = capability.status();
        assert!(status.available);
        assert_eq!(status.provider.as_deref(), Some("ollama"));
        assert_eq!(status.model.as_deref(), Some("qwen3:4b"));
    }

    #[test]
    fn test_injected_analyzer() {
        let provider = std::sync::Arc::new(ScriptedProvider::new(Vec::new()));
        let capability = AnalysisCapability::available(SessionAnalyzer::new(provider));
        assert!(capability.analyzer().is_ok());
        assert_eq!(capability.status().provider.as_deref(), Some("scripted"));
    }
}
