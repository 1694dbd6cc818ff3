//! CLI command implementations.

mod plan;
mod run;

pub use plan::plan;
pub use run::run;

use std::sync::Arc;

use serde::Deserialize;

use taskweave_core::reasoning::http::{HttpReasoning, HttpReasoningConfig};
use taskweave_core::reasoning::{EchoReasoning, Reasoning, ScriptedReasoning};
use taskweave_core::CoreError;

/// Backend selection shared by the `run` and `plan` commands.
pub struct BackendConfig {
    pub backend: String,
    pub script: Option<String>,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

/// Canned-reply file for deterministic offline runs.
#[derive(Debug, Deserialize)]
struct ScriptFile {
    replies: Vec<String>,
}

pub(crate) fn build_backend(config: &BackendConfig) -> Result<Arc<dyn Reasoning>, CoreError> {
    match config.backend.as_str() {
        "echo" => Ok(Arc::new(EchoReasoning)),
        "script" => {
            let path = config.script.as_deref().ok_or_else(|| {
                CoreError::Configuration(
                    "--backend script requires --script <file.yaml>".to_string(),
                )
            })?;
            let content = std::fs::read_to_string(path).map_err(|e| {
                CoreError::Configuration(format!("cannot read script file '{}': {}", path, e))
            })?;
            let script: ScriptFile = serde_yaml::from_str(&content).map_err(|e| {
                CoreError::Configuration(format!("invalid script file '{}': {}", path, e))
            })?;
            Ok(Arc::new(ScriptedReasoning::new(script.replies)))
        }
        "http" => {
            let backend = HttpReasoning::new(HttpReasoningConfig {
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
                model: config.model.clone(),
                ..Default::default()
            })?;
            Ok(Arc::new(backend))
        }
        other => Err(CoreError::Configuration(format!(
            "unknown backend '{}'; use echo, script, or http",
            other
        ))),
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: &str) -> BackendConfig {
        BackendConfig {
            backend: backend.to_string(),
            script: None,
            base_url: "https://api.anthropic.com".to_string(),
            api_key: String::new(),
            model: "m".to_string(),
        }
    }

    #[test]
    fn test_echo_backend_builds() {
        assert!(build_backend(&config("echo")).is_ok());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(build_backend(&config("carrier-pigeon")).is_err());
    }

    #[test]
    fn test_script_backend_requires_file() {
        assert!(build_backend(&config("script")).is_err());
    }

    #[test]
    fn test_http_backend_requires_api_key() {
        assert!(build_backend(&config("http")).is_err());
    }

    #[test]
    fn test_script_file_parses() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "replies:\n  - '{{\"summary\": \"ok\", \"status\": \"completed\"}}'"
        )
        .unwrap();

        let mut cfg = config("script");
        cfg.script = Some(file.path().to_string_lossy().to_string());
        assert!(build_backend(&cfg).is_ok());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long sentence", 10), "a very...");
    }
}
