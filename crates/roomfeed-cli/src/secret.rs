//! Secret reference resolver.
//!
//! Credential values in `config.toml` (and the matching environment
//! variables) may point at a secret stored elsewhere:
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and takes the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is used as-is

use std::process::Command;

use thiserror::Error;

/// A secret reference that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    #[error("environment variable `{0}` is not set")]
    MissingEnv(String),

    #[error("failed to run `pass show {path}`: {message}")]
    Pass { path: String, message: String },
}

/// Returns true if `value` is a reference rather than a literal secret.
pub fn is_reference(value: &str) -> bool {
    value.starts_with("pass::") || value.starts_with("env::")
}

/// Resolves a value that may carry a secret reference prefix.
pub fn resolve(value: &str) -> Result<String, SecretError> {
    if let Some(path) = value.strip_prefix("pass::") {
        resolve_pass(path)
    } else if let Some(var) = value.strip_prefix("env::") {
        std::env::var(var).map_err(|_| SecretError::MissingEnv(var.to_string()))
    } else {
        Ok(value.to_string())
    }
}

fn resolve_pass(path: &str) -> Result<String, SecretError> {
    let pass_error = |message: String| SecretError::Pass {
        path: path.to_string(),
        message,
    };

    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| pass_error(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(pass_error(format!(
            "exit {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| pass_error("no output".to_string()))
}
