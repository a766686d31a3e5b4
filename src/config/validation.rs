//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Root must exist and be a directory
//! - Ignore patterns must compile
//! - TLS material must be present on disk when configured
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs before any listener is bound

use std::path::PathBuf;

use regex::Regex;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid root directory: {0}")]
    RootMissing(PathBuf),

    #[error("Root is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("Invalid ignore pattern {pattern:?}: {source}")]
    IgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Fallback document must be a relative file name: {0:?}")]
    FallbackPath(String),

    #[error("TLS file not found: {0}")]
    TlsFileMissing(PathBuf),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match std::fs::metadata(&config.root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => errors.push(ValidationError::RootNotDirectory(config.root.clone())),
        Err(_) => errors.push(ValidationError::RootMissing(config.root.clone())),
    }

    for pattern in &config.ignores {
        if let Err(source) = Regex::new(pattern) {
            errors.push(ValidationError::IgnorePattern {
                pattern: pattern.clone(),
                source,
            });
        }
    }

    if config.fallback.starts_with('/') || config.fallback.split('/').any(|s| s == "..") {
        errors.push(ValidationError::FallbackPath(config.fallback.clone()));
    }

    if let Some(tls) = &config.tls {
        for path in [&tls.cert_path, &tls.key_path] {
            if !path.exists() {
                errors.push(ValidationError::TlsFileMissing(path.clone()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
