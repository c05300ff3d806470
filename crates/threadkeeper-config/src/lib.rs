// SPDX-FileCopyrightText: 2026 Threadkeeper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Threadkeeper.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use threadkeeper_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("completion channel: {}", config.discord.completion_channel);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{CompletionTarget, ThreadkeeperConfig};
pub use validation::validate_for_serve;

/// Loads the layered configuration and validates it, collecting every
/// problem rather than stopping at the first.
pub fn load_and_validate() -> Result<ThreadkeeperConfig, Vec<ConfigError>> {
    let config = loader::load_config()
        .map_err(|err| diagnostic::figment_to_config_errors(err, &read_config_files()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Like [`load_and_validate`] but from a TOML string, without files or
/// environment overrides.
pub fn load_and_validate_str(toml_content: &str) -> Result<ThreadkeeperConfig, Vec<ConfigError>> {
    let config = loader::load_config_from_str(toml_content).map_err(|err| {
        let inline = [("<inline>".to_string(), toml_content.to_string())];
        diagnostic::figment_to_config_errors(err, &inline)
    })?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Contents of the config files that exist, keyed by the path figment
/// reports, so diagnostics can point into them.
fn read_config_files() -> Vec<(String, String)> {
    loader::config_file_paths()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}
