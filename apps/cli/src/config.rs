// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI settings loaded from environment variables.

/// Output format of log lines and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Tracing filter directives.
    pub log_filter: String,
    pub log_format: LogFormat,
    /// Options file used when `--config` is not given.
    pub config_path: Option<String>,
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            log_filter: std::env::var("COBIE_LOG")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info,cobie_lite_core=debug".into()),
            log_format: match std::env::var("COBIE_LOG_FORMAT") {
                Ok(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            config_path: std::env::var("COBIE_CONFIG")
                .ok()
                .filter(|path| !path.trim().is_empty()),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
