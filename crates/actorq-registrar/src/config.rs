// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registrar server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Registrar server configuration, loadable from a JSON file and
/// overridable by environment variables and CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    actorq::DEFAULT_REGISTRAR_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

impl RegistrarConfig {
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Applies `ACTORQ_REGISTRAR_HOST` / `ACTORQ_REGISTRAR_PORT` overrides, if set.
    pub fn apply_env(mut self) -> Self {
        if let Ok(host) = std::env::var("ACTORQ_REGISTRAR_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("ACTORQ_REGISTRAR_PORT") {
            if let Ok(port) = port.parse() {
                self.port = port;
            }
        }
        self
    }
}
