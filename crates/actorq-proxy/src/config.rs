// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Proxy server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Proxy server configuration, loadable from a JSON file and overridable by
/// environment variables and CLI flags (CLI wins, then env, then file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Host to advertise and bind on.
    #[serde(default = "default_host")]
    pub host: String,

    /// Publish-facing port; the subscribe port is `pub_port + 1` and the
    /// control port is `pub_port + 2`.
    #[serde(default = "default_pub_port")]
    pub pub_port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_pub_port() -> u16 {
    actorq::DEFAULT_PROXY_PUB_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            pub_port: default_pub_port(),
            log_level: default_log_level(),
        }
    }
}

impl ProxyConfig {
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Applies `ACTORQ_PROXY_HOST` / `ACTORQ_PROXY_PUB_PORT` overrides, if set.
    pub fn apply_env(mut self) -> Self {
        if let Ok(host) = std::env::var("ACTORQ_PROXY_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("ACTORQ_PROXY_PUB_PORT") {
            if let Ok(port) = port.parse() {
                self.pub_port = port;
            }
        }
        self
    }
}
