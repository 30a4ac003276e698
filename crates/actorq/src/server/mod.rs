// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Embeddable Proxy and Registrar server implementations. Both binary
//! crates in this workspace (`actorq-proxy`, `actorq-registrar`) are thin
//! CLI wrappers around the types in this module.

/// Two-socket forwarder (XSUB<->XPUB) plus a control responder.
pub mod proxy_server;
/// In-memory directory service with prefix-match discovery.
pub mod registrar_server;

pub use proxy_server::{ProxyServer, ProxyServerStats};
pub use registrar_server::{RegistrarServer, RegistrarStats};
