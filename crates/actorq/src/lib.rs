// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # actorq - topic-based publish/subscribe actor runtime
//!
//! `actorq` is the client-side runtime for a publish/subscribe actor
//! framework aimed at distributed scientific-computing nodes. Actors
//! exchange typed, self-describing messages over a cloud of stateless
//! message-routing [`Proxy`][server::proxy_server::ProxyServer] instances; a
//! separate [`Registrar`][server::registrar_server::RegistrarServer] service
//! lets actors advertise themselves and discover peers by topic.
//!
//! The reference transport is ZeroMQ (the `zmq` crate): connectionless
//! delivery with prefix-based topic filtering. The design does not assume
//! ZeroMQ specifics beyond that contract.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use actorq::{Actor, Topic};
//!
//! # fn main() -> actorq::Result<()> {
//! let actor = Actor::new("demo-actor");
//! let conn = actor.connect()?;
//! let topic = Topic::build2("sensors", "temperature")?;
//! let msg = actorq::make_message(topic, 42.0f64)?;
//! actor.publish(&conn, &msg)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules overview
//!
//! - [`topic`] - hierarchical `domain[:subject[:type]]` identifier
//! - [`message`] - `Message` = Topic + Meta + payload, and the `make_message`/
//!   `parse_message`/`make_response` helpers
//! - [`wire`] - generated `Meta`/`Data`/`Registration` records and the MIME
//!   datatype tags
//! - [`context`] - process-wide transport I/O context
//! - [`driver`] - `ProxyDriver` and `RegDriver`, the client-side sockets
//! - [`pool`] - `ConnectionPool`, scoped driver acquisition
//! - [`subscription`] - a running filter+callback pair on its own worker
//! - [`actor`] - the public `Actor` API: publish / sync_publish / subscribe /
//!   register / discover
//! - [`server`] - the embeddable Proxy and Registrar server implementations

/// Address value objects for proxy and registrar endpoints.
pub mod address;
/// The public `Actor` API.
pub mod actor;
/// Process-wide configuration and tunables.
pub mod config;
/// Process-wide transport I/O context.
pub mod context;
/// Client-side drivers (`ProxyDriver`, `RegDriver`).
pub mod driver;
/// Error and result types.
pub mod error;
/// Message = Topic + Meta + payload.
pub mod message;
/// Per-address connection pool with scoped release.
pub mod pool;
/// Embeddable Proxy and Registrar server implementations.
pub mod server;
/// A running subscription (filter + callback) on a dedicated worker.
pub mod subscription;
/// Hierarchical topic identifier.
pub mod topic;
/// Wire records (`Meta`, `Data`, `Registration`) and MIME datatype tags.
pub mod wire;

pub use actor::Actor;
pub use address::{ProxyAddress, RegAddress, DEFAULT_PROXY_PUB_PORT, DEFAULT_REGISTRAR_PORT};
pub use error::{Error, Result};
pub use message::{make_message, make_response, parse_message, Message};
pub use pool::{ConnectionPool, ConnectionSetup};
pub use subscription::SubscriptionHandle;
pub use topic::Topic;
