// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error and result types shared across the actorq runtime.

use thiserror::Error;

/// Errors returned by actorq operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad topic parts, null mimetype, malformed address, etc.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A registrar call or a `sync_publish` exceeded its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Send/recv failure, bind/connect failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Schema encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Underlying ZeroMQ error.
    #[error("zmq error: {0}")]
    Zmq(#[from] zmq::Error),

    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for actorq results.
pub type Result<T> = std::result::Result<T, Error>;
