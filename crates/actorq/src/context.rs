// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide transport I/O context.
//!
//! A thin, cloneable facade around the transport library's context
//! singleton (`zmq::Context`, internally `Arc`-backed). [`instance`] returns
//! the process-global shared context; [`Context::create`] produces an
//! independent instance for isolated use (for example an embedded Proxy
//! server that must not share I/O threads with the caller's own actors).
//! Destroying the last handle to a `Context` blocks until its I/O threads
//! drain.

use std::sync::OnceLock;

/// A shared transport I/O context.
#[derive(Clone)]
pub struct Context(zmq::Context);

impl Context {
    /// Create an independent context, not shared with [`instance`].
    pub fn create() -> Self {
        Self(zmq::Context::new())
    }

    /// Tune the size of the I/O thread pool. Must be called before any
    /// socket is created against this context to take effect.
    pub fn set_io_threads(&self, count: i32) -> crate::Result<()> {
        self.0.set_io_threads(count)?;
        Ok(())
    }

    /// Tune the maximum number of sockets this context will allow.
    pub fn set_max_sockets(&self, count: i32) -> crate::Result<()> {
        self.0.set_max_sockets(count)?;
        Ok(())
    }

    pub(crate) fn raw(&self) -> &zmq::Context {
        &self.0
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

/// The process-wide shared context, created on first use.
pub fn instance() -> &'static Context {
    static INSTANCE: OnceLock<Context> = OnceLock::new();
    INSTANCE.get_or_init(Context::create)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_returns_same_handle() {
        let a = instance() as *const Context;
        let b = instance() as *const Context;
        assert_eq!(a, b);
    }

    #[test]
    fn create_is_independent_from_instance() {
        let created = Context::create();
        // Independently constructed contexts must still be individually
        // usable (able to have their tunables set) without affecting the
        // shared instance.
        created.set_io_threads(1).unwrap();
    }
}
