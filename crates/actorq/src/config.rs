// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide configuration and runtime tunables.

use std::time::Duration;

/// Fixed timeout for every `RegDriver` call. Expiry raises a timeout error
/// and the socket is discarded.
pub const REGISTRAR_CALL_TIMEOUT: Duration = Duration::from_millis(3000);

/// Upper bound for a `Subscription` worker's poll timeout, so that `stop`
/// stays responsive.
pub const SUBSCRIPTION_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Tunables for the shared/owned transport [`crate::context::Context`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextTunables {
    /// `None` keeps the transport's own implementation default.
    pub io_threads: Option<i32>,
    /// `None` keeps the transport's own implementation default.
    pub max_sockets: Option<i32>,
}

impl ContextTunables {
    pub fn apply(&self, ctx: &crate::context::Context) -> crate::Result<()> {
        if let Some(n) = self.io_threads {
            ctx.set_io_threads(n)?;
        }
        if let Some(n) = self.max_sockets {
            ctx.set_max_sockets(n)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registrar_timeout_is_three_seconds() {
        assert_eq!(REGISTRAR_CALL_TIMEOUT, Duration::from_secs(3));
    }

    #[test]
    fn subscription_poll_timeout_is_within_bound() {
        assert!(SUBSCRIPTION_POLL_TIMEOUT <= Duration::from_millis(100));
    }
}
