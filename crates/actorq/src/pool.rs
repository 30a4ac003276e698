// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-address connection pool with scoped release.
//!
//! Holds two address-keyed caches of idle drivers (one for proxies, one for
//! registrars), each a LIFO stack. `get_*_connection` pops the top idle
//! entry or, failing that, constructs a new driver via an injectable
//! factory hook, optionally applying the pool's default
//! [`ConnectionSetup`]. The returned scoped handle pushes its driver back
//! onto the pool on drop; a handle whose driver is moved out (for a
//! [`crate::subscription::Subscription`]) is not returned until that
//! subscription ends.

use crate::address::{ProxyAddress, RegAddress};
use crate::context::Context;
use crate::driver::{ProxyDriver, RegDriver};
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Capability-set injection point for driver connection setup: optional
/// hooks to set transport-level socket options before connecting, and to
/// pause after connecting (the transport is connectionless and needs time
/// for subscriptions to propagate).
#[derive(Clone, Default)]
pub struct ConnectionSetup {
    pre: Option<Arc<dyn Fn(&zmq::Socket) -> Result<()> + Send + Sync>>,
    post: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl ConnectionSetup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pre_connection(
        mut self,
        f: impl Fn(&zmq::Socket) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.pre = Some(Arc::new(f));
        self
    }

    pub fn with_post_connection(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.post = Some(Arc::new(f));
        self
    }

    pub(crate) fn pre_connection(&self, socket: &zmq::Socket) -> Result<()> {
        match &self.pre {
            Some(f) => f(socket),
            None => Ok(()),
        }
    }

    pub(crate) fn post_connection(&self) {
        if let Some(f) = &self.post {
            f();
        }
    }
}

impl std::fmt::Debug for ConnectionSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSetup")
            .field("pre_connection", &self.pre.is_some())
            .field("post_connection", &self.post.is_some())
            .finish()
    }
}

type ProxyFactory = Arc<dyn Fn(&Context, ProxyAddress, &ConnectionSetup) -> Result<ProxyDriver> + Send + Sync>;
type RegFactory = Arc<dyn Fn(&Context, RegAddress, &ConnectionSetup) -> Result<RegDriver> + Send + Sync>;

struct PoolInner {
    ctx: Context,
    setup: ConnectionSetup,
    proxy_idle: Mutex<HashMap<ProxyAddress, Vec<ProxyDriver>>>,
    reg_idle: Mutex<HashMap<RegAddress, Vec<RegDriver>>>,
    proxy_factory: ProxyFactory,
    reg_factory: RegFactory,
    closed: AtomicBool,
}

/// A thread-safe, address-keyed cache of idle proxy/registrar drivers.
#[derive(Clone)]
pub struct ConnectionPool(Arc<PoolInner>);

impl ConnectionPool {
    pub fn new(ctx: Context, setup: ConnectionSetup) -> Self {
        Self(Arc::new(PoolInner {
            ctx,
            setup,
            proxy_idle: Mutex::new(HashMap::new()),
            reg_idle: Mutex::new(HashMap::new()),
            proxy_factory: Arc::new(|ctx, addr, setup| ProxyDriver::connect(ctx, addr, setup)),
            reg_factory: Arc::new(|ctx, addr, setup| Ok(RegDriver::new(ctx.clone(), addr, setup.clone()))),
            closed: AtomicBool::new(false),
        }))
    }

    /// Substitute the proxy driver factory, used by tests to install a fake
    /// driver without a real transport.
    pub fn with_proxy_factory(
        mut self,
        factory: impl Fn(&Context, ProxyAddress, &ConnectionSetup) -> Result<ProxyDriver>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Arc::get_mut(&mut self.0)
            .expect("factory override must happen before the pool is cloned/shared")
            .proxy_factory = Arc::new(factory);
        self
    }

    /// Substitute the registrar driver factory; see [`Self::with_proxy_factory`].
    pub fn with_reg_factory(
        mut self,
        factory: impl Fn(&Context, RegAddress, &ConnectionSetup) -> Result<RegDriver>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Arc::get_mut(&mut self.0)
            .expect("factory override must happen before the pool is cloned/shared")
            .reg_factory = Arc::new(factory);
        self
    }

    /// Checks out an idle driver for `address`, or creates one.
    pub fn get_proxy_connection(&self, address: &ProxyAddress) -> Result<ProxyConnection> {
        self.ensure_open()?;
        let idle = {
            let mut idle = self.0.proxy_idle.lock();
            idle.get_mut(address).and_then(|stack| stack.pop())
        };
        let driver = match idle {
            Some(driver) => driver,
            None => (self.0.proxy_factory)(&self.0.ctx, address.clone(), &self.0.setup)?,
        };
        Ok(ProxyConnection {
            pool: self.clone(),
            address: address.clone(),
            driver: Some(driver),
        })
    }

    /// Checks out an idle driver for `address`, or creates one.
    pub fn get_reg_connection(&self, address: &RegAddress) -> Result<RegConnection> {
        self.ensure_open()?;
        let idle = {
            let mut idle = self.0.reg_idle.lock();
            idle.get_mut(address).and_then(|stack| stack.pop())
        };
        let driver = match idle {
            Some(driver) => driver,
            None => (self.0.reg_factory)(&self.0.ctx, address.clone(), &self.0.setup)?,
        };
        Ok(RegConnection {
            pool: self.clone(),
            address: address.clone(),
            driver: Some(driver),
        })
    }

    /// Number of idle drivers currently cached for `address` (test/metrics
    /// introspection).
    pub fn idle_proxy_count(&self, address: &ProxyAddress) -> usize {
        self.0
            .proxy_idle
            .lock()
            .get(address)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    pub fn idle_reg_count(&self, address: &RegAddress) -> usize {
        self.0
            .reg_idle
            .lock()
            .get(address)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.0.closed.load(Ordering::Acquire) {
            return Err(crate::Error::InvalidArgument(
                "connection pool has been closed".into(),
            ));
        }
        Ok(())
    }

    fn return_proxy(&self, address: ProxyAddress, driver: ProxyDriver) {
        if self.0.closed.load(Ordering::Acquire) {
            return;
        }
        self.0.proxy_idle.lock().entry(address).or_default().push(driver);
    }

    fn return_reg(&self, address: RegAddress, driver: RegDriver) {
        if self.0.closed.load(Ordering::Acquire) {
            return;
        }
        self.0.reg_idle.lock().entry(address).or_default().push(driver);
    }

    /// Closes every cached driver and marks the pool unusable. Drivers
    /// already checked out are dropped (and discarded, not returned) as
    /// their scoped handles go out of scope.
    pub fn close(&self) {
        self.0.closed.store(true, Ordering::Release);
        self.0.proxy_idle.lock().clear();
        self.0.reg_idle.lock().clear();
    }
}

impl Drop for PoolInner {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// An exclusively held [`ProxyDriver`], returned to the pool on drop unless
/// moved out via [`Self::into_parts`] first (used by
/// [`crate::subscription::Subscription`]).
pub struct ProxyConnection {
    pool: ConnectionPool,
    address: ProxyAddress,
    driver: Option<ProxyDriver>,
}

impl ProxyConnection {
    pub fn driver(&self) -> &ProxyDriver {
        self.driver.as_ref().expect("driver present while checked out")
    }

    pub fn address(&self) -> &ProxyAddress {
        &self.address
    }

    /// Moves the driver out for longer-lived exclusive ownership, along
    /// with a releaser that returns it to the pool when dropped/invoked.
    pub(crate) fn into_parts(mut self) -> (ProxyDriver, ProxyReleaser) {
        let driver = self.driver.take().expect("driver present while checked out");
        let releaser = ProxyReleaser {
            pool: self.pool.clone(),
            address: self.address.clone(),
        };
        (driver, releaser)
    }
}

impl Drop for ProxyConnection {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            self.pool.return_proxy(self.address.clone(), driver);
        }
    }
}

/// An exclusively held [`RegDriver`], returned to the pool on drop.
pub struct RegConnection {
    pool: ConnectionPool,
    address: RegAddress,
    driver: Option<RegDriver>,
}

impl RegConnection {
    pub fn driver_mut(&mut self) -> &mut RegDriver {
        self.driver.as_mut().expect("driver present while checked out")
    }

    pub fn address(&self) -> &RegAddress {
        &self.address
    }
}

impl Drop for RegConnection {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            self.pool.return_reg(self.address.clone(), driver);
        }
    }
}

/// Returns a moved-out [`ProxyDriver`] to the pool it was checked out from.
pub(crate) struct ProxyReleaser {
    pool: ConnectionPool,
    address: ProxyAddress,
}

impl ProxyReleaser {
    pub(crate) fn release(self, driver: ProxyDriver) {
        self.pool.return_proxy(self.address, driver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// A fake proxy driver substitute is not possible since `ProxyDriver`
    /// is a concrete type wrapping real sockets; instead these tests drive
    /// the pool's LIFO bookkeeping directly against a context that never
    /// actually binds/connects over the network (zmq connect() to a tcp://
    /// endpoint does not block or fail even without a listener).
    fn test_pool() -> ConnectionPool {
        ConnectionPool::new(Context::create(), ConnectionSetup::new())
    }

    #[test]
    fn get_then_release_then_get_returns_same_idle_count() {
        let pool = test_pool();
        let addr = ProxyAddress::new("127.0.0.1", 17771);

        let conn = pool.get_proxy_connection(&addr).unwrap();
        assert_eq!(pool.idle_proxy_count(&addr), 0);
        drop(conn);
        assert_eq!(pool.idle_proxy_count(&addr), 1);

        let _conn2 = pool.get_proxy_connection(&addr).unwrap();
        assert_eq!(pool.idle_proxy_count(&addr), 0);
    }

    #[test]
    fn n_gets_and_releases_leave_min_n_peak_idle() {
        let pool = test_pool();
        let addr = ProxyAddress::new("127.0.0.1", 17781);

        let c1 = pool.get_proxy_connection(&addr).unwrap();
        let c2 = pool.get_proxy_connection(&addr).unwrap();
        let c3 = pool.get_proxy_connection(&addr).unwrap();
        drop(c1);
        drop(c2);
        drop(c3);

        assert_eq!(pool.idle_proxy_count(&addr), 3);
    }

    #[test]
    fn closed_pool_rejects_new_connections() {
        let pool = test_pool();
        pool.close();
        let addr = ProxyAddress::new("127.0.0.1", 17791);
        let err = pool.get_proxy_connection(&addr).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn reg_connection_round_trips_through_pool() {
        let pool = test_pool();
        let addr = RegAddress::new("127.0.0.1", 18888);
        let conn = pool.get_reg_connection(&addr).unwrap();
        assert_eq!(pool.idle_reg_count(&addr), 0);
        drop(conn);
        assert_eq!(pool.idle_reg_count(&addr), 1);
    }
}
