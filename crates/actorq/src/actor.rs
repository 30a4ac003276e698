// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The public `Actor` API: publish / sync_publish / subscribe / unsubscribe
//! / register / deregister / discover. Owns a [`ConnectionPool`] and its
//! own defaults (name, default Proxy address, default Registrar address).

use crate::address::{ProxyAddress, RegAddress};
use crate::context::{self, Context};
use crate::driver::ProxyDriver;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::pool::{ConnectionPool, ConnectionSetup, ProxyConnection};
use crate::subscription::{Callback, SubscriptionHandle};
use crate::topic::Topic;
use crate::wire::registration::OwnerType;
use crate::wire::Registration;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// A named endpoint that can publish, subscribe, and register.
pub struct Actor {
    name: String,
    default_proxy: ProxyAddress,
    default_registrar: RegAddress,
    pool: ConnectionPool,
    reply_counter: AtomicU64,
}

impl Actor {
    /// An actor with default proxy/registrar addresses (overridable via
    /// `ACTORQ_PROXY_HOST`/`ACTORQ_PROXY_PUB_PORT`/`ACTORQ_REGISTRAR_HOST`/
    /// `ACTORQ_REGISTRAR_PORT`) and the shared, process-wide transport
    /// context.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_addresses(
            name,
            ProxyAddress::from_env_or_default(),
            RegAddress::from_env_or_default(),
        )
    }

    pub fn with_addresses(
        name: impl Into<String>,
        default_proxy: ProxyAddress,
        default_registrar: RegAddress,
    ) -> Self {
        Self {
            name: name.into(),
            default_proxy,
            default_registrar,
            pool: ConnectionPool::new(context::instance().clone(), ConnectionSetup::new()),
            reply_counter: AtomicU64::new(0),
        }
    }

    /// Build an actor against an independently owned [`Context`] (for
    /// isolated use, e.g. tests that must not share I/O threads with other
    /// actors in the same process).
    pub fn with_context(
        name: impl Into<String>,
        ctx: Context,
        default_proxy: ProxyAddress,
        default_registrar: RegAddress,
        setup: ConnectionSetup,
    ) -> Self {
        Self {
            name: name.into(),
            default_proxy,
            default_registrar,
            pool: ConnectionPool::new(ctx, setup),
            reply_counter: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_proxy(&self) -> &ProxyAddress {
        &self.default_proxy
    }

    pub fn default_registrar(&self) -> &RegAddress {
        &self.default_registrar
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Connects to the actor's default Proxy.
    pub fn connect(&self) -> Result<ProxyConnection> {
        self.pool.get_proxy_connection(&self.default_proxy)
    }

    /// Connects to an explicit Proxy address.
    pub fn connect_to(&self, address: &ProxyAddress) -> Result<ProxyConnection> {
        self.pool.get_proxy_connection(address)
    }

    /// Sends `msg` on `conn`'s driver. Non-blocking from the transport's
    /// standpoint: returns once the message is queued.
    pub fn publish(&self, conn: &ProxyConnection, msg: &Message) -> Result<()> {
        conn.driver().send(msg)
    }

    /// Publishes `msg` and blocks for up to `timeout_ms` for a correlated
    /// reply on a fresh, one-shot reply topic.
    ///
    /// Generates `reply:<actor-name>:<counter>`, opens a temporary
    /// subscription to it on a *fresh* driver against the same proxy (the
    /// publishing driver's SUB socket, if any, is shared state and must not
    /// be reused here), sets `msg.meta.replyto`, sends, then blocks. The
    /// temporary driver is always released, on every exit path.
    pub fn sync_publish(
        &self,
        conn: &ProxyConnection,
        mut msg: Message,
        timeout_ms: u64,
    ) -> Result<Message> {
        let counter = self.reply_counter.fetch_add(1, Ordering::Relaxed);
        let reply_topic = Topic::raw(format!("reply:{}:{counter}", self.name));

        let reply_conn = self.pool.get_proxy_connection(conn.address())?;
        reply_conn.driver().subscribe(&reply_topic)?;

        msg = msg.with_replyto(&reply_topic);

        let result = (|| -> Result<Message> {
            conn.driver().send(&msg)?;
            block_for_reply(reply_conn.driver(), timeout_ms)
        })();

        // Always unsubscribe the temporary driver before it goes back to
        // the pool, regardless of which path above returned.
        let _ = reply_conn.driver().unsubscribe(&reply_topic);
        drop(reply_conn);

        result
    }

    /// Transfers `conn` into a new subscription running `callback` for
    /// every message received on `topic`'s prefix.
    pub fn subscribe(
        &self,
        topic: Topic,
        conn: ProxyConnection,
        callback: Callback,
    ) -> Result<SubscriptionHandle> {
        SubscriptionHandle::start(topic, conn, callback)
    }

    /// Stops and joins a subscription's worker.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        handle.unsubscribe();
    }

    /// Registers this actor as a publisher for `topic`.
    pub fn register_publisher(&self, topic: &Topic, description: &str) -> Result<()> {
        self.register(topic, description, OwnerType::Publisher)
    }

    /// Registers this actor as a subscriber for `topic`.
    pub fn register_subscriber(&self, topic: &Topic, description: &str) -> Result<()> {
        self.register(topic, description, OwnerType::Subscriber)
    }

    fn register(&self, topic: &Topic, description: &str, owner: OwnerType) -> Result<()> {
        let reg = self.registration_for(topic, description, owner);
        let mut conn = self.pool.get_reg_connection(&self.default_registrar)?;
        conn.driver_mut()
            .add(&self.name, &reg, owner == OwnerType::Publisher)
    }

    pub fn deregister_publisher(&self, topic: &Topic) -> Result<()> {
        self.deregister(topic, OwnerType::Publisher)
    }

    pub fn deregister_subscriber(&self, topic: &Topic) -> Result<()> {
        self.deregister(topic, OwnerType::Subscriber)
    }

    fn deregister(&self, topic: &Topic, owner: OwnerType) -> Result<()> {
        let reg = self.registration_for(topic, "", owner);
        let mut conn = self.pool.get_reg_connection(&self.default_registrar)?;
        conn.driver_mut()
            .remove(&self.name, &reg, owner == OwnerType::Publisher)
    }

    /// Removes every registration this actor made at its default proxy
    /// host (used when the actor quits). Restricted to the caller's own
    /// host+name; see `DESIGN.md`.
    pub fn deregister_all(&self) -> Result<()> {
        let mut conn = self.pool.get_reg_connection(&self.default_registrar)?;
        conn.driver_mut()
            .remove_all(&self.name, self.default_proxy.host())
    }

    /// Discovers every registered publisher whose topic is a descendant of
    /// `topic`. An empty result is a normal outcome, not an error.
    pub fn find_publishers(&self, topic: &Topic) -> Result<Vec<Registration>> {
        self.find(topic, OwnerType::Publisher)
    }

    pub fn find_subscribers(&self, topic: &Topic) -> Result<Vec<Registration>> {
        self.find(topic, OwnerType::Subscriber)
    }

    fn find(&self, topic: &Topic, owner: OwnerType) -> Result<Vec<Registration>> {
        let mut conn = self.pool.get_reg_connection(&self.default_registrar)?;
        let mut regs = conn
            .driver_mut()
            .find(&self.name, topic, owner == OwnerType::Publisher)?;
        regs.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
        debug!(topic = %topic, count = regs.len(), "discovery query");
        Ok(regs)
    }

    fn registration_for(&self, topic: &Topic, description: &str, owner: OwnerType) -> Registration {
        Registration {
            name: self.name.clone(),
            host: self.default_proxy.host().to_string(),
            port: i32::from(self.default_proxy.pub_port()),
            domain: topic.domain().to_string(),
            subject: topic.subject().to_string(),
            type_part: topic.r#type().to_string(),
            ownertype: owner as i32,
            description: description.to_string(),
        }
    }
}

fn block_for_reply(driver: &ProxyDriver, timeout_ms: u64) -> Result<Message> {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(Error::Timeout(Duration::from_millis(timeout_ms)));
        }
        let poll_ms = remaining.as_millis().min(i64::MAX as u128) as i64;
        if driver.poll(poll_ms)? {
            return driver.recv();
        }
    }
}
