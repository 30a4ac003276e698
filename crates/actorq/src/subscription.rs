// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! A running filter + callback pair on a dedicated worker.
//!
//! Created by [`crate::actor::Actor::subscribe`]. The driver checked out of
//! the pool is moved into the worker; it is only returned to the pool when
//! the subscription is stopped. The worker polls with a short timeout so
//! that `stop` stays responsive, isolates callback panics (a faulting
//! callback is logged and the loop continues), and never propagates errors
//! — the caller's only handle is this [`SubscriptionHandle`].

use crate::config::SUBSCRIPTION_POLL_TIMEOUT;
use crate::driver::ProxyDriver;
use crate::error::Result;
use crate::message::Message;
use crate::pool::{ProxyConnection, ProxyReleaser};
use crate::topic::Topic;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

/// A thread-safe user callback invoked once per received message.
pub type Callback = Arc<dyn Fn(Message) + Send + Sync>;

/// A handle to a running subscription. Dropping it without calling
/// [`SubscriptionHandle::unsubscribe`] leaks the worker thread (it keeps
/// running); always call `unsubscribe` to stop it and reclaim the driver.
pub struct SubscriptionHandle {
    topic: Topic,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    /// Starts a new subscription: subscribes `conn`'s driver to `topic`'s
    /// prefix and begins polling it on a dedicated worker.
    pub fn start(
        topic: Topic,
        conn: ProxyConnection,
        callback: Callback,
    ) -> Result<Self> {
        let (driver, releaser) = conn.into_parts();
        driver.subscribe(&topic)?;

        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = stop.clone();
        let worker_topic = topic.clone();

        let worker = thread::Builder::new()
            .name(format!("actorq-sub-{}", topic.str()))
            .spawn(move || run(driver, worker_topic, callback, worker_stop, releaser))
            .map_err(std::io::Error::from)?;

        Ok(Self {
            topic,
            stop,
            worker: Some(worker),
        })
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn is_running(&self) -> bool {
        !self.stop.load(Ordering::Acquire)
    }

    /// Sets the stop flag, joins the worker, and returns the driver to the
    /// pool (done by the worker itself just before it exits).
    pub fn unsubscribe(mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        // Best-effort: make sure the worker is told to stop even if the
        // caller dropped the handle without calling `unsubscribe`.
        self.stop.store(true, Ordering::Release);
    }
}

fn run(
    driver: ProxyDriver,
    topic: Topic,
    callback: Callback,
    stop: Arc<AtomicBool>,
    releaser: ProxyReleaser,
) {
    let poll_timeout_ms = SUBSCRIPTION_POLL_TIMEOUT.as_millis() as i64;
    let mut consecutive_faults = 0u32;

    while !stop.load(Ordering::Acquire) {
        match driver.poll(poll_timeout_ms) {
            Ok(true) => match driver.recv() {
                Ok(msg) => {
                    if consecutive_faults >= 2 {
                        warn!(topic = %topic, "dropping message: 2 consecutive callback faults");
                        consecutive_faults = 0;
                        continue;
                    }
                    let result = catch_unwind(AssertUnwindSafe(|| callback(msg)));
                    match result {
                        Ok(()) => consecutive_faults = 0,
                        Err(_) => {
                            consecutive_faults += 1;
                            error!(topic = %topic, "subscription callback panicked");
                        }
                    }
                }
                Err(e) => {
                    warn!(topic = %topic, error = %e, "subscription recv failed, continuing");
                }
            },
            Ok(false) => {}
            Err(e) => {
                warn!(topic = %topic, error = %e, "subscription poll failed, continuing");
            }
        }
    }

    debug!(topic = %topic, "subscription stopping");
    if let Err(e) = driver.unsubscribe(&topic) {
        warn!(topic = %topic, error = %e, "failed to unsubscribe cleanly");
    }
    releaser.release(driver);
}
