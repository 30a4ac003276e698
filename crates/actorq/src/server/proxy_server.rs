// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The Proxy: a transparent forwarder between publishers and subscribers,
//! plus a liveness control responder.
//!
//! Two sockets are bound: an XSUB at `pub_port` (publishers connect here)
//! and an XPUB at `sub_port` (subscribers connect here). They are spliced
//! together with `zmq_proxy_steerable` so that every message arriving on
//! the XSUB side is forwarded to every matching subscriber on the XPUB
//! side, and subscription/unsubscription frames emitted by the XPUB side
//! are forwarded back to the XSUB side so publishers only send what has at
//! least one live subscriber. A third, independent socket — a REP bound at
//! `control_port` (`sub_port + 1`) — answers liveness probes on the
//! `xmsg:control` topic with the sub-commands `pub`, `sub` and `rep`.

use crate::address::ProxyAddress;
use crate::context::Context;
use crate::error::Result;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

const CONTROL_TOPIC: &str = "xmsg:control";
const POLL_TIMEOUT_MS: i64 = 100;

/// Point-in-time counters for introspection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyServerStats {
    pub control_requests_served: u64,
}

#[derive(Default)]
struct Counters {
    control_requests_served: AtomicU64,
}

/// A running Proxy: the XSUB/XPUB forwarder thread plus the control
/// responder thread, both bound at one [`ProxyAddress`].
pub struct ProxyServer {
    address: ProxyAddress,
    forwarder: Option<JoinHandle<()>>,
    control: Option<JoinHandle<()>>,
    terminator: Option<zmq::Socket>,
    control_stop: Arc<AtomicBool>,
    counters: Arc<Counters>,
}

impl ProxyServer {
    /// Binds both sockets at `address` (on all interfaces) and starts
    /// forwarding, using a private, independent transport context.
    pub fn start(address: ProxyAddress) -> Result<Self> {
        Self::start_with_context(address, Context::create())
    }

    /// As [`ProxyServer::start`], against a caller-supplied context.
    pub fn start_with_context(address: ProxyAddress, ctx: Context) -> Result<Self> {
        let xsub = ctx.raw().socket(zmq::XSUB)?;
        xsub.bind(&format!("tcp://*:{}", address.pub_port()))?;
        let xpub = ctx.raw().socket(zmq::XPUB)?;
        xpub.bind(&format!("tcp://*:{}", address.sub_port()))?;

        let ctrl_endpoint = format!("inproc://actorq-proxy-ctrl-{}", address.pub_port());
        let ctrl_bind = ctx.raw().socket(zmq::PAIR)?;
        ctrl_bind.bind(&ctrl_endpoint)?;
        let terminator = ctx.raw().socket(zmq::PAIR)?;
        terminator.connect(&ctrl_endpoint)?;

        let forwarder_addr = address.clone();
        let forwarder = thread::Builder::new()
            .name("actorq-proxy-fwd".into())
            .spawn(move || {
                if let Err(e) = zmq::proxy_steerable(&xsub, &xpub, &ctrl_bind) {
                    warn!(address = %forwarder_addr, error = %e, "proxy forwarder exited with error");
                }
            })
            .map_err(std::io::Error::from)?;

        let control_socket = ctx.raw().socket(zmq::REP)?;
        control_socket.bind(&format!("tcp://*:{}", address.control_port()))?;

        let control_stop = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(Counters::default());
        let control_stop_worker = control_stop.clone();
        let counters_worker = counters.clone();
        let control_addr = address.clone();
        let control = thread::Builder::new()
            .name("actorq-proxy-ctl".into())
            .spawn(move || {
                run_control(control_socket, control_stop_worker, counters_worker, control_addr)
            })
            .map_err(std::io::Error::from)?;

        info!(address = %address, "proxy server started");
        Ok(Self {
            address,
            forwarder: Some(forwarder),
            control: Some(control),
            terminator: Some(terminator),
            control_stop,
            counters,
        })
    }

    pub fn address(&self) -> &ProxyAddress {
        &self.address
    }

    pub fn stats(&self) -> ProxyServerStats {
        ProxyServerStats {
            control_requests_served: self.counters.control_requests_served.load(Ordering::Relaxed),
        }
    }

    /// Signals both threads to stop and joins them.
    pub fn stop(mut self) {
        self.control_stop.store(true, Ordering::Release);
        if let Some(terminator) = self.terminator.take() {
            let _ = terminator.send("TERMINATE", 0);
        }
        if let Some(forwarder) = self.forwarder.take() {
            let _ = forwarder.join();
        }
        if let Some(control) = self.control.take() {
            let _ = control.join();
        }
        info!(address = %self.address, "proxy server stopped");
    }
}

fn run_control(
    socket: zmq::Socket,
    stop: Arc<AtomicBool>,
    counters: Arc<Counters>,
    address: ProxyAddress,
) {
    while !stop.load(Ordering::Acquire) {
        let mut items = [socket.as_poll_item(zmq::POLLIN)];
        match zmq::poll(&mut items, POLL_TIMEOUT_MS) {
            Ok(n) if n > 0 && items[0].is_readable() => {}
            Ok(_) => continue,
            Err(e) => {
                warn!(address = %address, error = %e, "control poll failed");
                continue;
            }
        }

        let frames = match socket.recv_multipart(0) {
            Ok(f) => f,
            Err(e) => {
                warn!(address = %address, error = %e, "control recv failed");
                continue;
            }
        };

        counters.control_requests_served.fetch_add(1, Ordering::Relaxed);

        let reply = match frames.as_slice() {
            [topic, subcmd] if topic == CONTROL_TOPIC.as_bytes() => match subcmd.as_slice() {
                b"pub" | b"sub" | b"rep" => "ok",
                _ => "unknown",
            },
            _ => "malformed",
        };
        let _ = socket.send(reply, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_start_at_zero() {
        let server = ProxyServer::start(ProxyAddress::new("127.0.0.1", 17771)).unwrap();
        assert_eq!(server.stats().control_requests_served, 0);
        server.stop();
    }
}
