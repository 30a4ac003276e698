// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory directory keyed by topic, with prefix-match discovery, served
//! over a request/reply loop.
//!
//! State is two sets of [`Registration`] records (one for publishers, one
//! for subscribers), each ordered by `(name, host, port, domain, subject,
//! type, ownertype)`. A single worker serializes all mutations.

use crate::address::RegAddress;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::topic::Topic;
use crate::wire::Registration;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

const STATUS_SUCCESS: &str = "success";
const POLL_TIMEOUT_MS: i64 = 100;

const CMD_REGISTER_PUBLISHER: &str = "registerPublisher";
const CMD_REGISTER_SUBSCRIBER: &str = "registerSubscriber";
const CMD_REMOVE_PUBLISHER: &str = "removePublisherRegistration";
const CMD_REMOVE_SUBSCRIBER: &str = "removeSubscriberRegistration";
const CMD_REMOVE_ALL: &str = "removeAllRegistration";
const CMD_FIND_PUBLISHER: &str = "findPublisher";
const CMD_FIND_SUBSCRIBER: &str = "findSubscriber";

#[derive(Default)]
struct Directory {
    publishers: Vec<Registration>,
    subscribers: Vec<Registration>,
}

impl Directory {
    fn set_for(&mut self, is_publisher: bool) -> &mut Vec<Registration> {
        if is_publisher {
            &mut self.publishers
        } else {
            &mut self.subscribers
        }
    }

    /// Insert if not already present (identity = every field).
    fn insert(&mut self, reg: Registration, is_publisher: bool) {
        let set = self.set_for(is_publisher);
        if !set.iter().any(|r| r.identity_key() == reg.identity_key()) {
            set.push(reg);
            set.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
        }
    }

    /// Delete the exact-match record.
    fn remove_exact(&mut self, reg: &Registration, is_publisher: bool) {
        let set = self.set_for(is_publisher);
        set.retain(|r| r.identity_key() != reg.identity_key());
    }

    /// Delete every record made by `sender` at `host`, in both sets.
    fn remove_all(&mut self, host: &str, sender: &str) {
        self.publishers
            .retain(|r| !(r.host == host && r.name == sender));
        self.subscribers
            .retain(|r| !(r.host == host && r.name == sender));
    }

    /// Every record whose topic is a descendant of `query` (`query.is_parent(record)`).
    fn find(&self, query: &Topic, is_publisher: bool) -> Vec<Registration> {
        let set = if is_publisher {
            &self.publishers
        } else {
            &self.subscribers
        };
        set.iter()
            .filter(|r| query.is_parent(&r.topic()))
            .cloned()
            .collect()
    }
}

/// Point-in-time counters for introspection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrarStats {
    pub requests_served: u64,
    pub publisher_count: usize,
    pub subscriber_count: usize,
}

#[derive(Default)]
struct Counters {
    requests_served: AtomicU64,
}

/// Running Registrar server: an in-memory directory plus a request/reply
/// worker bound at one [`RegAddress`].
pub struct RegistrarServer {
    address: RegAddress,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    directory: Arc<Mutex<Directory>>,
    counters: Arc<Counters>,
}

impl RegistrarServer {
    /// Binds a REP socket at `address` and starts serving, using a private,
    /// independent transport context.
    pub fn start(address: RegAddress) -> Result<Self> {
        Self::start_with_context(address, &Context::create())
    }

    /// As [`RegistrarServer::start`], against a caller-supplied context.
    pub fn start_with_context(address: RegAddress, ctx: &Context) -> Result<Self> {
        let socket = ctx.raw().socket(zmq::REP)?;
        socket.bind(&address.endpoint())?;

        let stop = Arc::new(AtomicBool::new(false));
        let directory = Arc::new(Mutex::new(Directory::default()));
        let counters = Arc::new(Counters::default());

        let worker_stop = stop.clone();
        let worker_dir = directory.clone();
        let worker_counters = counters.clone();
        let worker_addr = address.clone();
        let worker = thread::Builder::new()
            .name("actorq-registrar".into())
            .spawn(move || run(socket, worker_dir, worker_counters, worker_stop, worker_addr))
            .map_err(std::io::Error::from)?;

        info!(address = %address, "registrar server started");
        Ok(Self {
            address,
            stop,
            worker: Some(worker),
            directory,
            counters,
        })
    }

    pub fn address(&self) -> &RegAddress {
        &self.address
    }

    pub fn stats(&self) -> RegistrarStats {
        let dir = self.directory.lock();
        RegistrarStats {
            requests_served: self.counters.requests_served.load(Ordering::Relaxed),
            publisher_count: dir.publishers.len(),
            subscriber_count: dir.subscribers.len(),
        }
    }

    /// Signals the worker to stop and joins it.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        info!(address = %self.address, "registrar server stopped");
    }
}

fn run(
    socket: zmq::Socket,
    directory: Arc<Mutex<Directory>>,
    counters: Arc<Counters>,
    stop: Arc<AtomicBool>,
    address: RegAddress,
) {
    while !stop.load(Ordering::Acquire) {
        let mut items = [socket.as_poll_item(zmq::POLLIN)];
        match zmq::poll(&mut items, POLL_TIMEOUT_MS) {
            Ok(n) if n > 0 && items[0].is_readable() => {}
            Ok(_) => continue,
            Err(e) => {
                warn!(address = %address, error = %e, "registrar poll failed");
                continue;
            }
        }

        let frames = match socket.recv_multipart(0) {
            Ok(f) => f,
            Err(e) => {
                warn!(address = %address, error = %e, "registrar recv failed");
                continue;
            }
        };
        if frames.len() != 3 {
            reply(&socket, "malformed request", &[]);
            continue;
        }

        let sender = String::from_utf8_lossy(&frames[0]).into_owned();
        let command = String::from_utf8_lossy(&frames[1]).into_owned();
        let payload = &frames[2];

        counters.requests_served.fetch_add(1, Ordering::Relaxed);
        debug!(address = %address, %sender, %command, "registrar request");

        let outcome = handle(&directory, &sender, &command, payload);
        match outcome {
            Ok(regs) => reply(&socket, STATUS_SUCCESS, &regs),
            Err(e) => reply(&socket, &e.to_string(), &[]),
        }
    }
}

fn handle(
    directory: &Mutex<Directory>,
    sender: &str,
    command: &str,
    payload: &[u8],
) -> Result<Vec<Registration>> {
    match command {
        CMD_REGISTER_PUBLISHER | CMD_REGISTER_SUBSCRIBER => {
            let reg = Registration::decode(payload)?;
            directory
                .lock()
                .insert(reg, command == CMD_REGISTER_PUBLISHER);
            Ok(vec![])
        }
        CMD_REMOVE_PUBLISHER | CMD_REMOVE_SUBSCRIBER => {
            let reg = Registration::decode(payload)?;
            directory
                .lock()
                .remove_exact(&reg, command == CMD_REMOVE_PUBLISHER);
            Ok(vec![])
        }
        CMD_REMOVE_ALL => {
            let reg = Registration::decode(payload)?;
            directory.lock().remove_all(&reg.host, sender);
            Ok(vec![])
        }
        CMD_FIND_PUBLISHER | CMD_FIND_SUBSCRIBER => {
            let topic = Topic::raw(String::from_utf8_lossy(payload).into_owned());
            Ok(directory
                .lock()
                .find(&topic, command == CMD_FIND_PUBLISHER))
        }
        other => Err(Error::InvalidArgument(format!("unknown command: {other}"))),
    }
}

fn reply(socket: &zmq::Socket, status: &str, regs: &[Registration]) {
    if regs.is_empty() {
        let _ = socket.send(status, 0);
        return;
    }
    let _ = socket.send(status, zmq::SNDMORE);
    let last = regs.len() - 1;
    for (i, reg) in regs.iter().enumerate() {
        let more = if i == last { 0 } else { zmq::SNDMORE };
        let _ = socket.send(reg.encode_to_vec().as_slice(), more);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::registration::OwnerType;

    fn reg(name: &str, host: &str, domain: &str, subject: &str, kind: &str) -> Registration {
        Registration {
            name: name.into(),
            host: host.into(),
            port: 7771,
            domain: domain.into(),
            subject: subject.into(),
            type_part: kind.into(),
            ownertype: OwnerType::Publisher as i32,
            description: String::new(),
        }
    }

    #[test]
    fn insert_is_idempotent_by_identity() {
        let mut dir = Directory::default();
        dir.insert(reg("n1", "h1", "A", "B", "1"), true);
        dir.insert(reg("n1", "h1", "A", "B", "1"), true);
        assert_eq!(dir.publishers.len(), 1);
    }

    #[test]
    fn find_matches_descendant_topics_only() {
        let mut dir = Directory::default();
        dir.insert(reg("n1", "h1", "A", "B", "1"), true);

        let found = dir.find(&Topic::raw("A"), true);
        assert_eq!(found.len(), 1);

        let found = dir.find(&Topic::raw("A:C"), true);
        assert!(found.is_empty());

        let found = dir.find(&Topic::raw("A:B"), true);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn remove_all_is_restricted_to_host_and_sender() {
        let mut dir = Directory::default();
        dir.insert(reg("n1", "h1", "A", "B", "1"), true);
        dir.insert(reg("n2", "h1", "A", "C", "1"), true);
        dir.remove_all("h1", "n1");
        assert_eq!(dir.publishers.len(), 1);
        assert_eq!(dir.publishers[0].name, "n2");
    }

    #[test]
    fn remove_exact_deletes_matching_record() {
        let mut dir = Directory::default();
        let r = reg("n1", "h1", "A", "B", "1");
        dir.insert(r.clone(), true);
        dir.remove_exact(&r, true);
        assert!(dir.publishers.is_empty());
    }
}
