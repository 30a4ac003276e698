// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Request/reply socket to a Registrar. Every call has a fixed 3000 ms
//! timeout; expiry raises a timeout error and discards the socket, so a
//! fresh one is created lazily on the next call.

use crate::address::RegAddress;
use crate::config::REGISTRAR_CALL_TIMEOUT;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::pool::ConnectionSetup;
use crate::topic::Topic;
use crate::wire::Registration;

const CMD_REGISTER_PUBLISHER: &str = "registerPublisher";
const CMD_REGISTER_SUBSCRIBER: &str = "registerSubscriber";
const CMD_REMOVE_PUBLISHER: &str = "removePublisherRegistration";
const CMD_REMOVE_SUBSCRIBER: &str = "removeSubscriberRegistration";
const CMD_REMOVE_ALL: &str = "removeAllRegistration";
const CMD_FIND_PUBLISHER: &str = "findPublisher";
const CMD_FIND_SUBSCRIBER: &str = "findSubscriber";

const STATUS_SUCCESS: &str = "success";

/// A client-side connection to one Registrar.
pub struct RegDriver {
    ctx: Context,
    address: RegAddress,
    setup: ConnectionSetup,
    socket: Option<zmq::Socket>,
}

impl RegDriver {
    pub fn new(ctx: Context, address: RegAddress, setup: ConnectionSetup) -> Self {
        Self {
            ctx,
            address,
            setup,
            socket: None,
        }
    }

    pub fn address(&self) -> &RegAddress {
        &self.address
    }

    fn socket(&mut self) -> Result<&zmq::Socket> {
        if self.socket.is_none() {
            let sock = self.ctx.raw().socket(zmq::REQ)?;
            self.setup.pre_connection(&sock)?;
            sock.set_rcvtimeo(REGISTRAR_CALL_TIMEOUT.as_millis() as i32)?;
            sock.set_sndtimeo(REGISTRAR_CALL_TIMEOUT.as_millis() as i32)?;
            sock.set_linger(0)?;
            sock.connect(&self.address.endpoint())?;
            self.setup.post_connection();
            self.socket = Some(sock);
        }
        Ok(self.socket.as_ref().expect("socket just ensured present"))
    }

    /// Discards the current socket; the next call lazily reconnects.
    fn discard(&mut self) {
        self.socket = None;
    }

    fn call(
        &mut self,
        sender: &str,
        command: &str,
        payload: &[u8],
    ) -> Result<(String, Vec<Registration>)> {
        let socket = self.socket()?;
        let send_result = socket
            .send(sender.as_bytes(), zmq::SNDMORE)
            .and_then(|_| socket.send(command.as_bytes(), zmq::SNDMORE))
            .and_then(|_| socket.send(payload, 0));
        if send_result.is_err() {
            self.discard();
            return Err(Error::Timeout(REGISTRAR_CALL_TIMEOUT));
        }

        let reply = socket.recv_multipart(0);
        let frames = match reply {
            Ok(frames) => frames,
            Err(zmq::Error::EAGAIN) => {
                self.discard();
                return Err(Error::Timeout(REGISTRAR_CALL_TIMEOUT));
            }
            Err(e) => {
                self.discard();
                return Err(Error::Transport(e.to_string()));
            }
        };

        let mut iter = frames.into_iter();
        let status = iter
            .next()
            .map(|f| String::from_utf8_lossy(&f).into_owned())
            .unwrap_or_default();

        let mut registrations = Vec::new();
        for frame in iter {
            registrations.push(Registration::decode(&frame)?);
        }

        if status != STATUS_SUCCESS {
            return Err(Error::Transport(format!("registrar replied: {status}")));
        }

        Ok((status, registrations))
    }

    pub fn add(&mut self, sender: &str, reg: &Registration, is_publisher: bool) -> Result<()> {
        let cmd = if is_publisher {
            CMD_REGISTER_PUBLISHER
        } else {
            CMD_REGISTER_SUBSCRIBER
        };
        self.call(sender, cmd, &reg.encode_to_vec()).map(|_| ())
    }

    pub fn remove(&mut self, sender: &str, reg: &Registration, is_publisher: bool) -> Result<()> {
        let cmd = if is_publisher {
            CMD_REMOVE_PUBLISHER
        } else {
            CMD_REMOVE_SUBSCRIBER
        };
        self.call(sender, cmd, &reg.encode_to_vec()).map(|_| ())
    }

    /// Removes every registration made by `sender` from `host`. The
    /// registrar keys removal by `host` + sender name (see `DESIGN.md`).
    pub fn remove_all(&mut self, sender: &str, host: &str) -> Result<()> {
        let filter = Registration {
            host: host.to_string(),
            ..Default::default()
        };
        self.call(sender, CMD_REMOVE_ALL, &filter.encode_to_vec())
            .map(|_| ())
    }

    pub fn find(
        &mut self,
        sender: &str,
        topic: &Topic,
        is_publisher: bool,
    ) -> Result<Vec<Registration>> {
        let cmd = if is_publisher {
            CMD_FIND_PUBLISHER
        } else {
            CMD_FIND_SUBSCRIBER
        };
        let (_, regs) = self.call(sender, cmd, topic.str().as_bytes())?;
        Ok(regs)
    }
}
