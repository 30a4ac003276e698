// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client-side pair of sockets (publish, subscribe) against one Proxy
//! address.

use crate::address::ProxyAddress;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::pool::ConnectionSetup;
use crate::topic::Topic;
use crate::wire::Meta;

/// A client-side connection to one Proxy: a PUB socket to send on, a SUB
/// socket to receive on. Not thread-safe; exactly one thread uses a given
/// driver at a time.
pub struct ProxyDriver {
    address: ProxyAddress,
    pub_socket: zmq::Socket,
    sub_socket: zmq::Socket,
}

impl ProxyDriver {
    /// Connect both sockets to `address`, running `setup`'s hooks around
    /// each connection.
    pub fn connect(
        ctx: &Context,
        address: ProxyAddress,
        setup: &ConnectionSetup,
    ) -> Result<Self> {
        let pub_socket = ctx.raw().socket(zmq::PUB)?;
        setup.pre_connection(&pub_socket)?;
        pub_socket.connect(&address.pub_endpoint())?;

        let sub_socket = ctx.raw().socket(zmq::SUB)?;
        setup.pre_connection(&sub_socket)?;
        sub_socket.connect(&address.sub_endpoint())?;

        // The transport is connectionless: give subscriptions a moment to
        // propagate before the caller starts publishing.
        setup.post_connection();

        Ok(Self {
            address,
            pub_socket,
            sub_socket,
        })
    }

    pub fn address(&self) -> &ProxyAddress {
        &self.address
    }

    /// Sends a three-frame transmission: topic, serialized `Meta`, payload.
    pub fn send(&self, msg: &Message) -> Result<()> {
        let topic = msg.topic().str().as_bytes();
        let meta = msg.meta().encode_to_vec();
        let data = msg.data();

        self.pub_socket
            .send(topic, zmq::SNDMORE)
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.pub_socket
            .send(meta.as_slice(), zmq::SNDMORE)
            .map_err(|e| Error::Transport(e.to_string()))?;
        self.pub_socket
            .send(data, 0)
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(())
    }

    /// Receives the next three-frame transmission and reassembles a
    /// `Message`.
    pub fn recv(&self) -> Result<Message> {
        let frames = self
            .sub_socket
            .recv_multipart(0)
            .map_err(|e| Error::Transport(e.to_string()))?;
        let [topic_frame, meta_frame, data_frame] = <[Vec<u8>; 3]>::try_from(frames)
            .map_err(|f| Error::Transport(format!("expected 3 frames, got {}", f.len())))?;

        let topic = Topic::raw(String::from_utf8_lossy(&topic_frame).into_owned());
        let meta = Meta::decode(&meta_frame)?;
        Message::new(topic, meta, data_frame)
    }

    /// Sets a prefix filter on the SUB socket using `topic.str()`.
    pub fn subscribe(&self, topic: &Topic) -> Result<()> {
        self.sub_socket
            .set_subscribe(topic.str().as_bytes())
            .map_err(|e| Error::Transport(e.to_string()))
    }

    /// Clears a previously set prefix filter.
    pub fn unsubscribe(&self, topic: &Topic) -> Result<()> {
        self.sub_socket
            .set_unsubscribe(topic.str().as_bytes())
            .map_err(|e| Error::Transport(e.to_string()))
    }

    /// Returns `true` if a message is available within `timeout_ms`.
    pub fn poll(&self, timeout_ms: i64) -> Result<bool> {
        let mut items = [self.sub_socket.as_poll_item(zmq::POLLIN)];
        let n = zmq::poll(&mut items, timeout_ms).map_err(|e| Error::Transport(e.to_string()))?;
        Ok(n > 0 && items[0].is_readable())
    }
}
