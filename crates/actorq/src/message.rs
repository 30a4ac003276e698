// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Message` = Topic + Meta + opaque payload, and the `make_message`/
//! `parse_message`/`make_response` helpers that wrap/unwrap scalar `Data`
//! values.

use crate::error::{Error, Result};
use crate::topic::Topic;
use crate::wire::{Data, Meta, ScalarValue};

/// A routable message: a topic, its metadata, and an opaque payload.
///
/// Invariant: `meta` is never absent and `meta.datatype` is set before the
/// message is handed to [`crate::actor::Actor::publish`].
#[derive(Debug, Clone)]
pub struct Message {
    topic: Topic,
    meta: Meta,
    data: Vec<u8>,
}

impl Message {
    /// Construct from an explicit topic, meta, and raw payload bytes.
    pub fn new(topic: Topic, meta: Meta, data: Vec<u8>) -> Result<Self> {
        if meta.datatype.is_empty() {
            return Err(Error::InvalidArgument(
                "meta.datatype must be set before publish".into(),
            ));
        }
        Ok(Self { topic, meta, data })
    }

    /// Construct from a topic, a mimetype tag, and raw payload bytes; an
    /// empty `Meta` is created and its `datatype` set.
    pub fn with_mimetype(topic: Topic, mimetype: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            topic,
            meta: Meta::with_datatype(mimetype),
            data,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_parts(self) -> (Topic, Meta, Vec<u8>) {
        (self.topic, self.meta, self.data)
    }

    /// The reply topic set on this message's metadata, if any.
    pub fn replyto(&self) -> Option<Topic> {
        if self.meta.replyto.is_empty() {
            None
        } else {
            Some(Topic::raw(self.meta.replyto.clone()))
        }
    }

    /// Sets `meta.replyto` in place, returning `self` for chaining.
    pub fn with_replyto(mut self, topic: &Topic) -> Self {
        self.meta.replyto = topic.str().to_string();
        self
    }

    /// Clears `meta.replyto` in place, returning `self` for chaining.
    pub fn clear_replyto(mut self) -> Self {
        self.meta.replyto.clear();
        self
    }

    /// Re-targets this message at a new topic, returning `self` for
    /// chaining.
    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topic = topic;
        self
    }

    pub fn has_replyto(&self) -> bool {
        !self.meta.replyto.is_empty()
    }
}

/// Infers the mimetype tag from `value`'s scalar/array kind, wraps it in a
/// `Data` record, serializes it, and builds a `Message` with `datatype` set
/// to the matching MIME string.
pub fn make_message<T: ScalarValue>(topic: Topic, value: T) -> Result<Message> {
    let mimetype = T::mime_tag();
    let data = value.into_data().encode_to_vec();
    Ok(Message::with_mimetype(topic, mimetype, data))
}

/// The inverse of [`make_message`]: decodes the payload as a `Data` record
/// and unwraps the scalar/array value, checking `datatype` against `T`'s
/// expected MIME tag.
pub fn parse_message<T: ScalarValue>(msg: &Message) -> Result<T> {
    if msg.meta.datatype != T::mime_tag() {
        return Err(Error::Serialization(format!(
            "datatype mismatch: message has {:?}, expected {:?}",
            msg.meta.datatype,
            T::mime_tag()
        )));
    }
    let data = Data::decode(&msg.data)?;
    T::from_data(data)
}

/// Produces a response from a request: sets `topic <- request.meta.replyto`,
/// clears `replyto`, and keeps meta+data.
pub fn make_response(msg: Message) -> Result<Message> {
    let reply_topic = msg.replyto().ok_or_else(|| {
        Error::InvalidArgument("message has no replyto topic to respond on".into())
    })?;
    Ok(msg.with_topic(reply_topic).clear_replyto())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::mime;

    #[test]
    fn new_rejects_empty_datatype() {
        let topic = Topic::build("A").unwrap();
        let err = Message::new(topic, Meta::default(), vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn make_message_sets_datatype_and_roundtrips() {
        let topic = Topic::build2("A", "B").unwrap();
        let msg = make_message(topic, 3.5f64).unwrap();
        assert_eq!(msg.meta().datatype, mime::DOUBLE);
        let value: f64 = parse_message(&msg).unwrap();
        assert_eq!(value, 3.5);
    }

    #[test]
    fn make_message_string_roundtrip() {
        let topic = Topic::build3("A", "B", "1").unwrap();
        let msg = make_message(topic, "hello".to_string()).unwrap();
        let value: String = parse_message(&msg).unwrap();
        assert_eq!(value, "hello");
    }

    #[test]
    fn parse_message_rejects_mismatched_datatype() {
        let topic = Topic::build("A").unwrap();
        let msg = make_message(topic, 1i32).unwrap();
        let err = parse_message::<f64>(&msg).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn make_response_sets_topic_and_clears_replyto() {
        let topic = Topic::build2("svc", "echo").unwrap();
        let reply = Topic::raw("reply:actor:1");
        let mut msg = make_message(topic, "hello".to_string()).unwrap();
        msg = msg.with_replyto(&reply);

        let response = make_response(msg).unwrap();
        assert_eq!(response.topic().str(), "reply:actor:1");
        assert!(!response.has_replyto());
    }

    #[test]
    fn make_response_requires_replyto() {
        let topic = Topic::build("A").unwrap();
        let msg = make_message(topic, 1i32).unwrap();
        assert!(make_response(msg).is_err());
    }
}
