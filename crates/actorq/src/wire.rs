// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generated wire records (`Meta`, `Data`, `Registration`) and the MIME
//! datatype tags recognized when auto-serializing scalar/array `Data`
//! values.

#![allow(clippy::all)]

include!(concat!(env!("OUT_DIR"), "/actorq.wire.rs"));

use crate::error::{Error, Result};
use prost::Message as ProstMessage;

/// MIME-like tags recognized in `Meta.datatype` for auto-serialized
/// scalars/arrays. The `datatype` field on `Meta` is the single source of
/// truth when routing to a decoder.
pub mod mime {
    pub const SINT32: &str = "binary/sint32";
    pub const SINT64: &str = "binary/sint64";
    pub const SFIXED32: &str = "binary/sfixed32";
    pub const SFIXED64: &str = "binary/sfixed64";
    pub const FLOAT: &str = "binary/float";
    pub const DOUBLE: &str = "binary/double";
    pub const STRING: &str = "text/string";
    pub const BYTES: &str = "binary/bytes";

    pub const ARRAY_SINT32: &str = "binary/array-sint32";
    pub const ARRAY_SINT64: &str = "binary/array-sint64";
    pub const ARRAY_SFIXED32: &str = "binary/array-sfixed32";
    pub const ARRAY_SFIXED64: &str = "binary/array-sfixed64";
    pub const ARRAY_FLOAT: &str = "binary/array-float";
    pub const ARRAY_DOUBLE: &str = "binary/array-double";
    pub const ARRAY_STRING: &str = "binary/array-string";
    pub const ARRAY_BYTES: &str = "binary/array-bytes";

    /// A serialized `Data` record carried verbatim (decoding convenience,
    /// not itself a scalar/array kind).
    pub const NATIVE: &str = "binary/native";

    /// Foreign-language object payloads, opaque to this crate.
    pub const JAVA: &str = "binary/java";
    pub const CPP: &str = "binary/cpp";
    pub const PYTHON: &str = "binary/python";
}

impl Meta {
    /// An empty `Meta` with only `datatype` set, little-endian by default.
    pub fn with_datatype(datatype: impl Into<String>) -> Self {
        Self {
            datatype: datatype.into(),
            byteorder: meta::ByteOrder::LittleEndian as i32,
            ..Default::default()
        }
    }

    pub fn encode_to_vec(&self) -> Vec<u8> {
        ProstMessage::encode_to_vec(self)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        ProstMessage::decode(buf).map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl Registration {
    pub fn encode_to_vec(&self) -> Vec<u8> {
        ProstMessage::encode_to_vec(self)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        ProstMessage::decode(buf).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Identity used for set membership/de-dup: every field participates.
    pub fn identity_key(&self) -> (String, String, i32, String, String, String, i32) {
        (
            self.name.clone(),
            self.host.clone(),
            self.port,
            self.domain.clone(),
            self.subject.clone(),
            self.type_part.clone(),
            self.ownertype,
        )
    }

    /// Lexicographic ordering key for discovery replies: `(name, host,
    /// port, domain, subject, type, ownertype)`.
    pub fn order_key(&self) -> (&str, &str, i32, &str, &str, &str, i32) {
        (
            &self.name,
            &self.host,
            self.port,
            &self.domain,
            &self.subject,
            &self.type_part,
            self.ownertype,
        )
    }

    /// Topic this registration was made under.
    pub fn topic(&self) -> crate::topic::Topic {
        crate::topic::Topic::raw(format!("{}:{}:{}", self.domain, self.subject, self.type_part))
    }
}

impl Data {
    pub fn encode_to_vec(&self) -> Vec<u8> {
        ProstMessage::encode_to_vec(self)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        ProstMessage::decode(buf).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Values that can be wrapped into a `Data` record and round-tripped
/// through [`crate::make_message`]/[`crate::parse_message`].
pub trait ScalarValue: Sized {
    /// MIME tag this kind is serialized under.
    fn mime_tag() -> &'static str;
    fn into_data(self) -> Data;
    fn from_data(data: Data) -> Result<Self>;
}

macro_rules! impl_scalar {
    ($ty:ty, $variant:ident, $tag:expr) => {
        impl ScalarValue for $ty {
            fn mime_tag() -> &'static str {
                $tag
            }
            fn into_data(self) -> Data {
                Data {
                    value: Some(data::Value::$variant(self)),
                }
            }
            fn from_data(data: Data) -> Result<Self> {
                match data.value {
                    Some(data::Value::$variant(v)) => Ok(v),
                    other => Err(Error::Serialization(format!(
                        "expected {} Data variant, got {:?}",
                        stringify!($variant),
                        other
                    ))),
                }
            }
        }
    };
}

impl ScalarValue for i32 {
    fn mime_tag() -> &'static str {
        mime::SINT32
    }
    fn into_data(self) -> Data {
        Data {
            value: Some(data::Value::Vlsint32(self)),
        }
    }
    fn from_data(data: Data) -> Result<Self> {
        match data.value {
            Some(data::Value::Vlsint32(v)) => Ok(v),
            other => Err(Error::Serialization(format!(
                "expected Vlsint32 Data variant, got {:?}",
                other
            ))),
        }
    }
}

impl ScalarValue for i64 {
    fn mime_tag() -> &'static str {
        mime::SINT64
    }
    fn into_data(self) -> Data {
        Data {
            value: Some(data::Value::Vlsint64(self)),
        }
    }
    fn from_data(data: Data) -> Result<Self> {
        match data.value {
            Some(data::Value::Vlsint64(v)) => Ok(v),
            other => Err(Error::Serialization(format!(
                "expected Vlsint64 Data variant, got {:?}",
                other
            ))),
        }
    }
}

impl_scalar!(f32, Flt, mime::FLOAT);
impl_scalar!(f64, Dbl, mime::DOUBLE);

impl ScalarValue for String {
    fn mime_tag() -> &'static str {
        mime::STRING
    }
    fn into_data(self) -> Data {
        Data {
            value: Some(data::Value::Str(self)),
        }
    }
    fn from_data(data: Data) -> Result<Self> {
        match data.value {
            Some(data::Value::Str(v)) => Ok(v),
            other => Err(Error::Serialization(format!(
                "expected Str Data variant, got {:?}",
                other
            ))),
        }
    }
}

impl ScalarValue for Vec<u8> {
    fn mime_tag() -> &'static str {
        mime::BYTES
    }
    fn into_data(self) -> Data {
        Data {
            value: Some(data::Value::Bin(self)),
        }
    }
    fn from_data(data: Data) -> Result<Self> {
        match data.value {
            Some(data::Value::Bin(v)) => Ok(v),
            other => Err(Error::Serialization(format!(
                "expected Bin Data variant, got {:?}",
                other
            ))),
        }
    }
}

impl ScalarValue for Vec<f64> {
    fn mime_tag() -> &'static str {
        mime::ARRAY_DOUBLE
    }
    fn into_data(self) -> Data {
        Data {
            value: Some(data::Value::Dbla(DoubleArray { values: self })),
        }
    }
    fn from_data(data: Data) -> Result<Self> {
        match data.value {
            Some(data::Value::Dbla(v)) => Ok(v.values),
            other => Err(Error::Serialization(format!(
                "expected Dbla Data variant, got {:?}",
                other
            ))),
        }
    }
}

impl ScalarValue for Vec<String> {
    fn mime_tag() -> &'static str {
        mime::ARRAY_STRING
    }
    fn into_data(self) -> Data {
        Data {
            value: Some(data::Value::Stra(StringArray { values: self })),
        }
    }
    fn from_data(data: Data) -> Result<Self> {
        match data.value {
            Some(data::Value::Stra(v)) => Ok(v.values),
            other => Err(Error::Serialization(format!(
                "expected Stra Data variant, got {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_roundtrips_through_bytes() {
        let meta = Meta::with_datatype(mime::STRING);
        let encoded = meta.encode_to_vec();
        let decoded = Meta::decode(&encoded).unwrap();
        assert_eq!(decoded.datatype, mime::STRING);
    }

    #[test]
    fn registration_order_key_is_lexicographic_tuple() {
        let r = Registration {
            name: "n".into(),
            host: "h".into(),
            port: 1,
            domain: "A".into(),
            subject: "B".into(),
            type_part: "1".into(),
            ownertype: registration::OwnerType::Publisher as i32,
            description: String::new(),
        };
        assert_eq!(r.order_key(), ("n", "h", 1, "A", "B", "1", 0));
    }

    #[test]
    fn scalar_roundtrip_f64() {
        let data = 42.5f64.into_data();
        let value = f64::from_data(data).unwrap();
        assert_eq!(value, 42.5);
    }

    #[test]
    fn scalar_roundtrip_string() {
        let data = "hello".to_string().into_data();
        let value = String::from_data(data).unwrap();
        assert_eq!(value, "hello");
    }
}
