// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hierarchical three-part topic identifier: `domain[:subject[:type]]`.

use crate::error::{Error, Result};
use std::fmt;

const WILDCARD: &str = "*";

/// A hierarchical topic identifier with up to three colon-separated parts.
///
/// Wildcards degenerate the built string: `build(d, "*")` is the same as
/// `build(d)`, and `build(d, s, "*")` is the same as `build(d, s)`. Passing
/// a concrete `type` with a wildcard `subject` is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Build a one-part topic.
    pub fn build(domain: impl Into<String>) -> Result<Self> {
        let domain = domain.into();
        validate_part(&domain, "domain")?;
        Ok(Self(domain))
    }

    /// Build a two-part topic. `subject == "*"` degenerates to one part.
    pub fn build2(domain: impl Into<String>, subject: impl AsRef<str>) -> Result<Self> {
        let domain = domain.into();
        validate_part(&domain, "domain")?;
        let subject = subject.as_ref();
        if subject == WILDCARD {
            return Self::build(domain);
        }
        validate_part(subject, "subject")?;
        Ok(Self(format!("{domain}:{subject}")))
    }

    /// Build a three-part topic. `type == "*"` degenerates to two parts.
    /// Rejects a concrete `type` paired with a wildcard `subject`.
    pub fn build3(
        domain: impl Into<String>,
        subject: impl AsRef<str>,
        kind: impl AsRef<str>,
    ) -> Result<Self> {
        let domain = domain.into();
        let subject = subject.as_ref();
        let kind = kind.as_ref();

        if kind == WILDCARD {
            return Self::build2(domain, subject);
        }
        if subject == WILDCARD {
            return Err(Error::InvalidArgument(
                "cannot set a concrete type with a wildcard subject".into(),
            ));
        }
        validate_part(&domain, "domain")?;
        validate_part(subject, "subject")?;
        validate_part(kind, "type")?;
        Ok(Self(format!("{domain}:{subject}:{kind}")))
    }

    /// Accept any string as a topic without validation. Fast path for
    /// values read off the wire, which are trusted to already be valid.
    pub fn raw(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The canonical topic string.
    pub fn str(&self) -> &str {
        &self.0
    }

    pub fn domain(&self) -> &str {
        self.0.splitn(2, ':').next().unwrap_or("*")
    }

    pub fn subject(&self) -> &str {
        let mut parts = self.0.splitn(3, ':');
        parts.next();
        parts.next().unwrap_or(WILDCARD)
    }

    pub fn r#type(&self) -> &str {
        let mut parts = self.0.splitn(3, ':');
        parts.next();
        parts.next();
        parts.next().unwrap_or(WILDCARD)
    }

    /// `true` iff `other` is this topic or a descendant of it: `other.str()
    /// == self.str()` or `other.str()` starts with `self.str() + ":"`.
    pub fn is_parent(&self, other: &Topic) -> bool {
        let a = &self.0;
        let b = &other.0;
        if a == b {
            return true;
        }
        b.len() > a.len() && b.starts_with(a.as_str()) && b.as_bytes()[a.len()] == b':'
    }
}

fn validate_part(part: &str, name: &str) -> Result<()> {
    if part.is_empty() {
        return Err(Error::InvalidArgument(format!("{name} must not be empty")));
    }
    if part.contains(':') {
        return Err(Error::InvalidArgument(format!(
            "{name} must not contain ':'"
        )));
    }
    Ok(())
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_one_part() {
        let t = Topic::build("A").unwrap();
        assert_eq!(t.str(), "A");
        assert_eq!(t.domain(), "A");
        assert_eq!(t.subject(), "*");
        assert_eq!(t.r#type(), "*");
    }

    #[test]
    fn build_two_part() {
        let t = Topic::build2("A", "B").unwrap();
        assert_eq!(t.str(), "A:B");
        assert_eq!(t.subject(), "B");
    }

    #[test]
    fn build_two_part_wildcard_degenerates() {
        let t = Topic::build2("A", "*").unwrap();
        assert_eq!(t.str(), "A");
    }

    #[test]
    fn build_three_part() {
        let t = Topic::build3("A", "B", "1").unwrap();
        assert_eq!(t.str(), "A:B:1");
        assert_eq!(t.domain(), "A");
        assert_eq!(t.subject(), "B");
        assert_eq!(t.r#type(), "1");
    }

    #[test]
    fn build_three_part_type_wildcard_degenerates() {
        let t = Topic::build3("A", "B", "*").unwrap();
        assert_eq!(t.str(), "A:B");
    }

    #[test]
    fn build_three_part_rejects_type_with_wildcard_subject() {
        assert!(Topic::build3("A", "*", "1").is_err());
    }

    #[test]
    fn is_parent_exact_match() {
        let a = Topic::raw("A:B");
        let b = Topic::raw("A:B");
        assert!(a.is_parent(&b));
    }

    #[test]
    fn is_parent_prefix_with_boundary() {
        let a = Topic::raw("A:B");
        assert!(a.is_parent(&Topic::raw("A:B:1")));
        assert!(!a.is_parent(&Topic::raw("A")));
        assert!(!a.is_parent(&Topic::raw("A:C")));
        // "A:B" must not be considered a parent of "A:Bx" (no ':' boundary).
        assert!(!a.is_parent(&Topic::raw("A:Bx")));
    }

    #[test]
    fn raw_accepts_anything() {
        let t = Topic::raw("whatever:goes:here:even:colons");
        assert_eq!(t.str(), "whatever:goes:here:even:colons");
    }
}
