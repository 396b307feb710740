//! Typed addressing into a form tree
//!
//! Paths are written as dot-separated segments, where an all-digit segment
//! is a collection index: `experience.0.responsibilities.2`. They are parsed
//! once into [`FormPath`] and then resolved segment by segment.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{FormError, Result};

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Named child of a group
    Key(String),
    /// Element of a collection
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Location of a node, relative to the form root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FormPath(Vec<Segment>);

impl FormPath {
    /// The form root
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path. The empty string is the root.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        trimmed
            .split('.')
            .map(|part| {
                if part.is_empty() {
                    return Err(FormError::InvalidPath {
                        path: input.to_string(),
                        reason: "empty segment".to_string(),
                    });
                }
                if is_index(part) {
                    if part.len() > 1 && part.starts_with('0') {
                        return Err(FormError::InvalidPath {
                            path: input.to_string(),
                            reason: format!("index '{}' has a leading zero", part),
                        });
                    }
                    part.parse::<usize>()
                        .map(Segment::Index)
                        .map_err(|e| FormError::InvalidPath {
                            path: input.to_string(),
                            reason: e.to_string(),
                        })
                } else {
                    Ok(Segment::Key(part.to_string()))
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Append a group key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(Segment::Key(key.into()));
        self
    }

    /// Append a collection index
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Segment::Index(index));
        self
    }

    /// Path of a named child, leaving `self` untouched
    pub fn child_key(&self, key: &str) -> Self {
        self.clone().key(key)
    }

    /// Path of a collection element, leaving `self` untouched
    pub fn child_index(&self, index: usize) -> Self {
        self.clone().index(index)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

/// Whether a path segment is read as a collection index rather than a key
pub(crate) fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for FormPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for FormPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for FormPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_path() {
        let path = FormPath::parse("experience.0.responsibilities.2").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("experience".to_string()),
                Segment::Index(0),
                Segment::Key("responsibilities".to_string()),
                Segment::Index(2),
            ]
        );
        assert_eq!(path.to_string(), "experience.0.responsibilities.2");
    }

    #[test]
    fn test_builder_matches_parse() {
        let built = FormPath::root().key("education").index(1).key("startYear");
        assert_eq!(built, "education.1.startYear".parse::<FormPath>().unwrap());
    }

    #[test]
    fn test_root_and_errors() {
        assert!(FormPath::parse("").unwrap().is_root());
        assert!(matches!(
            FormPath::parse("address..city"),
            Err(FormError::InvalidPath { .. })
        ));
        // A leading sign is a key, not an index
        assert_eq!(
            FormPath::parse("+1").unwrap().segments(),
            &[Segment::Key("+1".to_string())]
        );
    }

    #[test]
    fn test_index_leading_zero_rejected() {
        assert!(matches!(
            FormPath::parse("phoneNumbers.01"),
            Err(FormError::InvalidPath { reason, .. }) if reason.contains("leading zero")
        ));
        assert_eq!(
            FormPath::parse("phoneNumbers.0").unwrap().to_string(),
            "phoneNumbers.0"
        );
        assert_eq!(FormPath::parse("phoneNumbers.10").unwrap().to_string(), "phoneNumbers.10");
    }
}
