//! Null-tolerant dotted-path reads over raw JSON payloads.
//!
//! Paths look like `target.parentNode.className` or `addedNodes[0].id`.
//! Resolution is total: a missing field, a `null` anywhere along the way, an
//! out-of-range index or a path that does not parse all resolve to `None`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DomError;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    Field(String),
    Index(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyPath {
    raw: String,
    segments: Vec<Segment>,
}

impl PropertyPath {
    pub fn parse(raw: &str) -> Result<Self, DomError> {
        let invalid = |reason| DomError::InvalidPath {
            path: raw.to_string(),
            reason,
        };
        if raw.is_empty() {
            return Err(invalid("empty path"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err(invalid("empty segment"));
            }
            let (name, mut rest) = match part.find('[') {
                Some(pos) => part.split_at(pos),
                None => (part, ""),
            };
            if !name.is_empty() {
                segments.push(Segment::Field(name.to_string()));
            }
            while !rest.is_empty() {
                let inner = rest
                    .strip_prefix('[')
                    .ok_or_else(|| invalid("unexpected text after index"))?;
                let close = inner
                    .find(']')
                    .ok_or_else(|| invalid("unterminated index"))?;
                let index = inner[..close]
                    .parse::<usize>()
                    .map_err(|_| invalid("index is not a number"))?;
                segments.push(Segment::Index(index));
                rest = &inner[close + 1..];
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Walks `root` along the path. `null` counts as absent.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match segment {
                Segment::Field(name) => current.as_object()?.get(name)?,
                Segment::Index(idx) => current.as_array()?.get(*idx)?,
            };
            if current.is_null() {
                return None;
            }
        }
        Some(current)
    }
}

impl FromStr for PropertyPath {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PropertyPath {
    type Error = DomError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PropertyPath> for String {
    fn from(value: PropertyPath) -> Self {
        value.raw
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Resolves a path string against `root`; an unparsable path is absent.
pub fn extract<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    PropertyPath::parse(path).ok()?.resolve(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_fields_and_indices() {
        let path = PropertyPath::parse("addedNodes[0].className").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Field("addedNodes".into()),
                Segment::Index(0),
                Segment::Field("className".into()),
            ]
        );
        let leading = PropertyPath::parse("[2].id").unwrap();
        assert_eq!(leading.segments()[0], Segment::Index(2));
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "a..b", "a[", "a[x]", "a[0]b", "."] {
            assert!(PropertyPath::parse(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn resolves_present_values() {
        let payload = json!({
            "target": {"parentNode": {"className": "kix-appview"}},
            "addedNodes": [{"id": "a1"}]
        });
        assert_eq!(
            extract(&payload, "target.parentNode.className"),
            Some(&json!("kix-appview"))
        );
        assert_eq!(extract(&payload, "addedNodes[0].id"), Some(&json!("a1")));
    }

    #[test]
    fn absent_for_missing_null_and_wrong_shape() {
        let payload = json!({
            "target": {"parentNode": null, "className": {"baseVal": "x"}},
            "addedNodes": []
        });
        assert_eq!(extract(&payload, "target.parentNode.className"), None);
        assert_eq!(extract(&payload, "target.missing.deeper"), None);
        assert_eq!(extract(&payload, "addedNodes[0].className"), None);
        assert_eq!(extract(&payload, "target.className.baseVal.length"), None);
        assert_eq!(extract(&payload, "target[0]"), None);
        assert_eq!(extract(&payload, "a[zz]"), None);
    }
}
