//! Host trace: one JSON-encoded host signal per line.

use std::io::BufRead;

use docwatch_dom::{HostMutation, NodeDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::TraceError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSignal {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub root: NodeDescriptor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "lowercase")]
pub enum HostSignal {
    /// Initial tree and document identity.
    Snapshot(SnapshotSignal),
    /// One observation batch, in delivery order.
    Mutations { records: Vec<HostMutation> },
    Interaction {
        event: String,
        #[serde(default)]
        payload: Value,
    },
    /// Load completion.
    Loaded,
}

/// Reads every signal in `reader`. Blank lines are skipped; the first
/// malformed line aborts the read with its 1-based line number.
pub fn read_trace<R: BufRead>(reader: R) -> Result<Vec<HostSignal>, TraceError> {
    let mut signals = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let signal = serde_json::from_str(&line).map_err(|source| TraceError::Parse {
            line: idx + 1,
            source,
        })?;
        signals.push(signal);
    }
    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwatch_dom::NodeId;
    use pretty_assertions::assert_eq;

    #[test]
    fn signals_parse_by_tag() {
        let raw = concat!(
            r#"{"signal":"snapshot","url":"https://docs.google.com/document/d/x/edit","root":{"id":1,"tag":"body"}}"#,
            "\n\n",
            r#"{"signal":"mutations","records":[{"target":1,"removed":[2]}]}"#,
            "\n",
            r#"{"signal":"interaction","event":"keydown","payload":{"key":"a"}}"#,
            "\n",
            r#"{"signal":"loaded"}"#,
            "\n",
        );
        let signals = read_trace(raw.as_bytes()).unwrap();
        assert_eq!(signals.len(), 4);
        assert!(matches!(&signals[0], HostSignal::Snapshot(s) if s.root.id == NodeId(1)));
        match &signals[1] {
            HostSignal::Mutations { records } => assert_eq!(records[0].removed, vec![NodeId(2)]),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(signals[3], HostSignal::Loaded);
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let raw = "{\"signal\":\"loaded\"}\n{\"signal\":\"bogus\"}\n";
        match read_trace(raw.as_bytes()) {
            Err(TraceError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
