use std::collections::HashMap;

use docwatch_core_types::CaptureScope;
use docwatch_dom::PropertyPath;
use serde::{Deserialize, Serialize};

use crate::errors::CaptureError;

/// Category whose events signal a focus change.
pub const ATTENTION_CATEGORY: &str = "attention";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSpec {
    pub category: String,
    pub events: Vec<String>,
    pub properties: Vec<PropertyPath>,
    pub scope: CaptureScope,
}

impl CaptureSpec {
    fn new(category: &str, events: &[&str], properties: &[&str], scope: CaptureScope) -> Self {
        Self {
            category: category.to_string(),
            events: events.iter().map(|event| event.to_string()).collect(),
            properties: properties
                .iter()
                .filter_map(|raw| PropertyPath::parse(raw).ok())
                .collect(),
            scope,
        }
    }
}

const KEY_PROPERTIES: &[&str] = &[
    "altKey",
    "charCode",
    "code",
    "ctrlKey",
    "isComposing",
    "key",
    "keyCode",
    "location",
    "metaKey",
    "repeat",
    "shiftKey",
    "target.className",
    "target.id",
    "target.nodeType",
    "target.localName",
];

const POINTER_PROPERTIES: &[&str] = &[
    "button",
    "buttons",
    "clientX",
    "clientY",
    "offsetX",
    "offsetY",
    "screenX",
    "screenY",
    "altKey",
    "ctrlKey",
    "metaKey",
    "shiftKey",
    "detail",
    "target.id",
    "target.className",
    "target.innerText",
    "target.nodeType",
    "target.localName",
    "target.parentNode.id",
    "target.parentNode.className",
    "target.parentNode.nodeType",
    "target.parentNode.localName",
];

const FOCUS_PROPERTIES: &[&str] = &[
    "target.className",
    "target.id",
    "target.nodeType",
    "target.localName",
    "relatedTarget.className",
    "relatedTarget.id",
];

const VISIBILITY_PROPERTIES: &[&str] = &[
    "target.visibilityState",
    "target.activeElement.className",
    "target.activeElement.id",
];

const SAVE_PROPERTIES: &[&str] = &["detail.status", "detail.revision"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CaptureSpec>", into = "Vec<CaptureSpec>")]
pub struct CaptureTable {
    specs: Vec<CaptureSpec>,
    by_event: HashMap<String, usize>,
}

impl CaptureTable {
    pub fn new(specs: Vec<CaptureSpec>) -> Result<Self, CaptureError> {
        let mut by_event = HashMap::new();
        for (index, spec) in specs.iter().enumerate() {
            if spec.events.is_empty() {
                return Err(CaptureError::NoEvents(spec.category.clone()));
            }
            for event in &spec.events {
                if let Some(previous) = by_event.insert(event.clone(), index) {
                    return Err(CaptureError::DuplicateEvent {
                        event: event.clone(),
                        first: specs[previous].category.clone(),
                        second: spec.category.clone(),
                    });
                }
            }
        }
        Ok(Self { specs, by_event })
    }

    pub fn builtin() -> Self {
        let specs = vec![
            CaptureSpec::new(
                "keystroke",
                &["keypress", "keydown", "keyup"],
                KEY_PROPERTIES,
                CaptureScope::Document,
            ),
            CaptureSpec::new(
                "mouseclick",
                &["mouseup", "mousedown", "click", "contextmenu", "dblclick"],
                POINTER_PROPERTIES,
                CaptureScope::Document,
            ),
            CaptureSpec::new(
                ATTENTION_CATEGORY,
                &["focusin", "focusout"],
                FOCUS_PROPERTIES,
                CaptureScope::Window,
            ),
            CaptureSpec::new(
                "visibility",
                &["visibilitychange"],
                VISIBILITY_PROPERTIES,
                CaptureScope::Document,
            ),
            CaptureSpec::new(
                "save",
                &["google_docs_save"],
                SAVE_PROPERTIES,
                CaptureScope::Document,
            ),
            CaptureSpec::new("load", &["load"], &[], CaptureScope::Window),
        ];
        let mut by_event = HashMap::new();
        for (index, spec) in specs.iter().enumerate() {
            for event in &spec.events {
                by_event.insert(event.clone(), index);
            }
        }
        Self { specs, by_event }
    }

    pub fn lookup(&self, event: &str) -> Option<&CaptureSpec> {
        self.by_event.get(event).map(|index| &self.specs[*index])
    }

    pub fn specs(&self) -> &[CaptureSpec] {
        &self.specs
    }

    pub fn scoped(&self, scope: CaptureScope) -> impl Iterator<Item = &CaptureSpec> {
        self.specs.iter().filter(move |spec| spec.scope == scope)
    }
}

impl TryFrom<Vec<CaptureSpec>> for CaptureTable {
    type Error = CaptureError;

    fn try_from(value: Vec<CaptureSpec>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CaptureTable> for Vec<CaptureSpec> {
    fn from(value: CaptureTable) -> Self {
        value.specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_paths_all_parse() {
        let table = CaptureTable::builtin();
        let keystroke = table.lookup("keydown").unwrap();
        assert_eq!(keystroke.category, "keystroke");
        assert_eq!(keystroke.properties.len(), KEY_PROPERTIES.len());
        assert_eq!(
            table.lookup("click").unwrap().properties.len(),
            POINTER_PROPERTIES.len()
        );
        assert!(CaptureTable::new(table.specs().to_vec()).is_ok());
    }

    #[test]
    fn attention_is_window_scoped() {
        let table = CaptureTable::builtin();
        assert_eq!(table.lookup("focusin").unwrap().scope, CaptureScope::Window);
        assert!(table
            .scoped(CaptureScope::Document)
            .all(|spec| spec.category != ATTENTION_CATEGORY));
        assert!(table.lookup("scroll").is_none());
    }

    #[test]
    fn duplicate_event_names_are_rejected() {
        let specs = vec![
            CaptureSpec::new("a", &["keydown"], &[], CaptureScope::Document),
            CaptureSpec::new("b", &["keydown"], &[], CaptureScope::Window),
        ];
        assert_eq!(
            CaptureTable::new(specs),
            Err(CaptureError::DuplicateEvent {
                event: "keydown".into(),
                first: "a".into(),
                second: "b".into(),
            })
        );
    }
}
