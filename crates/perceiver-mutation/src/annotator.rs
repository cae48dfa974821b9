//! Rule matching and context enrichment for classified records.

use std::sync::Arc;

use docwatch_core_types::DocumentStamp;
use docwatch_dom::{DocumentTree, MutationRecord, NodeId};
use serde::{Deserialize, Serialize};

use crate::categorize::{classify, Category};
use crate::lifecycle::DocumentLifecycle;
use crate::rules::{Rule, RuleTable};
use crate::snapshot::MutationSnapshot;

/// Marks insert labels produced while the document is still loading.
pub const LOADING_PREFIX: &str = "loading_";

/// Result of a successful rule match, before document identity is attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub category: Category,
    pub label: String,
    pub context_content: Option<String>,
    pub change: MutationSnapshot,
}

impl Annotation {
    pub fn into_event(self, stamp: DocumentStamp) -> AnnotatedEvent {
        AnnotatedEvent {
            event_type: self.category,
            label: self.label,
            change: self.change,
            context_content: self.context_content,
            stamp,
        }
    }
}

/// Payload handed to the emission sink for every matched record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedEvent {
    pub event_type: Category,
    #[serde(rename = "type")]
    pub label: String,
    pub change: MutationSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_content: Option<String>,
    #[serde(flatten)]
    pub stamp: DocumentStamp,
}

#[derive(Clone)]
pub struct Annotator {
    rules: Arc<RuleTable>,
    lifecycle: Arc<DocumentLifecycle>,
}

impl Annotator {
    pub fn new(rules: Arc<RuleTable>, lifecycle: Arc<DocumentLifecycle>) -> Self {
        Self { rules, lifecycle }
    }

    pub fn lifecycle(&self) -> &DocumentLifecycle {
        &self.lifecycle
    }

    pub fn annotate(&self, tree: &DocumentTree, record: &MutationRecord) -> Option<Annotation> {
        self.annotate_classified(tree, record, classify(tree, record))
    }

    /// Applies the first rule of `category` whose predicate holds. At most
    /// one rule ever contributes to a record.
    pub fn annotate_classified(
        &self,
        tree: &DocumentTree,
        record: &MutationRecord,
        category: Category,
    ) -> Option<Annotation> {
        let rule = self
            .rules
            .rules_for(category)
            .iter()
            .find(|rule| rule_matches(tree, record, category, rule))?;

        let label = if category == Category::Insert && self.lifecycle.is_loading() {
            format!("{LOADING_PREFIX}{}", rule.label)
        } else {
            rule.label.clone()
        };
        let context_content = rule
            .context
            .as_deref()
            .and_then(|token| context_text(tree, record.target, token));

        Some(Annotation {
            category,
            label,
            context_content,
            change: MutationSnapshot::capture(tree, record),
        })
    }
}

/// Insert and delete inspect the changed node itself plus the target; every
/// other category inspects the target's parent only.
fn rule_matches(tree: &DocumentTree, record: &MutationRecord, category: Category, rule: &Rule) -> bool {
    match category {
        Category::Insert => fragment_matches(tree, record.first_added(), record.target, rule),
        Category::Delete => fragment_matches(tree, record.first_removed(), record.target, rule),
        Category::Clear
        | Category::Input
        | Category::Replace
        | Category::Suggest
        | Category::Other => tree
            .parent(record.target)
            .map(|parent| tree.has_class(parent, &rule.source))
            .unwrap_or(false),
    }
}

fn fragment_matches(
    tree: &DocumentTree,
    fragment: Option<NodeId>,
    target: NodeId,
    rule: &Rule,
) -> bool {
    let Some(fragment) = fragment else {
        return false;
    };
    tree.has_class(fragment, &rule.source)
        && (rule.ancestor.is_empty() || tree.has_class(target, &rule.ancestor))
}

fn context_text(tree: &DocumentTree, target: NodeId, token: &str) -> Option<String> {
    let holder = tree.closest_with_class(target, token)?;
    tree.inner_text(holder)
}
