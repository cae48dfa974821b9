//! Declarative rule table: category → ordered rules.

use serde::{Deserialize, Serialize};

use crate::categorize::Category;
use crate::errors::RuleError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Class token of the changed fragment (or of the target's parent for
    /// categories other than insert/delete).
    pub source: String,
    /// Class token the record target must carry. Empty matches any target.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ancestor: String,
    pub label: String,
    /// Class token of the ancestor whose text is copied into the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Rule {
    pub fn new(source: &str, ancestor: &str, label: &str, context: Option<&str>) -> Self {
        Self {
            source: source.to_string(),
            ancestor: ancestor.to_string(),
            label: label.to_string(),
            context: context.map(str::to_string),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleTable {
    #[serde(default)]
    insert: Vec<Rule>,
    #[serde(default)]
    delete: Vec<Rule>,
    #[serde(default)]
    clear: Vec<Rule>,
    #[serde(default)]
    input: Vec<Rule>,
    #[serde(default)]
    replace: Vec<Rule>,
    #[serde(default)]
    suggest: Vec<Rule>,
    #[serde(default)]
    other: Vec<Rule>,
}

impl RuleTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rules for the comment sidebar, spelling bubbles and body text of the
    /// hosted editor.
    pub fn builtin() -> Self {
        Self {
            insert: vec![
                Rule::new(
                    "docos-docoview-resolve-button-visible",
                    "add-comment",
                    "add-comment",
                    Some("kix-discussion-plugin"),
                ),
                Rule::new(
                    "docos-replyview",
                    "docos-docoview-replycontainer",
                    "add-reply",
                    Some("docos-anchoreddocoview"),
                ),
                Rule::new(
                    "docos-anchoredsuggestionview",
                    "docos-stream-view",
                    "suggestion-card",
                    Some("docos-anchoredsuggestionview-content"),
                ),
                Rule::new("kix-spell-bubble", "", "spelling-bubble", None),
                Rule::new(
                    "docs-findandreplacedialog",
                    "",
                    "find-and-replace-opened",
                    None,
                ),
            ],
            delete: vec![
                Rule::new(
                    "docos-anchoreddocoview",
                    "docos-stream-view",
                    "resolve-comment",
                    None,
                ),
                Rule::new(
                    "docos-anchoredsuggestionview",
                    "docos-stream-view",
                    "resolve-suggestion",
                    None,
                ),
                Rule::new("kix-spell-bubble", "", "spelling-bubble-dismissed", None),
            ],
            clear: vec![Rule::new(
                "docos-input-contenteditable",
                "",
                "clear-comment-draft",
                Some("docos-anchoreddocoview"),
            )],
            input: vec![
                Rule::new(
                    "kix-wordhtmlgenerator-word-node",
                    "",
                    "text-input",
                    Some("kix-paragraphrenderer"),
                ),
                Rule::new(
                    "docos-input-contenteditable",
                    "",
                    "comment-draft-input",
                    Some("docos-anchoreddocoview"),
                ),
            ],
            replace: vec![
                Rule::new(
                    "kix-wordhtmlgenerator-word-node",
                    "",
                    "text-replace",
                    Some("kix-paragraphrenderer"),
                ),
                Rule::new(
                    "docos-input-contenteditable",
                    "",
                    "comment-draft-replace",
                    Some("docos-anchoreddocoview"),
                ),
            ],
            suggest: vec![Rule::new(
                "kix-lineview-text-block",
                "",
                "suggestion-edit",
                Some("kix-paragraphrenderer"),
            )],
            other: Vec::new(),
        }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, RuleError> {
        let table: Self = serde_yaml::from_str(raw).map_err(|err| RuleError::Parse(err.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, RuleError> {
        let table: Self = serde_json::from_str(raw).map_err(|err| RuleError::Parse(err.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        for category in Category::ALL {
            for (index, rule) in self.rules_for(category).iter().enumerate() {
                let empty = |field| RuleError::EmptyField {
                    category,
                    index,
                    field,
                };
                if rule.source.trim().is_empty() {
                    return Err(empty("source"));
                }
                if rule.label.trim().is_empty() {
                    return Err(empty("label"));
                }
                if matches!(&rule.context, Some(ctx) if ctx.trim().is_empty()) {
                    return Err(empty("context"));
                }
            }
        }
        Ok(())
    }

    /// Rules for `category`, in the order they are tried.
    pub fn rules_for(&self, category: Category) -> &[Rule] {
        match category {
            Category::Insert => &self.insert,
            Category::Delete => &self.delete,
            Category::Clear => &self.clear,
            Category::Input => &self.input,
            Category::Replace => &self.replace,
            Category::Suggest => &self.suggest,
            Category::Other => &self.other,
        }
    }

    pub fn push(&mut self, category: Category, rule: Rule) {
        let bucket = match category {
            Category::Insert => &mut self.insert,
            Category::Delete => &mut self.delete,
            Category::Clear => &mut self.clear,
            Category::Input => &mut self.input,
            Category::Replace => &mut self.replace,
            Category::Suggest => &mut self.suggest,
            Category::Other => &mut self.other,
        };
        bucket.push(rule);
    }

    pub fn len(&self) -> usize {
        Category::ALL
            .iter()
            .map(|category| self.rules_for(*category).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        let table = RuleTable::builtin();
        table.validate().unwrap();
        assert_eq!(
            table.rules_for(Category::Insert)[0].source,
            "docos-docoview-resolve-button-visible"
        );
        assert!(table.rules_for(Category::Other).is_empty());
    }

    #[test]
    fn yaml_table_keeps_definition_order() {
        let table = RuleTable::from_yaml_str(
            r#"
insert:
  - source: first
    label: one
  - source: second
    ancestor: host
    label: two
    context: wrapper
"#,
        )
        .unwrap();
        let insert = table.rules_for(Category::Insert);
        assert_eq!(insert.len(), 2);
        assert_eq!(insert[0], Rule::new("first", "", "one", None));
        assert_eq!(insert[1], Rule::new("second", "host", "two", Some("wrapper")));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn rejects_rules_without_label() {
        let err = RuleTable::from_json_str(r#"{"delete": [{"source": "x", "label": " "}]}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            RuleError::EmptyField {
                category: Category::Delete,
                index: 0,
                field: "label"
            }
        ));
    }

    #[test]
    fn rejects_unknown_categories() {
        assert!(RuleTable::from_yaml_str("mystery: []").is_err());
    }
}
