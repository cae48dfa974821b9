use thiserror::Error;

use crate::categorize::Category;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule {index} in `{category}` has an empty {field}")]
    EmptyField {
        category: Category,
        index: usize,
        field: &'static str,
    },
    #[error("rule table could not be parsed: {0}")]
    Parse(String),
}
