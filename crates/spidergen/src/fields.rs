use indexmap::IndexSet;

use crate::code::CodeBuffer;
use crate::config::Config;

/// Fields every generated item carries: record id, owning task id and timestamp.
pub const SYSTEM_FIELDS: [&str; 3] = ["_id", "task_id", "ts"];

/// Fields filled by content extraction, in declaration order.
pub const CANONICAL_FIELDS: [&str; 8] = [
    "title",
    "content",
    "raw_html",
    "publish_datetime_utc",
    "tags",
    "publish_date",
    "title_zh",
    "content_zh",
];

/// Insertion-ordered set of item field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    names: IndexSet<String>,
}

impl FieldSet {
    /// Builds the item schema for `config`.
    ///
    /// System fields come first, then the canonical fields when content
    /// extraction is enabled, then every configured field in stage order.
    /// Later duplicates are dropped.
    pub fn build(config: &Config) -> Self {
        let mut fields = Self::default();

        fields.extend(SYSTEM_FIELDS);
        if config.content_extraction_mode {
            fields.extend(CANONICAL_FIELDS);
        }
        fields.extend(config.all_fields().map(|field| field.name.as_str()));

        fields
    }

    /// Returns `false` if `name` was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// The `ITEMS` region: one `scrapy.Field()` declaration per name.
    pub fn render(&self) -> String {
        let mut code = CodeBuffer::new();
        for name in self.iter() {
            code.line(1, format!("{} = scrapy.Field()", name));
        }
        code.into_string()
    }
}

impl<S: Into<String>> Extend<S> for FieldSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}

/// Reserved words of Python 3.
const PYTHON_KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

pub fn is_canonical(name: &str) -> bool {
    CANONICAL_FIELDS.contains(&name)
}

/// Whether `name` can be declared as an item attribute in `items.py`.
///
/// Only ASCII identifiers are accepted.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !PYTHON_KEYWORDS.contains(&name)
}
