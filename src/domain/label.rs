//! Application-label patterns used to scope server-side session queries.

use std::fmt;

/// Glob over `application_name`, where `*` matches any run of characters.
///
/// The same pattern is rendered as a SQL `LIKE` operand for the backend and
/// matched directly in memory by fakes, so both agree on what is in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPattern {
    glob: String,
}

impl LabelPattern {
    pub fn new(glob: impl Into<String>) -> Self {
        Self { glob: glob.into() }
    }

    /// Render as a `LIKE` operand using `\` as the escape character.
    pub fn to_like(&self) -> String {
        let mut out = String::with_capacity(self.glob.len() + 4);
        for ch in self.glob.chars() {
            match ch {
                '*' => out.push('%'),
                '%' | '_' | '\\' => {
                    out.push('\\');
                    out.push(ch);
                }
                other => out.push(other),
            }
        }
        out
    }

    pub fn matches(&self, label: &str) -> bool {
        let parts: Vec<&str> = self.glob.split('*').collect();
        if parts.len() == 1 {
            return self.glob == label;
        }

        let first = parts[0];
        let last = parts[parts.len() - 1];
        if label.len() < first.len() + last.len()
            || !label.starts_with(first)
            || !label.ends_with(last)
        {
            return false;
        }
        let mut rest = &label[first.len()..label.len() - last.len()];
        for part in &parts[1..parts.len() - 1] {
            match rest.find(part) {
                Some(idx) => rest = &rest[idx + part.len()..],
                None => return false,
            }
        }
        true
    }
}

impl fmt::Display for LabelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.glob)
    }
}
