use super::builder::SecurityFix;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

/// Ordered list of header entries with case-insensitive upsert. Generators
/// parse existing structured config into this, merge fixes, and serialize.
/// Repeated names are allowed; only headers being fixed are collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderDocument {
    entries: Vec<HeaderEntry>,
}

impl HeaderDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixes(fixes: &[SecurityFix]) -> Self {
        let mut doc = Self::new();
        doc.apply_fixes(fixes);
        doc
    }

    pub fn entries(&self) -> &[HeaderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.value.as_str())
    }

    /// Appends an entry as-is, keeping any earlier entry with the same name.
    pub fn push(&mut self, name: &str, value: &str) {
        self.entries.push(HeaderEntry {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Replaces the first entry with this name in place and drops any later
    /// duplicates; appends when the header is absent.
    pub fn upsert(&mut self, name: &str, value: &str) {
        let Some(first) = self.entries.iter().position(|e| e.name.eq_ignore_ascii_case(name)) else {
            self.push(name, value);
            return;
        };
        self.entries[first] = HeaderEntry {
            name: name.to_string(),
            value: value.to_string(),
        };
        let mut index = 0;
        self.entries.retain(|e| {
            let keep = index <= first || !e.name.eq_ignore_ascii_case(name);
            index += 1;
            keep
        });
    }

    pub fn apply_fixes(&mut self, fixes: &[SecurityFix]) {
        for fix in fixes {
            self.upsert(&fix.header, &fix.value);
        }
    }
}

/// True if `name` is one of the headers being fixed.
pub fn is_fixed_header(fixes: &[SecurityFix], name: &str) -> bool {
    fixes.iter().any(|f| f.header.eq_ignore_ascii_case(name))
}

/// Escapes a value for a double-quoted config string.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// JavaScript string literal for a header name or value.
pub fn js_string(value: &str) -> String {
    quote(value)
}
