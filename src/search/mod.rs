/// Transient title filter. Stored lowercased and trimmed; an empty filter
/// matches every note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    needle: String,
}

impl TitleFilter {
    pub fn new(input: &str) -> Self {
        Self {
            needle: normalize_query(input),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.needle
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, title: &str) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        title.to_lowercase().contains(&self.needle)
    }

    pub fn highlight_terms(&self) -> Vec<String> {
        if self.needle.is_empty() {
            Vec::new()
        } else {
            vec![self.needle.clone()]
        }
    }
}

pub fn normalize_query(input: &str) -> String {
    input.trim().to_lowercase()
}
