/// Ordered set of normalized tags shared by entities and sounds.
///
/// Tags are normalized to lowercase ASCII alphanumerics on every operation, so
/// `"Enemy-1"` and `"enemy1"` name the same tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    tags: Vec<String>,
}

/// Lowercase and strip everything outside `[a-z0-9]`.
pub fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

impl Tags {
    pub fn new() -> Self {
        Self { tags: Vec::new() }
    }

    /// Add a tag. Returns `false` if it was already present or normalizes to nothing.
    pub fn tag(&mut self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        if tag.is_empty() || self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn tagged(&self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        self.tags.contains(&tag)
    }

    /// Remove a tag. Returns `false` if it was not present.
    pub fn untag(&mut self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        match self.tags.iter().position(|t| *t == tag) {
            Some(idx) => {
                self.tags.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
