//! Tag normalisation.
//!
//! Tags arrive from several publishers with inconsistent casing and spacing
//! ("EM", "em", " Electro  Mechanical "). Two tags are the same tag when they
//! compare equal after trimming, collapsing internal whitespace, and
//! case-folding. The first spelling seen wins.

use std::collections::HashSet;

/// Trims and collapses internal whitespace. Returns `None` for blank tags.
pub fn clean_tag(tag: impl AsRef<str>) -> Option<String> {
    let cleaned = tag.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

/// The comparison key of an already-cleaned tag.
fn fold(tag: &str) -> String {
    tag.to_lowercase()
}

/// Cleans and deduplicates `tags`, preserving first-seen order and casing.
///
/// ```
/// use pindex_models::normalize_tags;
/// assert_eq!(normalize_tags(["EM", " em ", "Bally", "Electro  Mechanical"]), ["EM", "Bally", "Electro Mechanical"]);
/// ```
pub fn normalize_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut set = TagSet::new();
    set.extend(tags);
    set.into_vec()
}

/// An insertion-ordered set of tags with case-insensitive membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
    seen: HashSet<String>,
}
impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tag, returning `true` if it was not already present.
    pub fn insert(&mut self, tag: impl AsRef<str>) -> bool {
        let Some(tag) = clean_tag(tag) else {
            return false;
        };
        if !self.seen.insert(fold(&tag)) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn contains(&self, tag: impl AsRef<str>) -> bool {
        clean_tag(tag).is_some_and(|tag| self.seen.contains(&fold(&tag)))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tags
    }
}
impl<S: AsRef<str>> Extend<S> for TagSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for tag in iter {
            self.insert(tag);
        }
    }
}
impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
impl IntoIterator for TagSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;
    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}
