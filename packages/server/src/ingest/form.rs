//! Raw multipart payload and the positional-index field naming scheme.
//!
//! Repeated entries are encoded in field names: `variantName2` is the name of
//! the second variant, `specContentType1_3_2` the type of the second content
//! of the third list of the first specification. Indices are 1-based.

use std::collections::BTreeMap;
use std::fmt;

/// A file received with the form, already written to the asset store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub field_name: String,
    /// Canonical web path of the stored file.
    pub path: String,
}

/// Text fields and stored uploads of one multipart request.
#[derive(Debug, Clone, Default)]
pub struct RawForm {
    fields: BTreeMap<String, String>,
    files: Vec<UploadedFile>,
}

impl RawForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a text field. A repeated field name keeps the first value.
    pub fn insert_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_insert_with(|| value.into());
    }

    /// Record a stored upload. A repeated field name keeps the first file.
    pub fn push_file(&mut self, file: UploadedFile) {
        if self.file(&file.field_name).is_none() {
            self.files.push(file);
        }
    }

    /// Trimmed value of a field, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field_name == name)
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Canonical paths of every upload in the request.
    pub fn upload_paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// True if any upload's field name starts with one of `prefixes`.
    pub fn has_upload_in(&self, prefixes: &[&str]) -> bool {
        self.files
            .iter()
            .any(|f| prefixes.iter().any(|p| f.field_name.starts_with(p)))
    }

    fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Largest index accepted in a field-name suffix. Fields indexed beyond it
/// are not part of any section.
pub const MAX_INDEX: u32 = 10_000;

/// Position of an entry in the form, outermost index first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexPath(Vec<u32>);

impl IndexPath {
    /// The empty path, parent of all top-level entries.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a field-name suffix such as `1_3_2`. Every index must be a
    /// decimal integer in `1..=MAX_INDEX`.
    pub fn parse(suffix: &str) -> Option<Self> {
        if suffix.is_empty() {
            return None;
        }
        suffix
            .split('_')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                part.parse::<u32>()
                    .ok()
                    .filter(|n| (1..=MAX_INDEX).contains(n))
            })
            .collect::<Option<Vec<u32>>>()
            .map(Self)
    }

    pub fn child(&self, index: u32) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    /// Index of the entry within its parent.
    pub fn ordinal(&self) -> u32 {
        self.0.last().copied().unwrap_or(0)
    }

    pub fn is_parent_of(&self, other: &IndexPath) -> bool {
        other.0.len() == self.0.len() + 1 && other.0.starts_with(&self.0)
    }

    /// Field name for this entry, e.g. `IndexPath([1, 2]).field("specListTitle")`
    /// is `specListTitle1_2`.
    pub fn field(&self, prefix: &str) -> String {
        format!("{prefix}{self}")
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("_")?;
            }
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

/// One positional entry of a section, with access to its sibling fields.
#[derive(Debug, Clone)]
pub struct IndexedEntry<'a> {
    pub index: IndexPath,
    form: &'a RawForm,
}

impl<'a> IndexedEntry<'a> {
    /// Trimmed non-blank value of `{prefix}{index}`.
    pub fn text(&self, prefix: &str) -> Option<&'a str> {
        self.form.text(&self.index.field(prefix))
    }

    /// Upload stored under `{prefix}{index}`.
    pub fn file(&self, prefix: &str) -> Option<&'a UploadedFile> {
        self.form.file(&self.index.field(prefix))
    }

    /// Upload stored under `{prefix}{index}_{slot}`.
    pub fn slot_file(&self, prefix: &str, slot: u32) -> Option<&'a UploadedFile> {
        self.form.file(&self.index.child(slot).field(prefix))
    }

    pub fn ordinal(&self) -> u32 {
        self.index.ordinal()
    }

    /// Entries nested directly under this one.
    pub fn children(&self, key: &str) -> Vec<IndexedEntry<'a>> {
        parse_indexed_section(self.form, key, &self.index)
    }
}

/// Collect the entries of a section, ordered by index.
///
/// An entry exists at position `parent_i` when the form carries the field
/// `{key}{parent_i}`, even if its value is blank. Field names whose suffix is
/// not an index path one level below `parent` are ignored, so the key
/// `specContent` does not pick up `specContentType1_1_1`.
pub fn parse_indexed_section<'a>(
    form: &'a RawForm,
    key: &str,
    parent: &IndexPath,
) -> Vec<IndexedEntry<'a>> {
    let mut entries: Vec<IndexedEntry<'a>> = form
        .field_names()
        .filter_map(|name| name.strip_prefix(key))
        .filter_map(IndexPath::parse)
        .filter(|index| parent.is_parent_of(index))
        .map(|index| IndexedEntry { index, form })
        .collect();
    entries.sort_by(|a, b| a.index.cmp(&b.index));
    entries.dedup_by(|a, b| a.index == b.index);
    entries
}
