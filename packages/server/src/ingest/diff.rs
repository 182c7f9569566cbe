//! Change detection between a submitted section and the stored rows.
//!
//! Entries are compared by position: the incoming entry with ordinal `k` is
//! compared to the `k`-th stored row in display order.

use std::fmt;

use crate::entity::{about_content, available_site, spec_content, variant};
use crate::ingest::submission::{
    ColorEntry, ContentEntry, Section, SiteEntry, SpecEntry, SpecListEntry, VariantEntry,
};
use crate::repository::vehicle_model::{ColorDetail, SpecDetail, SpecListDetail};

/// 1-based position of an entry within its section.
pub trait Ordinal {
    fn ordinal(&self) -> u32;
}

/// Whether an incoming entry describes the same data as a stored row.
pub trait Matches<S> {
    fn matches(&self, stored: &S) -> bool;
}

/// Row-level outcome of comparing a section, by ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionDiff {
    pub added: Vec<u32>,
    pub removed: Vec<u32>,
    pub updated: Vec<u32>,
    pub unchanged: Vec<u32>,
}

impl SectionDiff {
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

impl fmt::Display for SectionDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+{} -{} ~{} ={}",
            self.added.len(),
            self.removed.len(),
            self.updated.len(),
            self.unchanged.len()
        )
    }
}

pub fn diff<T, S>(incoming: &[T], existing: &[S]) -> SectionDiff
where
    T: Ordinal + Matches<S>,
{
    let mut result = SectionDiff::default();
    let mut claimed = vec![false; existing.len()];

    for entry in incoming {
        let ordinal = entry.ordinal();
        let slot = (ordinal as usize).checked_sub(1);
        match slot.and_then(|i| existing.get(i).map(|s| (i, s))) {
            None => result.added.push(ordinal),
            Some((i, stored)) => {
                claimed[i] = true;
                if entry.matches(stored) {
                    result.unchanged.push(ordinal);
                } else {
                    result.updated.push(ordinal);
                }
            }
        }
    }

    result.removed = claimed
        .iter()
        .enumerate()
        .filter(|(_, taken)| !**taken)
        .map(|(i, _)| i as u32 + 1)
        .collect();
    result
}

/// What to do with one section of an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Leave the stored rows alone.
    Preserved,
    /// Delete the stored rows and insert the submitted ones.
    Replaced(SectionDiff),
}

impl Verdict {
    pub fn is_replaced(&self) -> bool {
        matches!(self, Self::Replaced(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preserved => f.write_str("preserved"),
            Self::Replaced(d) => write!(f, "replaced ({d})"),
        }
    }
}

/// Decide a section's verdict.
///
/// An omitted section is preserved. A submitted one is replaced when its
/// rows differ from the stored ones or when it carries a new upload.
pub fn detect<T, S>(section: &Section<T>, existing: &[S]) -> Verdict
where
    T: Ordinal + Matches<S>,
{
    match section {
        Section::Omitted => Verdict::Preserved,
        Section::Submitted {
            entries,
            has_uploads,
        } => {
            let d = diff(entries, existing);
            if *has_uploads || !d.is_clean() {
                Verdict::Replaced(d)
            } else {
                Verdict::Preserved
            }
        }
    }
}

pub fn has_changed<T, S>(section: &Section<T>, existing: &[S]) -> bool
where
    T: Ordinal + Matches<S>,
{
    detect(section, existing).is_replaced()
}

macro_rules! impl_ordinal {
    ($($ty:ty),*) => {
        $(impl Ordinal for $ty {
            fn ordinal(&self) -> u32 {
                self.ordinal
            }
        })*
    };
}

impl_ordinal!(
    ColorEntry,
    VariantEntry,
    SiteEntry,
    ContentEntry,
    SpecListEntry,
    SpecEntry
);

impl Matches<ColorDetail> for ColorEntry {
    fn matches(&self, stored: &ColorDetail) -> bool {
        self.name == stored.name && self.image.is_none() && self.additional.is_empty()
    }
}

impl Matches<variant::Model> for VariantEntry {
    fn matches(&self, stored: &variant::Model) -> bool {
        self.name == stored.name && self.price == stored.price
    }
}

impl Matches<available_site::Model> for SiteEntry {
    fn matches(&self, stored: &available_site::Model) -> bool {
        self.name == stored.name && self.link == stored.link_phone
    }
}

impl ContentEntry {
    /// Photos compare by kind and source only, since the image itself is
    /// kept unless a new one is uploaded.
    fn matches_content(
        &self,
        kind: common::ContentKind,
        value: Option<&str>,
        image_path: Option<&str>,
        source: Option<&str>,
    ) -> bool {
        if self.kind != kind || self.source.as_deref() != source {
            return false;
        }
        if self.kind.carries_image() {
            self.upload.is_none() && image_path.is_some()
        } else {
            self.value.as_deref() == value
        }
    }
}

impl Matches<about_content::Model> for ContentEntry {
    fn matches(&self, stored: &about_content::Model) -> bool {
        self.matches_content(
            stored.kind,
            stored.value.as_deref(),
            stored.image_path.as_deref(),
            stored.source.as_deref(),
        )
    }
}

impl Matches<spec_content::Model> for ContentEntry {
    fn matches(&self, stored: &spec_content::Model) -> bool {
        self.matches_content(
            stored.kind,
            stored.value.as_deref(),
            stored.image_path.as_deref(),
            stored.source.as_deref(),
        )
    }
}

impl Matches<SpecListDetail> for SpecListEntry {
    fn matches(&self, stored: &SpecListDetail) -> bool {
        self.title == stored.title && diff(&self.contents, &stored.contents).is_clean()
    }
}

impl Matches<SpecDetail> for SpecEntry {
    fn matches(&self, stored: &SpecDetail) -> bool {
        self.title == stored.title && diff(&self.lists, &stored.lists).is_clean()
    }
}
