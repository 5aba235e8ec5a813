//! URL harvester: merges the network and DOM discovery channels into a
//! deduplicated, classified reference set.
//!
//! # Rules
//!
//! - Network events are expected to be absolute URLs; anything that does not
//!   parse is dropped.
//! - DOM references are resolved against the page base URL, except inline
//!   `data:` payloads which are kept verbatim.
//! - A reference seen through both channels is recorded once.
//! - Discarded references never reach the snapshot.
//!
//! # Example
//!
//! ```
//! use media_harvester::harvest::harvest;
//!
//! let network = vec!["https://cdn.example.com/hero.jpg".to_string()];
//! let dom = vec!["/hero.jpg".to_string(), "clip.mp4?autoplay=1".to_string()];
//! let result = harvest(&network, &dom, "https://cdn.example.com/page/");
//! assert_eq!(result.images.len(), 1);
//! assert_eq!(result.videos.len(), 1);
//! ```

pub mod dom;
mod source;

use std::collections::HashSet;

use tracing::{debug, instrument, trace};
use url::Url;

use crate::media::{MediaCategory, MediaReference, is_inline_reference};

pub use dom::{DomSnapshot, background_image_urls, parse_srcset};
pub use source::{LiveUrlSource, OneShotDomQuery, ReplaySource, harvest_page};

/// Classified snapshot handed to the download pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    /// Image references in first-seen order.
    pub images: Vec<MediaReference>,
    /// Video references in first-seen order.
    pub videos: Vec<MediaReference>,
    /// Number of distinct references dropped as non-media or unresolvable.
    pub discarded: usize,
}

impl Harvest {
    /// Total number of downloadable references.
    #[must_use]
    pub fn total(&self) -> usize {
        self.images.len() + self.videos.len()
    }

    /// Returns true when nothing is downloadable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Insertion-ordered set of references keyed by identity.
#[derive(Debug, Default)]
pub struct ReferenceSet {
    seen: HashSet<String>,
    entries: Vec<MediaReference>,
}

impl ReferenceSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a reference; returns false when its identity is already present.
    pub fn insert(&mut self, reference: MediaReference) -> bool {
        if !self.seen.insert(reference.identity().to_string()) {
            return false;
        }
        self.entries.push(reference);
        true
    }

    /// Number of distinct references recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no reference was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Splits the set into the category snapshot, dropping discarded entries.
    #[must_use]
    pub fn into_harvest(self) -> Harvest {
        let mut harvest = Harvest::default();
        for reference in self.entries {
            match reference.category() {
                Some(MediaCategory::Image) => harvest.images.push(reference),
                Some(MediaCategory::Video) => harvest.videos.push(reference),
                None => harvest.discarded += 1,
            }
        }
        harvest
    }
}

/// Merges both discovery channels and classifies every distinct reference.
///
/// Unresolvable references are dropped silently and only counted.
#[must_use]
#[instrument(skip_all, fields(network = network_events.len(), dom = dom_references.len()))]
pub fn harvest<N, D>(network_events: &[N], dom_references: &[D], page_base_url: &str) -> Harvest
where
    N: AsRef<str>,
    D: AsRef<str>,
{
    let base = Url::parse(page_base_url).ok();
    if base.is_none() {
        debug!(base = %page_base_url, "page base URL does not parse; relative references will be dropped");
    }

    let mut set = ReferenceSet::new();
    let mut unresolved = 0usize;

    for event in network_events {
        match network_reference(event.as_ref()) {
            Some(reference) => {
                set.insert(reference);
            }
            None => unresolved += 1,
        }
    }

    for raw in dom_references {
        match dom_reference(raw.as_ref(), base.as_ref()) {
            Some(reference) => {
                set.insert(reference);
            }
            None => unresolved += 1,
        }
    }

    let distinct = set.len();
    let mut result = set.into_harvest();
    result.discarded += unresolved;

    debug!(
        distinct,
        images = result.images.len(),
        videos = result.videos.len(),
        discarded = result.discarded,
        "harvest classified"
    );
    result
}

fn network_reference(event: &str) -> Option<MediaReference> {
    let event = event.trim();
    if is_inline_reference(event) {
        return Some(MediaReference::from_inline(event));
    }
    match Url::parse(event) {
        Ok(url) => Some(MediaReference::from_url(event, url)),
        Err(error) => {
            trace!(event = %event, %error, "dropping unparsable network event");
            None
        }
    }
}

fn dom_reference(raw: &str, base: Option<&Url>) -> Option<MediaReference> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if is_inline_reference(raw) {
        return Some(MediaReference::from_inline(raw));
    }

    let resolved = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw),
    };
    match resolved {
        Ok(url) => Some(MediaReference::from_url(raw, url)),
        Err(error) => {
            trace!(reference = %raw, %error, "dropping unresolvable DOM reference");
            None
        }
    }
}
