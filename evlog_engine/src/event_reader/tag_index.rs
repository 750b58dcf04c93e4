use crate::frame::RecordOffset;
use crate::header::HEADER_LEN;
use std::collections::BTreeMap;

/// Tag to the offsets of that tag's records, in append order.
///
/// Remembers how far the stream was scanned, so that an index of a live stream
/// can be brought up to date with [`crate::EventReader::refresh_tag_index`].
#[derive(Clone, Debug)]
pub struct TagIndex {
    pub(super) offsets: BTreeMap<String, Vec<RecordOffset>>,
    pub(super) record_count: u64,
    pub(super) skipped: u64,
    pub(super) untagged: u64,
    pub(super) scanned_to: RecordOffset,
    pub(super) truncated_tail: bool,
}

impl Default for TagIndex {
    fn default() -> Self {
        Self {
            offsets: BTreeMap::default(),
            record_count: 0,
            skipped: 0,
            untagged: 0,
            scanned_to: RecordOffset::from(HEADER_LEN),
            truncated_tail: false,
        }
    }
}

impl TagIndex {
    /// Empty if the tag was never seen.
    pub fn get(&self, tag: &str) -> &[RecordOffset] {
        self.offsets
            .get(tag)
            .map(|offsets| offsets.as_slice())
            .unwrap_or_default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.offsets.contains_key(tag)
    }

    /// In lexicographic order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.offsets.keys().map(|tag| tag.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RecordOffset])> {
        self.offsets
            .iter()
            .map(|(tag, offsets)| (tag.as_str(), offsets.as_slice()))
    }

    pub fn tag_count(&self) -> usize {
        self.offsets.len()
    }

    /// Frames scanned, including skipped and untagged ones.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Frames whose header could not be decoded.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn untagged(&self) -> u64 {
        self.untagged
    }

    /// The end of the last complete frame scanned.
    pub fn scanned_to(&self) -> RecordOffset {
        self.scanned_to
    }

    /// Whether the last scan stopped on a partial frame.
    pub fn has_truncated_tail(&self) -> bool {
        self.truncated_tail
    }
}
