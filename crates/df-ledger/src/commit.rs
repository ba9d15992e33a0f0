// commit.rs - Commit records and the append-only ledger built from them.
//
// The ledger is whatever `git log base..feature` says it is. It is never
// stored anywhere else; each run rebuilds it from scratch and only grows it
// by appending the commits it creates.

use serde::{Deserialize, Serialize};

use crate::tag::ProvenanceTag;

/// One commit unique to the feature branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
    /// `None` marks a human-authored commit; it keeps its place in the
    /// sequence but never matches a candidate.
    pub tag: Option<ProvenanceTag>,
}

impl CommitRecord {
    /// Build a record, decoding the message.
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let tag = ProvenanceTag::decode(&message);
        Self {
            sha: sha.into(),
            message,
            tag,
        }
    }

    pub fn is_tagged(&self) -> bool {
        self.tag.is_some()
    }
}

/// Chronological (oldest first) sequence of commits unique to the feature
/// branch. Records can only be appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchLedger {
    records: Vec<CommitRecord>,
}

impl PatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap records that are already in oldest-first order.
    pub fn from_records(records: Vec<CommitRecord>) -> Self {
        Self { records }
    }

    /// Append a newly created commit.
    pub fn push(&mut self, record: CommitRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[CommitRecord] {
        &self.records
    }

    /// Tagged records with their tags, oldest first.
    pub fn tagged(&self) -> impl Iterator<Item = (&CommitRecord, &ProvenanceTag)> {
        self.records
            .iter()
            .filter_map(|record| record.tag.as_ref().map(|tag| (record, tag)))
    }

    /// The newest commit on the feature branch, if any.
    pub fn last(&self) -> Option<&CommitRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
