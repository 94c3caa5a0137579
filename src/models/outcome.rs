// src/models/outcome.rs
// DOCUMENTATION: Per-record results of store writes
// PURPOSE: Let batch callers see exactly which records were stored, skipped or rejected

use serde::Serialize;

/// Result of one insert-or-skip write
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InsertOutcome {
    /// New row created with this surrogate id
    Inserted { id: i64 },
    /// A row with the same identity key already exists; nothing was written
    SkippedDuplicate { existing_id: i64 },
    /// Owner could not be resolved; nothing was written
    Rejected { reason: String },
}

impl InsertOutcome {
    /// Id of the row now standing for the record, if any
    pub fn id(&self) -> Option<i64> {
        match self {
            InsertOutcome::Inserted { id } => Some(*id),
            InsertOutcome::SkippedDuplicate { existing_id } => Some(*existing_id),
            InsertOutcome::Rejected { .. } => None,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }
}

/// How a dependent insert finds its owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OwnerRef<'a> {
    /// Surrogate id threaded through from the owner's insert
    Id(i64),
    /// Fallback: look the owner up by name at the store boundary
    SearchTerm(&'a str),
}

/// Counts over a batch of outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutcomeCounts {
    pub inserted: u32,
    pub skipped: u32,
    pub rejected: u32,
}

impl OutcomeCounts {
    pub fn tally(outcomes: &[InsertOutcome]) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            match outcome {
                InsertOutcome::Inserted { .. } => counts.inserted += 1,
                InsertOutcome::SkippedDuplicate { .. } => counts.skipped += 1,
                InsertOutcome::Rejected { .. } => counts.rejected += 1,
            }
        }
        counts
    }

    pub fn add(&mut self, other: OutcomeCounts) {
        self.inserted += other.inserted;
        self.skipped += other.skipped;
        self.rejected += other.rejected;
    }
}
