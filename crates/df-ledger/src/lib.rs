//! # df-ledger
//!
//! The feature branch's commit history is the only record of which issue
//! patches have been applied. This crate holds the pure side of that idea:
//!
//! - [`ProvenanceTag`]: the single-line commit message format, with a strict
//!   decoder that returns `None` for anything a human wrote
//! - [`PatchLedger`]: the append-only sequence of [`CommitRecord`]s unique to
//!   the feature branch, oldest first
//! - [`PatchCandidate`]: one attachment currently listed on the issue
//! - [`reconcile`]: merges the ledger with the candidate list into a
//!   [`ReconciliationPlan`] of patches still to apply
//!
//! Nothing here touches git or the network, so the reconciliation rules can
//! be exercised with plain vectors.

pub mod candidate;
pub mod commit;
pub mod error;
pub mod reconcile;
pub mod tag;

pub use candidate::{is_recognized_patch, PatchCandidate, DEFAULT_PATCH_SUFFIX};
pub use commit::{CommitRecord, PatchLedger};
pub use error::LedgerError;
pub use reconcile::{reconcile, PatchMatch, ReconciliationPlan};
pub use tag::{Direction, ProvenanceTag, SOURCE_NAME, TOOL_NAME};
