//! Issue tracker access for dorgflow.
//!
//! [`IssueTracker`] is the seam to the outside world: the production
//! [`DrupalOrgClient`] talks to the drupal.org JSON API, while
//! `fakes::FakeTracker` (behind the `fakes` feature) serves canned
//! attachments in tests.
//! [`CandidateListBuilder`] turns a tracker listing into the ordered
//! [`df_ledger::PatchCandidate`] sequence the reconciliation engine consumes.

pub mod candidates;
pub mod client;
pub mod config;
pub mod drupal_org;
pub mod error;
#[cfg(any(test, feature = "fakes"))]
pub mod fakes;

pub use candidates::CandidateListBuilder;
pub use client::{Attachment, IssueTracker};
pub use config::TrackerConfig;
pub use drupal_org::DrupalOrgClient;
pub use error::{Result, TrackerError};
