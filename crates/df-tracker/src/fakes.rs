//! In-memory IssueTracker (testing only)
//!
//! `FakeTracker` serves one issue: a title, a list of files with optional
//! bodies, and a comment count. Calls are recorded so tests can assert the
//! tracker was never contacted.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::client::{Attachment, IssueTracker};
use crate::error::{Result, TrackerError};

/// Canned tracker implementing [`IssueTracker`].
#[derive(Debug, Default)]
pub struct FakeTracker {
    title: String,
    attachments: Vec<Attachment>,
    bodies: HashMap<String, Vec<u8>>,
    comment_count: u64,
    calls: Mutex<Vec<String>>,
}

impl FakeTracker {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Add a file at `order_index`, posted with comment `comment_id`. The
    /// comment number is taken to equal the position.
    pub fn with_file(
        self,
        order_index: u64,
        file_id: u64,
        comment_id: u64,
        filename: &str,
        displayable: bool,
    ) -> Self {
        self.with_comment_file(order_index, file_id, comment_id, order_index, filename, displayable)
    }

    /// Add a file at `order_index` posted with comment `#comment_number`.
    /// Several files may share a comment.
    pub fn with_comment_file(
        mut self,
        order_index: u64,
        file_id: u64,
        comment_id: u64,
        comment_number: u64,
        filename: &str,
        displayable: bool,
    ) -> Self {
        self.attachments.push(Attachment {
            file_id,
            comment_id,
            order_index,
            comment_number,
            filename: filename.to_string(),
            file_url: Self::url_for(filename),
            comment_url: Some(format!(
                "https://www.drupal.org/node/123456#comment-{}",
                comment_id
            )),
            displayable,
        });
        self.comment_count = self.comment_count.max(comment_number);
        self
    }

    /// Set the body served for `filename`. Files without a body download as
    /// an empty patch.
    pub fn with_body(mut self, filename: &str, body: &str) -> Self {
        self.bodies
            .insert(Self::url_for(filename), body.as_bytes().to_vec());
        self
    }

    pub fn with_comment_count(mut self, count: u64) -> Self {
        self.comment_count = count;
        self
    }

    /// Download URL used for `filename`.
    pub fn url_for(filename: &str) -> String {
        format!("https://www.drupal.org/files/issues/{}", filename)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// URLs downloaded, in order.
    pub fn downloads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("download ").map(str::to_string))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl IssueTracker for FakeTracker {
    fn issue_title(&self, _issue: u64) -> Result<String> {
        self.record("issue_title".to_string());
        Ok(self.title.clone())
    }

    fn list_patch_attachments(&self, _issue: u64) -> Result<Vec<Attachment>> {
        self.record("list_patch_attachments".to_string());
        Ok(self.attachments.clone())
    }

    fn comment_count(&self, _issue: u64) -> Result<u64> {
        self.record("comment_count".to_string());
        Ok(self.comment_count)
    }

    fn download(&self, file_url: &str) -> Result<Vec<u8>> {
        self.record(format!("download {}", file_url));
        if !self.attachments.iter().any(|a| a.file_url == file_url) {
            return Err(TrackerError::NotFound {
                what: file_url.to_string(),
            });
        }
        Ok(self.bodies.get(file_url).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "fake"
    }
}
