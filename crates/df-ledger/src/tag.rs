// tag.rs - Provenance tags embedded in commit messages.
//
// Every commit dorgflow creates carries a one-line message naming the issue
// attachment it came from, or the outgoing patch file it produced. Old
// history must keep decoding, so the wire format is fixed:
//
//   Patch from Drupal.org. Comment: 10; URL: <url>; file: fix.patch; fid: 210. Automatic commit by dorgflow.
//   Patch for Drupal.org. Comment (expected): 22; file: 123-22.foo.patch. Automatic commit by dorgflow.
//
// Decoding is strict: anything that does not match the grammar exactly is a
// human commit and yields `None`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Name of the issue tracker as written into commit messages.
pub const SOURCE_NAME: &str = "Drupal.org";

/// Tool signature that closes every tagged commit message.
pub const TOOL_NAME: &str = "dorgflow";

/// Which way a patch travelled between the issue and the feature branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Downloaded from the issue and applied locally.
    AppliedFromIssue,
    /// Produced locally for upload; the comment id is a guess until the
    /// tracker lists the file.
    PostedToIssue,
}

/// Structured metadata decoded from (or encoded into) a commit message.
///
/// The variants enforce the field invariants: an applied patch always has
/// both a comment id and a file id, a posted patch only has the expected
/// comment id and its filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum ProvenanceTag {
    AppliedFromIssue {
        /// Comment number the file was posted with, as shown on the issue.
        comment_id: u64,
        file_id: u64,
        filename: String,
        url: Option<String>,
    },
    PostedToIssue {
        expected_comment_id: u64,
        filename: String,
        url: Option<String>,
    },
}

impl ProvenanceTag {
    /// Build a tag for a patch applied from the issue.
    pub fn applied(
        comment_id: u64,
        file_id: u64,
        filename: impl Into<String>,
        url: Option<String>,
    ) -> Result<Self, LedgerError> {
        let filename = validate_filename(filename.into())?;
        let url = url.map(validate_url).transpose()?;
        Ok(Self::AppliedFromIssue {
            comment_id,
            file_id,
            filename,
            url,
        })
    }

    /// Build a provisional tag for a patch about to be uploaded.
    pub fn posted(
        expected_comment_id: u64,
        filename: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        let filename = validate_filename(filename.into())?;
        Ok(Self::PostedToIssue {
            expected_comment_id,
            filename,
            url: None,
        })
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::AppliedFromIssue { .. } => Direction::AppliedFromIssue,
            Self::PostedToIssue { .. } => Direction::PostedToIssue,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            Self::AppliedFromIssue { filename, .. } | Self::PostedToIssue { filename, .. } => {
                filename
            }
        }
    }

    /// The recorded comment id; provisional for posted patches.
    pub fn comment_id(&self) -> u64 {
        match self {
            Self::AppliedFromIssue { comment_id, .. } => *comment_id,
            Self::PostedToIssue {
                expected_comment_id,
                ..
            } => *expected_comment_id,
        }
    }

    pub fn file_id(&self) -> Option<u64> {
        match self {
            Self::AppliedFromIssue { file_id, .. } => Some(*file_id),
            Self::PostedToIssue { .. } => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::AppliedFromIssue { url, .. } | Self::PostedToIssue { url, .. } => url.as_deref(),
        }
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, Self::PostedToIssue { .. })
    }

    /// Decode a commit message. Returns `None` for any message that is not
    /// exactly a dorgflow tag, including tags whose direction and fields
    /// disagree (e.g. `from` without a `fid`).
    pub fn decode(message: &str) -> Option<Self> {
        let caps = message_pattern().captures(message.trim_end())?;

        let comment_id: u64 = caps.name("comment")?.as_str().parse().ok()?;
        let filename = caps.name("file")?.as_str().to_string();
        let url = caps.name("url").map(|m| m.as_str().to_string());
        let expected = caps.name("expected").is_some();
        let file_id = match caps.name("fid") {
            Some(m) => Some(m.as_str().parse::<u64>().ok()?),
            None => None,
        };

        match (&caps["dir"], expected, file_id) {
            ("from", false, Some(file_id)) => Some(Self::AppliedFromIssue {
                comment_id,
                file_id,
                filename,
                url,
            }),
            ("for", true, None) => Some(Self::PostedToIssue {
                expected_comment_id: comment_id,
                filename,
                url,
            }),
            _ => None,
        }
    }

    /// Encode as a commit message. Inverse of [`ProvenanceTag::decode`] for
    /// every tag built through [`ProvenanceTag::applied`] or
    /// [`ProvenanceTag::posted`].
    pub fn encode(&self) -> String {
        let (dir, expected, fid) = match self {
            Self::AppliedFromIssue { file_id, .. } => ("from", "", Some(*file_id)),
            Self::PostedToIssue { .. } => ("for", " (expected)", None),
        };

        let mut message = format!(
            "Patch {} {}. Comment{}: {}; ",
            dir,
            SOURCE_NAME,
            expected,
            self.comment_id()
        );
        if let Some(url) = self.url() {
            message.push_str(&format!("URL: {}; ", url));
        }
        message.push_str(&format!("file: {}", self.filename()));
        if let Some(fid) = fid {
            message.push_str(&format!("; fid: {}", fid));
        }
        message.push_str(&format!(". Automatic commit by {}.", TOOL_NAME));
        message
    }
}

impl fmt::Display for ProvenanceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn message_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let pattern = format!(
            r"^Patch (?P<dir>from|for) {source}\. Comment(?P<expected> \(expected\))?: (?P<comment>\d+); (?:URL: (?P<url>[^;\s]+); )?file: (?P<file>[^;\r\n]+?)(?:; fid: (?P<fid>\d+))?\. Automatic commit by {tool}\.$",
            source = regex::escape(SOURCE_NAME),
            tool = regex::escape(TOOL_NAME),
        );
        // The pattern is assembled from constants; failure is a programming error.
        Regex::new(&pattern).expect("provenance tag pattern is valid")
    })
}

fn validate_filename(filename: String) -> Result<String, LedgerError> {
    let trimmed = filename.trim();
    if trimmed.is_empty()
        || trimmed != filename
        || filename.contains([';', '\r', '\n'])
        || filename.contains(". Automatic commit by ")
    {
        return Err(LedgerError::InvalidFilename(filename));
    }
    Ok(filename)
}

fn validate_url(url: String) -> Result<String, LedgerError> {
    if url.is_empty() || url.contains(';') || url.chars().any(char::is_whitespace) {
        return Err(LedgerError::InvalidUrl(url));
    }
    Ok(url)
}
