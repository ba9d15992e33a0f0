// drupal_org.rs - IssueTracker over the drupal.org JSON API.
//
// An issue is a node. Its JSON carries the file field (in posting order,
// each item pointing at a file entity and the comment it came with) and the
// list of comments (also in posting order). The file entity carries the
// real filename and download URL, so listing an issue costs one request for
// the node plus one per file.
//
// drupal.org serialises ids and flags as strings ("123", "1"); the helpers
// below accept either strings or numbers.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::client::{Attachment, IssueTracker};
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};

#[derive(Debug, Deserialize)]
struct NodeResponse {
    title: String,
    #[serde(default)]
    field_issue_files: Vec<IssueFileItem>,
    #[serde(default)]
    comments: Vec<EntityRef>,
}

#[derive(Debug, Deserialize)]
struct IssueFileItem {
    file: FileRef,
    #[serde(default, deserialize_with = "flag")]
    display: bool,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    #[serde(deserialize_with = "id")]
    id: u64,
    #[serde(default, deserialize_with = "optional_id")]
    cid: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EntityRef {
    #[serde(deserialize_with = "id")]
    id: u64,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    name: String,
    url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(u64),
    Text(String),
    Bool(bool),
}

fn id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    match Scalar::deserialize(deserializer)? {
        Scalar::Number(n) => Ok(n),
        Scalar::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Scalar::Bool(_) => Err(serde::de::Error::custom("expected an id, found a boolean")),
    }
}

fn optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u64>, D::Error> {
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Number(0)) => Ok(None),
        Some(Scalar::Number(n)) => Ok(Some(n)),
        Some(Scalar::Text(s)) if s.trim().is_empty() || s.trim() == "0" => Ok(None),
        Some(Scalar::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        Some(Scalar::Bool(_)) => Err(serde::de::Error::custom(
            "expected an id, found a boolean",
        )),
    }
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => false,
        Some(Scalar::Bool(b)) => b,
        Some(Scalar::Number(n)) => n != 0,
        Some(Scalar::Text(s)) => !matches!(s.trim(), "" | "0" | "false"),
    })
}

/// Blocking drupal.org API client.
pub struct DrupalOrgClient {
    config: TrackerConfig,
    http: reqwest::blocking::Client,
}

impl DrupalOrgClient {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|error| TrackerError::Http {
                url: config.api_base_url.clone(),
                status: None,
                message: error.to_string(),
            })?;
        Ok(Self { config, http })
    }

    fn node_url(&self, issue: u64) -> String {
        format!("{}/node/{}.json", self.config.api_base_url, issue)
    }

    fn file_url(&self, file_id: u64) -> String {
        format!("{}/file/{}.json", self.config.api_base_url, file_id)
    }

    fn comment_link(&self, issue: u64, comment_id: Option<u64>) -> String {
        match comment_id {
            Some(cid) => format!("{}/node/{}#comment-{}", self.config.site_url, issue, cid),
            None => format!("{}/node/{}", self.config.site_url, issue),
        }
    }

    fn get(&self, url: &str, what: &str) -> Result<reqwest::blocking::Response> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).send().map_err(|error| TrackerError::Http {
            url: url.to_string(),
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TrackerError::NotFound {
                what: what.to_string(),
            });
        }
        if !status.is_success() {
            return Err(TrackerError::Http {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("server returned {}", status),
            });
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let body = self
            .get(url, what)?
            .text()
            .map_err(|error| TrackerError::InvalidResponse {
                url: url.to_string(),
                detail: error.to_string(),
            })?;
        serde_json::from_str(&body).map_err(|error| TrackerError::InvalidResponse {
            url: url.to_string(),
            detail: error.to_string(),
        })
    }

    fn node(&self, issue: u64) -> Result<NodeResponse> {
        self.get_json(&self.node_url(issue), &format!("issue {}", issue))
    }

    /// Join the node's file field with its comment list and the file
    /// entities. Positions follow the file field, one per file; the comment
    /// number is the comment's place in the comment list, 0 for files whose
    /// comment is not listed (the issue body).
    fn attachments_from(
        &self,
        issue: u64,
        node: &NodeResponse,
        mut fetch_file: impl FnMut(u64) -> Result<FileResponse>,
    ) -> Result<Vec<Attachment>> {
        let comment_numbers: HashMap<u64, u64> = node
            .comments
            .iter()
            .enumerate()
            .map(|(i, comment)| (comment.id, i as u64 + 1))
            .collect();

        let mut attachments = Vec::with_capacity(node.field_issue_files.len());
        for (position, item) in node.field_issue_files.iter().enumerate() {
            let file = fetch_file(item.file.id)?;
            let comment_number = item
                .file
                .cid
                .and_then(|cid| comment_numbers.get(&cid).copied())
                .unwrap_or(0);

            attachments.push(Attachment {
                file_id: item.file.id,
                comment_id: item.file.cid.unwrap_or(0),
                order_index: position as u64 + 1,
                comment_number,
                filename: file.name,
                file_url: file.url,
                comment_url: Some(self.comment_link(issue, item.file.cid)),
                displayable: item.display,
            });
        }
        Ok(attachments)
    }
}

impl IssueTracker for DrupalOrgClient {
    fn issue_title(&self, issue: u64) -> Result<String> {
        Ok(self.node(issue)?.title)
    }

    fn list_patch_attachments(&self, issue: u64) -> Result<Vec<Attachment>> {
        let node = self.node(issue)?;
        tracing::info!(
            "issue {}: {} file(s), {} comment(s)",
            issue,
            node.field_issue_files.len(),
            node.comments.len()
        );
        self.attachments_from(issue, &node, |fid| {
            self.get_json(&self.file_url(fid), &format!("file {}", fid))
        })
    }

    fn comment_count(&self, issue: u64) -> Result<u64> {
        Ok(self.node(issue)?.comments.len() as u64)
    }

    fn download(&self, file_url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .get(file_url, file_url)?
            .bytes()
            .map_err(|error| TrackerError::InvalidResponse {
                url: file_url.to_string(),
                detail: error.to_string(),
            })?;
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "drupal.org"
    }
}
