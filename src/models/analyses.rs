//! Analysis records and their REST operations
//!
//! An analysis is one genomics case: sections of curated fields, genomic
//! units under review, supporting evidence attachments, and the timeline of
//! workflow events that determines its review status.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::status::{EventKind, StatusKind};
use crate::requests::{RequestError, RequestResult, Requests};

const ANALYSIS_ROOT: &str = "/rosalution/api/analysis";

/// Kind of supporting evidence attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    File,
    Link,
}

impl AttachmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::File => "file",
            AttachmentKind::Link => "link",
        }
    }
}

/// Supporting evidence attached to an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub attachment_id: Option<Uuid>,

    pub name: String,

    #[serde(rename = "type")]
    pub kind: AttachmentKind,

    /// File location or URL, depending on the attachment kind
    #[serde(default)]
    pub data: String,

    #[serde(default)]
    pub comments: String,
}

/// Field values collected by the attachment forms before submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentInput {
    pub name: String,
    pub kind: AttachmentKind,
    pub data: String,
    pub comments: String,
}

impl Default for AttachmentInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: AttachmentKind::File,
            data: String::new(),
            comments: String::new(),
        }
    }
}

impl From<Attachment> for AttachmentInput {
    fn from(attachment: Attachment) -> Self {
        Self {
            name: attachment.name,
            kind: attachment.kind,
            data: attachment.data,
            comments: attachment.comments,
        }
    }
}

/// A gene and the variants nominated under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomicUnit {
    #[serde(default)]
    pub gene: Option<String>,

    #[serde(default)]
    pub variants: Vec<String>,
}

/// One field of a curated section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub field: String,

    #[serde(default)]
    pub value: Vec<String>,
}

/// A curated section of the analysis, e.g. "Brief" or "Clinical History"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub header: String,

    #[serde(default)]
    pub content: Vec<Field>,
}

/// One workflow event on the analysis timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub event: EventKind,
    pub timestamp: DateTime<Utc>,
    pub username: String,
}

/// Listing form of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub nominated_by: String,

    #[serde(default)]
    pub latest_status: Option<StatusKind>,

    #[serde(default)]
    pub created_date: String,

    #[serde(default)]
    pub last_modified_date: String,

    #[serde(default)]
    pub genomic_units: Vec<GenomicUnit>,
}

/// Full analysis document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub nominated_by: String,

    #[serde(default)]
    pub sections: Vec<Section>,

    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,

    #[serde(default)]
    pub attachments: Vec<Attachment>,

    #[serde(default)]
    pub genomic_units: Vec<GenomicUnit>,
}

impl Analysis {
    /// Review status derived from the newest timeline event.
    /// An analysis with an empty timeline is still in preparation.
    pub fn latest_status(&self) -> StatusKind {
        self.timeline
            .last()
            .map(|entry| entry.event.resulting_status())
            .unwrap_or(StatusKind::Preparation)
    }
}

fn decode<T: DeserializeOwned>(value: Value, context: &str) -> RequestResult<T> {
    serde_json::from_value(value).map_err(|source| RequestError::Decode {
        url: context.to_string(),
        source,
    })
}

fn attachment_fields(input: &AttachmentInput) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    fields.insert("name".to_string(), input.name.clone());
    fields.insert("comments".to_string(), input.comments.clone());
    match input.kind {
        AttachmentKind::File => fields.insert("upload_file".to_string(), input.data.clone()),
        AttachmentKind::Link => fields.insert("link".to_string(), input.data.clone()),
    };
    fields
}

/// Fetch the listing of all analyses
pub async fn all(requests: &dyn Requests) -> RequestResult<Vec<AnalysisSummary>> {
    let value = requests.get(ANALYSIS_ROOT).await?;
    decode(value, ANALYSIS_ROOT)
}

/// Fetch the listing form of one analysis
pub async fn summary_by_name(
    requests: &dyn Requests,
    name: &str,
) -> RequestResult<AnalysisSummary> {
    let path = format!("{}/summary/{}", ANALYSIS_ROOT, name);
    let value = requests.get(&path).await?;
    decode(value, &path)
}

/// Fetch a full analysis document
pub async fn by_name(requests: &dyn Requests, name: &str) -> RequestResult<Analysis> {
    let path = format!("{}/{}", ANALYSIS_ROOT, name);
    let value = requests.get(&path).await?;
    decode(value, &path)
}

/// Push a workflow event onto an analysis; returns the updated document
pub async fn push_event(
    requests: &dyn Requests,
    name: &str,
    event: EventKind,
) -> RequestResult<Analysis> {
    let path = format!("{}/{}/event/{}", ANALYSIS_ROOT, name, event.as_str());
    let value = requests.put_form(&path, HashMap::new()).await?;
    decode(value, &path)
}

/// Attach supporting evidence; returns the updated attachment list
pub async fn attach(
    requests: &dyn Requests,
    name: &str,
    input: &AttachmentInput,
) -> RequestResult<Vec<Attachment>> {
    let path = format!("{}/{}/attachment", ANALYSIS_ROOT, name);
    let value = requests.post_form(&path, attachment_fields(input)).await?;
    decode(value, &path)
}

/// Update an existing attachment; returns the updated attachment list
pub async fn update_attachment(
    requests: &dyn Requests,
    name: &str,
    attachment_id: Uuid,
    input: &AttachmentInput,
) -> RequestResult<Vec<Attachment>> {
    let path = format!("{}/{}/attachment/{}", ANALYSIS_ROOT, name, attachment_id);
    let value = requests.put_form(&path, attachment_fields(input)).await?;
    decode(value, &path)
}

/// Remove an attachment; returns the remaining attachment list
pub async fn remove_attachment(
    requests: &dyn Requests,
    name: &str,
    attachment_id: Uuid,
) -> RequestResult<Vec<Attachment>> {
    let path = format!("{}/{}/attachment/{}", ANALYSIS_ROOT, name, attachment_id);
    let value = requests.delete(&path).await?;
    decode(value, &path)
}

/// Import a new analysis from an exported Phenotips JSON document
pub async fn import_file(
    requests: &dyn Requests,
    file_name: &str,
    contents: &str,
) -> RequestResult<Analysis> {
    let path = format!("{}/import_file", ANALYSIS_ROOT);
    let mut fields = HashMap::new();
    fields.insert("name".to_string(), file_name.to_string());
    fields.insert("phenotips_file".to_string(), contents.to_string());
    let value = requests.post_form(&path, fields).await?;
    decode(value, &path)
}
