//! Store for the analysis currently under review

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::models::analyses::{self, Analysis, Attachment, AttachmentInput};
use crate::models::status::{EventKind, StatusKind};
use crate::requests::Requests;

/// Holds the loaded analysis and applies server responses to it
pub struct AnalysisStore {
    requests: Arc<dyn Requests>,
    analysis: RwLock<Option<Analysis>>,
}

impl AnalysisStore {
    pub fn new(requests: Arc<dyn Requests>) -> Self {
        Self {
            requests,
            analysis: RwLock::new(None),
        }
    }

    /// Fetch an analysis and make it the one under review
    pub async fn load(&self, name: &str) -> Result<Analysis> {
        let analysis = analyses::by_name(self.requests.as_ref(), name)
            .await
            .with_context(|| format!("Failed to load analysis '{}'", name))?;

        let mut held = self.analysis.write().await;
        *held = Some(analysis.clone());
        info!("Loaded analysis '{}'", name);
        Ok(analysis)
    }

    /// The analysis under review, if one is loaded
    pub async fn analysis(&self) -> Option<Analysis> {
        self.analysis.read().await.clone()
    }

    /// Drop the loaded analysis
    pub async fn clear(&self) {
        let mut held = self.analysis.write().await;
        *held = None;
    }

    /// Review status of the loaded analysis
    pub async fn latest_status(&self) -> Option<StatusKind> {
        self.analysis
            .read()
            .await
            .as_ref()
            .map(Analysis::latest_status)
    }

    async fn loaded_name(&self) -> Result<String> {
        self.analysis
            .read()
            .await
            .as_ref()
            .map(|analysis| analysis.name.clone())
            .context("No analysis loaded")
    }

    /// Push a workflow event and replace held state with the updated document
    pub async fn push_event(&self, event: EventKind) -> Result<Analysis> {
        let name = self.loaded_name().await?;
        let updated = analyses::push_event(self.requests.as_ref(), &name, event)
            .await
            .with_context(|| format!("Failed to push '{}' onto analysis '{}'", event, name))?;

        let mut held = self.analysis.write().await;
        *held = Some(updated.clone());
        info!(
            "Analysis '{}' is now {}",
            name,
            updated.latest_status().display_name()
        );
        Ok(updated)
    }

    /// Attach supporting evidence to the loaded analysis
    pub async fn add_attachment(&self, input: &AttachmentInput) -> Result<Vec<Attachment>> {
        let name = self.loaded_name().await?;
        let attachments = analyses::attach(self.requests.as_ref(), &name, input)
            .await
            .with_context(|| format!("Failed to attach '{}' to analysis '{}'", input.name, name))?;
        self.replace_attachments(attachments.clone()).await;
        Ok(attachments)
    }

    /// Update an attachment on the loaded analysis
    pub async fn update_attachment(
        &self,
        attachment_id: Uuid,
        input: &AttachmentInput,
    ) -> Result<Vec<Attachment>> {
        let name = self.loaded_name().await?;
        let attachments =
            analyses::update_attachment(self.requests.as_ref(), &name, attachment_id, input)
                .await
                .with_context(|| {
                    format!("Failed to update attachment on analysis '{}'", name)
                })?;
        self.replace_attachments(attachments.clone()).await;
        Ok(attachments)
    }

    /// Remove an attachment from the loaded analysis
    pub async fn remove_attachment(&self, attachment_id: Uuid) -> Result<Vec<Attachment>> {
        let name = self.loaded_name().await?;
        let attachments =
            analyses::remove_attachment(self.requests.as_ref(), &name, attachment_id)
                .await
                .with_context(|| {
                    format!("Failed to remove attachment from analysis '{}'", name)
                })?;
        self.replace_attachments(attachments.clone()).await;
        Ok(attachments)
    }

    async fn replace_attachments(&self, attachments: Vec<Attachment>) {
        let mut held = self.analysis.write().await;
        if let Some(analysis) = held.as_mut() {
            analysis.attachments = attachments;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analyses::AttachmentKind;
    use crate::requests::testing::FakeRequests;
    use serde_json::json;

    fn store_with(fake: Arc<FakeRequests>) -> AnalysisStore {
        AnalysisStore::new(fake)
    }

    fn analysis_json() -> serde_json::Value {
        json!({
            "name": "CPAM0002",
            "timeline": [
                {"event": "create", "timestamp": "2024-05-01T09:00:00Z", "username": "vrr-prep"}
            ],
            "attachments": []
        })
    }

    #[tokio::test]
    async fn test_load_holds_the_analysis() {
        let fake = Arc::new(FakeRequests::new());
        fake.respond_with(analysis_json());
        let store = store_with(Arc::clone(&fake));

        store.load("CPAM0002").await.unwrap();
        assert_eq!(store.latest_status().await, Some(StatusKind::Preparation));
        assert_eq!(store.analysis().await.unwrap().name, "CPAM0002");
    }

    #[tokio::test]
    async fn test_push_event_requires_a_loaded_analysis() {
        let fake = Arc::new(FakeRequests::new());
        let store = store_with(fake);
        assert!(store.push_event(EventKind::Ready).await.is_err());
    }

    #[tokio::test]
    async fn test_push_event_replaces_held_state() {
        let fake = Arc::new(FakeRequests::new());
        fake.respond_with(analysis_json());
        fake.respond_with(json!({
            "name": "CPAM0002",
            "timeline": [
                {"event": "create", "timestamp": "2024-05-01T09:00:00Z", "username": "vrr-prep"},
                {"event": "ready", "timestamp": "2024-05-02T12:00:00Z", "username": "vrr-prep"}
            ]
        }));
        let store = store_with(Arc::clone(&fake));

        store.load("CPAM0002").await.unwrap();
        store.push_event(EventKind::Ready).await.unwrap();

        assert_eq!(store.latest_status().await, Some(StatusKind::Ready));
        assert_eq!(
            fake.calls()[1].path,
            "/rosalution/api/analysis/CPAM0002/event/ready"
        );
    }

    #[tokio::test]
    async fn test_add_attachment_updates_held_attachments() {
        let fake = Arc::new(FakeRequests::new());
        fake.respond_with(analysis_json());
        fake.respond_with(json!([{
            "attachment_id": "f4cb1eb0-87b9-4e55-a09d-6d0e7cf76b8a",
            "name": "OMIM",
            "type": "link",
            "data": "https://omim.org/entry/619968"
        }]));
        let store = store_with(Arc::clone(&fake));

        store.load("CPAM0002").await.unwrap();
        let input = AttachmentInput {
            name: "OMIM".to_string(),
            kind: AttachmentKind::Link,
            data: "https://omim.org/entry/619968".to_string(),
            comments: String::new(),
        };
        let attachments = store.add_attachment(&input).await.unwrap();

        assert_eq!(attachments.len(), 1);
        assert_eq!(store.analysis().await.unwrap().attachments.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_remove_attachment_replace_held_state() {
        let attachment_id = "f4cb1eb0-87b9-4e55-a09d-6d0e7cf76b8a";
        let fake = Arc::new(FakeRequests::new());
        fake.respond_with(analysis_json());
        fake.respond_with(json!([{
            "attachment_id": attachment_id,
            "name": "OMIM entry",
            "type": "link",
            "data": "https://omim.org/entry/619968",
            "comments": "Updated comment"
        }]));
        fake.respond_with(json!([]));
        let store = store_with(Arc::clone(&fake));

        store.load("CPAM0002").await.unwrap();

        let id = Uuid::parse_str(attachment_id).unwrap();
        let input = AttachmentInput {
            name: "OMIM entry".to_string(),
            kind: AttachmentKind::Link,
            data: "https://omim.org/entry/619968".to_string(),
            comments: "Updated comment".to_string(),
        };
        let updated = store.update_attachment(id, &input).await.unwrap();
        assert_eq!(updated[0].comments, "Updated comment");
        assert_eq!(store.analysis().await.unwrap().attachments.len(), 1);

        let remaining = store.remove_attachment(id).await.unwrap();
        assert!(remaining.is_empty());
        assert!(store.analysis().await.unwrap().attachments.is_empty());

        let calls = fake.calls();
        assert_eq!(calls[1].method, "PUT");
        assert_eq!(calls[2].method, "DELETE");
        assert!(calls[2].path.ends_with(attachment_id));
    }

    #[tokio::test]
    async fn test_clear_drops_the_analysis() {
        let fake = Arc::new(FakeRequests::new());
        fake.respond_with(analysis_json());
        let store = store_with(fake);

        store.load("CPAM0002").await.unwrap();
        store.clear().await;
        assert!(store.analysis().await.is_none());
        assert!(store.latest_status().await.is_none());
    }
}
