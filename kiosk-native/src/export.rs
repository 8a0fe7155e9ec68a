//! Strip export: PNG data URI encoding and the export request state.
//!
//! Requests follow a last-request-wins policy. Each request takes a new
//! ticket and supersedes the previous one; results for superseded tickets
//! are dropped. Nothing is cancelled, only ignored.

use std::io::Cursor;
use std::sync::Arc;

use base64::Engine as _;
use image::{ImageFormat, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("Failed to encode strip: {0}")]
    Encode(String),
    #[error("Failed to render strip: {0}")]
    Render(String),
    #[error("Export task failed: {0}")]
    Task(String),
}

/// Identifies one export request
pub type ExportTicket = u64;

/// The shareable encoding of a rendered strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub ticket: ExportTicket,
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Idle,
    InProgress { ticket: ExportTicket },
    Ready(ExportArtifact),
    Failed { ticket: ExportTicket, message: String },
}

#[derive(Debug, Clone)]
pub struct ExportState {
    status: ExportStatus,
    next_ticket: ExportTicket,
}

impl Default for ExportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportState {
    pub fn new() -> Self {
        Self {
            status: ExportStatus::Idle,
            next_ticket: 1,
        }
    }

    pub fn status(&self) -> &ExportStatus {
        &self.status
    }

    pub fn in_progress(&self) -> bool {
        matches!(self.status, ExportStatus::InProgress { .. })
    }

    pub fn artifact(&self) -> Option<&ExportArtifact> {
        match &self.status {
            ExportStatus::Ready(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.status {
            ExportStatus::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Start a new request, superseding any request still in flight
    pub fn begin(&mut self) -> ExportTicket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        if let ExportStatus::InProgress { ticket: previous } = self.status {
            log::debug!("Export {} superseded by {}", previous, ticket);
        }
        self.status = ExportStatus::InProgress { ticket };
        ticket
    }

    fn is_current(&self, ticket: ExportTicket) -> bool {
        matches!(self.status, ExportStatus::InProgress { ticket: current } if current == ticket)
    }

    /// Record a finished export. Returns false if the ticket was superseded.
    pub fn complete(&mut self, artifact: ExportArtifact) -> bool {
        if !self.is_current(artifact.ticket) {
            log::debug!("Dropping stale export {}", artifact.ticket);
            return false;
        }
        log::info!(
            "Export {} ready ({}x{}, {} bytes)",
            artifact.ticket,
            artifact.width,
            artifact.height,
            artifact.data_uri.len()
        );
        self.status = ExportStatus::Ready(artifact);
        true
    }

    /// Record a failed export. Returns false if the ticket was superseded.
    pub fn fail(&mut self, ticket: ExportTicket, error: &ExportError) -> bool {
        if !self.is_current(ticket) {
            log::debug!("Dropping stale export failure {}", ticket);
            return false;
        }
        log::error!("Export {} failed: {}", ticket, error);
        self.status = ExportStatus::Failed {
            ticket,
            message: error.to_string(),
        };
        true
    }

    /// Forget the artifact and any request in flight
    pub fn invalidate(&mut self) {
        self.status = ExportStatus::Idle;
    }
}

/// Encode an image as a `data:image/png;base64,` URI
pub fn encode_data_uri(image: &RgbaImage) -> Result<String, ExportError> {
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png.get_ref());
    Ok(format!("data:image/png;base64,{}", encoded))
}

/// Encode `strip` off the calling thread
pub async fn export_strip(
    ticket: ExportTicket,
    strip: Arc<RgbaImage>,
) -> Result<ExportArtifact, ExportError> {
    let (width, height) = strip.dimensions();
    let data_uri = tokio::task::spawn_blocking(move || encode_data_uri(&strip))
        .await
        .map_err(|e| ExportError::Task(e.to_string()))??;
    Ok(ExportArtifact {
        ticket,
        data_uri,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(ticket: ExportTicket) -> ExportArtifact {
        ExportArtifact {
            ticket,
            data_uri: format!("data:image/png;base64,{}", ticket),
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_single_request() {
        let mut state = ExportState::new();
        assert!(!state.in_progress());
        assert!(state.artifact().is_none());

        let ticket = state.begin();
        assert!(state.in_progress());
        assert!(state.complete(artifact(ticket)));
        assert!(!state.in_progress());
        assert_eq!(state.artifact().unwrap().ticket, ticket);
    }

    #[test]
    fn test_last_request_wins() {
        let mut state = ExportState::new();
        let first = state.begin();
        let second = state.begin();
        assert_ne!(first, second);
        assert!(state.in_progress());

        // Earlier request resolves late and is dropped
        assert!(!state.complete(artifact(first)));
        assert!(state.in_progress());
        assert!(state.artifact().is_none());

        assert!(state.complete(artifact(second)));
        assert!(!state.in_progress());
        assert_eq!(state.artifact().unwrap().ticket, second);

        // Resolving out of order the other way round gives the same result
        let mut state = ExportState::new();
        let first = state.begin();
        let second = state.begin();
        assert!(state.complete(artifact(second)));
        assert!(!state.complete(artifact(first)));
        assert_eq!(state.artifact().unwrap().ticket, second);
    }

    #[test]
    fn test_failure_is_explicit() {
        let mut state = ExportState::new();
        let ticket = state.begin();
        assert!(state.fail(ticket, &ExportError::Encode("disk on fire".into())));
        assert!(!state.in_progress());
        assert!(state.failure().unwrap().contains("disk on fire"));

        // A retry clears the failure
        let retry = state.begin();
        assert!(state.failure().is_none());
        assert!(state.complete(artifact(retry)));
    }

    #[test]
    fn test_stale_failure_ignored() {
        let mut state = ExportState::new();
        let first = state.begin();
        let second = state.begin();
        assert!(!state.fail(first, &ExportError::Task("cancelled".into())));
        assert_eq!(state.status(), &ExportStatus::InProgress { ticket: second });
    }

    #[test]
    fn test_invalidate_drops_inflight() {
        let mut state = ExportState::new();
        let ticket = state.begin();
        state.invalidate();
        assert!(!state.in_progress());
        assert!(!state.complete(artifact(ticket)));
        assert!(state.artifact().is_none());
    }

    #[test]
    fn test_data_uri_decodes_to_png() {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        let uri = encode_data_uri(&img).unwrap();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = base64::engine::general_purpose::STANDARD.decode(payload).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded, img);
    }

    #[tokio::test]
    async fn test_export_strip_async() {
        let img = Arc::new(RgbaImage::from_pixel(8, 4, image::Rgba([0, 0, 0, 255])));
        let artifact = export_strip(7, img).await.unwrap();
        assert_eq!(artifact.ticket, 7);
        assert_eq!((artifact.width, artifact.height), (8, 4));
        assert!(artifact.data_uri.starts_with("data:image/png;base64,"));
    }
}
