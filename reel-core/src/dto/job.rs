//! Job submission DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::job::{JobKind, JobStatus};

/// Request to submit a new media job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJob {
    pub kind: JobKind,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Caller-chosen id; generated when absent
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file_size: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

impl SubmitJob {
    pub fn new(kind: JobKind) -> Self {
        Self {
            kind,
            parameters: HashMap::new(),
            id: None,
            title: None,
            file_size: None,
            duration: None,
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Names of required parameters that are missing or blank
    pub fn missing_parameters(&self) -> Vec<&'static str> {
        self.kind
            .required_parameters()
            .iter()
            .copied()
            .filter(|name| {
                self.parameters
                    .get(*name)
                    .is_none_or(|value| value.trim().is_empty())
            })
            .collect()
    }
}

/// Acknowledgment returned as soon as the job record exists
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// Body of the background music extraction shortcut route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractMusicRequest {
    pub video_url: String,
}

impl From<ExtractMusicRequest> for SubmitJob {
    fn from(req: ExtractMusicRequest) -> Self {
        SubmitJob::new(JobKind::ExtractAudio).with_parameter("videoUrl", req.video_url)
    }
}

/// Body of the video synthesis shortcut route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeVideoRequest {
    pub video_url: String,
    pub uploaded_file_url: String,
}

impl From<SynthesizeVideoRequest> for SubmitJob {
    fn from(req: SynthesizeVideoRequest) -> Self {
        SubmitJob::new(JobKind::SynthesizeVideo)
            .with_parameter("videoUrl", req.video_url)
            .with_parameter("uploadedFileUrl", req.uploaded_file_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameters() {
        let req = SubmitJob::new(JobKind::SynthesizeVideo).with_parameter("videoUrl", "http://v");
        assert_eq!(req.missing_parameters(), vec!["uploadedFileUrl"]);

        let blank = SubmitJob::new(JobKind::ExtractAudio).with_parameter("videoUrl", "  ");
        assert_eq!(blank.missing_parameters(), vec!["videoUrl"]);
    }

    #[test]
    fn test_shortcut_requests_convert() {
        let req: SubmitJob = SynthesizeVideoRequest {
            video_url: "http://v".to_string(),
            uploaded_file_url: "ftp://u".to_string(),
        }
        .into();
        assert_eq!(req.kind, JobKind::SynthesizeVideo);
        assert!(req.missing_parameters().is_empty());
    }

    #[test]
    fn test_submit_job_defaults_when_deserialized() {
        let req: SubmitJob =
            serde_json::from_str(r#"{"kind":"extract-audio","parameters":{"videoUrl":"x"}}"#)
                .unwrap();
        assert_eq!(req.kind, JobKind::ExtractAudio);
        assert!(req.id.is_none());
        assert!(req.title.is_none());
    }
}
