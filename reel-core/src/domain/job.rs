//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Media processing job record
///
/// Persisted by the orchestrator's job store. Descriptive fields are fixed at
/// creation; only `status`, `result_location` and `updated_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub kind: JobKind,
    pub title: String,
    pub file_name: String,
    pub file_size: Option<String>,
    pub duration: Option<String>,
    pub status: JobStatus,
    pub result_location: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Job {
    /// Creates a new job in the `Pending` state
    pub fn new(id: Uuid, kind: JobKind, title: String, file_name: String) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            kind,
            title,
            file_name,
            file_size: None,
            duration: None,
            status: JobStatus::Pending,
            result_location: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a status transition in place
    ///
    /// Returns `false` (and leaves the job untouched) when the job is already
    /// terminal, the transition would move it backwards, or a completion
    /// carries no result location. The result location is only kept when the
    /// new status is `Completed`.
    pub fn transition(
        &mut self,
        status: JobStatus,
        result_location: Option<String>,
        at: chrono::DateTime<chrono::Utc>,
    ) -> bool {
        if !self.status.can_transition_to(status) {
            return false;
        }
        if status == JobStatus::Completed && result_location.is_none() {
            return false;
        }

        self.status = status;
        self.result_location = match status {
            JobStatus::Completed => result_location,
            _ => None,
        };
        self.updated_at = at;
        true
    }
}

/// Kind of media job, each backed by one job on the remote build server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Extract the background music / vocals from a video
    ExtractAudio,
    /// Produce a new video from a source video and an uploaded asset
    SynthesizeVideo,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::ExtractAudio => "extract-audio",
            JobKind::SynthesizeVideo => "synthesize-video",
        }
    }

    /// Title used when the caller does not provide one
    pub fn default_title(&self) -> &'static str {
        match self {
            JobKind::ExtractAudio => "Background music extraction",
            JobKind::SynthesizeVideo => "Video synthesis",
        }
    }

    /// Name of the artifact the job will produce
    pub fn artifact_file_name(&self, millis: i64) -> String {
        match self {
            JobKind::ExtractAudio => format!("background-music-{}.mp3", millis),
            JobKind::SynthesizeVideo => format!("synthesized-video-{}.mp4", millis),
        }
    }

    /// Parameters a submission of this kind must carry
    pub fn required_parameters(&self) -> &'static [&'static str] {
        match self {
            JobKind::ExtractAudio => &["videoUrl"],
            JobKind::SynthesizeVideo => &["videoUrl", "uploadedFileUrl"],
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extract-audio" => Ok(JobKind::ExtractAudio),
            "synthesize-video" => Ok(JobKind::SynthesizeVideo),
            other => Err(format!("unknown job kind: {}", other)),
        }
    }
}

/// Job lifecycle status
///
/// Transitions only move forward: `Pending -> Processing -> Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Processing => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Whether a job currently in `self` may move to `next`
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job::new(
            Uuid::new_v4(),
            JobKind::ExtractAudio,
            "Background music extraction".to_string(),
            "background-music-1.mp3".to_string(),
        )
    }

    #[test]
    fn test_new_job_is_pending() {
        let job = job();
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.result_location.is_none());
        assert_eq!(job.created_at, job.updated_at);
    }

    #[test]
    fn test_transition_forward() {
        let mut job = job();
        let later = job.created_at + chrono::Duration::seconds(5);

        assert!(job.transition(JobStatus::Processing, None, later));
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.updated_at, later);

        assert!(job.transition(
            JobStatus::Completed,
            Some("http://host/out.mp3".to_string()),
            later
        ));
        assert_eq!(job.result_location.as_deref(), Some("http://host/out.mp3"));
    }

    #[test]
    fn test_terminal_job_is_frozen() {
        let mut job = job();
        let now = chrono::Utc::now();
        assert!(job.transition(JobStatus::Failed, None, now));

        assert!(!job.transition(JobStatus::Processing, None, now));
        assert!(!job.transition(JobStatus::Completed, Some("x".to_string()), now));
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.result_location.is_none());
    }

    #[test]
    fn test_completion_requires_result_location() {
        let mut job = job();
        let now = chrono::Utc::now();
        assert!(job.transition(JobStatus::Processing, None, now));

        assert!(!job.transition(JobStatus::Completed, None, now));
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.result_location.is_none());
    }

    #[test]
    fn test_failed_transition_drops_result_location() {
        let mut job = job();
        let now = chrono::Utc::now();
        assert!(job.transition(JobStatus::Failed, Some("ignored".to_string()), now));
        assert!(job.result_location.is_none());
    }

    #[test]
    fn test_no_regression_to_pending() {
        assert!(!JobStatus::Processing.can_transition_to(JobStatus::Pending));
        assert!(!JobStatus::Processing.can_transition_to(JobStatus::Processing));
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Failed));
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in [
            JobStatus::Pending,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<JobStatus>(), Ok(status));
        }
        assert!("done".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&JobKind::SynthesizeVideo).unwrap();
        assert_eq!(json, "\"synthesize-video\"");
        assert_eq!(
            "extract-audio".parse::<JobKind>(),
            Ok(JobKind::ExtractAudio)
        );
    }

    #[test]
    fn test_artifact_file_names() {
        assert_eq!(
            JobKind::ExtractAudio.artifact_file_name(42),
            "background-music-42.mp3"
        );
        assert_eq!(
            JobKind::SynthesizeVideo.artifact_file_name(42),
            "synthesized-video-42.mp4"
        );
    }

    #[test]
    fn test_job_serializes_camel_case() {
        let value = serde_json::to_value(job()).unwrap();
        assert!(value.get("fileName").is_some());
        assert!(value.get("resultLocation").is_some());
        assert_eq!(value["status"], "pending");
    }
}
