//! Download address resolution for finished jobs.
//!
//! The resolver only computes where an artifact can be fetched; opening
//! the address is left to the caller (browser link, `curl`, ...).

use reqwest::Url;

use jobtrack_core::artifact::{artifact_filename, is_absolute_url, ArtifactKind};
use jobtrack_core::job_status::{JobState, JobStatus};

use crate::api::{parse_base_url, JobApiError};

/// A resolved, fetchable artifact address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLink {
    pub url: String,
    /// Filename for display.
    pub filename: String,
    /// `None` for absolute URLs whose extension is not recognised.
    pub kind: Option<ArtifactKind>,
}

/// Outcome of resolving a snapshot's artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactResolution {
    /// The job is not in the `done` state.
    NotReady,
    /// `done`, but the backend reported no usable artifact path.
    Unavailable,
    Ready(ArtifactLink),
}

impl ArtifactResolution {
    pub fn link(&self) -> Option<&ArtifactLink> {
        match self {
            ArtifactResolution::Ready(link) => Some(link),
            _ => None,
        }
    }
}

/// Maps artifact paths onto the backend's download routes.
#[derive(Debug, Clone)]
pub struct ArtifactResolver {
    base_url: Url,
}

impl ArtifactResolver {
    /// * `api_url` - Backend base URL, e.g. `http://host:8000`.
    pub fn new(api_url: &str) -> Result<Self, JobApiError> {
        Ok(Self {
            base_url: parse_base_url(api_url)?,
        })
    }

    pub fn from_base(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Resolve the artifact of a snapshot. Only `done` snapshots resolve.
    pub fn resolve(&self, status: &JobStatus) -> ArtifactResolution {
        if status.state != JobState::Done {
            return ArtifactResolution::NotReady;
        }
        match status.artifact_path.as_deref() {
            Some(path) => self.resolve_path(path),
            None => ArtifactResolution::Unavailable,
        }
    }

    /// Resolve a raw artifact path regardless of job state.
    ///
    /// Absolute HTTP(S) URLs pass through unchanged. Anything else is
    /// reduced to its filename and routed to `/pdf/download/{name}` or
    /// `/csv/download/{name}` by extension.
    pub fn resolve_path(&self, path: &str) -> ArtifactResolution {
        let path = path.trim();

        if is_absolute_url(path) {
            let filename = Url::parse(path)
                .ok()
                .and_then(|url| {
                    url.path_segments()
                        .and_then(|mut segments| segments.next_back().map(str::to_string))
                })
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| path.to_string());
            let kind = ArtifactKind::from_filename(&filename);
            return ArtifactResolution::Ready(ArtifactLink {
                url: path.to_string(),
                filename,
                kind,
            });
        }

        let Some(filename) = artifact_filename(path) else {
            tracing::warn!(path, "Artifact path has no filename");
            return ArtifactResolution::Unavailable;
        };

        let kind = ArtifactKind::for_download(filename);
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([kind.download_category(), "download", filename]);
        }

        ArtifactResolution::Ready(ArtifactLink {
            url: url.to_string(),
            filename: filename.to_string(),
            kind: Some(kind),
        })
    }
}
