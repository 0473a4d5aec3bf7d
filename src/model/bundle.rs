use serde::{Deserialize, Serialize};

/// The three kinds of bundle the backend knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleType {
    Dataset,
    Make,
    Run,
}

impl BundleType {
    pub const ALL: [BundleType; 3] = [BundleType::Dataset, BundleType::Make, BundleType::Run];

    pub fn as_str(self) -> &'static str {
        match self {
            BundleType::Dataset => "dataset",
            BundleType::Make => "make",
            BundleType::Run => "run",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dataset" | "upload" | "uploaded" => Some(BundleType::Dataset),
            "make" => Some(BundleType::Make),
            "run" => Some(BundleType::Run),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleState {
    Created,
    Uploading,
    Making,
    Staged,
    Starting,
    Preparing,
    Running,
    Finalizing,
    Ready,
    Failed,
    Killed,
    WorkerOffline,
}

impl BundleState {
    pub fn as_str(self) -> &'static str {
        match self {
            BundleState::Created => "created",
            BundleState::Uploading => "uploading",
            BundleState::Making => "making",
            BundleState::Staged => "staged",
            BundleState::Starting => "starting",
            BundleState::Preparing => "preparing",
            BundleState::Running => "running",
            BundleState::Finalizing => "finalizing",
            BundleState::Ready => "ready",
            BundleState::Failed => "failed",
            BundleState::Killed => "killed",
            BundleState::WorkerOffline => "worker_offline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let state = match s.trim() {
            "created" => BundleState::Created,
            "uploading" => BundleState::Uploading,
            "making" => BundleState::Making,
            "staged" => BundleState::Staged,
            "starting" => BundleState::Starting,
            "preparing" => BundleState::Preparing,
            "running" => BundleState::Running,
            "finalizing" => BundleState::Finalizing,
            "ready" => BundleState::Ready,
            "failed" => BundleState::Failed,
            "killed" => BundleState::Killed,
            "worker_offline" => BundleState::WorkerOffline,
            _ => return None,
        };
        Some(state)
    }

    /// Ready, failed and killed never change again.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            BundleState::Ready | BundleState::Failed | BundleState::Killed
        )
    }
}

/// Bundle metadata as embedded in worksheet blocks. Owned by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BundleInfo {
    pub uuid: String,
    pub bundle_type: String,
    pub state: String,

    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl BundleInfo {
    pub fn kind(&self) -> Option<BundleType> {
        BundleType::parse(&self.bundle_type)
    }

    pub fn state(&self) -> Option<BundleState> {
        BundleState::parse(&self.state)
    }

    pub fn name(&self) -> &str {
        self.metadata
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("<unnamed>")
    }

    pub fn short_uuid(&self) -> &str {
        let end = self
            .uuid
            .char_indices()
            .nth(10)
            .map(|(i, _)| i)
            .unwrap_or(self.uuid.len());
        &self.uuid[..end]
    }
}
