//! Shared types for the trayve display resolver.
//!
//! Records arrive as camelCase JSON snapshots from the hosted database
//! and may be stale or partially populated. Deserialization therefore
//! never rejects a missing or `null` field: absent stage objects decode
//! to a pending stage, absent or blank URLs decode to `None`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::badge::FailedStagePolicy;
use crate::stage::Stage;

/// Processing status of a single pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Queued but not started.
    #[default]
    Pending,
    /// A worker is currently running this stage.
    Processing,
    /// Output is available.
    Completed,
    /// The worker gave up on this stage.
    Failed,
    /// The stage is not offered to the viewer's tier.
    #[serde(alias = "not-available")]
    NotAvailable,
}

impl StageStatus {
    /// Every status, for exhaustive test matrices.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Failed,
        Self::NotAvailable,
    ];

    /// Wire spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::NotAvailable => "not_available",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageStatus {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "not_available" | "not-available" => Ok(Self::NotAvailable),
            _ => Err(DisplayError::UnknownStatus(s.to_string())),
        }
    }
}

/// Output of one enhancement stage: an optional URL plus its status.
///
/// Upstream workers only set `url` once `status` reaches
/// [`StageStatus::Completed`], but snapshots are read as-is and the
/// resolvers check both fields where it matters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageOutput {
    /// Public URL of the stage output, if any.
    #[serde(
        default,
        deserialize_with = "blank_url_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,

    /// Current stage status.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: StageStatus,
}

impl StageOutput {
    /// A stage in the given status with no output URL.
    #[must_use]
    pub const fn with_status(status: StageStatus) -> Self {
        Self { url: None, status }
    }

    /// A completed stage whose output lives at `url`.
    #[must_use]
    pub fn completed(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            status: StageStatus::Completed,
        }
    }

    /// The output URL, treating empty and whitespace-only strings as absent.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, StageStatus::Completed)
    }

    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(self.status, StageStatus::Processing)
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.status, StageStatus::Failed)
    }

    /// `true` when the stage is completed *and* carries a usable URL.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.is_completed() && self.url().is_some()
    }
}

/// Snapshot of one generated image's progress through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    /// Opaque record identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Try-on output, present once the first stage completes.
    #[serde(
        default,
        deserialize_with = "blank_url_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_image_url: Option<String>,

    /// 2K upscale.
    #[serde(default, deserialize_with = "null_as_default")]
    pub basic_upscale: StageOutput,

    /// 4K upscale.
    #[serde(default, deserialize_with = "null_as_default")]
    pub enhanced_upscale: StageOutput,

    /// Face swap, the optional final 4K step.
    #[serde(default, deserialize_with = "null_as_default")]
    pub face_swap: StageOutput,

    /// One-shot background removal requested by the merchant.
    #[serde(default, deserialize_with = "null_as_default")]
    pub background_removal: StageOutput,
}

impl MediaRecord {
    /// An empty record for a freshly accepted generation job.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// The try-on output URL, treating blank strings as absent.
    #[must_use]
    pub fn base_image_url(&self) -> Option<&str> {
        self.base_image_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
    }

    /// Raw output of an enhancement stage.
    ///
    /// Returns `None` for [`Stage::TryOn`], whose only output is
    /// [`base_image_url`](Self::base_image_url).
    #[must_use]
    pub const fn stage(&self, stage: Stage) -> Option<&StageOutput> {
        match stage {
            Stage::TryOn => None,
            Stage::BasicUpscale => Some(&self.basic_upscale),
            Stage::EnhancedUpscale => Some(&self.enhanced_upscale),
            Stage::FaceSwap => Some(&self.face_swap),
            Stage::BackgroundRemoval => Some(&self.background_removal),
        }
    }
}

/// Configuration for the resolvers.
///
/// Every field has a default, so an empty JSON object is a valid
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How `failed` stage statuses surface in the badge.
    pub failed_stage_policy: FailedStagePolicy,
}

/// Errors raised when parsing resolver inputs at the system boundary.
///
/// The resolvers themselves are total and never fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    /// The subscription lookup returned a tier name we do not know.
    #[error("unknown subscription tier: {0:?}")]
    UnknownTier(String),

    /// A stage status string outside the known set.
    #[error("unknown stage status: {0:?}")]
    UnknownStatus(String),

    /// Resolver configuration could not be parsed.
    #[error("invalid resolver configuration: {0}")]
    InvalidConfig(String),
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_url_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let url = Option::<String>::deserialize(deserializer)?;
    Ok(url.filter(|u| !u.trim().is_empty()))
}
