//! Pipeline stage identifiers and tier-gated stage views.
//!
//! Each [`Stage`] variant is one step of the enhancement pipeline. The
//! resolvers never read a record's stage fields directly; they go through
//! [`gated`] and [`effective_status`], which apply the tier capability
//! table so a stage hidden from the viewer reads as
//! [`StageStatus::NotAvailable`] regardless of the underlying data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tier::Tier;
use crate::types::{MediaRecord, StageOutput, StageStatus};

/// Identifier for a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Initial try-on generation.
    TryOn,
    /// 2K upscale.
    BasicUpscale,
    /// 4K upscale.
    EnhancedUpscale,
    /// Face swap on the 4K output.
    FaceSwap,
    /// Merchant-triggered background removal.
    BackgroundRemoval,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Self; 5] = [
        Self::TryOn,
        Self::BasicUpscale,
        Self::EnhancedUpscale,
        Self::FaceSwap,
        Self::BackgroundRemoval,
    ];

    /// Full display label for the stage.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TryOn => "Try-On",
            Self::BasicUpscale => "2K Upscale",
            Self::EnhancedUpscale => "4K Upscale",
            Self::FaceSwap => "Face Swap",
            Self::BackgroundRemoval => "Background Removal",
        }
    }

    /// Field name of the stage in the record wire format.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::TryOn => "baseImageUrl",
            Self::BasicUpscale => "basicUpscale",
            Self::EnhancedUpscale => "enhancedUpscale",
            Self::FaceSwap => "faceSwap",
            Self::BackgroundRemoval => "backgroundRemoval",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The record's output for `stage` as the viewer is allowed to see it.
///
/// Returns `None` when the tier cannot see the stage, when the record
/// itself marks it `not_available`, or for [`Stage::TryOn`].
#[must_use]
pub fn gated(record: &MediaRecord, stage: Stage, tier: Tier) -> Option<&StageOutput> {
    if !tier.can_view(stage) {
        return None;
    }
    record
        .stage(stage)
        .filter(|output| output.status != StageStatus::NotAvailable)
}

/// Status of `stage` as the viewer is allowed to see it.
///
/// Try-on has no status column; it reads as completed once the base image
/// exists and as processing before that, since the record is only
/// created after the generation job is accepted.
#[must_use]
pub fn effective_status(record: &MediaRecord, stage: Stage, tier: Tier) -> StageStatus {
    if stage == Stage::TryOn {
        return if record.base_image_url().is_some() {
            StageStatus::Completed
        } else {
            StageStatus::Processing
        };
    }
    gated(record, stage, tier).map_or(StageStatus::NotAvailable, |output| output.status)
}

/// One row of a per-stage progress listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    pub stage: Stage,
    pub status: StageStatus,
}

/// Effective status of every stage, in pipeline order.
#[must_use]
pub fn stage_progress(record: &MediaRecord, tier: Tier) -> [StageProgress; 5] {
    Stage::ALL.map(|stage| StageProgress {
        stage,
        status: effective_status(record, stage, tier),
    })
}
