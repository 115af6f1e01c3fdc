//! Status resolver: collapse a record's stage statuses into one badge.
//!
//! Rules are evaluated in strict priority order and the first match wins:
//!
//! 1. 4K tier, face swap completed with a URL → [`BadgeStatus::FourKReady`]
//! 2. 4K tier, face swap processing → [`BadgeStatus::Finalizing`]
//! 3. 4K tier, 4K upscale completed with a URL → [`BadgeStatus::FourKReady`]
//! 4. 4K tier, 4K upscale processing → [`BadgeStatus::FourKProcessing`]
//! 5. 4K tier, 2K upscale completed → [`BadgeStatus::FourKProcessing`]
//! 6. 2K upscale completed with a URL → [`BadgeStatus::TwoKReady`]
//! 7. otherwise → [`BadgeStatus::Processing`]
//!
//! The order is load-bearing. A 4K-entitled viewer whose 2K output is
//! ready but whose 4K output is still pending sees `4k-processing`, never
//! `2k-ready`, so the badge does not imply the pipeline has finished.
//!
//! Stage completions may arrive in any order; every rule reads the
//! snapshot independently, so a face swap reported before the 4K upscale
//! still resolves through rule 1.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stage::{Stage, gated};
use crate::tier::Tier;
use crate::types::{MediaRecord, StageOutput};

/// Summary label shown for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BadgeStatus {
    /// Nothing displayable beyond the try-on output yet.
    #[serde(rename = "processing")]
    Processing,
    /// 2K output is ready and is the final stage for this tier.
    #[serde(rename = "2k-ready")]
    TwoKReady,
    /// 4K enhancement is underway (or still queued behind a ready 2K).
    #[serde(rename = "4k-processing")]
    FourKProcessing,
    /// Face swap, the last 4K step, is running.
    #[serde(rename = "finalizing")]
    Finalizing,
    /// The final entitled 4K output is ready.
    #[serde(rename = "4k-ready")]
    FourKReady,
    /// The stage the badge is waiting on has failed.
    ///
    /// Only produced under [`FailedStagePolicy::Stalled`].
    #[serde(rename = "stalled")]
    Stalled,
}

impl BadgeStatus {
    /// All badges, including [`Stalled`](Self::Stalled).
    pub const ALL: [Self; 6] = [
        Self::Processing,
        Self::TwoKReady,
        Self::FourKProcessing,
        Self::Finalizing,
        Self::FourKReady,
        Self::Stalled,
    ];

    /// Wire label, e.g. `"2k-ready"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::TwoKReady => "2k-ready",
            Self::FourKProcessing => "4k-processing",
            Self::Finalizing => "finalizing",
            Self::FourKReady => "4k-ready",
            Self::Stalled => "stalled",
        }
    }

    /// Human-facing badge text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::TwoKReady => "2K Ready",
            Self::FourKProcessing => "4K Processing",
            Self::Finalizing => "Finalizing",
            Self::FourKReady => "4K Ready",
            Self::Stalled => "Stalled",
        }
    }

    /// `true` for badges that mean the viewer's pipeline is done.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::TwoKReady | Self::FourKReady)
    }
}

impl fmt::Display for BadgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How `failed` stage statuses affect the badge.
///
/// The display URL and action gates ignore this setting; a failed stage
/// never contributes a URL and never counts as completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStagePolicy {
    /// `failed` reads as "not completed" and the badge falls through to
    /// the next lower stage.
    #[default]
    Degrade,
    /// When the badge would report progress on a stage that has failed,
    /// report [`BadgeStatus::Stalled`] instead.
    Stalled,
}

/// The rule that produced a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeRule {
    FaceSwapReady,
    FaceSwapInFlight,
    EnhancedUpscaleReady,
    EnhancedUpscaleInFlight,
    AwaitingEnhancedUpscale,
    BasicUpscaleReady,
    NothingReady,
    /// Rule 5 under [`FailedStagePolicy::Stalled`] with the 4K upscale failed.
    EnhancedUpscaleFailed,
    /// Rule 7 under [`FailedStagePolicy::Stalled`] with the 2K upscale failed.
    BasicUpscaleFailed,
}

impl BadgeRule {
    /// Priority position of the rule (1 is checked first).
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::FaceSwapReady => 1,
            Self::FaceSwapInFlight => 2,
            Self::EnhancedUpscaleReady => 3,
            Self::EnhancedUpscaleInFlight => 4,
            Self::AwaitingEnhancedUpscale | Self::EnhancedUpscaleFailed => 5,
            Self::BasicUpscaleReady => 6,
            Self::NothingReady | Self::BasicUpscaleFailed => 7,
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::FaceSwapReady => "face swap completed",
            Self::FaceSwapInFlight => "face swap processing",
            Self::EnhancedUpscaleReady => "4K upscale completed",
            Self::EnhancedUpscaleInFlight => "4K upscale processing",
            Self::AwaitingEnhancedUpscale => "2K ready, 4K upscale pending",
            Self::BasicUpscaleReady => "2K upscale completed",
            Self::NothingReady => "no entitled stage ready",
            Self::EnhancedUpscaleFailed => "2K ready, 4K upscale failed",
            Self::BasicUpscaleFailed => "2K upscale failed",
        }
    }
}

impl fmt::Display for BadgeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {} ({})", self.priority(), self.description())
    }
}

/// Resolve the badge for `record` as seen by `tier`, treating failed
/// stages as not completed.
#[must_use]
pub fn resolve_badge(record: &MediaRecord, tier: Tier) -> BadgeStatus {
    resolve_badge_traced(record, tier, FailedStagePolicy::Degrade).0
}

/// Resolve the badge and report which rule fired.
#[must_use]
pub fn resolve_badge_traced(
    record: &MediaRecord,
    tier: Tier,
    policy: FailedStagePolicy,
) -> (BadgeStatus, BadgeRule) {
    let basic = gated(record, Stage::BasicUpscale, tier);

    if tier.grants_4k() {
        let face_swap = gated(record, Stage::FaceSwap, tier);
        let enhanced = gated(record, Stage::EnhancedUpscale, tier);

        if face_swap.is_some_and(StageOutput::is_ready) {
            return (BadgeStatus::FourKReady, BadgeRule::FaceSwapReady);
        }
        if face_swap.is_some_and(StageOutput::is_processing) {
            return (BadgeStatus::Finalizing, BadgeRule::FaceSwapInFlight);
        }
        if enhanced.is_some_and(StageOutput::is_ready) {
            return (BadgeStatus::FourKReady, BadgeRule::EnhancedUpscaleReady);
        }
        if enhanced.is_some_and(StageOutput::is_processing) {
            return (
                BadgeStatus::FourKProcessing,
                BadgeRule::EnhancedUpscaleInFlight,
            );
        }
        if basic.is_some_and(StageOutput::is_completed) {
            if policy == FailedStagePolicy::Stalled && enhanced.is_some_and(StageOutput::is_failed)
            {
                return (BadgeStatus::Stalled, BadgeRule::EnhancedUpscaleFailed);
            }
            return (
                BadgeStatus::FourKProcessing,
                BadgeRule::AwaitingEnhancedUpscale,
            );
        }
    }

    if basic.is_some_and(StageOutput::is_ready) {
        return (BadgeStatus::TwoKReady, BadgeRule::BasicUpscaleReady);
    }

    if policy == FailedStagePolicy::Stalled && basic.is_some_and(StageOutput::is_failed) {
        return (BadgeStatus::Stalled, BadgeRule::BasicUpscaleFailed);
    }
    (BadgeStatus::Processing, BadgeRule::NothingReady)
}
