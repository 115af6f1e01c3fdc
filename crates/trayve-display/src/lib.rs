//! trayve-display: Tier-aware display resolution for try-on media (sans-IO).
//!
//! Turns a snapshot of a generated image's pipeline progress
//! (try-on -> 2K upscale -> 4K upscale -> face swap -> background removal)
//! plus the viewer's subscription tier into:
//!
//! - a single status badge ([`badge`]),
//! - the one image URL to preview ([`display_url`]),
//! - whether "Remove Background" and "Download" are enabled ([`actions`]).
//!
//! [`evaluate`] combines all three; [`DecisionReport`] adds the per-stage
//! view for tooling.
//!
//! Every function here is pure. Records are fetched and polled elsewhere;
//! this crate only reads the snapshot it is given, and a stale or partial
//! snapshot is never an error.

pub mod actions;
pub mod badge;
pub mod display_url;
pub mod report;
pub mod stage;
pub mod tier;
pub mod types;

pub use actions::{
    ActionState, RemoveBackgroundGate, can_download, can_remove_background, remove_background_gate,
};
pub use badge::{BadgeRule, BadgeStatus, FailedStagePolicy, resolve_badge, resolve_badge_traced};
pub use display_url::{DisplayChoice, DisplaySource, resolve_display_choice, resolve_display_url};
pub use report::DecisionReport;
pub use stage::{Stage, StageProgress, stage_progress};
pub use tier::{Tier, TierCapabilities, ViewerContext};
pub use types::{DisplayError, MediaRecord, ResolverConfig, StageOutput, StageStatus};

use serde::{Deserialize, Serialize};

/// Caller-supplied inputs that are not part of the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayRequest<'a> {
    /// Source garment image shown until the pipeline produces output.
    pub fallback_clothing_image_url: &'a str,
    /// A background-removal request for this record is in flight.
    pub is_removing_background: bool,
}

/// Everything a UI needs to render one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayDecision {
    pub badge: BadgeStatus,
    pub badge_rule: BadgeRule,
    pub display_url: String,
    pub display_source: DisplaySource,
    #[serde(rename = "actionsEnabled")]
    pub actions: ActionState,
}

/// Resolve the badge, preview URL and action state for one record.
///
/// This is a pure function of its inputs; calling it twice on the same
/// snapshot yields the same decision.
#[must_use]
pub fn evaluate(
    record: &MediaRecord,
    viewer: ViewerContext,
    request: &DisplayRequest<'_>,
    config: &ResolverConfig,
) -> DisplayDecision {
    let tier = viewer.tier;
    let (badge, badge_rule) = resolve_badge_traced(record, tier, config.failed_stage_policy);
    let choice = resolve_display_choice(record, tier, request.fallback_clothing_image_url);
    let actions = ActionState::resolve(record, tier, request.is_removing_background);

    tracing::trace!(
        record_id = %record.id,
        %tier,
        %badge,
        rule = badge_rule.priority(),
        source = %choice.source,
        "resolved display decision"
    );

    DisplayDecision {
        badge,
        badge_rule,
        display_url: choice.url.to_string(),
        display_source: choice.source,
        actions,
    }
}
