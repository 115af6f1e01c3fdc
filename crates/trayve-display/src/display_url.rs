//! Display URL resolver: pick the single image that represents a record.
//!
//! The first completed stage with a URL in the tier's fallback chain wins:
//!
//! - 4K tiers: face swap → 4K upscale → 2K upscale → try-on → fallback
//! - free/creator: 2K upscale → try-on → fallback
//!
//! The fallback is the source clothing image supplied by the caller, so a
//! fresh job shows the garment instead of a blank frame. Hidden stages,
//! stages the record marks `not_available`, and stages that have not
//! completed never contribute a URL, even when a stale snapshot still
//! carries one; the chain falls through to the previous successful stage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stage::{Stage, gated};
use crate::tier::Tier;
use crate::types::{MediaRecord, StageOutput};

const FOUR_K_CHAIN: [Stage; 4] = [
    Stage::FaceSwap,
    Stage::EnhancedUpscale,
    Stage::BasicUpscale,
    Stage::TryOn,
];

const TWO_K_CHAIN: [Stage; 2] = [Stage::BasicUpscale, Stage::TryOn];

/// Where the chosen display URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplaySource {
    /// Output of a pipeline stage.
    Stage(Stage),
    /// The caller's clothing image.
    Fallback,
    /// Nothing available, not even a fallback.
    Empty,
}

impl fmt::Display for DisplaySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stage(stage) => write!(f, "{stage}"),
            Self::Fallback => f.write_str("clothing image"),
            Self::Empty => f.write_str("none"),
        }
    }
}

/// The URL to display together with its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayChoice<'a> {
    pub source: DisplaySource,
    pub url: &'a str,
}

/// Stages to try, most advanced first.
#[must_use]
pub const fn fallback_chain(tier: Tier) -> &'static [Stage] {
    if tier.grants_4k() {
        &FOUR_K_CHAIN
    } else {
        &TWO_K_CHAIN
    }
}

fn stage_url(record: &MediaRecord, stage: Stage, tier: Tier) -> Option<&str> {
    match stage {
        Stage::TryOn => record.base_image_url(),
        _ => gated(record, stage, tier)
            .filter(|output| output.is_completed())
            .and_then(StageOutput::url),
    }
}

/// Resolve the display URL and report where it came from.
#[must_use]
pub fn resolve_display_choice<'a>(
    record: &'a MediaRecord,
    tier: Tier,
    fallback_clothing_image_url: &'a str,
) -> DisplayChoice<'a> {
    fallback_chain(tier)
        .iter()
        .find_map(|&stage| {
            stage_url(record, stage, tier).map(|url| DisplayChoice {
                source: DisplaySource::Stage(stage),
                url,
            })
        })
        .unwrap_or(if fallback_clothing_image_url.is_empty() {
            DisplayChoice {
                source: DisplaySource::Empty,
                url: "",
            }
        } else {
            DisplayChoice {
                source: DisplaySource::Fallback,
                url: fallback_clothing_image_url,
            }
        })
}

/// Resolve the URL to show as the current preview for `record`.
///
/// Returns an empty string only when no stage has produced output and
/// `fallback_clothing_image_url` is itself empty.
#[must_use]
pub fn resolve_display_url<'a>(
    record: &'a MediaRecord,
    tier: Tier,
    fallback_clothing_image_url: &'a str,
) -> &'a str {
    resolve_display_choice(record, tier, fallback_clothing_image_url).url
}
