//! Action gate: whether "Remove Background" and "Download" are enabled.
//!
//! Background removal is a one-shot action. The caller tracks whether a
//! removal request is in flight and passes it in; at most one request
//! per record may be outstanding.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stage::{Stage, effective_status, gated};
use crate::tier::Tier;
use crate::types::{MediaRecord, StageOutput, StageStatus};

/// Outcome of the background-removal gate.
///
/// [`UpgradeRequired`](Self::UpgradeRequired) is clickable but routes to
/// the upgrade prompt instead of starting a removal; it is not the same
/// as disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveBackgroundGate {
    /// The background has already been removed.
    AlreadyRemoved,
    /// A removal request for this record is in flight.
    InFlight,
    /// No upscaled output exists yet to remove the background from.
    AwaitingUpscale,
    /// Free tier: the button opens the upgrade prompt.
    UpgradeRequired,
    /// Clicking starts a removal.
    Ready,
}

impl RemoveBackgroundGate {
    /// `true` if the button is clickable.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::UpgradeRequired | Self::Ready)
    }

    /// `true` if clicking actually invokes background removal.
    #[must_use]
    pub const fn invokes_removal(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Human-readable label for reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AlreadyRemoved => "already removed",
            Self::InFlight => "removal in flight",
            Self::AwaitingUpscale => "awaiting upscale",
            Self::UpgradeRequired => "upgrade required",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for RemoveBackgroundGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn completed(record: &MediaRecord, stage: Stage, tier: Tier) -> bool {
    gated(record, stage, tier).is_some_and(StageOutput::is_completed)
}

/// Evaluate the background-removal gate.
#[must_use]
pub fn remove_background_gate(
    record: &MediaRecord,
    tier: Tier,
    is_removing_now: bool,
) -> RemoveBackgroundGate {
    if record.background_removal.url().is_some() {
        return RemoveBackgroundGate::AlreadyRemoved;
    }
    if is_removing_now {
        return RemoveBackgroundGate::InFlight;
    }

    let basic_done = completed(record, Stage::BasicUpscale, tier);
    let upscaled = match tier {
        Tier::Free => return RemoveBackgroundGate::UpgradeRequired,
        Tier::Creator => basic_done,
        // 2K is accepted as a fallback so a stalled 4K stage never blocks
        // the action indefinitely.
        Tier::Professional | Tier::Enterprise => {
            completed(record, Stage::EnhancedUpscale, tier)
                || completed(record, Stage::FaceSwap, tier)
                || basic_done
        }
    };

    if upscaled {
        RemoveBackgroundGate::Ready
    } else {
        RemoveBackgroundGate::AwaitingUpscale
    }
}

/// `true` if the "Remove Background" button is clickable.
#[must_use]
pub fn can_remove_background(record: &MediaRecord, tier: Tier, is_removing_now: bool) -> bool {
    remove_background_gate(record, tier, is_removing_now).is_enabled()
}

/// `true` unless the tier's final entitled stage is still processing.
#[must_use]
pub fn can_download(record: &MediaRecord, tier: Tier) -> bool {
    effective_status(record, tier.final_stage(), tier) != StageStatus::Processing
}

/// Enabled state of the record's actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionState {
    pub download: bool,
    pub remove_background: bool,
    pub remove_background_gate: RemoveBackgroundGate,
}

impl ActionState {
    #[must_use]
    pub fn resolve(record: &MediaRecord, tier: Tier, is_removing_now: bool) -> Self {
        let gate = remove_background_gate(record, tier, is_removing_now);
        Self {
            download: can_download(record, tier),
            remove_background: gate.is_enabled(),
            remove_background_gate: gate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_k_ready() -> MediaRecord {
        MediaRecord {
            basic_upscale: StageOutput::completed("b"),
            ..MediaRecord::default()
        }
    }

    #[test]
    fn free_tier_routes_to_upgrade_prompt() {
        let gate = remove_background_gate(&two_k_ready(), Tier::Free, false);
        assert_eq!(gate, RemoveBackgroundGate::UpgradeRequired);
        assert!(gate.is_enabled());
        assert!(!gate.invokes_removal());
        assert!(can_remove_background(&two_k_ready(), Tier::Free, false));
    }

    #[test]
    fn free_tier_upgrade_prompt_before_any_output() {
        assert!(can_remove_background(&MediaRecord::default(), Tier::Free, false));
    }

    #[test]
    fn already_removed_disables_every_tier() {
        let record = MediaRecord {
            background_removal: StageOutput::completed("nobg"),
            ..two_k_ready()
        };
        for tier in Tier::ALL {
            assert_eq!(
                remove_background_gate(&record, tier, false),
                RemoveBackgroundGate::AlreadyRemoved
            );
        }
    }

    #[test]
    fn in_flight_disables_every_tier() {
        for tier in Tier::ALL {
            assert!(!can_remove_background(&two_k_ready(), tier, true));
        }
    }

    #[test]
    fn creator_waits_for_two_k() {
        let record = MediaRecord {
            basic_upscale: StageOutput::with_status(StageStatus::Processing),
            ..MediaRecord::default()
        };
        assert_eq!(
            remove_background_gate(&record, Tier::Creator, false),
            RemoveBackgroundGate::AwaitingUpscale
        );
        assert_eq!(
            remove_background_gate(&two_k_ready(), Tier::Creator, false),
            RemoveBackgroundGate::Ready
        );
    }

    #[test]
    fn creator_ignores_hidden_four_k_completion() {
        let record = MediaRecord {
            enhanced_upscale: StageOutput::completed("d"),
            ..MediaRecord::default()
        };
        assert!(!can_remove_background(&record, Tier::Creator, false));
    }

    #[test]
    fn professional_accepts_any_upscale() {
        let enhanced_only = MediaRecord {
            enhanced_upscale: StageOutput::completed("d"),
            ..MediaRecord::default()
        };
        let face_swap_only = MediaRecord {
            face_swap: StageOutput::completed("c"),
            ..MediaRecord::default()
        };
        for tier in [Tier::Professional, Tier::Enterprise] {
            assert!(can_remove_background(&enhanced_only, tier, false));
            assert!(can_remove_background(&face_swap_only, tier, false));
            assert!(can_remove_background(&two_k_ready(), tier, false));
            assert!(!can_remove_background(&MediaRecord::default(), tier, false));
        }
    }

    #[test]
    fn download_blocked_while_final_stage_processing() {
        let record = MediaRecord {
            basic_upscale: StageOutput::with_status(StageStatus::Processing),
            ..MediaRecord::default()
        };
        assert!(!can_download(&record, Tier::Free));
        // For 4K tiers the final stage is face swap, which is pending here.
        assert!(can_download(&record, Tier::Professional));

        let finalizing = MediaRecord {
            face_swap: StageOutput::with_status(StageStatus::Processing),
            ..two_k_ready()
        };
        assert!(!can_download(&finalizing, Tier::Enterprise));
        // Hidden from creator, so it cannot block the download.
        assert!(can_download(&finalizing, Tier::Creator));
    }

    #[test]
    fn action_state_serializes_camel_case() {
        let state = ActionState::resolve(&two_k_ready(), Tier::Free, false);
        let json = serde_json::to_value(state).unwrap_or_default();
        assert_eq!(json["download"], true);
        assert_eq!(json["removeBackground"], true);
        assert_eq!(json["removeBackgroundGate"], "upgrade_required");
    }

    #[test]
    fn gate_labels_are_distinct() {
        let gates = [
            RemoveBackgroundGate::AlreadyRemoved,
            RemoveBackgroundGate::InFlight,
            RemoveBackgroundGate::AwaitingUpscale,
            RemoveBackgroundGate::UpgradeRequired,
            RemoveBackgroundGate::Ready,
        ];
        for (i, a) in gates.iter().enumerate() {
            assert_eq!(a.to_string(), a.label());
            for b in &gates[i + 1..] {
                assert_ne!(a.label(), b.label());
            }
        }
        assert_eq!(RemoveBackgroundGate::UpgradeRequired.to_string(), "upgrade required");
    }
}
