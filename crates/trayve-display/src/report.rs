//! Decision reports: a decision bundled with the inputs that explain it.
//!
//! A [`DecisionReport`] carries the record id, the viewer's tier, the
//! resolved [`DisplayDecision`] and the effective per-stage statuses the
//! resolvers saw. It serializes to JSON for tooling and renders a plain
//! text report for humans.

use serde::{Deserialize, Serialize};

use crate::stage::{StageProgress, stage_progress};
use crate::tier::{Tier, ViewerContext};
use crate::types::{MediaRecord, ResolverConfig};
use crate::{DisplayDecision, DisplayRequest, evaluate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionReport {
    pub record_id: String,
    pub tier: Tier,
    pub decision: DisplayDecision,
    pub stages: Vec<StageProgress>,
}

impl DecisionReport {
    /// Evaluate `record` for `viewer` and capture the stage view used.
    #[must_use]
    pub fn new(
        record: &MediaRecord,
        viewer: ViewerContext,
        request: &DisplayRequest<'_>,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            record_id: record.id.clone(),
            tier: viewer.tier,
            decision: evaluate(record, viewer, request, config),
            stages: stage_progress(record, viewer.tier).to_vec(),
        }
    }

    /// Format a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();
        let id = if self.record_id.is_empty() {
            "<no id>"
        } else {
            self.record_id.as_str()
        };
        let decision = &self.decision;

        lines.push(format!("Record {id} as {}\n{}", self.tier, "=".repeat(60)));
        lines.push(format!(
            "{:<20} {} [{}]",
            "Badge",
            decision.badge.label(),
            decision.badge_rule,
        ));
        let url = if decision.display_url.is_empty() {
            "-"
        } else {
            decision.display_url.as_str()
        };
        lines.push(format!(
            "{:<20} {url} ({})",
            "Display", decision.display_source
        ));
        lines.push(format!(
            "{:<20} {}",
            "Download",
            enabled(decision.actions.download)
        ));
        let gate = decision.actions.remove_background_gate;
        lines.push(format!(
            "{:<20} {} ({gate})",
            "Remove background",
            enabled(decision.actions.remove_background),
        ));
        let click = if gate.invokes_removal() {
            "start removal"
        } else if gate.is_enabled() {
            "upgrade prompt"
        } else {
            "-"
        };
        lines.push(format!("{:<20} {click}", "Click action"));
        lines.push(String::new());

        lines.push(format!("{:<20} {:<20} {}", "Stage", "Field", "Status"));
        lines.push("-".repeat(60));
        for progress in &self.stages {
            lines.push(format!(
                "{:<20} {:<20} {}",
                progress.stage.label(),
                progress.stage.key(),
                progress.status
            ));
        }

        lines.join("\n")
    }
}

const fn enabled(flag: bool) -> &'static str {
    if flag { "enabled" } else { "disabled" }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{StageOutput, StageStatus};

    fn professional_report() -> DecisionReport {
        let record = MediaRecord {
            base_image_url: Some("https://cdn/base.png".to_string()),
            basic_upscale: StageOutput::completed("https://cdn/2k.png"),
            enhanced_upscale: StageOutput::with_status(StageStatus::Processing),
            ..MediaRecord::new("gen_7")
        };
        DecisionReport::new(
            &record,
            ViewerContext::new(Tier::Professional),
            &DisplayRequest {
                fallback_clothing_image_url: "https://cdn/garment.png",
                is_removing_background: false,
            },
            &ResolverConfig::default(),
        )
    }

    #[test]
    fn report_lists_decision_and_every_stage() {
        let text = professional_report().report();
        assert!(text.starts_with("Record gen_7 as professional"));
        assert!(text.contains("4K Processing [rule 4 (4K upscale processing)]"));
        assert!(text.contains("https://cdn/2k.png (2K Upscale)"));
        for label in ["Try-On", "2K Upscale", "4K Upscale", "Face Swap", "Background Removal"] {
            assert!(text.contains(label), "missing stage {label}");
        }
        assert!(text.contains("enabled (ready)"));
        assert!(text.contains("start removal"));
        assert!(!text.contains("Ready"));
    }

    #[test]
    fn report_rows_show_record_field_names() {
        let text = professional_report().report();
        let row = text
            .lines()
            .find(|line| line.starts_with("4K Upscale"))
            .unwrap();
        assert!(row.contains("enhancedUpscale"), "{row}");
        assert!(row.ends_with("processing"), "{row}");
        assert!(text.contains("baseImageUrl"));
    }

    #[test]
    fn report_distinguishes_upgrade_prompt_from_disabled() {
        let record = MediaRecord {
            basic_upscale: StageOutput::completed("b"),
            ..MediaRecord::default()
        };
        let free = DecisionReport::new(
            &record,
            ViewerContext::new(Tier::Free),
            &DisplayRequest::default(),
            &ResolverConfig::default(),
        )
        .report();
        assert!(free.contains("enabled (upgrade required)"));
        assert!(free.contains("upgrade prompt"));

        let removing = DecisionReport::new(
            &record,
            ViewerContext::new(Tier::Creator),
            &DisplayRequest {
                fallback_clothing_image_url: "",
                is_removing_background: true,
            },
            &ResolverConfig::default(),
        )
        .report();
        assert!(removing.contains("disabled (removal in flight)"));
        let click = removing
            .lines()
            .find(|line| line.starts_with("Click action"))
            .unwrap();
        assert!(click.trim_end().ends_with('-'), "{click}");
    }

    #[test]
    fn report_marks_missing_id_and_url() {
        let report = DecisionReport::new(
            &MediaRecord::default(),
            ViewerContext::new(Tier::Free),
            &DisplayRequest::default(),
            &ResolverConfig::default(),
        );
        let text = report.report();
        assert!(text.starts_with("Record <no id> as free"));
        assert!(text.contains("- (none)"));
    }

    #[test]
    fn report_serializes_camel_case() {
        let json = serde_json::to_value(professional_report()).unwrap();
        assert_eq!(json["recordId"], "gen_7");
        assert_eq!(json["tier"], "professional");
        assert_eq!(json["decision"]["badge"], "4k-processing");
        assert_eq!(json["stages"][1]["stage"], "basicUpscale");
        assert_eq!(json["stages"][1]["status"], "completed");
    }
}
