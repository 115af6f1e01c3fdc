//! Subscription tiers and the stage capability table.
//!
//! | Tier         | 2K Upscale | 4K Upscale + Face Swap |
//! |--------------|------------|------------------------|
//! | free         | yes        | no                     |
//! | creator      | yes        | no                     |
//! | professional | yes        | yes                    |
//! | enterprise   | yes        | yes                    |
//!
//! Try-on and background removal are visible to every tier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::stage::Stage;
use crate::types::DisplayError;

/// Subscription level of the viewing merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Creator,
    Professional,
    Enterprise,
}

/// Which gated stages a tier may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierCapabilities {
    /// 2K upscale is visible.
    pub basic_upscale: bool,
    /// 4K upscale and face swap are visible.
    pub enhanced_stages: bool,
}

impl Tier {
    /// All tiers from lowest to highest.
    pub const ALL: [Self; 4] = [
        Self::Free,
        Self::Creator,
        Self::Professional,
        Self::Enterprise,
    ];

    /// Wire spelling of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Creator => "creator",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
        }
    }

    /// Row of the capability table for this tier.
    #[must_use]
    pub const fn capabilities(self) -> TierCapabilities {
        match self {
            Self::Free | Self::Creator => TierCapabilities {
                basic_upscale: true,
                enhanced_stages: false,
            },
            Self::Professional | Self::Enterprise => TierCapabilities {
                basic_upscale: true,
                enhanced_stages: true,
            },
        }
    }

    /// `true` if 4K upscale and face swap are part of this tier's pipeline.
    #[must_use]
    pub const fn grants_4k(self) -> bool {
        self.capabilities().enhanced_stages
    }

    #[must_use]
    pub const fn can_view(self, stage: Stage) -> bool {
        let caps = self.capabilities();
        match stage {
            Stage::TryOn | Stage::BackgroundRemoval => true,
            Stage::BasicUpscale => caps.basic_upscale,
            Stage::EnhancedUpscale | Stage::FaceSwap => caps.enhanced_stages,
        }
    }

    /// The last pipeline stage this tier is entitled to.
    #[must_use]
    pub const fn final_stage(self) -> Stage {
        if self.grants_4k() {
            Stage::FaceSwap
        } else {
            Stage::BasicUpscale
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = DisplayError;

    /// Parses the tier name returned by the subscription lookup,
    /// ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "creator" => Ok(Self::Creator),
            "professional" => Ok(Self::Professional),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(DisplayError::UnknownTier(s.to_string())),
        }
    }
}

/// Per-request viewer information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerContext {
    pub tier: Tier,
}

impl ViewerContext {
    #[must_use]
    pub const fn new(tier: Tier) -> Self {
        Self { tier }
    }
}
