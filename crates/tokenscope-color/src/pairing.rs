//! Foreground/background pairing reports for swatch annotations.

use crate::contrast::{classify, contrast_between, ComplianceTier};
use crate::rgb::{parse_color, Backdrop};
use crate::WORST_RATIO;

/// A foreground drawn on a background, as shown in a swatch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContrastPairing {
    /// Human-readable name, e.g. "Text on Surface"
    pub label: String,
    /// Foreground color value
    pub foreground: String,
    /// Background color value
    pub background: String,
}

impl ContrastPairing {
    /// Create a pairing.
    pub fn new(label: impl Into<String>, foreground: impl Into<String>, background: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            foreground: foreground.into(),
            background: background.into(),
        }
    }
}

/// Ratio and badge for one pairing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairingReport {
    /// Pairing name
    pub label: String,
    /// Foreground color value as given
    pub foreground: String,
    /// Background color value as given
    pub background: String,
    /// WCAG contrast ratio
    pub ratio: f64,
    /// Compliance badge
    pub tier: ComplianceTier,
    /// False when either color failed to parse
    pub valid: bool,
}

impl PairingReport {
    /// Ratio formatted for display, e.g. `4.54:1`.
    pub fn display_ratio(&self) -> String {
        format!("{:.2}:1", self.ratio)
    }
}

/// Compute the report for a single pairing.
pub fn assess(pairing: &ContrastPairing, backdrop: Backdrop) -> PairingReport {
    let parsed = parse_color(&pairing.foreground, backdrop)
        .and_then(|fg| parse_color(&pairing.background, backdrop).map(|bg| (fg, bg)));

    let (ratio, valid) = match parsed {
        Ok((fg, bg)) => (contrast_between(fg, bg), true),
        Err(e) => {
            tracing::warn!(label = %pairing.label, error = %e, "pairing has an unparseable color");
            (WORST_RATIO, false)
        }
    };

    PairingReport {
        label: pairing.label.clone(),
        foreground: pairing.foreground.clone(),
        background: pairing.background.clone(),
        ratio,
        tier: classify(ratio),
        valid,
    }
}

/// Compute reports for a batch of pairings, preserving order.
pub fn assess_all(pairings: &[ContrastPairing], backdrop: Backdrop) -> Vec<PairingReport> {
    pairings.iter().map(|p| assess(p, backdrop)).collect()
}
