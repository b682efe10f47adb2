//! WCAG 2.1 relative luminance, contrast ratio and compliance tiers.
//!
//! See <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance> and
//! <https://www.w3.org/TR/WCAG21/#dfn-contrast-ratio>.

use std::fmt;

use crate::rgb::{parse_color, Backdrop, Rgb};
use crate::{AAA_THRESHOLD, AA_LARGE_THRESHOLD, AA_THRESHOLD, WORST_RATIO};

/// Compliance tier for a contrast ratio, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComplianceTier {
    /// ratio >= 7
    #[cfg_attr(feature = "serde", serde(rename = "AAA"))]
    Aaa,
    /// ratio >= 4.5
    #[cfg_attr(feature = "serde", serde(rename = "AA"))]
    Aa,
    /// ratio >= 3
    #[cfg_attr(feature = "serde", serde(rename = "AA Large"))]
    AaLarge,
    /// ratio < 3
    Fail,
}

impl ComplianceTier {
    /// Badge text shown next to a swatch.
    pub const fn label(self) -> &'static str {
        match self {
            ComplianceTier::Aaa => "AAA",
            ComplianceTier::Aa => "AA",
            ComplianceTier::AaLarge => "AA Large",
            ComplianceTier::Fail => "Fail",
        }
    }

    /// Lowest ratio that still lands in this tier.
    pub const fn min_ratio(self) -> f64 {
        match self {
            ComplianceTier::Aaa => AAA_THRESHOLD,
            ComplianceTier::Aa => AA_THRESHOLD,
            ComplianceTier::AaLarge => AA_LARGE_THRESHOLD,
            ComplianceTier::Fail => WORST_RATIO,
        }
    }

    /// Whether body text at this tier meets WCAG AA.
    pub const fn passes_normal_text(self) -> bool {
        matches!(self, ComplianceTier::Aaa | ComplianceTier::Aa)
    }

    /// Whether large text at this tier meets WCAG AA.
    pub const fn passes_large_text(self) -> bool {
        !matches!(self, ComplianceTier::Fail)
    }
}

impl fmt::Display for ComplianceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Linearize one gamma-encoded sRGB channel.
fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance in `[0, 1]`.
pub fn relative_luminance(rgb: Rgb) -> f64 {
    0.2126 * linearize(rgb.r) + 0.7152 * linearize(rgb.g) + 0.0722 * linearize(rgb.b)
}

/// Contrast ratio of two parsed colors, lighter over darker. Symmetric.
pub fn contrast_between(a: Rgb, b: Rgb) -> f64 {
    let (l1, l2) = (relative_luminance(a), relative_luminance(b));
    let (lighter, darker) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Contrast ratio between two color values, compositing against a light backdrop.
///
/// Never fails: an unparseable color yields `1.0` and a warning.
///
/// ```
/// use tokenscope_color::contrast_ratio;
///
/// assert!((contrast_ratio("#000", "#fff") - 21.0).abs() < 0.01);
/// assert_eq!(contrast_ratio("tomato", "#fff"), 1.0);
/// ```
pub fn contrast_ratio(fg: &str, bg: &str) -> f64 {
    contrast_ratio_on(fg, bg, Backdrop::Light)
}

/// Contrast ratio with an explicit compositing backdrop.
pub fn contrast_ratio_on(fg: &str, bg: &str, backdrop: Backdrop) -> f64 {
    let parsed = parse_color(fg, backdrop).and_then(|f| parse_color(bg, backdrop).map(|b| (f, b)));
    match parsed {
        Ok((f, b)) => contrast_between(f, b),
        Err(e) => {
            tracing::warn!(fg, bg, error = %e, "unparseable color, reporting worst contrast");
            WORST_RATIO
        }
    }
}

/// Map a ratio onto its compliance tier. Lower bounds are inclusive.
pub fn classify(ratio: f64) -> ComplianceTier {
    if ratio >= AAA_THRESHOLD {
        ComplianceTier::Aaa
    } else if ratio >= AA_THRESHOLD {
        ComplianceTier::Aa
    } else if ratio >= AA_LARGE_THRESHOLD {
        ComplianceTier::AaLarge
    } else {
        ComplianceTier::Fail
    }
}
