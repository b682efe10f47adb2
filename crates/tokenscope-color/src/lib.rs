//! Tokenscope Color
//!
//! Color parsing and WCAG 2.1 contrast classification for design-token swatches.
//!
//! # Color Encodings
//!
//! Two encodings are understood:
//! - `#RGB` / `#RRGGBB` hex
//! - `rgb(r, g, b)` / `rgba(r, g, b, a)` with integer channels and a 0–1 alpha
//!
//! Translucent colors are collapsed against an assumed solid [`Backdrop`]
//! before any luminance math happens. This is an approximation: real layered
//! rendering would composite against whatever actually sits underneath.
//!
//! # Contrast
//!
//! The contrast ratio of two colors is `(L1 + 0.05) / (L2 + 0.05)` where
//! `L1 >= L2` are their relative luminances, so it always lies in `[1, 21]`.
//! A ratio maps onto a [`ComplianceTier`] through the fixed thresholds 7, 4.5
//! and 3.

mod contrast;
mod pairing;
mod rgb;

pub use contrast::{classify, contrast_between, contrast_ratio, contrast_ratio_on, relative_luminance, ComplianceTier};
pub use pairing::{assess, assess_all, ContrastPairing, PairingReport};
pub use rgb::{parse_color, Backdrop, ColorParseError, Rgb};

/// Minimum ratio for AAA body text.
pub const AAA_THRESHOLD: f64 = 7.0;

/// Minimum ratio for AA body text.
pub const AA_THRESHOLD: f64 = 4.5;

/// Minimum ratio for AA large text (18pt, or 14pt bold).
pub const AA_LARGE_THRESHOLD: f64 = 3.0;

/// Worst possible contrast ratio, used when a color cannot be parsed.
pub const WORST_RATIO: f64 = 1.0;

/// Best possible contrast ratio (black on white).
pub const BEST_RATIO: f64 = 21.0;

const _: () = assert!(AAA_THRESHOLD > AA_THRESHOLD && AA_THRESHOLD > AA_LARGE_THRESHOLD);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_ordered() {
        assert!(WORST_RATIO < AA_LARGE_THRESHOLD);
        assert!(AA_LARGE_THRESHOLD < AA_THRESHOLD);
        assert!(AA_THRESHOLD < AAA_THRESHOLD);
        assert!(AAA_THRESHOLD < BEST_RATIO);
    }

    #[test]
    fn black_on_white_is_best_ratio() {
        let ratio = contrast_ratio("#000000", "#FFFFFF");
        assert!((ratio - BEST_RATIO).abs() < 0.01);
        assert_eq!(classify(ratio), ComplianceTier::Aaa);
    }
}
