//! Typed design-token tables.
//!
//! Core palettes are fixed per brand. The semantic layer is resolved from the
//! palettes for a color mode. Everything here is read-only lookup data: the
//! cascade graph takes its node colors from a [`TokenSet`] but never writes
//! back into it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokenscope_color::{Backdrop, ContrastPairing};

use crate::error::{Error, Result};

/// Light or dark presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Light surfaces, dark text
    #[default]
    Light,
    /// Dark surfaces, light text
    Dark,
}

impl ColorMode {
    /// Backdrop to composite translucent tokens against in this mode.
    pub const fn backdrop(self) -> Backdrop {
        match self {
            ColorMode::Light => Backdrop::Light,
            ColorMode::Dark => Backdrop::Dark,
        }
    }
}

impl FromStr for ColorMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ColorMode::Light),
            "dark" => Ok(ColorMode::Dark),
            other => Err(Error::InvalidTheme(format!("color mode {other:?}"))),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        })
    }
}

/// Brand palette selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    /// Cool indigo brand
    #[default]
    Indigo,
    /// Warm orange brand
    Ember,
}

impl FromStr for Brand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indigo" => Ok(Brand::Indigo),
            "ember" => Ok(Brand::Ember),
            other => Err(Error::InvalidTheme(format!("brand {other:?}"))),
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Brand::Indigo => "indigo",
            Brand::Ember => "ember",
        })
    }
}

/// Brand color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrandScale {
    pub s100: &'static str,
    pub s300: &'static str,
    pub s500: &'static str,
    pub s700: &'static str,
}

impl BrandScale {
    /// Ramp for a brand.
    pub const fn of(brand: Brand) -> Self {
        match brand {
            Brand::Indigo => Self {
                s100: "#e0e7ff",
                s300: "#a5b4fc",
                s500: "#6366f1",
                s700: "#4338ca",
            },
            Brand::Ember => Self {
                s100: "#ffedd5",
                s300: "#fdba74",
                s500: "#f97316",
                s700: "#c2410c",
            },
        }
    }
}

/// Neutral gray ramp, shared by all brands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NeutralScale {
    pub n0: &'static str,
    pub n100: &'static str,
    pub n700: &'static str,
    pub n900: &'static str,
}

impl NeutralScale {
    pub const DEFAULT: Self = Self {
        n0: "#ffffff",
        n100: "#f1f5f9",
        n700: "#334155",
        n900: "#0f172a",
    };
}

/// Status colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusColors {
    pub success: &'static str,
    pub error: &'static str,
}

impl StatusColors {
    pub const DEFAULT: Self = Self {
        success: "#16a34a",
        error: "#dc2626",
    };
}

/// Raw palette tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorePalette {
    pub brand: BrandScale,
    pub neutral: NeutralScale,
    pub status: StatusColors,
}

impl CorePalette {
    /// Palette for a brand.
    pub const fn for_brand(brand: Brand) -> Self {
        Self {
            brand: BrandScale::of(brand),
            neutral: NeutralScale::DEFAULT,
            status: StatusColors::DEFAULT,
        }
    }
}

/// Semantic aliases resolved for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SemanticColors {
    pub primary: &'static str,
    pub primary_hover: &'static str,
    pub focus_ring: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub text_muted: &'static str,
    pub border: &'static str,
    pub success: &'static str,
    pub error: &'static str,
}

impl SemanticColors {
    /// Resolve the aliases from a palette.
    pub const fn resolve(palette: &CorePalette, mode: ColorMode) -> Self {
        let brand = palette.brand;
        let neutral = palette.neutral;
        match mode {
            ColorMode::Light => Self {
                primary: brand.s500,
                primary_hover: brand.s700,
                focus_ring: brand.s300,
                surface: neutral.n0,
                text: neutral.n900,
                text_muted: "rgba(15, 23, 42, 0.6)",
                border: neutral.n100,
                success: palette.status.success,
                error: palette.status.error,
            },
            ColorMode::Dark => Self {
                primary: brand.s300,
                primary_hover: brand.s100,
                focus_ring: brand.s500,
                surface: neutral.n900,
                text: neutral.n100,
                text_muted: "rgba(241, 245, 249, 0.6)",
                border: neutral.n700,
                success: palette.status.success,
                error: palette.status.error,
            },
        }
    }
}

/// The active token set: palette plus resolved semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenSet {
    pub mode: ColorMode,
    pub brand: Brand,
    pub core: CorePalette,
    pub semantic: SemanticColors,
}

impl Default for TokenSet {
    fn default() -> Self {
        Self::resolve(ColorMode::default(), Brand::default())
    }
}

impl TokenSet {
    /// Resolve the full token set for a mode and brand.
    pub const fn resolve(mode: ColorMode, brand: Brand) -> Self {
        let core = CorePalette::for_brand(brand);
        Self {
            mode,
            brand,
            core,
            semantic: SemanticColors::resolve(&core, mode),
        }
    }

    /// Every token as a `(key, value)` pair, in table order.
    pub fn entries(&self) -> Vec<(&'static str, &'static str)> {
        let b = &self.core.brand;
        let n = &self.core.neutral;
        let s = &self.semantic;
        vec![
            ("brand.100", b.s100),
            ("brand.300", b.s300),
            ("brand.500", b.s500),
            ("brand.700", b.s700),
            ("neutral.0", n.n0),
            ("neutral.100", n.n100),
            ("neutral.700", n.n700),
            ("neutral.900", n.n900),
            ("status.success", self.core.status.success),
            ("status.error", self.core.status.error),
            ("semantic.primary", s.primary),
            ("semantic.primaryHover", s.primary_hover),
            ("semantic.focusRing", s.focus_ring),
            ("semantic.surface", s.surface),
            ("semantic.text", s.text),
            ("semantic.textMuted", s.text_muted),
            ("semantic.border", s.border),
            ("semantic.success", s.success),
            ("semantic.error", s.error),
        ]
    }

    /// Look up one token by key, e.g. `"brand.300"`.
    pub fn get(&self, key: &str) -> Result<&'static str> {
        self.entries()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
            .ok_or_else(|| Error::UnknownToken(key.to_string()))
    }

    /// Backdrop for compositing translucent tokens of this set.
    pub const fn backdrop(&self) -> Backdrop {
        self.mode.backdrop()
    }

    /// Foreground/background samples shown in the pairing view.
    pub fn pairings(&self) -> Vec<ContrastPairing> {
        let s = &self.semantic;
        vec![
            ContrastPairing::new("Text on Surface", s.text, s.surface),
            ContrastPairing::new("Muted Text on Surface", s.text_muted, s.surface),
            ContrastPairing::new("Primary on Surface", s.primary, s.surface),
            ContrastPairing::new("Surface on Primary", s.surface, s.primary),
            ContrastPairing::new("Surface on Primary Hover", s.surface, s.primary_hover),
            ContrastPairing::new("Border on Surface", s.border, s.surface),
            ContrastPairing::new("Success on Surface", s.success, s.surface),
            ContrastPairing::new("Error on Surface", s.error, s.surface),
        ]
    }
}
