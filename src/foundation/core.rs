use crate::foundation::error::{FilmrollError, FilmrollResult};

pub use kurbo::{Affine, Vec2};

/// 0-based slot index into a frame sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u32);

impl FrameIndex {
    /// Round a fractional frame position to the nearest slot in `[0, count - 1]`.
    ///
    /// Any input maps to a valid slot: negative, NaN and oversized positions clamp to the
    /// nearest boundary. `count == 0` yields slot 0.
    pub fn clamp_position(position: f64, count: u32) -> Self {
        let last = count.saturating_sub(1);
        if position.is_nan() {
            return Self(0);
        }
        let rounded = position.round();
        if rounded <= 0.0 {
            Self(0)
        } else if rounded >= f64::from(last) {
            Self(last)
        } else {
            Self(rounded as u32)
        }
    }

    /// The 1-based number used in asset file names.
    pub fn ordinal(self) -> u32 {
        self.0.saturating_add(1)
    }

    /// Slot index as `usize` for buffer addressing.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Coarse device width class; drives asset convention and fit strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportClass {
    /// Narrow (mobile) viewport.
    Compact,
    /// Desktop-sized viewport.
    Wide,
}

impl ViewportClass {
    /// `width < breakpoint` is compact, everything else is wide.
    pub fn classify(width: f64, breakpoint: f64) -> Self {
        if width < breakpoint {
            Self::Compact
        } else {
            Self::Wide
        }
    }

    /// Lowercase name used in logs and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Wide => "wide",
        }
    }
}

impl std::fmt::Display for ViewportClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas backing store dimensions in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BackingSize {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

impl BackingSize {
    /// Return `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Host viewport: CSS pixel size plus device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
    /// Device pixels per CSS pixel.
    pub dpr: f64,
}

impl Viewport {
    /// Create a validated viewport.
    ///
    /// A non-positive or non-finite `dpr` means the host did not report one and falls back
    /// to `1.0`.
    pub fn new(width: f64, height: f64, dpr: f64) -> FilmrollResult<Self> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(FilmrollError::validation(format!(
                "viewport size must be finite and non-negative, got {width}x{height}"
            )));
        }
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Ok(Self { width, height, dpr })
    }

    /// Required canvas resolution: CSS size times device pixel ratio, rounded.
    pub fn backing_size(self) -> BackingSize {
        BackingSize {
            width: (self.width * self.dpr).round().max(0.0) as u32,
            height: (self.height * self.dpr).round().max(0.0) as u32,
        }
    }

    /// Classify against `breakpoint` (CSS pixels).
    pub fn class(self, breakpoint: f64) -> ViewportClass {
        ViewportClass::classify(self.width, breakpoint)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
