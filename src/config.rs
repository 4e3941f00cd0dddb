use std::path::Path;

use anyhow::Context as _;

use crate::{
    animation::{ramp::Ramp, spring::SpringParams},
    assets::convention::ConventionTable,
    foundation::error::{FilmrollError, FilmrollResult},
};

/// File names carry a 3-digit ordinal, so at most 999 frames are addressable.
pub const MAX_FRAME_COUNT: u32 = 999;

/// A text overlay whose presentation is a pure function of scroll progress.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayConfig {
    /// Stable identifier the host uses to find its markup.
    pub id: String,
    /// Scroll progress -> opacity.
    pub opacity: Ramp,
    /// Scroll progress -> uniform scale; `None` keeps scale 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Ramp>,
}

/// Everything that parameterizes a reel. All fields default to the landing page values.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Number of frames N in each sequence.
    pub frame_count: u32,
    /// Viewports narrower than this (CSS px) are compact.
    pub breakpoint_px: f64,
    /// Asset folder/extension per viewport class.
    pub conventions: ConventionTable,
    /// Smoothing applied to the frame position.
    pub spring: SpringParams,
    /// Fraction of canvas width used by a compact-viewport frame.
    pub compact_margin: f64,
    /// Scroll progress range over which the canvas fades from 1 to 0.
    pub fade_out: [f64; 2],
    /// Text overlays faded in and out along the scroll.
    pub overlays: Vec<OverlayConfig>,
    /// Page color behind the canvas (straight RGBA8).
    pub background_rgba: [u8; 4],
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            frame_count: 240,
            breakpoint_px: 768.0,
            conventions: ConventionTable::default(),
            spring: SpringParams::default(),
            compact_margin: 0.85,
            fade_out: [0.9, 1.0],
            overlays: default_overlays(),
            background_rgba: [5, 5, 5, 255],
        }
    }
}

fn default_overlays() -> Vec<OverlayConfig> {
    vec![
        OverlayConfig {
            id: "hero".to_string(),
            opacity: Ramp::linear(0.0, 0.15, 1.0, 0.0),
            scale: Some(Ramp::linear(0.0, 0.15, 1.0, 0.9)),
        },
        OverlayConfig {
            id: "detail-sole".to_string(),
            opacity: Ramp {
                input: vec![0.25, 0.35, 0.45],
                output: vec![0.0, 1.0, 0.0],
            },
            scale: None,
        },
        OverlayConfig {
            id: "detail-core".to_string(),
            opacity: Ramp {
                input: vec![0.55, 0.65, 0.75],
                output: vec![0.0, 1.0, 0.0],
            },
            scale: None,
        },
        OverlayConfig {
            id: "cta".to_string(),
            opacity: Ramp::linear(0.85, 0.95, 0.0, 1.0),
            scale: None,
        },
    ]
}

impl ReelConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> FilmrollResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| FilmrollError::serde(format!("parse reel config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: &Path) -> FilmrollResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read reel config '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> FilmrollResult<()> {
        if self.frame_count == 0 || self.frame_count > MAX_FRAME_COUNT {
            return Err(FilmrollError::validation(format!(
                "frame_count must be in 1..={MAX_FRAME_COUNT}, got {}",
                self.frame_count
            )));
        }
        if !self.breakpoint_px.is_finite() || self.breakpoint_px <= 0.0 {
            return Err(FilmrollError::validation("breakpoint_px must be > 0"));
        }
        self.conventions.validate()?;
        self.spring.validate()?;
        if !(self.compact_margin > 0.0 && self.compact_margin <= 1.0) {
            return Err(FilmrollError::validation("compact_margin must be in (0, 1]"));
        }
        let [start, end] = self.fade_out;
        if !(start.is_finite() && end.is_finite() && start < end) {
            return Err(FilmrollError::validation(
                "fade_out must be an increasing [start, end] pair",
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for overlay in &self.overlays {
            if !seen.insert(overlay.id.as_str()) {
                return Err(FilmrollError::validation(format!(
                    "duplicate overlay id '{}'",
                    overlay.id
                )));
            }
            overlay.opacity.validate()?;
            if let Some(scale) = &overlay.scale {
                scale.validate()?;
            }
        }
        Ok(())
    }

    /// Index of the last frame, `N - 1`.
    pub fn last_frame(&self) -> f64 {
        f64::from(self.frame_count.saturating_sub(1))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
