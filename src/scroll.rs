use crate::{
    animation::ramp::Ramp,
    config::{OverlayConfig, ReelConfig},
};

/// Geometry of the scroll-bound container, relative to the viewport top (CSS px).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollRegion {
    /// Container top edge; negative once scrolled past.
    pub top: f64,
    /// Container height.
    pub height: f64,
}

impl ScrollRegion {
    /// Progress through the region: 0 when its top meets the viewport top, 1 when its
    /// bottom meets the viewport bottom.
    ///
    /// A region no taller than the viewport jumps from 0 to 1 once its top passes the
    /// viewport top.
    pub fn progress(self, viewport_height: f64) -> f64 {
        let travel = self.height - viewport_height;
        if !travel.is_finite() || travel <= 0.0 {
            return if self.top < 0.0 { 1.0 } else { 0.0 };
        }
        let p = -self.top / travel;
        if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
    }
}

/// Presentation of one text overlay at a scroll position.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OverlayState {
    pub id: String,
    pub opacity: f64,
    pub scale: f64,
}

/// Pure functions of scroll progress: raw frame position, canvas fade and overlays.
#[derive(Clone, Debug)]
pub struct FrameTimeline {
    frame: Ramp,
    fade: Ramp,
    overlays: Vec<OverlayConfig>,
}

impl FrameTimeline {
    pub fn from_config(config: &ReelConfig) -> Self {
        let [fade_start, fade_end] = config.fade_out;
        Self {
            frame: Ramp::linear(0.0, 1.0, 0.0, config.last_frame()),
            fade: Ramp::linear(fade_start, fade_end, 1.0, 0.0),
            overlays: config.overlays.clone(),
        }
    }

    /// Unsmoothed frame position, `progress * (N - 1)` clamped to the sequence.
    pub fn raw_frame(&self, progress: f64) -> f64 {
        self.frame.sample(progress)
    }

    /// Canvas opacity; 1 until the fade starts, 0 at its end.
    pub fn canvas_opacity(&self, progress: f64) -> f64 {
        self.fade.sample(progress)
    }

    pub fn overlays(&self, progress: f64) -> Vec<OverlayState> {
        self.overlays
            .iter()
            .map(|o| OverlayState {
                id: o.id.clone(),
                opacity: o.opacity.sample(progress).clamp(0.0, 1.0),
                scale: o.scale.as_ref().map_or(1.0, |s| s.sample(progress)),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/unit/scroll.rs"]
mod tests;
