use crate::{
    assets::sequence::FrameSequence,
    foundation::{
        core::{FrameIndex, Viewport},
        error::FilmrollResult,
    },
    render::{
        canvas::{Canvas2d, CanvasStats, FrameRGBA},
        fit::{FitMode, Placement},
    },
};

/// Result of one repaint request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PaintOutcome {
    /// The frame at `index` is now on the canvas.
    Painted { index: FrameIndex, placement: Placement },
    /// Slot `index` is empty; the canvas was left untouched.
    Skipped { index: FrameIndex },
}

impl PaintOutcome {
    pub fn index(&self) -> FrameIndex {
        match *self {
            Self::Painted { index, .. } | Self::Skipped { index } => index,
        }
    }
}

/// Paints the frame nearest to a fractional position onto a canvas.
pub struct FramePainter {
    canvas: Box<dyn Canvas2d>,
    last_painted: Option<FrameIndex>,
}

impl FramePainter {
    pub fn new(canvas: Box<dyn Canvas2d>) -> Self {
        Self {
            canvas,
            last_painted: None,
        }
    }

    pub fn canvas(&self) -> &dyn Canvas2d {
        self.canvas.as_ref()
    }

    pub fn snapshot(&self) -> FrameRGBA {
        self.canvas.snapshot()
    }

    pub fn stats(&self) -> CanvasStats {
        self.canvas.stats()
    }

    /// Index of the frame currently on the canvas.
    pub fn last_painted(&self) -> Option<FrameIndex> {
        self.last_painted
    }

    /// Repaint the canvas for `position` (a fractional frame index).
    ///
    /// The backing store is reallocated only when the viewport's device-pixel size
    /// differs from the current one, since reallocation discards the canvas contents.
    #[tracing::instrument(level = "trace", skip(self, sequence), fields(class = %sequence.class()))]
    pub fn repaint(
        &mut self,
        sequence: &FrameSequence,
        position: f64,
        viewport: Viewport,
        fit: FitMode,
    ) -> FilmrollResult<PaintOutcome> {
        let index = FrameIndex::clamp_position(position, sequence.len());
        let target = viewport.backing_size();
        let Some(frame) = sequence.get(index) else {
            // Nothing on screen yet: present a blank surface of the right size.
            if self.last_painted.is_none() && self.canvas.backing_size() != target {
                tracing::debug!(
                    width = target.width,
                    height = target.height,
                    "sizing blank canvas"
                );
                self.canvas.resize(target)?;
            }
            return Ok(PaintOutcome::Skipped { index });
        };

        if self.canvas.backing_size() != target {
            tracing::debug!(width = target.width, height = target.height, "resizing canvas");
            self.canvas.resize(target)?;
        }

        self.canvas.clear();
        let placement = fit.place(target, frame.width, frame.height);
        self.canvas.draw_frame(frame, placement.transform())?;
        self.last_painted = Some(index);
        Ok(PaintOutcome::Painted { index, placement })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
