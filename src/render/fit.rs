use crate::foundation::core::{Affine, BackingSize, Vec2, ViewportClass};

/// How a frame is scaled into the canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FitMode {
    /// Fill the canvas, cropping one axis.
    Cover,
    /// Fit `margin` of the canvas width, cropping vertically if needed.
    WidthConstrained { margin: f64 },
}

impl FitMode {
    /// Wide viewports cover; compact viewports show the full frame width with a gutter.
    pub fn for_class(class: ViewportClass, compact_margin: f64) -> Self {
        match class {
            ViewportClass::Wide => Self::Cover,
            ViewportClass::Compact => Self::WidthConstrained {
                margin: compact_margin,
            },
        }
    }

    pub fn scale(self, canvas: BackingSize, image_w: u32, image_h: u32) -> f64 {
        if image_w == 0 || image_h == 0 {
            return 0.0;
        }
        let sx = f64::from(canvas.width) / f64::from(image_w);
        let sy = f64::from(canvas.height) / f64::from(image_h);
        match self {
            Self::Cover => sx.max(sy),
            Self::WidthConstrained { margin } => sx * margin,
        }
    }

    /// Centered placement of an `image_w x image_h` frame.
    pub fn place(self, canvas: BackingSize, image_w: u32, image_h: u32) -> Placement {
        let scale = self.scale(canvas, image_w, image_h);
        let width = f64::from(image_w) * scale;
        let height = f64::from(image_h) * scale;
        Placement {
            scale,
            x: (f64::from(canvas.width) - width) / 2.0,
            y: (f64::from(canvas.height) - height) / 2.0,
            width,
            height,
        }
    }
}

/// Where a frame lands on the canvas, in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Uniform scale from image pixels to canvas pixels.
    pub scale: f64,
    /// Left edge; negative when cropped horizontally.
    pub x: f64,
    /// Top edge; negative when cropped vertically.
    pub y: f64,
    /// Scaled width.
    pub width: f64,
    /// Scaled height.
    pub height: f64,
}

impl Placement {
    /// Image-space to canvas-space transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y)) * Affine::scale(self.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
