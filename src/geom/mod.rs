//! Box geometry primitives shared by all pipeline stages.
//!
//! Boxes travel through the pipeline in corner form; center/size form is
//! only used transiently inside the decoder.

/// Axis-aligned box in corner form (x1, y1, x2, y2).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CornerBox {
    /// Left edge.
    pub x1: f32,
    /// Top edge.
    pub y1: f32,
    /// Right edge.
    pub x2: f32,
    /// Bottom edge.
    pub y2: f32,
}

/// Axis-aligned box in center/size form (cx, cy, w, h).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CenterBox {
    /// Center x coordinate.
    pub cx: f32,
    /// Center y coordinate.
    pub cy: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl CornerBox {
    /// Creates a corner box without reordering the coordinates.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box area; degenerate (inverted or zero-extent) boxes report 0.
    pub fn area(&self) -> f32 {
        let w = (self.x2 - self.x1).max(0.0);
        let h = (self.y2 - self.y1).max(0.0);
        w * h
    }

    /// Whether the box covers no area.
    pub fn is_empty(&self) -> bool {
        self.area() == 0.0
    }

    /// Clips all coordinates into `[0, max_x] x [0, max_y]`.
    pub fn clip(&self, max_x: f32, max_y: f32) -> Self {
        Self {
            x1: self.x1.clamp(0.0, max_x),
            y1: self.y1.clamp(0.0, max_y),
            x2: self.x2.clamp(0.0, max_x),
            y2: self.y2.clamp(0.0, max_y),
        }
    }

    /// Reorders the corners so that `x2 >= x1` and `y2 >= y1`.
    pub fn ordered(&self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    /// Converts to center/size form.
    pub fn to_center(&self) -> CenterBox {
        CenterBox {
            cx: 0.5 * (self.x1 + self.x2),
            cy: 0.5 * (self.y1 + self.y2),
            w: self.x2 - self.x1,
            h: self.y2 - self.y1,
        }
    }
}

impl CenterBox {
    /// Converts to corner form.
    pub fn to_corners(&self) -> CornerBox {
        CornerBox {
            x1: self.cx - 0.5 * self.w,
            y1: self.cy - 0.5 * self.h,
            x2: self.cx + 0.5 * self.w,
            y2: self.cy + 0.5 * self.h,
        }
    }
}

/// Intersection-over-union of two corner-form boxes.
///
/// Zero-area boxes and zero-area unions yield 0, so degenerate boxes
/// neither suppress nor get suppressed on area grounds alone.
pub fn iou(a: &CornerBox, b: &CornerBox) -> f32 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);

    let iw = (ix2 - ix1).max(0.0);
    let ih = (iy2 - iy1).max(0.0);
    let inter = iw * ih;
    if inter <= 0.0 {
        return 0.0;
    }

    let union = a.area() + b.area() - inter;
    if union <= 0.0 {
        return 0.0;
    }
    inter / union
}
