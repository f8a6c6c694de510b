//! Box decoding: (prior, regression delta) pairs into absolute boxes.

use crate::geom::CornerBox;

/// Upper bound on log-space size deltas, `ln(1000/16)`.
///
/// Without this clamp a single large regression output would overflow
/// `exp` and poison the box with infinities.
const LOG_SIZE_CLAMP: f32 = 4.135_166_5;

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Decodes one regression delta against its prior.
///
/// Deltas are scaled elementwise by `scale`, centers shift proportionally
/// to the prior size and sizes grow by `exp` of the (clamped) size deltas.
/// The result is corner-ordered and clipped to `[0, clip_x] x [0, clip_y]`.
/// Degenerate priors and non-finite deltas decode to a zero-area box rather
/// than producing NaN/Inf.
pub(crate) fn decode_box(
    prior: CornerBox,
    delta: [f32; 4],
    scale: [f32; 4],
    clip_x: f32,
    clip_y: f32,
) -> CornerBox {
    let prior = prior.to_center();

    let dx = finite_or_zero(delta[0] * scale[0]);
    let dy = finite_or_zero(delta[1] * scale[1]);
    let dw = finite_or_zero(delta[2] * scale[2]).min(LOG_SIZE_CLAMP);
    let dh = finite_or_zero(delta[3] * scale[3]).min(LOG_SIZE_CLAMP);

    let cx = prior.cx + dx * prior.w;
    let cy = prior.cy + dy * prior.h;
    let w = prior.w * dw.exp();
    let h = prior.h * dh.exp();

    let corners = CornerBox {
        x1: cx - 0.5 * w,
        y1: cy - 0.5 * h,
        x2: cx + 0.5 * w,
        y2: cy + 0.5 * h,
    };
    corners.ordered().clip(clip_x, clip_y)
}
