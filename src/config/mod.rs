//! Engine configuration: the immutable parameter set fixed at construction.
//!
//! Validation happens once, when an engine adopts a configuration; invalid
//! values are rejected, never clamped. The serialize module persists a
//! configuration as a flat byte sequence with a fixed field order.

mod serialize;

use crate::util::{DetPostError, DetPostResult};

/// Numeric precision of the output tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Precision {
    /// 32-bit IEEE floats, written as computed.
    #[default]
    Fp32,
    /// Output scores are rounded through `half::f16` before write-back.
    Fp16,
}

/// Input image extent, used to clip decoded boxes in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channel count (carried for shape negotiation, not used in math).
    pub channels: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self { width: 1, height: 1, channels: 3 }
    }
}

/// Immutable post-processing parameters shared by both engine variants.
///
/// Plain data; construct with struct update syntax from `Default` and let
/// the engine constructor run [`EngineConfig::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Total class count, including the background class if present.
    pub num_classes: usize,
    /// Class excluded from candidate generation and NMS, if any.
    pub background_class: Option<usize>,
    /// Fixed number of output rows per image.
    pub keep_topk: usize,
    /// Per-class cap on NMS input size; 0 means uncapped.
    pub pre_nms_top_k: usize,
    /// Strict lower bound on candidate scores.
    pub score_threshold: f32,
    /// Maximum allowed IoU between two kept boxes of the same class.
    pub iou_threshold: f32,
    /// Image extent for box clipping.
    pub image_size: ImageSize,
    /// Output numeric precision.
    pub precision: Precision,
    /// Retained score mantissa bits (0..=22), if score truncation is on.
    pub score_bits: Option<u8>,
    /// Per-coordinate regression weights (deltas are divided by these).
    pub reg_weights: Option<[f32; 4]>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_classes: 1,
            background_class: None,
            keep_topk: 100,
            pre_nms_top_k: 0,
            score_threshold: 0.0,
            iou_threshold: 0.5,
            image_size: ImageSize::default(),
            precision: Precision::Fp32,
            score_bits: None,
            reg_weights: None,
        }
    }
}

fn check_threshold(name: &'static str, value: f32) -> DetPostResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(DetPostError::InvalidThreshold { name, value });
    }
    Ok(())
}

impl EngineConfig {
    /// Checks every parameter, rejecting out-of-range values.
    pub fn validate(&self) -> DetPostResult<()> {
        if self.num_classes == 0 {
            return Err(DetPostError::InvalidCount { name: "num_classes" });
        }
        if self.keep_topk == 0 {
            return Err(DetPostError::InvalidCount { name: "keep_topk" });
        }
        if let Some(index) = self.background_class {
            if index >= self.num_classes {
                return Err(DetPostError::BackgroundOutOfRange {
                    index,
                    num_classes: self.num_classes,
                });
            }
        }
        check_threshold("score_threshold", self.score_threshold)?;
        check_threshold("iou_threshold", self.iou_threshold)?;
        if self.image_size.width == 0 {
            return Err(DetPostError::InvalidCount { name: "image width" });
        }
        if self.image_size.height == 0 {
            return Err(DetPostError::InvalidCount { name: "image height" });
        }
        if self.image_size.channels == 0 {
            return Err(DetPostError::InvalidCount { name: "image channels" });
        }
        if let Some(bits) = self.score_bits {
            if bits > 22 {
                return Err(DetPostError::InvalidScoreBits { bits });
            }
        }
        if let Some(weights) = self.reg_weights {
            for (coord, &value) in weights.iter().enumerate() {
                if !value.is_finite() || value == 0.0 {
                    return Err(DetPostError::InvalidRegWeight { coord, value });
                }
            }
        }
        Ok(())
    }

    /// Elementwise inverse of the regression weights, or unit scales.
    ///
    /// Deltas are multiplied by these before decoding; weights are
    /// validated non-zero and finite, so the inverse is well defined.
    pub(crate) fn delta_scales(&self) -> [f32; 4] {
        match self.reg_weights {
            Some([wx, wy, ww, wh]) => [1.0 / wx, 1.0 / wy, 1.0 / ww, 1.0 / wh],
            None => [1.0; 4],
        }
    }

    /// Classes that participate in candidate generation, in index order.
    pub(crate) fn foreground_classes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_classes).filter(move |&c| Some(c) != self.background_class)
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineConfig, ImageSize};
    use crate::util::DetPostError;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_classes() {
        let cfg = EngineConfig { num_classes: 0, ..EngineConfig::default() };
        assert_eq!(
            cfg.validate(),
            Err(DetPostError::InvalidCount { name: "num_classes" })
        );
    }

    #[test]
    fn rejects_out_of_range_iou() {
        let cfg = EngineConfig { iou_threshold: 1.5, ..EngineConfig::default() };
        assert_eq!(
            cfg.validate(),
            Err(DetPostError::InvalidThreshold { name: "iou_threshold", value: 1.5 })
        );
    }

    #[test]
    fn rejects_nan_score_threshold() {
        let cfg = EngineConfig { score_threshold: f32::NAN, ..EngineConfig::default() };
        assert!(matches!(
            cfg.validate(),
            Err(DetPostError::InvalidThreshold { name: "score_threshold", .. })
        ));
    }

    #[test]
    fn rejects_background_beyond_classes() {
        let cfg = EngineConfig {
            num_classes: 3,
            background_class: Some(3),
            ..EngineConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(DetPostError::BackgroundOutOfRange { index: 3, num_classes: 3 })
        );
    }

    #[test]
    fn rejects_score_bits_above_22() {
        let cfg = EngineConfig { score_bits: Some(23), ..EngineConfig::default() };
        assert_eq!(cfg.validate(), Err(DetPostError::InvalidScoreBits { bits: 23 }));
    }

    #[test]
    fn rejects_zero_reg_weight() {
        let cfg = EngineConfig {
            reg_weights: Some([10.0, 10.0, 0.0, 5.0]),
            ..EngineConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(DetPostError::InvalidRegWeight { coord: 2, value: 0.0 })
        );
    }

    #[test]
    fn rejects_degenerate_image_size() {
        let cfg = EngineConfig {
            image_size: ImageSize { width: 0, height: 10, channels: 3 },
            ..EngineConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(DetPostError::InvalidCount { name: "image width" })
        );
    }

    #[test]
    fn foreground_classes_skip_background() {
        let cfg = EngineConfig {
            num_classes: 4,
            background_class: Some(0),
            ..EngineConfig::default()
        };
        let classes: Vec<usize> = cfg.foreground_classes().collect();
        assert_eq!(classes, vec![1, 2, 3]);
    }
}
