//! Anchor/prior storage: per-candidate base geometry fixed at construction.
//!
//! A [`PriorStore`] owns its data; building one from a caller slice is the
//! explicit copy-in crossing point for configuration-time state. During
//! inference the store is read-only and safe to share across images.

use crate::geom::CornerBox;
use crate::util::{DetPostError, DetPostResult};

/// Immutable prior boxes with optional per-prior delta scales.
#[derive(Clone, Debug)]
pub struct PriorStore {
    boxes: Vec<CornerBox>,
    scales: Option<Vec<[f32; 4]>>,
}

impl PriorStore {
    /// Builds a store from a flat `[n, 4]` corner-form buffer.
    pub fn from_corners(data: &[f32]) -> DetPostResult<Self> {
        if data.len() % 4 != 0 {
            return Err(DetPostError::RaggedPriors { len: data.len() });
        }
        let boxes = data
            .chunks_exact(4)
            .map(|c| CornerBox::new(c[0], c[1], c[2], c[3]))
            .collect();
        Ok(Self { boxes, scales: None })
    }

    /// Attaches per-prior variances, a flat `[n, 4]` buffer matching the
    /// prior count. Deltas for prior `i` are multiplied elementwise by its
    /// variance row before decoding.
    pub fn with_variances(mut self, variances: &[f32]) -> DetPostResult<Self> {
        let expected = self.boxes.len() * 4;
        if variances.len() != expected {
            return Err(DetPostError::ShapeMismatch {
                context: "prior variances",
                expected,
                got: variances.len(),
            });
        }
        self.scales = Some(
            variances
                .chunks_exact(4)
                .map(|v| [v[0], v[1], v[2], v[3]])
                .collect(),
        );
        Ok(self)
    }

    /// Number of priors in the store.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether the store holds no priors.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Prior box at `index`.
    pub(crate) fn prior(&self, index: usize) -> CornerBox {
        self.boxes[index]
    }

    /// Delta scale for prior `index`, falling back to `default` when no
    /// per-prior variances were attached.
    pub(crate) fn delta_scale(&self, index: usize, default: [f32; 4]) -> [f32; 4] {
        match &self.scales {
            Some(scales) => scales[index],
            None => default,
        }
    }
}
