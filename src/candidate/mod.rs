//! Candidate selection and pruning: decode, filter, NMS and top-K.

pub(crate) mod decode;
pub(crate) mod filter;
pub(crate) mod nms;
pub(crate) mod topk;

use std::cmp::Ordering;

use crate::geom::CornerBox;

/// A decoded, score-filtered detection candidate for one class.
///
/// Transient: candidates exist only within a single inference call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Decoded and clipped box.
    pub bbox: CornerBox,
    /// Class confidence.
    pub score: f32,
    /// Class index.
    pub class: usize,
    /// Index of the originating anchor/prior.
    pub anchor: usize,
}

/// One row of the fixed-size output: a detection or a sentinel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Final box in corner form.
    pub bbox: CornerBox,
    /// Final score; -1 marks a sentinel row.
    pub score: f32,
    /// Class index as a float for tensor write-back; -1 marks a sentinel.
    pub class: f32,
}

impl Detection {
    /// Floats per output row: x1, y1, x2, y2, score, class.
    pub const FIELDS: usize = 6;

    /// The "no detection in this slot" placeholder.
    pub const SENTINEL: Self = Self {
        bbox: CornerBox { x1: 0.0, y1: 0.0, x2: 0.0, y2: 0.0 },
        score: -1.0,
        class: -1.0,
    };

    /// Whether this row is the sentinel placeholder.
    pub fn is_sentinel(&self) -> bool {
        self.score < 0.0
    }

    /// Writes the row into a 6-element output slice.
    pub(crate) fn write_row(&self, out: &mut [f32]) {
        out[0] = self.bbox.x1;
        out[1] = self.bbox.y1;
        out[2] = self.bbox.x2;
        out[3] = self.bbox.y2;
        out[4] = self.score;
        out[5] = self.class;
    }
}

impl From<Candidate> for Detection {
    fn from(c: Candidate) -> Self {
        Self { bbox: c.bbox, score: c.score, class: c.class as f32 }
    }
}

fn candidate_cmp_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.class.cmp(&b.class))
        .then_with(|| a.anchor.cmp(&b.anchor))
}

/// Sorts candidates by descending score with deterministic tie-breaking
/// (class ascending, then anchor ascending).
pub(crate) fn sort_candidates_desc(candidates: &mut [Candidate]) {
    candidates.sort_by(candidate_cmp_desc);
}
