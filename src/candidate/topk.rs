//! Final top-K selection across classes, with sentinel padding.

use crate::candidate::{sort_candidates_desc, Candidate, Detection};

/// Merges per-class NMS survivors into the fixed-length output sequence.
///
/// Survivors are sorted by descending score (ties broken by class then
/// anchor index, both ascending), truncated to `keep_topk` and padded with
/// [`Detection::SENTINEL`] rows. Producing fewer than `keep_topk` real
/// detections is steady-state behavior, not an error.
pub(crate) fn select_top_k(merged: &mut Vec<Candidate>, keep_topk: usize) -> Vec<Detection> {
    sort_candidates_desc(merged);
    if merged.len() > keep_topk {
        merged.truncate(keep_topk);
    }

    let mut out: Vec<Detection> = Vec::with_capacity(keep_topk);
    out.extend(merged.iter().copied().map(Detection::from));
    out.resize(keep_topk, Detection::SENTINEL);
    out
}
