//! Per-class greedy non-maximum suppression.

use crate::candidate::{sort_candidates_desc, Candidate};
use crate::geom::iou;

/// Suppresses overlapping candidates of a single class.
///
/// Candidates are sorted by descending score (ties broken by anchor index
/// ascending) and kept greedily: a candidate survives only if its IoU with
/// every already-kept candidate stays at or below `iou_threshold`. When
/// `pre_nms_top_k` is non-zero, only that many highest-scored candidates
/// are considered at all, bounding the quadratic cost.
///
/// All candidates in the slice must belong to the same class; suppression
/// across classes is the caller's non-goal by construction.
pub(crate) fn nms_single_class(
    candidates: &mut Vec<Candidate>,
    iou_threshold: f32,
    pre_nms_top_k: usize,
) -> Vec<Candidate> {
    sort_candidates_desc(candidates);
    if pre_nms_top_k != 0 && candidates.len() > pre_nms_top_k {
        candidates.truncate(pre_nms_top_k);
    }

    let mut kept: Vec<Candidate> = Vec::new();
    'outer: for candidate in candidates.iter().copied() {
        for kept_candidate in kept.iter() {
            if iou(&candidate.bbox, &kept_candidate.bbox) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(candidate);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::nms_single_class;
    use crate::candidate::Candidate;
    use crate::geom::{iou, CornerBox};

    fn cand(bbox: CornerBox, score: f32, anchor: usize) -> Candidate {
        Candidate { bbox, score, class: 0, anchor }
    }

    #[test]
    fn heavy_overlap_keeps_only_the_best() {
        let a = CornerBox::new(0.0, 0.0, 10.0, 10.0);
        let b = CornerBox::new(0.5, 0.5, 10.5, 10.5);
        assert!(iou(&a, &b) > 0.5);

        let mut candidates = vec![cand(b, 0.6, 1), cand(a, 0.8, 0)];
        let kept = nms_single_class(&mut candidates, 0.5, 0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.8);
    }

    #[test]
    fn light_overlap_keeps_both() {
        let a = CornerBox::new(0.0, 0.0, 10.0, 10.0);
        let b = CornerBox::new(9.0, 9.0, 19.0, 19.0);
        assert!(iou(&a, &b) <= 0.5);

        let mut candidates = vec![cand(a, 0.8, 0), cand(b, 0.6, 1)];
        let kept = nms_single_class(&mut candidates, 0.5, 0);
        assert_eq!(kept.len(), 2);
        assert!(kept[0].score >= kept[1].score);
    }

    #[test]
    fn iou_exactly_at_threshold_survives() {
        // IoU(a, b) = 1/3
        let a = CornerBox::new(0.0, 0.0, 2.0, 2.0);
        let b = CornerBox::new(1.0, 0.0, 3.0, 2.0);
        let threshold = iou(&a, &b);

        let mut candidates = vec![cand(a, 0.9, 0), cand(b, 0.7, 1)];
        let kept = nms_single_class(&mut candidates, threshold, 0);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn equal_scores_resolve_by_anchor_index() {
        let a = CornerBox::new(0.0, 0.0, 10.0, 10.0);
        let b = CornerBox::new(0.5, 0.5, 10.5, 10.5);

        let mut candidates = vec![cand(b, 0.8, 5), cand(a, 0.8, 2)];
        let kept = nms_single_class(&mut candidates, 0.5, 0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].anchor, 2);
    }

    #[test]
    fn zero_area_boxes_are_never_suppressed() {
        let point = CornerBox::new(5.0, 5.0, 5.0, 5.0);
        let big = CornerBox::new(0.0, 0.0, 10.0, 10.0);

        let mut candidates = vec![cand(big, 0.9, 0), cand(point, 0.5, 1)];
        let kept = nms_single_class(&mut candidates, 0.1, 0);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn pre_nms_cap_bounds_the_input() {
        let mut candidates: Vec<Candidate> = (0..10)
            .map(|i| {
                let offset = i as f32 * 20.0;
                cand(
                    CornerBox::new(offset, 0.0, offset + 10.0, 10.0),
                    1.0 - i as f32 * 0.05,
                    i,
                )
            })
            .collect();
        // Disjoint boxes, so only the cap limits the output.
        let kept = nms_single_class(&mut candidates, 0.5, 3);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].anchor, 0);
        assert_eq!(kept[2].anchor, 2);
    }

    #[test]
    fn chain_overlap_suppresses_transitively_unkept() {
        // b overlaps a heavily, c overlaps b heavily but a only lightly.
        // a is kept, b suppressed by a, c survives because only kept boxes
        // suppress.
        let a = CornerBox::new(0.0, 0.0, 10.0, 10.0);
        let b = CornerBox::new(4.0, 0.0, 14.0, 10.0);
        let c = CornerBox::new(8.0, 0.0, 18.0, 10.0);
        assert!(iou(&a, &b) > 0.3);
        assert!(iou(&b, &c) > 0.3);
        assert!(iou(&a, &c) <= 0.3);

        let mut candidates = vec![cand(a, 0.9, 0), cand(b, 0.8, 1), cand(c, 0.7, 2)];
        let kept = nms_single_class(&mut candidates, 0.3, 0);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].anchor, 0);
        assert_eq!(kept[1].anchor, 2);
    }
}
