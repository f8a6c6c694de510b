//! Batched post-processing engines.
//!
//! Two variants share one core: [`RefineDetectEngine`] consumes region
//! proposals with per-class regression deltas (two-stage detectors), and
//! [`PriorBoxEngine`] consumes shared-location deltas against a baked
//! prior grid (single-stage detectors). Both run decode, score filtering,
//! per-class NMS and top-K selection per image, independently across the
//! batch.

pub(crate) mod priorbox;
pub(crate) mod refine;

pub use priorbox::{PriorBoxEngine, PriorBoxInputs};
pub use refine::{RefineDetectEngine, RefineInputs};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::candidate::nms::nms_single_class;
use crate::candidate::topk::select_top_k;
use crate::candidate::{Candidate, Detection};
use crate::config::EngineConfig;
use crate::trace::{trace_event, trace_span};
use crate::util::score::encode_score;
use crate::util::{DetPostError, DetPostResult};
use crate::workspace::{required_workspace_bytes, Workspace};

/// The host-facing capability surface of a post-processing engine.
///
/// A fixed set of named operations (configure at construction, size the
/// workspace, execute, persist) rather than a richer object hierarchy, so a
/// host scheduler can drive any engine variant uniformly. Engines are
/// `Clone` and carry an opaque namespace tag for hosts that manage
/// duplicated instances.
pub trait PostProcessor: Clone {
    /// Borrowed per-invocation input tensors.
    type Inputs<'a>;

    /// The immutable configuration adopted at construction.
    fn config(&self) -> &EngineConfig;

    /// Opaque identifying tag, free-form and host-assigned.
    fn namespace(&self) -> &str;

    /// Replaces the namespace tag.
    fn set_namespace(&mut self, namespace: &str);

    /// Length in floats of the output buffer for `batch_size` images.
    fn output_len(&self, batch_size: usize) -> usize {
        batch_size * self.config().keep_topk * Detection::FIELDS
    }

    /// Scratch bytes required to execute on the given shape.
    fn workspace_bytes(&self, batch_size: usize, num_candidates: usize) -> usize {
        required_workspace_bytes(batch_size, num_candidates, self.config().num_classes)
    }

    /// Serializes construction parameters to a flat byte buffer.
    fn to_bytes(&self) -> Vec<u8>;

    /// Runs the full pipeline for one batch, writing `[keep_topk, 6]` rows
    /// per image into `output`.
    fn execute(
        &self,
        inputs: Self::Inputs<'_>,
        workspace: &mut Workspace,
        output: &mut [f32],
    ) -> DetPostResult<()>;
}

/// Runs per-class NMS over one image's candidates and selects the final
/// top-K rows. `per_class` and `merged` are caller scratch, cleared here.
pub(crate) fn finalize_image(
    cfg: &EngineConfig,
    decoded: &[Candidate],
    per_class: &mut Vec<Candidate>,
    merged: &mut Vec<Candidate>,
) -> Vec<Detection> {
    merged.clear();
    for class in cfg.foreground_classes() {
        per_class.clear();
        per_class.extend(decoded.iter().copied().filter(|c| c.class == class));
        if per_class.is_empty() {
            continue;
        }
        merged.extend(nms_single_class(per_class, cfg.iou_threshold, cfg.pre_nms_top_k));
    }
    select_top_k(merged, cfg.keep_topk)
}

fn write_image_rows(cfg: &EngineConfig, detections: &[Detection], out: &mut [f32]) -> usize {
    let mut valid = 0usize;
    for (det, row) in detections.iter().zip(out.chunks_exact_mut(Detection::FIELDS)) {
        let mut det = *det;
        // sentinel scores are written raw, never encoded
        if !det.is_sentinel() {
            det.score = encode_score(det.score, cfg.precision, cfg.score_bits);
            valid += 1;
        }
        det.write_row(row);
    }
    valid
}

/// Shared batch driver: validates output shape and workspace budget, then
/// runs the per-image pipeline over every image.
///
/// `generate` fills the decode/filter stage output (all classes) for one
/// image into the provided buffer. Images are independent; with the
/// `rayon` feature they run in parallel, and because each image's
/// computation is sequential internally the output is bit-identical to the
/// sequential path.
pub(crate) fn run_batch<F>(
    cfg: &EngineConfig,
    batch_size: usize,
    num_candidates: usize,
    workspace: &mut Workspace,
    output: &mut [f32],
    generate: F,
) -> DetPostResult<()>
where
    F: Fn(usize, &mut Vec<Candidate>) + Sync,
{
    let expected = batch_size * cfg.keep_topk * Detection::FIELDS;
    if output.len() != expected {
        return Err(DetPostError::ShapeMismatch {
            context: "output",
            expected,
            got: output.len(),
        });
    }
    let needed = required_workspace_bytes(batch_size, num_candidates, cfg.num_classes);
    if workspace.budget_bytes() < needed {
        return Err(DetPostError::WorkspaceTooSmall {
            needed,
            got: workspace.budget_bytes(),
        });
    }
    workspace.reset();

    let _span = trace_span!(
        "postprocess",
        batch_size = batch_size,
        num_candidates = num_candidates
    )
    .entered();

    let row_len = cfg.keep_topk * Detection::FIELDS;

    #[cfg(feature = "rayon")]
    let valid_total: usize = output
        .par_chunks_mut(row_len)
        .enumerate()
        .map(|(image, out)| {
            let mut decoded = Vec::new();
            let mut per_class = Vec::new();
            let mut merged = Vec::new();
            generate(image, &mut decoded);
            let detections = finalize_image(cfg, &decoded, &mut per_class, &mut merged);
            write_image_rows(cfg, &detections, out)
        })
        .sum();

    #[cfg(not(feature = "rayon"))]
    let valid_total: usize = {
        let mut total = 0usize;
        for (image, out) in output.chunks_exact_mut(row_len).enumerate() {
            workspace.decoded.clear();
            generate(image, &mut workspace.decoded);
            let detections = finalize_image(
                cfg,
                &workspace.decoded,
                &mut workspace.per_class,
                &mut workspace.merged,
            );
            total += write_image_rows(cfg, &detections, out);
        }
        total
    };

    trace_event!("detections", total = valid_total);
    Ok(())
}
