//! Two-stage variant: refine region proposals into final detections.
//!
//! Consumes per-image region proposals plus per-class regression deltas
//! and class scores, decoding each (proposal, class) pair against the
//! configured regression weights. Coordinates are in pixel space and are
//! clipped to the configured image extent.

use crate::candidate::decode::decode_box;
use crate::candidate::filter::keep_score;
use crate::candidate::Candidate;
use crate::config::EngineConfig;
use crate::engine::{run_batch, PostProcessor};
use crate::geom::CornerBox;
use crate::util::{DetPostError, DetPostResult};
use crate::workspace::Workspace;

/// Borrowed input tensors for one [`RefineDetectEngine`] invocation.
#[derive(Clone, Copy, Debug)]
pub struct RefineInputs<'a> {
    /// Number of images in the batch.
    pub batch_size: usize,
    /// Proposals per image.
    pub num_candidates: usize,
    /// Region proposals, `[batch, num_candidates, 4]` corner form.
    pub rois: &'a [f32],
    /// Per-class regression deltas, `[batch, num_candidates, num_classes, 4]`.
    pub deltas: &'a [f32],
    /// Class scores, `[batch, num_candidates, num_classes]`.
    pub scores: &'a [f32],
}

/// Post-processing engine for two-stage (propose then refine) detectors.
#[derive(Clone, Debug)]
pub struct RefineDetectEngine {
    config: EngineConfig,
    namespace: String,
}

impl RefineDetectEngine {
    /// Adopts a validated configuration.
    pub fn new(config: EngineConfig) -> DetPostResult<Self> {
        config.validate()?;
        Ok(Self { config, namespace: String::new() })
    }

    /// Restores an engine from bytes produced by
    /// [`PostProcessor::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> DetPostResult<Self> {
        Self::new(EngineConfig::from_bytes(data)?)
    }

    fn validate_shapes(&self, inputs: &RefineInputs<'_>) -> DetPostResult<()> {
        let n = inputs.batch_size * inputs.num_candidates;
        let checks = [
            ("rois", n * 4, inputs.rois.len()),
            ("deltas", n * self.config.num_classes * 4, inputs.deltas.len()),
            ("scores", n * self.config.num_classes, inputs.scores.len()),
        ];
        for (context, expected, got) in checks {
            if expected != got {
                return Err(DetPostError::ShapeMismatch { context, expected, got });
            }
        }
        Ok(())
    }
}

impl PostProcessor for RefineDetectEngine {
    type Inputs<'a> = RefineInputs<'a>;

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn set_namespace(&mut self, namespace: &str) {
        self.namespace = namespace.to_owned();
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.config.to_bytes()
    }

    fn execute(
        &self,
        inputs: RefineInputs<'_>,
        workspace: &mut Workspace,
        output: &mut [f32],
    ) -> DetPostResult<()> {
        self.validate_shapes(&inputs)?;

        let cfg = &self.config;
        let n = inputs.num_candidates;
        let classes = cfg.num_classes;
        let scales = cfg.delta_scales();
        let clip_x = cfg.image_size.width as f32;
        let clip_y = cfg.image_size.height as f32;

        run_batch(cfg, inputs.batch_size, n, workspace, output, |image, decoded| {
            for anchor in 0..n {
                let flat = image * n + anchor;
                let roi = &inputs.rois[flat * 4..flat * 4 + 4];
                let prior = CornerBox::new(roi[0], roi[1], roi[2], roi[3]);

                for class in cfg.foreground_classes() {
                    let score = inputs.scores[flat * classes + class];
                    if !keep_score(score, cfg.score_threshold) {
                        continue;
                    }
                    let base = (flat * classes + class) * 4;
                    let delta = &inputs.deltas[base..base + 4];
                    let bbox = decode_box(
                        prior,
                        [delta[0], delta[1], delta[2], delta[3]],
                        scales,
                        clip_x,
                        clip_y,
                    );
                    decoded.push(Candidate { bbox, score, class, anchor });
                }
            }
        })
    }
}
