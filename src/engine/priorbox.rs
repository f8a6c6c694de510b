//! Single-stage variant: detection output over a baked prior-box grid.
//!
//! Location deltas are shared across classes (one box regression per
//! prior) and decode against priors fixed at construction, optionally with
//! per-prior variance scales. Coordinates are normalized and clipped to
//! `[0, 1]`.

use crate::candidate::decode::decode_box;
use crate::candidate::filter::keep_score;
use crate::candidate::Candidate;
use crate::config::EngineConfig;
use crate::engine::{run_batch, PostProcessor};
use crate::prior::PriorStore;
use crate::util::{DetPostError, DetPostResult};
use crate::workspace::Workspace;

/// Borrowed input tensors for one [`PriorBoxEngine`] invocation.
#[derive(Clone, Copy, Debug)]
pub struct PriorBoxInputs<'a> {
    /// Number of images in the batch.
    pub batch_size: usize,
    /// Location deltas, `[batch, num_priors, 4]`, shared across classes.
    pub loc: &'a [f32],
    /// Class confidences, `[batch, num_priors, num_classes]`.
    pub conf: &'a [f32],
}

/// Post-processing engine for single-stage (prior-box) detectors.
#[derive(Clone, Debug)]
pub struct PriorBoxEngine {
    config: EngineConfig,
    priors: PriorStore,
    namespace: String,
}

impl PriorBoxEngine {
    /// Adopts a validated configuration and a baked prior grid.
    pub fn new(config: EngineConfig, priors: PriorStore) -> DetPostResult<Self> {
        config.validate()?;
        Ok(Self { config, priors, namespace: String::new() })
    }

    /// Restores an engine from bytes produced by
    /// [`PostProcessor::to_bytes`], re-attaching the prior grid (priors
    /// are configuration-time weights and travel outside the parameter
    /// buffer).
    pub fn from_bytes(data: &[u8], priors: PriorStore) -> DetPostResult<Self> {
        Self::new(EngineConfig::from_bytes(data)?, priors)
    }

    /// The baked prior count, which is also the per-image candidate count.
    pub fn num_priors(&self) -> usize {
        self.priors.len()
    }

    fn validate_shapes(&self, inputs: &PriorBoxInputs<'_>) -> DetPostResult<()> {
        let n = inputs.batch_size * self.priors.len();
        let checks = [
            ("loc", n * 4, inputs.loc.len()),
            ("conf", n * self.config.num_classes, inputs.conf.len()),
        ];
        for (context, expected, got) in checks {
            if expected != got {
                return Err(DetPostError::ShapeMismatch { context, expected, got });
            }
        }
        Ok(())
    }
}

impl PostProcessor for PriorBoxEngine {
    type Inputs<'a> = PriorBoxInputs<'a>;

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
        inputs: PriorBoxInputs<'_>,
        workspace: &mut Workspace,
        output: &mut [f32],
    ) -> DetPostResult<()> {
        self.validate_shapes(&inputs)?;

        let cfg = &self.config;
        let n = self.priors.len();
        let classes = cfg.num_classes;
        let default_scales = cfg.delta_scales();

        run_batch(cfg, inputs.batch_size, n, workspace, output, |image, decoded| {
            for anchor in 0..n {
                let flat = image * n + anchor;
                let passing = cfg
                    .foreground_classes()
                    .map(|class| (class, inputs.conf[flat * classes + class]))
                    .filter(|&(_, score)| keep_score(score, cfg.score_threshold));

                let mut decoded_box = None;
                for (class, score) in passing {
                    // decode once per prior, lazily: the box is shared
                    let bbox = *decoded_box.get_or_insert_with(|| {
                        let loc = &inputs.loc[flat * 4..flat * 4 + 4];
                        decode_box(
                            self.priors.prior(anchor),
                            [loc[0], loc[1], loc[2], loc[3]],
                            self.priors.delta_scale(anchor, default_scales),
                            1.0,
                            1.0,
                        )
                    });
                    decoded.push(Candidate { bbox, score, class, anchor });
                }
            }
        })
    }
}
