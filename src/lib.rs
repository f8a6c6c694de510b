//! Detpost is a batched object-detection post-processing engine.
//!
//! Given raw per-anchor regression deltas and class scores from a network
//! backbone, it decodes bounding boxes, filters by confidence, suppresses
//! overlapping duplicates per class (greedy NMS) and emits a fixed-size,
//! score-ranked detection list per image. Two engine variants share the
//! pipeline: [`RefineDetectEngine`] for two-stage detectors and
//! [`PriorBoxEngine`] for single-stage prior-box detectors. Optional
//! parallelism over batch images via the `rayon` feature; optional
//! instrumentation via the `tracing` feature.

mod candidate;
pub mod config;
mod engine;
pub mod geom;
pub mod prior;
pub(crate) mod trace;
pub mod util;
pub mod workspace;

pub use candidate::{Candidate, Detection};
pub use config::{EngineConfig, ImageSize, Precision};
pub use engine::{
    PostProcessor, PriorBoxEngine, PriorBoxInputs, RefineDetectEngine, RefineInputs,
};
pub use geom::{iou, CornerBox};
pub use prior::PriorStore;
pub use util::{DetPostError, DetPostResult};
pub use workspace::{required_workspace_bytes, Workspace};
