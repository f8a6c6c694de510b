//! Scratch sizing and caller-owned working buffers.
//!
//! The host sizes a [`Workspace`] once via [`required_workspace_bytes`] and
//! hands it to every invocation; an execute call rejects a workspace whose
//! budget is below the requirement for its batch, so callers can allocate
//! for the largest expected shape and reuse across calls.

use crate::candidate::Candidate;

/// Buffer alignment granularity, in bytes.
const ALIGNMENT: usize = 256;

fn align_up(bytes: usize) -> usize {
    bytes.div_ceil(ALIGNMENT) * ALIGNMENT
}

/// Scratch bytes required by one invocation.
///
/// Sums the per-image stage buffers (decode/filter output across all
/// classes, per-class NMS scratch, cross-class merge buffer), each aligned
/// to 256 bytes, times the batch size. Pure and monotonic non-decreasing
/// in every argument.
pub fn required_workspace_bytes(
    batch_size: usize,
    max_candidates: usize,
    num_classes: usize,
) -> usize {
    let slot = std::mem::size_of::<Candidate>();
    let decoded = align_up(max_candidates * num_classes * slot);
    let per_class = align_up(max_candidates * slot);
    let merged = align_up(max_candidates * num_classes * slot);
    batch_size * (decoded + per_class + merged)
}

/// Caller-owned scratch for the pipeline's intermediate candidate buffers.
///
/// Exclusively owned by one invocation for its duration. Buffers are
/// cleared at the start of every call; nothing observable persists across
/// calls.
#[derive(Debug)]
pub struct Workspace {
    budget_bytes: usize,
    pub(crate) decoded: Vec<Candidate>,
    pub(crate) per_class: Vec<Candidate>,
    pub(crate) merged: Vec<Candidate>,
}

impl Workspace {
    /// Creates a workspace backed by `budget_bytes` of scratch.
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            budget_bytes,
            decoded: Vec::new(),
            per_class: Vec::new(),
            merged: Vec::new(),
        }
    }

    /// Convenience constructor sized for the given invocation shape.
    pub fn for_invocation(batch_size: usize, max_candidates: usize, num_classes: usize) -> Self {
        Self::new(required_workspace_bytes(batch_size, max_candidates, num_classes))
    }

    /// The byte budget this workspace was created with.
    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    /// Drops any state left over from a previous invocation.
    pub(crate) fn reset(&mut self) {
        self.decoded.clear();
        self.per_class.clear();
        self.merged.clear();
    }
}
