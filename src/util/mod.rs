//! Shared utility helpers.

pub mod error;
pub(crate) mod score;

pub use error::{DetPostError, DetPostResult};
