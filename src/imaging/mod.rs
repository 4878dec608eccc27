/// Image preprocessing module
///
/// This module handles:
/// - Shrinking the selected photo before upload (compress.rs)

pub mod compress;

pub use compress::{compress, CompressionLimits};
