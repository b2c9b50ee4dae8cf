//! Frame source port for loading video frames in sequence order.

use anyhow::Context;

use crate::domain::{FrameSequence, LoadedFrame};

/// Port for loading frames from a source.
pub trait FrameSource: Send + Sync {
    /// Returns an iterator over frames in playback order.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a frame fails to load.
    fn frames(&self) -> Box<dyn Iterator<Item = anyhow::Result<LoadedFrame>> + Send + '_>;

    /// Returns the total number of frames, if known.
    fn count_hint(&self) -> Option<usize>;
}

/// Drains a source into a [`FrameSequence`].
///
/// Loading stops at the first failure: a skipped frame would shift every
/// later frame against per-frame landmark data.
///
/// # Errors
///
/// Returns the first load error, or a dimension mismatch between frames.
pub fn collect_sequence(source: &dyn FrameSource) -> anyhow::Result<(Vec<String>, FrameSequence)> {
    let mut paths = Vec::with_capacity(source.count_hint().unwrap_or_default());
    let mut frames = Vec::with_capacity(paths.capacity());

    for (index, loaded) in source.frames().enumerate() {
        let loaded = loaded.with_context(|| format!("Failed to load frame {index}"))?;
        paths.push(loaded.path);
        frames.push(loaded.frame);
    }

    let sequence = FrameSequence::new(frames)?;
    Ok((paths, sequence))
}
