//! Filesystem adapters for reading and writing frame sequences.

use anyhow::{Context, Result};
use eyestab_core::imaging::{mask_to_gray, to_rgb8};
use eyestab_core::{FrameSource, LoadedFrame, StabilizationOutput};
use image::DynamicImage;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Supported frame extensions.
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

/// Filesystem frame source adapter.
///
/// Files in a directory are played back in filename order, with numbers
/// compared by value, so both `frame_0001.png` and unpadded `frame_1.png`
/// exports come out in sequence.
pub struct FsFrameSource {
    paths: Vec<PathBuf>,
}

impl FsFrameSource {
    /// Creates a new filesystem frame source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Frame files or directories of frames
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Collects all frame files from the configured paths.
    ///
    /// Each directory is sorted on its own; explicit file arguments keep
    /// their command-line order.
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                if is_supported_frame(path) {
                    files.push(path.clone());
                } else {
                    warn!("Unsupported file type: {}", path.display());
                }
            } else if path.is_dir() {
                files.extend(collect_from_dir(path));
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files
    }
}

fn collect_from_dir(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("Failed to read directory {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported_frame(path))
        .collect();
    files.sort_by(|a, b| frame_order(a, b));
    files
}

/// Orders frame files by name, comparing digit runs by value so that
/// `frame_2.png` plays before `frame_10.png`.
fn frame_order(a: &Path, b: &Path) -> Ordering {
    let name = |p: &Path| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    compare_numbered(&name(a), &name(b)).then_with(|| a.cmp(b))
}

fn compare_numbered(mut a: &str, mut b: &str) -> Ordering {
    loop {
        match (a.chars().next(), b.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let (run_a, rest_a) = split_digits(a);
                let (run_b, rest_b) = split_digits(b);
                let value_a = run_a.trim_start_matches('0');
                let value_b = run_b.trim_start_matches('0');
                // Same value with different padding: fewer zeros first
                let ord = value_a
                    .len()
                    .cmp(&value_b.len())
                    .then_with(|| value_a.cmp(value_b))
                    .then_with(|| run_a.len().cmp(&run_b.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
                (a, b) = (rest_a, rest_b);
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                (a, b) = (&a[x.len_utf8()..], &b[y.len_utf8()..]);
            }
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

impl FrameSource for FsFrameSource {
    fn frames(&self) -> Box<dyn Iterator<Item = Result<LoadedFrame>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} frame files", files.len());

        Box::new(files.into_iter().map(|path| load_frame(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// Checks if a path has a supported frame extension.
fn is_supported_frame(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.as_str()))
}

/// Loads a frame from the filesystem.
fn load_frame(path: &Path) -> Result<LoadedFrame> {
    let image =
        image::open(path).with_context(|| format!("Failed to open frame: {}", path.display()))?;
    Ok(LoadedFrame::new(path.to_string_lossy(), &image))
}

/// Writes stabilized frames, masks, and debug frames as numbered PNGs.
pub struct FsFrameWriter {
    dir: PathBuf,
    masks: bool,
    debug: bool,
}

impl FsFrameWriter {
    /// Creates a writer targeting `dir`. Only stabilized frames are written
    /// unless masks or debug frames are enabled.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            masks: false,
            debug: false,
        }
    }

    /// Also write `mask_NNNNN.png` for every frame.
    #[must_use]
    pub const fn with_masks(mut self, enabled: bool) -> Self {
        self.masks = enabled;
        self
    }

    /// Also write `debug_NNNNN.png` for every frame.
    #[must_use]
    pub const fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes every frame of `output`, creating the directory if needed.
    ///
    /// Returns the number of files written.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a file
    /// cannot be encoded.
    pub fn write(&self, output: &StabilizationOutput) -> Result<usize> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory: {}", self.dir.display()))?;

        let mut written = 0;
        for (index, frame) in output.frames.iter().enumerate() {
            self.save(&DynamicImage::ImageRgb8(to_rgb8(frame)), "frame", index)?;
            written += 1;
        }
        if self.masks {
            for (index, mask) in output.masks.iter().enumerate() {
                self.save(&DynamicImage::ImageLuma8(mask_to_gray(mask)), "mask", index)?;
                written += 1;
            }
        }
        if self.debug {
            for (index, frame) in output.debug_frames.iter().enumerate() {
                self.save(&DynamicImage::ImageRgb8(to_rgb8(frame)), "debug", index)?;
                written += 1;
            }
        }

        debug!("Wrote {written} files to {}", self.dir.display());
        Ok(written)
    }

    fn save(&self, image: &DynamicImage, prefix: &str, index: usize) -> Result<()> {
        let path = self.dir.join(frame_file_name(prefix, index));
        image
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// `prefix_NNNNN.png`, zero-padded so the files sort in frame order.
#[must_use]
pub fn frame_file_name(prefix: &str, index: usize) -> String {
    format!("{prefix}_{index:05}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_frame() {
        assert!(is_supported_frame(Path::new("frame.png")));
        assert!(is_supported_frame(Path::new("frame.JPG")));
        assert!(is_supported_frame(Path::new("frame.tif")));
        assert!(!is_supported_frame(Path::new("landmarks.json")));
        assert!(!is_supported_frame(Path::new("frame.cr2")));
        assert!(!is_supported_frame(Path::new("frame")));
    }

    #[test]
    fn test_numbered_names_compare_by_value() {
        assert_eq!(compare_numbered("frame_2.png", "frame_10.png"), Ordering::Less);
        assert_eq!(compare_numbered("frame_10.png", "frame_9.png"), Ordering::Greater);
        assert_eq!(compare_numbered("frame_007.png", "frame_7.png"), Ordering::Greater);
        assert_eq!(compare_numbered("frame_00010.png", "frame_00009.png"), Ordering::Greater);
        assert_eq!(compare_numbered("a_1.png", "b_0.png"), Ordering::Less);
        assert_eq!(compare_numbered("shot1_2.png", "shot1_10.png"), Ordering::Less);
        assert_eq!(compare_numbered("frame.png", "frame.png"), Ordering::Equal);
        // Longer digit runs than any integer type still order correctly
        assert_eq!(
            compare_numbered("f_99999999999999999999999.png", "f_100000000000000000000000.png"),
            Ordering::Less
        );
    }

    #[test]
    fn test_frame_file_name_sorts() {
        assert_eq!(frame_file_name("frame", 7), "frame_00007.png");
        assert!(frame_file_name("mask", 9) < frame_file_name("mask", 10));
    }
}
