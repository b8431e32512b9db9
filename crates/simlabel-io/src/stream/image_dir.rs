use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use simlabel_image::Image;
use walkdir::WalkDir;

use super::{FrameSink, FrameSource};
use crate::{
    error::IoError,
    functional::{is_image_file, read_image_rgb8, write_image_png_rgb8},
};

/// Reads the images of a directory in natural file name order.
pub struct ImageSequenceSource {
    pending: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    /// List the image files directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Fails when the directory does not exist or cannot be listed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, IoError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(IoError::FileDoesNotExist(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| IoError::FileError(e.into()))?;
            if entry.file_type().is_file() && is_image_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        // frame2.png before frame10.png
        alphanumeric_sort::sort_path_slice(&mut files);

        log::info!("found {} frames in {}", files.len(), dir.display());

        Ok(Self {
            pending: files.into(),
        })
    }

    /// Number of frames not read yet.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        match self.pending.pop_front() {
            Some(path) => {
                log::debug!("reading {}", path.display());
                Ok(Some(read_image_rgb8(&path)?))
            }
            None => Ok(None),
        }
    }

    fn close(&mut self) -> Result<(), IoError> {
        self.pending.clear();
        Ok(())
    }
}

/// Writes frames into a directory as `frame{N}.png`.
///
/// By default only annotated frames are kept and `N` counts the written frames.
pub struct ImageDirSink {
    dir: PathBuf,
    annotated_only: bool,
    written: usize,
}

impl ImageDirSink {
    /// Create the sink, creating `dir` if it does not exist.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, IoError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            annotated_only: true,
            written: 0,
        })
    }

    /// Keep every offered frame, annotated or not.
    pub fn with_all_frames(mut self) -> Self {
        self.annotated_only = false;
        self
    }

    /// Number of frames written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// The output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameSink for ImageDirSink {
    fn write_frame(&mut self, frame: &Image<u8, 3>, annotated: bool) -> Result<(), IoError> {
        if self.annotated_only && !annotated {
            return Ok(());
        }
        let path = self.dir.join(format!("frame{}.png", self.written));
        write_image_png_rgb8(&path, frame)?;
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), IoError> {
        log::debug!("wrote {} frames to {}", self.written, self.dir.display());
        Ok(())
    }
}
