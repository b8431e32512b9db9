use std::path::{Path, PathBuf};

use serde::Deserialize;
use simlabel_geometry::{IntrinsicCalibration, LabeledBox};
use simlabel_io::{
    records::{load_calibration, load_session, MetaRecord},
    saver::read_document,
    stream::{FrameSink, FrameSource, ImageDirSink, ImageSequenceSource},
    IoError,
};

use crate::{render::LineStyle, OverlayError};

fn default_fps() -> u32 {
    20
}

fn default_marker_size() -> f64 {
    0.05
}

fn default_line_thickness() -> usize {
    4
}

/// Settings of one overlay run, usually read from `conf.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunConfig {
    /// Calibration record of the camera that shot the video.
    pub calibration_file: PathBuf,
    /// Meta file naming the latest saved label session.
    pub saves_meta: PathBuf,
    /// Label session to use; empty or absent selects the latest one.
    #[serde(default)]
    pub select_save: Option<PathBuf>,
    /// Video file, or a directory read as an image sequence.
    pub video_path: PathBuf,
    /// Directory receiving the annotated frames.
    #[serde(default)]
    pub frames_dir: Option<PathBuf>,
    /// Video file receiving every frame.
    #[serde(default)]
    pub output_video: Option<PathBuf>,
    /// Frame rate of the output video.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Side length of the QR marker in metres.
    #[serde(default = "default_marker_size")]
    pub marker_size: f64,
    /// Wireframe color as RGB.
    #[serde(default)]
    pub line_color: [u8; 3],
    /// Wireframe width in pixels.
    #[serde(default = "default_line_thickness")]
    pub line_thickness: usize,
}

impl RunConfig {
    /// Read and validate a YAML run configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OverlayError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IoError::FileDoesNotExist(path.to_path_buf()).into());
        }
        let text = std::fs::read_to_string(path).map_err(IoError::from)?;
        Self::from_yaml(&text)
    }

    /// Parse and validate a YAML run configuration.
    pub fn from_yaml(text: &str) -> Result<Self, OverlayError> {
        let config: Self = serde_yaml::from_str(text).map_err(IoError::from)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), OverlayError> {
        if !(self.marker_size > 0.0) {
            return Err(OverlayError::InvalidConfig(format!(
                "marker_size must be positive, got {}",
                self.marker_size
            )));
        }
        if self.fps == 0 {
            return Err(OverlayError::InvalidConfig("fps must be positive".to_string()));
        }
        Ok(())
    }

    /// The label session file: `select_save` when set, else the meta file's latest entry.
    pub fn session_path(&self) -> Result<PathBuf, OverlayError> {
        match &self.select_save {
            Some(p) if !p.as_os_str().is_empty() => Ok(p.clone()),
            _ => {
                let meta: MetaRecord = read_document(&self.saves_meta)?;
                log::info!("using latest save {}", meta.latest_file.display());
                Ok(meta.latest_file)
            }
        }
    }

    /// Load the camera calibration.
    pub fn load_calibration(&self) -> Result<IntrinsicCalibration, OverlayError> {
        Ok(load_calibration(&self.calibration_file)?)
    }

    /// Load the selected label session, remapped to the robot convention.
    pub fn load_boxes(&self) -> Result<Vec<LabeledBox>, OverlayError> {
        Ok(load_session(self.session_path()?)?)
    }

    /// The wireframe style.
    pub fn line_style(&self) -> LineStyle<3> {
        LineStyle {
            color: self.line_color,
            thickness: self.line_thickness,
        }
    }

    /// Open the frame source named by `video_path`.
    pub fn open_source(&self) -> Result<Box<dyn FrameSource>, OverlayError> {
        if self.video_path.is_dir() {
            return Ok(Box::new(ImageSequenceSource::open(&self.video_path)?));
        }
        self.open_video_source()
    }

    #[cfg(feature = "gstreamer")]
    fn open_video_source(&self) -> Result<Box<dyn FrameSource>, OverlayError> {
        Ok(Box::new(simlabel_io::stream::video::VideoFileSource::open(
            &self.video_path,
        )?))
    }

    #[cfg(not(feature = "gstreamer"))]
    fn open_video_source(&self) -> Result<Box<dyn FrameSource>, OverlayError> {
        if !self.video_path.exists() {
            return Err(IoError::FileDoesNotExist(self.video_path.clone()).into());
        }
        Err(OverlayError::InvalidConfig(format!(
            "{} is not a directory; video files need the gstreamer feature",
            self.video_path.display()
        )))
    }

    /// Open the configured frame sinks.
    pub fn open_sinks(&self) -> Result<Vec<Box<dyn FrameSink>>, OverlayError> {
        let mut sinks: Vec<Box<dyn FrameSink>> = Vec::new();
        if let Some(dir) = &self.frames_dir {
            sinks.push(Box::new(ImageDirSink::new(dir)?));
        }
        if let Some(path) = &self.output_video {
            sinks.push(self.open_video_sink(path)?);
        }
        Ok(sinks)
    }

    #[cfg(feature = "gstreamer")]
    fn open_video_sink(&self, path: &Path) -> Result<Box<dyn FrameSink>, OverlayError> {
        Ok(Box::new(simlabel_io::stream::video::VideoFileSink::new(
            path, self.fps,
        )?))
    }

    #[cfg(not(feature = "gstreamer"))]
    fn open_video_sink(&self, path: &Path) -> Result<Box<dyn FrameSink>, OverlayError> {
        Err(OverlayError::InvalidConfig(format!(
            "cannot write {}; video output needs the gstreamer feature",
            path.display()
        )))
    }
}
