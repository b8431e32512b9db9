use std::path::{Path, PathBuf};

use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;
use simlabel_image::{Image, ImageSize};

use super::{FrameSink, FrameSource};
use crate::error::IoError;

/// An error type for the gstreamer video pipelines.
#[derive(thiserror::Error, Debug)]
pub enum StreamCaptureError {
    /// An error occurred during GStreamer initialization or pipeline parsing.
    #[error(transparent)]
    GStreamerError(#[from] gst::glib::Error),

    /// An error occurred during GStreamer downcast of pipeline element.
    #[error("Failed to downcast pipeline")]
    DowncastPipelineError(gst::Element),

    /// An error occurred during GStreamer downcast of appsink.
    #[error("Failed to get an element by name")]
    GetElementByNameError,

    /// An error occurred during GStreamer to get the bus.
    #[error("Failed to get the bus")]
    BusError,

    /// An error occurred during GStreamer to set the pipeline state.
    #[error(transparent)]
    SetPipelineStateError(#[from] gst::StateChangeError),

    /// An error occurred during GStreamer to get the caps from the sample.
    #[error("Failed caps: {0}")]
    GetCapsError(String),

    /// An error occurred during GStreamer to get the buffer from the sample.
    #[error("Failed to get the buffer from the sample")]
    GetBufferError,

    /// An error occurred during GStreamer to push a buffer or send end of stream.
    #[error(transparent)]
    GstreamerFlowError(#[from] gst::FlowError),

    /// The pipeline posted an error on its bus.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

fn parse_pipeline(description: &str) -> Result<gst::Pipeline, StreamCaptureError> {
    log::debug!("pipeline: {description}");
    gst::parse::launch(description)?
        .dynamic_cast::<gst::Pipeline>()
        .map_err(StreamCaptureError::DowncastPipelineError)
}

fn location(path: &Path) -> String {
    if cfg!(windows) {
        path.to_string_lossy().replace('\\', "/")
    } else {
        path.to_string_lossy().into_owned()
    }
}

/// Reads RGB8 frames from a video file through `decodebin`.
pub struct VideoFileSource {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    closed: bool,
}

impl VideoFileSource {
    /// Open the video file and start decoding.
    ///
    /// # Errors
    ///
    /// Fails when the file does not exist or the pipeline cannot be started.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IoError::FileDoesNotExist(path.to_path_buf()));
        }

        gst::init().map_err(StreamCaptureError::from)?;

        let pipeline = parse_pipeline(&format!(
            "filesrc location=\"{}\" ! \
            decodebin ! \
            videoconvert ! \
            video/x-raw,format=RGB ! \
            appsink name=sink sync=false",
            location(path)
        ))?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or(StreamCaptureError::GetElementByNameError)?
            .dynamic_cast::<gst_app::AppSink>()
            .map_err(StreamCaptureError::DowncastPipelineError)?;

        pipeline
            .set_state(gst::State::Playing)
            .map_err(StreamCaptureError::from)?;

        log::info!("reading video {}", path.display());

        Ok(Self {
            pipeline,
            appsink,
            closed: false,
        })
    }

    fn check_bus(&self) -> Result<(), StreamCaptureError> {
        let bus = self.pipeline.bus().ok_or(StreamCaptureError::BusError)?;
        if let Some(msg) = bus.pop_filtered(&[gst::MessageType::Error]) {
            if let gst::MessageView::Error(err) = msg.view() {
                return Err(StreamCaptureError::PipelineError(err.error().to_string()));
            }
        }
        Ok(())
    }

    fn sample_to_image(sample: &gst::Sample) -> Result<Image<u8, 3>, IoError> {
        let caps = sample
            .caps()
            .ok_or_else(|| StreamCaptureError::GetCapsError("sample has no caps".to_string()))?;
        let structure = caps
            .structure(0)
            .ok_or_else(|| StreamCaptureError::GetCapsError("caps have no structure".to_string()))?;
        let width = structure
            .get::<i32>("width")
            .map_err(|e| StreamCaptureError::GetCapsError(e.to_string()))? as usize;
        let height = structure
            .get::<i32>("height")
            .map_err(|e| StreamCaptureError::GetCapsError(e.to_string()))? as usize;

        let buffer = sample.buffer().ok_or(StreamCaptureError::GetBufferError)?;
        let map = buffer
            .map_readable()
            .map_err(|_| StreamCaptureError::GetBufferError)?;
        let data = map.as_slice();

        // raw RGB rows are padded to a multiple of four bytes
        let row = width * 3;
        let stride = row.div_ceil(4) * 4;
        if data.len() < stride * (height.saturating_sub(1)) + row {
            return Err(StreamCaptureError::GetBufferError.into());
        }

        let mut pixels = Vec::with_capacity(row * height);
        for y in 0..height {
            pixels.extend_from_slice(&data[y * stride..y * stride + row]);
        }

        Ok(Image::new(ImageSize { width, height }, pixels)?)
    }
}

impl FrameSource for VideoFileSource {
    fn next_frame(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        if self.closed {
            return Ok(None);
        }
        match self.appsink.pull_sample() {
            Ok(sample) => Ok(Some(Self::sample_to_image(&sample)?)),
            Err(_) if self.appsink.is_eos() => Ok(None),
            Err(_) => {
                self.check_bus()?;
                Ok(None)
            }
        }
    }

    fn close(&mut self) -> Result<(), IoError> {
        if !self.closed {
            self.closed = true;
            self.pipeline
                .set_state(gst::State::Null)
                .map_err(StreamCaptureError::from)?;
        }
        Ok(())
    }
}

impl Drop for VideoFileSource {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("Error closing video source: {e}");
        }
    }
}

struct WriterPipeline {
    pipeline: gst::Pipeline,
    appsrc: gst_app::AppSrc,
    size: ImageSize,
}

/// Encodes every offered frame into an H.264 mp4 file.
///
/// The pipeline is built on the first frame, whose size fixes the video size.
pub struct VideoFileSink {
    path: PathBuf,
    fps: u32,
    writer: Option<WriterPipeline>,
    counter: u64,
}

impl VideoFileSink {
    /// Create a sink writing to `path` at `fps` frames per second.
    pub fn new(path: impl AsRef<Path>, fps: u32) -> Result<Self, IoError> {
        gst::init().map_err(StreamCaptureError::from)?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            fps: fps.max(1),
            writer: None,
            counter: 0,
        })
    }

    fn start(&self, size: ImageSize) -> Result<WriterPipeline, StreamCaptureError> {
        let pipeline = parse_pipeline(&format!(
            "appsrc name=src ! \
            videoconvert ! video/x-raw,format=I420 ! \
            x264enc ! \
            video/x-h264,profile=main ! \
            h264parse ! \
            mp4mux ! \
            filesink location=\"{}\"",
            location(&self.path)
        ))?;

        let appsrc = pipeline
            .by_name("src")
            .ok_or(StreamCaptureError::GetElementByNameError)?
            .dynamic_cast::<gst_app::AppSrc>()
            .map_err(StreamCaptureError::DowncastPipelineError)?;

        appsrc.set_format(gst::Format::Time);
        let caps = gst::Caps::builder("video/x-raw")
            .field("format", "RGB")
            .field("width", size.width as i32)
            .field("height", size.height as i32)
            .field("framerate", gst::Fraction::new(self.fps as i32, 1))
            .build();
        appsrc.set_caps(Some(&caps));
        appsrc.set_property("block", true);

        pipeline.set_state(gst::State::Playing)?;
        log::info!("writing video {} ({size})", self.path.display());

        Ok(WriterPipeline {
            pipeline,
            appsrc,
            size,
        })
    }
}

impl FrameSink for VideoFileSink {
    fn write_frame(&mut self, frame: &Image<u8, 3>, _annotated: bool) -> Result<(), IoError> {
        if self.writer.is_none() {
            self.writer = Some(self.start(frame.size())?);
        }
        let Some(writer) = self.writer.as_ref() else {
            return Ok(());
        };

        if frame.size() != writer.size {
            return Err(IoError::FrameSizeMismatch {
                expected: writer.size,
                actual: frame.size(),
            });
        }

        // pad rows to the four byte stride of raw RGB
        let row = frame.width() * 3;
        let stride = row.div_ceil(4) * 4;
        let data = if stride == row {
            frame.as_slice().to_vec()
        } else {
            let mut padded = vec![0u8; stride * frame.height()];
            for (dst, src) in padded
                .chunks_exact_mut(stride)
                .zip(frame.as_slice().chunks_exact(row))
            {
                dst[..row].copy_from_slice(src);
            }
            padded
        };

        let mut buffer = gst::Buffer::from_mut_slice(data);
        let frame_ns = 1_000_000_000 / self.fps as u64;
        if let Some(buffer_ref) = buffer.get_mut() {
            buffer_ref.set_pts(Some(gst::ClockTime::from_nseconds(self.counter * frame_ns)));
            buffer_ref.set_duration(Some(gst::ClockTime::from_nseconds(frame_ns)));
        }
        self.counter += 1;

        writer
            .appsrc
            .push_buffer(buffer)
            .map_err(StreamCaptureError::from)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), IoError> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };

        let eos = writer.appsrc.end_of_stream();
        let bus = writer.pipeline.bus().ok_or(StreamCaptureError::BusError);

        // wait for the muxer to finalize the file
        let mut result: Result<(), StreamCaptureError> = eos.map(|_| ()).map_err(Into::into);
        if result.is_ok() {
            let bus = bus?;
            if let Some(msg) = bus.timed_pop_filtered(
                gst::ClockTime::from_seconds(10),
                &[gst::MessageType::Eos, gst::MessageType::Error],
            ) {
                if let gst::MessageView::Error(err) = msg.view() {
                    result = Err(StreamCaptureError::PipelineError(err.error().to_string()));
                }
            } else {
                log::warn!("timed out waiting for the video encoder to finish");
            }
        }

        writer
            .pipeline
            .set_state(gst::State::Null)
            .map_err(StreamCaptureError::from)?;
        log::info!("wrote {} frames to {}", self.counter, self.path.display());

        Ok(result?)
    }
}

impl Drop for VideoFileSink {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("Error closing video sink: {e}");
        }
    }
}
