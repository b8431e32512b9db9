use simlabel_image::Image;

use crate::error::IoError;

mod image_dir;
pub use image_dir::{ImageDirSink, ImageSequenceSource};

/// Video file sources and sinks backed by gstreamer.
#[cfg(feature = "gstreamer")]
pub mod video;

/// A sequential producer of RGB8 frames.
pub trait FrameSource {
    /// Pull the next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Image<u8, 3>>, IoError>;

    /// Release the underlying resource. Calling it more than once is allowed.
    fn close(&mut self) -> Result<(), IoError>;
}

/// A consumer of RGB8 frames, annotated or not.
pub trait FrameSink {
    /// Offer a frame to the sink. The sink decides whether to keep it.
    fn write_frame(&mut self, frame: &Image<u8, 3>, annotated: bool) -> Result<(), IoError>;

    /// Flush and release the underlying resource. Calling it more than once is allowed.
    fn close(&mut self) -> Result<(), IoError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        (**self).next_frame()
    }

    fn close(&mut self) -> Result<(), IoError> {
        (**self).close()
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn write_frame(&mut self, frame: &Image<u8, 3>, annotated: bool) -> Result<(), IoError> {
        (**self).write_frame(frame, annotated)
    }

    fn close(&mut self) -> Result<(), IoError> {
        (**self).close()
    }
}
