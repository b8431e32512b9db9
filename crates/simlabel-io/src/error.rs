/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] simlabel_image::ImageError),

    /// Error to decode or encode the image.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// Error to (de)serialize a YAML document.
    #[error("Failed to process yaml. {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Error to (de)serialize a JSON document.
    #[error("Failed to process json. {0}")]
    JsonError(#[from] serde_json::Error),

    /// A record holds values that do not describe valid geometry.
    #[error("Invalid record. {0}")]
    InvalidRecord(#[from] simlabel_geometry::GeometryError),

    /// The requested file format is not supported.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A frame does not match the size the stream was opened with.
    #[error("Frame size mismatch: expected {expected}, got {actual}")]
    FrameSizeMismatch {
        /// Size the stream expects.
        expected: simlabel_image::ImageSize,
        /// Size of the offending frame.
        actual: simlabel_image::ImageSize,
    },

    /// Error in the video pipeline.
    #[cfg(feature = "gstreamer")]
    #[error(transparent)]
    StreamCaptureError(#[from] crate::stream::video::StreamCaptureError),
}
