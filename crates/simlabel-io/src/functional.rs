use std::path::Path;

use simlabel_image::{Image, ImageSize};

use crate::error::IoError;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Returns true if the path has an image extension this crate reads.
pub fn is_image_file(file_path: impl AsRef<Path>) -> bool {
    file_path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Reads an RGB8 image from the given file path.
///
/// The method reads any format supported by the image crate and converts it
/// to 8-bit RGB.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the image data.
pub fn read_image_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    if !is_image_file(&file_path) {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(&file_path)?
        .decode()?
        .into_rgb8();

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_raw())?)
}

/// Writes an RGB8 image as PNG to the given file path.
///
/// # Arguments
///
/// * `file_path` - The path to the PNG image.
/// * `image` - The image to write.
pub fn write_image_png_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    let buffer = image::RgbImage::from_raw(
        image.width() as u32,
        image.height() as u32,
        image.as_slice().to_vec(),
    )
    .ok_or_else(|| {
        IoError::FileError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "image buffer does not match its size",
        ))
    })?;

    buffer.save_with_format(file_path, image::ImageFormat::Png)?;

    Ok(())
}
