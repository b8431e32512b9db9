use simlabel_image::{Image, ImageError};

/// Convert an RGB8 image to grayscale using the formula:
///
/// Y = (77 * R + 150 * G + 29 * B) >> 8
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
pub fn gray_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    src.as_slice()
        .chunks_exact(3)
        .zip(dst.as_slice_mut().iter_mut())
        .for_each(|(src_pixel, dst_pixel)| {
            let r = src_pixel[0] as u16;
            let g = src_pixel[1] as u16;
            let b = src_pixel[2] as u16;
            *dst_pixel = ((r * 77 + g * 150 + b * 29) >> 8) as u8;
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simlabel_image::ImageSize;

    #[test]
    fn gray_from_rgb_u8_values() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 2,
            height: 1,
        };
        let src = Image::<u8, 3>::new(size, vec![255, 255, 255, 0, 0, 0])?;
        let mut dst = Image::<u8, 1>::from_size_val(size, 0)?;
        gray_from_rgb_u8(&src, &mut dst)?;
        assert_eq!(dst.as_slice(), &[255, 0]);
        Ok(())
    }

    #[test]
    fn gray_from_rgb_u8_size_mismatch() -> Result<(), ImageError> {
        let src = Image::<u8, 3>::from_size_val([2, 2].into(), 0)?;
        let mut dst = Image::<u8, 1>::from_size_val([3, 2].into(), 0)?;
        assert!(gray_from_rgb_u8(&src, &mut dst).is_err());
        Ok(())
    }
}
