use simlabel_image::Image;

/// Writes `color` at `(x, y)` if the point lies inside the image.
#[inline]
fn put_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Clips the segment `p0 -> p1` to the box `[min, max]` (Liang-Barsky).
///
/// Returns `None` when the segment misses the box.
fn clip_segment(
    p0: (f64, f64),
    p1: (f64, f64),
    min: (f64, f64),
    max: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let dx = p1.0 - p0.0;
    let dy = p1.1 - p0.1;
    let (mut t0, mut t1) = (0.0f64, 1.0f64);

    for (p, q) in [
        (-dx, p0.0 - min.0),
        (dx, max.0 - p0.0),
        (-dy, p0.1 - min.1),
        (dy, max.1 - p0.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        (p0.0 + t0 * dx, p0.1 + t0 * dy),
        (p0.0 + t1 * dx, p0.1 + t1 * dy),
    ))
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// The segment is clipped to the image before rasterizing, so endpoints far
/// outside the frame cost no more than the visible part.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The thickness of the line. (Note: thickness > 1 is approximate).
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    // a square brush spanning `thickness` pixels, the extra one going right/down
    let thickness = thickness.max(1) as i64;
    let (lo, hi) = (-((thickness - 1) / 2), thickness / 2);

    // keep the centers whose brush can still touch the image
    let min = (-hi as f64, -hi as f64);
    let max = (
        (img.cols() as i64 - 1 - lo) as f64,
        (img.rows() as i64 - 1 - lo) as f64,
    );
    let Some((a, b)) = clip_segment(
        (p0.0 as f64, p0.1 as f64),
        (p1.0 as f64, p1.1 as f64),
        min,
        max,
    ) else {
        return;
    };

    let (mut x0, mut y0) = (a.0.round() as i64, a.1.round() as i64);
    let (x1, y1) = (b.0.round() as i64, b.1.round() as i64);

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    loop {
        for i in lo..=hi {
            for j in lo..=hi {
                put_pixel(img, x0 + i, y0 + j, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws a list of line segments on an image inplace.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `segments` - Pairs of (x, y) end points.
/// * `color` - The color of the lines.
/// * `thickness` - The thickness of the lines.
pub fn draw_segments<const C: usize>(
    img: &mut Image<u8, C>,
    segments: &[([i64; 2], [i64; 2])],
    color: [u8; C],
    thickness: usize,
) {
    for (a, b) in segments {
        draw_line(img, (a[0], a[1]), (b[0], b[1]), color, thickness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simlabel_image::{Image, ImageError, ImageSize};

    #[rustfmt::skip]
    #[test]
    fn test_draw_line() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 5, height: 5 }, vec![0u8; 25],
        )?;
        draw_line(&mut img, (0, 0), (4, 4), [255], 1);
        assert_eq!(
            img.as_slice(),
            &[
                255,   0,   0,   0,   0,
                  0, 255,   0,   0,   0,
                  0,   0, 255,   0,   0,
                  0,   0,   0, 255,   0,
                  0,   0,   0,   0, 255,
            ]
        );
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn test_draw_line_clipped() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 3, height: 3 }, vec![0u8; 9],
        )?;
        draw_line(&mut img, (-5, 1), (10, 1), [7], 1);
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 0,
                7, 7, 7,
                0, 0, 0,
            ]
        );
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn test_draw_line_thick() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 5, height: 5 }, vec![0u8; 25],
        )?;
        draw_line(&mut img, (1, 2), (3, 2), [9], 3);
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 0, 0, 0,
                9, 9, 9, 9, 9,
                9, 9, 9, 9, 9,
                9, 9, 9, 9, 9,
                0, 0, 0, 0, 0,
            ]
        );
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn test_draw_line_even_thickness() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 6, height: 6 }, vec![0u8; 36],
        )?;
        draw_line(&mut img, (2, 2), (3, 2), [5], 4);
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 0, 0, 0, 0,
                0, 5, 5, 5, 5, 5,
                0, 5, 5, 5, 5, 5,
                0, 5, 5, 5, 5, 5,
                0, 5, 5, 5, 5, 5,
                0, 0, 0, 0, 0, 0,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_draw_line_far_endpoints() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 64,
                height: 48,
            },
            0u8,
        )?;
        let start = std::time::Instant::now();
        draw_line(&mut img, (-1_000_000_000, 10), (1_000_000_000, 10), [255], 4);
        // passes above the frame
        draw_line(&mut img, (-1_000_000_000, -5), (1_000_000_000, -5_000), [255], 4);

        // only rows 9..=12 are painted, over the full width
        for (i, &v) in img.as_slice().iter().enumerate() {
            assert_eq!(v == 255, (9..=12).contains(&(i / 64)), "pixel {i}");
        }

        draw_line(&mut img, (i64::MIN, i64::MIN), (i64::MAX, i64::MAX), [255], 4);
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
        Ok(())
    }

    #[test]
    fn test_draw_segments_rgb() -> Result<(), ImageError> {
        let mut img = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 5,
                height: 5,
            },
            0u8,
        )?;
        let segments = [([0, 0], [4, 0]), ([0, 4], [0, 0])];
        draw_segments(&mut img, &segments, [0, 255, 0], 1);
        assert_eq!(img.get_pixel(4, 0, 1)?, 255);
        assert_eq!(img.get_pixel(0, 4, 1)?, 255);
        assert_eq!(img.get_pixel(0, 4, 0)?, 0);
        assert_eq!(img.get_pixel(2, 2, 1)?, 0);
        Ok(())
    }
}
