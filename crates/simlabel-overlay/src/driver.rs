use std::sync::atomic::{AtomicBool, Ordering};

use simlabel_geometry::{bbox::box_vertices, BoxVertices3D, IntrinsicCalibration, LabeledBox};
use simlabel_image::Image;
use simlabel_io::{
    stream::{FrameSink, FrameSource},
    IoError,
};

use crate::{
    detector::MarkerPoseEstimator,
    render::{draw_box, LineStyle},
    OverlayError,
};

/// Counters collected over one overlay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayStats {
    /// Frames pulled from the source.
    pub frames_read: usize,
    /// Frames with a marker pose, drawn on.
    pub frames_annotated: usize,
    /// Frames passed through because no pose was found.
    pub frames_without_pose: usize,
    /// Boxes not drawn because their projection failed.
    pub boxes_skipped: usize,
}

/// Draws the labeled boxes of one session onto every frame with a marker pose.
pub struct OverlayDriver<E> {
    boxes: Vec<(String, BoxVertices3D)>,
    calib: IntrinsicCalibration,
    estimator: E,
    style: LineStyle<3>,
}

impl<E: MarkerPoseEstimator> OverlayDriver<E> {
    /// Create a driver. Box corners are computed once here.
    pub fn new(boxes: &[LabeledBox], calib: IntrinsicCalibration, estimator: E) -> Self {
        Self {
            boxes: boxes
                .iter()
                .map(|b| (b.name.clone(), box_vertices(b)))
                .collect(),
            calib,
            estimator,
            style: LineStyle::default(),
        }
    }

    /// Set the wireframe color and width.
    pub fn with_style(mut self, style: LineStyle<3>) -> Self {
        self.style = style;
        self
    }

    /// Annotate one frame in place.
    ///
    /// Returns whether a pose was found, plus the number of boxes skipped.
    pub fn annotate(&mut self, frame: &mut Image<u8, 3>) -> (bool, usize) {
        let Some(pose) = self.estimator.estimate(frame) else {
            return (false, 0);
        };

        let mut skipped = 0;
        for (name, vertices) in self.boxes.iter() {
            if let Err(e) = draw_box(frame, vertices, &pose, &self.calib, &self.style) {
                log::warn!("skipping box '{name}': {e}");
                skipped += 1;
            }
        }
        (true, skipped)
    }

    /// Run the overlay until the source is exhausted or `cancel` is set.
    ///
    /// Every frame is offered to every sink along with whether it was
    /// annotated. The source and all sinks are closed on every exit path; the
    /// first error encountered is returned.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        sinks: &mut [Box<dyn FrameSink>],
        cancel: &AtomicBool,
    ) -> Result<OverlayStats, OverlayError> {
        let result = self.process(source, sinks, cancel);

        let mut close_error: Option<IoError> = None;
        if let Err(e) = source.close() {
            log::error!("failed to close frame source: {e}");
            close_error.get_or_insert(e);
        }
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.close() {
                log::error!("failed to close frame sink: {e}");
                close_error.get_or_insert(e);
            }
        }

        let stats = result?;
        if let Some(e) = close_error {
            return Err(e.into());
        }

        log::info!(
            "processed {} frames: {} annotated, {} without pose, {} boxes skipped",
            stats.frames_read,
            stats.frames_annotated,
            stats.frames_without_pose,
            stats.boxes_skipped
        );
        Ok(stats)
    }

    fn process(
        &mut self,
        source: &mut dyn FrameSource,
        sinks: &mut [Box<dyn FrameSink>],
        cancel: &AtomicBool,
    ) -> Result<OverlayStats, OverlayError> {
        let mut stats = OverlayStats::default();

        while !cancel.load(Ordering::SeqCst) {
            let Some(mut frame) = source.next_frame()? else {
                log::debug!("frame source exhausted");
                break;
            };
            stats.frames_read += 1;

            let (annotated, skipped) = self.annotate(&mut frame);
            stats.boxes_skipped += skipped;
            if annotated {
                stats.frames_annotated += 1;
            } else {
                log::debug!("frame {}: no marker pose", stats.frames_read - 1);
                stats.frames_without_pose += 1;
            }

            for sink in sinks.iter_mut() {
                sink.write_frame(&frame, annotated)?;
            }
        }

        if cancel.load(Ordering::SeqCst) {
            log::info!("overlay cancelled after {} frames", stats.frames_read);
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simlabel_geometry::Pose;
    use simlabel_image::ImageSize;

    struct CountingSource {
        left: usize,
        closed: bool,
    }

    impl FrameSource for CountingSource {
        fn next_frame(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
            if self.left == 0 {
                return Ok(None);
            }
            self.left -= 1;
            let size = ImageSize {
                width: 8,
                height: 8,
            };
            Ok(Some(Image::from_size_val(size, 255)?))
        }

        fn close(&mut self) -> Result<(), IoError> {
            self.closed = true;
            Ok(())
        }
    }

    fn calib() -> IntrinsicCalibration {
        IntrinsicCalibration::new([[4.0, 0.0, 4.0], [0.0, 4.0, 4.0], [0.0, 0.0, 1.0]], vec![])
            .unwrap()
    }

    #[test]
    fn cancel_stops_before_first_frame() -> Result<(), OverlayError> {
        let mut source = CountingSource {
            left: 3,
            closed: false,
        };
        let cancel = AtomicBool::new(true);
        let mut driver = OverlayDriver::new(&[], calib(), |_: &Image<u8, 3>| Some(Pose::identity()));

        let stats = driver.run(&mut source, &mut [], &cancel)?;
        assert_eq!(stats.frames_read, 0);
        assert!(source.closed);
        Ok(())
    }

    #[test]
    fn box_behind_camera_is_skipped() -> Result<(), OverlayError> {
        let mut source = CountingSource {
            left: 2,
            closed: false,
        };
        let boxes = [
            LabeledBox::from_components("front", &[0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]),
            LabeledBox::from_components("behind", &[0.0, 0.0, -3.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]),
        ];
        let cancel = AtomicBool::new(false);
        let mut driver = OverlayDriver::new(&boxes, calib(), |_: &Image<u8, 3>| Some(Pose::identity()));

        let stats = driver.run(&mut source, &mut [], &cancel)?;
        assert_eq!(
            stats,
            OverlayStats {
                frames_read: 2,
                frames_annotated: 2,
                frames_without_pose: 0,
                boxes_skipped: 2,
            }
        );
        Ok(())
    }
}
