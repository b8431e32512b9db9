use std::sync::atomic::AtomicBool;

use chrono::NaiveDate;
use serde_json::json;
use simlabel::{
    geometry::{IntrinsicCalibration, Pose},
    image::{Image, ImageSize},
    io::{
        records::save_calibration,
        stream::{FrameSink, ImageDirSink, ImageSequenceSource},
        functional::write_image_png_rgb8,
        FileFormat, FileSaver,
    },
    overlay::{OverlayDriver, RunConfig},
    relay::LabelStore,
};

#[test]
fn saved_session_drives_overlay() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let root = tmp_dir.path();

    // a session as the simulation client sends it, engine convention (y up)
    let store = LabelStore::new(FileSaver::new(root.join("saves"), FileFormat::Yaml)?);
    let stamp = NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(12, 30, 0))
        .ok_or("bad date")?;
    store.save_at(
        &json!({
            "crate": {"pos": [0.0, 2.0, 0.0], "rot": [0.0, 0.0, 0.0, 1.0], "scale": [1.0, 1.0, 1.0]}
        }),
        stamp,
    )?;

    let calib = IntrinsicCalibration::new(
        [[10.0, 0.0, 16.0], [0.0, 10.0, 16.0], [0.0, 0.0, 1.0]],
        vec![],
    )?;
    let calib_path = save_calibration(&FileSaver::new(root, FileFormat::Json)?, &calib)?;

    let frames = root.join("frames");
    std::fs::create_dir_all(&frames)?;
    let white = Image::<u8, 3>::from_size_val(
        ImageSize {
            width: 32,
            height: 32,
        },
        255,
    )?;
    for i in 0..2 {
        write_image_png_rgb8(frames.join(format!("{i:04}.png")), &white)?;
    }

    let config = RunConfig::from_yaml(&format!(
        "calibration_file: {}\nsaves_meta: {}\nselect_save: ''\nvideo_path: {}\nframes_dir: {}\nline_thickness: 1\n",
        calib_path.display(),
        store.meta_path().display(),
        frames.display(),
        root.join("imgs").display(),
    ))?;

    let boxes = config.load_boxes()?;
    assert_eq!(boxes.len(), 1);
    // y and z are swapped into the robot convention, two units ahead of the camera
    assert_eq!(boxes[0].position, [0.0, 0.0, 2.0]);

    let mut source = ImageSequenceSource::open(&config.video_path)?;
    let mut sinks: Vec<Box<dyn FrameSink>> = vec![Box::new(ImageDirSink::new(
        config.frames_dir.as_ref().ok_or("frames_dir")?,
    )?)];

    let mut driver = OverlayDriver::new(&boxes, config.load_calibration()?, |_: &Image<u8, 3>| {
        Some(Pose::identity())
    })
    .with_style(config.line_style());
    let stats = driver.run(&mut source, &mut sinks, &AtomicBool::new(false))?;

    assert_eq!(stats.frames_read, 2);
    assert_eq!(stats.frames_annotated, 2);
    assert!(root.join("imgs/frame0.png").exists());
    assert!(root.join("imgs/frame1.png").exists());
    Ok(())
}
