use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use argh::FromArgs;
use simlabel::overlay::{OverlayDriver, QrMarkerEstimator, RunConfig};

/// Draws the labeled boxes of a saved session onto every frame where the QR marker is visible
#[derive(FromArgs)]
struct Args {
    /// path to the run configuration
    #[argh(option, short = 'c', default = "PathBuf::from(\"conf.yaml\")")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    // everything is loaded before the first frame is read
    let config = RunConfig::from_file(&args.config)?;
    let calib = config.load_calibration()?;
    let boxes = config.load_boxes()?;
    log::info!("loaded {} labeled boxes", boxes.len());

    let mut source = config.open_source()?;
    let mut sinks = config.open_sinks()?;

    // create a cancel token to stop the overlay loop
    let cancel_token = Arc::new(AtomicBool::new(false));

    ctrlc::set_handler({
        let cancel_token = cancel_token.clone();
        move || {
            log::info!("Received Ctrl-C signal. Sending cancel signal !!");
            cancel_token.store(true, Ordering::SeqCst);
        }
    })?;

    let estimator = QrMarkerEstimator::new(calib.clone(), config.marker_size);
    let mut driver = OverlayDriver::new(&boxes, calib, estimator).with_style(config.line_style());

    let stats = driver.run(source.as_mut(), &mut sinks, &cancel_token)?;

    log::info!(
        "done: {} frames, {} annotated",
        stats.frames_read,
        stats.frames_annotated
    );

    Ok(())
}
