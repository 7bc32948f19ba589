//! Replays a `RADR` capture file through `PresenceDetector`, printing each
//! emitted event as a JSON line on stdout.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use radar_presence::capture::CaptureReader;
use radar_presence::{Config, Event, PresenceDetector};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("test_data/capture.radr"));

    if let Err(err) = run(&input) {
        log::error!("replay failed: {err}");
        std::process::exit(1);
    }
}

fn run(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(input)
        .map_err(|e| format!("failed to open capture '{}': {e}", input.display()))?;
    let mut reader = CaptureReader::new(BufReader::new(file));

    let config = Config::default();
    let mut detector = PresenceDetector::alloc(config)?;

    detector.set_callback(Some(Box::new(|event: &Event| {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
    })));

    let mut frame_count = 0usize;
    let frame_period_ms = 10u64;
    while let Some(frame) = reader.next_frame()? {
        let time_ms = frame.frame_index as u64 * frame_period_ms;
        detector.process_frame(&frame.samples, time_ms)?;
        frame_count += 1;
    }

    log::info!("replayed {frame_count} frames from '{}'", input.display());
    Ok(())
}
