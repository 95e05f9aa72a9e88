//! Panel Session Example
//!
//! This example runs one control-panel session end to end against the
//! virtual patch bay: assemble the chain, simulate tap-point frames, draw
//! meter heights, and toggle the bypass.
//!
//! Run with: cargo run --example panel_session

use cinch::prelude::*;

const METER_HEIGHT: f64 = 400.0;

fn main() {
    // Host side: the page's audio element and the output destination
    let bay = PatchBay::new();
    bay.media("page-audio");
    let destination = bay.jack();

    // A previous visit left settings behind
    let store = MemoryStore::with_payload(r#"{"threshold":-32.0,"ratio":6.0}"#);

    let mut session = Session::start(
        &bay,
        "page-audio",
        destination,
        Box::new(store),
        PanelConfig::default(),
    )
    .expect("media source is registered");

    println!("chain: {:?}", session.graph().order());
    println!("restored settings: {:?}", session.settings());

    // The audio callback gets its own driver handle
    let tap = session.meter_tap();
    session.set_playing(true);

    // Simulate a few frames of program audio at falling amplitude
    let scale = session.config().scale.clone();
    for (i, amplitude) in [0.8f32, 0.4, 0.1].into_iter().enumerate() {
        let frame: Vec<f32> = (0..session.config().frame_size)
            .map(|n| amplitude * ((n as f32 * 0.1).sin()))
            .collect();
        tap.process_frame(&frame);

        let levels = session.levels();
        println!(
            "frame {}: {:.1} dB -> output bar {}",
            i,
            levels.output_db,
            scale.css(session.output_height(METER_HEIGHT))
        );
    }

    // Toggle the compressor out of and back into the path
    let engaged_links = bay.links().len();
    session.set_enabled(false).unwrap();
    println!(
        "bypassed: {} links (was {})",
        bay.links().len(),
        engaged_links
    );
    session.set_enabled(true).unwrap();
    assert_eq!(bay.links().len(), engaged_links);
    println!("restored: topology identical");

    // Pausing the media silences the meters regardless of the buffer
    session.set_playing(false);
    tap.process_frame(&[0.9f32; 1024]);
    assert_eq!(session.levels(), LevelFrame::silent());
    println!("paused: meters read 0");
}
