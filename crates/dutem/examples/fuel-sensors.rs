//! Emulate two fuel sensors and print their frames in `cansend` form.
//!
//! ```bash
//! cargo run -p dutem --example fuel-sensors
//! ```

use std::time::Duration;

use dutem::{Emulator, EmulatorConfig, LineWriter};

#[tokio::main]
async fn main() {
    let emulator = Emulator::new(EmulatorConfig {
        interval: Duration::from_millis(250),
        ..EmulatorConfig::default()
    })
    .expect("default identifier range is valid");

    emulator.enable(0);
    emulator.set(0, 0.25, -10);
    emulator.enable(3);
    emulator.set(3, 0.80, 35);

    let handle = emulator
        .start(LineWriter::new(std::io::stdout()))
        .expect("fresh emulator is disabled");

    tokio::time::sleep(Duration::from_millis(1_100)).await;
    emulator.set_level(3, 0.75);
    tokio::time::sleep(Duration::from_millis(1_000)).await;

    emulator.stop();
    let report = handle.wait().await.expect("emission task panicked");
    eprintln!(
        "sent {} frames in {} passes ({} bus errors)",
        report.frames_sent, report.passes, report.bus_errors
    );
}
