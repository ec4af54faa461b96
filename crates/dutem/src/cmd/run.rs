use std::fs::File;
use std::io::BufWriter;

use dutem_bus::{FrameSink, LineWriter, LineWriterConfig};
use dutem_emulator::{Emulator, EmulatorConfig, SweepMode};
use tokio_util::sync::CancellationToken;

use crate::cmd::{parse_duration, RunArgs};
use crate::exit::{emulator_error, io_error, CliError, CliResult, BUS_ERROR, INTERNAL, SUCCESS};
use crate::output::{print_report, OutputFormat};

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let duration = args.duration.as_deref().map(parse_duration).transpose()?;

    let config = EmulatorConfig {
        base_id: args.base_id,
        channel_count: args.channels,
        interval,
        sweep_mode: if args.simultaneous {
            SweepMode::Simultaneous
        } else {
            SweepMode::Sequential
        },
    };
    let emulator =
        Emulator::new(config).map_err(|err| emulator_error("invalid configuration", err))?;
    configure_sensors(&emulator, &args)?;

    let sink = open_sink(&args)?;
    let enabled_sensors = enabled_sensors(&emulator);
    if enabled_sensors.is_empty() {
        tracing::warn!("no sensors enabled, nothing will be sent");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|err| io_error("runtime setup failed", err))?;

    let report = runtime.block_on(async {
        let handle = emulator
            .start(sink)
            .ok_or_else(|| CliError::new(INTERNAL, "emulation already running"))?;
        let token = handle.cancellation_token();
        install_ctrlc_handler(token.clone())?;

        wait_for_stop(&token, duration).await;
        emulator.stop();
        handle
            .wait()
            .await
            .map_err(|err| emulator_error("emulation failed", err))
    })?;

    // Frames own stdout unless they were redirected to a file.
    if args.output.is_some() {
        print_report(emulator.config(), enabled_sensors, &report, format);
    }

    if report.bus_errors > 0 {
        return Ok(BUS_ERROR);
    }
    Ok(SUCCESS)
}

fn configure_sensors(emulator: &Emulator, args: &RunArgs) -> CliResult<()> {
    for sensor in &args.sensors {
        if sensor.index >= emulator.channel_count() {
            return Err(CliError::usage(format!(
                "sensor index {} out of range (0..{})",
                sensor.index,
                emulator.channel_count()
            )));
        }
        emulator.enable(sensor.index);
        emulator.set(sensor.index, sensor.level, sensor.temperature);
    }
    Ok(())
}

fn enabled_sensors(emulator: &Emulator) -> Vec<usize> {
    emulator
        .channels()
        .snapshot()
        .iter()
        .enumerate()
        .filter(|(_, params)| params.enabled)
        .map(|(index, _)| index)
        .collect()
}

fn open_sink(args: &RunArgs) -> CliResult<Box<dyn FrameSink>> {
    let config = LineWriterConfig {
        interface: args.interface.clone(),
        timestamps: args.timestamps,
    };
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|err| io_error(&format!("failed creating {}", path.display()), err))?;
            Ok(Box::new(LineWriter::with_config(BufWriter::new(file), config)))
        }
        None => Ok(Box::new(LineWriter::with_config(std::io::stdout(), config))),
    }
}

async fn wait_for_stop(token: &CancellationToken, duration: Option<std::time::Duration>) {
    match duration {
        Some(duration) => {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    tracing::debug!(?duration, "run duration elapsed");
                }
            }
        }
        None => token.cancelled().await,
    }
}

fn install_ctrlc_handler(token: CancellationToken) -> CliResult<()> {
    ctrlc::set_handler(move || {
        token.cancel();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
