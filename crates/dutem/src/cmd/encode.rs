use dutem_emulator::{ChannelParams, EmulatorConfig};
use dutem_frame::{checked_sensor_id, encode_reading, SensorReading};

use crate::cmd::EncodeArgs;
use crate::exit::{CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let id = checked_sensor_id(args.base_id, args.sensor)
        .map_err(|err| CliError::usage(format!("sensor {}: {err}", args.sensor)))?;
    let frame = encode_reading(id, &SensorReading::new(args.level, args.temperature));

    let config = EmulatorConfig {
        base_id: args.base_id,
        channel_count: args.sensor + 1,
        ..EmulatorConfig::default()
    };
    let input = ChannelParams {
        enabled: true,
        level: args.level,
        temperature: args.temperature,
    };
    print_frame(&frame, &config, Some(&input), format);
    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::USAGE;

    #[test]
    fn overflowing_identifier_is_rejected() {
        let args = EncodeArgs {
            sensor: 0,
            level: 0.5,
            temperature: 20,
            base_id: dutem_frame::EXTENDED_ID_MAX,
        };
        let err = run(args, OutputFormat::Raw).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn huge_sensor_index_is_rejected() {
        let args = EncodeArgs {
            sensor: usize::MAX,
            level: 0.5,
            temperature: 20,
            base_id: dutem_frame::DEFAULT_BASE_ID,
        };
        let err = run(args, OutputFormat::Raw).unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
