use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use dutem_emulator::{ChannelParams, EmissionReport, EmulatorConfig};
use dutem_frame::{sensor_index, CanFrame};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    sensor: Option<usize>,
    id: u32,
    id_hex: String,
    extended: bool,
    len: u8,
    data: String,
    level_raw: u16,
    temperature_raw: u8,
    line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<&'a ChannelParams>,
}

/// Print one encoded sensor frame.
pub fn print_frame(
    frame: &CanFrame,
    config: &EmulatorConfig,
    input: Option<&ChannelParams>,
    format: OutputFormat,
) {
    let sensor = sensor_index(config.base_id, frame.id, config.channel_count);
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                sensor,
                id: frame.id,
                id_hex: format!("0x{:08X}", frame.id),
                extended: frame.is_extended(),
                len: frame.len,
                data: hex(frame.payload()),
                level_raw: frame.level_raw(),
                temperature_raw: frame.temperature_raw(),
                line: frame.to_string(),
                input,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SENSOR", "ID", "LEN", "DATA", "LEVEL", "TEMP"])
                .add_row(vec![
                    sensor.map_or_else(|| "-".to_string(), |s| s.to_string()),
                    format!("0x{:08X}", frame.id),
                    frame.len.to_string(),
                    spaced_hex(frame.payload()),
                    format!("{:.1} mm", f64::from(frame.level_raw()) / 10.0),
                    format!(
                        "{} °C",
                        i32::from(frame.temperature_raw()) - dutem_frame::TEMPERATURE_OFFSET
                    ),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "sensor={} id=0x{:08X} len={} data={} level_raw={} temperature_raw={}",
                sensor.map_or_else(|| "-".to_string(), |s| s.to_string()),
                frame.id,
                frame.len,
                spaced_hex(frame.payload()),
                frame.level_raw(),
                frame.temperature_raw()
            );
        }
        OutputFormat::Raw => {
            println!("{frame}");
        }
    }
}

#[derive(Serialize)]
struct RunOutput<'a> {
    config: &'a EmulatorConfig,
    enabled_sensors: Vec<usize>,
    report: &'a EmissionReport,
}

/// Print the summary of a finished emulation run.
pub fn print_report(
    config: &EmulatorConfig,
    enabled_sensors: Vec<usize>,
    report: &EmissionReport,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = RunOutput {
                config,
                enabled_sensors,
                report,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SENSORS", "FRAMES SENT", "BUS ERRORS", "PASSES"])
                .add_row(vec![
                    join(&enabled_sensors),
                    report.frames_sent.to_string(),
                    report.bus_errors.to_string(),
                    report.passes.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Emulation Summary:");
            println!("  Base ID:      0x{:08X}", config.base_id);
            println!("  Sensors:      {}", join(&enabled_sensors));
            println!("  Interval:     {:?}", config.interval);
            println!("  Frames sent:  {}", report.frames_sent);
            println!("  Bus errors:   {}", report.bus_errors);
            println!("  Passes:       {}", report.passes);
        }
        OutputFormat::Raw => {
            println!("{}", report.frames_sent);
        }
    }
}

fn hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02X}")).collect()
}

fn spaced_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join(indices: &[usize]) -> String {
    if indices.is_empty() {
        return "none".to_string();
    }
    indices
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_helpers_format_payload() {
        let data = [0xC4, 0x09, 0x00, 0x1E];
        assert_eq!(hex(&data), "C409001E");
        assert_eq!(spaced_hex(&data), "C4 09 00 1E");
    }

    #[test]
    fn join_lists_sensor_indices() {
        assert_eq!(join(&[]), "none");
        assert_eq!(join(&[0, 3]), "0,3");
    }
}
