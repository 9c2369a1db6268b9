//! Output formatting and logging utilities

use color_eyre::eyre::{Result, WrapErr};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    filter::LevelFilter, fmt::format::Writer, fmt::layer, fmt::time::FormatTime,
    layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let duration = StdSystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Setup output logging to file or stdout
pub fn setup_output(output_path: Option<&String>, verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    match output_path {
        Some(path) => {
            let log = File::create(path)
                .wrap_err_with(|| format!("Could not create output file: {}", path))?;
            let file_layer = layer()
                .with_writer(log)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(false)
                .with_filter(level);
            Registry::default().with(file_layer).init();
            info!("Output will be written to: {}", path);
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true)
                .with_filter(level);
            Registry::default().with(stdout_layer).init();
            info!("Output will be printed to stdout");
        }
    }
    Ok(())
}

/// One line of the results table.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEntry {
    pub key: String,
    pub coefficient: f64,
    pub energy: f64,
}

/// Print the method series and its weighted total to a writer
pub fn write_series_table<W: Write>(
    writer: &mut W,
    entries: &[SeriesEntry],
    total: f64,
) -> Result<()> {
    writeln!(writer, "{:<20} {:>12} {:>20}", "Method", "Coefficient", "Energy (au)")?;
    for entry in entries {
        writeln!(
            writer,
            "{:<20} {:>12.6} {:>20.10}",
            entry.key, entry.coefficient, entry.energy
        )?;
    }
    writeln!(writer, "{:<20} {:>12} {:>20.10}", "Total", "", total)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_table() {
        let entries = vec![
            SeriesEntry {
                key: "SCF".to_string(),
                coefficient: 1.0,
                energy: -1.1167,
            },
            SeriesEntry {
                key: "CoreGuess".to_string(),
                coefficient: -0.5,
                energy: -3.0,
            },
        ];
        let mut out = Vec::new();
        write_series_table(&mut out, &entries, 0.3833).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("SCF"));
        assert!(lines[2].contains("-0.500000"));
        assert!(lines[3].starts_with("Total"));
        assert!(lines[3].ends_with("0.3833000000"));
    }
}
