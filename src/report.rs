//! Final report rendering.
//!
//! ```text
//! driver_trip,prob
//! 1_1,1
//! 1_2,0
//! ```
//!
//! `0` marks a false trip, `1` a genuine one. The header is written once per
//! report and the last line has no trailing newline. The same verdicts can
//! also be written as JSON for downstream tooling.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::aggregate::DriverVerdicts;
use crate::error::{FalseTripError, Result};
use crate::Verdict;

pub const HEADER: &str = "driver_trip,prob";
const LINE_DELIM: &str = "\n";
const FALSE_TRIP_SIGN: &str = "0";
const TRUE_TRIP_SIGN: &str = "1";

/// Streams report lines to any writer.
///
/// The writer owns the "header once" state, so drivers can be appended one
/// at a time from any stage without coordinating.
pub struct ReportWriter<W: Write> {
    out: W,
    started: bool,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            started: false,
        }
    }

    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        if self.started {
            self.out.write_all(LINE_DELIM.as_bytes())?;
        } else {
            self.out.write_all(HEADER.as_bytes())?;
            self.out.write_all(LINE_DELIM.as_bytes())?;
            self.started = true;
        }
        self.out.write_all(line.as_bytes())
    }

    pub fn write_verdict(&mut self, verdict: &Verdict) -> std::io::Result<()> {
        let sign = if verdict.is_false {
            FALSE_TRIP_SIGN
        } else {
            TRUE_TRIP_SIGN
        };
        self.write_line(&format!("{}_{},{}", verdict.driver_id, verdict.trip_id, sign))
    }

    pub fn write_driver(&mut self, driver: &DriverVerdicts) -> std::io::Result<()> {
        for verdict in &driver.verdicts {
            self.write_verdict(verdict)?;
        }
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    ///
    /// A report with no lines still gets its header.
    pub fn finish(mut self) -> std::io::Result<W> {
        if !self.started {
            self.out.write_all(HEADER.as_bytes())?;
            self.started = true;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Verdicts of every driver, drivers in ascending ID order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub drivers: Vec<DriverVerdicts>,
}

impl Report {
    pub fn new(mut drivers: Vec<DriverVerdicts>) -> Self {
        drivers.sort_by(|a, b| a.driver_id.cmp(&b.driver_id));
        Self { drivers }
    }

    pub fn false_count(&self) -> usize {
        self.drivers.iter().map(|d| d.false_count()).sum()
    }

    pub fn trip_count(&self) -> usize {
        self.drivers.iter().map(|d| d.verdicts.len()).sum()
    }

    pub fn write_to<W: Write>(&self, out: W) -> std::io::Result<W> {
        let mut writer = ReportWriter::new(out);
        for driver in &self.drivers {
            writer.write_driver(driver)?;
        }
        writer.finish()
    }

    /// Render the report into a string.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Write the report to `path`, replacing it only once fully written.
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        write_atomically(path, |out| self.write_to(out).map(drop))?;

        info!(
            "[Report] Wrote {} verdicts ({} false) for {} drivers to {}",
            self.trip_count(),
            self.false_count(),
            self.drivers.len(),
            path.display()
        );
        Ok(())
    }

    /// Write the verdicts as pretty-printed JSON, same replace-on-success rule.
    pub fn write_json_to_path(&self, path: &Path) -> Result<()> {
        write_atomically(path, |mut out| {
            serde_json::to_writer_pretty(&mut out, self)?;
            out.flush()
        })?;

        info!("[Report] Wrote JSON verdicts to {}", path.display());
        Ok(())
    }
}

/// Write through a sibling `.tmp` file and rename it over `path`.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(BufWriter<File>) -> std::io::Result<()>,
{
    let tmp_path = temp_path(path);

    let file = File::create(&tmp_path)
        .map_err(|e| FalseTripError::io("creating report", &tmp_path, e))?;
    write(BufWriter::new(file)).map_err(|e| FalseTripError::io("writing report", &tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| FalseTripError::io("moving report", path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
