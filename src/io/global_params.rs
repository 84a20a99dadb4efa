//! VIC global parameter file.
//!
//! # File Format
//!
//! ```text
//! # Simulation dates
//! STARTYEAR   1950
//! STARTMONTH  1
//! STARTDAY    1
//! SNOW_BAND   12 /data/snb.txt
//! VEGPARAM    /data/vpf.txt     # band-specific tiles
//! ```
//!
//! Every line is kept so the file can be rewritten with only the edited
//! values changed. Trailing `#` comments are split off the value.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

/// Error type for global parameter files.
#[derive(Debug, Error)]
pub enum GlobalParamsError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Parse error with line number
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Required key absent
    #[error("Missing key {0}")]
    MissingKey(String),

    /// Value present but not usable
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    /// Year/month/day triple is not a calendar date
    #[error("Invalid date {year}-{month}-{day} for {prefix}")]
    InvalidDate {
        prefix: String,
        year: i32,
        month: u32,
        day: u32,
    },
}

#[derive(Clone, Debug, PartialEq)]
enum GlobalLine {
    /// Blank or comment-only line, kept verbatim
    Verbatim(String),
    Entry {
        key: String,
        value: String,
        comment: Option<String>,
    },
}

/// Contents of a VIC global parameter file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalParams {
    lines: Vec<GlobalLine>,
}

/// Read a global parameter file.
pub fn read_global_params_file(path: &Path) -> Result<GlobalParams, GlobalParamsError> {
    let content = fs::read_to_string(path)?;
    parse_global_params(&content)
}

/// Parse global parameters from a string.
pub fn parse_global_params(content: &str) -> Result<GlobalParams, GlobalParamsError> {
    let mut lines = Vec::new();
    for (line_idx, raw) in content.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            lines.push(GlobalLine::Verbatim(raw.to_string()));
            continue;
        }

        let (body, comment) = match trimmed.split_once('#') {
            Some((body, comment)) => (body.trim(), Some(comment.trim().to_string())),
            None => (trimmed, None),
        };
        let (key, value) = match body.split_once(char::is_whitespace) {
            Some((key, value)) => (key, value.trim()),
            None => (body, ""),
        };
        if key.is_empty() {
            return Err(GlobalParamsError::ParseError {
                line: line_idx + 1,
                message: "Missing key".into(),
            });
        }
        lines.push(GlobalLine::Entry {
            key: key.to_string(),
            value: value.to_string(),
            comment,
        });
    }
    Ok(GlobalParams { lines })
}

impl GlobalParams {
    /// Value of the first occurrence of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|l| match l {
            GlobalLine::Entry { key: k, value, .. } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Value of `key`, or `MissingKey`.
    pub fn require(&self, key: &str) -> Result<&str, GlobalParamsError> {
        self.get(key)
            .ok_or_else(|| GlobalParamsError::MissingKey(key.to_string()))
    }

    /// Replace the first occurrence of `key`, appending it if absent.
    pub fn set(&mut self, key: &str, new_value: impl Into<String>) {
        let new_value = new_value.into();
        for line in &mut self.lines {
            if let GlobalLine::Entry { key: k, value, .. } = line {
                if k == key {
                    *value = new_value;
                    return;
                }
            }
        }
        self.lines.push(GlobalLine::Entry {
            key: key.to_string(),
            value: new_value,
            comment: None,
        });
    }

    fn parse_value<T: std::str::FromStr>(&self, key: &str) -> Result<T, GlobalParamsError> {
        let value = self.require(key)?;
        value.parse().map_err(|_| GlobalParamsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Date stored as `{prefix}YEAR`, `{prefix}MONTH`, `{prefix}DAY`.
    pub fn date(&self, prefix: &str) -> Result<NaiveDate, GlobalParamsError> {
        let year: i32 = self.parse_value(&format!("{}YEAR", prefix))?;
        let month: u32 = self.parse_value(&format!("{}MONTH", prefix))?;
        let day: u32 = self.parse_value(&format!("{}DAY", prefix))?;
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| GlobalParamsError::InvalidDate {
            prefix: prefix.to_string(),
            year,
            month,
            day,
        })
    }

    /// Store a date under `{prefix}YEAR`, `{prefix}MONTH`, `{prefix}DAY`.
    pub fn set_date(&mut self, prefix: &str, date: NaiveDate) {
        use chrono::Datelike;
        self.set(&format!("{}YEAR", prefix), date.year().to_string());
        self.set(&format!("{}MONTH", prefix), date.month().to_string());
        self.set(&format!("{}DAY", prefix), date.day().to_string());
    }

    pub fn start_date(&self) -> Result<NaiveDate, GlobalParamsError> {
        self.date("START")
    }

    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.set_date("START", date)
    }

    pub fn end_date(&self) -> Result<NaiveDate, GlobalParamsError> {
        self.date("END")
    }

    pub fn set_end_date(&mut self, date: NaiveDate) {
        self.set_date("END", date)
    }

    /// Date the state file is written.
    pub fn state_date(&self) -> Result<NaiveDate, GlobalParamsError> {
        self.date("STATE")
    }

    pub fn set_state_date(&mut self, date: NaiveDate) {
        self.set_date("STATE", date)
    }

    /// First day of glacier mass accumulation.
    pub fn glacier_accum_start(&self) -> Result<NaiveDate, GlobalParamsError> {
        self.date("GLACIER_ACCUM_START_")
    }

    /// State file path prefix.
    pub fn statename(&self) -> Result<&str, GlobalParamsError> {
        self.require("STATENAME")
    }

    pub fn vegparam(&self) -> Result<PathBuf, GlobalParamsError> {
        self.require("VEGPARAM").map(PathBuf::from)
    }

    pub fn set_vegparam(&mut self, path: &Path) {
        self.set("VEGPARAM", path.display().to_string())
    }

    /// Number of band slots and snow-band file path, from `SNOW_BAND N path`.
    pub fn snow_band(&self) -> Result<(usize, PathBuf), GlobalParamsError> {
        let value = self.require("SNOW_BAND")?;
        let invalid = || GlobalParamsError::InvalidValue {
            key: "SNOW_BAND".into(),
            value: value.to_string(),
        };
        let (count, path) = value.split_once(char::is_whitespace).ok_or_else(invalid)?;
        let count: usize = count.parse().map_err(|_| invalid())?;
        Ok((count, PathBuf::from(path.trim())))
    }

    pub fn set_snow_band(&mut self, num_bands: usize, path: &Path) {
        self.set("SNOW_BAND", format!("{} {}", num_bands, path.display()))
    }

    pub fn state_format(&self) -> Option<&str> {
        self.get("STATE_FORMAT")
    }

    pub fn init_state(&self) -> Option<&str> {
        self.get("INIT_STATE")
    }

    pub fn set_init_state(&mut self, path: &Path) {
        self.set("INIT_STATE", path.display().to_string())
    }

    /// Write the parameters to a file.
    pub fn write(&self, path: &Path) -> Result<(), GlobalParamsError> {
        let mut writer = BufWriter::new(File::create(path)?);
        write!(writer, "{}", self)?;
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for GlobalParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                GlobalLine::Verbatim(text) => writeln!(f, "{}", text)?,
                GlobalLine::Entry {
                    key,
                    value,
                    comment,
                } => {
                    write!(f, "{}\t{}", key, value)?;
                    if let Some(c) = comment {
                        write!(f, "\t# {}", c)?;
                    }
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
# Simulation dates
STARTYEAR\t1950
STARTMONTH\t1
STARTDAY\t1
ENDYEAR 1995
ENDMONTH 12
ENDDAY 31
GLACIER_ACCUM_START_YEAR 1955
GLACIER_ACCUM_START_MONTH 10
GLACIER_ACCUM_START_DAY 1

STATENAME /tmp/state/vic_state
SNOW_BAND 12 /data/snb.txt
VEGPARAM /data/vpf.txt   # band-specific tiles
STATE_FORMAT NETCDF
";

    #[test]
    fn test_dates() {
        let gp = parse_global_params(SAMPLE).unwrap();
        assert_eq!(gp.start_date().unwrap(), NaiveDate::from_ymd_opt(1950, 1, 1).unwrap());
        assert_eq!(gp.end_date().unwrap(), NaiveDate::from_ymd_opt(1995, 12, 31).unwrap());
        assert_eq!(
            gp.glacier_accum_start().unwrap(),
            NaiveDate::from_ymd_opt(1955, 10, 1).unwrap()
        );
        assert!(matches!(gp.state_date(), Err(GlobalParamsError::MissingKey(_))));
    }

    #[test]
    fn test_typed_values() {
        let gp = parse_global_params(SAMPLE).unwrap();
        assert_eq!(gp.statename().unwrap(), "/tmp/state/vic_state");
        assert_eq!(gp.vegparam().unwrap(), PathBuf::from("/data/vpf.txt"));
        assert_eq!(gp.snow_band().unwrap(), (12, PathBuf::from("/data/snb.txt")));
        assert_eq!(gp.state_format(), Some("NETCDF"));
        assert_eq!(gp.init_state(), None);
    }

    #[test]
    fn test_invalid_date() {
        let gp = parse_global_params("STARTYEAR 1950\nSTARTMONTH 2\nSTARTDAY 30\n").unwrap();
        assert!(matches!(gp.start_date(), Err(GlobalParamsError::InvalidDate { .. })));
    }

    #[test]
    fn test_set_and_write() {
        let mut gp = parse_global_params(SAMPLE).unwrap();
        gp.set_start_date(NaiveDate::from_ymd_opt(1956, 10, 1).unwrap());
        gp.set_state_date(NaiveDate::from_ymd_opt(1957, 9, 30).unwrap());
        gp.set_snow_band(12, Path::new("/tmp/snb_temp.txt"));
        gp.set_init_state(Path::new("/tmp/state/vic_state_19570930"));

        let file = NamedTempFile::new().unwrap();
        gp.write(file.path()).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.starts_with("# Simulation dates\n"));
        assert!(text.contains("# band-specific tiles"));

        let back = read_global_params_file(file.path()).unwrap();
        assert_eq!(back.start_date().unwrap(), NaiveDate::from_ymd_opt(1956, 10, 1).unwrap());
        assert_eq!(back.state_date().unwrap(), NaiveDate::from_ymd_opt(1957, 9, 30).unwrap());
        assert_eq!(back.snow_band().unwrap().1, PathBuf::from("/tmp/snb_temp.txt"));
        assert_eq!(back.init_state(), Some("/tmp/state/vic_state_19570930"));
        assert_eq!(back.vegparam().unwrap(), PathBuf::from("/data/vpf.txt"));
    }
}
