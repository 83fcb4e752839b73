/*
MIT License
Copyright (c) 2021 Germán Molina
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use crate::error::{Error, Result};
use crate::Float;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// The number of hourly samples in a (non-leap) year
pub const N_HOURS: usize = 8760;

/// Something that can tell us how much solar radiation (W/m2) arrives
/// to a horizontal surface at a certain `hour` (i.e., `0.` to `24.`)
/// of a certain `day` (i.e., `1` to `365`).
///
/// A `None` means that the data is unavailable for that time.
pub trait ClimateSource {
    /// Direct (i.e., beam) horizontal irradiance
    fn direct_radiation(&self, hour: Float, day: usize) -> Option<Float>;

    /// Diffuse horizontal irradiance
    fn diffuse_radiation(&self, hour: Float, day: usize) -> Option<Float>;

    /// Global horizontal irradiance
    fn global_radiation(&self, hour: Float, day: usize) -> Option<Float>;
}

/// The columns contained in a climate file
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum ClimateFormat {
    /// Two columns: Global horizontal and Diffuse horizontal irradiance
    #[default]
    GlobalDiffuse,

    /// Two columns: Direct horizontal and Diffuse horizontal irradiance
    DirectDiffuse,

    /// An EnergyPlus Weather file
    Epw,
}

/// The part of the year (and of each day) to load from a climate
/// file. Everything outside of it is read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    /// Hour of the day (`0` to `24`) at which the period starts
    pub start_time: Float,
    /// Hour of the day (`0` to `24`) at which the period ends
    pub end_time: Float,
    /// Month (`1` to `12`) at which the period starts
    pub start_month: u32,
    /// Day of the month at which the period starts
    pub start_day: u32,
    /// Month (`1` to `12`) at which the period ends (inclusive)
    pub end_month: u32,
    /// Day of the month at which the period ends (inclusive)
    pub end_day: u32,
}

impl Default for AnalysisPeriod {
    fn default() -> Self {
        Self {
            start_time: 0.,
            end_time: 24.,
            start_month: 1,
            start_day: 1,
            end_month: 12,
            end_day: 31,
        }
    }
}

impl AnalysisPeriod {
    /// Checks that times are within `[0, 24]`, that the period
    /// ends after it starts, and that dates exist.
    pub fn validate(&self) -> Result<()> {
        if !(0. ..=24.).contains(&self.start_time) {
            return Err(Error::invalid(
                "start_time",
                self.start_time,
                "must be within [0, 24]",
            ));
        }
        if !(0. ..=24.).contains(&self.end_time) {
            return Err(Error::invalid(
                "end_time",
                self.end_time,
                "must be within [0, 24]",
            ));
        }
        if self.end_time <= self.start_time {
            return Err(Error::invalid(
                "end_time",
                self.end_time,
                "must be greater than the start time",
            ));
        }
        Self::day_of_year(self.start_month, self.start_day)?;
        Self::day_of_year(self.end_month, self.end_day)?;
        Ok(())
    }

    /// Zero-based day of the year of a month and day, in a non-leap year.
    pub fn day_of_year(month: u32, day: u32) -> Result<usize> {
        NaiveDate::from_ymd_opt(2001, month, day)
            .map(|d| d.ordinal0() as usize)
            .ok_or_else(|| {
                Error::invalid(
                    "date",
                    format!("{}/{}", month, day),
                    "not a date of a non-leap year",
                )
            })
    }

    /// Tells which of the 8760 hourly slots of the year fall within
    /// the period. Slot `h` of a day covers the hour from `h` to `h+1`.
    ///
    /// When the start date comes after the end date, the period wraps
    /// around the new year (e.g., a winter from November to February).
    pub fn mask(&self) -> Result<Vec<bool>> {
        self.validate()?;
        let first = Self::day_of_year(self.start_month, self.start_day)?;
        let last = Self::day_of_year(self.end_month, self.end_day)?;

        let ret = (0..N_HOURS)
            .map(|slot| {
                let day = slot / 24;
                let hour = (slot % 24) as Float;
                let in_time = hour >= self.start_time && hour + 1. <= self.end_time;
                let in_date = if first <= last {
                    day >= first && day <= last
                } else {
                    day >= first || day <= last
                };
                in_time && in_date
            })
            .collect();
        Ok(ret)
    }
}

/// A year of hourly horizontal irradiance. Sample `i` is recorded at
/// half past hour `i % 24` of day `i / 24 + 1`, and queries in between
/// are linearly interpolated.
#[derive(Debug, Clone)]
pub struct ClimateSeries {
    global: Vec<Float>,
    diffuse: Vec<Float>,
}

impl ClimateSeries {
    /// Builds a series from global and diffuse horizontal irradiance.
    /// Both need exactly 8760 samples.
    pub fn new(global: Vec<Float>, diffuse: Vec<Float>) -> Result<Self> {
        for (name, v) in [("global", &global), ("diffuse", &diffuse)] {
            if v.len() != N_HOURS {
                return Err(Error::Climate(format!(
                    "{} radiation has {} samples... expecting {}",
                    name,
                    v.len(),
                    N_HOURS
                )));
            }
        }
        Ok(Self { global, diffuse })
    }

    /// Builds a series from direct and diffuse horizontal irradiance
    pub fn from_direct_diffuse(direct: Vec<Float>, diffuse: Vec<Float>) -> Result<Self> {
        if direct.len() != diffuse.len() {
            return Err(Error::Climate(format!(
                "direct radiation has {} samples, but diffuse has {}",
                direct.len(),
                diffuse.len()
            )));
        }
        let global = direct
            .iter()
            .zip(diffuse.iter())
            .map(|(dir, dif)| dir + dif)
            .collect();
        Self::new(global, diffuse)
    }

    /// Reads a climate file
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        format: ClimateFormat,
        period: &AnalysisPeriod,
    ) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading climate file '{}' as {:?}", path.display(), format);
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format, period)
    }

    /// Parses the contents of a climate file. Only the hours within `period`
    /// are kept; the rest are set to zero.
    pub fn parse(content: &str, format: ClimateFormat, period: &AnalysisPeriod) -> Result<Self> {
        let mask = period.mask()?;

        let mut global = vec![0.0; N_HOURS];
        let mut diffuse = vec![0.0; N_HOURS];

        let n_header = match format {
            ClimateFormat::Epw => 8,
            _ => 0,
        };

        let mut n = 0;
        let lines = content
            .lines()
            .skip(n_header)
            .filter(|ln| !ln.trim().is_empty())
            .take(N_HOURS);
        for (i, line) in lines.enumerate() {
            let line_n = i + n_header + 1;
            let (a, b) = match format {
                ClimateFormat::Epw => {
                    let fields: Vec<&str> = line.split(',').collect();
                    if fields.len() < 16 {
                        return Err(Error::Climate(format!(
                            "line {} has {} fields... an EPW record needs at least 16",
                            line_n,
                            fields.len()
                        )));
                    }
                    (
                        parse_field(Some(fields[13]), line_n)?,
                        parse_field(Some(fields[15]), line_n)?,
                    )
                }
                _ => {
                    let mut fields = line.split_whitespace();
                    (
                        parse_field(fields.next(), line_n)?,
                        parse_field(fields.next(), line_n)?,
                    )
                }
            };

            if mask[i] {
                (global[i], diffuse[i]) = match format {
                    ClimateFormat::DirectDiffuse => (a + b, b),
                    _ => (a, b),
                };
            }
            n += 1;
        }

        if n < N_HOURS {
            return Err(Error::Climate(format!(
                "found {} hourly records... expecting {}",
                n, N_HOURS
            )));
        }
        debug!(
            "Loaded {} hours, {} of them within the analysis period",
            n,
            mask.iter().filter(|x| **x).count()
        );

        Ok(Self { global, diffuse })
    }

    /// Linear interpolation between the two samples around
    /// `hour` of `day`.
    fn interpolate<F: Fn(usize) -> Float>(&self, hour: Float, day: usize, sample: F) -> Option<Float> {
        if day == 0 || day > 365 {
            return None;
        }
        let whole = hour.floor();
        let centre = if hour - whole >= 0.5 {
            whole + 0.5
        } else {
            whole - 0.5
        };
        let index = (day as i64 - 1) * 24 + (centre - 0.5) as i64;
        if index < 0 || index as usize >= N_HOURS {
            return None;
        }
        let index = index as usize;
        let ratio = hour - centre;

        let this = sample(index);
        // the last half-hour of the year has nothing after it
        let next = if index + 1 < N_HOURS {
            sample(index + 1)
        } else {
            this
        };
        Some(this + (next - this) * ratio)
    }
}

impl ClimateSource for ClimateSeries {
    fn direct_radiation(&self, hour: Float, day: usize) -> Option<Float> {
        self.interpolate(hour, day, |i| self.global[i] - self.diffuse[i])
    }

    fn diffuse_radiation(&self, hour: Float, day: usize) -> Option<Float> {
        self.interpolate(hour, day, |i| self.diffuse[i])
    }

    fn global_radiation(&self, hour: Float, day: usize) -> Option<Float> {
        self.interpolate(hour, day, |i| self.global[i])
    }
}

fn parse_field(field: Option<&str>, line: usize) -> Result<Float> {
    let field = field
        .ok_or_else(|| Error::Climate(format!("line {} has too few columns", line)))?
        .trim();
    field
        .parse::<Float>()
        .map_err(|e| Error::Climate(format!("line {}: cannot parse '{}' ({})", line, field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp() -> ClimateSeries {
        let global = (0..N_HOURS).map(|i| i as Float).collect();
        ClimateSeries::new(global, vec![0.0; N_HOURS]).unwrap()
    }

    #[test]
    fn test_wrong_length() {
        assert!(ClimateSeries::new(vec![0.; 100], vec![0.; N_HOURS]).is_err());
        assert!(ClimateSeries::from_direct_diffuse(vec![0.; N_HOURS], vec![0.; 10]).is_err());
    }

    #[test]
    fn test_interpolation() {
        let c = ramp();
        assert_abs_diff_eq!(c.global_radiation(0.5, 1).unwrap(), 0.0);
        assert_abs_diff_eq!(c.global_radiation(1.0, 1).unwrap(), 0.5);
        assert_abs_diff_eq!(c.global_radiation(1.5, 1).unwrap(), 1.0);
        assert_abs_diff_eq!(c.global_radiation(3.25, 1).unwrap(), 2.75);
        assert_abs_diff_eq!(c.global_radiation(0.5, 2).unwrap(), 24.0);
        // Interpolates across midnight
        assert_abs_diff_eq!(c.global_radiation(0.2, 2).unwrap(), 23.7, epsilon = 1e-9);
    }

    #[test]
    fn test_boundaries() {
        let c = ramp();
        // Nothing before the first half-hour
        assert!(c.global_radiation(0.2, 1).is_none());
        assert!(c.diffuse_radiation(0.49, 1).is_none());

        assert!(c.global_radiation(0.5, 1).is_some());
        assert_abs_diff_eq!(c.global_radiation(23.5, 365).unwrap(), 8759.0);
        // Held after the last sample
        assert_abs_diff_eq!(c.global_radiation(23.9, 365).unwrap(), 8759.0);

        assert!(c.global_radiation(12., 0).is_none());
        assert!(c.global_radiation(0.2, 366).is_none());
    }

    #[test]
    fn test_direct_is_interpolated_after_subtracting() {
        let global = vec![200.; N_HOURS];
        let diffuse = (0..N_HOURS)
            .map(|i| if i % 2 == 0 { 100. } else { 50. })
            .collect();
        let c = ClimateSeries::new(global, diffuse).unwrap();
        assert_abs_diff_eq!(c.direct_radiation(0.5, 1).unwrap(), 100.);
        assert_abs_diff_eq!(c.direct_radiation(1.5, 1).unwrap(), 150.);
        assert_abs_diff_eq!(c.direct_radiation(1.0, 1).unwrap(), 125.);
        assert_abs_diff_eq!(c.diffuse_radiation(1.0, 1).unwrap(), 75.);
    }

    #[test]
    fn test_parse_two_columns() {
        let content = "300 100\n".repeat(N_HOURS);
        let period = AnalysisPeriod::default();

        let c = ClimateSeries::parse(&content, ClimateFormat::GlobalDiffuse, &period).unwrap();
        assert_abs_diff_eq!(c.global_radiation(12.5, 100).unwrap(), 300.);
        assert_abs_diff_eq!(c.direct_radiation(12.5, 100).unwrap(), 200.);

        let c = ClimateSeries::parse(&content, ClimateFormat::DirectDiffuse, &period).unwrap();
        assert_abs_diff_eq!(c.global_radiation(12.5, 100).unwrap(), 400.);
        assert_abs_diff_eq!(c.direct_radiation(12.5, 100).unwrap(), 300.);
        assert_abs_diff_eq!(c.diffuse_radiation(12.5, 100).unwrap(), 100.);
    }

    #[test]
    fn test_parse_errors() {
        let period = AnalysisPeriod::default();
        let short = "300 100\n".repeat(100);
        assert!(ClimateSeries::parse(&short, ClimateFormat::GlobalDiffuse, &period).is_err());

        let mut bad = "300 100\n".repeat(N_HOURS);
        bad.insert_str(0, "abc 100\n");
        assert!(ClimateSeries::parse(&bad, ClimateFormat::GlobalDiffuse, &period).is_err());

        let one_column = "300\n".repeat(N_HOURS);
        assert!(ClimateSeries::parse(&one_column, ClimateFormat::GlobalDiffuse, &period).is_err());
    }

    fn epw_content() -> String {
        let mut content = String::new();
        for i in 0..8 {
            content.push_str(&format!("HEADER LINE {}\n", i));
        }
        for i in 0..N_HOURS {
            let mut fields = vec!["0".to_string(); 35];
            fields[0] = "2001".to_string();
            fields[3] = format!("{}", i % 24 + 1);
            fields[13] = "450".to_string();
            fields[14] = "999".to_string();
            fields[15] = "150".to_string();
            content.push_str(&fields.join(","));
            content.push('\n');
        }
        content
    }

    #[test]
    fn test_parse_epw() {
        let c = ClimateSeries::parse(
            &epw_content(),
            ClimateFormat::Epw,
            &AnalysisPeriod::default(),
        )
        .unwrap();
        assert_abs_diff_eq!(c.global_radiation(10.5, 20).unwrap(), 450.);
        assert_abs_diff_eq!(c.diffuse_radiation(10.5, 20).unwrap(), 150.);
        assert_abs_diff_eq!(c.direct_radiation(10.5, 20).unwrap(), 300.);
    }

    #[test]
    fn test_period_hours() {
        let period = AnalysisPeriod {
            start_time: 8.,
            end_time: 17.,
            ..AnalysisPeriod::default()
        };
        let c = ClimateSeries::parse(&epw_content(), ClimateFormat::Epw, &period).unwrap();
        assert_abs_diff_eq!(c.diffuse_radiation(7.5, 3).unwrap(), 0.);
        assert_abs_diff_eq!(c.diffuse_radiation(8.5, 3).unwrap(), 150.);
        assert_abs_diff_eq!(c.diffuse_radiation(16.5, 3).unwrap(), 150.);
        assert_abs_diff_eq!(c.diffuse_radiation(17.5, 3).unwrap(), 0.);
    }

    #[test]
    fn test_period_dates_wrap() {
        // November to February
        let period = AnalysisPeriod {
            start_month: 11,
            start_day: 1,
            end_month: 2,
            end_day: 28,
            ..AnalysisPeriod::default()
        };
        let mask = period.mask().unwrap();
        assert!(mask[0]);
        assert!(mask[58 * 24 + 23]); // Feb 28th
        assert!(!mask[59 * 24]); // March 1st
        assert!(!mask[180 * 24 + 12]);
        assert!(mask[304 * 24]); // Nov 1st
        assert!(mask[N_HOURS - 1]);

        let content = "300 100\n".repeat(N_HOURS);
        let c = ClimateSeries::parse(&content, ClimateFormat::GlobalDiffuse, &period).unwrap();
        assert_abs_diff_eq!(c.global_radiation(12.5, 1).unwrap(), 300.);
        assert_abs_diff_eq!(c.global_radiation(12.5, 181).unwrap(), 0.);
    }

    #[test]
    fn test_period_validation() {
        let p = AnalysisPeriod {
            start_time: 10.,
            end_time: 9.,
            ..AnalysisPeriod::default()
        };
        assert!(p.validate().is_err());

        let p = AnalysisPeriod {
            end_time: 25.,
            ..AnalysisPeriod::default()
        };
        assert!(p.validate().is_err());

        let p = AnalysisPeriod {
            end_month: 2,
            end_day: 30,
            ..AnalysisPeriod::default()
        };
        assert!(p.validate().is_err());

        assert!(AnalysisPeriod::default().validate().is_ok());
        assert_eq!(AnalysisPeriod::day_of_year(1, 1).unwrap(), 0);
        assert_eq!(AnalysisPeriod::day_of_year(3, 1).unwrap(), 59);
        assert_eq!(AnalysisPeriod::day_of_year(12, 31).unwrap(), 364);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("climate.dat");
        std::fs::write(&path, "500 120\n".repeat(N_HOURS)).unwrap();

        let c = ClimateSeries::from_file(&path, ClimateFormat::GlobalDiffuse, &AnalysisPeriod::default())
            .unwrap();
        assert_abs_diff_eq!(c.direct_radiation(9.5, 45).unwrap(), 380.);

        let missing = dir.path().join("nope.dat");
        assert!(matches!(
            ClimateSeries::from_file(&missing, ClimateFormat::GlobalDiffuse, &AnalysisPeriod::default()),
            Err(Error::Io(_))
        ));
    }
}
