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
use crate::{Float, PI};
use serde::Serialize;

/// The position of the sun in the sky, in Radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolarPosition {
    /// Angle above the horizon
    pub altitude: Float,

    /// Measured from the North, clockwise (i.e., East is PI/2)
    pub azimuth: Float,
}

/// Solar geometry of a location for a certain day of the year
/// and hour angle.
///
/// The hour angle here is measured from local solar **midnight**, so
/// solar noon happens when it equals `PI`. The declination follows
/// Spencer, J. W. (1971) Fourier series representation of the position
/// of the sun.
#[derive(Debug, Clone)]
pub struct Sun {
    latitude: Float,
    day: usize,
    day_angle: Float,
    declination: Float,
    hour_angle: Float,
    sunrise: Float,
}

impl Sun {
    /// Creates a new `Sun` for a latitude (in Radians), set on the
    /// first day of the year and at `PI/2` hour angle.
    pub fn new(latitude: Float) -> Result<Self> {
        let mut ret = Self {
            latitude: 0.,
            day: 1,
            day_angle: 0.,
            declination: 0.,
            hour_angle: PI / 2.,
            sunrise: 0.,
        };
        ret.set_latitude(latitude)?;
        ret.set_day(1)?;
        Ok(ret)
    }

    /// Sets the day of the year (`1` to `365`). Out of range days
    /// are rejected and the previous day is kept.
    pub fn set_day(&mut self, day: usize) -> Result<()> {
        if !(1..=365).contains(&day) {
            return Err(Error::invalid("day", day, "must be within [1, 365]"));
        }
        self.day = day;
        self.day_angle = 2. * PI * (day - 1) as Float / 365.;
        self.declination = Self::spencer_declination(self.day_angle);
        self.sunrise = Self::sunrise_hour_angle(self.latitude, self.declination);
        Ok(())
    }

    /// Sets the latitude, in Radians.
    pub fn set_latitude(&mut self, latitude: Float) -> Result<()> {
        if !(-PI / 2. ..=PI / 2.).contains(&latitude) {
            return Err(Error::invalid(
                "latitude",
                latitude,
                "must be within [-PI/2, PI/2] Radians",
            ));
        }
        self.latitude = latitude;
        self.sunrise = Self::sunrise_hour_angle(self.latitude, self.declination);
        Ok(())
    }

    /// Sets the hour angle (in Radians, measured from solar midnight).
    ///
    /// The value is always stored. The return value tells whether the sun
    /// is up at that hour angle... callers are free to ignore it, and the
    /// altitude will just be negative.
    pub fn set_hour_angle(&mut self, hour_angle: Float) -> bool {
        self.hour_angle = hour_angle;
        hour_angle >= self.sunrise && hour_angle <= self.sunset()
    }

    /// The day of the year
    pub fn day(&self) -> usize {
        self.day
    }

    /// `2PI(day - 1)/365`
    pub fn day_angle(&self) -> Float {
        self.day_angle
    }

    /// The latitude, in Radians
    pub fn latitude(&self) -> Float {
        self.latitude
    }

    /// The solar declination, in Radians
    pub fn declination(&self) -> Float {
        self.declination
    }

    /// The current hour angle, in Radians
    pub fn hour_angle(&self) -> Float {
        self.hour_angle
    }

    /// The hour angle of sunrise. It is `0` when the sun never sets
    /// and `PI` when it never rises.
    pub fn sunrise(&self) -> Float {
        self.sunrise
    }

    /// The hour angle of sunset
    pub fn sunset(&self) -> Float {
        2. * PI - self.sunrise
    }

    /// Calculates the altitude and azimuth of the sun
    pub fn position(&self) -> SolarPosition {
        let (sin_lat, cos_lat) = self.latitude.sin_cos();
        let (sin_decl, cos_decl) = self.declination.sin_cos();

        let altitude = (sin_lat * sin_decl - cos_lat * cos_decl * self.hour_angle.cos())
            .clamp(-1., 1.)
            .asin();

        // Round-off can push this a bit out of [-1, 1]
        let aux = (sin_decl - sin_lat * altitude.sin()) / (cos_lat * altitude.cos());
        let azimuth = if aux.is_nan() || aux > 1. {
            0.
        } else if aux < -1. {
            PI
        } else if self.hour_angle.rem_euclid(2. * PI) < PI {
            aux.acos()
        } else {
            2. * PI - aux.acos()
        };

        SolarPosition { altitude, azimuth }
    }

    /// The number of hours to add to the clock time in order to get
    /// the apparent solar time. Longitude and standard meridian are
    /// in Radians.
    pub fn solar_time_offset(&self, longitude: Float, meridian: Float) -> Float {
        let d = self.day_angle;
        // minutes
        let equation_of_time = 229.2
            * (0.000075 + 0.001868 * d.cos()
                - 0.032077 * d.sin()
                - 0.014615 * (2. * d).cos()
                - 0.04089 * (2. * d).sin());

        (-4. * (longitude - meridian).to_degrees() + equation_of_time) / 60.
    }

    #[inline(always)]
    fn spencer_declination(day_angle: Float) -> Float {
        let d = day_angle;
        0.006918 - 0.399912 * d.cos() + 0.070257 * d.sin() - 0.006758 * (2. * d).cos()
            + 0.000907 * (2. * d).sin()
            - 0.002697 * (3. * d).cos()
            + 0.00148 * (3. * d).sin()
    }

    #[inline(always)]
    fn sunrise_hour_angle(latitude: Float, declination: Float) -> Float {
        let x = latitude.tan() * declination.tan();
        if x >= 1. {
            0.
        } else if x <= -1. {
            PI
        } else {
            x.acos()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_declination_first_day() {
        let sun = Sun::new(0.9).unwrap();
        assert_abs_diff_eq!(sun.declination(), -0.402449, epsilon = 1e-9);
        assert_eq!(sun.day(), 1);
    }

    #[test]
    fn test_set_day_out_of_range() {
        let mut sun = Sun::new(0.9).unwrap();
        sun.set_day(100).unwrap();
        let decl = sun.declination();

        assert!(sun.set_day(0).is_err());
        assert!(sun.set_day(366).is_err());
        assert_eq!(sun.day(), 100);
        assert_eq!(sun.declination(), decl);

        // Both ends of the year work
        sun.set_day(1).unwrap();
        sun.set_day(365).unwrap();
        assert!((0. ..=PI).contains(&sun.sunrise()));
    }

    #[test]
    fn test_set_latitude_out_of_range() {
        assert!(Sun::new(2.).is_err());
        let mut sun = Sun::new(-0.3).unwrap();
        assert!(sun.set_latitude(-1.6).is_err());
        assert_eq!(sun.latitude(), -0.3);
    }

    #[test]
    fn test_altitude_at_sunrise() {
        for lat_deg in -89..=89 {
            let mut sun = Sun::new((lat_deg as Float).to_radians()).unwrap();
            for day in 1..=365 {
                sun.set_day(day).unwrap();
                let sunrise = sun.sunrise();
                assert!((0. ..=PI).contains(&sunrise));

                if sunrise > 0. && sunrise < PI {
                    sun.set_hour_angle(sunrise);
                    let pos = sun.position();
                    assert_abs_diff_eq!(pos.altitude, 0.0, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_polar_day_and_night() {
        let mut sun = Sun::new((80. as Float).to_radians()).unwrap();
        sun.set_day(172).unwrap();
        assert_eq!(sun.sunrise(), 0.);
        // Midnight sun
        assert!(sun.set_hour_angle(0.));
        assert!(sun.position().altitude > 0.);

        sun.set_day(355).unwrap();
        assert_eq!(sun.sunrise(), PI);
        assert!(!sun.set_hour_angle(0.5));
        sun.set_hour_angle(PI);
        assert!(sun.position().altitude < 0.);

        // Poles are valid latitudes
        assert!(Sun::new(PI / 2.).is_ok());
        assert!(Sun::new(-PI / 2.).is_ok());
    }

    #[test]
    fn test_sun_up() {
        let mut sun = Sun::new((51.7 as Float).to_radians()).unwrap();
        sun.set_day(80).unwrap();
        assert!(sun.set_hour_angle(PI));
        assert!(!sun.set_hour_angle(0.1));
        // Stored anyway
        assert_eq!(sun.hour_angle(), 0.1);
    }

    #[test]
    fn test_noon_position() {
        let lat = (51.7 as Float).to_radians();
        let mut sun = Sun::new(lat).unwrap();
        sun.set_day(172).unwrap();
        sun.set_hour_angle(PI);
        let pos = sun.position();
        assert_abs_diff_eq!(
            pos.altitude,
            PI / 2. - lat + sun.declination(),
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(pos.azimuth, PI, epsilon = 1e-6);
    }

    #[test]
    fn test_morning_and_afternoon_position() {
        let lat = (40. as Float).to_radians();
        let mut sun = Sun::new(lat).unwrap();
        sun.set_day(1).unwrap();
        let decl = sun.declination();

        for hour_angle in [3. * PI / 4., 5. * PI / 4.] {
            sun.set_hour_angle(hour_angle);
            let pos = sun.position();

            // Hour angle from noon
            let w = hour_angle - PI;
            let cos_zenith = lat.sin() * decl.sin() + lat.cos() * decl.cos() * w.cos();
            let expected_alt = PI / 2. - cos_zenith.acos();
            let expected_az = (-w.sin() * decl.cos())
                .atan2(decl.sin() * lat.cos() - decl.cos() * lat.sin() * w.cos())
                .rem_euclid(2. * PI);

            assert_abs_diff_eq!(pos.altitude, expected_alt, epsilon = 1e-6);
            assert_abs_diff_eq!(pos.azimuth, expected_az, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_hour_angle_wraps() {
        let mut sun = Sun::new((51.7 as Float).to_radians()).unwrap();
        sun.set_day(100).unwrap();
        sun.set_hour_angle(PI / 2.);
        let morning = sun.position();
        sun.set_hour_angle(PI / 2. + 2. * PI);
        let wrapped = sun.position();
        assert_abs_diff_eq!(morning.altitude, wrapped.altitude, epsilon = 1e-9);
        assert_abs_diff_eq!(morning.azimuth, wrapped.azimuth, epsilon = 1e-9);
        assert!(morning.azimuth < PI);
    }

    #[test]
    fn test_solar_time_offset() {
        let sun = Sun::new(0.5).unwrap();
        // Only the equation of time
        assert_abs_diff_eq!(sun.solar_time_offset(0.3, 0.3), -0.04840704, epsilon = 1e-8);
        // Plus an hour for every 15 degrees
        assert_abs_diff_eq!(
            sun.solar_time_offset((15. as Float).to_radians(), 0.),
            -1.04840704,
            epsilon = 1e-8
        );
    }
}
