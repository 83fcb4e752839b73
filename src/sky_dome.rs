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

use crate::climate::ClimateSource;
use crate::error::{Error, Result};
use crate::perez::{PerezSkyModel, SOLAR_CONSTANT};
use crate::sun::{SolarPosition, Sun};
use crate::{Float, PI};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The number of patches in the sky dome
pub const N_PATCHES: usize = 145;

/// Azimuthal width (in degrees) of the patches in each altitude band,
/// from the horizon up. The zenith cap is not included.
pub const BAND_AZIMUTH_STEPS: [Float; 7] = [12., 12., 15., 15., 20., 30., 60.];

/// Height of each altitude band, in degrees
pub const BAND_HEIGHT: Float = 12.;

/// Half of the angle subtended by the disk of the sun, in degrees
const SUN_HALF_ANGLE: Float = 0.02665;

/// Suns lower than this (in degrees) are lifted up to it
const MIN_SUN_ALTITUDE: Float = 3.;

/// A piece of the sky. All angles are in Radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkyPatch {
    /// Altitude of the centre of the patch
    pub altitude: Float,
    /// Azimuth of the centre of the patch (from the North, clockwise)
    pub azimuth: Float,
    /// Altitude span of the patch
    pub delta_altitude: Float,
    /// Azimuth span of the patch
    pub delta_azimuth: Float,
    /// Solid angle of the patch, in Steradians
    pub solid_angle: Float,
}

/// How to account for direct sunlight
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum SunType {
    /// Direct sunlight is ignored
    #[default]
    #[value(name = "none")]
    NoSun,

    /// Direct sunlight is added to the patch nearest to the sun
    #[value(name = "cumulative")]
    CumulativeSun,

    /// Every hour of sunshine becomes a small light source
    #[value(name = "many")]
    ManySuns,
}

/// Options for calculating a cumulative sky
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyOptions {
    /// How to handle direct sunlight
    pub sun_type: SunType,

    /// Whether to include the diffuse sky
    pub include_diffuse: bool,

    /// Mean illuminance (i.e., luminance values, in cd/m2... kcd/m2 when the
    /// input is in W/m2 and multiplied by lm/W efficacies) over the sun-up
    /// hours, instead of total irradiation (i.e., Wh/m2.sr).
    pub illuminance: bool,

    /// Hours added to the clock time (e.g., for climate files that record
    /// the end of each hour).
    pub hour_shift: Float,
}

impl Default for SkyOptions {
    fn default() -> Self {
        Self {
            sun_type: SunType::NoSun,
            include_diffuse: true,
            illuminance: false,
            hour_shift: 0.,
        }
    }
}

/// A place on Earth, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude, positive in the North
    pub latitude: Float,
    /// Longitude
    pub longitude: Float,
    /// Standard meridian of the time zone, with the same sign convention
    /// as `longitude`
    pub meridian: Float,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: 51.7,
            longitude: 0.,
            meridian: 0.,
        }
    }
}

/// One hour of sun, as a light source
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunSource {
    /// Day of the year
    pub day: usize,
    /// Clock hour
    pub hour: Float,
    /// Solar altitude used for building the direction (Radians)
    pub altitude: Float,
    /// Solar azimuth (Radians)
    pub azimuth: Float,
    /// Unit vector pointing to the sun (X is East, Y is North, Z is up)
    pub direction: [Float; 3],
    /// Angular diameter of the sun, in degrees
    pub angular_diameter: Float,
    /// Radiance (or luminance, in illuminance mode) of the solar disk
    pub radiance: Float,
}

impl SunSource {
    fn new(day: usize, hour: Float, position: SolarPosition, direct_normal: Float) -> Self {
        let min_altitude = MIN_SUN_ALTITUDE.to_radians();
        let altitude = if position.altitude > 0. && position.altitude < min_altitude {
            min_altitude
        } else {
            position.altitude
        };
        let azimuth = position.azimuth;

        let half_angle = SUN_HALF_ANGLE.to_radians();
        let disk_solid_angle = 2. * PI * (1. - half_angle.cos());

        Self {
            day,
            hour,
            altitude,
            azimuth,
            direction: [
                azimuth.sin() * altitude.cos(),
                azimuth.cos() * altitude.cos(),
                altitude.sin(),
            ],
            angular_diameter: 2. * SUN_HALF_ANGLE,
            radiance: direct_normal / disk_solid_angle,
        }
    }
}

/// The result of accumulating a year of skies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeSky {
    /// One value per patch of the [`SkyDome`]
    pub values: Vec<Float>,

    /// The number of hours that contributed some diffuse light
    pub sun_up_hours: usize,

    /// Whether `values` are mean luminances (`true`) or total radiances (`false`)
    pub illuminance: bool,

    /// The suns, sorted by day and hour. Only filled with [`SunType::ManySuns`]
    pub suns: Vec<SunSource>,
}

/// The sky hemisphere, divided into 145 patches: seven bands of 12 degrees
/// plus a cap at the zenith.
#[derive(Debug, Clone)]
pub struct SkyDome {
    patches: Vec<SkyPatch>,
    latitude: Float,
    longitude: Float,
    meridian: Float,
}

impl Default for SkyDome {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single day adds to the sky
struct DayContribution {
    values: Vec<Float>,
    sun_up_hours: usize,
    suns: Vec<SunSource>,
}

impl SkyDome {
    /// Creates a sky dome located at the default [`Location`]
    pub fn new() -> Self {
        let location = Location::default();
        Self {
            patches: Self::build_patches(),
            latitude: location.latitude.to_radians(),
            longitude: location.longitude.to_radians(),
            meridian: location.meridian.to_radians(),
        }
    }

    /// Creates a sky dome at a [`Location`] given in degrees
    pub fn from_location(location: &Location) -> Result<Self> {
        let mut ret = Self::new();
        ret.set_latitude(location.latitude.to_radians())?;
        ret.set_longitude(location.longitude.to_radians())?;
        ret.set_meridian(location.meridian.to_radians());
        Ok(ret)
    }

    fn build_patches() -> Vec<SkyPatch> {
        let mut patches = Vec::with_capacity(N_PATCHES);
        let delta_altitude = BAND_HEIGHT.to_radians();

        for (band, step) in BAND_AZIMUTH_STEPS.iter().enumerate() {
            let altitude = (BAND_HEIGHT / 2. + BAND_HEIGHT * band as Float).to_radians();
            let delta_azimuth = step.to_radians();
            let solid_angle = delta_azimuth
                * ((altitude + delta_altitude / 2.).sin() - (altitude - delta_altitude / 2.).sin());

            let n = (360. / step).round() as usize;
            for i in 0..n {
                patches.push(SkyPatch {
                    altitude,
                    azimuth: i as Float * delta_azimuth,
                    delta_altitude,
                    delta_azimuth,
                    solid_angle,
                });
            }
        }

        // Zenith
        let cap_base = (90. - BAND_HEIGHT / 2.).to_radians();
        patches.push(SkyPatch {
            altitude: PI / 2.,
            azimuth: 0.,
            delta_altitude: (BAND_HEIGHT / 2.).to_radians(),
            delta_azimuth: 2. * PI,
            solid_angle: 2. * PI * (1. - cap_base.sin()),
        });
        patches
    }

    /// The number of patches in each band, from the horizon up to
    /// the zenith cap.
    pub fn band_sizes() -> [usize; 8] {
        let mut ret = [1; 8];
        for (i, step) in BAND_AZIMUTH_STEPS.iter().enumerate() {
            ret[i] = (360. / step).round() as usize;
        }
        ret
    }

    /// Sets the latitude (Radians). Fails if it is not within `[-PI/2, PI/2]`
    pub fn set_latitude(&mut self, latitude: Float) -> Result<()> {
        if !(-PI / 2. ..=PI / 2.).contains(&latitude) {
            return Err(Error::invalid(
                "latitude",
                latitude,
                "must be within [-PI/2, PI/2] Radians",
            ));
        }
        self.latitude = latitude;
        Ok(())
    }

    /// Sets the longitude (Radians). Fails if it is not within `[-PI, PI]`
    pub fn set_longitude(&mut self, longitude: Float) -> Result<()> {
        if !(-PI..=PI).contains(&longitude) {
            return Err(Error::invalid(
                "longitude",
                longitude,
                "must be within [-PI, PI] Radians",
            ));
        }
        self.longitude = longitude;
        Ok(())
    }

    /// Sets the standard meridian of the time zone (Radians)
    pub fn set_meridian(&mut self, meridian: Float) {
        self.meridian = meridian;
    }

    /// Latitude, in Radians
    pub fn latitude(&self) -> Float {
        self.latitude
    }

    /// Longitude, in Radians
    pub fn longitude(&self) -> Float {
        self.longitude
    }

    /// Standard meridian, in Radians
    pub fn meridian(&self) -> Float {
        self.meridian
    }

    /// All the patches, from the horizon up
    pub fn patches(&self) -> &[SkyPatch] {
        &self.patches
    }

    /// Borrows a single patch
    pub fn patch(&self, i: usize) -> Option<&SkyPatch> {
        self.patches.get(i)
    }

    /// Accumulates the sky of every hour of the year into a
    /// [`CumulativeSky`].
    ///
    /// Hours for which the sky cannot be modelled (e.g., the night, or no data)
    /// are skipped.
    pub fn calculate_sky<C: ClimateSource + Sync>(
        &self,
        climate: &C,
        options: &SkyOptions,
    ) -> Result<CumulativeSky> {
        let sun = Sun::new(self.latitude)?;

        #[cfg(not(feature = "parallel"))]
        let days = (1..=365)
            .map(|day| self.accumulate_day(sun.clone(), climate, options, day))
            .collect::<Result<Vec<DayContribution>>>()?;

        #[cfg(feature = "parallel")]
        let days = (1..=365usize)
            .into_par_iter()
            .map(|day| self.accumulate_day(sun.clone(), climate, options, day))
            .collect::<Result<Vec<DayContribution>>>()?;

        // Merged in day order, whichever way they were calculated
        let mut values = vec![0.0; N_PATCHES];
        let mut sun_up_hours = 0;
        let mut suns = Vec::new();
        for day in days {
            for (v, d) in values.iter_mut().zip(day.values.iter()) {
                *v += d;
            }
            sun_up_hours += day.sun_up_hours;
            suns.extend(day.suns);
        }
        info!("There were {} sun up hours", sun_up_hours);

        if options.illuminance && sun_up_hours > 0 {
            let n = sun_up_hours as Float;
            values.iter_mut().for_each(|v| *v /= n);
        }

        Ok(CumulativeSky {
            values,
            sun_up_hours,
            illuminance: options.illuminance,
            suns,
        })
    }

    fn accumulate_day<C: ClimateSource>(
        &self,
        mut sun: Sun,
        climate: &C,
        options: &SkyOptions,
        day: usize,
    ) -> Result<DayContribution> {
        sun.set_day(day)?;
        let sunrise = sun.sunrise();
        let sunset = sun.sunset();
        let time_offset = sun.solar_time_offset(self.longitude, self.meridian);
        // Half an hour
        let window = PI / 24.;

        let mut model = PerezSkyModel::new();
        let mut luminance = vec![0.0; N_PATCHES];
        let mut ret = DayContribution {
            values: vec![0.0; N_PATCHES],
            sun_up_hours: 0,
            suns: Vec::new(),
        };

        for h in 0..24 {
            let hour = h as Float + 0.5;

            // Use the middle of the sunlit part of the first and last hours
            let mut hour_angle = (hour + options.hour_shift + time_offset) * PI / 12.;
            if (hour_angle - sunrise).abs() < window {
                hour_angle = (hour_angle + window + sunrise) / 2.;
            } else if (hour_angle - sunset).abs() < window {
                hour_angle = (hour_angle - window + sunset) / 2.;
            }
            sun.set_hour_angle(hour_angle);
            let position = sun.position();

            let (Some(diffuse), Some(direct)) = (
                climate.diffuse_radiation(hour, day),
                climate.direct_radiation(hour, day),
            ) else {
                continue;
            };
            let mut diffuse = diffuse.max(0.);
            let direct = direct.max(0.);

            if !model.fit(diffuse, direct, &sun).is_fitted() {
                continue;
            }

            let mut illuminance = 0.0;
            let mut sun_patch = 0;
            let mut max_cos_distance = Float::NEG_INFINITY;
            for (i, patch) in self.patches.iter().enumerate() {
                let lv = model.relative_luminance(patch.altitude, patch.azimuth)?;
                luminance[i] = lv;
                illuminance += lv * patch.solid_angle * patch.altitude.sin();

                let cos_distance = position.altitude.cos()
                    * (position.azimuth - patch.azimuth).abs().cos()
                    * patch.altitude.cos()
                    + position.altitude.sin() * patch.altitude.sin();
                if cos_distance > max_cos_distance {
                    max_cos_distance = cos_distance;
                    sun_patch = i;
                }
            }

            let mut direct_normal = if position.altitude > 0. {
                direct / position.altitude.sin()
            } else {
                0.
            };
            if direct_normal > SOLAR_CONSTANT {
                debug!(
                    "Direct normal irradiance of {:.1} W/m2 at hour {} of day {} is larger than the solar constant... treating it as diffuse",
                    direct_normal, hour, day
                );
                diffuse += direct;
                direct_normal = 0.;
            }

            let diffuse_factor = if options.illuminance {
                diffuse * model.diffuse_luminous_efficacy()?
            } else {
                diffuse
            };

            if illuminance > 0. {
                ret.sun_up_hours += 1;
                if options.include_diffuse {
                    for (v, lv) in ret.values.iter_mut().zip(luminance.iter()) {
                        *v += lv * diffuse_factor / illuminance;
                    }
                }
            }

            let beam_factor = if options.illuminance {
                direct_normal * model.beam_luminous_efficacy()?
            } else {
                direct_normal
            };

            match options.sun_type {
                SunType::NoSun => {}
                SunType::CumulativeSun => {
                    if position.altitude > 0. && direct_normal > 0. {
                        ret.values[sun_patch] += beam_factor / self.patches[sun_patch].solid_angle;
                    }
                }
                SunType::ManySuns => {
                    if model.clearness() > 1. && direct_normal > 0. {
                        ret.suns.push(SunSource::new(day, hour, position, beam_factor));
                    }
                }
            }
        }

        Ok(ret)
    }
}
