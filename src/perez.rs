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
use crate::sun::Sun;
use crate::{Float, PI};
use serde::Serialize;
use tracing::warn;

/// Extraterrestrial solar irradiance, in W/m2
pub const SOLAR_CONSTANT: Float = 1367.;

/// Precipitable water content (cm) assumed by the efficacy models
const PRECIPITABLE_WATER: Float = 2.0;

/// Upper limits of the clearness index (epsilon) of each of the eight
/// sky categories in Perez et al. (1990), Table 1
const CLEARNESS_LIMITS: [Float; 8] = [1.065, 1.23, 1.5, 1.95, 2.8, 4.5, 6.2, 999999.];

/// Coefficients of the All-Weather model. Each row is a clearness
/// category, containing `a1..a4`, `b1..b4`, `c1..c4`, `d1..d4` and `e1..e4`.
const COEFFICIENTS: [[Float; 20]; 8] = [
    /* Sky clearness (epsilon): 1.000 to 1.065 */
    [
        1.3525, -0.2576, -0.2690, -1.4366, -0.7670, 0.0007, 1.2734, -0.1233, 2.8000, 0.6004,
        1.2375, 1.0000, 1.8734, 0.6297, 0.9738, 0.2809, 0.0356, -0.1246, -0.5718, 0.9938,
    ],
    /* Sky clearness (epsilon): 1.065 to 1.230 */
    [
        -1.2219, -0.7730, 1.4148, 1.1016, -0.2054, 0.0367, -3.9128, 0.9156, 6.9750, 0.1774,
        6.4477, -0.1239, -1.5798, -0.5081, -1.7812, 0.1080, 0.2624, 0.0672, -0.2190, -0.4285,
    ],
    /* Sky clearness (epsilon): 1.230 to 1.500 */
    [
        -1.1000, -0.2515, 0.8952, 0.0156, 0.2782, -0.1812, -4.5000, 1.1766, 24.7219, -13.0812,
        -37.7000, 34.8438, -5.0000, 1.5218, 3.9229, -2.6204, -0.0156, 0.1597, 0.4199, -0.5562,
    ],
    /* Sky clearness (epsilon): 1.500 to 1.950 */
    [
        -0.5484, -0.6654, -0.2672, 0.7117, 0.7234, -0.6219, -5.6812, 2.6297, 33.3389, -18.3000,
        -62.2500, 52.0781, -3.5000, 0.0016, 1.1477, 0.1062, 0.4659, -0.3296, -0.0876, -0.0329,
    ],
    /* Sky clearness (epsilon): 1.950 to 2.800 */
    [
        -0.6000, -0.3566, -2.5000, 2.3250, 0.2937, 0.0496, -5.6812, 1.8415, 21.0000, -4.7656,
        -21.5906, 7.2492, -3.5000, -0.1554, 1.4062, 0.3988, 0.0032, 0.0766, -0.0656, -0.1294,
    ],
    /* Sky clearness (epsilon): 2.800 to 4.500 */
    [
        -1.0156, -0.3670, 1.0078, 1.4051, 0.2875, -0.5328, -3.8500, 3.3750, 14.0000, -0.9999,
        -7.1406, 7.5469, -3.4000, -0.1078, -1.0750, 1.5702, -0.0672, 0.4016, 0.3017, -0.4844,
    ],
    /* Sky clearness (epsilon): 4.500 to 6.200 */
    [
        -1.0000, 0.0211, 0.5025, -0.5119, -0.3000, 0.1922, 0.7023, -1.6317, 19.0000, -5.0000,
        1.2438, -1.9094, -4.0000, 0.0250, 0.3844, 0.2656, 1.0468, -0.3788, -2.4517, 1.4656,
    ],
    /* Sky clearness (epsilon): 6.200 to ... */
    [
        -1.0500, 0.0289, 0.4260, 0.3590, -0.3250, 0.1156, 0.7781, 0.0025, 31.0625, -14.5000,
        -46.1148, 55.3750, -7.2312, 0.4050, 13.3500, 0.6234, 1.5000, -0.6426, 1.8564, 0.5636,
    ],
];

/// Global luminous efficacy, Table 4 of Perez et al. (1990)
const GLOBAL_EFFICACY: [(Float, Float, Float, Float); 8] = [
    (96.63, -0.47, 11.50, -9.16),
    (107.54, 0.79, 1.79, -1.19),
    (98.73, 0.70, 4.40, -6.95),
    (92.72, 0.56, 8.36, -8.31),
    (86.73, 0.98, 7.10, -10.94),
    (88.34, 1.39, 6.06, -7.60),
    (78.63, 1.47, 4.93, -11.37),
    (99.65, 1.86, -4.46, -3.15),
];

/// Diffuse luminous efficacy, Table 4 of Perez et al. (1990)
const DIFFUSE_EFFICACY: [(Float, Float, Float, Float); 8] = [
    (97.24, -0.46, 12.00, -8.91),
    (107.22, 1.15, 0.59, -3.95),
    (104.97, 2.96, -5.53, -8.77),
    (102.39, 5.59, -13.95, -13.90),
    (100.71, 5.94, -22.75, -23.74),
    (106.42, 3.83, -36.15, -28.83),
    (141.88, 1.90, -53.24, -14.03),
    (152.23, 0.35, -45.27, -7.98),
];

/// Direct (beam) luminous efficacy, Table 4 of Perez et al. (1990)
const BEAM_EFFICACY: [(Float, Float, Float, Float); 8] = [
    (57.20, -4.55, -2.98, 117.12),
    (98.99, -3.46, -1.21, 12.38),
    (109.83, -4.90, -1.71, -8.81),
    (110.34, -5.84, -1.99, -4.56),
    (106.36, -3.97, -1.75, -6.16),
    (107.19, -1.25, -1.51, -26.73),
    (105.75, 0.77, -1.26, -34.44),
    (101.18, 1.58, -1.10, -8.29),
];

/// The five parameters of the luminance distribution
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct PerezCoefficients {
    /// Darkening or brightening of the horizon
    pub a: Float,
    /// Luminance gradient near the horizon
    pub b: Float,
    /// Relative intensity of the circumsolar region
    pub c: Float,
    /// Width of the circumsolar region
    pub d: Float,
    /// Relative intensity of the backscattered light
    pub e: Float,
}

/// The outcome of fitting the model to an hour of data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyFit {
    /// Coefficients were calculated and can be used
    Fitted,
    /// There is no diffuse light to distribute (e.g., night time)
    NoSky,
    /// The clearness index fell below 1, outside of the model's range
    InvalidClearness,
}

impl SkyFit {
    /// Whether the hour can be used
    pub fn is_fitted(&self) -> bool {
        matches!(self, SkyFit::Fitted)
    }
}

/// The Perez All-Weather sky model, fitted one hour at a time.
///
/// Sources:
///
/// 1. Perez, R., Ineichen, P., Seals, R., Michalsky, J. and Stewart, R. (1990), "Modeling daylight availability and irradiance components from direct and global irradiance"
/// 2. Perez, R., R. Seals, and J. Michalsky (1993) All-Weather Model for Sky Luminance Distribution - Preliminary Configuration and Validation
#[derive(Debug, Default, Clone)]
pub struct PerezSkyModel {
    coefficients: PerezCoefficients,
    fitted: bool,
    solar_altitude: Float,
    solar_azimuth: Float,
    clearness: Float,
    brightness: Float,
    clearness_bin: usize,
}

impl PerezSkyModel {
    /// Creates a model with no coefficients
    pub fn new() -> Self {
        Self::default()
    }

    /// Fits the coefficients of the model to the diffuse and direct
    /// horizontal irradiance (W/m2) received with the sun at its
    /// current position.
    pub fn fit(&mut self, diffuse_horizontal: Float, direct_horizontal: Float, sun: &Sun) -> SkyFit {
        let position = sun.position();
        self.solar_altitude = position.altitude;
        self.solar_azimuth = position.azimuth;

        let mut diffuse = diffuse_horizontal;
        if diffuse <= 0. {
            return self.no_sky();
        }

        let altitude = position.altitude;
        let zenith = PI / 2. - altitude;
        let direct_normal = if altitude > 0. {
            direct_horizontal / altitude.sin()
        } else {
            // no beam from below the horizon
            if direct_horizontal > 0. {
                diffuse += direct_horizontal;
            }
            0.
        };

        let clearness = Self::clearness_index(diffuse, direct_normal, zenith);

        let altitude_degrees = altitude.to_degrees();
        let mut brightness = if altitude_degrees + 6.07995 >= 0. {
            Self::air_mass(altitude) * diffuse / Self::extraterrestrial_irradiance(sun.day())
        } else if diffuse <= 10. {
            return self.no_sky();
        } else {
            warn!(
                "Solar altitude of {:.2} degrees is lower than -6 degrees, yet diffuse horizontal irradiance is {:.1} W/m2... continuing with a sky brightness of 0",
                altitude_degrees, diffuse
            );
            0.
        };

        // Perez et al. (1990), Table 1
        if brightness < 0.2 && clearness > 1.065 && clearness < 2.8 {
            brightness = 0.2;
        }

        if clearness < 1. {
            self.fitted = false;
            return SkyFit::InvalidClearness;
        }

        let bin = Self::clearness_category(clearness);
        self.coefficients = Self::calc_coefficients(bin, zenith, brightness);
        self.clearness = clearness;
        self.brightness = brightness;
        self.clearness_bin = bin;
        self.fitted = true;
        SkyFit::Fitted
    }

    fn no_sky(&mut self) -> SkyFit {
        self.coefficients = PerezCoefficients::default();
        self.clearness = 0.;
        self.brightness = 0.;
        self.clearness_bin = 0;
        self.fitted = false;
        SkyFit::NoSky
    }

    /// Luminance of a point in the sky (altitude and azimuth in Radians) relative
    /// to the luminance of an arbitrary reference point. Never negative.
    pub fn relative_luminance(&self, altitude: Float, azimuth: Float) -> Result<Float> {
        if !self.fitted {
            return Err(Error::ModelNotFitted);
        }
        let cos_gamma = (altitude.sin() * self.solar_altitude.sin()
            + self.solar_altitude.cos() * altitude.cos() * (azimuth - self.solar_azimuth).abs().cos())
        .clamp(-1., 1.);
        let gamma = cos_gamma.acos();

        let k = &self.coefficients;
        let lv = (1. + k.a * (k.b / altitude.sin()).exp())
            * (1. + k.c * (k.d * gamma).exp() + k.e * cos_gamma * cos_gamma);

        if lv.is_nan() || lv < 0. {
            Ok(0.)
        } else {
            Ok(lv)
        }
    }

    /// Diffuse luminous efficacy (lm/W), Equation 7 of Perez et al. (1990)
    pub fn diffuse_luminous_efficacy(&self) -> Result<Float> {
        if !self.fitted {
            return Err(Error::ModelNotFitted);
        }
        // ln(0) is meaningless... happens when brightness was forced to 0
        if self.brightness <= 0. {
            return Ok(0.);
        }
        let (a, b, c, d) = DIFFUSE_EFFICACY[self.clearness_bin];
        Ok(a + b * PRECIPITABLE_WATER + c * self.solar_altitude.sin() + d * self.brightness.ln())
    }

    /// Direct luminous efficacy (lm/W), Equation 8 of Perez et al. (1990)
    pub fn beam_luminous_efficacy(&self) -> Result<Float> {
        if !self.fitted {
            return Err(Error::ModelNotFitted);
        }
        let (a, b, c, d) = BEAM_EFFICACY[self.clearness_bin];
        let zenith = PI / 2. - self.solar_altitude;
        let v = a + b * PRECIPITABLE_WATER + c * (5.73 * zenith - 5.).exp() + d * self.brightness;
        Ok(v.max(0.))
    }

    /// Global luminous efficacy (lm/W), Equation 6 of Perez et al. (1990)
    pub fn global_luminous_efficacy(&self) -> Result<Float> {
        if !self.fitted {
            return Err(Error::ModelNotFitted);
        }
        if self.brightness <= 0. {
            return Ok(0.);
        }
        let (a, b, c, d) = GLOBAL_EFFICACY[self.clearness_bin];
        let v = a + b * PRECIPITABLE_WATER + c * self.solar_altitude.sin() + d * self.brightness.ln();
        Ok(v.max(0.))
    }

    /// Whether the last fit succeeded
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// The coefficients of the last fit (zero if there was no sky)
    pub fn coefficients(&self) -> PerezCoefficients {
        self.coefficients
    }

    /// Clearness index (epsilon) of the last successful fit
    pub fn clearness(&self) -> Float {
        self.clearness
    }

    /// Brightness index (delta) of the last successful fit
    pub fn brightness(&self) -> Float {
        self.brightness
    }

    /// Clearness category (`0` to `7`) of the last successful fit
    pub fn clearness_bin(&self) -> usize {
        self.clearness_bin
    }

    /// Perez's clearness index, Equation 1 in Perez et al. 1990
    pub fn clearness_index(diffuse_horizontal: Float, direct_normal: Float, zenith: Float) -> Float {
        const K: Float = 1.041;
        let z3 = zenith.powi(3);
        ((diffuse_horizontal + direct_normal) / diffuse_horizontal + K * z3) / (1. + K * z3)
    }

    /// The category of a clearness index: the first one whose upper
    /// limit is greater than `clearness`.
    pub fn clearness_category(clearness: Float) -> usize {
        CLEARNESS_LIMITS
            .iter()
            .position(|limit| clearness < *limit)
            .unwrap_or(CLEARNESS_LIMITS.len() - 1)
    }

    /// Extraterrestrial irradiance (W/m2) for a day of the year
    pub fn extraterrestrial_irradiance(day: usize) -> Float {
        let d = day as Float * 2. * PI / 365.;
        SOLAR_CONSTANT
            * (1.00011
                + 0.034221 * d.cos()
                + 0.00128 * d.sin()
                + 0.000719 * (2. * d).cos()
                + 0.000077 * (2. * d).sin())
    }

    /// Relative optical air mass. Kasten-Young is used above 10 degrees of
    /// solar altitude, and a correction for refraction below that.
    pub fn air_mass(altitude: Float) -> Float {
        let degrees = altitude.to_degrees();
        if degrees >= 10. {
            1. / altitude.sin()
        } else {
            1. / (altitude.sin() + 0.50572 * (degrees + 6.07995).powf(-1.6364))
        }
    }

    fn calc_coefficients(bin: usize, zenith: Float, brightness: Float) -> PerezCoefficients {
        let x = &COEFFICIENTS[bin];
        let linear = |i: usize| x[i] + x[i + 1] * zenith + brightness * (x[i + 2] + x[i + 3] * zenith);

        let (c, d) = if bin == 0 {
            (
                (brightness * (x[8] + x[9] * zenith)).powf(x[10]).exp() - 1.,
                -(brightness * (x[12] + x[13] * zenith)).exp() + x[14] + x[15] * brightness,
            )
        } else {
            (linear(8), linear(12))
        };

        PerezCoefficients {
            a: linear(0),
            b: linear(4),
            c,
            d,
            e: linear(16),
        }
    }
}
