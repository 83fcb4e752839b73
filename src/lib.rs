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

#![deny(missing_docs)]

//! A cumulative sky generator. Starting from a year of hourly horizontal irradiance,
//! it calculates how much light arrives from each of the 145 patches of the sky
//! dome, integrated (or averaged) over the year. The result can be written as a
//! Radiance `.cal` file and used for driving annual irradiation studies.
//!
//! * **Solar geometry**: Declination, sunrise and the position of the sun ([`Sun`])
//! * **Climate data**: Interpolated horizontal irradiance, read from two-column files or EnergyPlus Weather files ([`ClimateSeries`])
//! * **The Perez All-Weather sky**: relative luminance distribution and luminous efficacies ([`PerezSkyModel`])
//! * **The sky dome**: patches and the hourly accumulation ([`SkyDome`]). Direct sunlight can be ignored, added to the nearest patch, or exported as a set of small suns.

/// The kind of Floating point number used in the
/// library... the `"float"` feature means it becomes `f32`
/// and `f64` is used otherwise.
#[cfg(feature = "float")]
pub type Float = f32;
/// Well, Pi.
#[cfg(feature = "float")]
pub const PI: Float = std::f32::consts::PI;

/// The kind of Floating point number used in the
/// library... the `"float"` feature means it becomes `f32`
/// and `f64` is used otherwise.
#[cfg(not(feature = "float"))]
pub type Float = f64;

/// Well, Pi.
#[cfg(not(feature = "float"))]
pub const PI: Float = std::f64::consts::PI;

/// Errors
pub mod error;
pub use error::{Error, Result};

/// Solar geometry
pub mod sun;
pub use sun::{SolarPosition, Sun};

/// Hourly climate data
pub mod climate;
pub use climate::{AnalysisPeriod, ClimateFormat, ClimateSeries, ClimateSource};

/// The Perez All-Weather sky model
pub mod perez;
pub use perez::{PerezCoefficients, PerezSkyModel, SkyFit};

/// The sky dome and the accumulation of a year of skies
pub mod sky_dome;
pub use sky_dome::{CumulativeSky, Location, SkyDome, SkyOptions, SkyPatch, SunSource, SunType};

/// Writing results
pub mod output;
pub use output::Scaling;
