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
use crate::sky_dome::{CumulativeSky, SkyDome, SkyPatch, SunSource, BAND_HEIGHT, N_PATCHES};
use crate::Float;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// A factor applied to the values written to the `.cal` file
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Scaling {
    /// Values are written as calculated
    #[default]
    None,

    /// Divided by 179000, so that Radiance's image viewer shows kWh/m2
    Radiance,

    /// Divided by 1000 (i.e., kWh/m2 in Radiance's RGB data files)
    Kilo,
}

impl Scaling {
    /// The multiplier
    pub fn factor(&self) -> Float {
        match self {
            Scaling::None => 1.,
            Scaling::Radiance => 1. / 179000.,
            Scaling::Kilo => 1. / 1000.,
        }
    }
}

/// Writes the cumulative sky as a Radiance function file, which
/// defines `skybright` as a function of the ray direction.
///
/// `args` is echoed in the header.
pub fn write_cal<W: Write>(
    writer: &mut W,
    sky: &CumulativeSky,
    scaling: Scaling,
    args: &[String],
) -> Result<()> {
    if sky.values.len() != N_PATCHES {
        return Err(Error::invalid(
            "values",
            sky.values.len(),
            "a cumulative sky needs one value per patch",
        ));
    }
    let factor = scaling.factor();
    let band_height = BAND_HEIGHT.round() as usize;
    let band_sizes = SkyDome::band_sizes();
    let n_bands = band_sizes.len() - 1;

    writeln!(
        writer,
        "{{ This .cal file was generated automatically by simple_cumsky }}"
    )?;
    writeln!(writer, "{{ {} }}", args.join(" "))?;
    writeln!(writer)?;

    let rows = (0..=n_bands)
        .map(|j| format!("row{}", j))
        .collect::<Vec<String>>();
    writeln!(writer, "skybright={};", rows.join("+"))?;
    writeln!(writer)?;

    let mut first = 0;
    for (j, n) in band_sizes.iter().take(n_bands).enumerate() {
        // The first patch of each band is repeated at the end, so that
        // azimuths close to 360 fall in it.
        writeln!(
            writer,
            "row{}=if(and(alt-{}, {}-alt),select(floor(0.5+az/{:5.2})+1,",
            j,
            j * band_height,
            (j + 1) * band_height,
            360. / *n as Float
        )?;
        for v in &sky.values[first..first + n] {
            writeln!(writer, "\t{:.6},", v * factor)?;
        }
        writeln!(writer, "\t{:.6}),0);", sky.values[first] * factor)?;
        writeln!(writer)?;
        first += n;
    }

    writeln!(
        writer,
        "row{}=if(alt-{},{:.6},0);",
        n_bands,
        n_bands * band_height,
        sky.values[N_PATCHES - 1] * factor
    )?;
    writeln!(writer)?;
    writeln!(writer, "alt=asin(Dz)*180/PI;")?;
    writeln!(writer)?;
    writeln!(writer, "az=if(azi,azi,azi+360);")?;
    writeln!(writer, "azi=atan2(Dx,Dy)*180/PI;")?;
    writeln!(writer)?;
    Ok(())
}

/// Writes the suns as Radiance `light` materials and `source` primitives
pub fn write_suns<W: Write>(writer: &mut W, suns: &[SunSource]) -> Result<()> {
    for (i, sun) in suns.iter().enumerate() {
        writeln!(writer)?;
        writeln!(writer, "void light solar{}", i)?;
        writeln!(writer, "0\n0")?;
        writeln!(
            writer,
            "3 {:.3e} {:.3e} {:.3e}",
            sun.radiance, sun.radiance, sun.radiance
        )?;
        writeln!(writer)?;
        writeln!(writer, "solar{} source sun{}", i, i)?;
        writeln!(writer, "0\n0")?;
        writeln!(
            writer,
            "4 {:.6} {:.6} {:.6} {:.6}",
            sun.direction[0], sun.direction[1], sun.direction[2], sun.angular_diameter
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    patches: &'a [SkyPatch],
    sky: &'a CumulativeSky,
}

/// Writes the patches and the cumulative sky as JSON
pub fn write_json<W: Write>(writer: W, sky: &CumulativeSky, patches: &[SkyPatch]) -> Result<()> {
    serde_json::to_writer_pretty(writer, &JsonOutput { patches, sky })?;
    Ok(())
}
