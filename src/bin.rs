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
use clap::Parser;
use cumulative_sky::output::{write_cal, write_json, write_suns};
use cumulative_sky::{
    AnalysisPeriod, ClimateFormat, ClimateSeries, Float, Location, Result, Scaling, SkyDome,
    SkyOptions, SunType,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Generates a cumulative sky (as a Radiance .cal file) from a year of hourly irradiance data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Inputs {
    /// The climate file
    input: PathBuf,

    /// Columns of the climate file
    #[arg(short, long, value_enum, default_value_t = ClimateFormat::GlobalDiffuse)]
    format: ClimateFormat,

    /// How to handle direct sunlight
    #[arg(short, long, value_enum, default_value_t = SunType::NoSun)]
    sun: SunType,

    /// Ignore diffuse irradiance
    #[arg(short = 'd', long)]
    no_diffuse: bool,

    /// Output mean luminance instead of total radiance
    #[arg(short = 'l', long)]
    illuminance: bool,

    /// Scale the output values
    #[arg(long, value_enum, default_value_t = Scaling::None)]
    scale: Scaling,

    /// Latitude, in degrees (North is positive)
    #[arg(short = 'a', long, default_value_t = 51.7, allow_negative_numbers = true)]
    latitude: Float,

    /// Longitude, in degrees
    #[arg(short = 'o', long, default_value_t = 0., allow_negative_numbers = true)]
    longitude: Float,

    /// Standard meridian of the time zone, in degrees
    #[arg(short, long, default_value_t = 0., allow_negative_numbers = true)]
    meridian: Float,

    /// Hours added to the clock time of each record
    #[arg(long, default_value_t = 0., allow_negative_numbers = true)]
    hour_shift: Float,

    /// Only consider the hours between START and END of each day
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    time: Option<Vec<Float>>,

    /// Only consider the days between two dates (if the start comes after the end, the period wraps around the new year)
    #[arg(long, num_args = 4, value_names = ["START_MONTH", "START_DAY", "END_MONTH", "END_DAY"])]
    date: Option<Vec<u32>>,

    /// Where to write the suns (only with '--sun many')
    #[arg(long, default_value = "SunFile.rad")]
    sun_file: PathBuf,

    /// Also write the patches and results as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the .cal file here instead of the standard output
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print debugging information
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    // stdout is for the .cal file
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Could not set up logging");
    }
}

fn run(args: &Inputs) -> Result<()> {
    let mut period = AnalysisPeriod::default();
    if let Some([start, end]) = args.time.as_deref() {
        period.start_time = *start;
        period.end_time = *end;
    }
    if let Some([start_month, start_day, end_month, end_day]) = args.date.as_deref() {
        period.start_month = *start_month;
        period.start_day = *start_day;
        period.end_month = *end_month;
        period.end_day = *end_day;
    }

    let climate = ClimateSeries::from_file(&args.input, args.format, &period)?;
    let dome = SkyDome::from_location(&Location {
        latitude: args.latitude,
        longitude: args.longitude,
        meridian: args.meridian,
    })?;
    let options = SkyOptions {
        sun_type: args.sun,
        include_diffuse: !args.no_diffuse,
        illuminance: args.illuminance,
        hour_shift: args.hour_shift,
    };

    let sky = dome.calculate_sky(&climate, &options)?;

    let command_line: Vec<String> = std::env::args().collect();
    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_cal(&mut writer, &sky, args.scale, &command_line)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            write_cal(&mut writer, &sky, args.scale, &command_line)?;
        }
    }

    if args.sun == SunType::ManySuns {
        let mut writer = BufWriter::new(File::create(&args.sun_file)?);
        write_suns(&mut writer, &sky.suns)?;
        writer.flush()?;
        info!(
            "Wrote {} suns to '{}'",
            sky.suns.len(),
            args.sun_file.display()
        );
    }

    if let Some(path) = &args.json {
        write_json(BufWriter::new(File::create(path)?), &sky, dome.patches())?;
    }

    Ok(())
}

fn main() {
    let args = Inputs::parse();
    setup_logging(args.verbose);

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
