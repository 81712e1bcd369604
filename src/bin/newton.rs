extern crate clap;
extern crate env_logger;
extern crate image;
extern crate log;
extern crate newton_fractal;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use image::Rgb;
use log::info;
use newton_fractal::{FractalConfig, FractalImage, NewtonError};
use num::Complex;
use std::ops::RangeInclusive;
use std::str::FromStr;

fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let index = s.find(separator)?;
    Some((s[..index].parse().ok()?, s[index + 1..].parse().ok()?))
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex::new(re, im))
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    parse_pair::<T>(s, separator)
        .map(|_| ())
        .ok_or_else(|| err.to_string())
}

// One check for every numeric flag; NaN falls outside any range.
fn validate_within<T: FromStr + PartialOrd>(
    s: &str,
    range: RangeInclusive<T>,
    what: &str,
    out_of_range: &str,
) -> Result<(), String> {
    match s.parse::<T>() {
        Ok(value) if range.contains(&value) => Ok(()),
        Ok(_) => Err(out_of_range.to_string()),
        Err(_) => Err(format!("Could not parse {}", what)),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const ROOT: &str = "root";
const COUNT: &str = "count";
const ITERATIONS: &str = "iterations";
const SCALE: &str = "scale";
const CENTER: &str = "center";
const FIT: &str = "fit";
const MARKERS: &str = "markers";
const THREADS: &str = "threads";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("newton")
        .version("0.1.0")
        .about("Newton fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the format follows the extension"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("500x500")
                .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(ROOT)
                .required(false)
                .long(ROOT)
                .short("r")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse root"))
                .help("A root of the polynomial, as re,im; repeat for more roots"),
        )
        .arg(
            Arg::with_name(COUNT)
                .required(false)
                .long(COUNT)
                .short("n")
                .takes_value(true)
                .validator(|s| {
                    validate_within(
                        &s,
                        1..=64usize,
                        "root count",
                        "Root count must be between 1 and 64",
                    )
                })
                .help("Grow or shrink the root set to this many roots"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("32")
                .validator(|s| {
                    validate_within(
                        &s,
                        1..=100_000usize,
                        "iteration count",
                        "Iteration count must be between 1 and 100000",
                    )
                })
                .help("Newton steps allowed per pixel"),
        )
        .arg(
            Arg::with_name(SCALE)
                .required(false)
                .long(SCALE)
                .takes_value(true)
                .default_value("1.0")
                .validator(|s| {
                    validate_within(
                        &s,
                        std::f64::MIN_POSITIVE..=std::f64::MAX,
                        "scale",
                        "Scale must be a positive number",
                    )
                })
                .help("Zoom; 1.0 shows 150 pixels per unit"),
        )
        .arg(
            Arg::with_name(CENTER)
                .required(false)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .default_value("0,0")
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center"))
                .help("Point of the complex plane shown at the image center, as re,im"),
        )
        .arg(
            Arg::with_name(FIT)
                .long(FIT)
                .short("f")
                .help("Zoom and pan so that every root is in view; overrides --scale and --center"),
        )
        .arg(
            Arg::with_name(MARKERS)
                .long(MARKERS)
                .short("m")
                .help("Ring every root in white"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_within(
                        &s,
                        1..=max_threads,
                        "thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver; defaults to one per core"),
        )
        .get_matches()
}

// Validators have already run, so the parses below cannot fail.
fn config_from(matches: &ArgMatches) -> FractalConfig {
    let mut config = FractalConfig::default();
    if let Some((width, height)) = matches.value_of(SIZE).and_then(|s| parse_pair(s, 'x')) {
        config.width = width;
        config.height = height;
    }
    if let Some(roots) = matches.values_of(ROOT) {
        config.roots = roots.filter_map(parse_complex).collect();
    }
    if let Some(limit) = matches.value_of(ITERATIONS).and_then(|s| s.parse().ok()) {
        config.iteration_limit = limit;
    }
    if let Some(scale) = matches.value_of(SCALE).and_then(|s| s.parse().ok()) {
        config.scale = scale;
    }
    if let Some(center) = matches.value_of(CENTER).and_then(parse_complex) {
        config.center = center;
    }
    if let Some(threads) = matches.value_of(THREADS).and_then(|s| s.parse().ok()) {
        config.threads = threads;
    }
    config
}

fn render(matches: &ArgMatches) -> Result<FractalImage, NewtonError> {
    let mut fractal = FractalImage::new(config_from(matches))?;
    if let Some(count) = matches.value_of(COUNT).and_then(|s| s.parse().ok()) {
        fractal.set_root_count(count)?;
    }
    if matches.is_present(FIT) {
        fractal.fit_to_roots()?;
    }
    fractal.recompute()?;
    if matches.is_present(MARKERS) {
        fractal.mark_roots(Rgb([255, 255, 255]));
    }
    Ok(fractal)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    let output = matches.value_of(OUTPUT).unwrap_or_default();

    match render(&matches) {
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
        Ok(fractal) => {
            if let Err(e) = fractal.pixels().save(output) {
                eprintln!("Could not write {}: {}", output, e);
                std::process::exit(1);
            }
            info!(
                "wrote {} ({}x{}, {} roots)",
                output,
                fractal.width(),
                fractal.height(),
                fractal.roots().len()
            );
        }
    }
}
