//! Command line tool for batch measurement of recorded landmark frames.

use anyhow::{Context, Result};
use body_measure::calibration::{shared_store, PixelPoint};
use body_measure::config::Config;
use body_measure::session::{FrameInput, MeasurementSession};
use body_measure::store::CalibrationStore;
use clap::Parser;
use log::info;
use std::fs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding an array of frames (landmarks + dimensions)
    #[arg(short, long)]
    input: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Override the calibration record path
    #[arg(long)]
    calibration_file: Option<String>,

    /// Apply the built-in preset calibration before processing
    #[arg(short, long)]
    preset: bool,

    /// Calibrate from two reference points: "x1,y1:x2,y2:length_cm"
    #[arg(long)]
    calibrate: Option<String>,

    /// Fine-tune the scale by a multiplicative factor
    #[arg(short, long)]
    multiplier: Option<f64>,

    /// Reset calibration (clears the persisted record)
    #[arg(short, long)]
    reset: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {config_path}");
        Config::from_file(config_path)?
    } else {
        Config::default()
    };
    if let Some(path) = &args.calibration_file {
        config.calibration.file = path.into();
    }
    config.validate()?;

    let store = shared_store(CalibrationStore::new(&config.calibration.file));
    let mut session = MeasurementSession::new(&config, store);

    if args.reset {
        session.reset()?;
        info!("Calibration reset");
    }
    if args.preset {
        let scale = session.use_preset()?;
        info!("Applied preset calibration: {scale:.2} px/cm");
    }
    if let Some(spec) = &args.calibrate {
        let (points, reference_cm) = parse_calibration_spec(spec)?;
        let scale = session.calibrate_manual(&points, reference_cm)?;
        info!("Manual calibration: {scale:.2} px/cm");
    }
    if let Some(factor) = args.multiplier {
        let scale = session.set_multiplier(factor)?;
        info!("Applied {factor:.2}x multiplier: {scale:.2} px/cm");
    }

    let Some(input) = &args.input else {
        return Ok(());
    };

    let content = fs::read_to_string(input).with_context(|| format!("Failed to read input file {input}"))?;
    let frames: Vec<FrameInput> =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse frames from {input}"))?;

    info!("Processing {} frames", frames.len());

    for frame in &frames {
        let result = session.process(frame);
        println!("{}", serde_json::to_string(&result)?);
    }

    Ok(())
}

/// Parse "x1,y1:x2,y2:length_cm" into calibration inputs
fn parse_calibration_spec(spec: &str) -> Result<([PixelPoint; 2], f64)> {
    let parts: Vec<&str> = spec.split(':').collect();
    anyhow::ensure!(
        parts.len() == 3,
        "Calibration spec must be \"x1,y1:x2,y2:length_cm\", got {spec:?}"
    );

    let parse_point = |part: &str| -> Result<PixelPoint> {
        let coords: Vec<&str> = part.split(',').collect();
        anyhow::ensure!(coords.len() == 2, "Point must be \"x,y\", got {part:?}");
        Ok(PixelPoint::new(coords[0].trim().parse()?, coords[1].trim().parse()?))
    };

    let p1 = parse_point(parts[0])?;
    let p2 = parse_point(parts[1])?;
    let reference_cm: f64 = parts[2].trim().parse()?;

    Ok(([p1, p2], reference_cm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_calibration_spec() {
        let (points, cm) = parse_calibration_spec("100,200:185,200:8.5").unwrap();
        assert_eq!(points[0], PixelPoint::new(100.0, 200.0));
        assert_eq!(points[1], PixelPoint::new(185.0, 200.0));
        assert!((cm - 8.5).abs() < 1e-12);
    }

    #[test]
    fn test_parse_calibration_spec_rejects_garbage() {
        assert!(parse_calibration_spec("100,200:8.5").is_err());
        assert!(parse_calibration_spec("a,b:c,d:e").is_err());
        assert!(parse_calibration_spec("1,2,3:4,5:6").is_err());
    }
}
