use crate::basis::BASIS_COUNT;
use crate::cli::{CliArgs, Mode};
use crate::config::FitConfig;
use crate::environment::EnvironmentMap;
use crate::projection::Fit;
use crate::radiance::CoefficientSet;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub fit: Option<Fit>,
    pub written: Vec<PathBuf>,
}

pub fn run(args: &CliArgs) -> Result<RunOutcome> {
    let mut config = match args.config.as_ref() {
        Some(path) => FitConfig::load(path)?,
        None => FitConfig::default(),
    };
    if !args.overrides.is_empty() {
        info!("command line overrides: {}", args.overrides.applied_fields().join(", "));
    }
    config.apply_overrides(&args.overrides);

    let input = args.input_path();
    let environment = EnvironmentMap::load(&input)?;
    info!("loaded {} ({}x{})", input.display(), environment.width(), environment.height());

    match args.mode {
        Mode::Dump => {
            let path = args.output_path("_ori.png");
            environment.save_png(&path)?;
            println!("Wrote {}", path.display());
            Ok(RunOutcome { fit: None, written: vec![path] })
        }
        Mode::Fit => fit_environment(args, &config, &environment),
    }
}

fn fit_environment(args: &CliArgs, config: &FitConfig, environment: &EnvironmentMap) -> Result<RunOutcome> {
    let projector = config.projector()?;
    let fit = projector
        .project(environment)
        .with_context(|| format!("Failed to fit '{}'", args.input_path().display()))?;
    for coefficient in fit.coefficients.iter() {
        println!("({:.6}, {:.6}, {:.6})", coefficient.x, coefficient.y, coefficient.z);
    }

    let mut written = Vec::with_capacity(BASIS_COUNT + 2);
    for index in 0..BASIS_COUNT {
        let path = args.output_path(&format!("_c{index}.png"));
        render_lobe(&fit.coefficients, index, config)?.save_png(&path)?;
        written.push(path);
    }
    let path = args.output_path("_fit.png");
    render_reconstruction(&fit.coefficients, config)?.save_png(&path)?;
    written.push(path);

    let path = args.output_path("_coefs.json");
    write_coefficients(&fit.coefficients, &path)?;
    written.push(path);

    for path in &written {
        println!("Wrote {}", path.display());
    }
    Ok(RunOutcome { fit: Some(fit), written })
}

/// One weighted lobe laid out over the equirect plane.
pub fn render_lobe(
    coefficients: &CoefficientSet,
    index: usize,
    config: &FitConfig,
) -> Result<EnvironmentMap> {
    EnvironmentMap::from_fn(config.preview_width, config.preview_height, |dir| {
        coefficients.lobe_response(index, dir)
    })
}

pub fn render_reconstruction(coefficients: &CoefficientSet, config: &FitConfig) -> Result<EnvironmentMap> {
    EnvironmentMap::from_fn(config.preview_width, config.preview_height, |dir| coefficients.evaluate(dir))
}

pub fn write_coefficients(coefficients: &CoefficientSet, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(coefficients).context("Failed to serialize coefficients")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn read_coefficients(path: &Path) -> Result<CoefficientSet> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Failed to parse coefficients {}", path.display()))
}
