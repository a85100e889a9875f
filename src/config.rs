use crate::integrate::Integrator;
use crate::projection::{Projector, DEFAULT_MAX_CONDITION, DEFAULT_SAMPLE_COUNT};
use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    #[serde(default = "FitConfig::default_sample_count")]
    pub sample_count: u32,
    #[serde(default)]
    pub scramble_seed: Option<u64>,
    #[serde(default = "FitConfig::default_max_condition")]
    pub max_condition: f32,
    #[serde(default = "FitConfig::default_parallel")]
    pub parallel: bool,
    #[serde(default = "FitConfig::default_preview_width")]
    pub preview_width: u32,
    #[serde(default = "FitConfig::default_preview_height")]
    pub preview_height: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitConfigOverrides {
    pub sample_count: Option<u32>,
    pub scramble_seed: Option<u64>,
    pub parallel: Option<bool>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            sample_count: Self::default_sample_count(),
            scramble_seed: None,
            max_condition: Self::default_max_condition(),
            parallel: Self::default_parallel(),
            preview_width: Self::default_preview_width(),
            preview_height: Self::default_preview_height(),
        }
    }
}

impl FitConfig {
    const fn default_sample_count() -> u32 {
        DEFAULT_SAMPLE_COUNT
    }

    const fn default_max_condition() -> f32 {
        DEFAULT_MAX_CONDITION
    }

    const fn default_parallel() -> bool {
        true
    }

    const fn default_preview_width() -> u32 {
        400
    }

    const fn default_preview_height() -> u32 {
        200
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: FitConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        cfg.validate().with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_count == 0 {
            bail!("sample_count must be at least 1");
        }
        if !(self.max_condition >= 1.0) {
            bail!("max_condition must be >= 1, got {}", self.max_condition);
        }
        if self.preview_width == 0 || self.preview_height == 0 {
            bail!("preview size must be non-zero, got {}x{}", self.preview_width, self.preview_height);
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &FitConfigOverrides) {
        if let Some(sample_count) = overrides.sample_count {
            self.sample_count = sample_count;
        }
        if let Some(seed) = overrides.scramble_seed {
            self.scramble_seed = Some(seed);
        }
        if let Some(parallel) = overrides.parallel {
            self.parallel = parallel;
        }
    }

    pub fn projector(&self) -> Result<Projector> {
        self.validate()?;
        let integrator = Integrator::new(self.sample_count)?.with_seed(self.scramble_seed);
        Ok(Projector::new(integrator).with_max_condition(self.max_condition).with_parallel(self.parallel))
    }
}

impl FitConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.sample_count.is_none() && self.scramble_seed.is_none() && self.parallel.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.sample_count.is_some() {
            fields.push("sample_count");
        }
        if self.scramble_seed.is_some() {
            fields.push("scramble_seed");
        }
        if self.parallel.is_some() {
            fields.push("parallel");
        }
        fields
    }
}
