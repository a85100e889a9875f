use crate::config::FitConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Write the loaded environment back out untouched.
    Dump,
    #[default]
    Fit,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliArgs {
    pub mode: Mode,
    pub name: String,
    pub input: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub overrides: FitConfigOverrides,
}

impl CliArgs {
    pub fn parse_from_env() -> Result<Option<Self>> {
        Self::parse(env::args())
    }

    /// Returns `None` when no base name was given or help was requested.
    pub fn parse<I, S>(args: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = CliArgs::default();
        let mut name = None;
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw) = iter.next() {
            let arg = raw.as_ref();
            match arg {
                "-h" | "--help" => return Ok(None),
                "-t" => parsed.mode = Mode::Dump,
                "-p" => parsed.mode = Mode::Fit,
                "--serial" => parsed.overrides.parallel = Some(false),
                "--samples" | "--seed" | "--config" | "--input" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow!("Expected a value after '{arg}'"))?
                        .as_ref()
                        .to_string();
                    match arg {
                        "--samples" => {
                            let samples = value
                                .parse::<u32>()
                                .with_context(|| format!("Invalid sample count '{value}'"))?;
                            if samples == 0 {
                                bail!("Sample count must be at least 1");
                            }
                            parsed.overrides.sample_count = Some(samples);
                        }
                        "--seed" => {
                            let seed =
                                value.parse::<u64>().with_context(|| format!("Invalid seed '{value}'"))?;
                            parsed.overrides.scramble_seed = Some(seed);
                        }
                        "--config" => parsed.config = Some(PathBuf::from(value)),
                        _ => parsed.input = Some(PathBuf::from(value)),
                    }
                }
                flag if flag.starts_with('-') => {
                    bail!(
                        "Unknown flag '{flag}'. Supported flags: -t, -p, --samples, --seed, --config, \
                         --input, --serial."
                    )
                }
                positional => {
                    if name.is_some() {
                        bail!("Unexpected argument '{positional}'. Only one base name is accepted.");
                    }
                    name = Some(positional.to_string());
                }
            }
        }
        Ok(name.map(|name| CliArgs { name, ..parsed }))
    }

    /// Source image: `--input` when given, `<name>.hdr` otherwise.
    pub fn input_path(&self) -> PathBuf {
        self.input.clone().unwrap_or_else(|| PathBuf::from(format!("{}.hdr", self.name)))
    }

    pub fn output_path(&self, suffix: &str) -> PathBuf {
        PathBuf::from(format!("{}{suffix}", self.name))
    }
}

pub fn usage() -> &'static str {
    "ambient_dice

Usage:
  ambient_dice -t <name>            write <name>.hdr back out as <name>_ori.png
  ambient_dice [-p] <name> [opts]   fit the 12-lobe basis to <name>.hdr

Options:
  --samples <n>     samples per integral (default 65536)
  --seed <n>        scramble the sample sequence with this seed
  --config <path>   JSON fit configuration
  --input <path>    read the environment from <path> instead of <name>.hdr
  --serial          assemble integrals on the calling thread only

Fitting prints the 12 coefficients and writes <name>_c<i>.png per lobe,
<name>_fit.png with the full reconstruction and <name>_coefs.json.
"
}
