use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs::read_to_string;

use crate::constants::CONFIG_FILE;
use crate::sources::{PcmSource, SineSource, StreamFormat, WavSource};
use crate::stream::StreamOptions;

fn default_sample_rate() -> u32 {
    44100
}

fn default_channels() -> u16 {
    2
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InputConfig {
    /// 16-bit WAV file
    Wav { path: PathBuf },

    /// Generated test tone, endless when `seconds` is left out
    Sine {
        frequency: f64,
        seconds: Option<f64>,
        #[serde(default = "default_sample_rate")]
        sample_rate: u32,
        #[serde(default = "default_channels")]
        channels: u16,
    },
}

impl InputConfig {
    pub fn open(&self) -> Result<Box<dyn PcmSource + Send>> {
        let source: Box<dyn PcmSource + Send> = match self {
            InputConfig::Wav { path } => Box::new(WavSource::open(path)?),
            InputConfig::Sine {
                frequency,
                seconds,
                sample_rate,
                channels,
            } => {
                let format = StreamFormat::pcm16(*sample_rate, *channels);
                match seconds {
                    Some(seconds) => {
                        Box::new(SineSource::with_duration(format, *frequency, *seconds))
                    }
                    None => Box::new(SineSource::new(format, *frequency, None)),
                }
            }
        };

        Ok(source)
    }

    fn is_endless(&self) -> bool {
        matches!(self, InputConfig::Sine { seconds: None, .. })
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct OutputConfig {
    /// Render the stretched stream into this WAV file
    pub path: Option<PathBuf>,

    /// Serve the stretched stream as WAV over TCP on this address
    pub listen: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub input: InputConfig,

    #[serde(default)]
    pub stream: StreamOptions,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.output.path.is_none() && self.output.listen.is_none() {
            bail!("No output configured, set output.path and/or output.listen");
        }
        if self.output.path.is_some() && self.input.is_endless() {
            bail!("Cannot render an endless sine input to a file, set input.seconds");
        }
        Ok(())
    }
}

pub fn parse(config: &str) -> Result<Config> {
    let config: Config = toml::from_str(config)?;
    config.validate()?;

    Ok(config)
}

pub async fn load() -> Result<Config> {
    load_from(CONFIG_FILE).await
}

pub async fn load_from<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let config = read_to_string(path)
        .await
        .with_context(|| format!("Could not read config file {}", path.display()))?;

    parse(&config).with_context(|| format!("Invalid config file {}", path.display()))
}
