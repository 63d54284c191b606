use std::path::{Path, PathBuf};

use anyhow::Context;
use parkaccess_core::prelude::{InputPaths, PipelineConfig};
use serde::Deserialize;

/// Contents of `parkaccess.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub inputs: InputPaths,
    /// Directory holding the published generations
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl RunConfig {
    /// Reads the config file. Relative paths inside it are taken relative
    /// to the file's own directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        let inputs = &mut self.inputs;
        join(&mut inputs.boundary);
        join(&mut inputs.streets);
        join(&mut inputs.parks);
        join(&mut inputs.tracts);
        join(&mut inputs.neighborhoods);
        if let Some(residential) = inputs.residential.as_mut() {
            join(residential);
        }
        join(&mut self.output_dir);
    }
}
