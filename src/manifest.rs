use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use serde_with::serde_as;

use crate::{prelude::*, timestamp::MeterTimestamp};

/// Run parameters stored next to the output, so that results can be reproduced.
#[serde_as]
#[derive(Serialize)]
pub struct Manifest<'a, P> {
    pub version: &'static str,

    #[serde_as(as = "MeterTimestamp")]
    pub created_at: NaiveDateTime,

    pub output: &'a Path,

    pub parameters: P,
}

impl<'a, P: Serialize> Manifest<'a, P> {
    pub fn new(output: &'a Path, parameters: P) -> Self {
        Self {
            version: clap::crate_version!(),
            created_at: Local::now().naive_local(),
            output,
            parameters,
        }
    }

    /// Write the manifest as `<name>.toml` in the output directory.
    #[instrument(skip_all, fields(name = name))]
    pub fn write(&self, name: &str) -> Result<PathBuf> {
        let path = self.output.with_file_name(format!("{name}.toml"));
        let manifest = toml::to_string_pretty(self).context("failed to serialize the manifest")?;
        std::fs::write(&path, manifest)
            .with_context(|| format!("cannot write the manifest `{}`", path.display()))?;
        info!(path = %path.display(), "saved the run parameters");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Parameters {
        capacity: f64,
        rules: Vec<String>,
    }

    #[test]
    fn to_toml() -> Result {
        let manifest = Manifest::new(
            Path::new("data/output.csv"),
            Parameters { capacity: 10_000.0, rules: vec!["1234567-0-24-0.3".to_string()] },
        );
        let toml = toml::to_string_pretty(&manifest)?;
        assert!(toml.contains("output = \"data/output.csv\""));
        assert!(toml.contains("[parameters]"));
        assert!(toml.contains("capacity = 10000.0"));
        Ok(())
    }
}
