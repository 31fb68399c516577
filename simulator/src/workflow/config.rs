use anyhow::Context;
use flightcore::prelude::Settings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generator::profile::GeneratorConfig;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub settings: Settings,
    /// Evaluate independent nodes of a wave concurrently.
    pub parallel: bool,
    pub generator: GeneratorConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(duration_s: f64, seed: u64, parallel: bool) -> Self {
        Self {
            settings: Settings::default(),
            parallel,
            generator: GeneratorConfig {
                duration_s,
                seed,
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_default_settings() {
        let cfg = WorkflowConfig::from_args(1800.0, 7, true);
        assert_eq!(cfg.generator.duration_s, 1800.0);
        assert_eq!(cfg.generator.seed, 7);
        assert_eq!(cfg.settings, Settings::default());
        assert!(cfg.parallel);
    }

    #[test]
    fn config_load_reads_partial_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"parallel: true\nsettings:\n  rate_of_climb_lag_tc: 4.0\ngenerator:\n  engines: 4\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert!(cfg.parallel);
        assert_eq!(cfg.settings.rate_of_climb_lag_tc, 4.0);
        assert_eq!(cfg.settings.gravity, 32.2);
        assert_eq!(cfg.generator.engines, 4);
        assert_eq!(cfg.generator.duration_s, 3600.0);
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkflowConfig::load("/nonexistent/workflow.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("reading workflow config"));
    }
}
