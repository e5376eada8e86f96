// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables and an optional file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pitchline_calibration::{EngineConfig, ProjectionModel};

/// CLI configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Engine tolerances and calibration settings.
    pub engine: EngineConfig,
    /// Directory that default output files are written to.
    pub output_dir: Option<PathBuf>,
    /// Emit JSON log lines instead of pretty output.
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unparsable values fall
    /// back to the defaults.
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut engine = EngineConfig::default();

        engine.drawing.epsilon = parse_or(var("PITCHLINE_EPSILON"), engine.drawing.epsilon);
        engine.drawing.arc_samples =
            parse_or(var("PITCHLINE_ARC_SAMPLES"), engine.drawing.arc_samples).max(2);
        engine.drawing.strict_topology = var("PITCHLINE_STRICT_TOPOLOGY")
            .map(|v| flag(&v))
            .unwrap_or(engine.drawing.strict_topology);
        engine.calibration.waste_factor = parse_or(
            var("PITCHLINE_WASTE_FACTOR"),
            engine.calibration.waste_factor,
        );
        engine.calibration.projection = parse_or::<ProjectionModel>(
            var("PITCHLINE_PROJECTION"),
            engine.calibration.projection,
        );

        Self {
            engine,
            output_dir: var("PITCHLINE_OUTPUT_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            log_json: var("PITCHLINE_LOG_JSON").is_some_and(|v| flag(&v)),
        }
    }

    /// Replaces the engine settings with those in a JSON config file.
    /// Keys missing from the file take their default values.
    pub fn with_file(mut self, path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        self.engine = serde_json::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(self)
    }

    /// Where a default output file called `name` goes.
    pub fn output_path(&self, name: &str) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.engine.drawing.arc_samples, 100);
        assert!(config.engine.drawing.strict_topology);
        assert_eq!(config.engine.calibration.projection, ProjectionModel::InclinedPlane);
        assert!(config.output_dir.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("PITCHLINE_EPSILON", "0.001"),
            ("PITCHLINE_ARC_SAMPLES", "24"),
            ("PITCHLINE_WASTE_FACTOR", "1.2"),
            ("PITCHLINE_PROJECTION", "fall-line"),
            ("PITCHLINE_STRICT_TOPOLOGY", "false"),
            ("PITCHLINE_OUTPUT_DIR", "out"),
            ("PITCHLINE_LOG_JSON", "1"),
        ]));
        approx::assert_relative_eq!(config.engine.drawing.epsilon, 0.001);
        assert_eq!(config.engine.drawing.arc_samples, 24);
        approx::assert_relative_eq!(config.engine.calibration.waste_factor, 1.2);
        assert_eq!(config.engine.calibration.projection, ProjectionModel::FallLine);
        assert!(!config.engine.drawing.strict_topology);
        assert_eq!(config.output_path("a.json"), PathBuf::from("out").join("a.json"));
        assert!(config.log_json);
    }

    #[test]
    fn garbage_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("PITCHLINE_EPSILON", "tiny"),
            ("PITCHLINE_PROJECTION", "orthographic"),
            ("PITCHLINE_ARC_SAMPLES", "1"),
        ]));
        approx::assert_relative_eq!(config.engine.drawing.epsilon, 1e-6);
        assert_eq!(config.engine.calibration.projection, ProjectionModel::InclinedPlane);
        assert_eq!(config.engine.drawing.arc_samples, 2);
    }
}
