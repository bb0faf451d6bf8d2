use std::path::Path;

use anyhow::Context;
use log::{info, warn};
use reactive_lights_core::config::ControllerConfig;

pub const DEFAULT_CONFIG_PATH: &str = "lights.json";

/// Fields missing from the json get their defaults.
pub fn parse_config(json: &str) -> anyhow::Result<ControllerConfig> {
    let config = serde_json::from_str(json)?;

    Ok(config)
}

/// A missing file is not an error. Everything is defaulted instead.
pub fn load_config(path: &Path) -> anyhow::Result<ControllerConfig> {
    if !path.exists() {
        warn!("{} not found. using the default settings", path.display());

        return Ok(ControllerConfig::default());
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;

    let config =
        parse_config(&json).with_context(|| format!("failed parsing {}", path.display()))?;

    info!("loaded settings from {}", path.display());

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config = parse_config(
            r#"{
                "output_port": "/dev/ttyACM1",
                "reactive": false,
                "colors": [[0, 255, 0], [0, 0, 255]],
                "energy_range": [1.0, 80.0],
                "device_index": 2
            }"#,
        )
        .unwrap();

        assert_eq!(config.output_port, "/dev/ttyACM1");
        assert!(!config.reactive);
        assert_eq!(config.colors, vec![[0, 255, 0], [0, 0, 255]]);
        assert_eq!(config.energy_range, [1.0, 80.0]);
        assert_eq!(config.device_index, Some(2));

        // everything else is the default
        assert_eq!(config.fft_chunk, 1024);
        assert_eq!(config.audio_rate, 44_100);
        assert_eq!(config.hue_max, 280.0);
        assert!(config.output_enabled);
    }

    #[test]
    fn test_empty_json_is_the_default() {
        assert_eq!(parse_config("{}").unwrap(), ControllerConfig::default());
    }

    #[test]
    fn test_bad_json() {
        assert!(parse_config(r#"{"fft_chunk": "big"}"#).is_err());
        assert!(parse_config("not json").is_err());
    }

    #[test]
    fn test_round_trip_default() {
        let json = serde_json::to_string_pretty(&ControllerConfig::default()).unwrap();

        assert_eq!(parse_config(&json).unwrap(), ControllerConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let config = load_config(Path::new("/this/path/does/not/exist/lights.json")).unwrap();

        assert_eq!(config, ControllerConfig::default());
    }
}
