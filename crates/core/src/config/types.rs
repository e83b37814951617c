use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::dispatcher::MixPolicy;
use crate::generator::GeneratorConfig;
use crate::mixer::MixerConfig;
use crate::orchestrator::PipelineConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub mix: MixPolicy,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub mixer: MixerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("meditone.db")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
    pub mix: MixPolicy,
    pub generator: SanitizedGeneratorConfig,
    pub mixer: MixerConfig,
}

/// Sanitized generator config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGeneratorConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub voice: String,
    pub format: String,
    pub timeout_secs: u64,
    pub output_dir: PathBuf,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let generator = &config.generator;
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            pipeline: config.pipeline.clone(),
            mix: config.mix.clone(),
            generator: SanitizedGeneratorConfig {
                url: generator.url.clone(),
                api_key_configured: generator
                    .api_key
                    .as_ref()
                    .is_some_and(|key| !key.is_empty()),
                voice: generator.voice.clone(),
                format: generator.format.clone(),
                timeout_secs: generator.timeout_secs,
                output_dir: generator.output_dir.clone(),
            },
            mixer: config.mixer.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "meditone.db");
        assert_eq!(config.pipeline.max_jobs_per_run, 10);
        assert_eq!(config.mix.narration_gain, 1.0);
        assert_eq!(config.mix.ambient_gain, 0.35);
        assert_eq!(config.generator.url, "http://localhost:5002");
        assert_eq!(config.mixer.ffmpeg_path.to_str().unwrap(), "ffmpeg");
    }

    #[test]
    fn test_deserialize_sections() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[database]
path = "/data/meditone.sqlite"

[pipeline]
enabled = true
max_jobs_per_run = 4

[mix]
ambient_gain = 0.2
default_ambient_track = "/srv/ambient/forest.mp3"

[generator]
url = "http://tts:5002"
voice = "warm-male-2"

[mixer]
bitrate_kbps = 128
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.database.path.to_str().unwrap(),
            "/data/meditone.sqlite"
        );
        assert!(config.pipeline.enabled);
        assert_eq!(config.pipeline.max_jobs_per_run, 4);
        assert_eq!(config.mix.ambient_gain, 0.2);
        assert_eq!(config.mix.narration_gain, 1.0); // default
        assert_eq!(config.mix.default_ambient_track, "/srv/ambient/forest.mp3");
        assert_eq!(config.generator.voice, "warm-male-2");
        assert_eq!(config.mixer.bitrate_kbps, 128);
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let mut config = Config::default();
        config.generator.api_key = Some("secret-key".to_string());

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.generator.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
    }

    #[test]
    fn test_sanitized_config_without_api_key() {
        let sanitized = SanitizedConfig::from(&Config::default());
        assert!(!sanitized.generator.api_key_configured);
        assert_eq!(sanitized.server.port, 8080);
    }
}
