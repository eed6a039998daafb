//! Configuration loading from hookbench.toml
//!
//! hookbench configuration can be specified in a `hookbench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.
//! Command-line flags override file values.

use hookbench_core::DEFAULT_ITERATIONS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file
pub const CONFIG_FILE: &str = "hookbench.toml";

/// hookbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HookbenchConfig {
    /// Benchmark run modes
    #[serde(default)]
    pub bench: BenchConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Benchmark run modes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Benchmark marked tests (same as `--bench`)
    #[serde(default)]
    pub enabled: bool,
    /// Skip unmarked tests (same as `--bench-only`)
    #[serde(default)]
    pub only: bool,
    /// Suppress collection around measured calls (same as `--bench-disable-gc`)
    #[serde(default)]
    pub disable_gc: bool,
    /// Iterations for markers that do not set `iterations`
    #[serde(default = "default_iterations")]
    pub default_iterations: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            only: false,
            disable_gc: false,
            default_iterations: default_iterations(),
        }
    }
}

fn default_iterations() -> u64 {
    DEFAULT_ITERATIONS
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Summary format: human or json
    #[serde(default = "default_format")]
    pub format: String,
    /// ANSI styling: auto, always or never
    #[serde(default = "default_color")]
    pub color: String,
    /// Fixed table width instead of the terminal's
    #[serde(default)]
    pub columns: Option<usize>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color: default_color(),
            columns: None,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}

impl HookbenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        if config.bench.default_iterations == 0 {
            anyhow::bail!("bench.default_iterations must be at least 1");
        }
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(dir)
    }

    /// Walk up from `dir` to the first `hookbench.toml` and load it
    pub fn discover_from(dir: impl Into<PathBuf>) -> Option<Self> {
        let mut dir = dir.into();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), error = %e, "ignoring invalid config");
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# hookbench Configuration

[bench]
# Benchmark marked tests (same as --bench)
enabled = false
# Skip tests without a benchmark marker (same as --bench-only)
only = false
# Suppress collection around each measured call (same as --bench-disable-gc)
disable_gc = false
# Iterations for markers that do not set their own
default_iterations = 100

[output]
# Summary format: human or json
format = "human"
# ANSI styling: auto, always or never
color = "auto"
# Fixed table width (uncomment to enable; default is the terminal width)
# columns = 120
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HookbenchConfig::default();
        assert!(!config.bench.enabled);
        assert!(!config.bench.only);
        assert_eq!(config.bench.default_iterations, 100);
        assert_eq!(config.output.format, "human");
        assert_eq!(config.output.columns, None);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [bench]
            enabled = true
            default_iterations = 25

            [output]
            columns = 120
        "#;

        let config: HookbenchConfig = toml::from_str(toml_str).unwrap();
        assert!(config.bench.enabled);
        assert_eq!(config.bench.default_iterations, 25);
        assert_eq!(config.output.columns, Some(120));
        // Defaults should still apply
        assert!(!config.bench.disable_gc);
        assert_eq!(config.output.color, "auto");
    }

    #[test]
    fn test_default_toml_parses() {
        let config: HookbenchConfig = toml::from_str(&HookbenchConfig::default_toml()).unwrap();
        assert_eq!(config.bench.default_iterations, DEFAULT_ITERATIONS);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_discover_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("crates").join("calc");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            root.path().join(CONFIG_FILE),
            "[bench]\nenabled = true\nonly = true\n",
        )
        .unwrap();

        let config = HookbenchConfig::discover_from(&nested).unwrap();
        assert!(config.bench.enabled);
        assert!(config.bench.only);
    }

    #[test]
    fn test_zero_default_iterations_rejected() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join(CONFIG_FILE);
        std::fs::write(&path, "[bench]\ndefault_iterations = 0\n").unwrap();

        assert!(HookbenchConfig::load(&path).is_err());
        assert!(HookbenchConfig::discover_from(root.path()).is_none());
    }
}
