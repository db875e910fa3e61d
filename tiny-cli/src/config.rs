use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tiny_core::{BuildOptions, Verbosity};

/// Build settings merged from defaults, `TINY_*` environment variables and
/// command line flags.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BuildConfig {
    /// Link registry JSON file
    pub json_file: String,
    /// Output directory for the generated site
    pub output: String,
    /// HTML template with `{{ ... }}` placeholders
    pub template: String,
    /// Site configuration file (base URL)
    pub config: String,
    /// Static error page copied into the output
    pub error_page: String,
    /// File name of the generated sitemap
    pub sitemap: String,
    /// Print progress lines
    pub verbose: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            json_file: "url.json".to_string(),
            output: "_site".to_string(),
            template: "template.html".to_string(),
            config: "config.json".to_string(),
            error_page: "404.html".to_string(),
            sitemap: "sitemap.xml".to_string(),
            verbose: true,
        }
    }
}

impl BuildConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (TINY_*)
    /// 3. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        Self::load_from(args, Environment::with_prefix("TINY").prefix_separator("_"))
    }

    fn load_from(args: &ArgMatches, env: Environment) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Environment variables
        builder = builder.add_source(env);

        // 3. CLI arguments, only those actually given
        let mut cli_overrides = HashMap::new();
        for key in ["json_file", "output", "template", "config", "error_page", "sitemap"] {
            if let Some(value) = args.try_get_one::<String>(key).unwrap_or(None) {
                cli_overrides.insert(key.to_string(), value.clone());
            }
        }
        if args.try_get_one::<bool>("quiet").unwrap_or(None) == Some(&true) {
            cli_overrides.insert("verbose".to_string(), "false".to_string());
        }

        if !cli_overrides.is_empty() {
            builder = builder.add_source(config::Config::try_from(&cli_overrides)?);
        }

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            registry: PathBuf::from(&self.json_file),
            output_dir: PathBuf::from(&self.output),
            template: PathBuf::from(&self.template),
            config: PathBuf::from(&self.config),
            error_page: PathBuf::from(&self.error_page),
            sitemap_name: self.sitemap.clone(),
            verbosity: Verbosity::from(self.verbose),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::build::add_build_args;
    use clap::Command;

    fn matches(args: &[&str]) -> ArgMatches {
        add_build_args(Command::new("tiny"))
            .try_get_matches_from(args)
            .unwrap()
    }

    fn empty_env() -> Environment {
        Environment::with_prefix("TINY_TEST_UNSET").source(Some(HashMap::new()))
    }

    #[test]
    fn test_default_config() {
        let config = BuildConfig::load_from(&matches(&["tiny"]), empty_env()).unwrap();
        assert_eq!(config, BuildConfig::default());

        let options = config.build_options();
        assert_eq!(options, BuildOptions::default());
    }

    #[test]
    fn test_cli_args_override() {
        let config = BuildConfig::load_from(
            &matches(&["tiny", "-j", "links.json", "--output", "public", "-q"]),
            empty_env(),
        )
        .unwrap();

        assert_eq!(config.json_file, "links.json");
        assert_eq!(config.output, "public");
        assert!(!config.verbose);
        // Should still have defaults for non-overridden values
        assert_eq!(config.template, "template.html");
        assert_eq!(config.build_options().verbosity, Verbosity::Quiet);
    }

    #[test]
    fn test_env_overrides_defaults() {
        let env = Environment::with_prefix("TINY")
            .prefix_separator("_")
            .source(Some(HashMap::from([
                ("TINY_OUTPUT".to_string(), "dist".to_string()),
                ("TINY_VERBOSE".to_string(), "false".to_string()),
            ])))
            .try_parsing(true);

        let config = BuildConfig::load_from(&matches(&["tiny"]), env).unwrap();
        assert_eq!(config.output, "dist");
        assert!(!config.verbose);
    }

    #[test]
    fn test_cli_beats_env() {
        let env = Environment::with_prefix("TINY")
            .prefix_separator("_")
            .source(Some(HashMap::from([(
                "TINY_OUTPUT".to_string(),
                "dist".to_string(),
            )])));

        let config = BuildConfig::load_from(&matches(&["tiny", "-o", "public"]), env).unwrap();
        assert_eq!(config.output, "public");
    }
}
