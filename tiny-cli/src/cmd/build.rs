use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tiny_core::build_site;
use tracing::info;

use crate::config::BuildConfig;

/// Help text with the default shown; the value itself stays out of clap so
/// unset flags fall through to `TINY_*` variables.
fn with_default(help: &str, default: &str) -> String {
    format!("{help} [default: {default}]")
}

pub fn add_build_args(command: Command) -> Command {
    let defaults = BuildConfig::default();

    command
        .arg(
            Arg::new("json_file")
                .short('j')
                .long("json-file")
                .value_name("FILE")
                .help(with_default("JSON file mapping short links to targets", &defaults.json_file)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .visible_alias("parent-folder")
                .value_name("DIR")
                .help(with_default("Output directory for the generated site", &defaults.output)),
        )
        .arg(
            Arg::new("template")
                .short('t')
                .long("template")
                .visible_alias("template-file")
                .value_name("FILE")
                .help(with_default("HTML template for redirect pages", &defaults.template)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help(with_default("Site configuration file", &defaults.config)),
        )
        .arg(
            Arg::new("error_page")
                .long("error-page")
                .value_name("FILE")
                .help(with_default("Static error page copied into the output", &defaults.error_page)),
        )
        .arg(
            Arg::new("sitemap")
                .long("sitemap")
                .value_name("NAME")
                .help(with_default("File name of the generated sitemap", &defaults.sitemap)),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print warnings and errors")
                .action(ArgAction::SetTrue),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build"))
        .about("Generate redirect pages and a sitemap from a JSON link map")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let build_config = BuildConfig::load(args)?;
    let options = build_config.build_options();

    let report = build_site(options)
        .with_context(|| format!("Failed to build site from '{}'", build_config.json_file))?;

    if build_config.verbose {
        info!(
            "Site built in {}: {} page(s), {} skipped",
            report.output_dir.display(),
            report.rendered.len(),
            report.skipped.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_help_shows_config_defaults() {
        let defaults = BuildConfig::default();
        let command = add_build_args(Command::new("tiny"));

        for (id, default) in [
            ("json_file", &defaults.json_file),
            ("output", &defaults.output),
            ("template", &defaults.template),
            ("config", &defaults.config),
            ("error_page", &defaults.error_page),
            ("sitemap", &defaults.sitemap),
        ] {
            let arg = command.get_arguments().find(|a| a.get_id() == id).unwrap();
            let help = arg.get_help().unwrap().to_string();
            assert!(help.ends_with(&format!("[default: {default}]")), "{id}: {help}");
            assert!(arg.get_default_values().is_empty(), "{id} has a clap default");
        }
    }

    #[test]
    fn test_execute_builds_site() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("url.json"), r#"{"index": {"url": "https://a"}, "b": {"url": "https://b"}}"#).unwrap();
        fs::write(root.join("template.html"), "{{ url }}").unwrap();

        let path = |name: &str| root.join(name).to_string_lossy().to_string();
        let matches = make_subcommand()
            .try_get_matches_from([
                "build".to_string(),
                "-j".to_string(),
                path("url.json"),
                "-t".to_string(),
                path("template.html"),
                "-c".to_string(),
                path("config.json"),
                "--error-page".to_string(),
                path("404.html"),
                "-o".to_string(),
                path("_site"),
                "-q".to_string(),
            ])
            .unwrap();

        execute(&matches).unwrap();

        assert_eq!(fs::read_to_string(root.join("_site/index.html")).unwrap(), "https://a");
        assert_eq!(fs::read_to_string(root.join("_site/b/index.html")).unwrap(), "https://b");
        assert!(root.join("_site/sitemap.xml").is_file());
    }

    #[test]
    fn test_execute_fails_on_missing_registry() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = tmp.path().join("nope.json").to_string_lossy().to_string();

        let matches = make_subcommand()
            .try_get_matches_from(["build", "-q", "-j", registry.as_str()])
            .unwrap();

        let err = execute(&matches).unwrap_err();
        assert!(format!("{err:#}").contains("nope.json"));
    }
}
