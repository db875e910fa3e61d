mod cmd;
mod config;

use anyhow::Result;
use clap::Command;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    cmd::build::add_build_args(Command::new("tiny"))
        .version(env!("CARGO_PKG_VERSION"))
        .about("Static tiny URL shortener: turn a JSON map of links into redirect pages")
        .args_conflicts_with_subcommands(true)
        .subcommand(cmd::build::make_subcommand())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let matches = cli().get_matches();

    // `tiny` on its own behaves like `tiny build`
    match matches.subcommand() {
        Some(("build", sub)) => cmd::build::execute(sub),
        _ => cmd::build::execute(&matches),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_flags_without_subcommand() {
        let matches = cli()
            .try_get_matches_from(["tiny", "-o", "public", "--error-page", "missing.html"])
            .unwrap();

        assert!(matches.subcommand().is_none());
        assert_eq!(matches.get_one::<String>("output").unwrap(), "public");
    }

    #[test]
    fn test_build_subcommand() {
        let matches = cli()
            .try_get_matches_from(["tiny", "build", "--json-file", "links.json"])
            .unwrap();

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "build");
        assert_eq!(sub.get_one::<String>("json_file").unwrap(), "links.json");
    }
}
