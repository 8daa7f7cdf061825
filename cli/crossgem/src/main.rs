//! crossgem CLI — verify cross-compiled native extension artifacts.

mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crossgem_targets::{load_catalog, CrossCompileCatalog, OsFamily};
use tracing_subscriber::EnvFilter;

use config::CrossgemConfig;

#[derive(Parser)]
#[command(
    name = "crossgem",
    version,
    about = "Verify cross-compiled native extension artifacts"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify one artifact against one platform
    Verify {
        /// Ruby version the artifact was built for (e.g., 3.1.2)
        #[arg(long)]
        ruby_version: String,
        /// Host triple (e.g., x86_64-w64-mingw32)
        #[arg(long)]
        host: String,
        /// Path to the compiled extension
        artifact: PathBuf,
        /// Directory containing the cross binutils
        #[arg(long)]
        tool_dir: Option<PathBuf>,
        /// Inspection timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Verify the staged artifact of every catalog entry
    Check {
        /// Catalog file (default: .cross_rubies)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Directory the artifact layout is resolved against
        #[arg(long)]
        root: Option<PathBuf>,
        /// Only check one OS family (windows, linux)
        #[arg(long)]
        family: Option<String>,
        /// Report format (human, json)
        #[arg(long)]
        report: Option<String>,
        /// Directory containing the cross binutils
        #[arg(long)]
        tool_dir: Option<PathBuf>,
        /// Inspection timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List the unique platforms in the catalog
    Platforms {
        /// Catalog file (default: .cross_rubies)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Only list one OS family (windows, linux)
        #[arg(long)]
        family: Option<String>,
    },
    /// Show the expectation table for a platform
    Describe {
        /// Ruby version (e.g., 3.1.2)
        #[arg(long)]
        ruby_version: String,
        /// Host triple (e.g., x86_64-linux)
        #[arg(long)]
        host: String,
    },
    /// Print the RUBY_CC_VERSION value for the catalog
    RcVersion {
        /// Catalog file (default: .cross_rubies)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Check that the per-platform inspection tools are installed
    Doctor {
        /// Catalog file (default: .cross_rubies)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// `-v` forces debug output; otherwise `RUST_LOG` applies, defaulting to info.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    execute(cli.command, &cwd)
}

/// Dispatch a command. Configuration is only loaded by commands that use it.
fn execute(command: Commands, cwd: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Verify {
            ruby_version,
            host,
            artifact,
            tool_dir,
            timeout,
        } => {
            let (config, project_dir) = load_config(cwd)?;
            let verifier = config.verifier(&project_dir, tool_dir.as_deref(), timeout);
            commands::verify::run(&verifier, &ruby_version, &host, &artifact).map(|_| ())
        }

        Commands::Check {
            catalog,
            root,
            family,
            report,
            tool_dir,
            timeout,
        } => {
            let format = commands::check::ReportFormat::parse(report.as_deref())?;
            let family = parse_family(family.as_deref())?;
            let (config, project_dir) = load_config(cwd)?;
            let catalog = load_required_catalog(&config, &project_dir, catalog.as_deref())?;
            let root = config.artifact_root(&project_dir, root.as_deref());
            let verifier = config.verifier(&project_dir, tool_dir.as_deref(), timeout);
            commands::check::run(
                &verifier,
                &catalog,
                &root,
                config.artifact_template(),
                family,
                format,
            )
            .map(|_| ())
        }

        Commands::Platforms { catalog, family } => {
            let family = parse_family(family.as_deref())?;
            let (config, project_dir) = load_config(cwd)?;
            let catalog = load_required_catalog(&config, &project_dir, catalog.as_deref())?;
            commands::platforms::list(&catalog, family)
        }

        Commands::Describe { ruby_version, host } => {
            commands::platforms::describe(&ruby_version, &host)
        }

        Commands::RcVersion { catalog } => {
            let (config, project_dir) = load_config(cwd)?;
            let catalog = load_required_catalog(&config, &project_dir, catalog.as_deref())?;
            commands::platforms::rc_version(&catalog)
        }

        Commands::Doctor { catalog } => {
            let (config, project_dir) = load_config(cwd)?;
            let path = config.catalog_path(&project_dir, catalog.as_deref());
            let catalog = if path.is_file() {
                Some(load_catalog(&path).with_context(|| format!("loading {}", path.display()))?)
            } else {
                None
            };
            let verifier = config.verifier(&project_dir, None, None);
            commands::doctor::run(&verifier, catalog.as_ref())
        }
    }
}

/// Load `crossgem.toml` from the working directory upward. Without one, the
/// defaults apply relative to `cwd`.
fn load_config(cwd: &Path) -> anyhow::Result<(CrossgemConfig, PathBuf)> {
    match CrossgemConfig::find_and_load(cwd)? {
        Some((config, dir)) => Ok((config, dir)),
        None => Ok((CrossgemConfig::default(), cwd.to_path_buf())),
    }
}

fn load_required_catalog(
    config: &CrossgemConfig,
    project_dir: &Path,
    cli: Option<&Path>,
) -> anyhow::Result<CrossCompileCatalog> {
    let path = config.catalog_path(project_dir, cli);
    load_catalog(&path).with_context(|| format!("loading {}", path.display()))
}

fn parse_family(name: Option<&str>) -> anyhow::Result<Option<OsFamily>> {
    match name {
        None => Ok(None),
        Some(name) => match OsFamily::from_name(name) {
            Some(family) => Ok(Some(family)),
            None => bail!("unknown platform family '{name}' (expected windows or linux)"),
        },
    }
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use crossgem_inspect::Verifier;
    use crate::test_support::{CannedInspector, LINUX_DUMP};

    /// Full workflow: config → catalog → check.
    #[test]
    fn config_catalog_check_workflow() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("crossgem.toml"),
            "[catalog]\npath = \"rubies.txt\"\n\n[artifacts]\nroot = \"build\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("rubies.txt"),
            "# linux only\n3.1.2:x86_64-linux\n3.1.2:x86_64-linux\n2.7.6:i686-linux-gnu\n",
        )
        .unwrap();
        let nested = dir.path().join("ext");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, project_dir) = load_config(&nested).unwrap();
        assert_eq!(project_dir, dir.path());

        let catalog = load_required_catalog(&config, &project_dir, None).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.rc_versions(), "3.1.2:2.7.6");

        let verifier = Verifier::new(CannedInspector(LINUX_DUMP.into()));
        let root = config.artifact_root(&project_dir, None);
        let report = commands::check::run(
            &verifier,
            &catalog,
            &root,
            config.artifact_template(),
            None,
            commands::check::ReportFormat::Human,
        )
        .unwrap();
        assert!(report.all_passed());
        assert!(report.artifacts[1]
            .artifact
            .ends_with("build/tmp/x86-linux/stage/lib/nokogiri/2.7/nokogiri.so"));
    }

    #[test]
    fn defaults_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let (config, project_dir) = load_config(dir.path()).unwrap();
        // A stray crossgem.toml above the temp dir would change this.
        if project_dir == dir.path() {
            let err = load_required_catalog(&config, &project_dir, None).unwrap_err();
            assert!(format!("{err:#}").contains("catalog file not found"));
        }
    }

    #[test]
    fn describe_ignores_malformed_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("crossgem.toml"), "not toml [[[").unwrap();

        let describe = Commands::Describe {
            ruby_version: "3.1.2".into(),
            host: "x86_64-linux".into(),
        };
        execute(describe, dir.path()).unwrap();

        let platforms = Commands::Platforms {
            catalog: None,
            family: None,
        };
        let err = execute(platforms, dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"), "{err:#}");
    }

    #[test]
    fn family_names() {
        assert_eq!(parse_family(None).unwrap(), None);
        assert_eq!(parse_family(Some("linux")).unwrap(), Some(OsFamily::Linux));
        assert!(parse_family(Some("darwin")).is_err());
    }

    #[test]
    fn cli_parses_verify() {
        let cli = Cli::try_parse_from([
            "crossgem",
            "verify",
            "--ruby-version",
            "3.1.2",
            "--host",
            "x86_64-linux",
            "nokogiri.so",
        ])
        .unwrap();
        match cli.command {
            Commands::Verify {
                ruby_version,
                host,
                artifact,
                ..
            } => {
                assert_eq!(ruby_version, "3.1.2");
                assert_eq!(host, "x86_64-linux");
                assert_eq!(artifact, PathBuf::from("nokogiri.so"));
            }
            _ => panic!("expected verify"),
        }
    }

    #[test]
    fn cli_rejects_missing_host() {
        let args = ["crossgem", "verify", "--ruby-version", "3.1.2", "a.so"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn verbose_forces_debug_filter() {
        assert_eq!(log_filter(true).to_string(), "debug");
    }

    #[test]
    fn cli_verbose_is_global() {
        let cli = Cli::try_parse_from(["crossgem", "platforms", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
