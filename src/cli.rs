use std::path::PathBuf;

use crate::config::{parse_resolution, Options};
use crate::logging::LogLevel;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// AR sign-language hand demonstrations
#[derive(Parser, Debug, Default)]
#[command(name = "signhands")]
#[command(version = "0.1.0")]
#[command(about = "Plays sign-language hand animations on a tracked surface", long_about = None)]
pub struct Cli {
    /// View resolution (e.g., 640x480)
    #[arg(short, long, value_name = "WIDTHxHEIGHT", global = true)]
    pub res: Option<String>,

    /// Configuration directory path
    #[arg(short, long, value_name = "CONFIGDIR", global = true)]
    pub configdir: Option<String>,

    /// Sign catalog (JSON array)
    #[arg(long, value_name = "FILE", global = true)]
    pub catalog: Option<String>,

    /// Animation scene description (JSON)
    #[arg(long, value_name = "FILE", global = true)]
    pub scene: Option<String>,

    /// Log level (nothing, user, error, warning, info, debug, all)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub loglevel: Option<String>,

    /// Log file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub logfile: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a scripted headless session, playing the given sign keys
    Demo {
        /// Sign keys to play; every catalog entry when empty
        signs: Vec<String>,
    },
    /// Print the sign menu rows
    List,
    /// Collapse nested <animation> elements of a COLLADA file into one clip
    FlattenDae { path: PathBuf },
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        // Override with command line arguments
        if let Some(ref res) = self.res {
            opts.resolution = parse_resolution(res).context("Invalid resolution format")?;
        }

        if let Some(ref config_dir) = self.configdir {
            opts.config_dir = Some(config_dir.clone());
        }

        if let Some(ref catalog) = self.catalog {
            opts.catalog_path = PathBuf::from(catalog);
        }

        if let Some(ref scene) = self.scene {
            opts.scene_path = PathBuf::from(scene);
        }

        if let Some(ref level) = self.loglevel {
            opts.log_level = LogLevel::parse(level)?;
        }

        if let Some(ref log_file) = self.logfile {
            opts.log_file = Some(log_file.clone());
        }

        Ok(opts)
    }

    /// Subcommand to run; a bare invocation runs the full demo
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Demo { signs: Vec::new() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resolution;

    #[test]
    fn test_merge_basic_options() {
        let cli = Cli {
            res: Some("800x600".to_string()),
            catalog: Some("signs.json".to_string()),
            ..Default::default()
        };

        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(
            opts.resolution,
            Resolution {
                width: 800,
                height: 600
            }
        );
        assert_eq!(opts.catalog_path, PathBuf::from("signs.json"));
        assert_eq!(opts.scene_path, PathBuf::from("Animations.json"));
    }

    #[test]
    fn test_invalid_resolution() {
        let cli = Cli {
            res: Some("invalid".to_string()),
            ..Default::default()
        };
        assert!(cli.merge_into_options(Options::default()).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let cli = Cli {
            loglevel: Some("chatty".to_string()),
            ..Default::default()
        };
        assert!(cli.merge_into_options(Options::default()).is_err());
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["signhands", "demo", "yes", "no"]).unwrap();
        assert_eq!(
            cli.command(),
            Command::Demo {
                signs: vec!["yes".to_string(), "no".to_string()]
            }
        );

        let cli = Cli::try_parse_from(["signhands", "flatten-dae", "hands.dae"]).unwrap();
        assert_eq!(
            cli.command(),
            Command::FlattenDae {
                path: PathBuf::from("hands.dae")
            }
        );

        let cli = Cli::try_parse_from(["signhands", "list", "--loglevel", "debug"]).unwrap();
        assert_eq!(cli.command(), Command::List);
        assert_eq!(cli.loglevel.as_deref(), Some("debug"));
    }

    #[test]
    fn test_bare_invocation_runs_demo() {
        let cli = Cli::try_parse_from(["signhands"]).unwrap();
        assert_eq!(cli.command(), Command::Demo { signs: Vec::new() });
    }

    #[test]
    fn test_flatten_requires_path() {
        assert!(Cli::try_parse_from(["signhands", "flatten-dae"]).is_err());
    }
}
