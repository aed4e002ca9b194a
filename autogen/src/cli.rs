use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Autogen - bootstrap a Python venv once, then run the symbol build tool on every *.yaml
#[derive(Parser, Debug)]
#[command(name = "autogen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Defaults to `run` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Directory containing the *.yaml files (default: current directory)
    #[arg(long, value_name = "DIR", global = true)]
    pub dir: Option<PathBuf>,

    /// Virtual environment directory, relative to --dir (default: from env or "venv")
    #[arg(long, value_name = "DIR", global = true)]
    pub env_dir: Option<PathBuf>,

    /// Requirements manifest, relative to --dir (default: from env or "requirements.txt")
    #[arg(long, value_name = "FILE", global = true)]
    pub requirements: Option<PathBuf>,

    /// Build tool run once per file (default: from env or "build_lib.py")
    #[arg(long, value_name = "NAME", global = true)]
    pub tool: Option<String>,

    /// Interpreter used to create the venv (default: python3, then python, on PATH)
    #[arg(long, value_name = "PATH", global = true)]
    pub python: Option<PathBuf>,

    /// Stop at the first failing build and exit non-zero
    #[arg(long, global = true)]
    pub strict: bool,

    /// Print what would run without starting any process
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Bootstrap the environment, then build every *.yaml file (default)
    Run,

    /// Only create the environment and install the requirements (if missing)
    Bootstrap,

    /// List the *.yaml files that would be built
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_means_run_with_defaults() {
        let cli = Cli::try_parse_from(["autogen"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(!cli.global.strict);
        assert_eq!(cli.global.dir, None);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "autogen",
            "run",
            "--strict",
            "--env-dir",
            ".venv",
            "--tool",
            "build_lib_ic.py",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Commands::Run));
        assert!(cli.global.strict);
        assert_eq!(cli.global.env_dir, Some(PathBuf::from(".venv")));
        assert_eq!(cli.global.tool.as_deref(), Some("build_lib_ic.py"));
    }

    #[test]
    fn test_list_with_dir() {
        let cli = Cli::try_parse_from(["autogen", "--dir", "symbols", "list", "--json"]).unwrap();
        assert_eq!(cli.command, Some(Commands::List));
        assert_eq!(cli.global.dir, Some(PathBuf::from("symbols")));
        assert!(cli.global.json);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
