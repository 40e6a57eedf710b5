//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Practice lab CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Content directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub content: Option<PathBuf>,

    /// Config file path (default: lab.toml)
    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = "lab.toml",
        value_hint = clap::ValueHint::FilePath
    )]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the practice lab server
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Transpile and assemble fragments without a browser
    #[command(visible_alias = "r")]
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Read a content file the way the lab page does
    #[command(visible_alias = "f")]
    Fetch {
        /// File path, relative to the content root
        path: String,

        /// Also render the content as HTML
        #[arg(long)]
        html: bool,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Look up a category, topic or example in the curriculum
    #[command(visible_alias = "l")]
    Lookup {
        /// Category id
        category: String,

        /// Topic id
        topic: Option<String>,

        /// Example id
        example: Option<String>,
    },
}

/// Run command arguments. Omitted fragments are empty.
#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// HTML fragment file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub html: Option<PathBuf>,

    /// CSS fragment file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub css: Option<PathBuf>,

    /// JavaScript fragment file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub js: Option<PathBuf>,

    /// TypeScript fragment file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub ts: Option<PathBuf>,

    /// Write the document here instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Script target for TypeScript output (e.g., es2017, es2020)
    #[arg(short, long)]
    pub target: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_every_subcommand() {
        for argv in [
            &["lab", "serve"][..],
            &["lab", "-v", "serve", "-i", "0.0.0.0", "-p", "8080"],
            &["lab", "run", "--ts", "a.ts", "-o", "out.html", "-t", "es2020"],
            &["lab", "fetch", "html/index.html", "--html", "-p"],
            &["lab", "lookup", "html", "basics"],
        ] {
            assert!(Cli::try_parse_from(argv).is_ok(), "{argv:?}");
        }
    }

    #[test]
    fn test_verbose_and_version_flags() {
        let cli = Cli::try_parse_from(["lab", "serve", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Serve { port: None, .. }));

        let err = Cli::try_parse_from(["lab", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
