//! Yugo CLI
//!
//! Single binary static site generator with a canonical HTML pretty-printer.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use yugo::cmd::{BuildArgs, serve::ServeArgs};

/// Command-line interface for yugo.
#[derive(Parser)]
#[command(name = "yugo", version, about = "A simple static site generator")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Initialize a new site from the built-in example
    Init {
        /// Directory to create the site in
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Build a site into its output directory
    ///
    /// If a file is given, only that file is rendered, to OUTFILE or stdout.
    Build {
        /// Path to the site directory
        #[arg(long, default_value = ".")]
        site: PathBuf,

        #[command(flatten)]
        build: BuildArgs,

        /// Single file to render
        infile: Option<PathBuf>,

        /// Where to write the single rendered file
        #[arg(requires = "infile")]
        outfile: Option<PathBuf>,
    },
    /// Serve a site with live reload, rebuilding on changes
    Serve {
        /// Path to the site directory
        #[arg(long, default_value = ".")]
        site: PathBuf,

        #[command(flatten)]
        build: BuildArgs,

        #[command(flatten)]
        serve: ServeArgs,
    },
    /// Normalize and pretty-print an HTML document to stdout
    Tidy {
        /// HTML file to read (default: stdin)
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    yugo::init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { dir } => {
            yugo::cmd::init::run(&dir)?;
        }
        Commands::Build {
            site,
            build,
            infile,
            outfile,
        } => {
            yugo::cmd::build::run(&site, &build, infile.as_deref(), outfile.as_deref())?;
        }
        Commands::Serve { site, build, serve } => {
            yugo::cmd::serve::run(&site, &build, &serve).await?;
        }
        Commands::Tidy { file } => {
            yugo::cmd::tidy::run(file.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_build_command_parsing() {
        let args = ["yugo", "build", "--outdir", "dist", "--site", "blog"];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.verbose, 0);

        match cli.command {
            Commands::Build {
                site,
                build,
                infile,
                outfile,
            } => {
                assert_eq!(site, PathBuf::from("blog"));
                assert_eq!(build.outdir, Some(PathBuf::from("dist")));
                assert!(build.base_template.is_none());
                assert!(build.tidy_html.is_none());
                assert!(infile.is_none());
                assert!(outfile.is_none());
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_build_single_file() {
        let args = ["yugo", "build", "--tidy-html", "false", "content/a.md", "a.html"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Build {
                build,
                infile,
                outfile,
                ..
            } => {
                assert_eq!(build.tidy_html, Some(false));
                assert_eq!(infile, Some(PathBuf::from("content/a.md")));
                assert_eq!(outfile, Some(PathBuf::from("a.html")));
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_serve_command_parsing() {
        let args = [
            "yugo",
            "serve",
            "--port",
            "9000",
            "--live-reload",
            "false",
            "--base-template",
            "page.html",
            "--open",
        ];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Serve { site, build, serve } => {
                assert_eq!(site, PathBuf::from("."));
                assert_eq!(build.base_template.as_deref(), Some("page.html"));
                assert_eq!(serve.port, Some(9000));
                assert_eq!(serve.live_reload, Some(false));
                assert!(serve.host.is_none());
                assert!(serve.open);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_init_default_dir() {
        let cli = Cli::parse_from(["yugo", "init"]);
        match cli.command {
            Commands::Init { dir } => assert_eq!(dir, PathBuf::from(".")),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_cli_tidy_stdin() {
        let cli = Cli::parse_from(["yugo", "tidy"]);
        match cli.command {
            Commands::Tidy { file } => assert!(file.is_none()),
            _ => panic!("Expected Tidy command"),
        }
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let cli = Cli::parse_from(["yugo", "-vvv", "build"]);
        assert_eq!(cli.verbose, 3);

        let cli = Cli::parse_from(["yugo", "build", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_bad_bool() {
        let result = Cli::try_parse_from(["yugo", "build", "--tidy-html", "maybe"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
