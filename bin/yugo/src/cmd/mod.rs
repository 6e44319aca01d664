//! Command implementations.

pub mod build;
pub mod init;
pub mod serve;
pub mod tidy;

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use yugo_core::{CONFIG_FILE, Config, Options, clean_join};

/// Flags shared by `build` and `serve`. Unset flags keep the values from
/// `yugo.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, clap::Args)]
pub struct BuildArgs {
    /// Output directory, relative to the site directory (default: public)
    #[arg(long, value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// Base template name (default: base.html)
    #[arg(long, value_name = "NAME")]
    pub base_template: Option<String>,

    /// Normalize and pretty-print generated HTML
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub tidy_html: Option<bool>,
}

impl BuildArgs {
    /// Apply the flags that were given on top of `options`.
    pub fn apply(&self, options: &mut Options) {
        if let Some(outdir) = &self.outdir {
            options.out_dir = clean_join(&options.site_dir, outdir);
        }
        if let Some(base_template) = &self.base_template {
            options.base_template.clone_from(base_template);
        }
        if let Some(tidy_html) = self.tidy_html {
            options.tidy_html = tidy_html;
        }
    }
}

/// Load `yugo.toml` from `site_dir` and resolve options with the CLI flags
/// applied. The site directory is made absolute so watcher paths compare
/// against it.
pub fn load_site(site_dir: &Path, args: &BuildArgs) -> Result<(Config, Options)> {
    let site_dir = site_dir
        .canonicalize()
        .wrap_err_with(|| format!("Site directory {} not found", site_dir.display()))?;
    let config = Config::load_with_env(&site_dir.join(CONFIG_FILE))
        .wrap_err_with(|| format!("Failed to load {CONFIG_FILE} from {}", site_dir.display()))?;

    let mut options = Options::from_config(site_dir, &config);
    args.apply(&mut options);
    tracing::debug!(?options, "resolved options");

    Ok((config, options))
}
