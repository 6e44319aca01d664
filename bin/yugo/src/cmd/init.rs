//! Init command - write the starter site

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr, bail};
use yugo_core::CONFIG_FILE;
use yugo_generator::{EXAMPLE_SITE, resources};

/// Run the init command.
///
/// Installs the embedded example site into `dir`, creating it if needed.
/// Refuses to touch a directory that already holds a `yugo.toml`.
pub fn run(dir: &Path) -> Result<()> {
    tracing::info!(?dir, "Initializing site");

    if dir.join(CONFIG_FILE).exists() {
        bail!("{CONFIG_FILE} config already found in {}", dir.display());
    }

    fs::create_dir_all(dir).wrap_err_with(|| format!("Failed to create {}", dir.display()))?;
    let count = resources::install(EXAMPLE_SITE, dir).wrap_err("Failed to write example site")?;

    println!("Initialized a new site in {} ({count} files)", dir.display());
    println!("Run `yugo serve --site {}` to preview it.", dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_example_site() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("new-site");

        run(&site).unwrap();

        assert!(site.join("yugo.toml").exists());
        assert!(site.join("templates/base.html").exists());
        assert!(site.join("content/index.md").exists());
        assert!(site.join("static/style.css").exists());
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("yugo.toml"), "# mine").unwrap();

        let err = run(dir.path()).unwrap_err();
        assert!(err.to_string().contains("already found"));
        assert_eq!(fs::read_to_string(dir.path().join("yugo.toml")).unwrap(), "# mine");
    }
}
