//! Site configuration management.
//!
//! A site is a directory holding `yugo.toml` next to `content/`, `static/`
//! and `templates/`. [`Config`] mirrors the file; [`Options`] is the resolved
//! view the build and the dev server work from, after command-line overrides.

use std::{
    path::{Component, Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    frontmatter::toml_to_json,
};

/// Name of the configuration file at the site root.
pub const CONFIG_FILE: &str = "yugo.toml";

/// Main configuration structure for yugo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings.
    #[serde(default)]
    pub serve: ServeConfig,

    /// Free-form values exposed to templates as `site`.
    #[serde(default)]
    pub site: toml::Table,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory, relative to the site directory.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Template every page is rendered through.
    #[serde(default = "default_base_template")]
    pub base_template: String,

    /// Whether rendered pages are run through the HTML tidier.
    #[serde(default = "default_true")]
    pub tidy_html: bool,
}

/// Development server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether pages get the live-reload script and the server pushes
    /// reload events.
    #[serde(default = "default_true")]
    pub live_reload: bool,

    /// Quiet period after the last file change before rebuilding.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_out_dir() -> String {
    "public".to_string()
}

fn default_base_template() -> String {
    "base.html".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8817
}

fn default_debounce_ms() -> u64 {
    750
}

fn default_true() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            base_template: default_base_template(),
            tidy_html: true,
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            live_reload: true,
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `YUGO__SECTION__KEY` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("YUGO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        // The output directory is wiped on every build.
        let out_dir = Path::new(self.build.out_dir.trim());
        let below_site = out_dir.is_absolute()
            || matches!(clean_path(out_dir).components().next(), Some(Component::Normal(_)));
        if !below_site {
            return Err(CoreError::config(format!(
                "build.out_dir must name a directory below the site, got {:?}",
                self.build.out_dir
            )));
        }

        if self.build.base_template.is_empty() {
            return Err(CoreError::config("build.base_template cannot be empty"));
        }

        if self.serve.port == 0 {
            tracing::warn!("serve.port is 0, the OS will pick a port");
        }

        Ok(())
    }

    /// The `site` table as a JSON value for template contexts.
    pub fn site_value(&self) -> serde_json::Value {
        toml_to_json(toml::Value::Table(self.site.clone()))
    }
}

/// Lexically clean a path: drop `.` components and fold `..` into the
/// component before it. The filesystem is not consulted.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        PathBuf::from(".")
    } else {
        parts.iter().collect()
    }
}

/// Join `path` onto `base` and clean the result. An absolute `path`
/// replaces `base`.
pub fn clean_join(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    clean_path(&base.join(path))
}

/// Resolved settings for one build or serve session.
#[derive(Debug, Clone)]
pub struct Options {
    /// Site root directory.
    pub site_dir: PathBuf,

    /// Output directory.
    pub out_dir: PathBuf,

    /// Base template name.
    pub base_template: String,

    /// Run the HTML tidier on rendered pages.
    pub tidy_html: bool,

    /// Inject the live-reload script into pages.
    pub live_reload: bool,

    /// Dev server bind address.
    pub host: String,

    /// Dev server port.
    pub port: u16,

    /// Rebuild debounce.
    pub debounce: Duration,

    /// Template-visible site values.
    pub site: serde_json::Value,
}

impl Options {
    /// Resolve options from a loaded configuration.
    ///
    /// Live reload starts disabled: only the dev server turns it on.
    pub fn from_config(site_dir: impl Into<PathBuf>, config: &Config) -> Self {
        let site_dir = site_dir.into();
        Self {
            out_dir: clean_join(&site_dir, config.build.out_dir.trim()),
            site_dir,
            base_template: config.build.base_template.clone(),
            tidy_html: config.build.tidy_html,
            live_reload: false,
            host: config.serve.host.clone(),
            port: config.serve.port,
            debounce: Duration::from_millis(config.serve.debounce_ms),
            site: config.site_value(),
        }
    }

    /// Load `yugo.toml` from `site_dir` (with environment overrides) and
    /// resolve it.
    pub fn load(site_dir: impl Into<PathBuf>) -> Result<Self> {
        let site_dir = site_dir.into();
        let config = Config::load_with_env(&site_dir.join(CONFIG_FILE))?;
        Ok(Self::from_config(site_dir, &config))
    }

    /// Directory holding pages.
    pub fn content_dir(&self) -> PathBuf {
        self.site_dir.join("content")
    }

    /// Directory copied verbatim into the output.
    pub fn static_dir(&self) -> PathBuf {
        self.site_dir.join("static")
    }

    /// Directory holding templates.
    pub fn templates_dir(&self) -> PathBuf {
        self.site_dir.join("templates")
    }

    /// Whether wiping the output directory would also remove the site:
    /// the two are the same directory or the output is above the site.
    pub fn out_dir_contains_site(&self) -> bool {
        clean_path(&self.site_dir).starts_with(clean_path(&self.out_dir))
    }

    /// Whether `path` lies inside the output directory.
    pub fn is_output_path(&self, path: &Path) -> bool {
        path.starts_with(&self.out_dir)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[build]
out_dir = "dist"
base_template = "layout.html"
tidy_html = false

[serve]
host = "0.0.0.0"
port = 9000
live_reload = false
debounce_ms = 250

[site]
title = "Test Site"
nav = ["home", "about"]
launched = 2024-03-01T10:00:00Z
"#
        .to_string()
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join(CONFIG_FILE);
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(create_test_config().as_bytes())
            .expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.build.out_dir, "dist");
        assert_eq!(config.build.base_template, "layout.html");
        assert!(!config.build.tidy_html);
        assert_eq!(config.serve.host, "0.0.0.0");
        assert_eq!(config.serve.port, 9000);
        assert!(!config.serve.live_reload);
        assert_eq!(config.serve.debounce_ms, 250);

        let site = config.site_value();
        assert_eq!(site["title"], "Test Site");
        assert_eq!(site["nav"][1], "about");
        assert_eq!(site["launched"], "2024-03-01T10:00:00Z");
    }

    #[test]
    fn test_config_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join(CONFIG_FILE);
        std::fs::write(&config_path, "").expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.build.out_dir, "public");
        assert_eq!(config.build.base_template, "base.html");
        assert!(config.build.tidy_html);
        assert_eq!(config.serve.host, "127.0.0.1");
        assert_eq!(config.serve.port, 8817);
        assert!(config.serve.live_reload);
        assert_eq!(config.serve.debounce_ms, 750);
        assert!(config.site.is_empty());
    }

    #[test]
    fn test_load_with_env_reads_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join(CONFIG_FILE);
        std::fs::write(&config_path, create_test_config()).expect("write");

        let config = Config::load_with_env(&config_path).expect("load config");
        assert_eq!(config.build.out_dir, "dist");
        assert_eq!(config.serve.port, 9000);
    }

    #[test]
    fn test_config_validation_rejects_site_root_as_output() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join(CONFIG_FILE);
        std::fs::write(&config_path, "[build]\nout_dir = \".\"\n").expect("write");

        let result = Config::load(&config_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("out_dir"));
    }

    #[test]
    fn test_config_validation_rejects_dotted_out_dirs() {
        for out_dir in ["./", "../", "sub/../..", "a/./../", "../public", "  "] {
            let mut config = Config::default();
            config.build.out_dir = out_dir.to_string();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("out_dir"), "{out_dir:?}: {err}");
        }

        for out_dir in ["public", "./dist/", "build/../dist", "/srv/www"] {
            let mut config = Config::default();
            config.build.out_dir = out_dir.to_string();
            assert!(config.validate().is_ok(), "{out_dir:?} should be accepted");
        }
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("/x/site/..")), PathBuf::from("/x"));
        assert_eq!(clean_path(Path::new("/x/site/./public/")), PathBuf::from("/x/site/public"));
        assert_eq!(clean_path(Path::new("a/b/../../..")), PathBuf::from(".."));
        assert_eq!(clean_path(Path::new("/../..")), PathBuf::from("/"));
        assert_eq!(clean_path(Path::new("./")), PathBuf::from("."));
        assert_eq!(clean_path(Path::new("")), PathBuf::from("."));
        assert_eq!(clean_join(Path::new("/site"), "../out"), PathBuf::from("/out"));
        assert_eq!(clean_join(Path::new("/site"), "/abs"), PathBuf::from("/abs"));
    }

    #[test]
    fn test_out_dir_contains_site() {
        let mut options = Options::from_config("/x/site", &Config::default());
        assert_eq!(options.out_dir, PathBuf::from("/x/site/public"));
        assert!(!options.out_dir_contains_site());

        for out_dir in ["/x/site", "/x/site/..", "/x", "/", "/x/site/public/../"] {
            options.out_dir = PathBuf::from(out_dir);
            assert!(options.out_dir_contains_site(), "{out_dir}");
        }

        options.out_dir = PathBuf::from("/x/site/../public");
        assert!(!options.out_dir_contains_site());
    }

    #[test]
    fn test_config_invalid_toml() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join(CONFIG_FILE);
        std::fs::write(&config_path, "[build\nout_dir = 1").expect("write");

        let err = Config::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/yugo.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_options_paths() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join(CONFIG_FILE), create_test_config()).expect("write");

        let options = Options::load(dir.path()).expect("load options");

        assert_eq!(options.content_dir(), dir.path().join("content"));
        assert_eq!(options.static_dir(), dir.path().join("static"));
        assert_eq!(options.templates_dir(), dir.path().join("templates"));
        assert_eq!(options.out_dir, dir.path().join("dist"));
        assert_eq!(options.debounce, Duration::from_millis(250));
        assert!(!options.live_reload);
        assert!(options.is_output_path(&dir.path().join("dist/index.html")));
        assert!(!options.is_output_path(&dir.path().join("content/index.md")));
    }
}
