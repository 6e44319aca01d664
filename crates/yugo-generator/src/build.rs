//! Build orchestration.
//!
//! Coordinates the full site build process.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Instant,
};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, error, info};
use walkdir::WalkDir;
use yugo_core::{ContentKind, Options, output_rel_path};

use crate::{
    assets::{AssetError, copy_content, copy_tree},
    render::{PageRenderer, RenderError},
    resources::{self, INTERNAL},
    template::{TemplateError, TemplateLoader},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error on a specific path.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk error.
    #[error("failed to walk content: {0}")]
    Walk(#[from] walkdir::Error),

    /// Template loading error.
    #[error("template load failed: {0}")]
    Template(#[from] TemplateError),

    /// A page failed to render.
    #[error("failed rendering {path}: {source}")]
    Page {
        path: PathBuf,
        #[source]
        source: RenderError,
    },

    /// Asset error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of pages rendered.
    pub pages: usize,

    /// Number of files copied from `static/`.
    pub static_files: usize,

    /// Number of non-page files copied from `content/`.
    pub content_files: usize,

    /// Number of internal resources installed.
    pub resources: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Site builder that orchestrates the build process.
#[derive(Debug)]
pub struct Builder {
    options: Options,
}

impl Builder {
    /// Create a new builder.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// The options this builder was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Execute the full build process.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();
        let content_dir = self.options.content_dir();
        let out_dir = &self.options.out_dir;

        info!(
            content = %content_dir.display(),
            output = %out_dir.display(),
            "starting build"
        );

        // 1. Clean output directory
        self.clean_output()?;

        // 2. Load templates
        let renderer = self.renderer()?;

        // 3. Render pages
        stats.pages = self.render_pages(&renderer, &content_dir)?;

        // 4. Static files never replace rendered pages
        stats.static_files = copy_tree(&self.options.static_dir(), out_dir, false)?;

        // 5. Remaining content files
        stats.content_files = copy_content(&content_dir, out_dir)?;

        // 6. Internal resources last, so they always win
        stats.resources = resources::install(INTERNAL, out_dir)?;

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            pages = stats.pages,
            static_files = stats.static_files,
            content_files = stats.content_files,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Render a single file. The output goes to `output`, or to stdout when
    /// it is `None`.
    pub fn build_file(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        let renderer = self.renderer()?;
        let rel = self.content_rel(input)?;

        let html = renderer
            .render_file(input, &rel)
            .map_err(|source| BuildError::Page {
                path: input.to_path_buf(),
                source,
            })?;

        match output {
            Some(path) => write_file(path, &html),
            None => std::io::stdout()
                .lock()
                .write_all(html.as_bytes())
                .map_err(|source| BuildError::Io {
                    path: PathBuf::from("<stdout>"),
                    source,
                }),
        }
    }

    /// Path of `input` relative to the content directory, or its file name
    /// when it lives elsewhere.
    fn content_rel(&self, input: &Path) -> Result<PathBuf> {
        let input = input.canonicalize().map_err(|source| BuildError::Io {
            path: input.to_path_buf(),
            source,
        })?;
        let content_dir = self.options.content_dir();
        let content_dir = content_dir.canonicalize().unwrap_or(content_dir);

        Ok(input
            .strip_prefix(&content_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| input.file_name().map(PathBuf::from).unwrap_or_default()))
    }

    fn renderer(&self) -> Result<PageRenderer> {
        let templates =
            TemplateLoader::new(self.options.templates_dir(), self.options.static_dir()).load()?;
        Ok(PageRenderer::new(self.options.clone(), templates))
    }

    /// Clean the output directory.
    fn clean_output(&self) -> Result<()> {
        let out_dir = &self.options.out_dir;
        if self.options.out_dir_contains_site() {
            return Err(BuildError::Config(format!(
                "output directory {} contains the site directory",
                out_dir.display()
            )));
        }

        if out_dir.exists() {
            debug!(dir = %out_dir.display(), "cleaning output directory");
            fs::remove_dir_all(out_dir).map_err(|source| BuildError::Io {
                path: out_dir.clone(),
                source,
            })?;
        }
        fs::create_dir_all(out_dir).map_err(|source| BuildError::Io {
            path: out_dir.clone(),
            source,
        })
    }

    /// Render every page under `content_dir`. All failures are logged; the
    /// first one is returned.
    fn render_pages(&self, renderer: &PageRenderer, content_dir: &Path) -> Result<usize> {
        let sources = collect_pages(content_dir)?;
        info!(count = sources.len(), "rendering pages");

        let results: Vec<_> = sources
            .par_iter()
            .map(|rel| {
                let path = content_dir.join(rel);
                let html = renderer
                    .render_file(&path, rel)
                    .map_err(|source| BuildError::Page {
                        path: path.clone(),
                        source,
                    })?;

                let output_path = self.options.out_dir.join(output_rel_path(rel));
                write_file(&output_path, &html)?;

                debug!(path = %output_path.display(), "wrote page");
                Ok::<_, BuildError>(())
            })
            .collect();

        let mut count = 0;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(()) => count += 1,
                Err(e) => {
                    error!(error = %e, "failed to render page");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(count),
        }
    }
}

/// Content-relative paths of every Markdown and HTML file, sorted.
fn collect_pages(content_dir: &Path) -> Result<Vec<PathBuf>> {
    if !content_dir.exists() {
        return Ok(Vec::new());
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(content_dir).sort_by_file_name() {
        let entry = entry?;
        if entry.path_is_symlink() {
            return Err(AssetError::Symlink(entry.path().to_path_buf()).into());
        }
        if entry.file_type().is_file() && ContentKind::from_path(entry.path()).is_some() {
            let rel = entry
                .path()
                .strip_prefix(content_dir)
                .unwrap_or(entry.path())
                .to_path_buf();
            pages.push(rel);
        }
    }
    Ok(pages)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| BuildError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}
