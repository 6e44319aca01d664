//! Yugo Generator Library
//!
//! Static site generation engine for yugo.
//!
//! # Modules
//!
//! - [`template`] - HTML template system with variable interpolation and includes
//! - [`render`] - Per-page pipeline: frontmatter, Markdown, template, tidy
//! - [`assets`] - Copying static and unprocessed content files
//! - [`resources`] - Files embedded in the binary
//! - [`build`] - Build orchestration

pub mod assets;
pub mod build;
pub mod render;
pub mod resources;
pub mod template;

pub use assets::{AssetError, copy_content, copy_tree};
pub use build::{BuildError, BuildStats, Builder};
pub use render::{PageRenderer, RenderError, inject_live_reload};
pub use resources::{EXAMPLE_SITE, INTERNAL, LIVE_RELOAD_SCRIPT_TAG, Resource};
pub use template::{Template, TemplateContext, TemplateError, TemplateLoader, TemplateRegistry};
