//! Yugo Core Library
//!
//! Configuration, error handling, frontmatter and shared content types for
//! the yugo static site generator.

pub mod config;
pub mod content;
pub mod error;
pub mod frontmatter;

pub use config::{CONFIG_FILE, Config, Options, clean_join, clean_path};
pub use content::{ContentKind, Page, TocEntry, output_rel_path};
pub use error::{CoreError, Result};
pub use frontmatter::{Params, parse_frontmatter};
