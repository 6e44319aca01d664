//! Yugo CLI Library
//!
//! Command implementations, the development server and the site watcher
//! behind the `yugo` binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (init, build, serve, tidy)
//! - [`server`] - Development HTTP server with live reload
//! - [`watcher`] - Filesystem watching with debounced rebuild triggers
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use yugo::cmd::{self, BuildArgs};
//!
//! // Build the site in the current directory
//! cmd::build::run(Path::new("."), &BuildArgs::default(), None, None).unwrap();
//! ```

pub mod cmd;
pub mod server;
pub mod watcher;

pub use yugo_core::{Config, Options};
pub use yugo_generator::{BuildStats, Builder};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// `RUST_LOG` directives are honored on top of the chosen level.
///
/// # Example
///
/// ```no_run
/// yugo::init_tracing(2); // Enable DEBUG level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
