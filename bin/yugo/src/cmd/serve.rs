//! Serve command - development server with live reload

use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use yugo_core::Options;
use yugo_generator::{BuildStats, Builder};

use super::{BuildArgs, load_site};
use crate::{
    server::{ServerState, create_router},
    watcher::SiteWatcher,
};

/// Flags specific to `serve`. Unset flags keep the values from `yugo.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, clap::Args)]
pub struct ServeArgs {
    /// Host to bind the HTTP server
    #[arg(long)]
    pub host: Option<String>,

    /// Port for the HTTP server
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Reload open pages after each rebuild
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub live_reload: Option<bool>,

    /// Open the site in a browser
    #[arg(long)]
    pub open: bool,
}

/// Run the serve command.
///
/// Builds the site, serves the output directory and rebuilds whenever a
/// file under the site directory changes.
pub async fn run(site_dir: &Path, build_args: &BuildArgs, serve_args: &ServeArgs) -> Result<()> {
    let (config, mut options) = load_site(site_dir, build_args)?;
    options.live_reload = serve_args.live_reload.unwrap_or(config.serve.live_reload);
    if let Some(host) = &serve_args.host {
        options.host.clone_from(host);
    }
    if let Some(port) = serve_args.port {
        options.port = port;
    }

    tracing::info!(site = %options.site_dir.display(), port = options.port, "Starting dev server");

    // A failed initial build still serves; the next save retries.
    match rebuild(options.clone()).await {
        Ok(stats) => print_build_stats(&stats),
        Err(e) => eprintln!("  ✗ Initial build failed: {e:#}"),
    }

    let state = Arc::new(ServerState::new());
    let mut watcher = SiteWatcher::new(&options.site_dir, &options.out_dir)
        .wrap_err("Failed to create file watcher")?;

    let rebuild_state = state.clone();
    let rebuild_options = options.clone();
    tokio::spawn(async move {
        while let Some(changes) = watcher.next_batch(rebuild_options.debounce).await {
            tracing::debug!(?changes, "rebuilding");
            println!("  Change detected, rebuilding...");

            match rebuild(rebuild_options.clone()).await {
                Ok(stats) => {
                    println!("  ✓ Rebuilt {} pages in {}ms", stats.pages, stats.duration_ms);
                    if rebuild_options.live_reload {
                        let clients = rebuild_state.notify_reload();
                        tracing::debug!(clients, "sent reload");
                    }
                }
                Err(e) => {
                    tracing::error!("Rebuild failed: {e:#}");
                    eprintln!("  ✗ Rebuild failed: {e:#}");
                }
            }
        }
    });

    let app = create_router(&options.out_dir, state);
    let addr = format!("{}:{}", options.host, options.port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Serving at http://{addr}");
    println!("  Press Ctrl+C to stop");
    println!();

    if serve_args.open {
        if let Err(e) = open::that(format!("http://{addr}")) {
            tracing::warn!(error = %e, "failed to open browser");
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .wrap_err("Server error")?;

    Ok(())
}

/// Run a full build off the async runtime.
async fn rebuild(options: Options) -> Result<BuildStats> {
    tokio::task::spawn_blocking(move || Builder::new(options).build())
        .await
        .wrap_err("Build task panicked")?
        .wrap_err("Build failed")
}

/// Print build statistics in a user-friendly format.
fn print_build_stats(stats: &BuildStats) {
    println!();
    println!("  Build Statistics:");
    println!("  ─────────────────────────────────");
    println!("  Pages:          {:>6}", stats.pages);
    println!("  Static files:   {:>6}", stats.static_files);
    println!("  Content files:  {:>6}", stats.content_files);
    println!("  ─────────────────────────────────");
    println!("  Duration:       {:>6}ms", stats.duration_ms);
    println!();
}
