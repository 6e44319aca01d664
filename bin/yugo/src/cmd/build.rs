//! Build command - generates the static site

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use yugo_generator::Builder;

use super::{BuildArgs, load_site};

/// Run the build command.
///
/// With no `infile`, builds the whole site into the output directory.
/// Otherwise renders that one file to `outfile`, or stdout.
pub fn run(
    site_dir: &Path,
    args: &BuildArgs,
    infile: Option<&Path>,
    outfile: Option<&Path>,
) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?site_dir, ?args, ?infile, ?outfile, "Starting build");

    let (_, options) = load_site(site_dir, args)?;
    let builder = Builder::new(options);

    if let Some(infile) = infile {
        return builder
            .build_file(infile, outfile)
            .wrap_err_with(|| format!("Failed to render {}", infile.display()));
    }

    let stats = builder.build().wrap_err("Build failed")?;
    let duration = start.elapsed();

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Pages:         {}", stats.pages);
    println!("  Static files:  {}", stats.static_files);
    println!("  Content files: {}", stats.content_files);
    println!();
    println!("  Duration:      {:.2}s", duration.as_secs_f64());
    println!("  Output:        {}", builder.options().out_dir.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}
