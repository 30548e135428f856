//! Wandbind - Runtime Bindings for ImageMagick's MagickWand
//!
//! CLI entry point: regenerates the declaration file on demand, loads
//! the libraries, and prints the installation's version metadata.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use wandbind::{HeaderGenerator, Magick, Platform};

#[derive(Parser)]
#[command(name = "wandbind")]
#[command(version)]
#[command(about = "Runtime bindings for ImageMagick's MagickWand", long_about = None)]
struct Cli {
    /// Force a fresh C preprocessor run before loading
    #[arg(long)]
    cpp: bool,

    /// Path of the generated declaration file
    #[arg(long, default_value = wandbind::DEFAULT_HEADER_FILE)]
    header: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let start = Instant::now();

    if cli.cpp {
        let platform = Platform::host()?;
        println!("Enforcing C pre-processor for {}", platform.display_name());
        HeaderGenerator::new(platform, &cli.header)
            .generate()
            .context("header generation failed")?;
    }

    let magick =
        Magick::load(&cli.header).context("unable to load the ImageMagick libraries")?;

    println!("Declarations: {}", magick.declarations().len());
    println!("MagickWand:   {}", magick.wand().filename());
    println!("MagickCore:   {}", magick.core().filename());

    let (version, number) = magick.version()?;
    println!("{}", version);
    println!("{:#x}", number);
    println!("{}", magick.release_date()?);

    println!("Completed in {:.2} seconds", start.elapsed().as_secs_f64());
    Ok(())
}
