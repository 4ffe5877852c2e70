use std::path::PathBuf;
use std::process;

use clap::Parser;
use flexi_logger::Logger;

use seamless_clone::{
    default_output_path, is_supported_image, CloneEngine, CloneOptions, ProcessOptions,
    ProcessResult, DEFAULT_EROSION_ITERATIONS,
};

#[derive(Parser)]
#[command(
    name = "seamless-clone",
    about = "Seamlessly clone a masked region of one image into another",
    version,
    after_help = "Example: seamless-clone bear.jpg pool.jpg bear_mask.png --anchor 800,600\n\n\
                  The mask selects source pixels with value 255. Its bounding box is\n\
                  centred on the anchor (default: destination centre)."
)]
struct Cli {
    /// Source image holding the region to clone
    source: PathBuf,

    /// Destination image to clone into
    destination: PathBuf,

    /// Mask over the source image (255 = clone)
    mask: PathBuf,

    /// Destination position of the patch centre, as X,Y
    #[arg(short, long, value_parser = parse_anchor)]
    anchor: Option<(i64, i64)>,

    /// Output file (default: {destination}_blend.{ext})
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of 3x3 mask erosions before blending
    #[arg(short, long, default_value_t = DEFAULT_EROSION_ITERATIONS)]
    erosion: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn parse_anchor(s: &str) -> Result<(i64, i64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
    let x = x.trim().parse::<i64>().map_err(|e| format!("bad X in '{s}': {e}"))?;
    let y = y.trim().parse::<i64>().map_err(|e| format!("bad Y in '{s}': {e}"))?;
    Ok((x, y))
}

fn main() {
    let cli = Cli::parse();

    let opts = ProcessOptions {
        clone_options: CloneOptions {
            erosion_iterations: cli.erosion,
        },
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let level = if opts.quiet {
        "error"
    } else if opts.verbose {
        "debug"
    } else {
        "warn"
    };
    let _logger = match Logger::try_with_env_or_str(level).and_then(Logger::start) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e}");
            None
        }
    };

    for (what, path) in [
        ("Source", &cli.source),
        ("Destination", &cli.destination),
        ("Mask", &cli.mask),
    ] {
        if !path.exists() {
            eprintln!("Error: {what} path does not exist: {}", path.display());
            process::exit(1);
        }
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.destination));
    if !is_supported_image(&output) {
        eprintln!(
            "Error: Unsupported output format: {} (use jpg, png, webp or bmp)",
            output.display()
        );
        process::exit(1);
    }

    if !opts.quiet {
        match cli.anchor {
            Some((x, y)) => eprintln!("Anchor: ({x}, {y}), erosion: {}", cli.erosion),
            None => eprintln!("Anchor: destination centre, erosion: {}", cli.erosion),
        }
    }

    let engine = CloneEngine::new(opts.clone_options);
    let result = engine.process_files(&cli.source, &cli.destination, &cli.mask, cli.anchor, &output);
    print_result(&result, &opts);

    if !result.success {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        eprintln!("[OK] {filename}");
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
