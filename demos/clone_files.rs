//! Clone a masked source region into a destination image.
//!
//! Usage:
//! ```sh
//! cargo run --example clone_files -- source.jpg destination.jpg mask.png output.jpg [X Y]
//! ```

use std::env;
use std::process;

use seamless_clone::CloneEngine;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 && args.len() != 7 {
        eprintln!(
            "Usage: {} <source> <destination> <mask> <output> [X Y]",
            args[0]
        );
        process::exit(1);
    }

    let anchor = if args.len() == 7 {
        match (args[5].parse::<i64>(), args[6].parse::<i64>()) {
            (Ok(x), Ok(y)) => Some((x, y)),
            _ => {
                eprintln!("Error: anchor must be two integers");
                process::exit(1);
            }
        }
    } else {
        None
    };

    let engine = CloneEngine::default();
    let result = engine.process_files(
        args[1].as_ref(),
        args[2].as_ref(),
        args[3].as_ref(),
        anchor,
        args[4].as_ref(),
    );

    if result.success {
        println!("Done: {}", result.path.display());
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
