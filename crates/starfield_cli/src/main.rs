//! CLI smoke entry point.
//!
//! Prints core linkage info and a summary of one seeded field generation.
//! Usage: `starfield_cli [seed]`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use starfield_core::{default_categories, FieldGenerator, StarfieldConfig};

const DEFAULT_SEED: u64 = 42;

fn main() {
    println!("starfield_core ping={}", starfield_core::ping());
    println!("starfield_core version={}", starfield_core::core_version());

    let seed = match std::env::args().nth(1) {
        Some(raw) => match raw.parse::<u64>() {
            Ok(seed) => seed,
            Err(err) => {
                eprintln!("invalid seed `{raw}`: {err}");
                std::process::exit(2);
            }
        },
        None => DEFAULT_SEED,
    };

    let config = StarfieldConfig::default();
    let generator = FieldGenerator::new(config.field);
    let field = generator.generate(&mut StdRng::seed_from_u64(seed), &default_categories());

    let highlights = field.highlight_count();
    println!(
        "field seed={} particles={} highlights={} highlight_fraction={:.4} background={}",
        seed,
        field.len(),
        highlights,
        highlights as f64 / field.len().max(1) as f64,
        field.background().len()
    );
}
