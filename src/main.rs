use std::path::PathBuf;

use clap::Parser;

use haarkit::params::{ParamRanges, UniformParams};
use haarkit::synth::{generate_variants, SynthConfig};
use haarkit::{Error, Result};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The source image with a near-white background.
    source: PathBuf,

    /// The directory to write the generated variants into.
    output: PathBuf,

    /// Number of variants to generate.
    #[arg(long, default_value_t = 3)]
    num: usize,

    /// Grayscale intensity below which a pixel counts as foreground.
    #[arg(long, default_value_t = 250)]
    threshold: u8,

    /// Maximum rotation angle in degrees (at most 45).
    #[arg(long, default_value_t = 25.0)]
    max_angle: f32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !(0.0..=45.0).contains(&args.max_angle) {
        return Err(Error::InvalidParameter(format!(
            "max angle must be within [0, 45], got {}",
            args.max_angle
        )));
    }

    let ranges = ParamRanges {
        max_angle: args.max_angle,
        ..ParamRanges::default()
    };
    let mut params = UniformParams::from_entropy(ranges);
    let config = SynthConfig {
        count: args.num,
        threshold: args.threshold,
    };

    let written = generate_variants(&args.source, &args.output, &config, &mut params)?;
    for path in &written {
        println!("[ok] saved variant to {}", path.display());
    }

    Ok(())
}
