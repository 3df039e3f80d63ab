use std::path::PathBuf;

use clap::Parser;

use haarkit::crawl::{gather, BingImageSource, CrawlConfig};
use haarkit::Result;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bulk-download sample images from an image search engine", long_about = None)]
struct Args {
    /// The directory to store downloaded images in.
    output: PathBuf,

    /// Search query; may be given multiple times.
    #[arg(long, required = true)]
    query: Vec<String>,

    /// Maximum images to request per query.
    #[arg(long, default_value_t = 10)]
    max_num: usize,

    /// Number of parallel download workers.
    #[arg(long, default_value_t = 5)]
    workers: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let source = BingImageSource::new()?;
    let config = CrawlConfig {
        max_num: args.max_num,
        workers: args.workers,
    };
    let saved = gather(&source, &args.query, &args.output, &config)?;

    println!(
        "[ok] saved {} images to {} for {} queries",
        saved,
        args.output.display(),
        args.query.len()
    );
    Ok(())
}
