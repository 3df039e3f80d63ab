use std::path::PathBuf;

use clap::Parser;

use haarkit::sequence::renumber;
use haarkit::Result;

#[derive(Parser, Debug)]
#[command(author, version, about = "Renumber dataset files into a zero-padded sequence", long_about = None)]
struct Args {
    /// Directories whose files should be renumbered.
    #[arg(required = true)]
    dirs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    for dir in &args.dirs {
        let count = renumber(dir)?;
        println!("[ok] renumbered {} files in {}", count, dir.display());
    }
    Ok(())
}
