use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use polar_browse::data::builder::{
    build_table, scan_dir, ExtensionFilter, DEFAULT_EXTENSIONS, SKIP_SUMMARY_LIMIT,
};
use polar_browse::data::loader::{write_table, DEFAULT_CSV_NAME};

/// Generate metadata.csv from files named
/// METHOD_LOCATION_SAMPLE_MODE_MAGNIFICATION.ext
/// (e.g. PCM_BIU_glassLube_NA_10x.jpg).
#[derive(Parser, Debug)]
#[command(name = "make-metadata", version, about, long_about = None)]
struct Args {
    /// Folder containing your images
    #[arg(long, value_name = "DIR")]
    folder: PathBuf,

    /// Extensions to include
    #[arg(long = "ext", num_args = 0.., default_values = DEFAULT_EXTENSIONS)]
    extensions: Vec<String>,

    /// Output CSV filename, written inside the folder
    #[arg(long, default_value = DEFAULT_CSV_NAME)]
    csv_name: String,
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let root = std::path::absolute(&args.folder)
        .with_context(|| format!("resolving {}", args.folder.display()))?;
    let entries = scan_dir(&root)?;
    let extensions = ExtensionFilter::new(&args.extensions);

    let report = build_table(&root, &entries, &extensions);
    if report.rows() == 0 {
        log::warn!("no rows produced from {}", root.display());
        println!("No matching files found. Check your folder or --ext filters.");
    }

    let csv_path = root.join(&args.csv_name);
    write_table(&csv_path, &report.table)
        .with_context(|| format!("writing {}", csv_path.display()))?;

    println!("Wrote {} rows to {}", report.rows(), csv_path.display());
    if report.skipped_count() > 0 {
        println!("Skipped {} file(s):", report.skipped_count());
        for line in report.skip_summary(SKIP_SUMMARY_LIMIT) {
            println!("  - {line}");
        }
    }
    Ok(())
}
