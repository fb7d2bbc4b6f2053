use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use polar_browse::data::cache::TableCache;
use polar_browse::data::group::ViewMode;
use polar_browse::data::loader::DEFAULT_CSV_NAME;
use polar_browse::data::source::ImageSource;
use polar_browse::state::BrowserState;
use polar_browse::ui::report::{CaptionStyle, Report};
use polar_browse::Field;

/// Filter and compare images described by a metadata.csv.
#[derive(Parser, Debug)]
#[command(name = "polar-browse", version, about, long_about = None)]
struct Cli {
    /// Folder containing metadata.csv
    #[arg(long, value_name = "DIR")]
    data_root: Option<PathBuf>,

    /// Path to metadata.csv (overrides --data-root)
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Search text matched against sample and filename
    #[arg(short, long, default_value = "")]
    search: String,

    /// Keep only these methods (repeatable)
    #[arg(long = "method", value_name = "METHOD")]
    methods: Vec<String>,

    /// Keep only these locations (repeatable)
    #[arg(long = "location", value_name = "LOCATION")]
    locations: Vec<String>,

    /// Keep only these modes (repeatable)
    #[arg(long = "mode", value_name = "MODE")]
    modes: Vec<String>,

    /// Keep only these raw magnifications (repeatable)
    #[arg(long = "magnification", value_name = "MAG")]
    magnifications: Vec<String>,

    /// Hold a sample or a method fixed
    #[arg(long, default_value = "sample")]
    view: ViewMode,

    /// Value of the held attribute; defaults to the first available one
    #[arg(long)]
    pin: Option<String>,

    /// Attribute to compare across
    #[arg(long, default_value = "method")]
    group_by: Field,

    /// Caption style: filename, short or full
    #[arg(long, default_value = "filename")]
    captions: CaptionStyle,

    /// Local folder or http(s) prefix the rel_path column is joined onto
    #[arg(long, env = "POLAR_BROWSE_IMAGE_BASE")]
    image_base: Option<String>,

    /// Print the groups as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn csv_path(&self) -> PathBuf {
        match (&self.csv, &self.data_root) {
            (Some(csv), _) => csv.clone(),
            (None, Some(root)) => root.join(DEFAULT_CSV_NAME),
            (None, None) => PathBuf::from(DEFAULT_CSV_NAME),
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let csv_path = cli.csv_path();
    let mut cache = TableCache::new();
    let table = cache
        .load(&csv_path)
        .with_context(|| format!("loading {}", csv_path.display()))?;

    let mut state = BrowserState::new(table);
    state.view_mode = cli.view;
    state.group_by = cli.group_by;
    state.pin_value = cli.pin.clone();
    state.set_search(cli.search.as_str());
    for (field, values) in [
        (Field::Method, &cli.methods),
        (Field::Location, &cli.locations),
        (Field::Mode, &cli.modes),
        (Field::Magnification, &cli.magnifications),
    ] {
        if !values.is_empty() {
            state.select_only(field, values.iter().cloned());
        }
    }
    log::info!("{} of {} rows match", state.visible.len(), state.table.len());

    let pin = state.current_pin();

    let images = match &cli.image_base {
        Some(base) => ImageSource::parse(base),
        None => {
            let folder = csv_path.parent().unwrap_or(std::path::Path::new("."));
            ImageSource::from(folder)
        }
    };

    let groups = state.groups();
    let report = Report::new(pin.as_ref(), state.group_by, &groups, cli.captions, &images);
    if cli.json {
        println!("{}", report.to_json().context("serializing report")?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}
