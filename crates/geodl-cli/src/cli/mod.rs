//! CLI for geodl, a checksum-verifying OSM extract downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use geodl_core::logging::{self, Verbosity};
use std::path::PathBuf;

use commands::{run_download, run_list, run_update};

/// Published catalog for the default service, fetched by `geodl update`.
const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/julien-noblet/download-geofabrik/master/geofabrik.yml";

/// Extract service whose catalog document to use. Only changes the default
/// config file name; an explicit `--config` always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Service {
    #[default]
    Geofabrik,
    #[value(name = "openstreetmap.fr")]
    OpenstreetmapFr,
    Gislab,
}

impl Service {
    fn default_config(self) -> &'static str {
        match self {
            Service::Geofabrik => "./geofabrik.yml",
            Service::OpenstreetmapFr => "./openstreetmap.fr.yml",
            Service::Gislab => "./gislab.yml",
        }
    }
}

/// Top-level CLI for geodl.
#[derive(Debug, Parser)]
#[command(name = "geodl", version)]
#[command(about = "Download OSM extracts by region name, verified against published checksums", long_about = None)]
pub struct Cli {
    /// Catalog document (defaults to the selected service's file in the
    /// current directory).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Extract service preset.
    #[arg(long, global = true, value_enum, default_value = "geofabrik")]
    pub service: Service,

    /// Log per-step detail (URLs, digests).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List the elements available in the catalog.
    List {
        /// Render the table as Markdown.
        #[arg(long)]
        markdown: bool,
    },

    /// Download an element in one or more formats.
    Download {
        /// Element identifier, e.g. "europe" or "georgia-us".
        element: String,

        /// Download osm.pbf (default when no format flag is given).
        #[arg(short = 'P', long = "osm-pbf")]
        osm_pbf: bool,

        /// Download osh.pbf.
        #[arg(short = 'H', long = "osh-pbf")]
        osh_pbf: bool,

        /// Download osm.bz2.
        #[arg(short = 'B', long = "osm-bz2")]
        osm_bz2: bool,

        /// Download shp.zip.
        #[arg(short = 'S', long = "shp-zip")]
        shp_zip: bool,

        /// Download the state.txt update pointer.
        #[arg(short = 's', long)]
        state: bool,

        /// Download the poly boundary file.
        #[arg(short = 'p', long)]
        poly: bool,

        /// Download the kml boundary file.
        #[arg(short = 'k', long)]
        kml: bool,

        /// Skip checksum verification.
        #[arg(long)]
        no_check: bool,

        /// Resolve and print download URLs without fetching anything.
        #[arg(short = 'n', long)]
        no_download: bool,

        /// Directory for downloaded files.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Fetch the published catalog document for the selected service.
    Update {
        /// Source URL for the catalog document.
        #[arg(long, default_value = DEFAULT_CATALOG_URL)]
        url: String,
    },
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.service.default_config()))
    }
}

/// Format flags in the order the original tool resolves them; empty
/// selection falls back to osm.pbf.
fn selected_formats(flags: &[(bool, &str)]) -> Vec<String> {
    let mut formats: Vec<String> = flags
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, id)| id.to_string())
        .collect();
    if formats.is_empty() {
        formats.push("osm.pbf".to_string());
    }
    formats
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbosity());
    let config_path = cli.config_path();
    tracing::debug!(config = %config_path.display(), "using catalog");

    match cli.command {
        CliCommand::List { markdown } => run_list(&config_path, markdown)?,
        CliCommand::Download {
            ref element,
            osm_pbf,
            osh_pbf,
            osm_bz2,
            shp_zip,
            state,
            poly,
            kml,
            no_check,
            no_download,
            ref output_dir,
        } => {
            let formats = selected_formats(&[
                (osm_pbf, "osm.pbf"),
                (osh_pbf, "osh.pbf"),
                (osm_bz2, "osm.bz2"),
                (shp_zip, "shp.zip"),
                (state, "state"),
                (poly, "poly"),
                (kml, "kml"),
            ]);
            run_download(
                &config_path,
                element,
                &formats,
                !no_check,
                no_download,
                output_dir,
            )?;
        }
        CliCommand::Update { ref url } => run_update(url, &config_path)?,
    }

    Ok(())
}
