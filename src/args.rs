use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "incident-map",
    about = "Terminal choropleth and top-group bar chart of incidents by year",
    version,
    long_about = None
)]
pub struct Args {
    /// Incident CSV with iyear, country_txt and gname columns
    #[arg(short, long, default_value = "data/region_10-2.csv")]
    pub data: PathBuf,

    /// GeoJSON FeatureCollection of country polygons
    #[arg(short, long, default_value = "data/world.geojson")]
    pub world: PathBuf,

    /// Initial year for both charts
    #[arg(short, long, default_value_t = 2019)]
    pub year: i32,

    /// Log file written while the terminal UI is running
    #[arg(long, default_value = "incident-map.log")]
    pub log_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the aggregates for --year and exit
    #[arg(long)]
    pub report: bool,

    /// Print the report as JSON
    #[arg(long, requires = "report")]
    pub json: bool,
}
