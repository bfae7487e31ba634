use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use xcsv_plot_map::viz::{self, FigSize, MapConfig, MapMode, PlotConfig, PlotOptions};
use xcsv_plot_map::{AxisSelector, Projection, viewer, xcsv};

#[derive(Parser, Debug)]
#[command(
    name = "xcsv_plot_map",
    version,
    about = "Plot the given XCSV files and show their sites on a map"
)]
struct Cli {
    /// Input XCSV files. Each needs `latitude` and `longitude` header items unless --no-map is given.
    #[arg(required = true, value_name = "IN_FILE")]
    in_file: Vec<PathBuf>,

    /// Column index (zero-based) of the x-axis data
    #[arg(short = 'x', long, conflicts_with = "x_column")]
    x_idx: Option<usize>,
    /// Column label of the x-axis data
    #[arg(short = 'X', long)]
    x_column: Option<String>,
    /// Column index (zero-based) of the y-axis data
    #[arg(short = 'y', long, conflicts_with = "y_column")]
    y_idx: Option<usize>,
    /// Column label of the y-axis data
    #[arg(short = 'Y', long)]
    y_column: Option<String>,

    /// Text for the x-axis label (defaults to the column header)
    #[arg(long)]
    x_label: Option<String>,
    /// Text for the y-axis label (defaults to the column header)
    #[arg(long)]
    y_label: Option<String>,
    #[arg(long, default_value_t = false)]
    invert_x_axis: bool,
    #[arg(long, default_value_t = false)]
    invert_y_axis: bool,

    /// Figure title (defaults to the `title` header item)
    #[arg(long)]
    title: Option<String>,
    /// Caption above the data plot (defaults to the `summary` header item)
    #[arg(long)]
    caption: Option<String>,
    /// Header key whose value labels each dataset in the legend
    #[arg(long)]
    label_key: Option<String>,

    /// Figure size in inches
    #[arg(short = 's', long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    figsize: Option<Vec<f64>>,
    /// Map projection, e.g. PlateCarree, Mercator, SouthPolarStereo
    #[arg(short = 'p', long)]
    map_projection: Option<String>,
    /// Show only a map, with each dataset plotted at its site
    #[arg(short = 'm', long, default_value_t = false, conflicts_with = "no_map")]
    plot_on_map: bool,
    /// Plot the data without a map; coordinates are then not required
    #[arg(long, default_value_t = false)]
    no_map: bool,
    /// Image stretched over the map pane as its background
    #[arg(short = 'b', long)]
    background_image: Option<PathBuf>,

    /// Output file (.svg, .png, .jpg, .bmp). Without it the plot is shown in a window.
    #[arg(short = 'o', long)]
    out_file: Option<PathBuf>,
    /// Plot options as a JSON object, e.g. '{"marker": "x", "ls": "--"}'
    #[arg(short = 'P', long)]
    plot_options: Option<String>,
    /// Draw markers only (same as -P '{"marker": ".", "ls": ""}'; -P keys take precedence)
    #[arg(short = 'S', long, default_value_t = false)]
    scatter_plot: bool,
}

fn plot_config(cli: &Cli) -> Result<PlotConfig> {
    let user = cli
        .plot_options
        .as_deref()
        .map(PlotOptions::from_json)
        .transpose()?
        .unwrap_or_default();
    let style = if cli.scatter_plot {
        PlotOptions::scatter().merged(&user)
    } else {
        user
    };
    let figsize = match cli.figsize.as_deref() {
        Some([w, h]) => Some(FigSize::new(*w, *h)),
        Some(other) => anyhow::bail!("--figsize takes WIDTH HEIGHT, got {} values", other.len()),
        None => None,
    };

    Ok(PlotConfig {
        x: AxisSelector::from_parts("x", cli.x_idx, cli.x_column.clone())?,
        y: AxisSelector::from_parts("y", cli.y_idx, cli.y_column.clone())?,
        x_label: cli.x_label.clone(),
        y_label: cli.y_label.clone(),
        invert_x: cli.invert_x_axis,
        invert_y: cli.invert_y_axis,
        title: cli.title.clone(),
        caption: cli.caption.clone(),
        label_key: cli.label_key.clone(),
        figsize,
        style,
    })
}

fn map_config(cli: &Cli) -> Result<MapConfig> {
    let projection = match cli.map_projection.as_deref() {
        Some(name) => name.parse::<Projection>()?,
        None => Projection::default(),
    };
    let mode = if cli.no_map {
        MapMode::Off
    } else if cli.plot_on_map {
        MapMode::OnMap
    } else {
        MapMode::Beside
    };
    Ok(MapConfig {
        projection,
        mode,
        background_image: cli.background_image.clone(),
        ..MapConfig::default()
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let plot = plot_config(&cli)?;
    let map = map_config(&cli)?;

    let mut datasets = Vec::with_capacity(cli.in_file.len());
    for path in &cli.in_file {
        let ds = xcsv::read_path(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        datasets.push(ds);
    }

    let figure = viz::plot_datasets(&datasets, &plot, &map)?;

    match cli.out_file.as_ref() {
        Some(out) => {
            figure.save(out)?;
            eprintln!("Wrote plot to {}", out.display());
        }
        None => viewer::show(&figure)?,
    }
    Ok(())
}
