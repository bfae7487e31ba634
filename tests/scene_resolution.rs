use std::path::PathBuf;
use xcsv_plot_map::viz::{self, MapConfig, MapMode, PlotConfig, PlotOptions, site_extent};
use xcsv_plot_map::{AxisSelector, Error, Projection, read_datasets, xcsv};

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn fixtures() -> Vec<PathBuf> {
    (1..=3)
        .map(|n| data(&format!("short-test-data-{n}.csv")))
        .collect()
}

fn plot_only() -> MapConfig {
    MapConfig {
        mode: MapMode::Off,
        ..MapConfig::default()
    }
}

#[test]
fn single_column_uses_row_indices_for_x() {
    let datasets = read_datasets(&[data("single-column.csv")]).unwrap();
    let fig = viz::plot_datasets(&datasets, &PlotConfig::default(), &plot_only()).unwrap();
    let series = &fig.scene().series[0];
    let xs: Vec<f64> = series.points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = series.points.iter().map(|p| p.1).collect();
    assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(ys, vec![0.5, 1.5, 2.5, 3.0]);
    assert_eq!(fig.scene().x_label, "");
    assert_eq!(fig.scene().y_label, "depth (m)");
}

#[test]
fn default_axes_and_missing_cells() {
    let datasets = read_datasets(&[data("short-test-data-1.csv")]).unwrap();
    let fig = viz::plot_datasets(&datasets, &PlotConfig::default(), &plot_only()).unwrap();
    let scene = fig.scene();
    assert_eq!(scene.x_label, "time (year) [a]");
    assert_eq!(scene.y_label, "depth (m)");
    // 2009 has a NaN depth
    assert_eq!(scene.series[0].points.len(), 7);
    assert_eq!(scene.title, "The title");
    assert_eq!(
        scene.caption,
        "This dataset has a short summary that continues on the next line"
    );
}

#[test]
fn axis_selection_by_label_and_index() {
    let datasets = read_datasets(&[data("short-test-data-1.csv")]).unwrap();
    let plot = PlotConfig {
        x: Some(AxisSelector::Label("depth".into())),
        y: Some(AxisSelector::Index(0)),
        ..PlotConfig::default()
    };
    let fig = viz::plot_datasets(&datasets, &plot, &plot_only()).unwrap();
    assert_eq!(fig.scene().series[0].points[0], (0.575, 2012.0));
    assert_eq!(fig.scene().x_label, "depth (m)");

    let bad = PlotConfig {
        y: Some(AxisSelector::Index(7)),
        ..PlotConfig::default()
    };
    let err = viz::plot_datasets(&datasets, &bad, &plot_only()).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "{err}");

    let bad = PlotConfig {
        x: Some(AxisSelector::Label("salinity".into())),
        ..PlotConfig::default()
    };
    let err = viz::plot_datasets(&datasets, &bad, &plot_only()).unwrap_err();
    assert!(err.to_string().contains("salinity"));
}

#[test]
fn both_selectors_for_one_axis_is_a_config_error() {
    let err = AxisSelector::from_parts("x", Some(0), Some("time".into())).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(
        AxisSelector::from_parts("x", None, Some("time".into())).unwrap(),
        Some(AxisSelector::Label("time".into()))
    );
    assert_eq!(AxisSelector::from_parts("y", None, None).unwrap(), None);
}

#[test]
fn legend_label_follows_label_key_then_id() {
    let datasets = read_datasets(&fixtures()).unwrap();
    let by_title = PlotConfig {
        label_key: Some("title".into()),
        ..PlotConfig::default()
    };
    let fig = viz::plot_datasets(&datasets, &by_title, &MapConfig::default()).unwrap();
    assert_eq!(fig.scene().series[0].label, "The title");

    let missing_key = PlotConfig {
        label_key: Some("no_such_key".into()),
        ..PlotConfig::default()
    };
    let fig = viz::plot_datasets(&datasets, &missing_key, &MapConfig::default()).unwrap();
    let labels: Vec<&str> = fig.scene().series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, ["1", "2", "3"]);
}

#[test]
fn legend_label_falls_back_to_file_stem_then_position() {
    let mut ds = xcsv::parse_str("a,b\n1,2\n", Some(PathBuf::from("/tmp/core-7.csv"))).unwrap();
    assert_eq!(viz::legend_label(&ds, Some("title"), 0), "core-7");
    ds.source = None;
    assert_eq!(viz::legend_label(&ds, None, 1), "dataset 2");
}

#[test]
fn map_marker_at_header_coordinates() {
    let datasets = read_datasets(&[data("short-test-data-1.csv")]).unwrap();
    let fig = viz::plot_datasets(&datasets, &PlotConfig::default(), &MapConfig::default()).unwrap();
    let site = fig.scene().series[0].site.clone().unwrap();
    assert_eq!((site.lon, site.lat), (-65.46, -73.86));
    assert_eq!(site.name.as_deref(), Some("Site A"));

    let map = fig.map_plot().unwrap().unwrap();
    assert_eq!(map.site_positions(), vec![Some((-65.46, -73.86))]);
}

#[test]
fn missing_coordinates_is_a_data_error_naming_the_field() {
    let datasets = read_datasets(&[data("no-coordinates.csv")]).unwrap();
    for mode in [MapMode::Beside, MapMode::OnMap] {
        let map = MapConfig {
            mode,
            ..MapConfig::default()
        };
        let err = viz::plot_datasets(&datasets, &PlotConfig::default(), &map).unwrap_err();
        assert!(matches!(err, Error::Data(_)), "{err}");
        assert!(err.to_string().contains("latitude"));
    }
    assert!(viz::plot_datasets(&datasets, &PlotConfig::default(), &plot_only()).is_ok());
}

#[test]
fn site_extent_of_fixtures() {
    let datasets = read_datasets(&fixtures()).unwrap();
    let fig = viz::plot_datasets(&datasets, &PlotConfig::default(), &MapConfig::default()).unwrap();
    let extent = fig.map_plot().unwrap().unwrap().extent().as_array();
    let want = [-83.16, -60.46, -79.45, -68.86];
    for (got, want) in extent.iter().zip(want) {
        assert!((got - want).abs() < 1e-9, "{extent:?}");
    }

    let tight = site_extent(fig.scene().sites(), 1.0, Projection::PlateCarree).unwrap();
    assert!((tight.left + 79.16).abs() < 1e-9);
    assert!((tight.top + 72.86).abs() < 1e-9);
}

#[test]
fn scatter_preset_merges_with_explicit_options() {
    let datasets = read_datasets(&[data("short-test-data-1.csv")]).unwrap();
    let user = PlotOptions::from_json(r#"{"marker":"x"}"#).unwrap();
    let plot = PlotConfig {
        style: PlotOptions::scatter().merged(&user),
        ..PlotConfig::default()
    };
    let fig = viz::plot_datasets(&datasets, &plot, &plot_only()).unwrap();
    let style = &fig.scene().style;
    assert_eq!(style.marker, Some(viz::MarkerKind::Cross));
    assert_eq!(style.line, None);
}

#[test]
fn empty_dataset_list_is_a_data_error() {
    let err = viz::plot_datasets(&[], &PlotConfig::default(), &plot_only()).unwrap_err();
    assert!(matches!(err, Error::Data(_)));
}
