use approx::assert_relative_eq;
use forecast_trade::features::FeatureBuilder;
use forecast_trade::ForecastError;
use rstest::rstest;

fn wave(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 100.0 + 5.0 * (i as f64 / 6.0).sin() + 0.1 * i as f64)
        .collect()
}

#[rstest]
#[case(31)]
#[case(100)]
#[case(500)]
fn test_default_builder_drops_first_thirty(#[case] len: usize) {
    let builder = FeatureBuilder::default();
    let features = builder.build(&wave(len)).unwrap();

    assert_eq!(features.len(), len - 30);
    assert!(features.rows().iter().all(|row| row.len() == 34));
    assert_eq!(features.positions()[0], 30);
}

#[test]
fn test_column_names() {
    let names = FeatureBuilder::default().column_names();
    assert_eq!(names.len(), 34);
    assert_eq!(names[0], "lag_1");
    assert_eq!(names[29], "lag_30");
    assert_eq!(
        &names[30..],
        &["roll_mean_7", "roll_std_7", "roll_mean_14", "roll_std_14"]
    );
}

#[test]
fn test_rows_only_use_earlier_values() {
    let series = wave(80);
    let builder = FeatureBuilder::default();
    let features = builder.build(&series).unwrap();

    for (row, (&target, &t)) in features
        .rows()
        .iter()
        .zip(features.targets().iter().zip(features.positions()))
    {
        assert_eq!(target, series[t]);
        assert_eq!(row[0], series[t - 1]);
        assert_eq!(row[29], series[t - 30]);

        let window = &series[t - 7..t];
        let mean = window.iter().sum::<f64>() / 7.0;
        assert_relative_eq!(row[30], mean, epsilon = 1e-9);
    }
}

#[test]
fn test_changing_a_target_does_not_change_its_row() {
    let series = wave(60);
    let mut altered = series.clone();
    altered[45] = 1_000.0;

    let builder = FeatureBuilder::default();
    assert_eq!(
        builder.row_at(&series, 45).unwrap(),
        builder.row_at(&altered, 45).unwrap()
    );
}

#[test]
fn test_last_window_seeds_next_row() {
    let series = wave(120);
    let builder = FeatureBuilder::default();
    let window = builder.last_window(&series);

    assert_eq!(window.len(), 45);
    assert_eq!(window, &series[75..]);
    assert_eq!(
        builder.next_row(window).unwrap(),
        builder.next_row(&series).unwrap()
    );
}

#[test]
fn test_short_series_gives_no_rows() {
    let features = FeatureBuilder::default().build(&wave(30)).unwrap();
    assert!(features.is_empty());

    let result = FeatureBuilder::default().next_row(&wave(10));
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}
