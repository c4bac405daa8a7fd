use pretty_assertions::assert_eq;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;
use weather_etl::models::AnalysisPayload;
use weather_etl::processors::Pipeline;
use weather_etl::writers::{load_analysis_payload, load_quality_report, read_dataset};
use weather_etl::{PipelineConfig, PipelineError};

const GEONAMES: &str = "id,name,feature.id,latitude,longitude,map\n\
                        1108447,VANCOUVER INTL A,CLIM,49.195,-123.182,https://maps.example/1108447\n\
                        6158355,TORONTO,CLIM,43:40:36,-79:24:00,https://maps.example/6158355\n";

const MAPPING: &str = "station_id,climate_id\n26953,1108447\n31688,6158355\n";

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Two stations, the first with two years so YoY deltas exist
fn setup(dir: &TempDir) -> PipelineConfig {
    let raw = dir.path().join("raw_data");

    write(
        &raw.join("station_26953_2022.csv"),
        "\"Date/Time (LST)\",\"Temp (°C)\",\"Rel Hum (%)\"\n\
         2022-01-01 00:00,3.0,80\n\
         2022-01-01 12:00,5.0,\n",
    );
    write(
        &raw.join("station_26953_2023.csv"),
        "Date/Time,Mean Temp (°C)\n\
         2023-01-01,5.2\n\
         2023-01-02,4.8\n\
         2023-01-03,\n\
         2023-01-05,5.0\n\
         2023-02-01,6.1\n\
         2023-02-02,5.9\n",
    );
    write(
        &raw.join("station_31688_2023.csv"),
        "Date/Time (LST),Temp (°C)\n\
         2023-01-01 00:00,-10.0\n\
         2023-01-01 01:00,-4.0\n",
    );

    write(&dir.path().join("geonames.csv"), GEONAMES);
    write(&dir.path().join("mapping.csv"), MAPPING);

    PipelineConfig {
        raw_data_dir: raw,
        output_dir: dir.path().join("output"),
        dimension_file: dir.path().join("geonames.csv"),
        station_mapping_file: Some(dir.path().join("mapping.csv")),
        db_path: dir.path().join("output").join("weather_data.db"),
        ..PipelineConfig::default()
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_full_run() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);
    let summary = Pipeline::new(config.clone()).run(None).unwrap();

    // quality report
    assert_eq!(summary.quality.len(), 3);
    let report: Value =
        serde_json::from_str(&std::fs::read_to_string(config.quality_report_path()).unwrap()).unwrap();
    let batch = &report["station_26953_2023"];
    assert_eq!(batch["record_count"], 6);
    assert_eq!(batch["null_counts"]["Mean Temp (°C)"], 1);
    assert_eq!(batch["missing_dates"][0], "2023-01-04");
    assert_eq!(report["station_26953_2022"]["null_counts"]["Rel Hum (%)"], 1);

    // final dataset
    let rows = read_dataset(&config.output_path()).unwrap();
    let months: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.station_name.as_str(), r.date_month.as_str()))
        .collect();
    assert_eq!(
        months,
        vec![
            ("VANCOUVER INTL A", "2022-01"),
            ("VANCOUVER INTL A", "2023-01"),
            ("VANCOUVER INTL A", "2023-02"),
            ("TORONTO", "2023-01"),
        ]
    );

    let jan_2023 = &rows[1];
    assert_eq!(jan_2023.climate_id, "1108447");
    assert!(approx(jan_2023.temperature_celsius_avg, 5.0));
    assert_eq!(jan_2023.temperature_celsius_min, 4.8);
    assert_eq!(jan_2023.temperature_celsius_max, 5.2);
    assert!(approx(jan_2023.temperature_celsius_yoy_avg.unwrap(), 1.0));

    let feb_2023 = &rows[2];
    assert!(approx(feb_2023.temperature_celsius_avg, 6.0));
    assert_eq!(feb_2023.temperature_celsius_yoy_avg, None);
    assert_eq!(rows[0].temperature_celsius_yoy_avg, None);

    let toronto = &rows[3];
    assert!((toronto.latitude - 43.676_666).abs() < 1e-4);
    for row in &rows {
        assert!(row.temperature_celsius_min <= row.temperature_celsius_avg);
        assert!(row.temperature_celsius_avg <= row.temperature_celsius_max);
    }

    // analysis
    let analysis = summary.analysis.unwrap();
    let low = analysis.results.get("extreme_low_temps").unwrap();
    assert_eq!(low.rows[0]["station_name"], "TORONTO");
    assert_eq!(low.rows[0]["min_temperature"], -10.0);
    assert!(low.len() <= 10);

    let yoy = analysis.results.get("yoy_temp_change").unwrap();
    assert_eq!(yoy.len(), 1);
    assert_eq!(yoy.rows[0]["month"], "01");
    assert_eq!(yoy.rows[0]["avg_yoy_change"], 1.0);

    let saved = load_analysis_payload(&config.analysis_results_path());
    let artifact = saved.to_artifact();
    let keys: Vec<&String> = artifact.as_object().unwrap().keys().collect();
    assert_eq!(
        keys,
        vec![
            "avg_temp_by_station_year",
            "monthly_temp_variations",
            "yoy_temp_change",
            "extreme_high_temps",
            "extreme_low_temps"
        ]
    );
}

#[test]
fn test_rerun_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);
    let pipeline = Pipeline::new(config.clone());

    let artifacts = [
        config.quality_report_path(),
        config.output_path(),
        config.analysis_results_path(),
    ];

    pipeline.run(None).unwrap();
    let first: Vec<Vec<u8>> = artifacts.iter().map(|p| std::fs::read(p).unwrap()).collect();

    pipeline.run(None).unwrap();
    let second: Vec<Vec<u8>> = artifacts.iter().map(|p| std::fs::read(p).unwrap()).collect();

    assert_eq!(first, second);
    assert_eq!(load_quality_report(&config.quality_report_path()).unwrap().len(), 3);
}

#[test]
fn test_parquet_output() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig {
        output_file: "weather_station_monthly.parquet".to_string(),
        compression: "zstd".to_string(),
        ..setup(&dir)
    };

    let summary = Pipeline::new(config.clone()).run(None).unwrap();
    assert!(config.output_path().exists());
    assert_eq!(read_dataset(&config.output_path()).unwrap().len(), 4);
    assert_eq!(summary.analysis.unwrap().results.len(), 5);
}

#[test]
fn test_duplicate_dimension_rows_fail_the_join() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);
    write(
        &config.dimension_file,
        &format!("{}1108447,VANCOUVER AGAIN,CLIM,49.0,-123.0,m\n", GEONAMES),
    );

    let err = Pipeline::new(config.clone()).transform(None).unwrap_err();
    assert!(matches!(err, PipelineError::JoinIntegrity(_)));
    assert!(!config.output_path().exists());
}

#[test]
fn test_identity_mapping_without_matching_dimension() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig {
        station_mapping_file: None,
        ..setup(&dir)
    };

    // raw station ids are not climate ids, so nothing matches
    let err = Pipeline::new(config).transform(None).unwrap_err();
    assert!(matches!(err, PipelineError::JoinIntegrity(_)));
}

#[test]
fn test_schema_drift_aborts_transform() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);
    write(
        &config.raw_data_dir.join("station_31688_2024.csv"),
        "When,Temp (°C)\n2024-01-01,1.0\n",
    );

    let err = Pipeline::new(config).transform(None).unwrap_err();
    assert!(matches!(err, PipelineError::Schema { .. }));
}

#[test]
fn test_empty_raw_directory() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig {
        raw_data_dir: dir.path().join("nothing_here"),
        ..setup(&dir)
    };
    std::fs::create_dir_all(&config.raw_data_dir).unwrap();

    let err = Pipeline::new(config).run(None).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyDataset(_)));
}

#[test]
fn test_degenerate_handoff_still_saves() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("analysis_results.json");
    std::fs::write(&path, "not json").unwrap();

    let payload = load_analysis_payload(&path);
    assert_eq!(payload, AnalysisPayload::RawText("not json".to_string()));
    weather_etl::writers::save_analysis_results(&payload, &path).unwrap();

    let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["raw_data"], "not json");
}
