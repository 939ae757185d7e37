// tests/batch_pipeline_test.rs

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use hwt_trace_render::batch::{run_clock_cycle_batch, run_propagation_batch};
use hwt_trace_render::config::AnalysisConfig;
use hwt_trace_render::data_analysis::return_loss::load_return_loss_curves;
use hwt_trace_render::error::AnalysisError;
use hwt_trace_render::report::{complete_edge_devices, device_stats, edge_delay_points};

const SCOPE_HEADER: &str = "Model,DSO-X 3034T\nSerial,MY5820\nRecord Length,20\nSample Interval,1e-9\nTrigger Point,0\nTrigger Time,0\n,\nTIME,CH1,CH2\n";

/// Input pulses high over samples 2..6 and 10..14.
fn input_level(i: usize) -> u8 {
    u8::from((2..6).contains(&i) || (10..14).contains(&i))
}

/// Buffer capture at 1 ns per sample with the output lagging the input by `lag` samples.
fn buffer_capture(lag: usize) -> String {
    let mut text = SCOPE_HEADER.to_string();
    for i in 0..20 {
        let output = if i >= lag { input_level(i - lag) } else { 0 };
        writeln!(text, "{:e},{},{}", i as f64 * 1e-9, input_level(i), output).unwrap();
    }
    text
}

/// Output rises 1 ns after the first input edge and never falls.
fn stuck_high_capture() -> String {
    let mut text = SCOPE_HEADER.to_string();
    for i in 0..20 {
        let output = u8::from(i >= 3);
        writeln!(text, "{:e},{},{}", i as f64 * 1e-9, input_level(i), output).unwrap();
    }
    text
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn propagation_batch_averages_per_file_and_groups_by_device() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "buf_D1_a.csv", &buffer_capture(1));
    write(dir.path(), "buf_D1_b.csv", &buffer_capture(2));
    write(dir.path(), "buf_D2_a.csv", &stuck_high_capture());

    let outcome = run_propagation_batch(dir.path(), &AnalysisConfig::default()).unwrap();
    assert_eq!(outcome.processed, 3);
    assert_eq!(outcome.skipped_count(), 0);

    let d1_rising = outcome.records.rising.get("D1").unwrap();
    assert_eq!(d1_rising.len(), 2);
    assert!((d1_rising[0] - 1.0).abs() < 1e-6);
    assert!((d1_rising[1] - 2.0).abs() < 1e-6);
    assert_eq!(outcome.records.falling.get("D1").map(<[f64]>::len), Some(2));

    // D2 only ever rises, so it has no falling entry and is not reported.
    assert!(outcome.records.rising.get("D2").is_some());
    assert!(outcome.records.falling.get("D2").is_none());

    let complete = complete_edge_devices(&outcome.records);
    assert_eq!(complete.len(), 1);
    let (device, rising, falling) = &complete[0];
    assert_eq!(device, "D1");
    assert!((rising - 1.5).abs() < 1e-6);
    assert!((falling - 1.5).abs() < 1e-6);

    // The scatter keeps both D1 files per direction instead of their mean.
    let points = edge_delay_points(&outcome.records);
    assert_eq!(points.devices, vec!["D1".to_string()]);
    assert_eq!(points.rising.len(), 2);
    assert_eq!(points.falling.len(), 2);
}

#[test]
fn files_without_device_token_land_in_unknown_bucket() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "capture.csv", &buffer_capture(1));

    let outcome = run_propagation_batch(dir.path(), &AnalysisConfig::default()).unwrap();
    assert_eq!(outcome.records.rising.device_ids().collect::<Vec<_>>(), vec!["unknown"]);
}

#[test]
fn toml_config_drives_layout_and_units() {
    let dir = tempfile::tempdir().unwrap();
    // Two metadata rows, output before input, semicolon separated.
    let mut text = String::from("Model;X\nTIME;OUT;IN\n");
    for i in 0..20 {
        let output = if i >= 3 { input_level(i - 3) } else { 0 };
        writeln!(text, "{:e};{};{}", i as f64 * 1e-9, output, input_level(i)).unwrap();
    }
    write(dir.path(), "lab-7-U4.csv", &text);

    let config = AnalysisConfig::from_toml_str(
        r#"
        [capture]
        header_rows = 2
        delimiter = ";"
        time_unit = "ps"

        [propagation.channels]
        time = 0
        input = 2
        output = 1

        [device_id]
        delimiter = "-"
        index = 2
        "#,
    )
    .unwrap();

    let outcome = run_propagation_batch(dir.path(), &config).unwrap();
    let rising = outcome.records.rising.get("U4").unwrap();
    assert!((rising[0] - 3000.0).abs() < 1e-3);
}

#[test]
fn clock_cycle_batch_skips_unusable_captures() {
    let dir = tempfile::tempdir().unwrap();
    let header = "a,1\nb,2\nc,3\nd,4\ne,5\nf,6\ng,7\nTIME,X,EN,OUT,CLK\n";
    let mut good = header.to_string();
    for i in 0..60 {
        // 10 ns clock rising at 5, 15, ...; enable falls at 8; output rises at 29.
        let clock = u8::from(i % 10 >= 5);
        let enable = u8::from(i < 8);
        let output = u8::from(i >= 29);
        writeln!(good, "{:e},0,{enable},{output},{clock}", i as f64 * 1e-9).unwrap();
    }
    let mut no_clock = header.to_string();
    for i in 0..20 {
        writeln!(no_clock, "{:e},0,{},0,0", i as f64 * 1e-9, u8::from(i < 8)).unwrap();
    }
    write(dir.path(), "run_A1_0.csv", &good);
    write(dir.path(), "run_A2_0.csv", &no_clock);
    write(dir.path(), "run_A3_0.csv", "only,metadata\n");

    let outcome = run_clock_cycle_batch(dir.path(), &AnalysisConfig::default()).unwrap();
    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.skipped_count(), 2);
    assert_eq!(outcome.records.cycle_delays.get("A1"), Some(&[2][..]));
    // Clock edge at 25 ns -> output at 29 ns is the only delay inside 3..=8 ns.
    let delays = outcome.records.propagation_delays.get("A1").unwrap();
    assert_eq!(delays.len(), 1);
    assert!((delays[0] - 4.0).abs() < 1e-6);

    let stats = device_stats(&outcome.records.cycle_delays_f64());
    assert_eq!(stats[0].1.count, 1);
}

#[test]
fn missing_time_base_aborts_instead_of_skipping() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "buf_D1_a.csv", &buffer_capture(1));
    let config = AnalysisConfig::from_toml_str("[propagation.channels]\ninput = 1\noutput = 2\n").unwrap();
    assert!(matches!(
        run_propagation_batch(dir.path(), &config),
        Err(AnalysisError::MissingTimeBase)
    ));
}

#[test]
fn return_loss_reads_several_directories() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let network = "! board sweep\n# GHZ S MA R 50\n1.0 0.1 0\n2.0 0.01 0\n";
    write(first.path(), "FPGA_HWT_OFF_1.s1p", network);
    write(second.path(), "FPGA_ON_1.s1p", network);

    let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let set = load_return_loss_curves(&dirs, &AnalysisConfig::default().return_loss).unwrap();
    assert_eq!(set.curves.len(), 2);
    assert_eq!(set.curves_in(0).count(), 1);
    assert_eq!(set.curves_in(3).count(), 1);
    let curve = &set.curves[0];
    assert!((curve.points[0].0 - 1e9).abs() < 1.0);
    assert!((curve.points[0].1 + 20.0).abs() < 1e-9);
    assert!((curve.points[1].1 + 40.0).abs() < 1e-9);
}
