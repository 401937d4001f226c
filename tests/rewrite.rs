//! End-to-end runs of the rewrite engine against the solar model

use std::io::Cursor;
use std::str::FromStr;

use approx::assert_abs_diff_eq;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use solarplot::config::LocationPreset;
use solarplot::raster::{self, RasterSettings};
use solarplot::{ClockReading, Config, InputUnits, Rewriter, RunSummary, SolarTracker, TimeOfDay};

const SQUARE: &str = "\
(five inch square)
G90
G20
G0 X0 Y0
G1 X5 Y0 F10
X5 Y5
X0 Y5
X0 Y0
M5
";

fn tracker(config: &Config, start: TimeOfDay, day: u32) -> SolarTracker {
    SolarTracker::establish(&config.location, ClockReading::new(start, day)).unwrap()
}

fn rewrite(program: &str, config: &Config, start: TimeOfDay, day: u32) -> (String, RunSummary) {
    let rewriter = Rewriter::from_config(tracker(config, start, day), config, start);
    let mut output = Vec::new();
    let summary = rewriter
        .run(Cursor::new(program.as_bytes()), &mut output)
        .unwrap();
    (String::from_utf8(output).unwrap(), summary)
}

/// Seconds shown in every `(Time is ...)` comment, in order
fn time_comments(output: &str) -> Vec<u32> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix("(Time is ")?.strip_suffix(')'))
        .map(|time| TimeOfDay::from_str(time).unwrap().seconds())
        .collect()
}

/// The X/Y pairs of every rewritten move, in order
fn moves(output: &str) -> Vec<(f64, f64)> {
    output
        .lines()
        .filter(|line| !line.starts_with('('))
        .filter_map(|line| {
            let mut words = line.split_whitespace().rev();
            let y = words.next()?.strip_prefix('Y')?.parse().ok()?;
            let x = words.next()?.strip_prefix('X')?.parse().ok()?;
            Some((x, y))
        })
        .collect()
}

#[test]
fn test_square_program() {
    let config = Config::default();
    let start = TimeOfDay::from_hms(14, 0, 0).unwrap();
    let (output, summary) = rewrite(SQUARE, &config, start, 170);

    assert_eq!(summary.lines, 9);
    assert_eq!(summary.moves, 5);
    assert_eq!(summary.fallbacks, 0);
    assert_eq!(summary.start, start);

    // Every input line gets a time comment and time never runs backwards
    let times = time_comments(&output);
    assert_eq!(times.len(), 9);
    assert_eq!(times[0], 0);
    assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));

    // Four 5 inch sides at 10 in/min, plus the rapid to the origin
    assert!(summary.elapsed > 115.0 && summary.elapsed < 125.0, "{}", summary.elapsed);

    // Corrections stay small over two minutes and start at zero
    let programmed = [(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0), (0.0, 0.0)];
    let rewritten = moves(&output);
    assert_eq!(rewritten.len(), programmed.len());
    assert_abs_diff_eq!(rewritten[0].0, 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(rewritten[0].1, 0.0, epsilon = 1e-3);
    for (got, want) in rewritten.iter().zip(programmed.iter()) {
        assert_abs_diff_eq!(got.0, want.0, epsilon = 0.5);
        assert_abs_diff_eq!(got.1, want.1, epsilon = 0.5);
    }
    // The closing point is corrected for a later sun than the opening one
    assert!(rewritten[4] != rewritten[0]);

    // Non-move lines come through untouched
    assert!(output.contains("\n(five inch square)\n"));
    assert!(output.contains("\nG90\n"));
    assert!(output.contains("\nM5\n"));

    let bounds = summary.bounds.unwrap();
    assert!(bounds.max_x - bounds.min_x > 4.5);
    assert!(bounds.max_y - bounds.min_y > 4.5);
}

#[test]
fn test_feed_comments() {
    let config = Config::default();
    let (output, _) = rewrite(SQUARE, &config, TimeOfDay::from_hms(11, 30, 0).unwrap(), 20);
    assert!(output.contains("(f is now 0.00423333, text was 10)\n"));
    assert_eq!(output.matches("(dist = ").count(), 5);
}

#[test]
fn test_millimeter_program_matches_inches() {
    let inches = Config::default();
    let millimeters = Config {
        units: InputUnits::Millimeters,
        rapid_feed_per_minute: 60.0 * 25.4,
        ..Config::default()
    };
    let start = TimeOfDay::from_hms(15, 0, 0).unwrap();
    let metric = "G0 X0 Y0\nG1 X127 Y0 F254\nX127 Y127\n";
    let imperial = "G0 X0 Y0\nG1 X5 Y0 F10\nX5 Y5\n";

    let (metric_out, metric_summary) = rewrite(metric, &millimeters, start, 100);
    let (imperial_out, imperial_summary) = rewrite(imperial, &inches, start, 100);

    assert_abs_diff_eq!(metric_summary.elapsed, imperial_summary.elapsed, epsilon = 1e-9);
    for (mm, inch) in moves(&metric_out).iter().zip(moves(&imperial_out).iter()) {
        assert_abs_diff_eq!(mm.0 / 25.4, inch.0, epsilon = 1e-5);
        assert_abs_diff_eq!(mm.1 / 25.4, inch.1, epsilon = 1e-5);
    }
}

#[test]
fn test_sites_disagree() {
    let start = TimeOfDay::from_hms(16, 0, 0).unwrap();
    // The first move takes a minute, so the compared move sees a later sun
    let program = "G1 X1 Y0 F1\nX1 Y1\n";
    let santa_cruz = Config::default();
    let palo_alto = Config {
        location: LocationPreset::PaloAlto.location(),
        ..Config::default()
    };

    let (a, _) = rewrite(program, &santa_cruz, start, 200);
    let (b, _) = rewrite(program, &palo_alto, start, 200);
    assert_ne!(moves(&a)[1], moves(&b)[1]);
}

#[test]
fn test_raster_program_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = Array2::from_shape_fn((8, 8), |_| rng.gen_range(0.0..255.0));
    raster::normalize(&mut data);
    raster::quantize(&mut data, 8);

    let settings = RasterSettings {
        columns: 8,
        rows: 8,
        ..RasterSettings::default()
    };
    let mut program = Vec::new();
    let stats = raster::generate(&data, &settings, &mut program).unwrap();
    let program = String::from_utf8(program).unwrap();

    let config = Config::default();
    let (output, summary) = rewrite(&program, &config, TimeOfDay::from_hms(13, 0, 0).unwrap(), 150);

    // Header lines pass through; the G0 and every G1 are rewritten
    assert_eq!(summary.lines, program.lines().count());
    assert_eq!(summary.moves, stats.moves + 1);
    assert_eq!(moves(&output).len(), stats.moves + 1);
    assert!(output.contains("\nG20\n"));

    let times = time_comments(&output);
    assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(summary.elapsed > 0.0);
}
