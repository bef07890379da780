use std::path::PathBuf;
use std::process;
use std::time::Duration;

use delve_bench::report;
use delve_bench::runner::BenchmarkRunner;
use delve_bench::scenes;
use delve_core::load_settings_from_str;

const DEFAULT_SETTINGS: &str = include_str!("../../../config/default.ron");

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut settings_path: Option<PathBuf> = None;
    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut regression_threshold = 10.0f64;
    let mut frame_count = 240u32;
    let mut radius: Option<u32> = None;
    let mut budget_ms = 4.0f64;
    let mut frame_ms: Option<f64> = None;
    let mut speed: Option<f32> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--settings" => settings_path = Some(PathBuf::from(value(&args, &mut i))),
            "--baseline" => baseline_path = Some(PathBuf::from(value(&args, &mut i))),
            "--output" => output_path = Some(PathBuf::from(value(&args, &mut i))),
            "--regression-threshold" => {
                regression_threshold = parse(&args, &mut i, "--regression-threshold")
            }
            "--frames" => frame_count = parse(&args, &mut i, "--frames"),
            "--radius" => radius = Some(parse(&args, &mut i, "--radius")),
            "--budget-ms" => budget_ms = parse(&args, &mut i, "--budget-ms"),
            "--frame-ms" => frame_ms = Some(parse(&args, &mut i, "--frame-ms")),
            "--speed" => speed = Some(parse(&args, &mut i, "--speed")),
            "--help" | "-h" => {
                eprintln!("Usage: stream-bench [OPTIONS]");
                eprintln!("  --settings <path>              Terrain/streaming RON (default: built-in)");
                eprintln!("  --frames <n>                   Frames per scene (default: 240)");
                eprintln!("  --radius <chunks>              Stream radius (default: from settings)");
                eprintln!("  --budget-ms <ms>               Streaming time budget per frame (default: 4)");
                eprintln!("  --frame-ms <ms>                Simulated frame period (default: budget)");
                eprintln!("  --speed <units/frame>          Fly a single custom scene at this speed");
                eprintln!("  --baseline <path>              Load baseline JSON for comparison");
                eprintln!("  --output <path>                Save current results as JSON baseline");
                eprintln!(
                    "  --regression-threshold <pct>   Regression threshold percentage (default: 10)"
                );
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let settings_text = match &settings_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Failed to read {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => DEFAULT_SETTINGS.to_string(),
    };
    let settings = match load_settings_from_str(&settings_text) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid settings: {}", e);
            process::exit(1);
        }
    };

    if !(budget_ms.is_finite() && budget_ms >= 0.0) {
        eprintln!("--budget-ms must be a non-negative number");
        process::exit(1);
    }
    let budget = Duration::from_secs_f64(budget_ms / 1000.0);
    let radius = radius.unwrap_or(settings.streaming.radius);
    let mut runner = BenchmarkRunner::new(settings, frame_count, radius, budget);
    if let Some(ms) = frame_ms {
        if !(ms.is_finite() && ms >= 0.0) {
            eprintln!("--frame-ms must be a non-negative number");
            process::exit(1);
        }
        runner = runner.with_frame_period(Duration::from_secs_f64(ms / 1000.0));
    }

    let scene_configs = match speed {
        Some(speed) => vec![scenes::custom_scene(speed)],
        None => scenes::standard_scenes(),
    };
    let mut results = Vec::new();

    for config in &scene_configs {
        match runner.run_scene(config) {
            Ok(result) => results.push(result),
            Err(e) => {
                eprintln!("Scene '{}' failed: {}", config.name, e);
                process::exit(1);
            }
        }
    }

    println!("\n## Streaming Benchmark Results\n");
    println!("{}", report::format_markdown(&results));

    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            timestamp: run_label(),
            results: results.clone(),
        };
        if let Err(e) = report::save_baseline(path, &baseline) {
            eprintln!("Failed to save baseline to {}: {}", path.display(), e);
            process::exit(1);
        }
        log::info!("Saved baseline to {}", path.display());
    }

    if let Some(ref path) = baseline_path {
        if let Some(baseline) = report::load_baseline(path) {
            let regressions = report::compare(&results, &baseline, regression_threshold);
            println!(
                "{}",
                report::format_comparison(&regressions, regression_threshold)
            );
            if !regressions.is_empty() {
                eprintln!(
                    "ERROR: {} regressions detected, exiting with code 1",
                    regressions.len()
                );
                process::exit(1);
            }
        } else {
            log::warn!("Baseline file not found: {}", path.display());
        }
    }

    log::info!("Benchmark complete.");
}

fn value<'a>(args: &'a [String], i: &mut usize) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(v) => v,
        None => {
            eprintln!("Missing value for {}", args[*i - 1]);
            process::exit(1);
        }
    }
}

fn parse<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> T {
    let raw = value(args, i);
    match raw.parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Invalid {} value: {}", flag, raw);
            process::exit(1);
        }
    }
}

/// Seconds since the Unix epoch, used to label saved baselines.
fn run_label() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("unix-{secs}")
}
