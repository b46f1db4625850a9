use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use paramflow_core::report::{generate_param_report, ReportFormat};
use paramflow_core::{CapturedTraffic, CorrelatedParam, ParamKey, Paramalyzer};
use paramflow_tracker::{DependencyGraph, DetectorConfig, OriginDetector, TrackedParameter};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Load a capture file, expanding `~` in the path.
pub fn load_capture(path_arg: &str) -> Result<CapturedTraffic, String> {
    let expanded = shellexpand::tilde(path_arg);
    CapturedTraffic::from_path(Path::new(expanded.as_ref()))
        .map_err(|e| format!("Failed to load capture '{}': {}", path_arg, e))
}

/// Parse and range-check the origin confidence threshold argument.
pub fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("Invalid threshold '{}': expected a number", raw))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "Threshold {} out of range: expected 0.0 to 1.0",
            value
        ))
    }
}

/// Wrap the parameters to track as graph vertices: every correlated
/// parameter with `--all`, otherwise only the likely secrets.
pub fn select_tracked(
    correlated: &BTreeMap<ParamKey, CorrelatedParam>,
    all: bool,
) -> Vec<TrackedParameter> {
    if all {
        correlated
            .values()
            .map(|p| TrackedParameter::new(p.clone()))
            .collect()
    } else {
        Paramalyzer::param_secrets(correlated)
            .into_iter()
            .map(|p| TrackedParameter::new(p.clone()))
            .collect()
    }
}

/// Plain-text edge listing for terminal output.
pub fn render_edges(graph: &DependencyGraph) -> String {
    if graph.edge_count() == 0 {
        return "  (no origin relationships found)\n".to_string();
    }
    let mut out = String::new();
    for (origin, transform, dependent) in graph.edges() {
        out.push_str(&format!("  {} -> {}", origin, dependent));
        if !transform.is_empty() {
            out.push_str(&format!("  [{}]", transform));
        }
        out.push('\n');
    }
    out
}

pub fn handle_analyze(args: &ArgMatches) {
    let capture_path = args.get_one::<String>("CAPTURE").unwrap();
    let traffic = match load_capture(capture_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let format_arg = args.get_one::<String>("format").unwrap();
    let format = match ReportFormat::from_str(format_arg) {
        Some(f) => f,
        None => {
            eprintln!(
                "{} Unknown report format '{}': expected text or json",
                "✗".red().bold(),
                format_arg
            );
            std::process::exit(1);
        }
    };

    let correlated = Paramalyzer::analyze(&traffic);

    let report = if args.get_flag("secrets-only") {
        let secrets: BTreeMap<ParamKey, CorrelatedParam> = Paramalyzer::param_secrets(&correlated)
            .into_iter()
            .map(|p| (p.key().clone(), p.clone()))
            .collect();
        generate_param_report(&secrets, &format)
    } else {
        generate_param_report(&correlated, &format)
    };

    println!("{}", report);
}

pub async fn handle_track(args: &ArgMatches) {
    let capture_path = args.get_one::<String>("CAPTURE").unwrap();
    let traffic = match load_capture(capture_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let threshold = match parse_threshold(args.get_one::<String>("threshold").unwrap()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    let correlated = Paramalyzer::analyze(&traffic);
    let vertices = select_tracked(&correlated, args.get_flag("all"));
    if vertices.is_empty() {
        println!(
            "No parameters to track. Re-run with {} to include every correlated parameter.",
            "--all".bright_white()
        );
        return;
    }
    println!(
        "Tracking {} of {} correlated parameters",
        vertices.len().to_string().bright_white(),
        correlated.len()
    );

    let config = DetectorConfig {
        confidence_threshold: threshold,
        ..Default::default()
    };

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );
    let pb_status = pb.clone();
    let pb_progress = pb.clone();

    let handle = OriginDetector::new(config)
        .with_status_callback(Arc::new(move |text| {
            pb_status.set_message(text.to_string());
        }))
        .with_progress_callback(Arc::new(move |percent| {
            pb_progress.set_position(percent as u64);
        }))
        .spawn(vertices);

    let outcome = match handle.wait().await {
        Ok(outcome) => outcome,
        Err(e) => {
            pb.abandon();
            eprintln!("{} Origin detection failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };
    pb.finish_and_clear();

    if outcome.cancelled {
        println!("{} Detection cancelled; results are partial", "!".yellow().bold());
    }
    println!(
        "Tested {} pairs ({} skipped), found {} origin relationships\n",
        outcome.pairs_tested,
        outcome.pairs_skipped,
        outcome.links.len().to_string().bright_white()
    );

    let graph = outcome.into_graph();
    println!("{}", "Origin graph".bright_white().bold());
    print!("{}", render_edges(&graph));

    if let Some(dot_path) = args.get_one::<String>("dot") {
        let expanded = shellexpand::tilde(dot_path);
        match fs::write(expanded.as_ref(), graph.to_dot()) {
            Ok(()) => println!("\n{} Wrote DOT graph to {}", "✓".green().bold(), dot_path),
            Err(e) => eprintln!(
                "{} Failed to write DOT graph to {}: {}",
                "✗".red().bold(),
                dot_path,
                e
            ),
        }
    }
}
