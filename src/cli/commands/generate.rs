//! Generate command handler

use std::path::Path;
use timetabler::config::Config;
use timetabler::pipeline::{self, RunOptions};

/// Run the full generation pipeline using the effective configuration
pub fn run(config: &Config) {
    let input_dir = effective_dir(&config.paths.input_dir, "input");
    let output_dir = effective_dir(&config.paths.output_dir, "output");

    let options = RunOptions {
        params: config.solver_params(),
        period_length_hours: config.solver.period_length_hours,
    };

    match pipeline::generate(Path::new(&input_dir), Path::new(&output_dir), &options) {
        Ok(summary) => {
            if summary.status.has_solution() {
                println!(
                    "✓ Timetable generated: status={} assigned={} violations={}",
                    summary.status.as_str(),
                    summary.assigned_count,
                    summary.violations
                );
                println!("✓ Outputs written to: {output_dir}");
            } else {
                eprintln!(
                    "✗ No timetable found: status={} (see {output_dir}/diagnostics.json)",
                    summary.status.as_str()
                );
            }
            if !summary.warnings.is_empty() {
                eprintln!("⚠ {} build warnings; re-run with --log-level warn for details",
                    summary.warnings.len()
                );
            }
        }
        Err(e) => {
            eprintln!("✗ Generation failed: {e}");
            std::process::exit(1);
        }
    }
}

fn effective_dir(configured: &str, fallback: &str) -> String {
    if configured.is_empty() {
        fallback.to_string()
    } else {
        configured.to_string()
    }
}
