//! Check command handler

use std::path::Path;
use timetabler::config::Config;
use timetabler::pipeline::{self, RunOptions};

/// Run the solver-free feasibility checks and print the findings
pub fn run(config: &Config) {
    let input_dir = if config.paths.input_dir.is_empty() {
        "input".to_string()
    } else {
        config.paths.input_dir.clone()
    };

    let options = RunOptions {
        params: config.solver_params(),
        period_length_hours: config.solver.period_length_hours,
    };

    match pipeline::check(Path::new(&input_dir), &options) {
        Ok(report) => {
            println!(
                "Model: {} variables, {} constraints",
                report.var_count, report.constraint_count
            );
            for line in &report.validation.details {
                println!("  {line}");
            }
            for warning in &report.warnings {
                println!("  warning: {warning}");
            }

            let diagnostics = &report.diagnostics;
            for issue in &diagnostics.subject_issues {
                println!(
                    "  subject capacity: sec={} subj={} required={} capacity={}",
                    issue.section, issue.subject, issue.required, issue.capacity
                );
            }
            for issue in &diagnostics.lab_issues {
                println!(
                    "  lab sessions: sec={} subj={} sessions={} candidates={}",
                    issue.section, issue.subject, issue.sessions_required, issue.candidates
                );
            }
            for issue in &diagnostics.odd_lab_issues {
                println!(
                    "  odd lab requirement: sec={} subj={} required={}",
                    issue.section, issue.subject, issue.required
                );
            }
            for issue in &diagnostics.faculty_issues {
                println!(
                    "  faculty overload: fac={} required={} capacity={}",
                    issue.faculty, issue.required, issue.capacity
                );
            }

            if report.validation.ok && diagnostics.is_clean() {
                println!("✓ No feasibility problems detected");
            } else {
                eprintln!("✗ Feasibility problems detected; see findings above");
                std::process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("✗ Check failed: {e}");
            std::process::exit(1);
        }
    }
}
