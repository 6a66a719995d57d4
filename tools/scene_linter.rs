/// Scene Linter: reports authoring hazards in narrative scene content.
///
/// Usage: scene_linter <scene_file_or_dir> [--strict]
///
/// `--strict` treats warnings as failures.

use narrative_terminal::core::content::load_scene;
use narrative_terminal::core::lint::{lint_scene, LintReport, Severity};
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: scene_linter <scene_file_or_dir> [--strict]");
        process::exit(0);
    }

    let target = Path::new(&args[1]);
    let strict = args[2..].iter().any(|arg| arg == "--strict");

    let files = if target.is_file() {
        vec![target.to_path_buf()]
    } else if target.is_dir() {
        let mut files = Vec::new();
        collect_scene_files(target, &mut files);
        files.sort();
        files
    } else {
        eprintln!("ERROR: Path '{}' does not exist", target.display());
        process::exit(1);
    };

    if files.is_empty() {
        eprintln!("ERROR: No .json or .ron scene files under '{}'", target.display());
        process::exit(1);
    }

    let mut errors = 0;
    let mut warnings = 0;
    let mut notes = 0;

    println!("=== Scene Lint Report ===");
    for path in &files {
        println!("\n{}", path.display());
        let scene = match load_scene(path) {
            Ok(scene) => scene,
            Err(e) => {
                println!("  ERROR: failed to load: {}", e);
                errors += 1;
                continue;
            }
        };

        let report = lint_scene(&scene);
        print_report(&report);
        errors += report.count(Severity::Error);
        warnings += report.count(Severity::Warning);
        notes += report.count(Severity::Note);
    }

    println!(
        "\nSummary: {} files, {} errors, {} warnings, {} notes",
        files.len(),
        errors,
        warnings,
        notes
    );

    if errors > 0 || (strict && warnings > 0) {
        process::exit(1);
    }
}

fn print_report(report: &LintReport) {
    if report.is_clean() {
        println!("  All checks passed!");
        return;
    }
    let mut issues: Vec<_> = report.issues.iter().collect();
    issues.sort_by(|a, b| b.severity.cmp(&a.severity));
    for issue in issues {
        println!("  {}", issue);
    }
}

fn collect_scene_files(dir: &Path, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_scene_files(&path, files);
            } else if matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("json") | Some("ron")
            ) {
                files.push(path);
            }
        }
    }
}
