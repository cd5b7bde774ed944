use colored::*;

use crate::common::format::{self, format_count, format_path, format_retention};
use crate::sweeper::{EntryReport, Outcome, SweepRecord, SweepReport};

/// Print a sweep report in human-readable format
pub fn print_sweep_report(report: &SweepReport, detailed: bool) {
    let summary = &report.summary;

    println!();
    println!(
        "  {} Swept {}",
        "🧹",
        format_path(&report.directory).cyan()
    );
    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  Retention {}  •  {}  •  {}",
        format_retention(std::time::Duration::from_secs(report.retention_secs)).cyan(),
        format_count(summary.examined).dimmed(),
        format::format_duration(report.duration_secs).dimmed(),
    );
    if !report.exempt.is_empty() {
        println!("  Exempt: {}", report.exempt.join(", ").dimmed());
    }
    println!("{}", "─".repeat(60).dimmed());
    println!();

    if summary.examined == 0 {
        println!("  {} Directory is empty.", "✨");
        println!();
        return;
    }

    println!(
        "  {} {} deleted   {} retained   {} skipped   {} exempt   {} vanished   {} failed",
        "●".red(),
        summary.deleted.to_string().bold(),
        summary.retained.to_string().green(),
        summary.skipped.to_string().blue(),
        summary.exempt.to_string().cyan(),
        summary.vanished.to_string().dimmed(),
        if summary.failed > 0 {
            summary.failed.to_string().red().bold()
        } else {
            summary.failed.to_string().normal()
        },
    );

    if detailed {
        println!();
        for entry in &report.entries {
            print_entry(entry);
        }
    } else {
        let deleted: Vec<&EntryReport> = report.with_outcome(Outcome::Deleted).collect();
        if !deleted.is_empty() {
            println!();
            for entry in deleted.iter().take(10) {
                print_entry(entry);
            }
            if deleted.len() > 10 {
                println!(
                    "    ... and {} more",
                    (deleted.len() - 10).to_string().dimmed()
                );
            }
        }
    }

    let failures: Vec<&EntryReport> = report.failures().collect();
    if !failures.is_empty() {
        println!();
        println!("  {} {} failures:", "⚠".yellow(), failures.len());
        for (i, entry) in failures.iter().enumerate() {
            if let Some(ref failure) = entry.failure {
                println!(
                    "    {} {} [{}] {}",
                    format!("{}.", i + 1).dimmed(),
                    entry.name,
                    failure.kind,
                    failure.message.dimmed()
                );
            }
        }
    }
    println!();
}

fn print_entry(entry: &EntryReport) {
    let marker = match entry.outcome {
        Outcome::Deleted => "✗".red(),
        Outcome::Retained => "•".green(),
        Outcome::Skipped => "→".blue(),
        Outcome::Exempt => "★".cyan(),
        Outcome::Vanished => "~".dimmed(),
        Outcome::Failed => "⚠".yellow(),
    };
    let age = entry
        .age_secs
        .map(|secs| format!("{} old", format_retention(std::time::Duration::from_secs(secs))))
        .unwrap_or_default();
    let name = if entry.is_dir {
        format!("{}/", entry.name)
    } else {
        entry.name.clone()
    };

    println!(
        "    {} {:<40} {:<9} {}",
        marker,
        format::truncate(&name, 40),
        entry.outcome.to_string(),
        age.dimmed()
    );
}

/// Print a sweep report as JSON
pub fn print_sweep_json(report: &SweepReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing report: {}", e),
    }
}

/// Print a minimal summary: examined deleted retained skipped exempt vanished failed
pub fn print_sweep_quiet(report: &SweepReport) {
    let s = &report.summary;
    println!(
        "{}  {}  {}  {}  {}  {}  {}",
        s.examined, s.deleted, s.retained, s.skipped, s.exempt, s.vanished, s.failed
    );
}

/// Print recent sweep records
pub fn print_history(records: &[SweepRecord]) {
    println!();
    println!("  {} Sweep History", "📋");
    println!("{}", "─".repeat(80).dimmed());
    println!();

    if records.is_empty() {
        println!("  No sweeps recorded yet.");
        println!();
        return;
    }

    println!(
        "  {:<28} {:<24} {:>9} {:>8} {:>8} {:>7}",
        "Sweep ID".dimmed(),
        "Directory".dimmed(),
        "Retention".dimmed(),
        "Examined".dimmed(),
        "Deleted".dimmed(),
        "Failed".dimmed(),
    );
    println!("  {}", "─".repeat(76).dimmed());

    for record in records {
        let failed = if record.summary.failed > 0 {
            record.summary.failed.to_string().red().to_string()
        } else {
            record.summary.failed.to_string()
        };
        println!(
            "  {:<28} {:<24} {:>9} {:>8} {:>8} {:>7}",
            record.sweep_id,
            format::truncate(&format_path(&record.directory), 24),
            format_retention(std::time::Duration::from_secs(record.retention_secs)),
            record.summary.examined,
            record.summary.deleted,
            failed,
        );
    }
    println!();
}

/// Print recent sweep records as JSON
pub fn print_history_json(records: &[SweepRecord]) {
    match serde_json::to_string_pretty(records) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing history: {}", e),
    }
}
