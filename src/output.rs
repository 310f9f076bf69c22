use std::io::{self, Write};

use serde::Serialize;

use crate::pipeline::{ConfigSummary, ProgressEvent, ProgressSink, RunReport};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &RunReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_config(summary: &ConfigSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn print_report(report: &RunReport) {
        let green = "\x1b[32m";
        let yellow = "\x1b[33m";
        let cyan = "\x1b[36m";
        let reset = "\x1b[0m";

        println!("{cyan}KIRA-PL summary{reset}");
        println!(
            "{green}rows written: {} -> {}{reset}",
            report.rows_written, report.output_path
        );
        println!(
            "taxonomy: {} records, {} kept, {} without tax id, {} duplicate accessions",
            report.taxonomy.records,
            report.taxonomy.kept,
            report.taxonomy.missing_tax_id,
            report.taxonomy.duplicate_accessions
        );
        let dropped = report.overview.dropped();
        let color = if dropped > 0 { yellow } else { green };
        println!(
            "{color}overview: {} rows, {} dropped at taxonomy join{reset}",
            report.overview.overview_rows, dropped
        );
        if let Some(annotation) = &report.annotation {
            println!(
                "interproscan: {} hits, {} annotated, {} without hits, {} unmatched ids",
                annotation.hits,
                annotation.annotated,
                annotation.without_hits,
                annotation.unmatched_hit_proteins
            );
        }
        println!(
            "labels: {} labelled, {} unlabelled, {} prepilin-guarded",
            report.classification.labelled,
            report.classification.unlabelled,
            report.classification.guarded
        );
        for (label, count) in &report.classification.label_counts {
            println!("  {label}: {count}");
        }
    }

    pub fn print_config(summary: &ConfigSummary) {
        println!("overview: {}", summary.overview_file);
        println!("taxonomy: {}", summary.taxonomy_file);
        match &summary.interpro_file {
            Some(path) => println!("interproscan: {path}"),
            None => println!("interproscan: disabled"),
        }
        println!(
            "thresholds: default {} / labelled {} / unlabelled {}",
            summary.default_threshold, summary.labelled_threshold, summary.unlabelled_threshold
        );
        for category in &summary.categories {
            println!("category {} -> label {}", category.name, category.label);
        }
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("{} ({} ms)", event.message, elapsed.as_millis()),
            None => eprintln!("{}", event.message),
        }
    }
}
