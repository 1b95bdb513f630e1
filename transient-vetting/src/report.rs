//! Text, JSON and CSV rendering of a [`BatchReport`].

use std::fmt::Write as _;

use serde::Serialize;

use crate::batch::{BatchReport, BatchSummary};
use crate::catalog::CatalogRow;
use crate::classify::{ClassificationRecord, Rejection};
use crate::sdss::RedshiftEstimate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub format: ReportFormat,
    /// Also list rejected candidates and why.
    pub show_rejected: bool,
    /// Column order for Milliquas rows in the table format.
    pub milliquas_columns: Vec<String>,
}

pub fn render(report: &BatchReport, options: &ReportOptions) -> serde_json::Result<String> {
    match options.format {
        ReportFormat::Table => Ok(render_table(report, options)),
        ReportFormat::Json => render_json(report, options.show_rejected),
        ReportFormat::Csv => Ok(render_csv(report, options.show_rejected)),
    }
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else {
        format!("{}", v)
    }
}

fn fmt_estimate(z: &RedshiftEstimate) -> String {
    format!("{} +/- {}", fmt_value(z.value), fmt_value(z.uncertainty))
}

fn render_table(report: &BatchReport, options: &ReportOptions) -> String {
    let mut out = String::new();
    let summary = &report.summary;
    let _ = writeln!(out);
    let _ = writeln!(out, "Number of candidates: {}", summary.total);
    let _ = writeln!(out, "Number of filtered candidates: {}", summary.accepted);
    let _ = writeln!(out);

    for record in report.accepted() {
        write_record(&mut out, record, &options.milliquas_columns);
    }

    if options.show_rejected && summary.rejected() > 0 {
        let _ = writeln!(
            out,
            "Rejected: {} (star: {}, AGN/QSO: {}, both: {})",
            summary.rejected(),
            summary.rejected_star,
            summary.rejected_qso,
            summary.rejected_star_and_qso
        );
        for rejection in report.rejected() {
            write_rejection(&mut out, rejection);
        }
    }
    out
}

fn write_record(out: &mut String, record: &ClassificationRecord, columns: &[String]) {
    let _ = writeln!(out, "Object:  {}", record.name);
    let _ = writeln!(out, "spec-z:  {}", fmt_estimate(&record.spec_z));
    let _ = writeln!(out, "photo-z: {}", fmt_estimate(&record.photo_z));
    let _ = writeln!(out, "Milliquas output");
    write_rows(out, &record.milliquas_rows, columns);
    let _ = writeln!(out);
}

fn write_rows(out: &mut String, rows: &[CatalogRow], columns: &[String]) {
    if rows.is_empty() {
        let _ = writeln!(out, "  (no matches)");
        return;
    }
    let columns: Vec<String> = if columns.is_empty() {
        rows[0].columns().map(|(name, _)| name.to_string()).collect()
    } else {
        columns.to_vec()
    };
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| row.get(col).map(ToString::to_string).unwrap_or_else(|| "--".into()))
                .collect()
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| cells.iter().map(|r| r[i].len()).chain([col.len()]).max().unwrap_or(0))
        .collect();

    let line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:>width$}", v, width = w))
            .collect::<Vec<_>>()
            .join(" ")
    };
    let _ = writeln!(out, "{}", line(&columns));
    let _ = writeln!(
        out,
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join(" ")
    );
    for row in &cells {
        let _ = writeln!(out, "{}", line(row));
    }
}

fn write_rejection(out: &mut String, rejection: &Rejection) {
    let _ = write!(out, "  {}: {}", rejection.name, rejection.reason);
    if let Some(subclass) = &rejection.qso_subclass {
        let _ = write!(out, " [subCl={}]", subclass);
    }
    if let Some(star) = &rejection.star {
        let _ = write!(
            out,
            " [G={:.2} at {:.2}\" < {:.2}\"]",
            star.gmag, star.separation_arcsec, star.exclusion_radius_arcsec
        );
    }
    let _ = writeln!(out);
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a BatchSummary,
    accepted: Vec<&'a ClassificationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected: Option<Vec<&'a Rejection>>,
}

fn render_json(report: &BatchReport, show_rejected: bool) -> serde_json::Result<String> {
    let json = JsonReport {
        summary: &report.summary,
        accepted: report.accepted().collect(),
        rejected: show_rejected.then(|| report.rejected().collect()),
    };
    serde_json::to_string_pretty(&json)
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn render_csv(report: &BatchReport, show_rejected: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "name,status,spec_z,spec_z_err,photo_z,photo_z_err,milliquas_matches"
    );
    for outcome in &report.outcomes {
        if let Some(record) = outcome.accepted() {
            let _ = writeln!(
                out,
                "{},accepted,{},{},{},{},{}",
                csv_field(&record.name),
                fmt_value(record.spec_z.value),
                fmt_value(record.spec_z.uncertainty),
                fmt_value(record.photo_z.value),
                fmt_value(record.photo_z.uncertainty),
                record.milliquas_rows.len()
            );
        } else if let (true, Some(rejection)) = (show_rejected, outcome.rejection()) {
            let _ = writeln!(
                out,
                "{},{},nan,nan,nan,nan,0",
                csv_field(&rejection.name),
                csv_field(&rejection.reason.to_string())
            );
        }
    }
    out
}
