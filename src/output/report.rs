//! Markdown rendering of cycle reports and vacancy lists

use crate::crawler::CycleReport;
use crate::vacancy::VacancyRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Formats a cycle report as markdown
///
/// # Arguments
///
/// * `report` - The report of a completed cycle
///
/// # Returns
///
/// A formatted markdown string
pub fn format_cycle_report(report: &CycleReport) -> String {
    let mut md = String::new();

    md.push_str("# Vacancy Watch Cycle Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Search term**: {}\n", report.search_term));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n\n",
        (report.finished_at - report.started_at).num_seconds()
    ));

    md.push_str("## Scraping\n\n");
    md.push_str(&format!(
        "- **Pages fetched**: {} of {} ({} failed)\n",
        report.pages_fetched, report.pages_requested, report.pages_failed
    ));
    md.push_str(&format!("- **Records extracted**: {}\n", report.records_extracted));
    md.push_str(&format!("- **Blocks dropped**: {}\n", report.blocks_dropped));
    if report.details_failed > 0 {
        md.push_str(&format!(
            "- **Detail pages failed**: {}\n",
            report.details_failed
        ));
    }
    md.push('\n');

    md.push_str("## Reconciliation\n\n");
    if !report.prior_loaded {
        md.push_str("> Known vacancies could not be read; every record was treated as new.\n\n");
    }
    md.push_str("| Partition | Count |\n");
    md.push_str("|-----------|-------|\n");
    md.push_str(&format!("| New | {} |\n", report.new_count()));
    md.push_str(&format!("| Updated | {} |\n", report.updated_count()));
    md.push_str(&format!("| Unchanged | {} |\n", report.unchanged_count()));
    md.push_str(&format!(
        "\nKnown vacancies: {} before, {} after.\n\n",
        report.prior_known,
        report.result.full_set.len()
    ));

    md.push_str("## Persistence\n\n");
    md.push_str(&format!("- **Rows inserted**: {}\n", report.rows_inserted));
    md.push_str(&format!("- **Rows updated**: {}\n", report.rows_updated));
    match &report.new_batch_path {
        Some(path) => md.push_str(&format!("- **New-vacancy snapshot**: {}\n", path.display())),
        None => md.push_str("- **New-vacancy snapshot**: none\n"),
    }
    md.push('\n');

    md.push_str("## Notifications\n\n");
    match &report.notifications {
        Some(summary) => md.push_str(&format!(
            "- **Subscribers notified**: {} of {} ({} failed, {} vacancies sent)\n",
            summary.notified, summary.recipients, summary.failed, summary.records_sent
        )),
        None => md.push_str("- Notifications are disabled\n"),
    }

    if !report.result.new.is_empty() {
        md.push_str("\n## New Vacancies\n\n");
        md.push_str(&format_vacancy_list(&report.result.new));
    }

    md
}

/// Formats vacancies as a markdown list, one entry per vacancy
pub fn format_vacancy_list(records: &[VacancyRecord]) -> String {
    let mut md = String::new();

    for record in records {
        md.push_str(&format!(
            "- [{}]({}) at {}\n",
            record.title, record.link, record.company
        ));
        md.push_str(&format!(
            "  - {} | {} | {}\n",
            record.salary, record.experience, record.location
        ));
        if !record.skills.is_empty() {
            md.push_str(&format!("  - Skills: {}\n", record.skills.join(", ")));
        }
    }

    md
}

/// Writes a cycle report to a markdown file
pub fn write_cycle_report(report: &CycleReport, output_path: &Path) -> std::io::Result<()> {
    let mut file = File::create(output_path)?;
    file.write_all(format_cycle_report(report).as_bytes())?;
    Ok(())
}
