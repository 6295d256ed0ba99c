use anyhow::Result;
use console::{style, StyledObject};

use actiontree_core::{ManifestStatus, RootResult, ScanReport};

pub fn json(report: &ScanReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Human-readable report: one tree per root, the unique actions, then a summary line.
pub fn text(report: &ScanReport) -> String {
    let mut lines = Vec::new();

    for root in &report.roots {
        if root.success {
            root_tree(report, root, &mut lines);
        } else {
            lines.push(format!(
                "{} {}: {}",
                style("✗").red(),
                style(&root.reference).bold(),
                root.error.as_deref().unwrap_or("failed")
            ));
        }
    }

    if !report.actions.is_empty() {
        lines.push(String::new());
        lines.push(style("Actions").bold().to_string());
        for action in &report.actions {
            let marker = if action.is_root { "root" } else { "dep" };
            let pinned = if action.pinned { " pinned" } else { "" };
            lines.push(format!(
                "  {} {}{} {} {}",
                action.action,
                style(marker).dim(),
                style(pinned).cyan(),
                status_label(action.manifest),
                style(&action.url).dim()
            ));
        }
    }

    let summary = &report.summary;
    lines.push(String::new());
    lines.push(format!(
        "{} unique actions from {} roots ({} failed), max depth {}",
        summary.unique_actions, summary.roots, summary.failed_roots, summary.max_depth
    ));

    lines.join("\n")
}

fn root_tree(report: &ScanReport, root: &RootResult, lines: &mut Vec<String>) {
    let name = root
        .action
        .as_ref()
        .map_or_else(|| root.reference.clone(), ToString::to_string);
    lines.push(format!(
        "{} {} ({} dependencies)",
        style("●").green(),
        style(name).bold(),
        root.dependencies.len()
    ));

    let last = root.dependencies.len().saturating_sub(1);
    for (i, dependency) in root.dependencies.iter().enumerate() {
        let branch = if i == last { "└" } else { "├" };
        let status = report
            .action(dependency)
            .map_or(ManifestStatus::Unexpanded, |a| a.manifest);
        lines.push(format!("  {branch} {dependency} {}", status_label(status)));
    }
}

fn status_label(status: ManifestStatus) -> StyledObject<&'static str> {
    match status {
        ManifestStatus::Found => style("found").green(),
        ManifestStatus::Absent => style("no manifest").yellow(),
        ManifestStatus::Unavailable => style("unavailable").red(),
        ManifestStatus::Unexpanded => style("not expanded").dim(),
    }
}
