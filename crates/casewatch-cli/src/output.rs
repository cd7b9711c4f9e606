//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::summary::CaseSummary;
use casewatch_diff::{LinePair, LineTag, UnifiedDiff};
use casewatch_domain::{IndexEntry, ObservationResult, SourceId};
use colored::*;
use serde_json::json;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of an observation.
    pub fn format_observation(&self, result: &ObservationResult) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(result)?);
        }

        if let Some(error) = &result.error {
            return Ok(self.error(&format!("{}: {}", result.entity_id, error)));
        }

        let mut lines = Vec::new();
        let flagged = result.change_flags.flagged();
        if result.previous.is_none() {
            lines.push(self.success(&format!("Now tracking {}", result.entity_id)));
        } else if flagged.is_empty() {
            lines.push(self.info(&format!("{}: no changes", result.entity_id)));
        } else {
            let names: Vec<&str> = flagged.iter().map(|s| s.label()).collect();
            lines.push(self.warning(&format!("{}: changed ({})", result.entity_id, names.join(", "))));
        }

        for (source, payload) in result.current.payloads.iter() {
            if !payload.is_present() {
                lines.push(format!("  {}", self.colorize(&format!("{}: unavailable", source.label()), "yellow")));
            }
        }

        Ok(lines.join("\n"))
    }

    /// Format the list of tracked cases.
    pub fn format_index(&self, entries: &[IndexEntry]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(entries)?);
        }

        if entries.is_empty() {
            return Ok(self.colorize("No tracked cases.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Receipt", "Form", "Last observed", "Changed"]);

        for entry in entries {
            let changed = if entry.has_changes {
                self.colorize("yes", "yellow")
            } else {
                "no".to_string()
            };
            builder.push_record([
                entry.entity_id.to_string(),
                entry.label.clone(),
                entry.last_observed_at.format("%Y-%m-%d %H:%M UTC").to_string(),
                changed,
            ]);
        }

        Ok(self.render_table(builder))
    }

    /// Format unified diffs for one or more sources.
    pub fn format_diffs(&self, diffs: &[(SourceId, UnifiedDiff)]) -> Result<String> {
        if self.format == OutputFormat::Json {
            let items: Vec<serde_json::Value> = diffs
                .iter()
                .map(|(source, diff)| {
                    json!({
                        "source": source.as_str(),
                        "added": diff.added_count(),
                        "removed": diff.removed_count(),
                        "patch": diff.to_string(),
                    })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&items)?);
        }

        if diffs.is_empty() {
            return Ok(self.info("No changes between the last two observations"));
        }

        let blocks: Vec<String> = diffs
            .iter()
            .map(|(_, diff)| {
                diff.to_string()
                    .lines()
                    .map(|line| self.colorize_patch_line(line))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect();
        Ok(blocks.join("\n\n"))
    }

    /// Format side-by-side rows for one or more sources.
    pub fn format_side_by_side(&self, diffs: &[(SourceId, UnifiedDiff)]) -> Result<String> {
        if self.format == OutputFormat::Json {
            let items: Vec<serde_json::Value> = diffs
                .iter()
                .map(|(source, diff)| {
                    let rows: Vec<serde_json::Value> = diff
                        .side_by_side()
                        .iter()
                        .map(|row| json!({"tag": tag_name(row.tag), "left": row.left, "right": row.right}))
                        .collect();
                    json!({"source": source.as_str(), "rows": rows})
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&items)?);
        }

        if diffs.is_empty() {
            return Ok(self.info("No changes between the last two observations"));
        }

        let blocks: Vec<String> = diffs
            .iter()
            .map(|(source, diff)| {
                let mut builder = Builder::default();
                builder.push_record(["", "Previous", "Current"]);
                for row in diff.side_by_side() {
                    builder.push_record(self.side_by_side_row(&row));
                }
                format!("{}\n{}", self.colorize(source.label(), "bold"), self.render_table(builder))
            })
            .collect();
        Ok(blocks.join("\n\n"))
    }

    /// Format a case summary.
    pub fn format_summary(&self, summary: &CaseSummary) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(summary)?);
        }

        let mut builder = Builder::default();
        for (label, value) in summary.rows() {
            builder.push_record([label.to_string(), value]);
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        let mut output = table.to_string();

        if !summary.timeline.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Date", "Code", "Event"]);
            for event in &summary.timeline {
                builder.push_record([
                    event.date.clone().unwrap_or_default(),
                    event.code.clone(),
                    event.description.clone(),
                ]);
            }
            output.push_str("\n\nTimeline\n");
            output.push_str(&self.render_table(builder));
        }

        Ok(output)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn render_table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    fn side_by_side_row(&self, row: &LinePair) -> [String; 3] {
        let marker = match row.tag {
            LineTag::Unchanged => " ",
            LineTag::Added => "+",
            LineTag::Removed => "-",
            LineTag::Changed => "~",
        };
        let left = row.left.clone().unwrap_or_default();
        let right = row.right.clone().unwrap_or_default();
        match row.tag {
            LineTag::Unchanged => [marker.to_string(), left, right],
            _ => [
                marker.to_string(),
                self.colorize(&left, "red"),
                self.colorize(&right, "green"),
            ],
        }
    }

    fn colorize_patch_line(&self, line: &str) -> String {
        if line.starts_with("+++") || line.starts_with("---") || line.starts_with("Index:") {
            self.colorize(line, "bold")
        } else if line.starts_with("@@") {
            self.colorize(line, "cyan")
        } else if line.starts_with('+') {
            self.colorize(line, "green")
        } else if line.starts_with('-') {
            self.colorize(line, "red")
        } else {
            line.to_string()
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "bold" => text.bold().to_string(),
            _ => text.to_string(),
        }
    }
}

fn tag_name(tag: LineTag) -> &'static str {
    match tag {
        LineTag::Unchanged => "unchanged",
        LineTag::Added => "added",
        LineTag::Removed => "removed",
        LineTag::Changed => "changed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casewatch_domain::{EntityId, PerSource, Snapshot, SourcePayload};
    use chrono::Utc;
    use serde_json::json;

    fn entry(id: &str, has_changes: bool) -> IndexEntry {
        IndexEntry {
            entity_id: EntityId::new(id).unwrap(),
            label: "I-485".to_string(),
            last_observed_at: Utc::now(),
            has_changes,
        }
    }

    fn status_diff() -> (SourceId, UnifiedDiff) {
        let diff = casewatch_diff::diff(
            SourceId::CaseStatus.label(),
            &SourcePayload::Present(json!({"status": "received"})),
            &SourcePayload::Present(json!({"status": "approved"})),
        )
        .unwrap();
        (SourceId::CaseStatus, diff)
    }

    fn observation(previous: bool, flags: PerSource<bool>) -> ObservationResult {
        let snapshot = Snapshot::new(
            PerSource {
                case_details: SourcePayload::Present(json!({})),
                case_status: SourcePayload::Present(json!({})),
                receipt_info: SourcePayload::Absent,
            },
            Utc::now(),
        );
        ObservationResult {
            entity_id: EntityId::new("IOE0000000001").unwrap(),
            previous: previous.then(|| snapshot.clone()),
            current: snapshot,
            change_flags: flags,
            observed_at: Utc::now(),
            error: None,
        }
    }

    #[test]
    fn test_index_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_index(&[entry("IOE0000000001", true), entry("IOE0000000002", false)])
            .unwrap();
        assert!(output.contains("Receipt"));
        assert!(output.contains("IOE0000000002"));
        assert!(output.contains("yes"));
    }

    #[test]
    fn test_empty_index() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_index(&[]).unwrap();
        assert!(output.contains("No tracked cases"));
    }

    #[test]
    fn test_index_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_index(&[entry("IOE0000000001", false)]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["entityId"], "IOE0000000001");
        assert_eq!(parsed[0]["hasChanges"], false);
    }

    #[test]
    fn test_observation_messages() {
        let formatter = Formatter::new(OutputFormat::Table, false);

        let first = formatter.format_observation(&observation(false, PerSource::default())).unwrap();
        assert!(first.contains("Now tracking IOE0000000001"));
        assert!(first.contains("Receipt Info: unavailable"));

        let mut flags = PerSource::default();
        flags.case_status = true;
        let changed = formatter.format_observation(&observation(true, flags)).unwrap();
        assert!(changed.contains("changed (Case Status)"));

        let failed = ObservationResult::total_failure(&EntityId::new("X").unwrap(), Utc::now());
        let output = formatter.format_observation(&failed).unwrap();
        assert!(output.starts_with("✗ X: All sources failed"));
    }

    #[test]
    fn test_unified_diff_plain() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_diffs(&[status_diff()]).unwrap();
        assert!(output.starts_with("Index: Case Status"));
        assert!(output.contains("-  \"status\": \"received\""));
        assert!(output.contains("+  \"status\": \"approved\""));
    }

    #[test]
    fn test_diff_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_diffs(&[status_diff()]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["source"], "caseStatus");
        assert_eq!(parsed[0]["added"], 1);
        assert_eq!(parsed[0]["removed"], 1);
    }

    #[test]
    fn test_side_by_side_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_side_by_side(&[status_diff()]).unwrap();
        assert!(output.contains("Previous"));
        assert!(output.contains("~"));

        let json_formatter = Formatter::new(OutputFormat::Json, false);
        let output = json_formatter.format_side_by_side(&[status_diff()]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let rows = parsed[0]["rows"].as_array().unwrap();
        assert!(rows.iter().any(|r| r["tag"] == "changed"));
    }

    #[test]
    fn test_no_diffs() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(formatter.format_diffs(&[]).unwrap().contains("No changes"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
