//! Diff command implementation.

use crate::cli::DiffArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use casewatch_domain::traits::VersionStore;
use casewatch_domain::{EntityId, SourceId};
use casewatch_tracker::Tracker;
use std::fmt::Display;

/// Execute the diff command.
pub fn execute_diff<S>(args: DiffArgs, tracker: &Tracker<S>, formatter: &Formatter) -> Result<String>
where
    S: VersionStore,
    S::Error: Display,
{
    let id = EntityId::new(&args.id)?;
    let source = args.source.as_deref().map(str::parse::<SourceId>).transpose()?;

    let record = tracker
        .record(&id)?
        .ok_or_else(|| CliError::NotTracked(id.to_string()))?;
    if record.previous.is_none() {
        return Ok(formatter.info(&format!("{} has only been observed once", id)));
    }

    let diffs: Vec<_> = tracker
        .diffs(&id)?
        .into_iter()
        .filter(|(s, _)| source.is_none_or(|wanted| wanted == *s))
        .collect();

    if args.side_by_side {
        formatter.format_side_by_side(&diffs)
    } else {
        formatter.format_diffs(&diffs)
    }
}
