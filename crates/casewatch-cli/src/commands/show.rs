//! Show command implementation.

use crate::cli::ShowArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::summary::CaseSummary;
use casewatch_domain::traits::VersionStore;
use casewatch_domain::EntityId;
use casewatch_tracker::Tracker;
use std::fmt::Display;

/// Execute the show command.
pub fn execute_show<S>(args: ShowArgs, tracker: &Tracker<S>, formatter: &Formatter) -> Result<String>
where
    S: VersionStore,
    S::Error: Display,
{
    let id = EntityId::new(&args.id)?;
    let record = tracker
        .record(&id)?
        .ok_or_else(|| CliError::NotTracked(id.to_string()))?;

    formatter.format_summary(&CaseSummary::from_record(&record))
}
