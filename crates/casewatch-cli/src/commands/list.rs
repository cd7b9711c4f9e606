//! List command implementation.

use crate::error::Result;
use crate::output::Formatter;
use casewatch_domain::traits::VersionStore;
use casewatch_tracker::Tracker;
use std::fmt::Display;

/// Execute the list command.
pub fn execute_list<S>(tracker: &Tracker<S>, formatter: &Formatter) -> Result<String>
where
    S: VersionStore,
    S::Error: Display,
{
    let entries = tracker.list_tracked()?;
    formatter.format_index(&entries)
}
