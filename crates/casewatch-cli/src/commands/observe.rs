//! Observe command implementation.

use super::parse_ids;
use crate::cli::ObserveArgs;
use crate::error::Result;
use crate::output::Formatter;
use casewatch_domain::traits::VersionStore;
use casewatch_tracker::Tracker;
use std::fmt::Display;

/// Execute the observe command.
///
/// Cases are observed one after another. A case whose sources all fail is
/// reported and the rest still run; a storage failure stops the command.
pub async fn execute_observe<S>(
    args: ObserveArgs,
    tracker: &Tracker<S>,
    formatter: &Formatter,
) -> Result<String>
where
    S: VersionStore,
    S::Error: Display,
{
    let ids = parse_ids(&args.ids)?;

    let mut blocks = Vec::with_capacity(ids.len());
    for id in &ids {
        let result = tracker.observe(id).await?;
        blocks.push(formatter.format_observation(&result)?);
    }

    Ok(blocks.join("\n"))
}
