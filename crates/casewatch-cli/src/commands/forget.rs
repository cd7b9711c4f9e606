//! Forget command implementation.

use super::parse_ids;
use crate::cli::ForgetArgs;
use crate::error::Result;
use crate::output::Formatter;
use casewatch_domain::traits::VersionStore;
use casewatch_domain::EntityId;
use casewatch_tracker::Tracker;
use std::fmt::Display;
use std::io::{self, Write};

/// Execute the forget command.
///
/// `confirm` is asked before anything is removed unless `--yes` was given.
pub async fn execute_forget<S, F>(
    args: ForgetArgs,
    tracker: &Tracker<S>,
    formatter: &Formatter,
    confirm: F,
) -> Result<String>
where
    S: VersionStore,
    S::Error: Display,
    F: FnOnce(&[EntityId]) -> Result<bool>,
{
    let ids = parse_ids(&args.ids)?;

    if !args.yes && !confirm(&ids)? {
        return Ok(formatter.info("Operation cancelled"));
    }

    for id in &ids {
        tracker.forget(id).await?;
    }

    Ok(formatter.success(&format!("Forgot {} case(s)", ids.len())))
}

/// Ask on stdin whether to forget `ids`.
pub fn prompt_confirmation(ids: &[EntityId]) -> Result<bool> {
    println!("About to forget {} case(s):", ids.len());
    for id in ids {
        println!("  - {}", id);
    }
    print!("Continue? [y/N] ");
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().eq_ignore_ascii_case("y"))
}
