//! Command implementations.
//!
//! Each command returns the text to print so it can be exercised without a
//! terminal.

pub mod diff;
pub mod forget;
pub mod list;
pub mod observe;
pub mod show;
pub mod watch;

pub use self::diff::execute_diff;
pub use self::forget::{execute_forget, prompt_confirmation};
pub use self::list::execute_list;
pub use self::observe::execute_observe;
pub use self::show::execute_show;
pub use self::watch::execute_watch;

use crate::error::Result;
use casewatch_domain::EntityId;

/// Parse receipt numbers given on the command line.
pub(crate) fn parse_ids(ids: &[String]) -> Result<Vec<EntityId>> {
    ids.iter()
        .map(|id| EntityId::new(id).map_err(Into::into))
        .collect()
}
