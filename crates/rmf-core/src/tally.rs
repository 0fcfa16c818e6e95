use crate::error::{FinderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Release-management count per GitHub login.
pub type Tally = BTreeMap<String, u32>;

// ---------------------------------------------------------------------------
// RankedEntry
// ---------------------------------------------------------------------------

/// One row of the ranked tally.
///
/// Field order matters: the derived `Ord` compares `count` first and falls
/// back to `login`, which is exactly the ranking order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RankedEntry {
    pub count: u32,
    pub login: String,
}

impl RankedEntry {
    pub fn new(count: u32, login: impl Into<String>) -> Self {
        Self {
            count,
            login: login.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Building and ranking
// ---------------------------------------------------------------------------

/// Merge the current roster, historical counts and pending release managers.
///
/// Historical counts replace roster values rather than adding to them. Each
/// occurrence of a login in `pending` adds one release; a login that is
/// neither on the roster nor in the history is rejected.
pub fn build_tally(current: &Tally, historical: &Tally, pending: &[String]) -> Result<Tally> {
    let mut tally = current.clone();
    tally.extend(historical.iter().map(|(login, count)| (login.clone(), *count)));

    for login in pending {
        let count = tally
            .get_mut(login)
            .ok_or_else(|| FinderError::UnknownReleaseManager(login.clone()))?;
        *count += 1;
    }
    Ok(tally)
}

/// Ascending by count, ties broken by login.
pub fn rank(tally: &Tally) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = tally
        .iter()
        .map(|(login, count)| RankedEntry::new(*count, login.clone()))
        .collect();
    ranked.sort();
    ranked
}
