use crate::tally::RankedEntry;
use std::collections::BTreeSet;

/// Set of GitHub logins used for membership tests.
pub type LoginSet = BTreeSet<String>;

/// Smallest pool size that still leaves the random pick a real choice.
const MIN_POOL: usize = 2;

pub fn filter_opt_out(ranked: &[RankedEntry], opt_out: &LoginSet) -> Vec<RankedEntry> {
    ranked
        .iter()
        .filter(|e| !opt_out.contains(&e.login))
        .cloned()
        .collect()
}

pub fn filter_non_attendees(ranked: &[RankedEntry], attendees: &LoginSet) -> Vec<RankedEntry> {
    ranked
        .iter()
        .filter(|e| attendees.contains(&e.login))
        .cloned()
        .collect()
}

/// Collect current maintainers tier by tier, lowest count first, until the
/// pool holds at least two entries or no higher tier remains.
///
/// Entries keep their input order. A pool may end up with zero or one
/// entries when eligible maintainers are scarce.
pub fn least_managing(ranked: &[RankedEntry], current_maintainers: &LoginSet) -> Vec<RankedEntry> {
    let mut pool = Vec::new();
    let mut floor: Option<u32> = None;

    while pool.len() < MIN_POOL {
        let next_tier = ranked
            .iter()
            .map(|e| e.count)
            .filter(|count| floor.map_or(true, |f| *count > f))
            .min();
        let Some(tier) = next_tier else {
            break;
        };
        pool.extend(
            ranked
                .iter()
                .filter(|e| e.count == tier && current_maintainers.contains(&e.login))
                .cloned(),
        );
        floor = Some(tier);
    }
    pool
}

/// Opt-out filter, attendance filter, then the least-managing tiers.
pub fn select_pool(
    ranked: &[RankedEntry],
    opt_out: &LoginSet,
    attendees: &LoginSet,
    current_maintainers: &LoginSet,
) -> Vec<RankedEntry> {
    let eligible = filter_opt_out(ranked, opt_out);
    let eligible = filter_non_attendees(&eligible, attendees);
    least_managing(&eligible, current_maintainers)
}
