use crate::error::Result;
use crate::pool::{select_pool, LoginSet};
use crate::tally::{build_tally, rank, RankedEntry, Tally};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything one selection round needs, as fetched or submitted.
#[derive(Debug, Clone, Default)]
pub struct SelectionInputs {
    /// Current roster, normally every login at zero.
    pub current_maintainers: Tally,
    pub history: Tally,
    /// Release managers already committed but not yet published upstream.
    pub pending: Vec<String>,
    pub opt_out: Vec<String>,
    pub attendees: Vec<String>,
}

// ---------------------------------------------------------------------------
// RowStatus
// ---------------------------------------------------------------------------

/// How a tally row is presented in the web decision page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// Opted out or no longer a maintainer.
    Excluded,
    /// Current maintainer, not opted out, attending: a pool candidate.
    Eligible,
    /// Current maintainer who is simply not attending.
    Neutral,
}

impl RowStatus {
    pub fn classify(
        login: &str,
        opt_out: &LoginSet,
        attendees: &LoginSet,
        maintainers: &LoginSet,
    ) -> Self {
        if opt_out.contains(login) || !maintainers.contains(login) {
            RowStatus::Excluded
        } else if attendees.contains(login) {
            RowStatus::Eligible
        } else {
            RowStatus::Neutral
        }
    }

    /// Bootstrap table-row class.
    pub fn css_class(self) -> &'static str {
        match self {
            RowStatus::Excluded => "table-danger",
            RowStatus::Eligible => "table-success",
            RowStatus::Neutral => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyRow {
    pub count: u32,
    pub login: String,
    pub status: RowStatus,
    pub is_maintainer: bool,
    pub opted_out: bool,
    pub attending: bool,
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Outcome of one selection round. `chosen` is `None` for an empty pool.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub tally: Vec<RankedEntry>,
    pub opt_out: Vec<String>,
    pub attendees: Vec<String>,
    pub current_maintainers: LoginSet,
    pub pool: Vec<RankedEntry>,
    pub chosen: Option<RankedEntry>,
}

/// Uniform choice from the pool; `None` when there is nobody to choose.
pub fn pick<R: Rng + ?Sized>(pool: &[RankedEntry], rng: &mut R) -> Option<RankedEntry> {
    pool.choose(rng).cloned()
}

impl Decision {
    /// Build the tally and the selection pool without picking anyone yet.
    pub fn build(inputs: &SelectionInputs) -> Result<Self> {
        let tally = build_tally(&inputs.current_maintainers, &inputs.history, &inputs.pending)?;
        let ranked = rank(&tally);

        let current_maintainers: LoginSet = inputs.current_maintainers.keys().cloned().collect();
        let opt_out_set: LoginSet = inputs.opt_out.iter().cloned().collect();
        let attendee_set: LoginSet = inputs.attendees.iter().cloned().collect();
        let pool = select_pool(&ranked, &opt_out_set, &attendee_set, &current_maintainers);

        let mut opt_out = inputs.opt_out.clone();
        opt_out.sort();
        let mut attendees = inputs.attendees.clone();
        attendees.sort();

        Ok(Self {
            tally: ranked,
            opt_out,
            attendees,
            current_maintainers,
            pool,
            chosen: None,
        })
    }

    /// Build and draw the next release manager from the pool.
    pub fn decide<R: Rng + ?Sized>(inputs: &SelectionInputs, rng: &mut R) -> Result<Self> {
        let mut decision = Self::build(inputs)?;
        decision.chosen = pick(&decision.pool, rng);
        match &decision.chosen {
            Some(chosen) => tracing::info!(
                login = %chosen.login,
                pool = decision.pool.len(),
                "picked next release manager"
            ),
            None => tracing::info!("selection pool is empty"),
        }
        Ok(decision)
    }

    fn row(&self, entry: &RankedEntry, opt_out: &LoginSet, attendees: &LoginSet) -> TallyRow {
        TallyRow {
            count: entry.count,
            login: entry.login.clone(),
            status: RowStatus::classify(
                &entry.login,
                opt_out,
                attendees,
                &self.current_maintainers,
            ),
            is_maintainer: self.current_maintainers.contains(&entry.login),
            opted_out: opt_out.contains(&entry.login),
            attending: attendees.contains(&entry.login),
        }
    }

    fn rows<'a>(&self, entries: impl Iterator<Item = &'a RankedEntry>) -> Vec<TallyRow> {
        let opt_out: LoginSet = self.opt_out.iter().cloned().collect();
        let attendees: LoginSet = self.attendees.iter().cloned().collect();
        entries.map(|e| self.row(e, &opt_out, &attendees)).collect()
    }

    /// Every tally row, in ranked order, classified.
    pub fn tally_rows(&self) -> Vec<TallyRow> {
        self.rows(self.tally.iter())
    }

    pub fn pool_rows(&self) -> Vec<TallyRow> {
        self.rows(self.pool.iter())
    }
}

// ---------------------------------------------------------------------------
// Console report
// ---------------------------------------------------------------------------

fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "=".repeat(title.chars().count()))
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, "Current release management tally")?;
        for e in &self.tally {
            writeln!(f, "{:3}\t{}", e.count, e.login)?;
        }

        write!(f, "\n\n")?;
        heading(f, "Opt-out list")?;
        for login in &self.opt_out {
            writeln!(f, "{login}")?;
        }

        write!(f, "\n\n")?;
        heading(f, "Attendees list")?;
        for login in &self.attendees {
            writeln!(f, "{login}")?;
        }

        write!(f, "\n\n")?;
        heading(f, "Selection pool")?;
        if self.pool.is_empty() {
            return writeln!(f, "Selection pool is empty!");
        }
        for e in &self.pool {
            writeln!(f, "{:3}\t{}", e.count, e.login)?;
        }
        match &self.chosen {
            Some(chosen) => write!(f, "\n\nThe next release manager is: {}\n", chosen.login),
            None => Ok(()),
        }
    }
}
