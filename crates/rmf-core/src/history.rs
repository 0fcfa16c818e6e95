use crate::config::Corrections;
use crate::error::{FinderError, Result};
use crate::tally::Tally;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A published release as returned by `GET /repos/{org}/{repo}/releases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub tag_name: String,
    /// `null` upstream when the publishing account was deleted.
    #[serde(default)]
    pub author: Option<Author>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub login: String,
}

impl ReleaseRecord {
    pub fn new(tag_name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            author: Some(Author {
                login: author.into(),
            }),
        }
    }
}

fn regular_release_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}\.\d{2}$").expect("static regex is valid"))
}

/// Whether `tag` names a regular `YYYY.MM` release (no point release, no RC).
pub fn is_regular_release(tag: &str) -> bool {
    regular_release_tag().is_match(tag)
}

/// Count managed releases per login from the published release records.
///
/// Fails with [`FinderError::HistoryDrift`] when a manager with prior
/// releases does not show up in the records at all.
pub fn release_counts(records: &[ReleaseRecord], corrections: &Corrections) -> Result<Tally> {
    let mut counts = Tally::new();

    for record in records.iter().filter(|r| is_regular_release(&r.tag_name)) {
        let manager = corrections
            .manager_for_tag(&record.tag_name)
            .or(record.author.as_ref().map(|a| a.login.as_str()));
        let Some(manager) = manager else {
            tracing::warn!(tag = %record.tag_name, "release has no author, skipping");
            continue;
        };
        *counts.entry(manager.to_string()).or_insert(0) += 1;
    }

    for prior in &corrections.prior_releases {
        let count = counts
            .get_mut(&prior.manager)
            .ok_or_else(|| FinderError::HistoryDrift(prior.manager.clone()))?;
        *count += prior.count;
    }

    tracing::debug!(
        records = records.len(),
        managers = counts.len(),
        "extracted release management history"
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PriorReleases, Reattribution};

    fn sample_records() -> Vec<ReleaseRecord> {
        vec![
            ReleaseRecord::new("2015.09", "OlegHahm"),
            ReleaseRecord::new("2016.07", "miri64"),
            ReleaseRecord::new("2016.10", "miri64"),
            ReleaseRecord::new("2020.07", "miri64"),
            ReleaseRecord::new("2020.07.1", "miri64"),
        ]
    }

    #[test]
    fn regular_release_tags() {
        assert!(is_regular_release("2020.07"));
        assert!(!is_regular_release("2020.07.1"));
        assert!(!is_regular_release("2020.07-RC1"));
        assert!(!is_regular_release("v2020.07"));
        assert!(!is_regular_release("20.07"));
    }

    #[test]
    fn counts_with_default_corrections() {
        let counts = release_counts(&sample_records(), &Corrections::default()).unwrap();
        let expected: Tally = [("kYc0o", 1), ("miri64", 2), ("OlegHahm", 5)]
            .into_iter()
            .map(|(l, c)| (l.to_string(), c))
            .collect();
        assert_eq!(counts, expected);
    }

    #[test]
    fn missing_prior_release_manager_is_drift() {
        let records = vec![ReleaseRecord::new("2020.07", "miri64")];
        let err = release_counts(&records, &Corrections::default()).unwrap_err();
        assert!(matches!(err, FinderError::HistoryDrift(ref l) if l == "OlegHahm"));
    }

    #[test]
    fn custom_correction_table() {
        let corrections = Corrections {
            reattributed: vec![Reattribution {
                tag: "2021.01".into(),
                manager: "donald".into(),
            }],
            prior_releases: vec![PriorReleases {
                manager: "huey".into(),
                count: 2,
            }],
        };
        let records = vec![
            ReleaseRecord::new("2021.01", "huey"),
            ReleaseRecord::new("2021.04", "huey"),
        ];
        let counts = release_counts(&records, &corrections).unwrap();
        assert_eq!(counts["donald"], 1);
        assert_eq!(counts["huey"], 3);
    }

    #[test]
    fn authorless_release_is_skipped() {
        let records = vec![
            ReleaseRecord {
                tag_name: "2019.01".into(),
                author: None,
            },
            ReleaseRecord::new("2019.04", "dewey"),
        ];
        let corrections = Corrections {
            reattributed: vec![],
            prior_releases: vec![],
        };
        let counts = release_counts(&records, &corrections).unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["dewey"], 1);
    }

    #[test]
    fn deserializes_github_payload() {
        let json = r#"[{"tag_name":"2022.01","author":{"login":"huey","id":7}},{"tag_name":"2022.04","author":null}]"#;
        let records: Vec<ReleaseRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0], ReleaseRecord::new("2022.01", "huey"));
        assert!(records[1].author.is_none());
    }
}
