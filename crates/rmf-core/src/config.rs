use crate::error::{FinderError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// RosterSource
// ---------------------------------------------------------------------------

/// Where the list of current maintainers comes from. Sources are unioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterSource {
    /// Members of a team in the organization.
    Team(String),
    /// Organization members with the admin role (owners).
    OrgAdmins,
    /// An HTML maintainer-list page with `<h5 class="card-title">@login | Name</h5>` cards.
    MaintainerList(String),
}

// ---------------------------------------------------------------------------
// Corrections
// ---------------------------------------------------------------------------

/// A release whose upstream author is not the person who managed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reattribution {
    pub tag: String,
    pub manager: String,
}

/// Releases managed before the repository started publishing release records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorReleases {
    pub manager: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corrections {
    #[serde(default)]
    pub reattributed: Vec<Reattribution>,
    #[serde(default)]
    pub prior_releases: Vec<PriorReleases>,
}

impl Default for Corrections {
    fn default() -> Self {
        Self {
            // 2016.07 was published by miri64; kYc0o managed it.
            reattributed: vec![Reattribution {
                tag: "2016.07".to_string(),
                manager: "kYc0o".to_string(),
            }],
            // 2013.08, 2014.01, 2014.05 and 2014.12 are missing from GitHub releases.
            prior_releases: vec![PriorReleases {
                manager: "OlegHahm".to_string(),
                count: 4,
            }],
        }
    }
}

impl Corrections {
    pub fn manager_for_tag(&self, tag: &str) -> Option<&str> {
        self.reattributed
            .iter()
            .find(|r| r.tag == tag)
            .map(|r| r.manager.as_str())
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_org")]
    pub org: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,
    #[serde(default = "default_opt_out_forum")]
    pub opt_out_forum: String,
    /// `- team: NAME`, `- org_admins` or `- maintainer_list: URL`.
    #[serde(
        default = "default_roster",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    pub roster: Vec<RosterSource>,
    /// Teams whose members may log in to the web form.
    #[serde(default = "default_login_teams")]
    pub login_teams: Vec<String>,
    /// Team re-checked on every authenticated request.
    #[serde(default = "default_session_team")]
    pub session_team: String,
    #[serde(default)]
    pub corrections: Corrections,
}

fn default_org() -> String {
    "RIOT-OS".to_string()
}

fn default_repo() -> String {
    "RIOT".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_oauth_url() -> String {
    "https://github.com/login/oauth".to_string()
}

fn default_opt_out_forum() -> String {
    "https://forum.riot-os.org/t/release-management-opt-out/3354".to_string()
}

fn default_roster() -> Vec<RosterSource> {
    vec![
        RosterSource::Team("maintainers".to_string()),
        RosterSource::Team("admin".to_string()),
        RosterSource::OrgAdmins,
    ]
}

fn default_login_teams() -> Vec<String> {
    vec!["maintainers".to_string(), "owners".to_string()]
}

fn default_session_team() -> String {
    "maintainers".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            org: default_org(),
            repo: default_repo(),
            api_url: default_api_url(),
            oauth_url: default_oauth_url(),
            opt_out_forum: default_opt_out_forum(),
            roster: default_roster(),
            login_teams: default_login_teams(),
            session_team: default_session_team(),
            corrections: Corrections::default(),
        }
    }
}

impl Config {
    /// Load a YAML config file; `None` yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => {
                let data = std::fs::read_to_string(p)?;
                serde_yaml::from_str(&data)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.org.trim().is_empty() {
            return Err(FinderError::InvalidConfig("org must not be empty".into()));
        }
        if self.repo.trim().is_empty() {
            return Err(FinderError::InvalidConfig("repo must not be empty".into()));
        }
        if self.roster.is_empty() {
            return Err(FinderError::InvalidConfig(
                "roster needs at least one source".into(),
            ));
        }
        if let Some(p) = self.corrections.prior_releases.iter().find(|p| p.count == 0) {
            return Err(FinderError::InvalidConfig(format!(
                "prior release count for '{}' must be positive",
                p.manager
            )));
        }
        Ok(())
    }

    pub fn org_url(&self) -> String {
        format!("https://github.com/{}", self.org)
    }
}
