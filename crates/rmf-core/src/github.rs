use crate::config::{Config, RosterSource};
use crate::error::{FinderError, Result};
use crate::history::{release_counts, ReleaseRecord};
use crate::report::SelectionInputs;
use crate::tally::Tally;
use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const PER_PAGE: &str = "100";

#[derive(Debug, Deserialize)]
struct Member {
    login: String,
}

/// The account behind an access token (`GET /user`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub id: u64,
}

// ---------------------------------------------------------------------------
// GitHubClient
// ---------------------------------------------------------------------------

/// Blocking client for the handful of GitHub REST endpoints the finder needs.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
    org: String,
    repo: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &Config, token: Option<&str>) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            org: config.org.clone(),
            repo: config.repo.clone(),
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        })
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let base = format!("{}{}", self.api_url, path);
        let url = if query.is_empty() {
            Url::parse(&base)
        } else {
            Url::parse_with_params(&base, query)
        };
        url.map_err(|e| FinderError::InvalidConfig(format!("api_url: {e}")))
    }

    fn api_get(&self, url: Url) -> RequestBuilder {
        let request = self
            .http
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("token {token}")),
            None => request,
        }
    }

    /// GET every page of a list endpoint, following `Link: rel="next"`.
    fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut params = query.to_vec();
        params.push(("per_page", PER_PAGE));
        let mut url = self.url(path, &params)?;
        let mut items = Vec::new();

        loop {
            tracing::debug!(%url, "fetching page");
            let response = ensure_success(self.api_get(url.clone()).send()?)?;
            let next = next_page(response.headers());
            let page: Vec<T> = response.json()?;
            items.extend(page);
            match next {
                Some(next) => url = next,
                None => break,
            }
        }
        Ok(items)
    }

    pub fn team_members(&self, team: &str) -> Result<Vec<String>> {
        let members: Vec<Member> =
            self.get_paginated(&format!("/orgs/{}/teams/{team}/members", self.org), &[])?;
        Ok(members.into_iter().map(|m| m.login).collect())
    }

    pub fn org_admins(&self) -> Result<Vec<String>> {
        let members: Vec<Member> =
            self.get_paginated(&format!("/orgs/{}/members", self.org), &[("role", "admin")])?;
        Ok(members.into_iter().map(|m| m.login).collect())
    }

    /// Scrape a published maintainer-list page. The API token is never sent here.
    pub fn maintainer_list(&self, page_url: &str) -> Result<Vec<String>> {
        tracing::debug!(url = page_url, "fetching maintainer list page");
        let response = ensure_success(self.http.get(page_url).send()?)?;
        Ok(parse_maintainer_list(&response.text()?))
    }

    /// Union of all roster sources, each login seeded at zero releases.
    pub fn current_maintainers(&self, roster: &[RosterSource]) -> Result<Tally> {
        let mut maintainers = Tally::new();
        for source in roster {
            let logins = match source {
                RosterSource::Team(team) => self.team_members(team)?,
                RosterSource::OrgAdmins => self.org_admins()?,
                RosterSource::MaintainerList(url) => self.maintainer_list(url)?,
            };
            maintainers.extend(logins.into_iter().map(|login| (login, 0)));
        }
        tracing::debug!(count = maintainers.len(), "resolved current maintainers");
        Ok(maintainers)
    }

    pub fn release_history(&self) -> Result<Vec<ReleaseRecord>> {
        self.get_paginated(&format!("/repos/{}/{}/releases", self.org, self.repo), &[])
    }

    /// `Ok(false)` when GitHub answers 404 for the membership lookup.
    pub fn is_team_member(&self, team: &str, login: &str) -> Result<bool> {
        let url = self.url(&format!("/orgs/{}/teams/{team}/members/{login}", self.org), &[])?;
        let response = self.api_get(url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        ensure_success(response)?;
        Ok(true)
    }

    /// Member of at least one of `teams`, as checked at login.
    ///
    /// A lookup GitHub refuses with any 4xx counts as "not in this team";
    /// server errors and transport failures still propagate.
    pub fn is_member_of_any(&self, teams: &[String], login: &str) -> Result<bool> {
        for team in teams {
            match self.is_team_member(team, login) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(FinderError::Api { status, .. }) if (400..500).contains(&status) => {
                    tracing::info!(
                        %team,
                        %login,
                        status,
                        "team lookup refused, treating as non-member"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }

    /// Fetch roster and corrected release history for one selection round.
    pub fn selection_inputs(
        &self,
        config: &Config,
        pending: Vec<String>,
        opt_out: Vec<String>,
        attendees: Vec<String>,
    ) -> Result<SelectionInputs> {
        let current_maintainers = self.current_maintainers(&config.roster)?;
        let history = release_counts(&self.release_history()?, &config.corrections)?;
        Ok(SelectionInputs {
            current_maintainers,
            history,
            pending,
            opt_out,
            attendees,
        })
    }

    pub fn authenticated_user(&self) -> Result<GitHubUser> {
        let response = ensure_success(self.api_get(self.url("/user", &[])?).send()?)?;
        Ok(response.json()?)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("release-manager-finder/", env!("CARGO_PKG_VERSION"))),
    );
    Ok(Client::builder().default_headers(headers).build()?)
}

/// Turn a non-2xx response into [`FinderError::Api`] carrying the raw body.
pub(crate) fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "GitHub request failed");
    Err(FinderError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Extract the `rel="next"` target from a `Link` header.
fn next_page(headers: &HeaderMap) -> Option<Url> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|p| p.trim() == r#"rel="next""#);
        if !is_next {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

fn maintainer_card() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<h5 class="card-title">\s*@([^\s|<]+)"#).expect("static regex is valid")
    })
}

/// Logins from `<h5 class="card-title">@login | Full Name</h5>` cards, sorted and deduplicated.
pub fn parse_maintainer_list(html: &str) -> Vec<String> {
    let mut logins: Vec<String> = maintainer_card()
        .captures_iter(html)
        .map(|c| c[1].to_string())
        .collect();
    logins.sort();
    logins.dedup();
    logins
}
