use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use rmf_core::config::Config;
use rmf_core::github::GitHubClient;
use rmf_core::lists::{read_line_list, read_optional_line_list};
use rmf_core::report::Decision;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PickArgs {
    /// File with the GitHub logins attending the VMA, one per line
    pub attendees: PathBuf,

    /// File with the GitHub logins on the opt-out list, one per line
    #[arg(long = "opt-out", short = 'o', value_name = "FILE")]
    pub opt_out: Option<PathBuf>,

    /// Already designated release manager of an upcoming release (repeatable)
    #[arg(long = "next-rm", short = 'n', value_name = "LOGIN")]
    pub next_rm: Vec<String>,

    /// GitHub token with `read:org` scope
    #[arg(long = "gh-token", short = 't', env = "GITHUB_TOKEN", hide_env_values = true)]
    pub gh_token: String,
}

pub fn run(config: &Config, args: PickArgs, json: bool) -> anyhow::Result<()> {
    let attendees = read_line_list(&args.attendees)
        .with_context(|| format!("reading attendees from {}", args.attendees.display()))?;
    let opt_out = read_optional_line_list(args.opt_out.as_deref())
        .context("reading opt-out list")?;

    let client = GitHubClient::new(config, Some(&args.gh_token))?;
    let inputs = client
        .selection_inputs(config, args.next_rm, opt_out, attendees)
        .context("collecting maintainers and release history")?;
    let decision = Decision::decide(&inputs, &mut rand::thread_rng())?;

    if json {
        print_json(&decision)?;
    } else {
        print!("{decision}");
    }
    Ok(())
}
