use anyhow::Context;
use clap::Args;
use rmf_core::config::Config;
use rmf_core::lists::read_optional_line_list;
use rmf_server::ServerConfig;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8888")]
    pub port: u16,

    /// Logins whose opt-out box starts checked, one per line
    #[arg(long = "opt-out-list", short = 'o', value_name = "FILE")]
    pub opt_out_list: Option<PathBuf>,

    /// Fallback GitHub token for requests without a session token
    #[arg(long = "gh-token", short = 't', env = "GITHUB_TOKEN", hide_env_values = true)]
    pub gh_token: Option<String>,

    /// OAuth app client ID
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: String,

    /// OAuth app client secret
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Key for signing session cookies
    #[arg(long, env = "COOKIE_SECRET", hide_env_values = true)]
    pub cookie_secret: String,

    /// Externally visible base URL used for the OAuth callback
    #[arg(long)]
    pub public_url: Option<String>,
}

pub fn run(config: Config, args: ServeArgs) -> anyhow::Result<()> {
    let initial_opt_out = read_optional_line_list(args.opt_out_list.as_deref())
        .context("reading opt-out list")?;

    let settings = ServerConfig {
        config,
        client_id: args.client_id,
        client_secret: args.client_secret,
        cookie_secret: args.cookie_secret,
        gh_token: args.gh_token,
        initial_opt_out,
        public_url: args.public_url,
    };
    tracing::debug!(?settings, "starting web server");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(rmf_server::serve(settings, args.port))
}
