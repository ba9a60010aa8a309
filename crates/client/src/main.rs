use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chef_api_client::{Action, ActionRequest, ChefClient, dispatch};
use chef_signer::Identity;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Run one signed action against the Chef Infra Server API and print the JSON response.
#[derive(Parser)]
#[clap(name = "chef-api")]
struct Args {
    /// Chef server host (`chef.example.com`) or full base URL.
    #[clap(long, env = "CHEF_SERVER")]
    server: String,
    #[clap(long, env = "CHEF_ORG")]
    org: String,
    /// API user or client name the key belongs to.
    #[clap(long, env = "CHEF_API_USER")]
    user: String,
    #[clap(long, env = "CHEF_API_KEY_FILE", conflicts_with = "key")]
    key_file: Option<PathBuf>,
    /// PEM key data.
    #[clap(long, env = "CHEF_API_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Action to run, e.g. `node-create` or `NodeCreate`.
    #[clap(long)]
    action: Action,
    /// Client or node name.
    #[clap(long)]
    target: String,
    /// JSON run list (`["recipe[base]"]`) or policy (`{"policy_name":..,"policy_group":..}`).
    #[clap(long)]
    target_data: Option<String>,
}

fn load_identity(args: &Args) -> Result<Identity> {
    match (&args.key_file, &args.key) {
        (Some(path), _) => Identity::from_pem_file(&args.user, path)
            .with_context(|| format!("loading key for {}", args.user)),
        (None, Some(pem)) => {
            Identity::from_pem(&args.user, pem).with_context(|| format!("loading key for {}", args.user))
        }
        (None, None) => bail!("one of --key-file or --key is required"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let identity = load_identity(&args)?;
    let target_data = args
        .target_data
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("parsing --target-data as JSON")?;

    let client = ChefClient::for_server(&args.server, &args.org, identity)?;
    let request = ActionRequest {
        action: args.action,
        target: args.target,
        target_data,
    };

    let response = dispatch(&client, &request)
        .await
        .with_context(|| format!("{} {}", request.action, request.target))?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
