use std::fs::File;
use std::path::PathBuf;
use std::{env, io};

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use serde::Deserialize;
use sic_pipeline::{Credentials, Pipeline, PipelineConfig, SiteConfig, StoreConfig};
use tokio::runtime;

/// Sitemap image compressor
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[command(name = "run")]
    Run(RunArgs),
    #[command(hide = true)]
    Completion,
}

/// Compress and archive the images of every configured site
#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Path to the yaml file listing the sites to process
    #[arg(long, short, env = "SIC_SITES")]
    pub sites: PathBuf,
    /// Override the pipeline user agent
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Override the per-call HTTP timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Override the delay between compression submissions in milliseconds
    #[arg(long)]
    pub shrink_delay_ms: Option<u64>,
    /// When quiet no logs are outputted
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Debug, Deserialize)]
pub struct SitesFile {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub store: StoreConfig,
    pub sites: Vec<SiteConfig>,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let SitesFile {
        mut pipeline,
        store,
        sites,
    } = serde_yaml::from_reader(File::open(&args.sites)?)?;
    if let Some(user_agent) = args.user_agent {
        pipeline.user_agent = user_agent;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        pipeline.timeout_secs = timeout_secs;
    }
    if let Some(shrink_delay_ms) = args.shrink_delay_ms {
        pipeline.shrink_delay_ms = shrink_delay_ms;
    }

    let creds = Credentials::from_env()?;
    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;

    let mut failed = 0;
    for site in sites {
        let domain_code = site.domain_code.clone();
        let pipe = Pipeline::new(site, &pipeline, store.clone(), &creds)?;
        match rt.block_on(pipe.run()) {
            Ok(summary) => log::info!(
                "finished with {domain_code}: {} pages, {} images found, {} compressed, {} archived",
                summary.pages,
                summary.images_found,
                summary.images_compressed,
                summary.images_archived,
            ),
            Err(e) => {
                log::error!("failed on {domain_code}: {e}");
                failed += 1;
            }
        }
    }
    anyhow::ensure!(failed == 0, "{failed} site(s) failed");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    match args.cmd {
        SubCommand::Run(args) => {
            if !args.quiet {
                if env::var("RUST_LOG").is_err() {
                    env::set_var("RUST_LOG", "sic=info,sic_pipeline=info");
                }
                env_logger::init();
            }
            run(args)
        }
        SubCommand::Completion => {
            generate(Shell::Bash, &mut Args::command(), "sic", &mut io::stdout());
            Ok(())
        }
    }
}
