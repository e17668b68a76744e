use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lambhack_stack::deployer::{Deployer, ManifestDeployer};
use lambhack_stack::stack::{
    build_lambhack_stack, platform_user, run_deployment, user_scoped_stack_name, WiringConfig,
    STACK_BASENAME,
};

#[derive(Parser)]
#[command(
    name = "lambhack_deploy",
    about = "Declare the lambhack stack and hand it to the deployment engine"
)]
struct Cli {
    /// Directory of static assets served by the S3 site
    #[arg(long, env = "LAMBHACK_SITE_DIR", default_value = "resources")]
    site_dir: PathBuf,
    /// Directory receiving stack manifests
    #[arg(long, env = "LAMBHACK_DIST_DIR", default_value = "dist")]
    dist_dir: PathBuf,
    /// Packaged Lambda artifact (see `cargo run -p xtask -- serverless-package`)
    #[arg(long, env = "LAMBHACK_ARTIFACT", default_value = "dist/lambhack.zip")]
    artifact: PathBuf,
    /// Overrides the platform user used to scope the stack name
    #[arg(long, env = "LAMBHACK_STACK_USER")]
    user: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Declare the stack and hand it to the deployment engine
    Provision,
    /// Print the stack declaration without provisioning
    Describe,
    /// Tear down a previously provisioned stack
    Delete,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = WiringConfig {
        site_dir: cli.site_dir,
        artifact: cli.artifact,
        user: cli.user.or_else(platform_user),
    };
    let deployer = ManifestDeployer::new(cli.dist_dir);

    match cli.command {
        Commands::Provision => {
            let stack = run_deployment(&config, &deployer)?;
            tracing::info!(stack_name = %stack.stack_name, "stack handed to deployment engine");
        }
        Commands::Describe => {
            let stack = build_lambhack_stack(&config)?;
            println!("{}", deployer.describe(&stack)?);
        }
        Commands::Delete => {
            let stack_name = user_scoped_stack_name(STACK_BASENAME, config.user.as_deref());
            deployer.delete(&stack_name)?;
            tracing::info!(%stack_name, "stack deleted");
        }
    }

    Ok(())
}
