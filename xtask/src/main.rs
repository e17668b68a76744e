use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "lambhack_lambda";
const LAMBDA_BIN: &str = "lambhack";
const DEPLOY_PACKAGE: &str = "lambhack_stack";
const DEPLOY_BIN: &str = "lambhack_deploy";
const DIST_DIR: &str = "dist";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the lambhack workspace",
    long_about = "Packages the lambhack Lambda artifact, hands the stack\n\
                  declaration to the deployment engine, and runs CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and zip the Lambda `bootstrap` artifact into dist/
    ServerlessPackage {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
    /// Package the artifact, then provision the stack
    Deploy {
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Skip packaging and reuse dist/lambhack.zip
        #[arg(long)]
        skip_package: bool,
    },
    /// Print the stack declaration
    Describe,
    /// Tear down the user-scoped stack
    Delete,
    /// Run CI checks (fmt, clippy, tests)
    Ci,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> Result<ExitStatus> {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .context("failed to execute cargo")
}

fn run_cargo(args: &[&str]) -> Result<()> {
    let status = cargo(args)?;
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
    Ok(())
}

fn run_deploy_cli(verb: &str) -> Result<()> {
    run_cargo(&["run", "-p", DEPLOY_PACKAGE, "--bin", DEPLOY_BIN, "--", verb])
}

fn package_lambda(target: &str, profile: BuildProfile) -> Result<()> {
    ensure_rust_target_installed(target)?;
    ensure_c_linker_available(target)?;

    step("Build lambhack lambda binary");
    let mut cargo_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--target",
        target,
        "--bin",
        LAMBDA_BIN,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args)?;

    step("Package lambda zip artifact");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).context("failed to create lambda dist directory")?;

    let zip_path = dist_dir.join(format!("{LAMBDA_BIN}.zip"));
    package_lambda_zip(&target_dir.join(binary_name(LAMBDA_BIN, target)), &zip_path)?;

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
    Ok(())
}

fn ensure_rust_target_installed(target: &str) -> Result<()> {
    let output = match Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return Ok(());
        }
    };

    if !output.status.success() {
        bail!(
            "failed to list installed rust targets: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        bail!("rust target `{target}` is not installed; run `rustup target add {target}`");
    }
    Ok(())
}

fn ensure_c_linker_available(target: &str) -> Result<()> {
    if !cfg!(windows) || !target.ends_with("unknown-linux-gnu") {
        return Ok(());
    }

    let overrides = [
        format!("CC_{}", target.replace('-', "_")),
        "TARGET_CC".to_string(),
        "CC".to_string(),
    ];
    let configured = overrides
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .any(|value| tool_works(value.trim()));
    if configured || tool_works("x86_64-linux-gnu-gcc") {
        return Ok(());
    }

    bail!("missing C cross-linker for `{target}`; install x86_64-linux-gnu-gcc or set CC_x86_64_unknown_linux_gnu")
}

fn tool_works(program: &str) -> bool {
    let mut parts = program.split_whitespace();
    let Some(bin) = parts.next() else {
        return false;
    };

    Command::new(bin)
        .args(parts)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

/// The provided.al2023 runtime executes a file named `bootstrap` at the zip root.
fn package_lambda_zip(binary_path: &Path, zip_path: &Path) -> Result<()> {
    let binary = fs::read(binary_path)
        .with_context(|| format!("expected lambda binary at '{}'", binary_path.display()))?;
    let file = fs::File::create(zip_path).context("failed to create lambda zip")?;

    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .context("failed to start bootstrap entry in lambda zip")?;
    zip.write_all(&binary)
        .context("failed to write bootstrap entry")?;
    zip.finish().context("failed to finish lambda zip")?;
    Ok(())
}

// ── CI ─────────────────────────────────────────────────────────────

fn ci_check() -> Result<()> {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"])?;

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])?;

    for package in ["lambhack_core", LAMBDA_PACKAGE, DEPLOY_PACKAGE] {
        step(&format!("Test {package}"));
        run_cargo(&["test", "-p", package])?;
    }
    Ok(())
}

// ── main ───────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::ServerlessPackage { target, profile } => package_lambda(&target, profile)?,
        Commands::Deploy {
            target,
            skip_package,
        } => {
            if !skip_package {
                package_lambda(&target, BuildProfile::Release)?;
            }
            step("Provision stack");
            run_deploy_cli("provision")?;
        }
        Commands::Describe => run_deploy_cli("describe")?,
        Commands::Delete => run_deploy_cli("delete")?,
        Commands::Ci => {
            ci_check()?;
            eprintln!("\nCI job passed.");
        }
    }

    Ok(())
}
