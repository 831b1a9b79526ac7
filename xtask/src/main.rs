use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "todo_lambda";
const LAMBDA_BIN: &str = "todos_api";
const CLIENT_PACKAGE: &str = "todo_client";
const CLIENT_BIN: &str = "todos";

#[derive(Parser)]
#[command(name = "xtask", about = "Task runner for the to-do API workspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks
    Ci {
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Run the terminal client, forwarding every argument
    Todos {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Build the API Lambda and zip it as a custom-runtime `bootstrap`
    Package {
        /// Target triple of the Lambda runtime
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build without `--release`
        #[arg(long)]
        debug: bool,
        /// Directory the zip is written to
        #[arg(long, default_value = "target/lambda")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CiJob {
    /// fmt, clippy and tests
    Check,
    /// Release build of every binary
    Build,
    All,
}

fn cargo(args: &[&str]) {
    eprintln!("+ cargo {}", args.join(" "));
    let status = match Command::new("cargo").args(args).status() {
        Ok(status) => status,
        Err(error) => fail(&format!("could not start cargo: {error}")),
    };
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn fail(message: &str) -> ! {
    eprintln!("xtask: {message}");
    exit(1);
}

fn ci(job: CiJob) {
    let check: &[&[&str]] = &[
        &["fmt", "--all", "--", "--check"],
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        &["test", "--workspace"],
    ];
    let build: &[&[&str]] = &[&["build", "--workspace", "--bins", "--release"]];

    let steps = match job {
        CiJob::Check => check.to_vec(),
        CiJob::Build => build.to_vec(),
        CiJob::All => [check, build].concat(),
    };
    for args in steps {
        cargo(args);
    }
    eprintln!("ci passed");
}

fn package(target: &str, debug: bool, out_dir: &Path) {
    let mut args = vec!["build", "-p", LAMBDA_PACKAGE, "--bin", LAMBDA_BIN, "--target", target];
    if !debug {
        args.push("--release");
    }
    cargo(&args);

    let profile = if debug { "debug" } else { "release" };
    let binary = Path::new("target").join(target).join(profile).join(LAMBDA_BIN);
    let zip_path = out_dir.join(format!("{LAMBDA_BIN}.zip"));

    let written = fs::read(&binary).and_then(|bytes| {
        fs::create_dir_all(out_dir)?;
        write_bootstrap_zip(&bytes, fs::File::create(&zip_path)?)
    });
    match written {
        Ok(()) => eprintln!("packaged {}", zip_path.display()),
        Err(error) => fail(&format!(
            "packaging {} into {} failed: {error}",
            binary.display(),
            zip_path.display()
        )),
    }
}

/// Custom runtimes start the executable named `bootstrap` at the zip root.
fn write_bootstrap_zip<W: Write + io::Seek>(binary: &[u8], sink: W) -> io::Result<()> {
    let mut zip = ZipWriter::new(sink);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)?;
    zip.write_all(binary)?;
    zip.finish()?;
    Ok(())
}

fn main() {
    match Cli::parse().command {
        Commands::Ci { job } => ci(job),
        Commands::Todos { args } => {
            let mut cargo_args = vec!["run", "-q", "-p", CLIENT_PACKAGE, "--bin", CLIENT_BIN, "--"];
            cargo_args.extend(args.iter().map(String::as_str));
            cargo(&cargo_args);
        }
        Commands::Package {
            target,
            debug,
            out_dir,
        } => package(&target, debug, &out_dir),
    }
}
