// rust8 development tasks, run as `cargo x <task>`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development tasks for rust8")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format check, clippy, tests, and a bench build
    Ci {
        /// Skip tests and the bench build
        #[arg(long)]
        quick: bool,
    },
    /// Format the workspace and run clippy
    Lint {
        /// Apply clippy suggestions
        #[arg(long)]
        fix: bool,
    },
    /// Run tests, optionally for one module
    Test {
        #[arg(long, value_enum)]
        module: Option<Module>,
        /// Only the property tests under tests/
        #[arg(long, conflicts_with = "module")]
        props: bool,
    },
    /// Run the render benchmarks
    Bench {
        /// Only benchmark one render mode
        #[arg(long, value_enum)]
        mode: Option<BenchMode>,
    },
    /// Run the host on a base64 program image
    Run {
        /// Path to the base64 image (bundled demo if omitted)
        image_path: Option<PathBuf>,
        #[arg(long)]
        release: bool,
    },
    /// Encode a raw program binary as a base64 image
    Encode {
        /// Path to the raw program binary (e.g. pong.ch8)
        rom_path: PathBuf,
        /// Output path (defaults to the input with a .b64 extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Module {
    Vm,
    Display,
    Driver,
    Image,
    Config,
}

impl Module {
    fn filter(self) -> &'static str {
        match self {
            Module::Vm => "vm::",
            Module::Display => "display::",
            Module::Driver => "driver::",
            Module::Image => "image::",
            Module::Config => "config::",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BenchMode {
    Window,
    PerCell,
}

impl BenchMode {
    /// Criterion filter matching the benchmark ids in benches/render_bench.rs
    fn filter(self) -> &'static str {
        match self {
            BenchMode::Window => "WindowGradient",
            BenchMode::PerCell => "PerCellGradient",
        }
    }
}

const PROPERTY_TESTS: [&str; 2] = ["image_decode_prop", "render_geometry_prop"];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { quick } => ci(quick),
        Commands::Lint { fix } => lint(fix),
        Commands::Test { module, props } => test(module, props),
        Commands::Bench { mode } => bench(mode),
        Commands::Run {
            image_path,
            release,
        } => run(image_path.as_deref(), release),
        Commands::Encode { rom_path, output } => encode(&rom_path, output.as_deref()),
    }
}

fn ci(quick: bool) -> Result<()> {
    println!("{}", "=== rust8 CI ===".bold().blue());
    let start = Instant::now();

    let mut steps: Vec<(&str, Vec<&str>)> = vec![
        ("Format", vec!["fmt", "--all", "--", "--check"]),
        (
            "Clippy",
            vec!["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        ),
    ];
    if !quick {
        steps.push(("Test", vec!["test", "--workspace"]));
        steps.push(("Bench build", vec!["bench", "--no-run"]));
    }

    for (name, args) in steps {
        print!("{} {} ... ", "→".blue(), name);
        let step_start = Instant::now();

        match cargo(&args) {
            Ok(()) => println!(
                "{} ({:.2}s)",
                "✓".green().bold(),
                step_start.elapsed().as_secs_f64()
            ),
            Err(e) => {
                println!("{}", "✗".red().bold());
                return Err(e.context(format!("{} failed", name)));
            }
        }
    }

    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
    Ok(())
}

fn lint(fix: bool) -> Result<()> {
    cargo(&["fmt", "--all"])?;

    let mut args = vec!["clippy", "--workspace", "--all-targets"];
    if fix {
        args.extend(["--fix", "--allow-dirty"]);
    } else {
        args.extend(["--", "-D", "warnings"]);
    }
    cargo(&args)
}

fn test(module: Option<Module>, props: bool) -> Result<()> {
    if props {
        let mut args = vec!["test"];
        for name in PROPERTY_TESTS {
            args.extend(["--test", name]);
        }
        return cargo(&args);
    }

    match module {
        Some(module) => {
            println!("{} Running {} tests...", "→".blue(), module.filter().bold());
            cargo(&["test", "--lib", module.filter()])
        }
        None => cargo(&["test", "--workspace"]),
    }
}

fn bench(mode: Option<BenchMode>) -> Result<()> {
    let mut args = vec!["bench", "--bench", "render_bench"];
    if let Some(mode) = mode {
        args.extend(["--", mode.filter()]);
    }
    cargo(&args)
}

fn run(image_path: Option<&Path>, release: bool) -> Result<()> {
    match image_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Image file not found: {}", path.display());
            }
            // The host only reads base64 images
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("ch8")) {
                println!(
                    "{} {} looks like a raw binary; try `cargo x encode` first",
                    "⚠".yellow().bold(),
                    path.display()
                );
            }
            println!("{} Image: {}", "→".blue(), path.display().to_string().cyan());
        }
        None => println!("{} Image: {}", "→".blue(), "bundled demo".cyan()),
    }

    let mut cmd = Command::new("cargo");
    cmd.args(["run", "--package", "rust8"]);
    if release {
        cmd.arg("--release");
    }
    if let Some(path) = image_path {
        cmd.arg("--").arg(path);
    }

    execute(&mut cmd).context("Host exited with an error")
}

fn encode(rom_path: &Path, output: Option<&Path>) -> Result<()> {
    use base64::{engine::general_purpose, Engine as _};
    use std::fs;

    let bytes = fs::read(rom_path)
        .with_context(|| format!("Failed to read program binary {}", rom_path.display()))?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| rom_path.with_extension("b64"));

    fs::write(&output, general_purpose::STANDARD.encode(&bytes))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} Encoded {} bytes to {}",
        "✓".green().bold(),
        bytes.len(),
        output.display().to_string().cyan()
    );
    Ok(())
}

fn cargo(args: &[&str]) -> Result<()> {
    execute(Command::new("cargo").args(args))
}

fn execute(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
