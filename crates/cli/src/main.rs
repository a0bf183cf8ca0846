use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use pydepscan_core::{
    format_output, DependencyScanner, ExitCondition, OutputFormat, PythonVersion, RenderOptions,
    ReportPolicy, ScanConfig, ScanError,
};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

const EX_OK: u8 = 0;
const EX_FAILURE: u8 = 1;

#[derive(Parser)]
#[command(name = "pydepscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan Python source code and report its third-party dependencies")]
#[command(long_about = "A Rust-based dependency scanner for Python source code. It parses every \
    .py/.pyi file under the given paths, extracts import statements (including relative imports \
    and imports guarded by try/except-ImportError or if TYPE_CHECKING blocks), and classifies \
    each referenced module as standard-library, local to the scanned project, or third-party.\n\n\
    Guarded imports are reported as optional dependencies. Results are always sorted; parse \
    failures are reported as warnings without aborting the scan.")]
pub struct Args {
    /// Paths to the Python modules or packages to be analyzed
    #[arg(required = true, value_name = "MODULE")]
    pub modules: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Flat)]
    pub format: OutputFormatArg,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Additional ignore patterns (gitignore style)
    #[arg(long, action = clap::ArgAction::Append)]
    pub ignore: Vec<String>,

    /// Ignore file path (defaults to .gitignore)
    #[arg(long)]
    pub ignore_file: Option<PathBuf>,

    /// Include virtualenvs and vendored trees in the scan
    #[arg(long)]
    pub include_deps: bool,

    /// Also list standard-library modules in flat output
    #[arg(long)]
    pub include_stdlib: bool,

    /// Do not count try/except-guarded imports as dependencies
    #[arg(long)]
    pub no_try_guarded: bool,

    /// Do not count TYPE_CHECKING-guarded imports as dependencies
    #[arg(long)]
    pub no_type_checking: bool,

    /// Python release the standard-library table is built for
    #[arg(long, value_enum, default_value_t = PythonVersionArg::Py312)]
    pub python_version: PythonVersionArg,

    /// Show verbose progress and warning details
    #[arg(short, long)]
    pub verbose: bool,

    /// Parallel threads (0 = auto, 1 = sequential)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormatArg {
    Flat,
    Json,
    Yaml,
    Summary,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Flat => OutputFormat::Flat,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Summary => OutputFormat::Summary,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PythonVersionArg {
    #[value(name = "3.10")]
    Py310,
    #[value(name = "3.11")]
    Py311,
    #[value(name = "3.12")]
    Py312,
    #[value(name = "3.13")]
    Py313,
}

impl From<PythonVersionArg> for PythonVersion {
    fn from(arg: PythonVersionArg) -> Self {
        match arg {
            PythonVersionArg::Py310 => PythonVersion::Py310,
            PythonVersionArg::Py311 => PythonVersion::Py311,
            PythonVersionArg::Py312 => PythonVersion::Py312,
            PythonVersionArg::Py313 => PythonVersion::Py313,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EX_FAILURE)
        }
    }
}

fn run(args: Args) -> anyhow::Result<u8> {
    let policy = ReportPolicy {
        count_try_guarded: !args.no_try_guarded,
        count_type_checking: !args.no_type_checking,
    };

    let mut config = ScanConfig::new(args.modules.clone())
        .with_ignore_patterns(args.ignore.clone())
        .with_include_deps(args.include_deps)
        .with_threads(args.threads)
        .with_python_version(args.python_version.into())
        .with_policy(policy);

    if let Some(ignore_file) = args.ignore_file.clone() {
        config = config.with_ignore_file(ignore_file);
    }

    let spinner = if args.verbose {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Scanning for imports...");
        Some(pb)
    } else {
        None
    };

    let scanner = DependencyScanner::new(config)?;
    let report = match scanner.scan() {
        Ok(report) => report,
        Err(ScanError::NoFilesFound(roots)) => {
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            eprintln!("error: no Python files found under {roots}");
            return Ok(EX_FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!(
            "Scanned {} files in {}ms",
            report.stats.total_files, report.metadata.scan_duration_ms
        ));
    }

    // Warnings are always surfaced, even on successful runs.
    for warning in &report.warnings {
        eprintln!("warning: {}: {}", warning.path.display(), warning.message);
    }

    let options = RenderOptions {
        policy,
        include_stdlib: args.include_stdlib,
    };
    let output = format_output(&report, args.format.into(), &options)?;

    if let Some(path) = args.output {
        fs::write(&path, &output)?;
        if args.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{}", output);
    }

    Ok(match report.exit_condition() {
        ExitCondition::Success | ExitCondition::SuccessWithWarnings => EX_OK,
        ExitCondition::Fatal => {
            eprintln!("error: no files could be parsed");
            EX_FAILURE
        }
    })
}
