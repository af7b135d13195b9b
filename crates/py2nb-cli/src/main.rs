//! `py2nb`: convert Python source files into Jupyter notebooks.
use anyhow::{Context, Result, bail};
use clap::Parser;
use py2nb_config::Config;
use py2nb_engine::{Converter, OutputTarget, io};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "py2nb", version)]
#[command(about = "Convert Python source files into Jupyter notebooks")]
struct Args {
    /// Python files to convert. Without any, --dir is scanned.
    files: Vec<PathBuf>,

    /// Write notebooks to files instead of stdout: next to each source when
    /// given without a value, or to PATH
    #[arg(short, long, value_name = "PATH", num_args = 0..=1)]
    output: Option<Option<PathBuf>>,

    /// Diagnostic level: 0 warnings, 1 info, 2 debug, 3 and up trace
    #[arg(long, value_name = "LEVEL")]
    debug: Option<u8>,

    /// Directory scanned for sources when no files are given
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Only parse and tag each file, reporting PARSE or ERROR per file
    #[arg(long)]
    check: bool,

    /// Print numbered source lines and line tags before converting
    #[arg(long)]
    details: bool,

    /// Report each converted file on stderr (default)
    #[arg(short, long, overrides_with = "quiet")]
    verbose: bool,

    /// Do not report converted files
    #[arg(short, long, overrides_with = "verbose")]
    quiet: bool,

    /// Configuration file to use instead of ~/.config/py2nb/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Args {
    fn output_target(&self) -> OutputTarget {
        match &self.output {
            None => OutputTarget::Stdout,
            Some(None) => OutputTarget::Derived,
            Some(Some(path)) => OutputTarget::Path(path.clone()),
        }
    }
}

fn init_logging(level: u8) {
    let filter = match level {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(filter)
        .init();
}

/// Sources named on the command line, or every matching file under the scan
/// directory.
fn collect_sources(args: &Args, config: &Config) -> Result<Vec<PathBuf>> {
    if !args.files.is_empty() {
        return Ok(args.files.clone());
    }

    let dir = args.dir.as_ref().unwrap_or(&config.scan_dir);
    let files = io::scan_source_files(dir, &config.extension, |path| config.is_excluded(path))
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    log::info!("{} source files under {}", files.len(), dir.display());
    Ok(files)
}

/// Parse and tag every file, printing one verdict per file.
fn check(converter: &mut Converter, files: &[PathBuf]) -> ExitCode {
    let mut failed = 0;

    for file in files {
        let result = io::read_source(file)
            .map_err(anyhow::Error::from)
            .and_then(|text| converter.check_text(&text).map_err(anyhow::Error::from));

        match result {
            Ok(()) => println!("PARSE: {}", file.display()),
            Err(e) => {
                failed += 1;
                println!("ERROR: parsing {}", file.display());
                println!("{e}");
            }
        }
    }

    if failed > 0 {
        log::warn!("{failed} of {} files failed to parse", files.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_details(converter: &mut Converter, file: &Path) -> Result<()> {
    let text = io::read_source(file)?;
    let analysis = converter.analyze(&text)?;

    println!("Code:{}", "-".repeat(75));
    print!("{}", analysis.source.numbered());
    println!("Lines:{}", "-".repeat(74));
    print!("{}", analysis.tags);
    Ok(())
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = Config::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    init_logging(args.debug.unwrap_or(config.debug));

    let files = collect_sources(&args, &config)?;
    let mut converter = Converter::new()?;

    if args.check {
        return Ok(check(&mut converter, &files));
    }

    let target = args.output_target();
    if matches!(target, OutputTarget::Path(_)) && files.len() > 1 {
        bail!("--output PATH needs exactly one input file, got {}", files.len());
    }

    let report = !args.quiet;
    for file in &files {
        if args.details {
            print_details(&mut converter, file)?;
        }

        let written = converter
            .convert_file(file, &target)
            .with_context(|| format!("Failed to convert {}", file.display()))?;

        if report && let Some(written) = written {
            eprintln!("{} -> {}", file.display(), written.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}
