use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use perceptual_hash_core::{
    compare_hashes, find_similar, logging, read_records, write_records, Config, ConfusionMatrix,
    DebugConfig, HashRecord, PerceptualHasher, Scanner, TransformKind,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "phash")]
#[command(about = "Compute and compare perceptual image hashes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write logs to a rotating file in this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the hash of each image as `path,hash`
    Hash {
        /// PNG or JPEG files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Export preprocessed and visualized images below this directory
        #[arg(long)]
        debug_dir: Option<PathBuf>,

        /// DCT implementation
        #[arg(long, default_value = "direct")]
        transform: TransformKind,
    },

    /// Print the Hamming distance between two hex hashes
    Compare {
        hash_a: String,
        hash_b: String,

        /// Maximum distance reported as similar
        #[arg(long, default_value_t = 10)]
        threshold: u32,
    },

    /// Hash every image below the given directories
    Scan {
        /// Directories to scan
        #[arg(required = true)]
        directories: Vec<PathBuf>,

        /// Result file for `path,hash` lines
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export preprocessed and visualized images below this directory
        #[arg(long)]
        debug_dir: Option<PathBuf>,

        /// Print a confusion matrix for all pairs after hashing
        #[arg(long)]
        report: bool,

        /// Similarity threshold used by the report
        #[arg(long)]
        threshold: Option<u32>,

        /// Maximum directory depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Worker threads (0 = all cores)
        #[arg(long)]
        threads: Option<usize>,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List images below the directories that look like the query image
    Similar {
        /// Reference image
        query: PathBuf,

        /// Directories to search
        #[arg(required = true)]
        directories: Vec<PathBuf>,

        /// Matches must be strictly closer than this many bits
        #[arg(long, default_value_t = 10)]
        threshold: u32,
    },

    /// Print a confusion matrix for a previously written result file
    Report {
        hash_file: PathBuf,

        #[arg(long, default_value_t = 10)]
        threshold: u32,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "phash.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Loaded before logging starts so its level can apply
    let file_config = match &cli.command {
        Commands::Scan { config: Some(path), .. } => Some(Config::from_file(path)?),
        _ => None,
    };
    init_logging(
        log_level(cli.verbose, file_config.as_ref()),
        cli.log_dir.as_deref(),
    )?;

    match cli.command {
        Commands::Hash {
            files,
            debug_dir,
            transform,
        } => {
            let hasher = PerceptualHasher::new().with_transform_kind(transform);
            let failed = hash_files(&hasher, &files, debug_dir.as_deref(), |record| {
                println!("{}", record)
            });

            if failed > 0 {
                bail!("{} of {} images could not be hashed", failed, files.len());
            }
            Ok(())
        }

        Commands::Compare {
            hash_a,
            hash_b,
            threshold,
        } => {
            let distance = compare_hashes(&hash_a, &hash_b)?;
            let verdict = if distance <= threshold {
                "similar"
            } else {
                "different"
            };
            println!("{} ({})", distance, verdict);
            Ok(())
        }

        Commands::Scan {
            directories,
            output,
            debug_dir,
            report,
            threshold,
            max_depth,
            threads,
            config: _,
        } => {
            let mut config = file_config.unwrap_or_default();

            // Override config with command line arguments
            if let Some(output) = output {
                config.output_path = output;
            }
            if let Some(debug_dir) = debug_dir {
                config.debug = true;
                config.debug_dir = debug_dir;
            }
            if let Some(threshold) = threshold {
                config.similarity_threshold = threshold;
            }
            if max_depth.is_some() {
                config.max_depth = max_depth;
            }
            if let Some(threads) = threads {
                config.threads = threads;
            }
            // The progress bar would interleave with console logs
            if cli.verbose > 0 && cli.log_dir.is_none() {
                config.show_progress = false;
            }

            let scanner = Scanner::new(config)?;

            info!("Starting scan...");
            let result = scanner.run(&directories)?;

            for record in &result.records {
                println!("{}", record);
            }

            let output_path = &scanner.config().output_path;
            write_records(output_path, &result.records)
                .with_context(|| format!("writing {}", output_path.display()))?;
            println!(
                "Hashing complete. {} of {} images saved to {}",
                result.summary.hashed,
                result.summary.discovered,
                output_path.display()
            );

            if report {
                let threshold = scanner.config().similarity_threshold;
                let matrix = ConfusionMatrix::evaluate(&result.records, threshold);
                println!("\n{}", matrix);
            }
            Ok(())
        }

        Commands::Similar {
            query,
            directories,
            threshold,
        } => {
            let config = Config {
                show_progress: false,
                ..Config::default()
            };
            let scanner = Scanner::new(config)?;

            let query_hash = scanner
                .hasher()
                .hash_path(&query, None)
                .with_context(|| format!("hashing {}", query.display()))?;
            let query_record = HashRecord::new(query.clone(), query_hash);
            println!("Reference Image Hash: {}", query_record.hash);
            println!("Reference Image Path: {}", query_record.path.display());

            let result = scanner.run(&directories)?;
            let matches = find_similar(&query_record, &result.records, threshold);

            if matches.is_empty() {
                println!("No similar images found");
            }
            for m in matches {
                println!("{},{},{}", m.record.path.display(), m.record.hash, m.distance);
            }
            Ok(())
        }

        Commands::Report {
            hash_file,
            threshold,
        } => {
            let records = read_records(&hash_file)?;
            println!("{}", ConfusionMatrix::evaluate(&records, threshold));
            Ok(())
        }

        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}

/// Map `-v` occurrences onto a level: warn, info, debug, trace
fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// `-v` wins; otherwise a loaded config file decides
fn log_level(verbose: u8, file_config: Option<&Config>) -> LevelFilter {
    match file_config {
        Some(config) if verbose == 0 => config.log_level.to_level_filter(),
        _ => verbosity_level(verbose),
    }
}

fn init_logging(level: LevelFilter, log_dir: Option<&Path>) -> anyhow::Result<()> {
    match log_dir {
        Some(dir) => logging::init_logger(dir, level)
            .map_err(|e| anyhow::anyhow!("failed to initialize file logging: {}", e)),
        None => {
            env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(level.to_string().to_lowercase()),
            )
            .init();
            Ok(())
        }
    }
}

/// Hash `files` one by one, handing each record to `emit`.
///
/// Returns how many files failed; a failure never stops the run.
fn hash_files(
    hasher: &PerceptualHasher,
    files: &[PathBuf],
    debug_dir: Option<&Path>,
    mut emit: impl FnMut(&HashRecord),
) -> usize {
    let mut failed = 0;
    let debug_configs = debug_dir.map(|root| {
        DebugConfig::for_images(root, files.iter().map(PathBuf::as_path))
    });

    for (i, path) in files.iter().enumerate() {
        let debug = match debug_configs.as_ref().map(|c| prepare_debug_dir(&c[i])) {
            Some(Ok(debug)) => Some(debug),
            Some(Err(e)) => {
                eprintln!("Error processing {}: {:#}", path.display(), e);
                failed += 1;
                continue;
            }
            None => None,
        };

        match hasher.hash_path(path, debug) {
            Ok(hash) => emit(&HashRecord::new(path.clone(), hash)),
            Err(e) => {
                logging::log_hash_error(path, &e);
                eprintln!("Error processing {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }
    failed
}

/// Create the directory holding `debug`'s images
fn prepare_debug_dir(debug: &DebugConfig) -> anyhow::Result<&DebugConfig> {
    if let Some(target) = debug.preprocessed_image_path.parent() {
        if !target.is_dir() {
            fs::create_dir_all(target)
                .with_context(|| format!("creating {}", target.display()))?;
            logging::log_fs_modification("create_dir", target, None);
        }
    }
    Ok(debug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use perceptual_hash_core::LogLevel;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(verbosity_level(0), LevelFilter::Warn);
        assert_eq!(verbosity_level(1), LevelFilter::Info);
        assert_eq!(verbosity_level(2), LevelFilter::Debug);
        assert_eq!(verbosity_level(9), LevelFilter::Trace);
    }

    #[test]
    fn test_config_file_level_applies_without_flags() {
        let config = Config {
            log_level: LogLevel::Debug,
            ..Config::default()
        };
        assert_eq!(log_level(0, Some(&config)), LevelFilter::Debug);
        assert_eq!(log_level(1, Some(&config)), LevelFilter::Info);
        assert_eq!(log_level(3, Some(&config)), LevelFilter::Trace);
        assert_eq!(log_level(0, None), LevelFilter::Warn);
    }

    #[test]
    fn test_hash_continues_past_debug_dir_failure() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::GrayImage::from_fn(64, 64, |x, y| image::Luma([(x * 4 + y) as u8]));
        for name in ["blocked.png", "open.png"] {
            img.save(dir.path().join(name)).unwrap();
        }

        // A plain file where the first image's debug directory should go
        let debug_root = dir.path().join("debug");
        fs::create_dir(&debug_root).unwrap();
        fs::write(debug_root.join("blocked.png"), b"").unwrap();

        let files = vec![dir.path().join("blocked.png"), dir.path().join("open.png")];
        let mut hashed = Vec::new();
        let failed = hash_files(&PerceptualHasher::new(), &files, Some(&debug_root), |r| {
            hashed.push(r.path.clone())
        });

        assert_eq!(failed, 1);
        assert_eq!(hashed, vec![dir.path().join("open.png")]);
        assert!(debug_root.join("open.png").join("visualized_open.png").is_file());
    }

    #[test]
    fn test_scan_arguments() {
        let cli = Cli::parse_from([
            "phash", "-vv", "scan", "images", "more", "--report", "--threshold", "8",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Scan {
                directories,
                report,
                threshold,
                ..
            } => {
                assert_eq!(directories, vec![PathBuf::from("images"), PathBuf::from("more")]);
                assert!(report);
                assert_eq!(threshold, Some(8));
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_transform_argument() {
        let cli = Cli::parse_from(["phash", "hash", "a.png", "--transform", "separable"]);
        match cli.command {
            Commands::Hash { transform, .. } => assert_eq!(transform, TransformKind::Separable),
            _ => panic!("expected hash"),
        }
    }
}
