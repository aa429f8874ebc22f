use std::path::PathBuf;
use std::process;

use clap::{ArgGroup, Parser};
use log::{error, info};

use hyb_index::{init_logger, BoundaryMode, BuildConfig, HybError, IndexBuilder, IndexReader, InputFormat, LoggerConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Build a HYB index from a sorted postings file")]
#[command(group(ArgGroup::new("boundary").args(["boundary_prefixes", "prefix_length", "block_volume", "blocks"])))]
struct Cli {
    /// Postings file, sorted by word then doc id.
    #[arg(long)]
    input: PathBuf,

    /// Index file to write.
    #[arg(long)]
    index: PathBuf,

    /// Vocabulary file: written for ascii input, read for binary input.
    /// Defaults to `<index>.vocabulary`.
    #[arg(long)]
    vocabulary: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    /// File of sorted boundary strings, one per line.
    #[arg(long)]
    boundary_prefixes: Option<PathBuf>,

    /// Start a new block whenever the first `k` bytes of the word change.
    #[arg(long)]
    prefix_length: Option<usize>,

    /// Target number of postings per block.
    #[arg(long)]
    block_volume: Option<usize>,

    /// Prefix length when below 10, block volume otherwise.
    #[arg(long)]
    blocks: Option<usize>,

    /// Most postings one block may hold; the rest are dropped until the next flush.
    #[arg(long)]
    max_block_volume: Option<usize>,

    #[arg(long, default_value_t = false)]
    positions: bool,

    #[arg(long, default_value_t = false)]
    scores: bool,

    /// JSON build config; command line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check every compressed list decompresses to its input.
    #[arg(long, default_value_t = false)]
    verify: bool,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write rolling log files into this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn boundary(&self) -> Option<BoundaryMode> {
        if let Some(path) = &self.boundary_prefixes {
            return Some(BoundaryMode::Prefixes { path: path.clone() });
        }
        if let Some(length) = self.prefix_length {
            return Some(BoundaryMode::PrefixLength { length });
        }
        if let Some(volume) = self.block_volume {
            return Some(BoundaryMode::Volume { volume });
        }
        self.blocks.map(BoundaryMode::from_block_parameter)
    }

    fn build_config(&self) -> Result<BuildConfig, HybError> {
        let vocabulary_path = self.vocabulary.clone().unwrap_or_else(|| {
            let mut name = self.index.clone().into_os_string();
            name.push(".vocabulary");
            PathBuf::from(name)
        });

        let mut config = match &self.config {
            Some(path) => BuildConfig::load(path)?,
            None => {
                let boundary = self.boundary().ok_or_else(|| {
                    HybError::InvalidConfig(
                        "one of --boundary-prefixes, --prefix-length, --block-volume or --blocks is required".to_string(),
                    )
                })?;
                BuildConfig::builder().boundary(boundary).vocabulary_path(vocabulary_path.clone()).build()
            }
        };

        if let Some(boundary) = self.boundary() {
            config.boundary = boundary;
        }
        if self.vocabulary.is_some() {
            config.vocabulary_path = vocabulary_path;
        }
        if let Some(format) = self.format {
            config.input_format = format;
        }
        if self.max_block_volume.is_some() {
            config.max_block_volume = self.max_block_volume;
        }
        config.with_positions |= self.positions;
        config.with_scores |= self.scores;
        config.verify_round_trip |= self.verify;
        config.validate()?;
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<(), HybError> {
    let config = cli.build_config()?;
    info!("[hyb-build] {:?}", config);

    let mut builder = IndexBuilder::new(config)?;
    let stats = builder.build_from_file(&cli.input, &cli.index)?;

    let reader = IndexReader::open(&cli.index)?;
    println!("{}", stats);
    println!("{}", reader.meta());
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let logger_config = match &cli.log_dir {
        Some(dir) => LoggerConfig::new(dir.clone(), cli.log_level.clone(), true, true),
        None => LoggerConfig { log_level: cli.log_level.clone(), ..LoggerConfig::default() },
    };
    if let Err(e) = init_logger(&logger_config) {
        eprintln!("{}", e);
        process::exit(2);
    }

    if let Err(e) = run(&cli) {
        error!("[hyb-build] {}", e);
        process::exit(1);
    }
}
