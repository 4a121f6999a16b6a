use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use chunkstat::config::{EngineConfig, DEFAULT_CHUNK_SIZE, DEFAULT_TABLE_CAPACITY};
use chunkstat::{aggregate_file, baseline, write_summary, AggError, Result, Summary};

#[derive(Parser)]
#[command(name = "chunkstat")]
#[command(about = "Per-key min/mean/max over a `<key>;<value>` file")]
struct Cli {
    /// Input file, one `<key>;<value>` record per line
    path: PathBuf,

    /// Worker threads (default: available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Bytes read per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Chunks queued between the reader and the workers
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Buckets per worker table, a power of two
    #[arg(long, default_value_t = DEFAULT_TABLE_CAPACITY)]
    table_capacity: usize,

    /// Log progress lines to stderr
    #[arg(long)]
    progress: bool,

    /// Use the single-threaded reference implementation
    #[arg(long)]
    baseline: bool,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(queue_capacity) = self.queue_capacity {
            config = config.with_queue_capacity(queue_capacity);
        }
        config
            .with_chunk_size(self.chunk_size)
            .with_table_capacity(self.table_capacity)
            .with_progress(self.progress)
    }
}

fn run(cli: &Cli) -> Result<()> {
    let summary: Summary = if cli.baseline {
        let file = File::open(&cli.path)?;
        baseline::aggregate(BufReader::new(file))?
    } else {
        aggregate_file(&cli.path, &cli.engine_config())?
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_summary(&mut out, &summary)?;
    out.flush()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.progress { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(err) = run(&cli) {
        match err {
            AggError::Io(_) => eprintln!("chunkstat: {}: {err}", cli.path.display()),
            _ => eprintln!("chunkstat: {err}"),
        }
        process::exit(1);
    }
}
