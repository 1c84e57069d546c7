use clap::Parser;

/// `xpar` — protect a byte stream against corruption and fragment loss.
#[derive(Parser, Debug)]
#[command(author, version, about = "xpar - RS(255,223) joint containers and sharded erasure coding", long_about = None)]
pub struct CommandLineOptions {
    /// Joint-mode container (default when neither -J nor -S is given).
    #[arg(short = 'J', long, conflicts_with = "sharded")]
    pub joint: bool,

    /// Sharded-mode erasure coding.
    #[arg(short = 'S', long)]
    pub sharded: bool,

    /// Encode the input.
    #[arg(short = 'e', long, conflicts_with = "decode")]
    pub encode: bool,

    /// Decode the input.
    #[arg(short = 'd', long)]
    pub decode: bool,

    /// Interlacing factor, joint mode only.
    #[arg(short = 'i', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub ifactor: u8,

    /// Data shard count, sharded mode only.
    #[arg(long, default_value_t = 4)]
    pub dshards: u8,

    /// Parity shard count, sharded mode only.
    #[arg(long, default_value_t = 2)]
    pub pshards: u8,

    /// Output path (joint mode) or output-file prefix (sharded encode).
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Keep going past recoverable failures, writing best-effort output.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Sharded mode only: a shard that disagrees with the majority on
    /// header fields is a fatal error instead of being dropped.
    #[arg(long, default_value_t = false)]
    pub strict_consensus: bool,

    /// Suppress informational logging.
    #[arg(short = 'q', long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose (debug-level) logging.
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,

    /// Accepted for compatibility; xpar always streams through buffered I/O.
    #[arg(long, default_value_t = false)]
    pub no_mmap: bool,

    /// Write output to stdout.
    #[arg(short = 'c', long = "stdout", default_value_t = false)]
    pub to_stdout: bool,

    /// Worker threads used for parallel codeword/shard processing.
    #[arg(short = 'j', long = "jobs")]
    pub jobs: Option<usize>,

    /// Optional TOML config file; CLI flags always take precedence.
    #[arg(long)]
    pub config: Option<String>,

    /// Input file (joint mode), or the file to write (sharded decode).
    /// Omit or pass "-" to read the input from stdin in joint mode.
    pub input: String,

    /// Shard file paths; only meaningful for sharded decode, where
    /// `input` names the output path and these name the shards to read.
    pub shards: Vec<String>,
}
