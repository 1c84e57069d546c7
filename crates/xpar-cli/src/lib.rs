pub mod config;
pub mod options;

use std::fs::File;
use std::io::{stdin, stdout, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::info;

use config::XparConfig;
use options::CommandLineOptions;
use xpar_error::{Error, Result};

enum Mode {
    Joint,
    Sharded,
}

enum Operation {
    Encode,
    Decode,
}

/// Resolve the effective `(ifactor, dshards, pshards, jobs)` tuple: a CLI
/// value that differs from clap's own default is assumed explicit and
/// wins; otherwise the config file's value (or the same default) applies.
fn resolve_params(opts: &CommandLineOptions, config: &XparConfig) -> (u8, u8, u8, Option<usize>, bool) {
    let ifactor = if opts.ifactor != 1 { opts.ifactor } else { config.ifactor };
    let dshards = if opts.dshards != 4 { opts.dshards } else { config.dshards };
    let pshards = if opts.pshards != 2 { opts.pshards } else { config.pshards };
    let jobs = opts.jobs.or(config.jobs);
    let strict_consensus = opts.strict_consensus || config.strict_consensus;
    (ifactor, dshards, pshards, jobs, strict_consensus)
}

fn open_input(path: &str) -> Result<Box<dyn Read>> {
    if path == "-" {
        Ok(Box::new(BufReader::new(stdin())))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

fn open_output(path: &str, to_stdout: bool) -> Result<Box<dyn Write>> {
    if to_stdout {
        Ok(Box::new(BufWriter::new(stdout())))
    } else {
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}

/// Parse, validate and run one `xpar` invocation. Returns `Err` on any
/// fatal condition; the binary maps that to exit code 1.
pub fn run(opts: CommandLineOptions) -> Result<()> {
    let config = match &opts.config {
        Some(path) => {
            let cfg = XparConfig::from_file(Path::new(path))?;
            cfg.validate()?;
            cfg
        }
        None => XparConfig::default(),
    };

    let mode = if opts.sharded { Mode::Sharded } else { Mode::Joint };
    let operation = match (opts.encode, opts.decode) {
        (true, false) => Operation::Encode,
        (false, true) => Operation::Decode,
        (false, false) => {
            return Err(Error::InvalidConfig("one of -e/--encode or -d/--decode is required".into()))
        }
        (true, true) => unreachable!("clap rejects -e and -d together"),
    };

    let (ifactor, dshards, pshards, jobs, strict_consensus) = resolve_params(&opts, &config);
    if let Some(jobs) = jobs {
        let _ = rayon::ThreadPoolBuilder::new().num_threads(jobs).build_global();
    }

    match (mode, operation) {
        (Mode::Joint, Operation::Encode) => joint_encode(&opts, ifactor),
        (Mode::Joint, Operation::Decode) => joint_decode(&opts, ifactor),
        (Mode::Sharded, Operation::Encode) => sharded_encode(&opts, dshards, pshards),
        (Mode::Sharded, Operation::Decode) => sharded_decode(&opts, strict_consensus),
    }
}

fn joint_encode(opts: &CommandLineOptions, ifactor: u8) -> Result<()> {
    let mut reader = open_input(&opts.input)?;
    let output_path = opts.output.clone().unwrap_or_else(|| format!("{}.xpa", opts.input));
    let mut writer = open_output(&output_path, opts.to_stdout)?;

    xpar_core::joint::encode(&mut reader, &mut writer, ifactor)?;
    writer.flush()?;
    info!("joint encode complete: {} -> {}", opts.input, output_path);
    Ok(())
}

fn joint_decode(opts: &CommandLineOptions, ifactor: u8) -> Result<()> {
    let mut reader = open_input(&opts.input)?;
    let output_path = opts.output.clone().unwrap_or_else(|| {
        opts.input.strip_suffix(".xpa").map(str::to_owned).unwrap_or_else(|| format!("{}.out", opts.input))
    });
    let mut writer = open_output(&output_path, opts.to_stdout)?;

    let report = xpar_core::joint::decode(&mut reader, &mut writer, opts.force, Some(ifactor))?;
    writer.flush()?;
    info!(
        "joint decode complete: {} lace(s), {} symbol(s) corrected -> {}",
        report.laces, report.corrections, output_path
    );
    Ok(())
}

fn sharded_encode(opts: &CommandLineOptions, dshards: u8, pshards: u8) -> Result<()> {
    let mut reader = open_input(&opts.input)?;
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let shards = xpar_core::shard::encode(&data, dshards as usize, pshards as usize)?;
    let prefix = opts.output.clone().unwrap_or_else(|| opts.input.clone());
    for (index, shard) in shards.iter().enumerate() {
        let path = format!("{prefix}.xpa.{index:03}");
        let mut f = File::create(&path)?;
        f.write_all(shard)?;
    }
    info!("sharded encode complete: {} shard(s) written with prefix {}", shards.len(), prefix);
    Ok(())
}

fn sharded_decode(opts: &CommandLineOptions, strict_consensus: bool) -> Result<()> {
    if opts.shards.is_empty() {
        return Err(Error::InvalidConfig("sharded decode requires at least one shard path".into()));
    }
    let mut raw_shards = Vec::with_capacity(opts.shards.len());
    for path in &opts.shards {
        let mut buf = Vec::new();
        File::open(path)?.read_to_end(&mut buf)?;
        raw_shards.push(buf);
    }

    let data = xpar_core::shard::decode(&raw_shards, strict_consensus)?;
    let mut writer = open_output(&opts.input, opts.to_stdout)?;
    writer.write_all(&data)?;
    writer.flush()?;
    info!("sharded decode complete: {} byte(s) written to {}", data.len(), opts.input);
    Ok(())
}

/// Maps `Err` to the process exit code the `xpar` binary returns.
pub fn exit_code(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => 1,
    }
}
