use std::fs;
use std::io::Write;

use tempfile::tempdir;
use xpar_cli::options::CommandLineOptions;

fn base_opts(input: String) -> CommandLineOptions {
    CommandLineOptions {
        joint: false,
        sharded: false,
        encode: false,
        decode: false,
        ifactor: 1,
        dshards: 4,
        pshards: 2,
        output: None,
        force: false,
        strict_consensus: false,
        quiet: false,
        verbose: false,
        no_mmap: false,
        to_stdout: false,
        jobs: None,
        config: None,
        input,
        shards: Vec::new(),
    }
}

#[test]
fn joint_roundtrip_through_files() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("payload.bin");
    let mut f = fs::File::create(&input_path).unwrap();
    f.write_all(b"integration test payload for joint mode roundtrip").unwrap();
    drop(f);

    let encoded_path = dir.path().join("payload.bin.xpa");
    let mut enc_opts = base_opts(input_path.to_str().unwrap().to_string());
    enc_opts.encode = true;
    enc_opts.output = Some(encoded_path.to_str().unwrap().to_string());
    xpar_cli::run(enc_opts).unwrap();
    assert!(encoded_path.exists());

    let decoded_path = dir.path().join("payload.bin.out");
    let mut dec_opts = base_opts(encoded_path.to_str().unwrap().to_string());
    dec_opts.decode = true;
    dec_opts.output = Some(decoded_path.to_str().unwrap().to_string());
    xpar_cli::run(dec_opts).unwrap();

    let recovered = fs::read(&decoded_path).unwrap();
    assert_eq!(recovered, b"integration test payload for joint mode roundtrip");
}

#[test]
fn sharded_roundtrip_with_missing_shards() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("data.bin");
    fs::write(&input_path, (0..2000u32).map(|x| (x % 251) as u8).collect::<Vec<u8>>()).unwrap();

    let prefix = dir.path().join("data").to_str().unwrap().to_string();
    let mut enc_opts = base_opts(input_path.to_str().unwrap().to_string());
    enc_opts.sharded = true;
    enc_opts.encode = true;
    enc_opts.dshards = 4;
    enc_opts.pshards = 2;
    enc_opts.output = Some(prefix.clone());
    xpar_cli::run(enc_opts).unwrap();

    // Drop two shards; decode must still succeed.
    let shard_paths: Vec<String> = (0..6)
        .filter(|i| *i != 1 && *i != 4)
        .map(|i| format!("{prefix}.xpa.{i:03}"))
        .collect();

    let out_path = dir.path().join("data.recovered");
    let mut dec_opts = base_opts(out_path.to_str().unwrap().to_string());
    dec_opts.sharded = true;
    dec_opts.decode = true;
    dec_opts.shards = shard_paths;
    xpar_cli::run(dec_opts).unwrap();

    let original = fs::read(&input_path).unwrap();
    let recovered = fs::read(&out_path).unwrap();
    assert_eq!(recovered, original);
}

#[test]
fn missing_operation_flag_is_an_error() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("whatever.bin");
    fs::write(&input_path, b"x").unwrap();
    let opts = base_opts(input_path.to_str().unwrap().to_string());
    assert!(xpar_cli::run(opts).is_err());
}
