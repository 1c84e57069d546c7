use clap::Parser;
use log::error;

use xpar_cli::options::CommandLineOptions;
use xpar_logger::Verbosity;

fn main() {
    let opts = CommandLineOptions::parse();

    let verbosity = if opts.quiet {
        Verbosity::Quiet
    } else if opts.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    xpar_logger::init(verbosity);

    let result = xpar_cli::run(opts);
    if let Err(ref e) = result {
        error!("{e}");
    }
    std::process::exit(xpar_cli::exit_code(&result));
}
