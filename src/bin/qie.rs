//! `qie`: segment Chinese text from the command line.
//!
//! Log output goes to stderr. `-q` keeps only errors; the default and a
//! single `-v` show warnings (such as an HMM file that failed to load);
//! `-vv` adds dictionary and model load messages; `-vvv` and beyond add
//! per-command debug detail.

use std::io::Write;
use std::process;

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use qie::cli::args::*;
use qie::cli::commands::*;

fn main() {
    let args = QieArgs::parse();

    Builder::new()
        .filter_level(log_level(args.verbosity()))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn log_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        let level = |argv: &[&str]| log_level(QieArgs::try_parse_from(argv).unwrap().verbosity());
        assert_eq!(level(&["qie", "-q", "cut", "x"]), LevelFilter::Error);
        assert_eq!(level(&["qie", "cut", "x"]), LevelFilter::Warn);
        assert_eq!(level(&["qie", "-vv", "cut", "x"]), LevelFilter::Info);
        assert_eq!(level(&["qie", "-vvvv", "cut", "x"]), LevelFilter::Debug);
    }
}
