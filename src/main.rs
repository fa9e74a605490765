use std::env;
use std::process;

mod builtins;
mod command;
mod config;
mod error;
mod exec;
mod expand;
mod input;
mod jobs;
mod prompt;
mod shell;
mod signals;
mod status;

use config::{Config, Invocation};

fn print_help() {
    println!("smallsh - small interactive shell");
    println!();
    println!("Usage: smallsh [OPTIONS]");
    println!("  -h, --help           Print this help");
    println!("  -v, --version        Print version");
    println!(
        "      --max-line <N>   Longest accepted command line in bytes (default {})",
        config::DEFAULT_MAX_LINE
    );
    println!();
    println!("Builtins: exit, cd [dir], status. Other commands run as child processes.");
    println!("  cmd [args...] [< infile] [> outfile] [&]");
    println!("Ctrl-Z toggles foreground-only mode. Log level: SMALLSH_LOG (default warn).");
}

fn print_version() {
    println!("smallsh {}", env!("CARGO_PKG_VERSION"));
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("SMALLSH_LOG", "warn"))
        .init();

    let config = match Config::from_args(env::args().skip(1)) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            print_help();
            process::exit(0);
        }
        Ok(Invocation::Version) => {
            print_version();
            process::exit(0);
        }
        Err(e) => {
            eprintln!("smallsh: {e}");
            eprintln!("Try 'smallsh --help' for more information.");
            process::exit(2);
        }
    };

    if let Err(e) = signals::install_shell_handlers() {
        log::error!("{e}");
        eprintln!("smallsh: {e}");
        process::exit(1);
    }

    log::debug!("starting with {config:?}");
    let mut shell = shell::Shell::new(&config);
    if let Err(e) = shell.run() {
        log::error!("{e}");
        eprintln!("smallsh: {e}");
        process::exit(1);
    }
}
