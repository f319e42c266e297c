//! huffpress CLI
//! Usage:
//!   huffpress compress   <input_file>
//!   huffpress decompress <input_file.huff>

mod cli;
mod logger;

use std::{env, io, process};

use cli::{Config, Invocation};

fn main() {
    let config = match Config::from_args(env::args_os().skip(1)) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            println!("{}", cli::USAGE);
            return;
        }
        Ok(Invocation::Version) => {
            println!("huffpress {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", cli::USAGE);
            process::exit(2);
        }
    };

    logger::init(config.log_level);

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = cli::run(&config, &mut stdin.lock(), &mut stdout.lock()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
