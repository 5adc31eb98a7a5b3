#[macro_use]
extern crate clap;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate numsum;
extern crate util;

use errors::*;

mod errors {
    error_chain!{}
}

mod parser;
mod runner;

fn main() {
    if let Err(err) = util::init_logger() {
        eprintln!("Failed to initialise logging: {}", err);
    }

    let matches = parser::parse_command_line();

    if let Err(ref e) = run(&matches) {
        eprintln!("Error: {}", e);
        for cause in e.iter().skip(1) {
            eprintln!("caused by: {}", cause);
        }
        util::output_error(e);
        ::std::process::exit(1);
    }

    ::std::process::exit(0);
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("run", Some(sub)) => runner::run(sub),
        _ => {
            println!("{}", matches.usage());
            Err("unknown command".into())
        }
    }
}
