use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

pub fn parse_command_line<'a>() -> ArgMatches<'a> {
    App::new("numsum")
        .version(crate_version!())
        .about("Sum the integers found in text files with a local MapReduce")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("run")
                .about("Run the sum job over an input path and write the total to an output path")
                .arg(
                    Arg::with_name("input")
                        .help("Input file, or directory of input files")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("output")
                        .help("Output directory. It must not exist yet")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::with_name("workers")
                        .long("workers")
                        .short("w")
                        .help("Number of map tasks run in parallel. Defaults to the number of CPUs")
                        .takes_value(true)
                        .required(false),
                )
                .arg(
                    Arg::with_name("split_size")
                        .long("split-size")
                        .short("s")
                        .help("Maximum number of input bytes read by one map task")
                        .takes_value(true)
                        .required(false),
                )
                .arg(
                    Arg::with_name("keep_intermediate")
                        .long("keep-intermediate")
                        .help("Keep the map task outputs in <output>/_temporary"),
                ),
        )
        .get_matches()
}
