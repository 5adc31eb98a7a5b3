use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use clap::ArgMatches;

use errors::*;
use numsum::{JobConfig, NumberMapper, SumAggregator, UserImplRegistryBuilder};

fn parse_optional_arg<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let value_str = match matches.value_of(name) {
        Some(value_str) => value_str,
        None => return Ok(None),
    };

    match value_str.parse() {
        Ok(value) => Ok(Some(value)),
        Err(err) => Err(format!(
            "Error occured while converting '{}' for {}: {}",
            value_str, name, err
        ).into()),
    }
}

fn get_job_config(matches: &ArgMatches) -> Result<JobConfig> {
    let input = matches
        .value_of("input")
        .chain_err(|| "Input path must be specified")?;
    let output = matches
        .value_of("output")
        .chain_err(|| "Output path must be specified")?;

    let mut config = JobConfig::new(input, output);
    config.workers = parse_optional_arg(matches, "workers")?;
    if let Some(split_size) = parse_optional_arg(matches, "split_size")? {
        config.split_size = split_size;
    }
    config.keep_intermediate = matches.is_present("keep_intermediate");

    config.validate().chain_err(|| "Invalid job configuration")?;
    Ok(config)
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    let config = get_job_config(matches).chain_err(|| "Invalid arguments")?;
    debug!("Job configuration: {:?}", config);

    let aggregator = Arc::new(SumAggregator);
    let registry = UserImplRegistryBuilder::new()
        .mapper(Arc::new(NumberMapper))
        .reducer(Arc::clone(&aggregator))
        .combiner(aggregator)
        .build()
        .chain_err(|| "Error building UserImplRegistry.")?;

    let report = numsum::run_job(&config, &registry).chain_err(|| "Error running sum job.")?;

    println!(
        "Job {} completed. Output written to {}",
        report.job_id,
        report.output_file.display()
    );
    Ok(())
}
