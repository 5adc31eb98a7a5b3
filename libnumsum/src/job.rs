use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::prelude::*;
use futures::Future;
use futures_cpupool::{CpuFuture, CpuPool};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use combiner::Combine;
use counters::{JobCounters, TaskCounters};
use errors::*;
use io::{read_intermediate, write_intermediate, SplitRecordReader};
use mapper::Map;
use output::OutputCommitter;
use pipeline::{run_map_task, run_reduce_task};
use reducer::Reduce;
use registry::UserImplRegistry;
use splitter::{create_input_splits, InputSplit, DEFAULT_SPLIT_SIZE};

/// `JobConfig` holds everything needed to run a job besides the user's implementations.
#[derive(Clone, Debug, PartialEq)]
pub struct JobConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Number of threads running map tasks. One per CPU when `None`.
    pub workers: Option<usize>,
    /// Upper bound in bytes of the input read by one map task.
    pub split_size: u64,
    /// Leave the intermediate files of the map tasks in the output directory.
    pub keep_intermediate: bool,
}

impl JobConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input_path: P, output_path: Q) -> Self {
        JobConfig {
            input_path: input_path.into(),
            output_path: output_path.into(),
            workers: None,
            split_size: DEFAULT_SPLIT_SIZE,
            keep_intermediate: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err("The number of workers must be at least 1.".into());
        }
        if self.split_size == 0 {
            return Err("The split size must be at least 1 byte.".into());
        }
        Ok(())
    }
}

/// `JobReport` describes a completed job.
#[derive(Debug)]
pub struct JobReport<K, V> {
    pub job_id: String,
    pub results: Vec<(K, V)>,
    pub counters: JobCounters,
    pub output_file: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

fn new_job_id(now: &DateTime<Utc>) -> String {
    format!("job_{}_{}", now.format("%Y%m%d%H%M%S"), Uuid::new_v4())
}

fn run_split_task<M, C>(
    mapper: &M,
    combiner: Option<&C>,
    split: &InputSplit,
    intermediate_path: &Path,
) -> Result<TaskCounters>
where
    M: Map,
    M::Key: Ord + Clone,
    C: Combine<M::Key, M::Value>,
{
    debug!(
        "Running map task for split {} ({} bytes at offset {} of {})",
        split.id,
        split.length,
        split.start,
        split.path.display()
    );

    let reader = SplitRecordReader::open(split)?;
    let task_output = run_map_task(mapper, combiner, reader)?;
    write_intermediate(intermediate_path, &task_output.output)?;

    debug!("Map task for split {} done: {:?}", split.id, task_output.counters);
    Ok(task_output.counters)
}

fn run_map_phase<M, R, C>(
    config: &JobConfig,
    registry: &UserImplRegistry<M, R, C>,
    splits: Vec<InputSplit>,
    committer: &OutputCommitter,
    counters: &mut JobCounters,
) -> Result<Vec<PathBuf>>
where
    M: Map + Send + Sync + 'static,
    M::Key: Ord + Clone,
    R: Reduce<M::Key, M::Value>,
    C: Combine<M::Key, M::Value> + Send + Sync + 'static,
{
    let cpu_pool = match config.workers {
        Some(workers) => CpuPool::new(workers),
        None => CpuPool::new_num_cpus(),
    };

    info!("Running {} map tasks", splits.len());

    let mut tasks: Vec<CpuFuture<(PathBuf, TaskCounters), Error>> = Vec::new();
    for split in splits {
        let mapper = Arc::clone(&registry.mapper);
        let combiner = registry.combiner.as_ref().map(Arc::clone);
        let intermediate_path = committer.intermediate_path(split.id);

        tasks.push(cpu_pool.spawn_fn(move || -> Result<(PathBuf, TaskCounters)> {
            let counters = run_split_task(
                &*mapper,
                combiner.as_ref().map(|combiner| &**combiner),
                &split,
                &intermediate_path,
            ).chain_err(|| format!("Error running map task for split {}.", split.id))?;
            Ok((intermediate_path, counters))
        }));
    }

    // Wait for every task, failed or not, before the reduce task or a cleanup can start.
    let task_results: Vec<Result<(PathBuf, TaskCounters)>> =
        tasks.into_iter().map(|task| task.wait()).collect();

    let mut intermediate_paths = Vec::new();
    for task_result in task_results {
        let (intermediate_path, task_counters) =
            task_result.chain_err(|| "Error running map phase.")?;
        counters.add_map_task(task_counters);
        intermediate_paths.push(intermediate_path);
    }
    Ok(intermediate_paths)
}

fn run_reduce_phase<M, R, C>(
    registry: &UserImplRegistry<M, R, C>,
    intermediate_paths: &[PathBuf],
    counters: &mut JobCounters,
) -> Result<Vec<(R::OutputKey, R::Output)>>
where
    M: Map,
    M::Key: Ord + DeserializeOwned,
    M::Value: DeserializeOwned,
    R: Reduce<M::Key, M::Value>,
    C: Combine<M::Key, M::Value>,
{
    info!("Running reduce task over {} map outputs", intermediate_paths.len());

    let mut pairs = Vec::new();
    for intermediate_path in intermediate_paths {
        let map_output = read_intermediate::<M::Key, M::Value>(intermediate_path)
            .chain_err(|| "Error getting input to reduce.")?;
        pairs.extend(map_output.into_pairs());
    }

    run_reduce_task(
        &*registry.reducer,
        registry.mapper.output_keys(),
        pairs,
        counters,
    )
}

/// `run_job` runs a complete job over the files of `config.input_path`.
///
/// Map tasks run in parallel, one per input split, and each combines its own output when a
/// combiner is registered. A single reduce task then produces the result, which is written to
/// `part-00000` in `config.output_path`. Any failing task fails the whole job and no result is
/// written.
pub fn run_job<M, R, C>(
    config: &JobConfig,
    registry: &UserImplRegistry<M, R, C>,
) -> Result<JobReport<R::OutputKey, R::Output>>
where
    M: Map + Send + Sync + 'static,
    M::Key: Ord + Clone + Serialize + DeserializeOwned,
    M::Value: Serialize + DeserializeOwned,
    R: Reduce<M::Key, M::Value>,
    R::OutputKey: Display,
    R::Output: Display,
    C: Combine<M::Key, M::Value> + Send + Sync + 'static,
{
    config.validate().chain_err(|| "Invalid job configuration.")?;

    let started_at = Utc::now();
    let job_id = new_job_id(&started_at);
    info!(
        "Starting job {} input={} output={}",
        job_id,
        config.input_path.display(),
        config.output_path.display()
    );

    let splits = create_input_splits(&config.input_path, config.split_size)
        .chain_err(|| "Error creating input splits.")?;
    let committer = OutputCommitter::setup(&config.output_path)
        .chain_err(|| "Error setting up job output.")?;

    let mut counters = JobCounters::default();
    let job_result = run_map_phase(config, registry, splits, &committer, &mut counters)
        .and_then(|intermediate_paths| {
            run_reduce_phase(registry, &intermediate_paths, &mut counters)
        })
        .and_then(|results| {
            let output_file = committer.commit(&results, config.keep_intermediate)?;
            Ok((results, output_file))
        });

    let (results, output_file) = match job_result {
        Ok(job_output) => job_output,
        Err(err) => {
            committer.abort();
            return Err(err).chain_err(|| format!("Job {} failed.", job_id));
        }
    };

    let finished_at = Utc::now();
    info!(
        "Job {} completed in {} ms",
        job_id,
        finished_at
            .signed_duration_since(started_at)
            .num_milliseconds()
    );
    counters.log();

    Ok(JobReport {
        job_id,
        results,
        counters,
        output_file,
        started_at,
        finished_at,
    })
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io::Write;
    use std::process;

    use super::*;
    use emitter::EmitIntermediate;
    use mapper::InputRecord;
    use numbers::{parse_record, NumberMapper, SumAggregator, MAP_KEY, REDUCE_KEY};
    use registry::UserImplRegistryBuilder;

    struct FailingMapper;
    impl Map for FailingMapper {
        type Key = String;
        type Value = i32;
        fn map<E>(&self, input: InputRecord, mut emitter: E) -> Result<()>
        where
            E: EmitIntermediate<Self::Key, Self::Value>,
        {
            if input.line == "boom" {
                return Err("Cannot map boom.".into());
            }
            if let Some(number) = parse_record(&input.line) {
                emitter.emit(MAP_KEY.to_owned(), number)?;
            }
            Ok(())
        }
    }

    fn test_dir(name: &str) -> PathBuf {
        let mut path = env::temp_dir();
        path.push(format!("numsum-job-{}-{}", name, process::id()));
        if path.exists() {
            fs::remove_dir_all(&path).unwrap();
        }
        fs::create_dir_all(&path).unwrap();
        path
    }

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    fn sum_registry() -> UserImplRegistry<NumberMapper, SumAggregator, SumAggregator> {
        let aggregator = Arc::new(SumAggregator);
        UserImplRegistryBuilder::new()
            .mapper(Arc::new(NumberMapper))
            .reducer(Arc::clone(&aggregator))
            .combiner(aggregator)
            .build()
            .unwrap()
    }

    #[test]
    fn job_sums_all_input_files() {
        let dir = test_dir("sum");
        let input_dir = dir.join("input");
        fs::create_dir_all(&input_dir).unwrap();
        write_file(&input_dir, "a", "5\nabc\n10\n");
        write_file(&input_dir, "b", "\n-3\n");
        let config = JobConfig::new(input_dir, dir.join("output"));

        let report = run_job(&config, &sum_registry()).unwrap();

        assert_eq!(vec![(REDUCE_KEY.to_owned(), 12)], report.results);
        assert_eq!(
            "Total sum\t12\n",
            fs::read_to_string(&report.output_file).unwrap()
        );
        assert!(dir.join("output").join("_SUCCESS").is_file());
        assert!(!dir.join("output").join("_temporary").exists());
        assert_eq!(2, report.counters.map_tasks);
        assert_eq!(5, report.counters.map.map_input_records);
        assert_eq!(2, report.counters.map.skipped_records);
        assert_eq!(1, report.counters.reduce_output_records);
        assert!(report.job_id.starts_with("job_"));
    }

    #[test]
    fn job_result_does_not_depend_on_split_size_or_workers() {
        let dir = test_dir("splits");
        let input = dir.join("numbers");
        write_file(&dir, "numbers", "1\n2\nx\n3\n4\n-100\n\n90\n2147483647\n1\n");
        let registry = sum_registry();

        let mut totals = Vec::new();
        for (i, &(split_size, workers)) in [(1, 1), (4, 2), (7, 3), (1000, 4)].iter().enumerate() {
            let mut config = JobConfig::new(input.clone(), dir.join(format!("output-{}", i)));
            config.split_size = split_size;
            config.workers = Some(workers);

            let report = run_job(&config, &registry).unwrap();
            totals.push(report.results);
        }

        let expected = vec![(REDUCE_KEY.to_owned(), 1i32.wrapping_add(i32::MAX))];
        for total in totals {
            assert_eq!(expected, total);
        }
    }

    #[test]
    fn job_with_many_splits_runs_many_map_tasks() {
        let dir = test_dir("many");
        write_file(&dir, "numbers", "1\n2\n3\n4\n");
        let mut config = JobConfig::new(dir.join("numbers"), dir.join("output"));
        config.split_size = 2;

        let report = run_job(&config, &sum_registry()).unwrap();

        assert_eq!(4, report.counters.map_tasks);
        assert_eq!(4, report.counters.map.combine_output_records);
        assert_eq!(4, report.counters.reduce_input_records);
        assert_eq!(vec![(REDUCE_KEY.to_owned(), 10)], report.results);
    }

    #[test]
    fn job_of_empty_input_writes_zero() {
        let dir = test_dir("empty");
        write_file(&dir, "numbers", "");

        let config = JobConfig::new(dir.join("numbers"), dir.join("output"));
        let report = run_job(&config, &sum_registry()).unwrap();

        assert_eq!(0, report.counters.map_tasks);
        assert_eq!(
            "Total sum\t0\n",
            fs::read_to_string(&report.output_file).unwrap()
        );
    }

    #[test]
    fn job_of_empty_input_directory_writes_zero() {
        let dir = test_dir("empty-dir");
        let input_dir = dir.join("input");
        fs::create_dir_all(&input_dir).unwrap();
        write_file(&input_dir, ".hidden", "7\n");

        let config = JobConfig::new(input_dir, dir.join("output"));
        let report = run_job(&config, &sum_registry()).unwrap();

        assert_eq!(vec![(REDUCE_KEY.to_owned(), 0)], report.results);
        assert_eq!(0, report.counters.map_tasks);
        assert_eq!(
            "Total sum\t0\n",
            fs::read_to_string(&report.output_file).unwrap()
        );
        assert!(dir.join("output").join("_SUCCESS").is_file());
    }

    #[test]
    fn job_of_malformed_input_writes_zero() {
        let dir = test_dir("malformed");
        write_file(&dir, "numbers", "one\ntwo\n3.14\n \n");

        let config = JobConfig::new(dir.join("numbers"), dir.join("output"));
        let report = run_job(&config, &sum_registry()).unwrap();

        assert_eq!(vec![(REDUCE_KEY.to_owned(), 0)], report.results);
        assert_eq!(4, report.counters.map.skipped_records);
    }

    #[test]
    fn job_can_keep_intermediate_files() {
        let dir = test_dir("keep");
        write_file(&dir, "numbers", "1\n2\n");
        let mut config = JobConfig::new(dir.join("numbers"), dir.join("output"));
        config.keep_intermediate = true;

        run_job(&config, &sum_registry()).unwrap();

        let intermediate = dir.join("output").join("_temporary").join("split-00000.json");
        assert_eq!(
            r#"{"pairs":[{"key":"Numbers","value":3}]}"#,
            fs::read_to_string(&intermediate).unwrap()
        );
    }

    #[test]
    fn job_fails_on_missing_input() {
        let dir = test_dir("missing-input");
        let config = JobConfig::new(dir.join("nope"), dir.join("output"));

        assert!(run_job(&config, &sum_registry()).is_err());
        assert!(!dir.join("output").exists());
    }

    #[test]
    fn job_fails_on_existing_output() {
        let dir = test_dir("existing-output");
        write_file(&dir, "numbers", "1\n");
        fs::create_dir_all(dir.join("output")).unwrap();
        let config = JobConfig::new(dir.join("numbers"), dir.join("output"));

        assert!(run_job(&config, &sum_registry()).is_err());
        assert!(!dir.join("output").join("_SUCCESS").exists());
    }

    #[test]
    fn job_fails_when_any_map_task_fails() {
        let dir = test_dir("failing-task");
        write_file(&dir, "numbers", "1\n2\nboom\n3\n");
        let mut config = JobConfig::new(dir.join("numbers"), dir.join("output"));
        config.split_size = 2;
        let aggregator = Arc::new(SumAggregator);
        let registry = UserImplRegistryBuilder::new()
            .mapper(Arc::new(FailingMapper))
            .reducer(Arc::clone(&aggregator))
            .combiner(aggregator)
            .build()
            .unwrap();

        assert!(run_job(&config, &registry).is_err());
        assert!(!dir.join("output").join("part-00000").exists());
        assert!(!dir.join("output").join("_SUCCESS").exists());
        assert!(!dir.join("output").join("_temporary").exists());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = JobConfig::new("in", "out");
        config.workers = Some(0);
        assert!(config.validate().is_err());

        let mut config = JobConfig::new("in", "out");
        config.split_size = 0;
        assert!(config.validate().is_err());

        assert!(JobConfig::new("in", "out").validate().is_ok());
    }
}
