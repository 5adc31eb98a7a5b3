use std::fmt;
use std::ops::AddAssign;

/// `TaskCounters` records what a single map task did with its split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskCounters {
    pub map_input_records: u64,
    pub map_output_records: u64,
    pub skipped_records: u64,
    pub combine_input_records: u64,
    pub combine_output_records: u64,
}

impl AddAssign for TaskCounters {
    fn add_assign(&mut self, other: TaskCounters) {
        self.map_input_records += other.map_input_records;
        self.map_output_records += other.map_output_records;
        self.skipped_records += other.skipped_records;
        self.combine_input_records += other.combine_input_records;
        self.combine_output_records += other.combine_output_records;
    }
}

/// `JobCounters` is the sum of every task's counters plus those of the reduce task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JobCounters {
    pub map_tasks: u64,
    pub map: TaskCounters,
    pub reduce_input_groups: u64,
    pub reduce_input_records: u64,
    pub reduce_output_records: u64,
}

impl JobCounters {
    pub fn add_map_task(&mut self, counters: TaskCounters) {
        self.map_tasks += 1;
        self.map += counters;
    }

    /// Logs every counter at info level, one per line.
    pub fn log(&self) {
        for line in self.to_string().lines() {
            info!("{}", line);
        }
    }
}

impl fmt::Display for JobCounters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Map tasks={}", self.map_tasks)?;
        writeln!(f, "Map input records={}", self.map.map_input_records)?;
        writeln!(f, "Map output records={}", self.map.map_output_records)?;
        writeln!(f, "Skipped records={}", self.map.skipped_records)?;
        writeln!(f, "Combine input records={}", self.map.combine_input_records)?;
        writeln!(f, "Combine output records={}", self.map.combine_output_records)?;
        writeln!(f, "Reduce input groups={}", self.reduce_input_groups)?;
        writeln!(f, "Reduce input records={}", self.reduce_input_records)?;
        write!(f, "Reduce output records={}", self.reduce_output_records)
    }
}
