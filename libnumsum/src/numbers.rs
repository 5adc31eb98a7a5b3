use combiner::Combine;
use emitter::{EmitFinal, EmitIntermediate};
use errors::*;
use intermediate::IntermediateInputKV;
use mapper::{InputRecord, Map};
use reducer::Reduce;

/// Key given to every number emitted by `NumberMapper`.
pub const MAP_KEY: &str = "Numbers";
/// Key of the single pair emitted by `SumAggregator` when used as a reducer.
pub const REDUCE_KEY: &str = "Total sum";

/// `parse_record` reads a line as a base-10 signed 32-bit integer.
///
/// Surrounding ASCII whitespace is ignored. Anything else which is not a valid integer in range
/// gives `None`; a malformed line is never an error.
pub fn parse_record(line: &str) -> Option<i32> {
    line.trim_matches(|c: char| c.is_ascii_whitespace())
        .parse()
        .ok()
}

/// `sum` adds up a group of values with 32-bit wraparound on overflow.
///
/// Wrapping addition is associative and commutative, so summing partial sums gives the same
/// result as summing every value at once.
pub fn sum(values: &[i32]) -> i32 {
    values.iter().fold(0i32, |acc, &value| acc.wrapping_add(value))
}

/// `NumberMapper` emits every line which parses as an integer under `MAP_KEY` and drops the rest.
pub struct NumberMapper;

impl Map for NumberMapper {
    type Key = String;
    type Value = i32;
    fn map<E>(&self, input: InputRecord, mut emitter: E) -> Result<()>
    where
        E: EmitIntermediate<Self::Key, Self::Value>,
    {
        if let Some(number) = parse_record(&input.line) {
            emitter
                .emit(MAP_KEY.to_owned(), number)
                .chain_err(|| format!("Error emitting number at offset {}.", input.offset))?;
        }
        Ok(())
    }

    fn output_keys(&self) -> Vec<Self::Key> {
        vec![MAP_KEY.to_owned()]
    }
}

/// `SumAggregator` sums the values of a group.
///
/// As a combiner it keeps the group key, as a reducer it emits the total under `REDUCE_KEY`.
pub struct SumAggregator;

impl Combine<String, i32> for SumAggregator {
    fn combine<E>(&self, input: IntermediateInputKV<String, i32>, mut emitter: E) -> Result<()>
    where
        E: EmitFinal<i32>,
    {
        let total = sum(&input.values);
        emitter
            .emit(total)
            .chain_err(|| format!("Error emitting combined value {:?}.", total))?;
        Ok(())
    }
}

impl Reduce<String, i32> for SumAggregator {
    type OutputKey = String;
    type Output = i32;
    fn reduce<E>(&self, input: IntermediateInputKV<String, i32>, mut emitter: E) -> Result<()>
    where
        E: EmitIntermediate<Self::OutputKey, Self::Output>,
    {
        let total = sum(&input.values);
        emitter
            .emit(REDUCE_KEY.to_owned(), total)
            .chain_err(|| format!("Error emitting value {:?}.", total))?;
        Ok(())
    }
}
