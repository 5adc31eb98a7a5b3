use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Take, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json;

use errors::*;
use mapper::InputRecord;
use serialise::IntermediateOutputObject;
use splitter::InputSplit;

/// `SplitRecordReader` reads the lines of an `InputSplit` as `InputRecord`s.
///
/// Line terminators (`\n` or `\r\n`) are stripped. Bytes which are not valid UTF-8 are replaced
/// rather than treated as a read error, so such a line simply fails to parse later on. After a
/// read error the reader yields nothing more.
pub struct SplitRecordReader {
    reader: BufReader<Take<File>>,
    offset: u64,
    line: Vec<u8>,
    failed: bool,
}

impl SplitRecordReader {
    pub fn open(split: &InputSplit) -> Result<Self> {
        let mut file = File::open(&split.path)
            .chain_err(|| format!("Error opening input file {}.", split.path.display()))?;
        file.seek(SeekFrom::Start(split.start))
            .chain_err(|| format!("Error seeking to the start of split {}.", split.id))?;

        Ok(SplitRecordReader {
            reader: BufReader::new(file.take(split.length)),
            offset: split.start,
            line: Vec::new(),
            failed: false,
        })
    }
}

fn decode_line(line: &[u8]) -> String {
    let mut end = line.len();
    if end > 0 && line[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && line[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&line[..end]).into_owned()
}

impl Iterator for SplitRecordReader {
    type Item = Result<InputRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        self.line.clear();
        match self.reader.read_until(b'\n', &mut self.line) {
            Ok(0) => None,
            Ok(amount_read) => {
                let record = InputRecord::new(self.offset, decode_line(&self.line));
                self.offset += amount_read as u64;
                Some(Ok(record))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(Error::with_chain(
                    err,
                    format!("Error reading input record at offset {}.", self.offset),
                )))
            }
        }
    }
}

/// `write_intermediate` serialises the output of a map task to a JSON file.
pub fn write_intermediate<K, V>(path: &Path, output: &IntermediateOutputObject<K, V>) -> Result<()>
where
    K: Serialize,
    V: Serialize,
{
    let file = File::create(path)
        .chain_err(|| format!("Error creating intermediate file {}.", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, output)
        .chain_err(|| format!("Error writing intermediate file {}.", path.display()))?;
    writer
        .flush()
        .chain_err(|| format!("Error writing intermediate file {}.", path.display()))?;
    Ok(())
}

/// `read_intermediate` reads back the output of a map task written by `write_intermediate`.
pub fn read_intermediate<K, V>(path: &Path) -> Result<IntermediateOutputObject<K, V>>
where
    K: DeserializeOwned,
    V: DeserializeOwned,
{
    let file = File::open(path)
        .chain_err(|| format!("Error opening intermediate file {}.", path.display()))?;
    let mut input_string = String::new();
    BufReader::new(file)
        .read_to_string(&mut input_string)
        .chain_err(|| format!("Error reading intermediate file {}.", path.display()))?;
    if input_string.is_empty() {
        warn!("Intermediate file {} is empty", path.display());
    }

    let result = serde_json::from_str(&input_string)
        .chain_err(|| "Error parsing intermediate JSON to IntermediateOutputObject.")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;
    use std::process;

    use super::*;

    fn test_file(name: &str, contents: &[u8]) -> PathBuf {
        let mut path = env::temp_dir();
        path.push(format!("numsum-io-{}-{}", name, process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    fn read_split(path: &Path, start: u64, length: u64) -> Vec<InputRecord> {
        let split = InputSplit {
            id: 0,
            path: path.to_path_buf(),
            start,
            length,
        };
        SplitRecordReader::open(&split)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn read_whole_file() {
        let path = test_file("whole", b"5\nabc\r\n10\n\n-3");

        let records = read_split(&path, 0, 15);

        assert_eq!(
            vec![
                InputRecord::new(0, "5"),
                InputRecord::new(2, "abc"),
                InputRecord::new(7, "10"),
                InputRecord::new(10, ""),
                InputRecord::new(11, "-3"),
            ],
            records
        );
    }

    #[test]
    fn read_only_the_split_range() {
        let path = test_file("range", b"1\n22\n333\n");

        let records = read_split(&path, 2, 7);

        assert_eq!(
            vec![InputRecord::new(2, "22"), InputRecord::new(5, "333")],
            records
        );
    }

    #[test]
    fn read_invalid_utf8_lossily() {
        let path = test_file("utf8", b"\xff\xfe\n7\n");

        let records = read_split(&path, 0, 5);

        assert_eq!(2, records.len());
        assert_eq!("\u{fffd}\u{fffd}", records[0].line);
        assert_eq!(InputRecord::new(3, "7"), records[1]);
    }

    #[test]
    #[should_panic]
    fn open_missing_file() {
        read_split(Path::new("/nonexistent/numsum/input"), 0, 1);
    }

    #[test]
    fn intermediate_file_round_trip() {
        let path = test_file("intermediate", b"");
        let mut output = IntermediateOutputObject::default();
        output.push("Numbers".to_owned(), 3);
        output.push("Numbers".to_owned(), 7);

        write_intermediate(&path, &output).unwrap();
        let read_back: IntermediateOutputObject<String, i32> = read_intermediate(&path).unwrap();

        assert_eq!(output, read_back);
    }

    #[test]
    #[should_panic]
    fn read_invalid_intermediate_file() {
        let path = test_file("invalid-intermediate", b"");

        read_intermediate::<String, i32>(&path).unwrap();
    }
}
