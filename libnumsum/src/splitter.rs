use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use errors::*;

const MEGA_BYTE: u64 = 1000 * 1000;
pub const DEFAULT_SPLIT_SIZE: u64 = MEGA_BYTE * 64;

/// `InputSplit` is a byte range of one input file, starting and ending on a line boundary.
/// It is the unit of work of a map task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputSplit {
    pub id: usize,
    pub path: PathBuf,
    pub start: u64,
    pub length: u64,
}

// Names starting with these characters are bookkeeping files, not input.
fn is_hidden(path: &Path) -> bool {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => name.starts_with('_') || name.starts_with('.'),
        None => false,
    }
}

/// `list_input_files` returns the files to read for an input path.
///
/// A file path is used as is. For a directory every visible regular file directly inside it is
/// used, in path order. A directory without any such file is an empty input, not an error.
pub fn list_input_files(input_path: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(input_path)
        .chain_err(|| format!("Error reading input path {}.", input_path.display()))?;

    if metadata.is_file() {
        return Ok(vec![input_path.to_path_buf()]);
    }

    let mut input_files = Vec::new();
    let entries = fs::read_dir(input_path)
        .chain_err(|| format!("Error reading input directory {}.", input_path.display()))?;
    for entry in entries {
        let entry: fs::DirEntry = entry.chain_err(|| "Error reading input directory.")?;
        let path: PathBuf = entry.path();
        if path.is_file() && !is_hidden(&path) {
            input_files.push(path);
        }
    }

    input_files.sort();
    Ok(input_files)
}

/// `split_file` cuts a file into splits of at most `split_size` bytes, only ever cutting between
/// lines. A line longer than `split_size` gets a split of its own. An empty file has no splits.
pub fn split_file(path: &Path, split_size: u64, first_id: usize) -> Result<Vec<InputSplit>> {
    let file = fs::File::open(path)
        .chain_err(|| format!("Error opening input file {}.", path.display()))?;
    let mut reader = BufReader::new(file);

    let mut splits = Vec::new();
    let mut split_start: u64 = 0;
    let mut split_length: u64 = 0;
    let mut line = Vec::new();

    loop {
        line.clear();
        let amount_read = reader
            .read_until(b'\n', &mut line)
            .chain_err(|| format!("Error reading input file {}.", path.display()))?
            as u64;
        if amount_read == 0 {
            break;
        }

        if split_length > 0 && split_length + amount_read > split_size {
            splits.push(InputSplit {
                id: first_id + splits.len(),
                path: path.to_path_buf(),
                start: split_start,
                length: split_length,
            });
            split_start += split_length;
            split_length = 0;
        }
        split_length += amount_read;
    }

    if split_length > 0 {
        splits.push(InputSplit {
            id: first_id + splits.len(),
            path: path.to_path_buf(),
            start: split_start,
            length: split_length,
        });
    }

    Ok(splits)
}

/// `create_input_splits` lists the input files of `input_path` and splits each of them.
/// Split ids are unique across all files.
pub fn create_input_splits(input_path: &Path, split_size: u64) -> Result<Vec<InputSplit>> {
    let mut splits = Vec::new();
    for input_file in list_input_files(input_path)? {
        let file_splits = split_file(&input_file, split_size, splits.len())
            .chain_err(|| "Error splitting input file.")?;
        splits.extend(file_splits);
    }
    Ok(splits)
}
