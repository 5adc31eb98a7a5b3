use std::fmt::Display;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use errors::*;

const TEMPORARY_DIRECTORY: &str = "_temporary";
const SUCCESS_MARKER: &str = "_SUCCESS";
const OUTPUT_FILE: &str = "part-00000";
const KEY_VALUE_SEPARATOR: &str = "\t";

/// `OutputCommitter` owns the output directory of a job.
///
/// Map tasks write their intermediate files into a temporary directory inside it. Only a
/// committed job leaves a result file and a `_SUCCESS` marker behind.
pub struct OutputCommitter {
    output_directory: PathBuf,
    temporary_directory: PathBuf,
}

impl OutputCommitter {
    /// Creates the output directory and its temporary directory. The output directory must not
    /// already exist.
    pub fn setup(output_directory: &Path) -> Result<Self> {
        if output_directory.exists() {
            return Err(format!(
                "Output directory {} already exists.",
                output_directory.display()
            ).into());
        }

        let temporary_directory = output_directory.join(TEMPORARY_DIRECTORY);
        fs::create_dir_all(&temporary_directory).chain_err(|| {
            format!(
                "Error creating output directory {}.",
                output_directory.display()
            )
        })?;

        Ok(OutputCommitter {
            output_directory: output_directory.to_path_buf(),
            temporary_directory,
        })
    }

    /// Path of the intermediate file written by the map task of a split.
    pub fn intermediate_path(&self, split_id: usize) -> PathBuf {
        self.temporary_directory
            .join(format!("split-{:05}.json", split_id))
    }

    /// Path of the file holding the final key-value pairs.
    pub fn output_file(&self) -> PathBuf {
        self.output_directory.join(OUTPUT_FILE)
    }

    /// Writes the final pairs, one `key<TAB>value` line each, then marks the job as successful.
    ///
    /// The result is written inside the temporary directory and only renamed into place once it
    /// is complete, so a partially written result is never visible.
    pub fn commit<K, V>(&self, pairs: &[(K, V)], keep_intermediate: bool) -> Result<PathBuf>
    where
        K: Display,
        V: Display,
    {
        let temporary_file = self.temporary_directory.join(OUTPUT_FILE);
        write_final_output(&temporary_file, pairs)?;

        let output_file = self.output_file();
        fs::rename(&temporary_file, &output_file).chain_err(|| {
            format!(
                "Error moving {} to {}.",
                temporary_file.display(),
                output_file.display()
            )
        })?;

        if !keep_intermediate {
            fs::remove_dir_all(&self.temporary_directory)
                .chain_err(|| "Error removing temporary output directory.")?;
        }

        fs::File::create(self.output_directory.join(SUCCESS_MARKER))
            .chain_err(|| "Error creating success marker.")?;
        Ok(output_file)
    }

    /// Removes the temporary directory and any result file of a failed job. Failing to do so is
    /// only logged.
    pub fn abort(&self) {
        if self.temporary_directory.exists() {
            if let Err(err) = fs::remove_dir_all(&self.temporary_directory) {
                warn!(
                    "Could not remove temporary directory {}: {}",
                    self.temporary_directory.display(),
                    err
                );
            }
        }

        let output_file = self.output_file();
        if output_file.exists() {
            if let Err(err) = fs::remove_file(&output_file) {
                warn!(
                    "Could not remove output file {}: {}",
                    output_file.display(),
                    err
                );
            }
        }
    }
}

/// `write_final_output` writes one `key<TAB>value` line per pair.
pub fn write_final_output<K, V>(path: &Path, pairs: &[(K, V)]) -> Result<()>
where
    K: Display,
    V: Display,
{
    let file = fs::File::create(path)
        .chain_err(|| format!("Error creating output file {}.", path.display()))?;
    let mut writer = BufWriter::new(file);
    for &(ref key, ref value) in pairs {
        writeln!(writer, "{}{}{}", key, KEY_VALUE_SEPARATOR, value)
            .chain_err(|| "Error writing to output file.")?;
    }
    writer.flush().chain_err(|| "Error writing to output file.")?;
    Ok(())
}
