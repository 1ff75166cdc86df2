//! Line-delimited record output and plain-text run logs.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::CatalogRecord;

/// Append-only writer emitting one JSON record per line.
///
/// The target is truncated on creation, so identical input produces a
/// byte-identical file.
pub struct JsonlWriter {
    path: PathBuf,
    out: BufWriter<File>,
    written: usize,
}

impl JsonlWriter {
    /// Create (or truncate) the output file, creating parent directories.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_parent_dir(&path)?;
        let file = File::create(&path)?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
            written: 0,
        })
    }

    /// Encode and append one record.
    pub fn write_record(&mut self, record: &CatalogRecord) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered records to disk.
    pub fn finish(mut self) -> Result<usize> {
        self.out.flush()?;
        Ok(self.written)
    }
}

/// Non-blank lines of a JSONL file with their 1-based line numbers.
pub fn non_blank_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Write lines to a text file, each terminated by a newline.
pub fn write_text_lines(path: impl AsRef<Path>, lines: &[String]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}

/// Create the parent directory of a file path if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
