//! Move record file.
//!
//! First line is `<width> <height>`, then one `<x> <y>` line per move in the
//! order the moves were asked for, invalid ones included.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

/// An open move record.
pub struct MoveRecord {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl MoveRecord {
    /// Create `Gomoku--<timestamp>.log` in `directory` and write the header.
    pub fn create(directory: &Path, width: i32, height: i32) -> io::Result<Self> {
        let name = format!("Gomoku--{}.log", Local::now().format("%Y-%m-%d--%H-%M-%S"));
        let path = directory.join(name);
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "{} {}", width, height)?;
        Ok(Self { path, writer })
    }

    /// Where the record is written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one move.
    pub fn write_move(&mut self, x: i32, y: i32) -> io::Result<()> {
        writeln!(self.writer, "{} {}", x, y)
    }

    /// Flush and close the record.
    pub fn finish(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
