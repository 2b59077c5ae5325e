use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::extract::Extracted;
use crate::model::{ErrorsWarningsEmag, ErrorsWarningsSummary, PageInfo, Record};
use crate::Result;

const SEP: char = ',';

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first {
            write!(w, "{SEP}")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

/// Append-only CSV file of `R` records.
pub struct CsvSink<R> {
    path: PathBuf,
    file: File,
    _record: PhantomData<R>,
}

impl<R: Record> CsvSink<R> {
    /// Creates (or truncates) the file and writes the header row.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut header = BufWriter::new(File::create(&path)?);
        write_row(&mut header, R::HEADERS)?;
        header.flush()?;

        let file = OpenOptions::new().append(true).open(&path)?;
        Ok(Self {
            path,
            file,
            _record: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, record: &R) -> Result<()> {
        let fields = record.fields();
        let mut buf = Vec::new();
        write_row(&mut buf, fields.as_slice())?;
        self.file.write_all(&buf)?;
        self.file.flush()?;
        Ok(())
    }
}

/// The three output files.
pub struct Sinks {
    pub page_info: CsvSink<PageInfo>,
    pub summary: CsvSink<ErrorsWarningsSummary>,
    pub emag: CsvSink<ErrorsWarningsEmag>,
}

impl Sinks {
    pub fn create(page_info: &Path, summary: &Path, emag: &Path) -> Result<Self> {
        Ok(Self {
            page_info: CsvSink::create(page_info)?,
            summary: CsvSink::create(summary)?,
            emag: CsvSink::create(emag)?,
        })
    }

    /// Stores one page's records. Returns how many rows were written.
    pub fn store(&mut self, extracted: &Extracted) -> Result<usize> {
        self.page_info.append(&extracted.page_info)?;
        self.summary.append(&extracted.summary)?;
        for info in &extracted.emag {
            self.emag.append(info)?;
        }
        Ok(2 + extracted.emag.len())
    }
}
