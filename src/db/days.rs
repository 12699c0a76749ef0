use super::StoreError;
use crate::libs::day::{DayRecord, DATE_FORMAT};
use chrono::NaiveDate;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

pub const DAYS_FILE_NAME: &str = "keytally.txt";
const FIELD_COUNT: usize = 4;

/// Exclusive handle on the day-record file.
///
/// Holding a `DayStore` means holding the advisory lock on `<file>.lock`.
/// The lock is released when the store is dropped.
#[derive(Debug)]
pub struct DayStore {
    path: PathBuf,
    lock: File,
}

impl DayStore {
    /// Makes the store ready for use: creates the data file if it is missing
    /// and takes the exclusive lock.
    ///
    /// # Errors
    ///
    /// [`StoreError::ResourceLocked`] when another process already holds the
    /// lock, [`StoreError::Write`] when the file or its lock cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let write_err = |source: io::Error| StoreError::Write { path: path.clone(), source };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        OpenOptions::new().create(true).append(true).open(&path).map_err(write_err)?;

        let lock = OpenOptions::new().read(true).write(true).create(true).truncate(false).open(lock_path(&path)).map_err(write_err)?;
        if let Err(e) = lock.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                return Err(StoreError::ResourceLocked { path: path.clone() });
            }
            return Err(write_err(e));
        }

        tracing::debug!(path = %path.display(), "day store opened");
        Ok(DayStore { path, lock })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every well-formed record; see [`read_records`].
    pub fn read_all(&self) -> Result<Vec<DayRecord>, StoreError> {
        read_records(&self.path)
    }

    /// Replaces the whole store with `records`, in the order given.
    ///
    /// The records are written to `<file>.tmp`, synced and renamed over the
    /// data file, so a reader never sees a half-written store.
    pub fn write_all(&self, records: &[DayRecord]) -> Result<(), StoreError> {
        let tmp = temp_path(&self.path);
        let write_err = |source: io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let file = File::create(&tmp).map_err(write_err)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(BufWriter::new(file));

        for record in records {
            wtr.write_record(&[
                record.formatted_date(),
                record.keyboard_presses.to_string(),
                record.left_clicks.to_string(),
                record.right_clicks.to_string(),
            ])
            .map_err(|e| write_err(e.into()))?;
        }

        let file = wtr
            .into_inner()
            .map_err(|e| write_err(e.into_error()))?
            .into_inner()
            .map_err(|e| write_err(e.into_error()))?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }

        tracing::debug!(path = %self.path.display(), records = records.len(), "day store written");
        Ok(())
    }
}

impl Drop for DayStore {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.lock);
    }
}

/// Reads all well-formed records from `path` without taking the lock.
///
/// Lines with the wrong field count, an unparseable date or an unparseable
/// counter are skipped with a warning. A missing file reads as empty.
pub fn read_records(path: &Path) -> Result<Vec<DayRecord>, StoreError> {
    let read_err = |source: io::Error| StoreError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(read_err(e)),
    };

    let mut rdr = csv::ReaderBuilder::new().has_headers(false).flexible(true).quoting(false).from_reader(file);

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(read_err(e.into())),
            Err(e) => {
                let skipped = StoreError::Malformed {
                    line: e.position().map(|p| p.line()).unwrap_or_default(),
                    reason: e.to_string(),
                };
                tracing::warn!("{}", skipped);
                continue;
            }
        };

        match parse_record(&row) {
            Ok(record) => records.push(record),
            Err(reason) => {
                let skipped = StoreError::Malformed {
                    line: row.position().map(|p| p.line()).unwrap_or_default(),
                    reason,
                };
                tracing::warn!("{}", skipped);
            }
        }
    }

    Ok(records)
}

/// Parses one `date,keyboard,left,right` row.
pub fn parse_record(row: &csv::StringRecord) -> Result<DayRecord, String> {
    if row.len() != FIELD_COUNT {
        return Err(format!("expected {} fields, found {}", FIELD_COUNT, row.len()));
    }

    let date = NaiveDate::parse_from_str(&row[0], DATE_FORMAT).map_err(|e| format!("invalid date '{}': {}", &row[0], e))?;
    let counter = |idx: usize| row[idx].parse::<u64>().map_err(|e| format!("invalid counter '{}': {}", &row[idx], e));

    Ok(DayRecord::with_counts(date, counter(1)?, counter(2)?, counter(3)?))
}

/// Sibling of `path` holding the exclusive lock: `<file>.lock`.
pub fn lock_path(path: &Path) -> PathBuf {
    sibling_path(path, ".lock")
}

/// Sibling of `path` that writes go through: `<file>.tmp`.
pub fn temp_path(path: &Path) -> PathBuf {
    sibling_path(path, ".tmp")
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
