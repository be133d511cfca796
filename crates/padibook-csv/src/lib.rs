//! CSV file backend for padibook.
//!
//! Each resource is one CSV file under the data directory. Tenant records
//! live in `users/<tenant>/`; per-user files from older versions
//! (`jurnal_<user>.csv` next to the shared files) are read when a tenant
//! has no file of its own yet.

use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use padibook_core::{
    storage::check_records, Record, RecordStore, Resource, StorageError, TenantKey,
};

mod rows;

const TENANT_DIR: &str = "users";

pub struct CsvStore {
    root: PathBuf,
}

fn file_stem(resource: Resource) -> &'static str {
    match resource {
        Resource::IncomeTransactions => "pemasukan",
        Resource::ExpenseTransactions => "pengeluaran",
        Resource::Journal => "jurnal",
        Resource::Credentials => "akun",
    }
}

fn csv_error(e: csv::Error) -> StorageError {
    StorageError::Csv(e.to_string())
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, resource: Resource, tenant: Option<&TenantKey>) -> PathBuf {
        let file = format!("{}.csv", file_stem(resource));
        match tenant {
            Some(t) => self.root.join(TENANT_DIR).join(t.as_str()).join(file),
            None => self.root.join(file),
        }
    }

    /// Per-user file written by older versions, e.g. `jurnal_budi.csv`.
    pub fn legacy_path_for(&self, resource: Resource, tenant: Option<&TenantKey>) -> Option<PathBuf> {
        tenant.map(|t| self.root.join(format!("{}_{}.csv", file_stem(resource), t)))
    }

    /// The file to read from: the tenant's own file, else its legacy file.
    fn source_for(&self, resource: Resource, tenant: Option<&TenantKey>) -> Option<PathBuf> {
        let path = self.path_for(resource, tenant);
        if path.exists() {
            return Some(path);
        }
        self.legacy_path_for(resource, tenant).filter(|p| p.is_file())
    }

    /// Decodes every row it can; returns the records and the number of rows skipped.
    fn read_all(path: &Path, resource: Resource) -> Result<(Vec<Record>, usize), csv::Error> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::Headers)
            .from_path(path)?;
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        let mut skipped = 0;
        for (i, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(path = %path.display(), row = i + 1, error = %e, "Skipping unreadable row");
                    skipped += 1;
                    continue;
                }
            };
            match rows::decode(resource, &row, &headers) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), row = i + 1, error = %e, "Skipping malformed row");
                    skipped += 1;
                }
            }
        }
        Ok((records, skipped))
    }

    /// True when the file starts with the current headers.
    fn has_current_layout(path: &Path, resource: Resource) -> Result<bool, StorageError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::Headers)
            .from_path(path)
            .map_err(csv_error)?;
        let headers = reader.headers().map_err(csv_error)?;
        Ok(*headers == StringRecord::from(rows::headers(resource).to_vec()))
    }

    fn write_file(path: &Path, records: &[Record]) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = WriterBuilder::new().from_writer(File::create(path)?);
        for record in records {
            rows::encode(&mut writer, record).map_err(csv_error)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn append_rows(path: &Path, records: &[Record], with_headers: bool) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = WriterBuilder::new().has_headers(with_headers).from_writer(file);
        for record in records {
            rows::encode(&mut writer, record).map_err(csv_error)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Copies `path` to the first free `<file>.bak`, `<file>.bak.1`, ...
    fn backup(path: &Path) -> Result<PathBuf, StorageError> {
        let mut backup = path.with_extension("csv.bak");
        let mut n = 1;
        while backup.exists() {
            backup = path.with_extension(format!("csv.bak.{}", n));
            n += 1;
        }
        fs::copy(path, &backup)?;
        Ok(backup)
    }

    /// Rewrites the records of an older-layout `source` into `target` in the
    /// current layout, followed by `records`. Refuses when any row of
    /// `source` cannot be decoded, since rewriting would drop it. When
    /// `source` is rewritten in place a backup of it is kept first.
    fn migrate(source: &Path, target: &Path, records: &[Record], resource: Resource) -> Result<(), StorageError> {
        let (mut all, skipped) = Self::read_all(source, resource).map_err(csv_error)?;
        if skipped > 0 {
            return Err(StorageError::UnreadableRows {
                path: source.display().to_string(),
                rows: skipped,
            });
        }

        if source == target {
            let backup = Self::backup(source)?;
            tracing::info!(path = %source.display(), backup = %backup.display(), "Backed up resource before migration");
        }
        tracing::info!(
            from = %source.display(),
            to = %target.display(),
            %resource,
            count = all.len(),
            "Migrating resource to current layout"
        );

        all.extend_from_slice(records);
        Self::write_file(target, &all)
    }
}

impl RecordStore for CsvStore {
    fn load(&self, resource: Resource, tenant: Option<&TenantKey>) -> Result<Vec<Record>, StorageError> {
        let path = match self.source_for(resource, tenant) {
            Some(path) => path,
            None => {
                tracing::debug!(path = %self.path_for(resource, tenant).display(), %resource, "Resource not found, treating as empty");
                return Ok(Vec::new());
            }
        };

        match Self::read_all(&path, resource) {
            Ok((records, _)) => {
                tracing::debug!(path = %path.display(), %resource, count = records.len(), "Loaded records");
                Ok(records)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), %resource, error = %e, "Unreadable resource, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn append(&self, records: &[Record], resource: Resource, tenant: Option<&TenantKey>) -> Result<(), StorageError> {
        check_records(records, resource)?;
        if records.is_empty() {
            return Ok(());
        }

        let path = self.path_for(resource, tenant);
        let non_empty = fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);

        if non_empty {
            if Self::has_current_layout(&path, resource)? {
                Self::append_rows(&path, records, false)?;
            } else {
                Self::migrate(&path, &path, records, resource)?;
            }
        } else {
            match self.legacy_path_for(resource, tenant).filter(|p| p.is_file()) {
                // The legacy file is left as it is.
                Some(legacy) => Self::migrate(&legacy, &path, records, resource)?,
                None => Self::append_rows(&path, records, true)?,
            }
        }

        tracing::debug!(path = %path.display(), %resource, count = records.len(), "Appended records");
        Ok(())
    }

    fn save(&self, records: &[Record], resource: Resource, tenant: Option<&TenantKey>) -> Result<(), StorageError> {
        check_records(records, resource)?;
        let path = self.path_for(resource, tenant);
        Self::write_file(&path, records)?;
        tracing::debug!(path = %path.display(), %resource, count = records.len(), "Saved records");
        Ok(())
    }
}
