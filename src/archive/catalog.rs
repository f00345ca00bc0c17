use crate::error::{ProcessingError, Result};
use crate::utils::constants::{CSV_EXTENSION, GZIP_EXTENSION};
use crate::utils::filename::parse_source_month;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One local source file, as handed over by the retrieval step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub month: Option<(i32, u32)>,
    pub compressed: bool,
}

impl SourceFile {
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let compressed = file_name.ends_with(&format!(".{}.{}", CSV_EXTENSION, GZIP_EXTENSION));
        if !compressed && !file_name.ends_with(&format!(".{}", CSV_EXTENSION)) {
            return None;
        }
        let month = parse_source_month(file_name);

        Some(Self {
            path,
            month,
            compressed,
        })
    }
}

/// The set of SYNOP files found in a directory.
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    files: Vec<SourceFile>,
}

impl SourceCatalog {
    /// Scan `dir_path` for `.csv` and `.csv.gz` files whose name contains `file_pattern`.
    ///
    /// Files are ordered by month, then by path; files without a month come last.
    pub fn scan(dir_path: &Path, file_pattern: Option<&str>) -> Result<Self> {
        if !dir_path.is_dir() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Path is not a directory: {}",
                dir_path.display()
            )));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir_path)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            if let Some(pattern) = file_pattern.filter(|p| !p.is_empty()) {
                let matches = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.contains(pattern));
                if !matches {
                    continue;
                }
            }

            match SourceFile::from_path(path) {
                Some(source) => files.push(source),
                None => debug!("Ignoring non-CSV entry in {}", dir_path.display()),
            }
        }

        files.sort_by(|a, b| {
            a.month
                .is_none()
                .cmp(&b.month.is_none())
                .then_with(|| a.month.cmp(&b.month))
                .then_with(|| a.path.cmp(&b.path))
        });

        Ok(Self { files })
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn by_month(&self) -> BTreeMap<(i32, u32), Vec<&SourceFile>> {
        let mut months: BTreeMap<(i32, u32), Vec<&SourceFile>> = BTreeMap::new();
        for file in &self.files {
            if let Some(month) = file.month {
                months.entry(month).or_default().push(file);
            }
        }
        months
    }

    pub fn display_summary(&self) -> String {
        let months = self.by_month();
        let mut summary = format!("Source files: {}\n", self.files.len());

        if let (Some(first), Some(last)) = (months.keys().next(), months.keys().next_back()) {
            summary.push_str(&format!(
                "  Months: {} ({:04}-{:02} to {:04}-{:02})\n",
                months.len(),
                first.0,
                first.1,
                last.0,
                last.1
            ));
        }

        let compressed = self.files.iter().filter(|f| f.compressed).count();
        summary.push_str(&format!("  Compressed: {}\n", compressed));
        summary
    }
}
