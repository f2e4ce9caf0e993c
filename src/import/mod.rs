use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ImportError, Result};
use crate::models::WorkoutImport;

pub mod fit;

/// Trait for importing activity data from different file formats
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Import one activity from the file
    fn import_file(&self, file_path: &Path) -> Result<WorkoutImport>;

    /// Get the format name for this importer
    fn format_name(&self) -> &'static str;
}

/// Manager for coordinating the available import formats
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn ImportFormat>> = vec![Box::new(fit::FitImporter::new())];
        Self { importers }
    }

    /// Import a single file, auto-detecting the format
    pub fn import_file(&self, file_path: &Path) -> Result<WorkoutImport> {
        for importer in &self.importers {
            if importer.can_import(file_path) {
                info!(
                    file = %file_path.display(),
                    format = importer.format_name(),
                    "importing activity"
                );
                return importer.import_file(file_path);
            }
        }

        Err(ImportError::UnsupportedFormat {
            path: file_path.to_path_buf(),
        })
    }

    /// Import all files from a directory. Files that fail to import are
    /// reported and skipped; the rest still come back.
    pub fn import_directory(&self, dir_path: &Path) -> Result<Vec<(PathBuf, WorkoutImport)>> {
        let files = self.collect_importable_files(dir_path)?;
        let mut imports = Vec::new();

        if files.is_empty() {
            return Ok(imports);
        }

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({msg})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        for file_path in files {
            pb.set_message(format!(
                "Processing {}",
                file_path.file_name().unwrap_or_default().to_string_lossy()
            ));

            match self.import_file(&file_path) {
                Ok(import) => {
                    pb.println(format!(
                        "✓ Imported {} ({} intervals, {} warnings)",
                        file_path.file_name().unwrap_or_default().to_string_lossy(),
                        import.intervals.len(),
                        import.warnings.len()
                    ));
                    imports.push((file_path, import));
                }
                Err(e) => {
                    pb.println(format!(
                        "✗ Failed to import {}: {}",
                        file_path.file_name().unwrap_or_default().to_string_lossy(),
                        e.user_message()
                    ));
                }
            }

            pb.inc(1);
        }

        pb.finish_with_message("Import complete");
        Ok(imports)
    }

    /// Collect all files that can be imported from a directory
    fn collect_importable_files(&self, dir_path: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if !dir_path.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a directory: {}", dir_path.display()),
            )
            .into());
        }

        for entry in std::fs::read_dir(dir_path)? {
            let path = entry?.path();
            if path.is_file() && self.can_import_file(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Check if any registered importer handles the given file
    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers
            .iter()
            .any(|importer| importer.can_import(file_path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}
