//! Asset batching
//!
//! Loose files are grouped by extension into per-extension packages
//! (`AssetPng.pkg`, `AssetJpg.pkg`, ...) so a shipped build reads a handful
//! of archives instead of the raw asset tree. At runtime a batch holds both
//! freshly registered bytes (not yet saved) and any number of opened package
//! indices; [`AssetBatch::fetch`] checks the pending set first, then every
//! index in load order.

pub mod package;

use std::path::Path;

use package::{write_package, PackageError, PackageIndex};

/// Package file name for one extension group, e.g. `AssetPng.pkg`.
fn package_name(ext: &str) -> String {
    let mut chars = ext.chars();
    let capitalized = match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    format!("Asset{}.pkg", capitalized)
}

fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[derive(Default)]
pub struct AssetBatch {
    /// Registered but not yet packaged; keyed by the full registration path.
    pending: Vec<(String, Vec<u8>)>,
    packages: Vec<PackageIndex>,
}

impl AssetBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a loose file into the batch under its own path as the entry
    /// name. Registering the same path twice keeps the first copy.
    pub fn register(&mut self, path: &str) -> Result<(), PackageError> {
        if self.pending.iter().any(|(name, _)| name == path) {
            return Ok(());
        }
        let bytes = std::fs::read(path)?;
        self.pending.push((path.to_string(), bytes));
        Ok(())
    }

    /// Write every pending asset into per-extension packages under
    /// `out_dir`, draining the pending set on success.
    pub fn save_all(&mut self, out_dir: &Path) -> Result<(), PackageError> {
        let mut exts: Vec<String> = self
            .pending
            .iter()
            .map(|(name, _)| extension_of(name))
            .collect();
        exts.sort();
        exts.dedup();

        for ext in exts {
            let group: Vec<(String, Vec<u8>)> = self
                .pending
                .iter()
                .filter(|(name, _)| extension_of(name) == ext)
                .cloned()
                .collect();
            write_package(&out_dir.join(package_name(&ext)), &group)?;
        }
        self.pending.clear();
        Ok(())
    }

    /// Open a package file and add its index to the batch.
    pub fn load_package(&mut self, path: &Path) -> Result<(), PackageError> {
        self.packages.push(PackageIndex::open(path)?);
        Ok(())
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Bytes for a named asset: pending registrations win over packages,
    /// packages are searched in the order they were loaded.
    pub fn fetch(&self, name: &str) -> Result<Vec<u8>, PackageError> {
        if let Some((_, bytes)) = self.pending.iter().find(|(n, _)| n == name) {
            return Ok(bytes.clone());
        }
        for package in &self.packages {
            if package.find(name).is_some() {
                return package.read(name);
            }
        }
        Err(PackageError::NotFound(name.to_string()))
    }
}
