//! Asset package file format
//!
//! A package is a flat archive of named blobs:
//!
//! ```text
//! [0..8)    magic "STG_PKG\0"
//! [8..12)   entry count, u32 LE
//! [12..20)  table offset, u64 LE
//! [20..)    blob bytes, back to back
//! table:    per entry: name length u16 LE, name bytes (UTF-8),
//!           blob offset u64 LE, blob size u64 LE
//! ```
//!
//! Blob offsets are absolute file positions, so entries can be read with a
//! single seek without touching the rest of the archive.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const MAGIC: [u8; 8] = *b"STG_PKG\0";

/// Fixed header size: magic + count + table offset.
const HEADER_LEN: u64 = 20;

#[derive(Debug)]
pub enum PackageError {
    Io(io::Error),
    /// The file does not start with the package magic.
    BadMagic,
    /// The file carries the magic but its table is inconsistent.
    Corrupt(String),
    /// No entry with the requested name.
    NotFound(String),
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageError::Io(e) => write!(f, "I/O error: {}", e),
            PackageError::BadMagic => write!(f, "not a package file"),
            PackageError::Corrupt(msg) => write!(f, "corrupt package: {}", msg),
            PackageError::NotFound(name) => write!(f, "no entry named '{}'", name),
        }
    }
}

impl std::error::Error for PackageError {}

impl From<io::Error> for PackageError {
    fn from(e: io::Error) -> Self {
        PackageError::Io(e)
    }
}

#[derive(Debug, Clone)]
pub struct PackageEntry {
    pub name: String,
    pub offset: u64,
    pub size: u64,
}

/// Write a package holding `entries` in the given order.
pub fn write_package(path: &Path, entries: &[(String, Vec<u8>)]) -> Result<(), PackageError> {
    for (name, _) in entries {
        // The table stores name lengths as u16; a longer name would
        // truncate silently and corrupt the table.
        if name.len() > u16::MAX as usize {
            return Err(PackageError::Corrupt(format!(
                "entry name of {} bytes exceeds the table limit",
                name.len()
            )));
        }
    }
    let blob_total: u64 = entries.iter().map(|(_, b)| b.len() as u64).sum();
    let table_offset = HEADER_LEN + blob_total;

    let mut file = File::create(path)?;
    file.write_all(&MAGIC)?;
    file.write_all(&(entries.len() as u32).to_le_bytes())?;
    file.write_all(&table_offset.to_le_bytes())?;

    for (_, bytes) in entries {
        file.write_all(bytes)?;
    }

    let mut offset = HEADER_LEN;
    for (name, bytes) in entries {
        file.write_all(&(name.len() as u16).to_le_bytes())?;
        file.write_all(name.as_bytes())?;
        file.write_all(&offset.to_le_bytes())?;
        file.write_all(&(bytes.len() as u64).to_le_bytes())?;
        offset += bytes.len() as u64;
    }
    file.flush()?;
    Ok(())
}

/// A parsed package table. Entry bytes stay on disk until fetched.
pub struct PackageIndex {
    path: PathBuf,
    entries: Vec<PackageEntry>,
}

impl PackageIndex {
    /// Read and validate the table of the package at `path`.
    pub fn open(path: &Path) -> Result<Self, PackageError> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();

        let mut magic = [0u8; 8];
        file.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(PackageError::BadMagic);
        }
        let count = read_u32(&mut file)?;
        let table_offset = read_u64(&mut file)?;
        if table_offset < HEADER_LEN || table_offset > len {
            return Err(PackageError::Corrupt(format!(
                "table offset {} outside file of {} bytes",
                table_offset, len
            )));
        }

        file.seek(SeekFrom::Start(table_offset))?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name_len = read_u16(&mut file)? as usize;
            let mut name = vec![0u8; name_len];
            file.read_exact(&mut name)?;
            let name = String::from_utf8(name)
                .map_err(|_| PackageError::Corrupt("entry name is not UTF-8".into()))?;
            let offset = read_u64(&mut file)?;
            let size = read_u64(&mut file)?;
            // Checked: a hostile table can hold offsets near u64::MAX.
            if offset.checked_add(size).map_or(true, |end| end > table_offset) {
                return Err(PackageError::Corrupt(format!(
                    "entry '{}' overlaps the table",
                    name
                )));
            }
            entries.push(PackageEntry { name, offset, size });
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&PackageEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Read one entry's bytes with a single seek.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, PackageError> {
        let entry = self
            .find(name)
            .ok_or_else(|| PackageError::NotFound(name.to_string()))?;
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(entry.offset))?;
        let mut bytes = vec![0u8; entry.size as usize];
        file.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

fn read_u16(r: &mut impl Read) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32(r: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(r: &mut impl Read) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
