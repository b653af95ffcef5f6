// src/source.rs
//! Enumeration of the device logs making up one acquisition batch

use crate::error::{MergeError, Result};
use std::{
    cmp::Ordering,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};
use tracing::warn;
use zip::ZipArchive;

/// An ordered collection of named byte streams
pub trait LogSource {
    /// Human readable description, used in progress output
    fn label(&self) -> String;

    /// Names of all file entries, in natural order
    fn entry_names(&mut self) -> Result<Vec<String>>;

    /// Open one entry for reading
    fn open(&mut self, name: &str) -> Result<Box<dyn Read + '_>>;
}

/// A batch delivered as a zip archive, read in place
pub struct ArchiveSource {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
}

impl ArchiveSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(BufReader::new(file))?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }
}

impl LogSource for ArchiveSource {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn entry_names(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(self.archive.len());
        for i in 0..self.archive.len() {
            let entry = self.archive.by_index(i)?;
            if !entry.is_dir() {
                names.push(entry.name().to_string());
            }
        }
        sort_natural(&mut names);
        Ok(names)
    }

    fn open(&mut self, name: &str) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.archive.by_name(name)?))
    }
}

/// A batch delivered as a plain folder of logs
pub struct FolderSource {
    root: PathBuf,
}

impl FolderSource {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl LogSource for FolderSource {
    fn label(&self) -> String {
        self.root.display().to_string()
    }

    fn entry_names(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => warn!(name = ?name, folder = %self.root.display(), "skipping non-UTF-8 file name"),
            }
        }
        sort_natural(&mut names);
        Ok(names)
    }

    fn open(&mut self, name: &str) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(self.root.join(name))?))
    }
}

/// Open a batch path as an archive (`*.zip`) or a folder
pub fn open_batch(path: &Path) -> Result<Box<dyn LogSource>> {
    if !path.exists() {
        return Err(MergeError::InputNotFound(path.to_path_buf()));
    }

    if is_archive(path) {
        Ok(Box::new(ArchiveSource::open(path)?))
    } else if path.is_dir() {
        Ok(Box::new(FolderSource::new(path)))
    } else {
        Err(MergeError::Other(format!(
            "{} is neither a zip archive nor a folder",
            path.display()
        )))
    }
}

pub fn is_archive(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".zip")
}

/// Final path component up to its first `.`, e.g. `ACQU_01` for `raw/ACQU_01.zip`
pub fn batch_base_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((base, _)) => base.to_string(),
        None => name,
    }
}

/// Last `/`-separated component of an entry name
pub fn entry_file_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

pub fn sort_natural(names: &mut [String]) {
    names.sort_by(|a, b| natural_cmp(a, b));
}

/// Compare names so that embedded numbers order by value (`2` before `10`)
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut x, mut y) = (a.as_bytes(), b.as_bytes());

    while !x.is_empty() && !y.is_empty() {
        let (chunk_x, rest_x) = take_chunk(x);
        let (chunk_y, rest_y) = take_chunk(y);

        let ord = if chunk_x[0].is_ascii_digit() && chunk_y[0].is_ascii_digit() {
            compare_digits(chunk_x, chunk_y)
        } else {
            chunk_x.cmp(chunk_y)
        };
        if ord != Ordering::Equal {
            return ord;
        }

        x = rest_x;
        y = rest_y;
    }

    x.len().cmp(&y.len()).then_with(|| a.cmp(b))
}

/// Split off a leading run of digits or of non-digits
fn take_chunk(s: &[u8]) -> (&[u8], &[u8]) {
    let digit = s[0].is_ascii_digit();
    let end = s
        .iter()
        .position(|b| b.is_ascii_digit() != digit)
        .unwrap_or(s.len());
    s.split_at(end)
}

fn compare_digits(a: &[u8], b: &[u8]) -> Ordering {
    let strip = |s: &[u8]| -> usize { s.iter().take_while(|b| **b == b'0').count() };
    let a = &a[strip(a)..];
    let b = &b[strip(b)..];
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
