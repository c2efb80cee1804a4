//! Geodatabase discovery inside uploaded zip archives
//!
//! Archives come from many tools (ArcGIS, Windows Explorer, macOS Finder) and
//! the `.gdb` folder may be nested, renamed, or flattened. Discovery therefore
//! tries an ordered list of independent detectors and takes the first hit.

use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use pasargis_core::error::{IngestError, Result, MAX_DIAGNOSTIC_ITEMS};
use zip::result::ZipError;
use zip::ZipArchive;

/// Maximum directory depth searched below the extraction root
pub const MAX_SEARCH_DEPTH: usize = 5;

/// Number of directory levels included in the diagnostic listing
pub const MAX_LISTING_DEPTH: usize = 3;

/// File suffixes that only occur inside a File Geodatabase folder
pub const GDB_SIGNATURE_SUFFIXES: &[&str] = &[
    ".gdbtable",
    ".gdbtablx",
    ".gdbindexes",
    ".atx",
    ".freelist",
    ".lock",
    ".spx",
];

/// How a geodatabase folder was located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStrategy {
    /// A `<name>.gdb` component in the archive entry names
    EntryPath,
    /// A directory named `*.gdb` in the extracted tree
    RecursiveScan,
    /// A directory holding geodatabase signature files
    SignatureFiles,
}

impl fmt::Display for DetectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectionStrategy::EntryPath => "entry-path",
            DetectionStrategy::RecursiveScan => "recursive-scan",
            DetectionStrategy::SignatureFiles => "signature-files",
        };
        f.write_str(name)
    }
}

/// A located geodatabase folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GdbLocation {
    pub path: PathBuf,
    pub strategy: DetectionStrategy,
}

impl GdbLocation {
    /// Folder name of the geodatabase, e.g. `PasarRejomulyo.gdb`
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

type Detector = fn(&[String], &Path) -> Option<PathBuf>;

const DETECTORS: [(DetectionStrategy, Detector); 3] = [
    (DetectionStrategy::EntryPath, find_by_entry_path),
    (DetectionStrategy::RecursiveScan, find_by_folder_name),
    (DetectionStrategy::SignatureFiles, find_by_signature_files),
];

/// Open an archive, extract it into `extract_dir`, and locate the geodatabase.
///
/// When no detector matches, the error carries the first archive entries and a
/// listing of what was actually extracted.
pub fn inspect_archive(data: Vec<u8>, extract_dir: &Path) -> Result<GdbLocation> {
    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(|e| IngestError::ArchiveOpen {
        reason: e.to_string(),
    })?;

    let entries: Vec<String> = archive.file_names().map(str::to_string).collect();
    tracing::debug!(entry_count = entries.len(), "Read archive entries");

    archive.extract(extract_dir).map_err(|e| match e {
        ZipError::Io(io) => IngestError::Io(io),
        other => IngestError::ArchiveOpen {
            reason: format!("Failed to extract archive: {}", other),
        },
    })?;

    match locate_geodatabase(&entries, extract_dir) {
        Some(location) => Ok(location),
        None => {
            let extracted_items = list_extracted(extract_dir, MAX_DIAGNOSTIC_ITEMS);
            tracing::warn!(
                entry_count = entries.len(),
                extracted_count = extracted_items.len(),
                "No geodatabase folder found in archive"
            );
            Err(IngestError::GeodatabaseNotFound {
                zip_entries: entries.into_iter().take(MAX_DIAGNOSTIC_ITEMS).collect(),
                extracted_items,
            })
        }
    }
}

/// Try each detector in order against an extracted archive
pub fn locate_geodatabase(entries: &[String], root: &Path) -> Option<GdbLocation> {
    DETECTORS.iter().find_map(|(strategy, detect)| {
        let path = detect(entries, root)?;
        tracing::info!(strategy = %strategy, gdb_path = %path.display(), "Located geodatabase");
        Some(GdbLocation {
            path,
            strategy: *strategy,
        })
    })
}

/// Relative path of the first `<name>.gdb` component among archive entry names.
///
/// Both `/` and `\` separate components. Entries that climb out of the
/// archive root or sit in a macOS resource-fork tree are ignored.
pub fn gdb_entry_path(entries: &[String]) -> Option<PathBuf> {
    entries.iter().find_map(|entry| {
        let components: Vec<&str> = entry.split(['/', '\\']).collect();
        if components.iter().any(|c| is_resource_fork_name(c)) {
            return None;
        }
        let idx = components.iter().position(|c| is_gdb_name(c))?;

        let relative: PathBuf = components[..=idx].iter().filter(|c| !c.is_empty()).collect();
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        (!escapes).then_some(relative)
    })
}

fn find_by_entry_path(entries: &[String], root: &Path) -> Option<PathBuf> {
    let candidate = root.join(gdb_entry_path(entries)?);
    is_real_dir(&candidate).then_some(candidate)
}

fn find_by_folder_name(_entries: &[String], root: &Path) -> Option<PathBuf> {
    find_gdb_folder(root, 0)
}

fn find_by_signature_files(_entries: &[String], root: &Path) -> Option<PathBuf> {
    find_by_signature(root, 0)
}

/// Depth-first search for a directory whose own name ends in `.gdb`
pub fn find_gdb_folder(dir: &Path, depth: usize) -> Option<PathBuf> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }

    if dir.file_name().and_then(|n| n.to_str()).is_some_and(is_gdb_name) {
        return Some(dir.to_path_buf());
    }

    sorted_children(dir)
        .into_iter()
        .filter(|child| is_searchable_dir(child))
        .find_map(|child| find_gdb_folder(&child, depth + 1))
}

/// Depth-first search for a directory containing geodatabase signature files
pub fn find_by_signature(dir: &Path, depth: usize) -> Option<PathBuf> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }

    let children = sorted_children(dir);
    let has_signature = children.iter().any(|child| {
        child
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .is_some_and(|name| GDB_SIGNATURE_SUFFIXES.iter().any(|s| name.ends_with(s)))
    });

    if has_signature {
        return Some(dir.to_path_buf());
    }

    children
        .into_iter()
        .filter(|child| is_searchable_dir(child))
        .find_map(|child| find_by_signature(&child, depth + 1))
}

/// Depth-limited listing of an extracted tree, annotated with entry type.
///
/// Items look like `[DIR] Data` or `[FILE] Data/readme.txt`; at most `limit`
/// items are returned.
pub fn list_extracted(root: &Path, limit: usize) -> Vec<String> {
    let mut items = Vec::new();
    collect_listing(root, root, 0, limit, &mut items);
    items
}

fn collect_listing(dir: &Path, root: &Path, depth: usize, limit: usize, items: &mut Vec<String>) {
    if depth >= MAX_LISTING_DEPTH {
        return;
    }

    for child in sorted_children(dir) {
        if items.len() >= limit {
            return;
        }

        let is_dir = is_real_dir(&child);
        let kind = if is_dir { "[DIR]" } else { "[FILE]" };
        items.push(format!("{} {}", kind, relative_display(&child, root)));

        if is_dir {
            collect_listing(&child, root, depth + 1, limit, items);
        }
    }
}

fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_gdb_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".gdb")
}

/// `__MACOSX` trees hold AppleDouble copies of every file, `.gdb` names included
fn is_resource_fork_name(name: &str) -> bool {
    name.starts_with("__MACOSX")
}

fn is_searchable_dir(path: &Path) -> bool {
    let resource_fork = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(is_resource_fork_name);
    !resource_fork && is_real_dir(path)
}

/// Directory check that does not follow symlinks
fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

fn sorted_children(dir: &Path) -> Vec<PathBuf> {
    let mut children: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Cannot read directory");
            Vec::new()
        }
    };
    children.sort();
    children
}
