//! Sequential, collision-free output path resolution

use crate::error::{OutputError, Result};
use crate::placeholders::expand_datetime;
use crate::sanitize::{sanitize_filename_prefix, sanitize_subfolder};
use chrono::{DateTime, Local, TimeZone};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use xz_core::SavedFileDescriptor;

/// Digits in the zero-padded sequence suffix
pub const SEQUENCE_WIDTH: usize = 5;

/// Highest sequence number that fits the suffix
pub const MAX_SEQUENCE: u32 = 99_999;

/// Resolve an output path in one call
///
/// See [`OutputResolver::resolve`].
pub fn resolve(
    output_root: &Path,
    subfolder: &str,
    filename_prefix: &str,
    extension: &str,
) -> Result<SavedFileDescriptor> {
    OutputResolver::new(output_root)?.resolve(subfolder, filename_prefix, extension)
}

/// Resolver bound to the host's output root
#[derive(Debug, Clone)]
pub struct OutputResolver {
    root: PathBuf,
}

impl OutputResolver {
    /// Create a resolver for an absolute output root
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_absolute() {
            return Err(OutputError::InvalidPath(format!(
                "output root {} must be absolute",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the next free path using the current local time
    ///
    /// # Arguments
    ///
    /// * `subfolder` - Single folder name (placeholders allowed), empty for the root
    /// * `filename_prefix` - Filename template (placeholders allowed)
    /// * `extension` - Extension with or without the leading dot
    ///
    /// Creates the subfolder (one level only) if it is missing. The returned
    /// number is the lowest one not already on disk; nothing is reserved.
    pub fn resolve(
        &self,
        subfolder: &str,
        filename_prefix: &str,
        extension: &str,
    ) -> Result<SavedFileDescriptor> {
        self.resolve_at(subfolder, filename_prefix, extension, &Local::now())
    }

    /// Same as [`resolve`](Self::resolve) with an explicit clock
    pub fn resolve_at<Tz: TimeZone>(
        &self,
        subfolder: &str,
        filename_prefix: &str,
        extension: &str,
        now: &DateTime<Tz>,
    ) -> Result<SavedFileDescriptor> {
        let prefix = sanitize_filename_prefix(&expand_datetime(filename_prefix, now))?;
        let subfolder = sanitize_subfolder(&expand_datetime(subfolder, now))?;
        let extension = normalize_extension(extension);

        let directory = self.prepare_directory(&subfolder)?;
        let used = scan_used_sequences(&directory, &prefix, &extension)?;
        let sequence_number =
            lowest_free_sequence(&used).ok_or_else(|| OutputError::SequenceExhausted {
                prefix: prefix.clone(),
                directory: directory.clone(),
            })?;

        let filename = format!(
            "{}_{:0width$}{}",
            prefix,
            sequence_number,
            extension,
            width = SEQUENCE_WIDTH
        );
        let relative_path = if subfolder.is_empty() {
            PathBuf::from(&filename)
        } else {
            Path::new(&subfolder).join(&filename)
        };

        debug!(
            directory = %directory.display(),
            sequence_number,
            taken = used.len(),
            "Resolved output path {}",
            relative_path.display()
        );

        Ok(SavedFileDescriptor {
            absolute_path: directory.join(&filename),
            relative_path,
            sequence_number,
            subfolder,
            filename,
        })
    }

    /// Create the single-level subfolder and check it stays inside the root
    fn prepare_directory(&self, subfolder: &str) -> Result<PathBuf> {
        if subfolder.is_empty() {
            let metadata =
                fs::metadata(&self.root).map_err(|e| OutputError::filesystem(&self.root, e))?;
            if !metadata.is_dir() {
                return Err(OutputError::filesystem(
                    &self.root,
                    std::io::Error::other("output root is not a directory"),
                ));
            }
            return Ok(self.root.clone());
        }

        let directory = self.root.join(subfolder);
        match fs::create_dir(&directory) {
            Ok(()) => debug!("Created output subfolder {}", directory.display()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(OutputError::filesystem(&directory, e)),
        }

        // A pre-existing symlink could still point elsewhere
        let canonical_root =
            fs::canonicalize(&self.root).map_err(|e| OutputError::filesystem(&self.root, e))?;
        let canonical_dir =
            fs::canonicalize(&directory).map_err(|e| OutputError::filesystem(&directory, e))?;
        if !canonical_dir.starts_with(&canonical_root) {
            return Err(OutputError::InvalidPath(format!(
                "subfolder '{}' resolves outside the output root",
                subfolder
            )));
        }

        Ok(directory)
    }
}

/// Leading dot enforced, empty stays empty
fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed.to_string()
    } else {
        format!(".{}", trimmed)
    }
}

/// Collect sequence numbers of entries named `{prefix}_{NNNNN}{extension}`
///
/// Matching ignores ASCII case, so case-insensitive filesystems never see a
/// clash.
fn scan_used_sequences(directory: &Path, prefix: &str, extension: &str) -> Result<HashSet<u32>> {
    let entries = fs::read_dir(directory).map_err(|e| OutputError::filesystem(directory, e))?;

    let head = format!("{}_", prefix).to_ascii_lowercase();
    let tail = extension.to_ascii_lowercase();
    let mut used = HashSet::new();

    for entry in entries {
        let entry = entry.map_err(|e| OutputError::filesystem(directory, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(sequence) = parse_sequence(&name.to_ascii_lowercase(), &head, &tail) {
            used.insert(sequence);
        }
    }

    Ok(used)
}

fn parse_sequence(name: &str, head: &str, tail: &str) -> Option<u32> {
    let digits = name.strip_prefix(head)?.strip_suffix(tail)?;
    if digits.len() != SEQUENCE_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn lowest_free_sequence(used: &HashSet<u32>) -> Option<u32> {
    (1..=MAX_SEQUENCE).find(|n| !used.contains(n))
}
