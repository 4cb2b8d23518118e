//! Directory listing for filename completion.
//!
//! The completion engine never touches the filesystem directly. It asks a
//! [`DirLister`] for the sorted names in a directory that start with a
//! prefix. [`StdDirLister`] reads the host filesystem; [`MemoryDir`] keeps a
//! tree in memory for tests and embedded shells.

mod memory;

use std::path::Path;

use cmdsh_types::error::Result;

pub use memory::MemoryDir;

/// Source of directory entries for completion.
pub trait DirLister {
    /// Names in `dir` starting with `prefix` (case-sensitive), sorted.
    ///
    /// An empty prefix lists every entry. The result may be empty.
    fn list_entries(&self, prefix: &str, dir: &Path) -> Result<Vec<String>>;
}

/// Lists entries from the host filesystem with `std::fs::read_dir`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDirLister;

impl DirLister for StdDirLister {
    fn list_entries(&self, prefix: &str, dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let name = entry?.file_name();
            // Names that are not valid UTF-8 can't be typed back into the buffer.
            let Some(name) = name.to_str() else {
                log::debug!("skipping non UTF-8 entry in {}", dir.display());
                continue;
            };
            if name.starts_with(prefix) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
