//! In-memory directory tree.
//!
//! Useful for unit tests and for shells that complete against a virtual
//! namespace. The tree lives in a `BTreeMap<String, Node>` keyed by
//! normalized absolute paths, so a range scan over `"{dir}/"` yields the
//! children already in sorted order.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use cmdsh_types::error::Result;

use crate::DirLister;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    File,
    Dir,
}

/// A fully in-memory directory tree.
#[derive(Debug)]
pub struct MemoryDir {
    nodes: BTreeMap<String, Node>,
}

impl MemoryDir {
    /// Create a tree with only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir);
        Self { nodes }
    }

    /// Build a tree whose root holds the given files.
    pub fn with_files<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut dir = Self::new();
        for name in names {
            dir.add_file(name);
        }
        dir
    }

    /// Add a file, creating missing parent directories.
    pub fn add_file(&mut self, path: &str) {
        let path = normalize(path);
        let par = parent(&path).to_string();
        self.mkdir(&par);
        self.nodes.insert(path.into_owned(), Node::File);
    }

    /// Create a directory and any missing parents. Existing paths are kept.
    pub fn mkdir(&mut self, path: &str) {
        let path = normalize(path);
        if self.nodes.contains_key(path.as_ref()) {
            return;
        }
        let par = parent(&path).to_string();
        if par != path.as_ref() {
            self.mkdir(&par);
        }
        self.nodes.insert(path.into_owned(), Node::Dir);
    }

    /// Whether a path exists in the tree.
    pub fn exists(&self, path: &str) -> bool {
        self.nodes.contains_key(normalize(path).as_ref())
    }
}

impl Default for MemoryDir {
    fn default() -> Self {
        Self::new()
    }
}

impl DirLister for MemoryDir {
    fn list_entries(&self, prefix: &str, dir: &Path) -> Result<Vec<String>> {
        let dir = dir.to_string_lossy();
        // "." and "" name the root of the tree.
        let dir = match dir.as_ref() {
            "" | "." | "./" => Cow::Borrowed("/"),
            _ => normalize(&dir).into_owned().into(),
        };
        match self.nodes.get(dir.as_ref()) {
            Some(Node::Dir) => {},
            Some(Node::File) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("not a directory: {dir}"),
                )
                .into());
            },
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such directory: {dir}"),
                )
                .into());
            },
        }

        let scan = if dir.as_ref() == "/" {
            "/".to_string()
        } else {
            format!("{dir}/")
        };
        let mut names = Vec::new();
        for key in self.nodes.range(scan.clone()..).map(|(k, _)| k) {
            if !key.starts_with(&scan) {
                break;
            }
            // Direct children only.
            let rest = &key[scan.len()..];
            if !rest.is_empty() && !rest.contains('/') && rest.starts_with(prefix) {
                names.push(rest.to_string());
            }
        }
        Ok(names)
    }
}

/// Normalize a path: leading `/`, no `//`, no trailing `/` except root.
fn normalize(path: &str) -> Cow<'_, str> {
    let already = path.starts_with('/')
        && !path.contains("//")
        && (path.len() == 1 || !path.ends_with('/'));
    if already {
        return Cow::Borrowed(path);
    }
    let mut result = String::with_capacity(path.len() + 1);
    result.push('/');
    for part in path.split('/').filter(|p| !p.is_empty()) {
        if !result.ends_with('/') {
            result.push('/');
        }
        result.push_str(part);
    }
    Cow::Owned(result)
}

/// Parent of a normalized path.
fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(dir: &MemoryDir, prefix: &str) -> Vec<String> {
        dir.list_entries(prefix, Path::new(".")).unwrap()
    }

    #[test]
    fn root_exists() {
        assert!(MemoryDir::new().exists("/"));
    }

    #[test]
    fn lists_root_sorted() {
        let dir = MemoryDir::with_files(["mydb", "Makefile", "bin"]);
        assert_eq!(names(&dir, ""), vec!["Makefile", "bin", "mydb"]);
    }

    #[test]
    fn prefix_filter() {
        let dir = MemoryDir::with_files(["Makefile", "MustExist.txt", "MustRemove.txt", "mydb"]);
        assert_eq!(
            names(&dir, "Mu"),
            vec!["MustExist.txt", "MustRemove.txt"]
        );
    }

    #[test]
    fn only_direct_children() {
        let mut dir = MemoryDir::new();
        dir.add_file("/dofiles/do1");
        dir.add_file("/top");
        assert_eq!(names(&dir, ""), vec!["dofiles", "top"]);
        let nested = dir.list_entries("", Path::new("/dofiles")).unwrap();
        assert_eq!(nested, vec!["do1"]);
    }

    #[test]
    fn sibling_with_shared_prefix_not_listed() {
        let mut dir = MemoryDir::new();
        dir.add_file("/a/x");
        dir.add_file("/ab/y");
        let listed = dir.list_entries("", Path::new("/a")).unwrap();
        assert_eq!(listed, vec!["x"]);
    }

    #[test]
    fn listing_a_file_fails() {
        let dir = MemoryDir::with_files(["mydb"]);
        assert!(dir.list_entries("", Path::new("/mydb")).is_err());
    }

    #[test]
    fn listing_missing_dir_fails() {
        let dir = MemoryDir::new();
        assert!(dir.list_entries("", Path::new("/nope")).is_err());
    }

    #[test]
    fn normalize_collapses() {
        assert_eq!(normalize("a//b/"), "/a/b");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalize_is_idempotent(path in "[/a-z0-9_.]{1,50}") {
                let once = normalize(&path);
                let twice = normalize(&once);
                prop_assert_eq!(&once, &twice);
            }

            #[test]
            fn listing_is_sorted(files in proptest::collection::btree_set("[A-Za-z0-9_.]{1,10}", 0..20)) {
                let dir = MemoryDir::with_files(files.iter().map(String::as_str));
                let listed = names(&dir, "");
                let mut sorted = listed.clone();
                sorted.sort();
                prop_assert_eq!(&listed, &sorted);
                prop_assert_eq!(listed.len(), files.len());
            }
        }
    }
}
