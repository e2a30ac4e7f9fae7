//! The coverage aggregation tree.
//!
//! Files are grouped under directories keyed by path segment relative to the
//! configured root. Each directory owns its children by value; nothing points
//! back at a parent. Statement counts are rolled up once, post-order, right
//! after every file has been inserted, and the tree is read-only from then on.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{CovtreeError, Result};
use crate::model::{Block, Counts, FileBlocks};

/// Identifier of the tree root. Every other id is `root/<relative path>`.
pub const ROOT_ID: &str = "root";

fn node_id(relative_path: &str) -> String {
    if relative_path.is_empty() {
        ROOT_ID.to_string()
    } else {
        format!("{ROOT_ID}/{relative_path}")
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// A source file and its blocks, sorted by start line.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Path exactly as the profile reported it.
    pub path: String,
    /// Slash-separated path below the root.
    pub relative_path: String,
    pub name: String,
    pub id: String,
    pub blocks: Vec<Block>,
    pub counts: Counts,
}

impl SourceFile {
    fn new(path: String, relative_path: String, mut blocks: Vec<Block>) -> Self {
        blocks.sort_by_key(|b| (b.start_line, b.end_line));
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&relative_path)
            .to_string();
        Self {
            id: node_id(&relative_path),
            counts: Counts::from_blocks(&blocks),
            path,
            relative_path,
            name,
            blocks,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    /// Slash-separated path below the root; empty for the root itself.
    pub relative_path: String,
    pub name: String,
    pub id: String,
    pub dirs: Vec<Directory>,
    pub files: Vec<SourceFile>,
    pub counts: Counts,
}

impl Directory {
    fn new(name: String, relative_path: String) -> Self {
        Self {
            id: node_id(&relative_path),
            relative_path,
            name,
            dirs: Vec::new(),
            files: Vec::new(),
            counts: Counts::default(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.relative_path.is_empty()
    }

    /// Children in display order: directories first, then files.
    pub fn children(&self) -> impl Iterator<Item = Node<'_>> {
        self.dirs
            .iter()
            .map(Node::Directory)
            .chain(self.files.iter().map(Node::File))
    }

    /// Every file below this directory, depth first.
    pub fn walk_files(&self) -> Box<dyn Iterator<Item = &SourceFile> + '_> {
        Box::new(
            self.dirs
                .iter()
                .flat_map(|d| d.walk_files())
                .chain(self.files.iter()),
        )
    }

    fn subdir_mut(&mut self, name: &str, full_path: &str) -> Result<&mut Directory> {
        let idx = match self.dirs.iter().position(|d| d.name == name) {
            Some(idx) => idx,
            None => {
                if self.files.iter().any(|f| f.name == name) {
                    return Err(conflict(full_path));
                }
                let relative_path = child_path(&self.relative_path, name);
                self.dirs.push(Directory::new(name.to_string(), relative_path));
                self.dirs.len() - 1
            }
        };
        Ok(&mut self.dirs[idx])
    }

    /// Sort children and roll counts up from the leaves.
    fn aggregate(&mut self) -> Counts {
        self.dirs.sort_by(|a, b| a.name.cmp(&b.name));
        self.files.sort_by(|a, b| a.name.cmp(&b.name));

        let mut counts = Counts::default();
        for dir in &mut self.dirs {
            counts += dir.aggregate();
        }
        for file in &self.files {
            counts += file.counts;
        }
        self.counts = counts;
        counts
    }
}

fn conflict(path: &str) -> CovtreeError {
    CovtreeError::InvalidPath {
        path: path.to_string(),
        reason: "a file and a directory share this name".to_string(),
    }
}

/// A borrowed view of either kind of tree node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Directory(&'a Directory),
    File(&'a SourceFile),
}

impl<'a> Node<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            Node::Directory(d) => &d.id,
            Node::File(f) => &f.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            Node::Directory(d) => &d.name,
            Node::File(f) => &f.name,
        }
    }

    pub fn counts(&self) -> Counts {
        match self {
            Node::Directory(d) => d.counts,
            Node::File(f) => f.counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageTree {
    pub root: Directory,
}

impl CoverageTree {
    /// Group files into a directory hierarchy under `config.root` and
    /// aggregate statement counts.
    ///
    /// Files outside the root or matching an ignore fragment are dropped.
    /// Blocks reported more than once for the same path are merged.
    pub fn build<I>(config: &Config, files: I) -> Result<Self>
    where
        I: IntoIterator<Item = FileBlocks>,
    {
        config.validate()?;

        let mut grouped: BTreeMap<String, (String, Vec<Block>)> = BTreeMap::new();
        for FileBlocks { path, blocks } in files {
            let Some(relative) = relative_path(&config.root, &path)? else {
                debug!(path = %path, root = %config.root, "dropping file outside root");
                continue;
            };
            let ignored = config
                .ignores
                .iter()
                .find(|frag| path.contains(frag.as_str()) || relative.contains(frag.as_str()));
            if let Some(frag) = ignored {
                debug!(path = %path, ignore = %frag, "dropping ignored file");
                continue;
            }
            grouped
                .entry(relative)
                .or_insert_with(|| (path, Vec::new()))
                .1
                .extend(blocks);
        }

        let root_name = match normalize_root(&config.root) {
            "." => ROOT_ID.to_string(),
            other => other.to_string(),
        };
        let mut root = Directory::new(root_name, String::new());
        for (relative, (path, blocks)) in grouped {
            insert(&mut root, SourceFile::new(path, relative, blocks))?;
        }

        let totals = root.aggregate();
        info!(
            statements = totals.statements,
            covered = totals.covered,
            "aggregated coverage tree"
        );
        Ok(Self { root })
    }

    /// The node a report opens on: descend from the root while a directory
    /// holds no files and exactly one subdirectory.
    pub fn display_root(&self) -> &Directory {
        let mut dir = &self.root;
        while dir.files.is_empty() && dir.dirs.len() == 1 {
            dir = &dir.dirs[0];
        }
        dir
    }

    pub fn counts(&self) -> Counts {
        self.root.counts
    }

    /// Look up a file by its path relative to the root.
    pub fn find_file(&self, relative_path: &str) -> Option<&SourceFile> {
        self.root
            .walk_files()
            .find(|f| f.relative_path == relative_path)
    }
}

fn insert(root: &mut Directory, file: SourceFile) -> Result<()> {
    let mut dir = root;
    let mut segments: Vec<&str> = file.relative_path.split('/').collect();
    // relative paths always have at least one segment
    segments.pop();
    for segment in segments {
        let full_path = child_path(&dir.relative_path, segment);
        dir = dir.subdir_mut(segment, &full_path)?;
    }
    if dir.dirs.iter().any(|d| d.name == file.name) {
        return Err(conflict(&file.relative_path));
    }
    dir.files.push(file);
    Ok(())
}

/// Strip trailing slashes and leading `./` from a root. `/` becomes the empty
/// prefix; anything that reduces to nothing else becomes `.`.
fn normalize_root(root: &str) -> &str {
    let mut trimmed = root.trim_end_matches('/');
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest.trim_start_matches('/');
    }
    if trimmed.is_empty() && !root.starts_with('/') {
        "."
    } else {
        trimmed
    }
}

fn strip_dot_prefix(path: &str) -> &str {
    let mut path = path;
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path
}

/// Express `path` relative to `root` as slash-separated segments.
///
/// Returns `Ok(None)` when the path lies outside the root. A root of `.`
/// accepts every path. Paths that can't name a file (empty, trailing slash,
/// `..` segments, NUL bytes) fail with `InvalidPath`.
pub fn relative_path(root: &str, path: &str) -> Result<Option<String>> {
    let invalid = |reason: &str| CovtreeError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(invalid("empty path"));
    }
    if path.contains('\0') {
        return Err(invalid("contains a NUL byte"));
    }
    if path.ends_with('/') {
        return Err(invalid("names a directory, not a file"));
    }

    let rest = match normalize_root(root) {
        "." => path,
        prefix => match strip_dot_prefix(path)
            .strip_prefix(prefix)
            .and_then(|r| r.strip_prefix('/'))
        {
            Some(rest) => rest,
            None => return Ok(None),
        },
    };

    let mut segments = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(invalid("contains a '..' segment")),
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return Err(invalid("names a directory, not a file"));
    }
    Ok(Some(segments.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(start_line: u32, end_line: u32, statements: u32, count: u64) -> Block {
        Block {
            start_line,
            end_line,
            statements,
            count,
        }
    }

    fn config(root: &str) -> Config {
        Config {
            root: root.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_relative_path_dot_root() {
        assert_eq!(relative_path(".", "a/b.go").unwrap().as_deref(), Some("a/b.go"));
        assert_eq!(relative_path(".", "./a/b.go").unwrap().as_deref(), Some("a/b.go"));
        assert_eq!(
            relative_path(".", "/src/a/b.go").unwrap().as_deref(),
            Some("src/a/b.go")
        );
    }

    #[test]
    fn test_relative_path_prefix_root() {
        let root = "example.com/proj";
        assert_eq!(
            relative_path(root, "example.com/proj/pkg/f.go").unwrap().as_deref(),
            Some("pkg/f.go")
        );
        assert_eq!(
            relative_path("example.com/proj/", "example.com/proj/f.go").unwrap().as_deref(),
            Some("f.go")
        );
        // sibling that merely shares a prefix
        assert_eq!(relative_path(root, "example.com/project/f.go").unwrap(), None);
        assert_eq!(relative_path(root, "other.com/f.go").unwrap(), None);
    }

    #[test]
    fn test_relative_path_dot_prefixed_root() {
        assert_eq!(relative_path("./pkg", "pkg/a.go").unwrap().as_deref(), Some("a.go"));
        assert_eq!(relative_path("./pkg/", "./pkg/sub/a.go").unwrap().as_deref(), Some("sub/a.go"));
        assert_eq!(relative_path("./pkg", "other/a.go").unwrap(), None);
        assert_eq!(relative_path("./", "a.go").unwrap().as_deref(), Some("a.go"));
    }

    #[test]
    fn test_build_with_dot_prefixed_root() {
        let tree = CoverageTree::build(
            &config("./pkg"),
            vec![FileBlocks::new("pkg/a.go", vec![block(1, 1, 2, 1)])],
        )
        .unwrap();
        assert_eq!(tree.root.name, "pkg");
        assert_eq!(tree.counts(), Counts { statements: 2, covered: 2 });
    }

    #[test]
    fn test_build_ignores_fragment_naming_full_path() {
        let mut cfg = config("github.com/me/proj");
        cfg.ignores = vec!["github.com/me/proj/mocks".to_string()];
        let tree = CoverageTree::build(
            &cfg,
            vec![
                FileBlocks::new("github.com/me/proj/a.go", vec![block(1, 1, 1, 1)]),
                FileBlocks::new("github.com/me/proj/mocks/m.go", vec![block(1, 1, 5, 0)]),
            ],
        )
        .unwrap();
        assert!(tree.find_file("mocks/m.go").is_none());
        assert!(tree.root.dirs.is_empty());
        assert_eq!(tree.counts(), Counts { statements: 1, covered: 1 });
    }

    #[test]
    fn test_relative_path_absolute_root() {
        assert_eq!(relative_path("/", "/a/b.rs").unwrap().as_deref(), Some("a/b.rs"));
        assert_eq!(relative_path("/", "a/b.rs").unwrap(), None);
    }

    #[test]
    fn test_relative_path_malformed() {
        for path in ["", "a/", "a/../b.go", "a\0b"] {
            assert!(
                matches!(relative_path(".", path), Err(CovtreeError::InvalidPath { .. })),
                "expected InvalidPath for {path:?}"
            );
        }
        assert!(matches!(
            relative_path("example.com/proj", "example.com/proj/"),
            Err(CovtreeError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_build_groups_and_aggregates() {
        let tree = CoverageTree::build(
            &config("."),
            vec![
                FileBlocks::new("pkg/a.go", vec![block(1, 2, 2, 1), block(4, 4, 1, 0)]),
                FileBlocks::new("pkg/sub/b.go", vec![block(1, 1, 4, 0)]),
                FileBlocks::new("main.go", vec![block(1, 3, 3, 9)]),
            ],
        )
        .unwrap();

        let root = &tree.root;
        assert_eq!(root.id, ROOT_ID);
        assert_eq!(root.counts, Counts { statements: 10, covered: 5 });
        assert_eq!(root.dirs.len(), 1);
        assert_eq!(root.files.len(), 1);

        let pkg = &root.dirs[0];
        assert_eq!(pkg.id, "root/pkg");
        assert_eq!(pkg.counts, Counts { statements: 7, covered: 2 });
        assert_eq!(pkg.dirs[0].counts, Counts { statements: 4, covered: 0 });
        assert_eq!(pkg.dirs[0].files[0].id, "root/pkg/sub/b.go");
    }

    #[test]
    fn test_build_reuses_directories() {
        let tree = CoverageTree::build(
            &config("."),
            vec![
                FileBlocks::new("pkg/a.go", vec![]),
                FileBlocks::new("pkg/b.go", vec![]),
            ],
        )
        .unwrap();
        assert_eq!(tree.root.dirs.len(), 1);
        assert_eq!(tree.root.dirs[0].files.len(), 2);
    }

    #[test]
    fn test_build_orders_dirs_before_files() {
        let tree = CoverageTree::build(
            &config("."),
            vec![
                FileBlocks::new("z.go", vec![]),
                FileBlocks::new("b/x.go", vec![]),
                FileBlocks::new("a.go", vec![]),
                FileBlocks::new("a/x.go", vec![]),
            ],
        )
        .unwrap();
        let names: Vec<&str> = tree.root.children().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a", "b", "a.go", "z.go"]);
    }

    #[test]
    fn test_build_drops_ignored_and_out_of_root() {
        let mut cfg = config("example.com/proj");
        cfg.ignores = vec!["mocks".to_string()];
        let tree = CoverageTree::build(
            &cfg,
            vec![
                FileBlocks::new("example.com/proj/a.go", vec![block(1, 1, 1, 1)]),
                FileBlocks::new("example.com/proj/mocks/m.go", vec![block(1, 1, 5, 0)]),
                FileBlocks::new("example.com/other/o.go", vec![block(1, 1, 5, 0)]),
            ],
        )
        .unwrap();
        assert_eq!(tree.counts(), Counts { statements: 1, covered: 1 });
        assert!(tree.root.dirs.is_empty());
        assert_eq!(tree.root.name, "example.com/proj");
        assert!(tree.find_file("mocks/m.go").is_none());
    }

    #[test]
    fn test_build_merges_duplicate_paths_and_sorts_blocks() {
        let tree = CoverageTree::build(
            &config("."),
            vec![
                FileBlocks::new("a.go", vec![block(5, 6, 1, 0)]),
                FileBlocks::new("./a.go", vec![block(1, 2, 1, 3)]),
            ],
        )
        .unwrap();
        let file = tree.find_file("a.go").unwrap();
        assert_eq!(file.blocks, vec![block(1, 2, 1, 3), block(5, 6, 1, 0)]);
        assert_eq!(file.counts, Counts { statements: 2, covered: 1 });
    }

    #[test]
    fn test_build_rejects_malformed_path() {
        let result = CoverageTree::build(&config("."), vec![FileBlocks::new("a/../b.go", vec![])]);
        assert!(matches!(result, Err(CovtreeError::InvalidPath { .. })));
    }

    #[test]
    fn test_build_rejects_file_directory_clash() {
        let result = CoverageTree::build(
            &config("."),
            vec![
                FileBlocks::new("a/b", vec![]),
                FileBlocks::new("a/b/c.go", vec![]),
            ],
        );
        assert!(matches!(result, Err(CovtreeError::InvalidPath { .. })));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut cfg = config(".");
        cfg.cutlines.warning = 90.0;
        let result = CoverageTree::build(&cfg, Vec::new());
        assert!(matches!(result, Err(CovtreeError::ConfigurationInvalid(_))));
    }

    #[test]
    fn test_display_root_collapses_single_dir_chain() {
        let tree = CoverageTree::build(
            &config("."),
            vec![
                FileBlocks::new("pkg/a.go", vec![]),
                FileBlocks::new("pkg/b.go", vec![]),
            ],
        )
        .unwrap();
        assert_eq!(tree.display_root().id, "root/pkg");
    }

    #[test]
    fn test_display_root_stops_at_branch() {
        let tree = CoverageTree::build(
            &config("."),
            vec![
                FileBlocks::new("github.com/u/p/a/x.go", vec![]),
                FileBlocks::new("github.com/u/p/b/y.go", vec![]),
            ],
        )
        .unwrap();
        assert_eq!(tree.display_root().relative_path, "github.com/u/p");
    }

    #[test]
    fn test_display_root_stays_when_root_has_files() {
        let tree = CoverageTree::build(
            &config("."),
            vec![
                FileBlocks::new("main.go", vec![]),
                FileBlocks::new("pkg/b.go", vec![]),
            ],
        )
        .unwrap();
        assert!(tree.display_root().is_root());
    }

    #[test]
    fn test_empty_tree() {
        let tree = CoverageTree::build(&config("."), Vec::new()).unwrap();
        assert!(tree.display_root().is_root());
        assert_eq!(tree.counts().percentage(), 0.0);
    }
}
