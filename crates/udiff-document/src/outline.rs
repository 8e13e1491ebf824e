//! Outline notification for discovered file entries.
//!
//! The annotation engine emits one "file path discovered" event per
//! completed file header pair. Consumers implement [`OutlineSink`]; the
//! bundled [`OutlineTree`] builds a `/`-segmented tree suitable for a file
//! outline widget.

/// Receives file-discovery events from a parse session.
///
/// `start_batch`/`end_batch` bracket one full parse pass so an
/// implementation can defer structural-change notifications until the
/// batch completes.
pub trait OutlineSink {
    fn start_batch(&mut self);

    /// Adds a discovered file path. Idempotent; called in document order.
    fn add_path(&mut self, path: &str);

    fn end_batch(&mut self);
}

/// Sink that ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutline;

impl OutlineSink for NullOutline {
    fn start_batch(&mut self) {}
    fn add_path(&mut self, _path: &str) {}
    fn end_batch(&mut self) {}
}

/// A node of the outline tree. Leaves are files, inner nodes directories.
#[derive(Debug, Clone)]
pub struct OutlineNode {
    pub name: String,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }
}

/// File outline built from discovered paths.
///
/// Paths are `/`-segmented; repeated additions are no-ops and sibling
/// insertion order is preserved (no sorting — the outline mirrors document
/// order). During a batch, structural-change accounting is deferred:
/// `revision` bumps once at `end_batch` instead of per insertion.
#[derive(Debug)]
pub struct OutlineTree {
    root: OutlineNode,
    loading: bool,
    revision: u64,
}

impl OutlineTree {
    pub fn new() -> Self {
        Self {
            root: OutlineNode::new(""),
            loading: false,
            revision: 0,
        }
    }

    pub fn root(&self) -> &OutlineNode {
        &self.root
    }

    /// Monotonic counter of structural changes, for change detection by a
    /// view layer.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// All file paths in insertion order.
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_paths(&self.root, String::new(), &mut paths);
        paths
    }

    pub fn contains(&self, path: &str) -> bool {
        let mut node = &self.root;
        for segment in path.split('/').filter(|s| !s.trim().is_empty()) {
            match node.children.iter().find(|c| c.name == segment) {
                Some(child) => node = child,
                None => return false,
            }
        }
        true
    }
}

impl Default for OutlineTree {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineSink for OutlineTree {
    fn start_batch(&mut self) {
        self.loading = true;
    }

    fn add_path(&mut self, path: &str) {
        let mut node = &mut self.root;
        let mut inserted = false;
        for segment in path.split('/').filter(|s| !s.trim().is_empty()) {
            let position = node.children.iter().position(|c| c.name == segment);
            let index = match position {
                Some(index) => index,
                None => {
                    node.children.push(OutlineNode::new(segment));
                    inserted = true;
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }
        if inserted && !self.loading {
            self.revision += 1;
        }
    }

    fn end_batch(&mut self) {
        if self.loading {
            self.loading = false;
            self.revision += 1;
        }
    }
}

fn collect_paths(node: &OutlineNode, prefix: String, paths: &mut Vec<String>) {
    for child in &node.children {
        let path = if prefix.is_empty() {
            child.name.clone()
        } else {
            format!("{}/{}", prefix, child.name)
        };
        if child.children.is_empty() {
            paths.push(path);
        } else {
            collect_paths(child, path, paths);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insertion_order_preserved() {
        let mut tree = OutlineTree::new();
        tree.add_path("src/zeta.rs");
        tree.add_path("src/alpha.rs");
        tree.add_path("README.md");
        assert_eq!(
            tree.paths(),
            vec!["src/zeta.rs", "src/alpha.rs", "README.md"]
        );
    }

    #[test]
    fn test_add_path_is_idempotent() {
        let mut tree = OutlineTree::new();
        tree.add_path("src/main.rs");
        tree.add_path("src/main.rs");
        assert_eq!(tree.paths(), vec!["src/main.rs"]);
        assert_eq!(tree.root().children.len(), 1);
    }

    #[test]
    fn test_shared_directories_merge() {
        let mut tree = OutlineTree::new();
        tree.add_path("src/a.rs");
        tree.add_path("src/b.rs");
        assert_eq!(tree.root().children.len(), 1);
        assert_eq!(tree.root().children[0].children.len(), 2);
    }

    #[test]
    fn test_empty_segments_skipped() {
        let mut tree = OutlineTree::new();
        tree.add_path("/src//lib.rs");
        assert_eq!(tree.paths(), vec!["src/lib.rs"]);
    }

    #[test]
    fn test_batch_defers_revision_bumps() {
        let mut tree = OutlineTree::new();
        tree.start_batch();
        tree.add_path("a.txt");
        tree.add_path("b.txt");
        assert_eq!(tree.revision(), 0);
        tree.end_batch();
        assert_eq!(tree.revision(), 1);

        // Outside a batch, inserts notify immediately.
        tree.add_path("c.txt");
        assert_eq!(tree.revision(), 2);
        // No structural change, no bump.
        tree.add_path("c.txt");
        assert_eq!(tree.revision(), 2);
    }

    #[test]
    fn test_contains() {
        let mut tree = OutlineTree::new();
        tree.add_path("src/deep/file.rs");
        assert!(tree.contains("src/deep/file.rs"));
        assert!(tree.contains("src/deep"));
        assert!(!tree.contains("src/other.rs"));
    }
}
