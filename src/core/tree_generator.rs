//! Generates an ASCII representation of a directory tree.

use std::collections::BTreeMap;

/// A utility struct for generating an ASCII directory tree.
///
/// This struct is stateless and provides methods as associated functions.
pub struct TreeGenerator;

impl TreeGenerator {
    /// Renders the tree spanned by a list of forward-slash relative file
    /// paths. Directories are implied by the paths and listed before files.
    pub fn generate_tree<S: AsRef<str>>(relative_paths: &[S], root_name: &str) -> String {
        let mut root = TreeNode::default();
        for path in relative_paths {
            Self::insert_into_tree(&mut root, path.as_ref());
        }

        let mut result = format!("{root_name}/\n");
        Self::render_children(&root, &mut result, "");
        result
    }

    /// Inserts a path into the tree, creating intermediate directories.
    fn insert_into_tree(root: &mut TreeNode, path: &str) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((file_name, dirs)) = segments.split_last() else {
            return;
        };

        let mut current = root;
        for dir in dirs {
            current = current.dirs.entry((*dir).to_string()).or_default();
        }
        current.files.push((*file_name).to_string());
    }

    /// Renders the children of a tree node.
    fn render_children(node: &TreeNode, result: &mut String, prefix: &str) {
        let mut files: Vec<&String> = node.files.iter().collect();
        files.sort();
        files.dedup();

        let total = node.dirs.len() + files.len();
        let mut index = 0;

        for (name, child) in &node.dirs {
            index += 1;
            let is_last = index == total;
            let connector = if is_last { "└── " } else { "├── " };
            result.push_str(&format!("{prefix}{connector}{name}/\n"));

            let new_prefix = if is_last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}│   ")
            };
            Self::render_children(child, result, &new_prefix);
        }

        for name in files {
            index += 1;
            let connector = if index == total { "└── " } else { "├── " };
            result.push_str(&format!("{prefix}{connector}{name}\n"));
        }
    }
}

/// A transient node used for building the ASCII tree.
#[derive(Debug, Default)]
struct TreeNode {
    dirs: BTreeMap<String, TreeNode>,
    files: Vec<String>,
}
