//! Logging and debugging facilities for treegrid.
//!
//! This module provides:
//! - Target names for filtering the `tracing` output of each subsystem
//! - [`TreeDump`], a text visualization of any hierarchy implementing
//!   [`TreeSource`]
//!
//! # Tracing Integration
//!
//! treegrid uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("treegrid::hierarchy=debug,treegrid::selection=trace")
//!     .init();
//! ```

use std::fmt::Write as FmtWrite;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "treegrid_core::signal";
    /// Timer and debouncer target.
    pub const TIMER: &str = "treegrid_core::timer";
    /// Row table facade target.
    pub const TABLE: &str = "treegrid::table";
    /// Parent/child link maintenance target.
    pub const HIERARCHY: &str = "treegrid::hierarchy";
    /// Filter chain target.
    pub const FILTER: &str = "treegrid::filter";
    /// Selection tracking target.
    pub const SELECTION: &str = "treegrid::selection";
    /// Rendered row synchronization target.
    pub const RENDER: &str = "treegrid::render";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Single-line nested representation: `a(b, c(d))`.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            max_depth: None,
        }
    }
}

/// A hierarchy that can be dumped by [`TreeDump`].
pub trait TreeSource {
    /// Handle identifying a node.
    type Node: Copy;

    /// Top-level nodes in display order.
    fn roots(&self) -> Vec<Self::Node>;

    /// Children of `node` in display order.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// One-line description of `node`.
    fn label(&self, node: Self::Node) -> String;
}

/// Debug utility for visualizing hierarchies.
#[derive(Debug, Clone, Default)]
pub struct TreeDump {
    options: TreeFormatOptions,
}

impl TreeDump {
    /// Create a dumper with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dumper with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every root of `source` and its descendants.
    pub fn format<S: TreeSource>(&self, source: &S) -> String {
        let roots = source.roots();
        let mut output = String::new();

        if self.options.style == TreeStyle::Compact {
            let parts: Vec<String> = roots
                .into_iter()
                .map(|root| self.format_compact(source, root, 0))
                .collect();
            output.push_str(&parts.join(", "));
            return output;
        }

        if roots.is_empty() {
            output.push_str("(empty)\n");
            return output;
        }

        for root in roots {
            self.format_subtree_into(source, root, 0, "", true, &mut output);
        }
        output
    }

    fn format_subtree_into<S: TreeSource>(
        &self,
        source: &S,
        node: S::Node,
        depth: usize,
        indent: &str,
        is_last: bool,
        output: &mut String,
    ) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        let (tee, corner, pipe) = match self.options.style {
            TreeStyle::Ascii => ("+-- ", "`-- ", "|   "),
            _ => ("\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ", "\u{2502}   "),
        };

        let connector = match (depth, is_last) {
            (0, _) => "",
            (_, true) => corner,
            (_, false) => tee,
        };
        let _ = writeln!(output, "{indent}{connector}{}", source.label(node));

        let child_indent = match (depth, is_last) {
            (0, _) => String::new(),
            (_, true) => format!("{indent}    "),
            (_, false) => format!("{indent}{pipe}"),
        };
        let children = source.children(node);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_subtree_into(source, child, depth + 1, &child_indent, i + 1 == count, output);
        }
    }

    fn format_compact<S: TreeSource>(&self, source: &S, node: S::Node, depth: usize) -> String {
        let mut text = source.label(node);
        if self.options.max_depth.is_some_and(|max| depth >= max) {
            return text;
        }
        let children: Vec<String> = source
            .children(node)
            .into_iter()
            .map(|child| self.format_compact(source, child, depth + 1))
            .collect();
        if !children.is_empty() {
            let _ = write!(text, "({})", children.join(", "));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (label, children) adjacency list; index 0 and 3 are roots.
    struct Fixture(Vec<(&'static str, Vec<usize>)>);

    impl TreeSource for Fixture {
        type Node = usize;

        fn roots(&self) -> Vec<usize> {
            vec![0, 3]
        }

        fn children(&self, node: usize) -> Vec<usize> {
            self.0[node].1.clone()
        }

        fn label(&self, node: usize) -> String {
            self.0[node].0.to_string()
        }
    }

    fn fixture() -> Fixture {
        Fixture(vec![
            ("a", vec![1, 2]),
            ("b", vec![]),
            ("c", vec![4]),
            ("d", vec![]),
            ("e", vec![]),
        ])
    }

    #[test]
    fn test_ascii_dump() {
        let dump = TreeDump::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            max_depth: None,
        });
        assert_eq!(dump.format(&fixture()), "a\n+-- b\n`-- c\n    `-- e\nd\n");
    }

    #[test]
    fn test_compact_dump_with_depth_limit() {
        let dump = TreeDump::with_options(TreeFormatOptions {
            style: TreeStyle::Compact,
            max_depth: Some(1),
        });
        assert_eq!(dump.format(&fixture()), "a(b, c), d");
    }

    #[test]
    fn test_unicode_dump_uses_box_drawing() {
        let output = TreeDump::new().format(&fixture());
        assert!(output.contains("\u{2514}\u{2500}\u{2500} c"));
    }
}
