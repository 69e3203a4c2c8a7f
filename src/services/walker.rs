//! Symbol outline traversal
//!
//! Walks an arbitrarily nested [`SymbolTree`] in post-order and offers every
//! node whose kind is not excluded to a visitor. Envelope payloads (`result`)
//! are walked before a node's own children; sequences are flattened in order
//! and never visited themselves.

use std::ops::ControlFlow;

use crate::models::symbol::{ExclusionSet, SymbolNode, SymbolTree};

pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Summary of a single traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes handed to the visitor
    pub visited: usize,
    /// Nodes reached but filtered out by kind
    pub skipped: usize,
    /// The depth limit was hit and the walk stopped early
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct SymbolTreeWalker {
    exclusions: ExclusionSet,
    max_depth: usize,
}

impl Default for SymbolTreeWalker {
    fn default() -> Self {
        Self::new(ExclusionSet::default())
    }
}

impl SymbolTreeWalker {
    pub fn new(exclusions: ExclusionSet) -> Self {
        Self {
            exclusions,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Traverse `tree`, calling `visit` on each non-excluded node.
    ///
    /// An absent tree is a no-op. If the tree nests deeper than `max_depth`
    /// the walk stops at that point and whatever was visited stays visited.
    pub fn traverse<'a, F>(&self, tree: Option<&'a SymbolTree>, mut visit: F) -> TraversalStats
    where
        F: FnMut(&'a SymbolNode),
    {
        let mut stats = TraversalStats::default();
        let Some(tree) = tree else {
            return stats;
        };

        if self.walk(tree, 0, &mut visit, &mut stats).is_break() {
            stats.truncated = true;
            tracing::warn!(
                "Symbol outline deeper than {} levels, traversal stopped after {} nodes",
                self.max_depth,
                stats.visited
            );
        }

        stats
    }

    /// Collect the non-empty names of all visited nodes, in traversal order
    pub fn collect_names(&self, tree: Option<&SymbolTree>) -> (Vec<String>, TraversalStats) {
        let mut names = Vec::new();
        let stats = self.traverse(tree, |node| {
            if let Some(name) = node.name.as_deref()
                && !name.is_empty()
            {
                names.push(name.to_string());
            }
        });
        (names, stats)
    }

    fn walk<'a, F>(
        &self,
        tree: &'a SymbolTree,
        depth: usize,
        visit: &mut F,
        stats: &mut TraversalStats,
    ) -> ControlFlow<()>
    where
        F: FnMut(&'a SymbolNode),
    {
        if depth > self.max_depth {
            return ControlFlow::Break(());
        }

        match tree {
            SymbolTree::Sequence(items) => {
                for item in items {
                    self.walk(item, depth + 1, visit, stats)?;
                }
            }
            SymbolTree::Node(node) => {
                if let Some(payload) = &node.result {
                    self.walk(payload, depth + 1, visit, stats)?;
                }

                if let Some(children) = &node.children {
                    for child in children {
                        self.walk(child, depth + 1, visit, stats)?;
                    }
                }

                if self.exclusions.excludes(node.kind) {
                    stats.skipped += 1;
                } else {
                    stats.visited += 1;
                    visit(&**node);
                }
            }
            SymbolTree::Other(_) => {}
        }

        ControlFlow::Continue(())
    }
}
