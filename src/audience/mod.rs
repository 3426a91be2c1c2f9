//! # Audience: hierarchical topic registry.
//!
//! An [`Audience`] node stands for one segment of a dot-separated topic path.
//! It holds the listeners registered exactly at that prefix and one child per
//! next segment.
//!
//! ```text
//! subscriptions:  "net" → L1,  "net.if" → L2,  "net.if.up" → L1
//!
//! (root)
//!   └─ net          [L1]
//!        └─ if      [L2]
//!             └─ up [L1]
//!
//! broadcast("net.if.up")   → L1, L2, L1   (root → leaf, once per matching node)
//! broadcast("net.iface")   → L1           ("if" is not a prefix of "iface")
//! broadcast("disk")        → nothing      (returns false)
//! ```
//!
//! ## Rules
//! - A listener at `a.b` receives topics `a.b` and `a.b.*`, never `a.bc`.
//! - Delivery is additive per matching node; duplicates are not folded.
//! - Nodes are created lazily and never pruned. The tree assumes a bounded set of
//!   topic names; empty nodes stay allocated for the router's lifetime.
//! - The tree is owned by the dispatcher task and needs no lock.

use std::collections::HashMap;

/// Splits `path` into its first segment and the remainder (if any).
fn split(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

/// One node of the topic tree.
#[derive(Debug, Clone)]
pub struct Audience<D> {
    listeners: Vec<D>,
    children: HashMap<String, Audience<D>>,
}

impl<D> Default for Audience<D> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            children: HashMap::new(),
        }
    }
}

impl<D: Clone + PartialEq> Audience<D> {
    /// Creates an empty root node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the chain of nodes for `path` with `dest` registered at its end.
    ///
    /// An empty path places `dest` at the returned node itself.
    pub fn create(path: &str, dest: D) -> Self {
        let mut node = Self::new();
        node.add_listener(path, dest);
        node
    }

    /// Registers `dest` at the node for `path`, creating missing nodes on the way.
    pub fn add_listener(&mut self, path: &str, dest: D) {
        if path.is_empty() {
            self.listeners.push(dest);
            return;
        }
        let (head, rest) = split(path);
        self.children
            .entry(head.to_string())
            .or_default()
            .add_listener(rest.unwrap_or(""), dest);
    }

    /// Removes `dest` from this node and from every node along `path`.
    ///
    /// One occurrence is removed per node. Unknown paths and listeners are ignored.
    pub fn remove_listener(&mut self, path: &str, dest: &D) {
        if let Some(pos) = self.listeners.iter().position(|l| l == dest) {
            self.listeners.remove(pos);
        }
        if path.is_empty() {
            return;
        }
        let (head, rest) = split(path);
        if let Some(child) = self.children.get_mut(head) {
            child.remove_listener(rest.unwrap_or(""), dest);
        }
    }

    /// Calls `deliver` for every listener on the way from this node down `path`.
    ///
    /// Returns `false` only if no node along the full path had a listener.
    pub fn broadcast<F>(&self, path: &str, mut deliver: F) -> bool
    where
        F: FnMut(&D),
    {
        self.walk(path, &mut deliver)
    }

    fn walk<F>(&self, path: &str, deliver: &mut F) -> bool
    where
        F: FnMut(&D),
    {
        let mut delivered = false;
        for listener in &self.listeners {
            deliver(listener);
            delivered = true;
        }
        if path.is_empty() {
            return delivered;
        }
        let (head, rest) = split(path);
        match self.children.get(head) {
            Some(child) => child.walk(rest.unwrap_or(""), deliver) || delivered,
            None => delivered,
        }
    }

    /// Collects the listeners [`broadcast`](Self::broadcast) would deliver to, in order.
    pub fn matching(&self, path: &str) -> Vec<D> {
        let mut out = Vec::new();
        self.broadcast(path, |d| out.push(d.clone()));
        out
    }

    /// Total number of registrations in this subtree.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
            + self
                .children
                .values()
                .map(Audience::listener_count)
                .sum::<usize>()
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .values()
            .map(Audience::node_count)
            .sum::<usize>()
    }
}
