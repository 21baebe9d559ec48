//! Definitions: non-empty ordered node sequences.

use std::fmt;
use std::sync::Arc;

use kreia_foundation::{Error, Name, Result};

use crate::node::{Node, NodeKind};

/// A non-empty ordered sequence of nodes: what must be matched, in order.
///
/// The node slice is shared, so cloning a definition never copies grammar
/// data.
#[derive(Clone, Debug, PartialEq)]
pub struct Definition(Arc<[Node]>);

impl Definition {
    /// Creates a definition.
    ///
    /// # Errors
    ///
    /// Returns an error if `nodes` is empty.
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::empty_definition("definition"));
        }
        Ok(Self(nodes.into()))
    }

    /// Creates a single-node definition.
    #[must_use]
    pub fn single(node: Node) -> Self {
        Self(Arc::from([node]))
    }

    /// Returns the nodes of this definition.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed definition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the node at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.0.get(index)
    }

    /// Iterates over the nodes.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.0.iter()
    }

    /// Returns true if every node can be skipped independently.
    #[must_use]
    pub fn is_all_optional(&self) -> bool {
        self.0.iter().all(Node::is_optional)
    }

    /// Fails if any of `definitions` is entirely optional.
    ///
    /// # Errors
    ///
    /// Returns `AllOptionalAlternative` naming the first offending definition.
    pub fn screen_all_optional(definitions: &[Self]) -> Result<()> {
        match definitions.iter().find(|d| d.is_all_optional()) {
            Some(offender) => Err(Error::all_optional(offender.to_string())),
            None => Ok(()),
        }
    }

    /// Merges every run of consecutive unmodified `Consume` nodes into one
    /// multi-token `Consume`.
    ///
    /// Order is preserved. Modified nodes and non-`Consume` nodes end a run.
    /// Nested definitions (`Or` choices, `Paren` bodies, macro call
    /// arguments) are clustered as well.
    #[must_use]
    pub fn cluster_consumes(&self) -> Self {
        let mut clustered: Vec<Node> = Vec::with_capacity(self.0.len());
        let mut run: Vec<Name> = Vec::new();

        for node in self.0.iter() {
            match (node.kind(), node.modifier()) {
                (NodeKind::Consume(names), None) => run.extend(names.iter().cloned()),
                _ => {
                    flush_run(&mut run, &mut clustered);
                    clustered.push(cluster_node(node));
                }
            }
        }
        flush_run(&mut run, &mut clustered);

        Self(clustered.into())
    }
}

fn flush_run(run: &mut Vec<Name>, into: &mut Vec<Node>) {
    if !run.is_empty() {
        let names: Arc<[Name]> = std::mem::take(run).into();
        into.push(Node::new(NodeKind::Consume(names), None));
    }
}

fn cluster_node(node: &Node) -> Node {
    let kind = match node.kind() {
        NodeKind::Or(choices) => {
            NodeKind::Or(choices.iter().map(Definition::cluster_consumes).collect())
        }
        NodeKind::Paren(definition) => NodeKind::Paren(definition.cluster_consumes()),
        NodeKind::MacroCall { macro_name, args } => NodeKind::MacroCall {
            macro_name: macro_name.clone(),
            args: args.iter().map(Definition::cluster_consumes).collect(),
        },
        other => other.clone(),
    };
    Node::new(kind, node.modifier())
}

impl<'a> IntoIterator for &'a Definition {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}
