//! Leaf traversal over a document snapshot.

use crate::host::{Document, LayerNode};

/// Depth-first iterator over the leaf layers of a tree, in document order.
///
/// Groups are descended into and never yielded.
#[derive(Debug)]
pub struct Leaves<'a> {
    stack: Vec<&'a LayerNode>,
}

impl<'a> Leaves<'a> {
    pub fn new(roots: &'a [LayerNode]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a LayerNode;

    fn next(&mut self) -> Option<&'a LayerNode> {
        while let Some(node) = self.stack.pop() {
            if node.is_group() {
                self.stack.extend(node.children.iter().rev());
            } else {
                return Some(node);
            }
        }
        None
    }
}

pub fn leaves(doc: &Document) -> Leaves<'_> {
    Leaves::new(&doc.layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LayerId;

    fn node(id: u64, children: Vec<LayerNode>) -> LayerNode {
        LayerNode {
            id: LayerId(id),
            name: format!("layer {id}"),
            visible: true,
            children,
        }
    }

    #[test]
    fn yields_leaves_in_document_order() {
        let roots = vec![
            node(1, vec![node(2, vec![]), node(3, vec![node(4, vec![])])]),
            node(5, vec![]),
            node(6, vec![node(7, vec![])]),
        ];
        let ids: Vec<u64> = Leaves::new(&roots).map(|n| n.id.0).collect();
        assert_eq!(ids, vec![2, 4, 5, 7]);
    }

    #[test]
    fn empty_tree_has_no_leaves() {
        assert_eq!(Leaves::new(&[]).count(), 0);
    }
}
