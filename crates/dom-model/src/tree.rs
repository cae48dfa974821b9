use std::collections::{HashMap, HashSet};

use crate::errors::{DomError, DomResult};
use crate::node::{ClassTokens, Node, NodeDescriptor, NodeId, NodeKind};

/// Arena holding every node the host has reported.
///
/// Removed subtrees stay in the arena with no parent until
/// [`DocumentTree::prune_detached`] runs, so records delivered after a
/// removal can still read the removed nodes.
#[derive(Debug, Default)]
pub struct DocumentTree {
    nodes: HashMap<NodeId, Node>,
    root: Option<NodeId>,
}

impl DocumentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_root(root: &NodeDescriptor) -> DomResult<Self> {
        let mut tree = Self::new();
        let id = tree.insert_subtree(None, root)?;
        tree.root = Some(id);
        Ok(tree)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Inserts a descriptor subtree and appends it under `parent`.
    ///
    /// The whole subtree is validated before anything is written, so a
    /// failed insert leaves the tree untouched.
    pub fn insert_subtree(
        &mut self,
        parent: Option<NodeId>,
        desc: &NodeDescriptor,
    ) -> DomResult<NodeId> {
        if let Some(parent_id) = parent {
            let parent_node = self
                .nodes
                .get(&parent_id)
                .ok_or(DomError::UnknownNode(parent_id))?;
            if parent_node.is_text() {
                return Err(DomError::TextWithChildren(parent_id));
            }
        }
        let mut seen = HashSet::new();
        self.validate(desc, &mut seen)?;
        self.build(parent, desc);
        if let Some(parent_id) = parent {
            if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
                parent_node.children.push(desc.id);
            }
        }
        Ok(desc.id)
    }

    /// Checks that every subtree in `descs` could be appended under `parent`
    /// without writing anything. Ids must be unique across all of them.
    pub fn validate_insert(&self, parent: NodeId, descs: &[NodeDescriptor]) -> DomResult<()> {
        let parent_node = self
            .nodes
            .get(&parent)
            .ok_or(DomError::UnknownNode(parent))?;
        if parent_node.is_text() && !descs.is_empty() {
            return Err(DomError::TextWithChildren(parent));
        }
        let mut seen = HashSet::new();
        descs
            .iter()
            .try_for_each(|desc| self.validate(desc, &mut seen))
    }

    fn validate(&self, desc: &NodeDescriptor, seen: &mut HashSet<NodeId>) -> DomResult<()> {
        if self.nodes.contains_key(&desc.id) || !seen.insert(desc.id) {
            return Err(DomError::DuplicateNode(desc.id));
        }
        if desc.kind == NodeKind::Text && !desc.children.is_empty() {
            return Err(DomError::TextWithChildren(desc.id));
        }
        desc.children
            .iter()
            .try_for_each(|child| self.validate(child, seen))
    }

    fn build(&mut self, parent: Option<NodeId>, desc: &NodeDescriptor) {
        let node = Node {
            id: desc.id,
            kind: desc.kind,
            tag: desc.tag.clone(),
            class: desc.class.clone(),
            attrs: desc.attrs.clone(),
            data: desc.text.clone(),
            parent,
            children: desc.children.iter().map(|child| child.id).collect(),
        };
        self.nodes.insert(desc.id, node);
        for child in &desc.children {
            self.build(Some(desc.id), child);
        }
    }

    /// Unlinks `child` from `parent`. The subtree stays readable.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if !self.nodes.contains_key(&child) {
            return Err(DomError::UnknownNode(child));
        }
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(DomError::UnknownNode(parent))?;
        let position = parent_node
            .children
            .iter()
            .position(|id| *id == child)
            .ok_or(DomError::NotAChild(child, parent))?;
        parent_node.children.remove(position);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
        Ok(())
    }

    pub fn set_text(&mut self, id: NodeId, data: &str) -> DomResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(DomError::UnknownNode(id))?;
        if !node.is_text() {
            return Err(DomError::NotText(id));
        }
        node.data = Some(data.to_string());
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn class_tokens(&self, id: NodeId) -> Option<ClassTokens<'_>> {
        self.nodes.get(&id).and_then(Node::class_tokens)
    }

    pub fn class_name(&self, id: NodeId) -> Option<&str> {
        self.class_tokens(id).map(|tokens| tokens.raw())
    }

    pub fn has_class(&self, id: NodeId, token: &str) -> bool {
        self.nodes
            .get(&id)
            .map(|node| node.has_class(token))
            .unwrap_or(false)
    }

    pub fn text_data(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).and_then(|node| node.data.as_deref())
    }

    pub fn node_type(&self, id: NodeId) -> Option<u16> {
        self.nodes.get(&id).map(|node| node.kind.node_type())
    }

    pub fn id_attr(&self, id: NodeId) -> Option<&str> {
        self.nodes
            .get(&id)
            .and_then(|node| node.attrs.get("id"))
            .map(String::as_str)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.nodes.get(&id).map(Node::is_text).unwrap_or(false)
    }

    /// Rendered text of a node: the concatenated data of every descendant
    /// text node in document order, with `<br>` rendered as a newline.
    pub fn inner_text(&self, id: NodeId) -> Option<String> {
        self.nodes.get(&id)?;
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            match node.kind {
                NodeKind::Text => {
                    if let Some(data) = &node.data {
                        out.push_str(data);
                    }
                }
                NodeKind::Element => {
                    if node.tag.as_deref() == Some("br") {
                        out.push('\n');
                    }
                    stack.extend(node.children.iter().rev());
                }
            }
        }
        Some(out)
    }

    /// The node itself followed by each of its ancestors.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.nodes.contains_key(&id).then_some(id),
        }
    }

    /// Nearest node, starting at `id` itself, whose class tokens contain `token`.
    pub fn closest_with_class(&self, id: NodeId, token: &str) -> Option<NodeId> {
        self.ancestors(id).find(|candidate| self.has_class(*candidate, token))
    }

    /// First attached node in document order carrying `token`.
    pub fn find_first_by_class(&self, token: &str) -> Option<NodeId> {
        let mut stack = vec![self.root?];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            if node.has_class(token) {
                return Some(current);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        match self.root {
            Some(root) => self.ancestors(id).any(|candidate| candidate == root),
            None => false,
        }
    }

    /// Drops every node that is no longer reachable from the root.
    pub fn prune_detached(&mut self) -> usize {
        let Some(root) = self.root else {
            let dropped = self.nodes.len();
            self.nodes.clear();
            return dropped;
        };
        let mut reachable = HashSet::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            if reachable.insert(current) {
                if let Some(node) = self.nodes.get(&current) {
                    stack.extend(node.children.iter().copied());
                }
            }
        }
        let before = self.nodes.len();
        self.nodes.retain(|id, _| reachable.contains(id));
        before - self.nodes.len()
    }
}

pub struct Ancestors<'a> {
    tree: &'a DocumentTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DocumentTree {
        let root = NodeDescriptor::element(1, "body", "kix-appview").with_children(vec![
            NodeDescriptor::element(2, "div", "kix-paragraphrenderer").with_children(vec![
                NodeDescriptor::text(3, "Hello"),
                NodeDescriptor::element(4, "br", ""),
                NodeDescriptor::element(5, "span", "kix-word").with_children(vec![
                    NodeDescriptor::text(6, "world"),
                ]),
            ]),
        ]);
        DocumentTree::from_root(&root).unwrap()
    }

    #[test]
    fn inner_text_follows_document_order() {
        let tree = sample();
        assert_eq!(tree.inner_text(NodeId(2)).as_deref(), Some("Hello\nworld"));
        assert_eq!(tree.inner_text(NodeId(99)), None);
    }

    #[test]
    fn closest_includes_the_node_itself() {
        let tree = sample();
        assert_eq!(tree.closest_with_class(NodeId(5), "kix-word"), Some(NodeId(5)));
        assert_eq!(
            tree.closest_with_class(NodeId(6), "kix-appview"),
            Some(NodeId(1))
        );
        assert_eq!(tree.closest_with_class(NodeId(6), "missing"), None);
    }

    #[test]
    fn failed_insert_leaves_tree_untouched() {
        let mut tree = sample();
        let before = tree.len();
        let bad = NodeDescriptor::element(10, "div", "").with_children(vec![
            NodeDescriptor::text(11, "a"),
            NodeDescriptor::text(3, "dup"),
        ]);
        assert_eq!(
            tree.insert_subtree(Some(NodeId(1)), &bad),
            Err(DomError::DuplicateNode(NodeId(3)))
        );
        assert_eq!(tree.len(), before);
        assert!(!tree.contains(NodeId(10)));
    }

    #[test]
    fn detached_nodes_remain_readable_until_pruned() {
        let mut tree = sample();
        tree.detach(NodeId(2), NodeId(5)).unwrap();
        assert!(!tree.is_attached(NodeId(6)));
        assert!(tree.has_class(NodeId(5), "kix-word"));
        assert_eq!(tree.find_first_by_class("kix-word"), None);
        assert_eq!(tree.prune_detached(), 2);
        assert!(!tree.contains(NodeId(5)));
    }
}
