//! Arena-based DOM for HTML parsing.
//!
//! Every node lives in one vector; parent/child/sibling links are indices into
//! it. html5ever builds the tree through [`super::sink::ArenaSink`].

use std::rc::Rc;

use html5ever::QualName;

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaNodeId(pub u32);

impl ArenaNodeId {
    /// Sentinel value for no node.
    pub const NONE: ArenaNodeId = ArenaNodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    Document,
    /// Attributes are not kept: links and images never reach the text.
    Element(Rc<QualName>),
    Text(String),
    /// Comments, processing instructions and doctypes; kept only so the
    /// tree builder has something to attach.
    Other,
}

/// A node in the arena DOM.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: ArenaNodeId,
    pub first_child: ArenaNodeId,
    pub last_child: ArenaNodeId,
    pub prev_sibling: ArenaNodeId,
    pub next_sibling: ArenaNodeId,
}

impl ArenaNode {
    fn new(data: ArenaNodeData) -> Self {
        Self {
            data,
            parent: ArenaNodeId::NONE,
            first_child: ArenaNodeId::NONE,
            last_child: ArenaNodeId::NONE,
            prev_sibling: ArenaNodeId::NONE,
            next_sibling: ArenaNodeId::NONE,
        }
    }
}

/// Arena-based DOM tree.
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
    document: ArenaNodeId,
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaDom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: ArenaNodeId::NONE,
        };
        dom.document = dom.alloc(ArenaNode::new(ArenaNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: ArenaNode) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> ArenaNodeId {
        self.document
    }

    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn create_element(&mut self, name: Rc<QualName>) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Element(name)))
    }

    pub fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Text(text)))
    }

    pub fn create_other(&mut self) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Other))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = ArenaNodeId::NONE;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, new_node: ArenaNodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to the last child if it is a text node, else add a new one.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let ArenaNodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Unlink a node from its parent and siblings.
    pub fn detach(&mut self, target: ArenaNodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = ArenaNodeId::NONE;
            node.prev_sibling = ArenaNodeId::NONE;
            node.next_sibling = ArenaNodeId::NONE;
        }
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: ArenaNodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(ArenaNodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }
}

/// Iterator over the children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.dom.get(self.current)?;
        let id = self.current;
        self.current = node.next_sibling;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use html5ever::ns;

    use super::*;

    fn element(dom: &mut ArenaDom, tag: &str) -> ArenaNodeId {
        let name = QualName::new(None, ns!(html), tag.into());
        dom.create_element(Rc::new(name))
    }

    #[test]
    fn test_append_and_iterate() {
        let mut dom = ArenaDom::new();
        let root = dom.document();
        let a = element(&mut dom, "a");
        let b = element(&mut dom, "b");
        dom.append(root, a);
        dom.append(root, b);

        let children: Vec<_> = dom.children(root).collect();
        assert_eq!(children, vec![a, b]);
        assert_eq!(dom.get(a).unwrap().parent, root);
    }

    #[test]
    fn test_insert_before_and_detach() {
        let mut dom = ArenaDom::new();
        let root = dom.document();
        let a = element(&mut dom, "a");
        let b = element(&mut dom, "b");
        dom.append(root, b);
        dom.insert_before(b, a);
        assert_eq!(dom.children(root).collect::<Vec<_>>(), vec![a, b]);

        dom.detach(a);
        assert_eq!(dom.children(root).collect::<Vec<_>>(), vec![b]);
        assert!(dom.get(a).unwrap().parent.is_none());
    }

    #[test]
    fn test_append_text_merges() {
        let mut dom = ArenaDom::new();
        let root = dom.document();
        dom.append_text(root, "Hel");
        dom.append_text(root, "lo");
        let children: Vec<_> = dom.children(root).collect();
        assert_eq!(children.len(), 1);
        assert!(matches!(
            &dom.get(children[0]).unwrap().data,
            ArenaNodeData::Text(t) if t == "Hello"
        ));
    }
}
