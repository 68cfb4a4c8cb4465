//! html5ever TreeSink implementation for ArenaDom.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, QualName, local_name, ns};

use super::arena::{ArenaDom, ArenaNodeId};

/// Handle used by the tree builder to reference nodes.
///
/// Element handles carry their own name so `elem_name` can hand out a
/// reference without borrowing the arena.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    id: ArenaNodeId,
    name: Rc<QualName>,
}

/// TreeSink implementation that builds an ArenaDom.
///
/// TreeSink methods take `&self`, so the DOM sits behind a RefCell.
pub struct ArenaSink {
    dom: RefCell<ArenaDom>,
    unnamed: Rc<QualName>,
}

impl Default for ArenaSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaSink {
    pub fn new() -> Self {
        Self {
            dom: RefCell::new(ArenaDom::new()),
            unnamed: Rc::new(QualName::new(None, ns!(), local_name!(""))),
        }
    }

    /// Consume the sink and return the DOM.
    pub fn into_dom(self) -> ArenaDom {
        self.dom.into_inner()
    }

    fn handle(&self, id: ArenaNodeId) -> NodeHandle {
        NodeHandle {
            id,
            name: Rc::clone(&self.unnamed),
        }
    }

    fn insert(&self, parent: ArenaNodeId, child: NodeOrText<NodeHandle>) {
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => dom.append(parent, node.id),
            NodeOrText::AppendText(text) => dom.append_text(parent, &text),
        }
    }
}

impl TreeSink for ArenaSink {
    type Handle = NodeHandle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        // Lenient like browsers
    }

    fn get_document(&self) -> Self::Handle {
        self.handle(self.dom.borrow().document())
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        &*target.name
    }

    fn create_element(
        &self,
        name: QualName,
        _attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let name = Rc::new(name);
        let id = self.dom.borrow_mut().create_element(Rc::clone(&name));
        NodeHandle { id, name }
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        let id = self.dom.borrow_mut().create_other();
        self.handle(id)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        let id = self.dom.borrow_mut().create_other();
        self.handle(id)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        self.insert(parent.id, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self
            .dom
            .borrow()
            .get(element.id)
            .is_some_and(|n| n.parent.is_some());

        // Foster parenting: content goes in front of the table
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.insert(prev_element.id, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        let mut dom = self.dom.borrow_mut();
        let doc = dom.document();
        let doctype = dom.create_other();
        dom.append(doc, doctype);
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        // Template contents stay under the template element itself
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.id == y.id
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut dom = self.dom.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => dom.insert_before(sibling.id, node.id),
            NodeOrText::AppendText(text) => {
                let text_node = dom.create_text(text.to_string());
                dom.insert_before(sibling.id, text_node);
            }
        }
    }

    fn add_attrs_if_missing(&self, _target: &Self::Handle, _attrs: Vec<Attribute>) {}

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.dom.borrow_mut().detach(target.id);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let children: Vec<_> = self.dom.borrow().children(node.id).collect();

        let mut dom = self.dom.borrow_mut();
        for child in children {
            dom.detach(child);
            dom.append(new_parent.id, child);
        }
    }
}
