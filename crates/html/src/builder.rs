//! Token-driven DOM construction.

use crate::behavior::{DocumentEvent, on_element_complete};
use crate::dom::{Dom, ElementData, ElementKind, NodeData, NodeId};
use crate::token::{Attribute, Token};

/// Embedder hook consulted for every start tag before the default element is
/// created. Returning `Some` substitutes the embedder's element data.
pub trait ElementFactory {
    fn create_element(&mut self, _name: &str, _attrs: &[Attribute]) -> Option<ElementData> {
        None
    }
}

/// Factory that never substitutes anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCustomElements;

impl ElementFactory for NoCustomElements {}

/// Finished tree plus the document-level events its tag hooks produced, in
/// the order the elements closed.
#[derive(Debug)]
pub struct BuildOutput {
    pub dom: Dom,
    pub events: Vec<DocumentEvent>,
}

/// Consumes tokens and maintains the stack of open elements.
pub struct DomBuilder<'factory> {
    dom: Dom,
    open: Vec<NodeId>,
    events: Vec<DocumentEvent>,
    factory: &'factory mut dyn ElementFactory,
}

impl<'factory> DomBuilder<'factory> {
    pub fn new(factory: &'factory mut dyn ElementFactory) -> Self {
        Self {
            dom: Dom::new(),
            open: Vec::new(),
            events: Vec::new(),
            factory,
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or_else(|| self.dom.document())
    }

    pub fn feed(&mut self, token: Token) {
        match token {
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => {
                let data = self
                    .factory
                    .create_element(&name, &attrs)
                    .unwrap_or_else(|| ElementData::new(&name, attrs));
                let void = self_closing || ElementKind::is_void_name(&data.name);
                let parent = self.current();
                let node = self.dom.append(parent, NodeData::Element(data));
                if void {
                    self.complete(node);
                } else {
                    self.open.push(node);
                }
            }
            Token::EndTag { name } => {
                let Some(depth) = self.open.iter().rposition(|open| {
                    self.dom
                        .element(*open)
                        .is_some_and(|element| element.name == name)
                }) else {
                    log::debug!("ignoring stray end tag </{name}>");
                    return;
                };
                while self.open.len() > depth {
                    if let Some(node) = self.open.pop() {
                        self.complete(node);
                    }
                }
            }
            Token::Text(text) => {
                let parent = self.current();
                if parent == self.dom.document() && text.trim().is_empty() {
                    return;
                }
                self.dom.append_text(parent, &text);
            }
            Token::Comment(text) => {
                let parent = self.current();
                self.dom.append(parent, NodeData::Comment(text));
            }
        }
    }

    fn complete(&mut self, node: NodeId) {
        if let Some(event) = on_element_complete(&mut self.dom, node) {
            log::trace!("tag hook produced {event:?}");
            self.events.push(event);
        }
    }

    /// Close every element still open and hand over the tree.
    pub fn finish(mut self) -> BuildOutput {
        while let Some(node) = self.open.pop() {
            self.complete(node);
        }
        BuildOutput {
            dom: self.dom,
            events: self.events,
        }
    }
}
