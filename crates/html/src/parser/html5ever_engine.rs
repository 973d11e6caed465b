use crate::token::{Attribute, Token};
use html5ever::tendril::TendrilSink as _;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Tokenizer backed by html5ever's tree builder.
///
/// html5ever resolves implied tags, misnesting and the insertion-mode rules; the
/// resulting tree is then flattened back into a well-formed token stream so the
/// DOM builder only ever sees matched start/end pairs.
pub struct Html5everEngine {
    dom: RcDom,
}

impl Html5everEngine {
    pub fn parse(markup: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(markup);
        Self { dom }
    }

    pub fn into_tokens(self) -> Vec<Token> {
        let mut out = Vec::new();
        let children = self.dom.document.children.borrow();
        for child in children.iter() {
            emit(child, &mut out);
        }
        out
    }
}

fn emit(handle: &Handle, out: &mut Vec<Token>) {
    match &handle.data {
        RcNodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| Attribute::new(&attr.name.local, attr.value.to_string()))
                .collect();
            out.push(Token::StartTag {
                name: name.local.clone(),
                attrs,
                self_closing: false,
            });
            for child in handle.children.borrow().iter() {
                emit(child, out);
            }
            out.push(Token::EndTag {
                name: name.local.clone(),
            });
        }
        RcNodeData::Text { contents } => {
            out.push(Token::Text(contents.borrow().to_string()));
        }
        RcNodeData::Comment { contents } => {
            out.push(Token::Comment(contents.to_string()));
        }
        RcNodeData::Document
        | RcNodeData::Doctype { .. }
        | RcNodeData::ProcessingInstruction { .. } => {}
    }
}
