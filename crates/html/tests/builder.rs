use anyhow::{Result, anyhow};
use html::{
    Attribute, DocumentEvent, DomBuilder, ElementData, ElementFactory, ElementKind,
    NoCustomElements, Token, parse_document,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn title_and_style_hooks_fire_in_close_order() -> Result<()> {
    init_logs();
    let markup = "<html><head><title> My \n Page </title>\
                  <style media=\"print\">p { color: red }</style></head>\
                  <body><p align=center>Hi</p></body></html>";
    let output = parse_document(markup, &mut NoCustomElements);
    let titles: Vec<_> = output
        .events
        .iter()
        .filter_map(|event| match event {
            DocumentEvent::Title(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(titles, vec!["My Page"]);

    let style = output
        .events
        .iter()
        .find_map(|event| match event {
            DocumentEvent::InlineStylesheet { text, media, .. } => Some((text, media)),
            _ => None,
        })
        .ok_or_else(|| anyhow!("style hook did not fire"))?;
    assert_eq!(style.0, "p { color: red }");
    assert_eq!(style.1.as_deref(), Some("print"));

    let body = output
        .events
        .iter()
        .find_map(|event| match event {
            DocumentEvent::Body(node) => Some(*node),
            _ => None,
        })
        .ok_or_else(|| anyhow!("body not recorded"))?;
    let para = output
        .dom
        .element_children(body)
        .next()
        .ok_or_else(|| anyhow!("paragraph missing"))?;
    let data = output
        .dom
        .element(para)
        .ok_or_else(|| anyhow!("not an element"))?;
    assert_eq!(data.kind, ElementKind::Paragraph);
    assert_eq!(data.hints, vec![("text-align".to_owned(), "center".to_owned())]);
    Ok(())
}

#[test]
fn malformed_markup_still_builds() -> Result<()> {
    init_logs();
    let output = parse_document("<div><p>one<p>two</div></span>", &mut NoCustomElements);
    let root = output
        .dom
        .root_element()
        .ok_or_else(|| anyhow!("no root"))?;
    assert_eq!(output.dom.element(root).map(ElementData::tag_name), Some("html"));
    assert_eq!(output.dom.plain_text(root), "one\ntwo");
    Ok(())
}

#[test]
fn empty_markup_has_no_root() {
    init_logs();
    let output = parse_document("   ", &mut NoCustomElements);
    assert!(output.dom.root_element().is_none());
    assert!(output.events.is_empty());
}

#[test]
fn unmatched_end_tags_are_ignored() {
    init_logs();
    let mut factory = NoCustomElements;
    let mut builder = DomBuilder::new(&mut factory);
    builder.feed(Token::start("div", Vec::new()));
    builder.feed(Token::end("span"));
    builder.feed(Token::text("x"));
    builder.feed(Token::start("br", Vec::new()));
    builder.feed(Token::text("y"));
    let output = builder.finish();
    let Some(div) = output.dom.root_element() else {
        panic!("div missing");
    };
    assert_eq!(output.dom.children(div).count(), 3);
    assert_eq!(output.dom.text_content(div), "xy");
}

struct Widgets;

impl ElementFactory for Widgets {
    fn create_element(&mut self, name: &str, attrs: &[Attribute]) -> Option<ElementData> {
        (name == "x-widget").then(|| {
            let mut data = ElementData::new("div", attrs.to_vec());
            data.set_attr("class", "widget");
            data
        })
    }
}

#[test]
fn factory_substitutes_custom_elements() -> Result<()> {
    init_logs();
    let output = parse_document("<body><x-widget id=w>inner</x-widget></body>", &mut Widgets);
    let widget = output
        .dom
        .element_by_id("w")
        .ok_or_else(|| anyhow!("widget missing"))?;
    let data = output
        .dom
        .element(widget)
        .ok_or_else(|| anyhow!("not an element"))?;
    assert_eq!(data.tag_name(), "div");
    assert!(data.has_class("widget"));
    Ok(())
}

#[test]
fn linked_stylesheets_need_rel() {
    init_logs();
    let output = parse_document(
        "<head><link rel=icon href=a.ico><link rel='alternate stylesheet' href=b.css>\
         <base href='http://example.com/dir/'></head>",
        &mut NoCustomElements,
    );
    let links: Vec<_> = output
        .events
        .iter()
        .filter_map(|event| match event {
            DocumentEvent::LinkedStylesheet { href, .. } => Some(href.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(links, vec!["b.css"]);
    assert!(
        output
            .events
            .contains(&DocumentEvent::BaseUrl("http://example.com/dir/".to_owned()))
    );
}
