mod common;

use anyhow::{Result, anyhow};
use common::{by_id, document, document_with, placement, recorder};
use css::Rgba;
use layout::{Rect, Size};
use page::Surface;

#[test]
fn title_is_reported_once() -> Result<()> {
    let (doc, state) = document("<html><head><title>Hi</title></head><body/></html>");
    assert_eq!(state.borrow().captions, vec!["Hi".to_owned()]);
    assert_eq!(doc.caption(), Some("Hi"));
    Ok(())
}

#[test]
fn class_rule_beats_type_rule() -> Result<()> {
    let (doc, _state) = document(
        r#"<style>p { color: red } .x { color: blue }</style><p id="p" class="x">t</p>"#,
    );
    let node = by_id(&doc, "p")?;
    let color = doc
        .styles()
        .get(node)
        .map(|style| style.color)
        .ok_or_else(|| anyhow!("paragraph has no style"))?;
    assert_eq!(color, Rgba::new(0, 0, 255, 255));
    Ok(())
}

#[test]
fn render_is_idempotent() -> Result<()> {
    let (mut doc, _state) = document(
        r#"<p>Several words of text that wrap <i>somewhere</i> in the middle.</p>
           <div style="float:left;width:50px;height:70px"></div>
           <table><tr><td>a</td><td colspan="2">b c</td></tr></table>"#,
    );
    let boxes = |doc: &page::Document| -> Vec<Rect> {
        let tree = doc.layout_tree();
        tree.arena()
            .ids()
            .filter_map(|id| tree.get(id))
            .map(|item| item.geometry.border_box)
            .collect()
    };
    let first_size = doc.render(300.0);
    let first = boxes(&doc);
    let second_size = doc.render(300.0);
    assert_eq!(first_size, second_size);
    assert_eq!(first, boxes(&doc));
    Ok(())
}

#[test]
fn empty_markup_builds_an_empty_document() {
    let (mut doc, state) = document("   ");
    assert!(doc.root().is_none());
    assert_eq!(doc.render(500.0), Size::default());
    assert!(doc.get_element_at(5.0, 5.0).is_none());
    doc.draw(Surface(1), 0.0, 0.0, None);
    assert!(state.borrow().texts.is_empty());
}

#[test]
fn linked_sheets_and_imports_resolve_against_the_base() -> Result<()> {
    let state = recorder();
    state.borrow_mut().sheets.insert(
        "http://example.com/css/main.css".to_owned(),
        "@import url(extra.css); p { margin: 0 }".to_owned(),
    );
    state.borrow_mut().sheets.insert(
        "http://example.com/css/extra.css".to_owned(),
        "#p { height: 33px }".to_owned(),
    );
    let mut doc = document_with(
        r#"<html><head><base href="http://example.com/">
           <link rel="stylesheet" href="css/main.css">
           <link rel="stylesheet" href="missing.css"></head>
           <body><p id="p">x</p></body></html>"#,
        &state,
    );
    doc.render(400.0);
    assert_eq!(placement(&doc, "p")?.height, 33.0);
    assert_eq!(doc.base_url(), Some("http://example.com/"));

    let recorded = state.borrow();
    assert_eq!(recorded.base_urls, vec!["http://example.com/".to_owned()]);
    assert!(
        recorded
            .imported
            .contains(&"http://example.com/css/extra.css".to_owned())
    );
    // The missing sheet is reported and otherwise ignored.
    assert_eq!(recorded.errors.len(), 1);
    assert!(recorded.errors[0].contains("missing.css"));
    Ok(())
}

#[test]
fn draw_paints_canvas_text_and_clips() -> Result<()> {
    let (mut doc, state) = document(
        r#"<style>body { margin: 0; background-color: #ff0000 }
           #c { overflow: hidden; height: 20px }</style>
           <div id="c">hello world</div>"#,
    );
    doc.render(300.0);
    doc.draw(Surface(7), 10.0, 20.0, None);
    {
        let recorded = state.borrow();
        let canvas = recorded
            .backgrounds
            .first()
            .ok_or_else(|| anyhow!("no canvas background"))?;
        assert!(canvas.is_root);
        assert_eq!(canvas.color, Rgba::new(255, 0, 0, 255));
        // The body's own background was propagated, not painted twice.
        assert_eq!(recorded.backgrounds.len(), 1);

        let words: Vec<&str> = recorded.texts.iter().map(|run| run.text.as_str()).collect();
        assert_eq!(words, vec!["hello", "world"]);
        assert_eq!(recorded.texts[0].origin.x, 10.0);
        assert!(recorded.texts[0].origin.y >= 20.0);

        assert_eq!(recorded.clips.len(), 1);
        assert_eq!(recorded.clips[0], Rect::new(10.0, 20.0, 300.0, 20.0));
        assert_eq!(recorded.clip_depth, 0);
    }

    // Nothing but the canvas meets a clip below the content.
    state.borrow_mut().texts.clear();
    doc.draw(Surface(7), 0.0, 0.0, Some(Rect::new(0.0, 200.0, 300.0, 50.0)));
    assert!(state.borrow().texts.is_empty());
    Ok(())
}

#[test]
fn selectors_find_elements_and_named_anchors() -> Result<()> {
    let (doc, _state) = document(
        r#"<a id="top"></a><div class="k"></div><p class="k"><a name="sec">x</a></p>"#,
    );
    assert_eq!(doc.select_all(".k").len(), 2);
    assert_eq!(doc.select_one("#top"), Some(by_id(&doc, "top")?));
    let named = doc
        .select_one("#sec")
        .ok_or_else(|| anyhow!("named anchor not found"))?;
    assert_eq!(
        doc.dom().element(named).and_then(|element| element.attr("name")),
        Some("sec")
    );
    assert!(doc.select_one("").is_none());
    assert!(doc.select_one("#nothing").is_none());
    Ok(())
}

#[test]
fn media_changes_restyle_only_when_rules_flip() -> Result<()> {
    let state = recorder();
    let mut doc = document_with(
        r#"<style>@media (max-width: 500px) { #p { color: red } }</style><p id="p">x</p>"#,
        &state,
    );
    doc.render(400.0);
    let color = |doc: &page::Document| -> Result<Rgba> {
        let node = by_id(doc, "p")?;
        doc.styles()
            .get(node)
            .map(|style| style.color)
            .ok_or_else(|| anyhow!("paragraph has no style"))
    };
    assert_eq!(color(&doc)?, Rgba::BLACK);
    assert!(!doc.media_changed());

    state.borrow_mut().client = Rect::new(0.0, 0.0, 400.0, 600.0);
    assert!(doc.media_changed());
    assert_eq!(color(&doc)?, Rgba::new(255, 0, 0, 255));
    assert!(!doc.media_changed());
    Ok(())
}

#[test]
fn images_are_requested_and_report_their_regions() -> Result<()> {
    let state = recorder();
    state
        .borrow_mut()
        .images
        .insert("a.png".to_owned(), Size::new(30.0, 20.0));
    let mut doc = document_with(
        r#"<style>body { margin: 0 }</style><img id="i" src="a.png"><img src="gone.png">"#,
        &state,
    );
    doc.render(400.0);
    let image = placement(&doc, "i")?;
    assert_eq!(image.width, 30.0);
    assert_eq!(doc.image_ready("a.png"), vec![image]);
    assert!(doc.image_ready("other.png").is_empty());

    let recorded = state.borrow();
    assert_eq!(recorded.loaded_images, vec!["a.png".to_owned(), "gone.png".to_owned()]);
    assert_eq!(recorded.errors.len(), 1);
    Ok(())
}

#[test]
fn dropping_the_document_releases_its_fonts() {
    let state = recorder();
    {
        let mut doc = document_with("<p>one <b>two</b></p>", &state);
        doc.render(200.0);
    }
    let recorded = state.borrow();
    assert!(!recorded.font_sizes.is_empty());
    assert_eq!(recorded.deleted_fonts.len(), recorded.font_sizes.len());
}

#[test]
fn language_prefers_the_root_attribute() {
    let (doc, _german) = document(r#"<html lang="de"><body>x</body></html>"#);
    assert_eq!(doc.language(), "de");
    let (plain, _default) = document("<p>x</p>");
    assert_eq!(plain.language(), "en");
}
