mod common;

use anyhow::{Result, anyhow};
use common::{by_id, covers, document, placement};
use css::Rgba;
use layout::Rect;

const BLOCKS: &str = r#"<style>body { margin: 0 } div { height: 40px }</style>
    <div id="a"></div><div id="b"></div>"#;

#[test]
fn hover_enters_and_leaves_elements() -> Result<()> {
    let (mut doc, _state) = document(BLOCKS);
    doc.render(400.0);
    let a = by_id(&doc, "a")?;
    let b = by_id(&doc, "b")?;

    let response = doc.on_pointer_move(10.0, 10.0);
    assert_eq!(doc.get_over_element(), Some(a));
    assert!(covers(&response.redraw, placement(&doc, "a")?));
    assert!(doc.hover_item().is_some());

    let response = doc.on_pointer_move(10.0, 50.0);
    assert_eq!(doc.get_over_element(), Some(b));
    assert!(covers(&response.redraw, placement(&doc, "a")?));
    assert!(covers(&response.redraw, placement(&doc, "b")?));

    // Moving within the same element redraws nothing.
    assert!(doc.on_pointer_move(20.0, 60.0).redraw.is_empty());

    let response = doc.on_pointer_move(10.0, 500.0);
    assert_eq!(doc.get_over_element(), None);
    assert!(covers(&response.redraw, placement(&doc, "b")?));
    Ok(())
}

#[test]
fn pointer_leave_clears_hover() -> Result<()> {
    let (mut doc, _state) = document(BLOCKS);
    doc.render(400.0);
    doc.on_pointer_move(10.0, 10.0);
    let response = doc.on_pointer_leave();
    assert_eq!(doc.get_over_element(), None);
    assert!(covers(&response.redraw, placement(&doc, "a")?));
    assert!(doc.on_pointer_leave().redraw.is_empty());
    Ok(())
}

#[test]
fn get_element_at_answers_the_innermost_element() -> Result<()> {
    let (mut doc, _state) = document(BLOCKS);
    doc.render(400.0);
    assert_eq!(doc.get_element_at(5.0, 45.0), Some(by_id(&doc, "b")?));
    assert_eq!(doc.get_element_at(5.0, 500.0), None);
    Ok(())
}

#[test]
fn hover_rules_restyle_the_hovered_chain() -> Result<()> {
    let (mut doc, _state) = document(
        r#"<style>body { margin: 0 } #a { height: 40px }
           #a:hover { background-color: #00ff00 }</style><div id="a"></div>"#,
    );
    doc.render(400.0);
    let a = by_id(&doc, "a")?;
    let background = |doc: &page::Document| -> Result<Rgba> {
        doc.styles()
            .get(a)
            .map(|style| style.background_color)
            .ok_or_else(|| anyhow!("no style for #a"))
    };
    assert!(background(&doc)?.is_transparent());

    let response = doc.on_pointer_move(5.0, 5.0);
    assert_eq!(background(&doc)?, Rgba::new(0, 255, 0, 255));
    assert!(covers(&response.redraw, placement(&doc, "a")?));

    doc.on_pointer_move(5.0, 300.0);
    assert!(background(&doc)?.is_transparent());
    Ok(())
}

#[test]
fn hover_that_resizes_the_document_redraws_everything() -> Result<()> {
    let (mut doc, _state) = document(
        r#"<style>body { margin: 0 } div { height: 40px } #a:hover { height: 60px }</style>
           <div id="a"></div><div id="b"></div>"#,
    );
    let before = doc.render(400.0);
    let response = doc.on_pointer_move(5.0, 5.0);
    assert_eq!(placement(&doc, "a")?.height, 60.0);
    assert_eq!(placement(&doc, "b")?.y, 60.0);
    assert!(doc.size().height > before.height);
    assert_eq!(response.redraw.len(), 1);
    assert!(covers(&response.redraw, placement(&doc, "b")?));
    Ok(())
}

#[test]
fn active_rules_follow_the_pressed_button() -> Result<()> {
    let (mut doc, _state) = document(
        r#"<style>body { margin: 0 } #a { height: 40px }
           #a:active { color: #ff0000 }</style><div id="a">x</div>"#,
    );
    doc.render(400.0);
    let a = by_id(&doc, "a")?;
    let color = |doc: &page::Document| -> Result<Rgba> {
        doc.styles()
            .get(a)
            .map(|style| style.color)
            .ok_or_else(|| anyhow!("no style for #a"))
    };

    let pressed = doc.on_pointer_down(5.0, 30.0);
    assert_eq!(color(&doc)?, Rgba::new(255, 0, 0, 255));
    assert!(covers(&pressed.redraw, placement(&doc, "a")?));

    let released = doc.on_pointer_up(5.0, 30.0);
    assert_eq!(color(&doc)?, Rgba::BLACK);
    assert!(!released.redraw.is_empty());
    assert!(released.anchor.is_none());
    Ok(())
}

const LINK: &str = r#"<html><head><base href="http://example.com/dir/">
    <style>body { margin: 0 } p { margin: 0 }</style></head>
    <body><p><a id="l" href="page2.html">link</a></p><p id="after">after</p></body></html>"#;

#[test]
fn clicking_a_link_reports_the_resolved_url() -> Result<()> {
    let (mut doc, state) = document(LINK);
    doc.render(400.0);
    let link = by_id(&doc, "l")?;

    doc.on_pointer_down(4.0, 4.0);
    let response = doc.on_pointer_up(6.0, 5.0);
    let activation = response
        .anchor
        .ok_or_else(|| anyhow!("link was not activated"))?;
    assert_eq!(activation.url, "http://example.com/dir/page2.html");
    assert_eq!(activation.node, link);
    assert_eq!(
        state.borrow().anchors,
        vec![("http://example.com/dir/page2.html".to_owned(), link)]
    );
    Ok(())
}

#[test]
fn releasing_elsewhere_does_not_follow_the_link() -> Result<()> {
    let (mut doc, state) = document(LINK);
    doc.render(400.0);
    let after = placement(&doc, "after")?;

    doc.on_pointer_down(4.0, 4.0);
    let response = doc.on_pointer_up(after.x + 2.0, after.y + 2.0);
    assert!(response.anchor.is_none());
    assert!(state.borrow().anchors.is_empty());

    // A release with no matching press is ignored.
    assert!(doc.on_pointer_up(4.0, 4.0).anchor.is_none());
    Ok(())
}

#[test]
fn cursor_follows_the_hovered_element() -> Result<()> {
    let (mut doc, state) = document(LINK);
    doc.render(400.0);
    let after = placement(&doc, "after")?;

    doc.on_pointer_move(4.0, 4.0);
    doc.on_pointer_move(5.0, 5.0);
    doc.on_pointer_move(after.x + 2.0, after.y + 2.0);
    assert_eq!(
        state.borrow().cursors,
        vec!["pointer".to_owned(), "auto".to_owned()]
    );
    Ok(())
}

fn has_duplicates(rects: &[Rect]) -> bool {
    rects
        .iter()
        .enumerate()
        .any(|(index, rect)| rects[..index].contains(rect))
}

#[test]
fn hover_on_a_child_redraws_the_restyled_parent() -> Result<()> {
    let (mut doc, _state) = document(
        r#"<style>body { margin: 0 } #a { padding: 20px }
           #a:hover { background-color: #00ff00 } #b { height: 100px }</style>
           <div id="a"><div id="b"></div></div>"#,
    );
    doc.render(400.0);
    let parent = placement(&doc, "a")?;
    assert_eq!(parent, Rect::new(0.0, 0.0, 400.0, 140.0));

    let entered = doc.on_pointer_move(30.0, 30.0);
    assert_eq!(doc.get_over_element(), Some(by_id(&doc, "b")?));
    assert!(covers(&entered.redraw, parent));

    let left = doc.on_pointer_move(5.0, 500.0);
    assert_eq!(doc.get_over_element(), None);
    assert!(covers(&left.redraw, parent));
    assert!(!has_duplicates(&left.redraw));
    Ok(())
}

#[test]
fn pressing_inside_a_link_redraws_the_link() -> Result<()> {
    let (mut doc, _state) = document(
        r#"<style>body { margin: 0 } a:active { color: #ff0000 }</style>
           <a id="lnk" href="x"><b>x</b></a>"#,
    );
    doc.render(400.0);
    let link = by_id(&doc, "lnk")?;
    let pressed = doc.on_pointer_down(2.0, 2.0);
    let color = doc
        .styles()
        .get(link)
        .map(|style| style.color)
        .ok_or_else(|| anyhow!("no style for the link"))?;
    assert_eq!(color, Rgba::new(255, 0, 0, 255));
    assert!(covers(&pressed.redraw, placement(&doc, "lnk")?));
    assert!(!has_duplicates(&pressed.redraw));
    Ok(())
}

#[test]
fn unchanged_geometry_is_redrawn_once() -> Result<()> {
    let (mut doc, _state) = document(
        r#"<style>body { margin: 0 } div { height: 40px }
           div:hover { color: #0000ff }</style>
           <div id="a">x</div><div id="b">y</div>"#,
    );
    doc.render(400.0);
    doc.on_pointer_move(10.0, 10.0);
    let response = doc.on_pointer_move(10.0, 50.0);
    assert!(covers(&response.redraw, placement(&doc, "a")?));
    assert!(covers(&response.redraw, placement(&doc, "b")?));
    assert!(!has_duplicates(&response.redraw));
    Ok(())
}
