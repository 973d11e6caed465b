use anyhow::{Result, anyhow};
use css::{
    ComputedStyles, DEFAULT_STYLESHEET, DynamicState, MediaFeatures, Origin, SheetSource,
    StyleContext, StyleSet, compute_styles,
};
use html::{Dom, NoCustomElements, NodeId, parse_document};
use layout::{
    FontDescriptor, FontHandle, FontInfo, FontMetrics, LayoutContext, LayoutTree, Point, Rect,
    RenderKind, Size, layout_document,
};

/// Monospace stand-in for a real font backend: every character advances half
/// the font size and lines are a quarter taller than the font.
struct FixedFonts {
    sizes: Vec<f32>,
}

impl LayoutContext for FixedFonts {
    fn font(&mut self, descriptor: &FontDescriptor) -> FontInfo {
        let size = descriptor.size;
        let handle = self
            .sizes
            .iter()
            .position(|known| (known - size).abs() < f32::EPSILON)
            .unwrap_or_else(|| {
                self.sizes.push(size);
                self.sizes.len() - 1
            });
        FontInfo {
            handle: FontHandle(handle as u64),
            metrics: FontMetrics {
                ascent: size * 0.8,
                descent: size * 0.2,
                height: (size * 1.25).round(),
                x_height: size * 0.5,
            },
        }
    }

    fn text_width(&mut self, text: &str, font: FontHandle) -> f32 {
        let size = self.sizes.get(font.0 as usize).copied().unwrap_or(16.0);
        text.chars().count() as f32 * size * 0.5
    }

    fn image_size(&mut self, url: &str) -> Option<Size> {
        (url == "pixel.png").then_some(Size::new(30.0, 20.0))
    }

    fn client_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }
}

struct Laid {
    dom: Dom,
    tree: LayoutTree,
}

impl Laid {
    fn node(&self, id: &str) -> Result<NodeId> {
        self.dom
            .element_by_id(id)
            .ok_or_else(|| anyhow!("no element #{id}"))
    }

    fn placement(&self, id: &str) -> Result<Rect> {
        let node = self.node(id)?;
        self.tree
            .element_placement(node)
            .ok_or_else(|| anyhow!("#{id} has no box"))
    }
}

fn lay_out(markup: &str, author: &str, width: f32) -> Result<Laid> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dom = parse_document(markup, &mut NoCustomElements).dom;
    let mut set = StyleSet::new();
    set.add_stylesheet(SheetSource::new(DEFAULT_STYLESHEET, Origin::UserAgent));
    set.add_stylesheet(SheetSource::new(author, Origin::Author));
    let styles = compute_styles(
        &dom,
        &set,
        &MediaFeatures::default(),
        &DynamicState::default(),
        &StyleContext::default(),
    );
    let mut fonts = FixedFonts { sizes: Vec::new() };
    let tree = layout_document(&dom, &styles, &mut fonts, width, 1);
    Ok(Laid { dom, tree })
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn adjoining_margins_collapse() -> Result<()> {
    for (first, second, gap) in [(10.0, 20.0, 20.0), (-10.0, 20.0, 10.0), (-10.0, -20.0, -20.0)] {
        let css = format!(
            "body {{ margin: 0 }} div {{ height: 30px }} \
             #a {{ margin-bottom: {first}px }} #b {{ margin-top: {second}px }}"
        );
        let laid = lay_out(r#"<div id="a"></div><div id="b"></div>"#, &css, 400.0)?;
        let first_box = laid.placement("a")?;
        let second_box = laid.placement("b")?;
        assert_close(second_box.y - first_box.bottom(), gap);
    }
    Ok(())
}

#[test]
fn lines_flow_around_a_float_until_its_bottom() -> Result<()> {
    let laid = lay_out(
        r#"<div id="f"></div><p id="p">a<br>b<br>c<br>d</p>"#,
        "body { margin: 0 } p { margin: 0 } #f { float: left; width: 100px; height: 50px }",
        400.0,
    )?;
    let para = laid.node("p")?;
    let first = *laid
        .tree
        .items_for(para)
        .first()
        .ok_or_else(|| anyhow!("paragraph has no render item"))?;
    let item = laid
        .tree
        .get(first)
        .ok_or_else(|| anyhow!("stale render id"))?;
    let starts: Vec<f32> = item.lines.iter().map(|line| line.rect.x).collect();
    assert_eq!(starts.len(), 4);
    assert_close(starts[0], 100.0);
    assert_close(starts[2], 100.0);
    assert_close(starts[3], 0.0);
    // The paragraph box itself is not displaced by the float.
    assert_close(item.geometry.border_box.x, 0.0);
    Ok(())
}

#[test]
fn auto_width_table_spreads_columns_by_content() -> Result<()> {
    let laid = lay_out(
        r#"<table id="t"><tr><td id="a">aaaa</td><td id="b">bbbbbb</td></tr></table>"#,
        "body { margin: 0; font-size: 20px } table { border-spacing: 0; width: 200px } \
         td { padding: 0 }",
        400.0,
    )?;
    assert_close(laid.placement("t")?.width, 200.0);
    let left = laid.placement("a")?;
    let right = laid.placement("b")?;
    assert_close(left.width, 80.0);
    assert_close(right.width, 120.0);
    assert_close(right.x, left.right());
    Ok(())
}

#[test]
fn floats_shrink_to_fit_their_content() -> Result<()> {
    let laid = lay_out(
        r#"<div id="f">aaaa bb</div><div id="c"></div>"#,
        "body { margin: 0; font-size: 20px } #f { float: right } \
         #c { width: 100px; height: 10px; margin: 0 auto }",
        300.0,
    )?;
    let float = laid.placement("f")?;
    assert_close(float.width, 70.0);
    assert_close(float.right(), 300.0);
    assert_close(laid.placement("c")?.x, 100.0);
    Ok(())
}

#[test]
fn absolute_box_resolves_against_positioned_ancestor() -> Result<()> {
    let laid = lay_out(
        r#"<div id="c"><div id="p"></div></div>"#,
        "body { margin: 0 } \
         #c { position: relative; margin-left: 30px; width: 200px; height: 100px } \
         #p { position: absolute; right: 10px; top: 5px; width: 50px; height: 20px }",
        400.0,
    )?;
    let placed = laid.placement("p")?;
    assert_close(placed.x, 170.0);
    assert_close(placed.y, 5.0);
    assert_close(laid.placement("c")?.height, 100.0);
    Ok(())
}

#[test]
fn outside_marker_sits_left_of_the_item() -> Result<()> {
    let laid = lay_out(
        r#"<ul><li id="l">item</li></ul>"#,
        "body { margin: 0 } ul { margin: 0 }",
        400.0,
    )?;
    let item_box = laid.placement("l")?;
    assert_close(item_box.x, 40.0);
    let marker = laid
        .tree
        .arena()
        .ids()
        .filter_map(|id| laid.tree.get(id))
        .find(|item| item.kind == RenderKind::ListMarker)
        .ok_or_else(|| anyhow!("no marker generated"))?;
    assert!(marker.geometry.border_box.right() <= item_box.x);
    assert!(marker.geometry.border_box.width > 0.0);
    Ok(())
}

#[test]
fn replaced_images_use_their_natural_size() -> Result<()> {
    let laid = lay_out(
        r#"<img id="i" src="pixel.png"><img id="j" src="pixel.png" width="60">"#,
        "body { margin: 0 }",
        400.0,
    )?;
    let natural = laid.placement("i")?;
    assert_close(natural.width, 30.0);
    assert_close(natural.height, 20.0);
    let scaled = laid.placement("j")?;
    assert_close(scaled.width, 60.0);
    assert_close(scaled.height, 40.0);
    Ok(())
}

#[test]
fn hit_test_prefers_boxes_painted_last() -> Result<()> {
    let laid = lay_out(
        r#"<div id="flow"></div><div id="high"></div><div id="low"></div>"#,
        "body { margin: 0 } #flow { height: 200px } \
         #high, #low { position: absolute; left: 0; top: 0; width: 100px; height: 100px } \
         #high { z-index: 2 } #low { z-index: 1 }",
        400.0,
    )?;
    let node_at = |x: f32, y: f32| {
        laid.tree
            .hit_test(Point::new(x, y))
            .and_then(|id| laid.tree.get(id))
            .map(|item| item.node)
    };
    assert_eq!(node_at(10.0, 10.0), Some(laid.node("high")?));
    assert_eq!(node_at(10.0, 150.0), Some(laid.node("flow")?));
    Ok(())
}

#[test]
fn hidden_overflow_clips_hit_testing() -> Result<()> {
    let laid = lay_out(
        r#"<div id="clip"><div id="tall"></div></div>"#,
        "body { margin: 0 } #clip { overflow: hidden; height: 50px } #tall { height: 200px }",
        400.0,
    )?;
    let inside = laid
        .tree
        .hit_test(Point::new(5.0, 20.0))
        .and_then(|id| laid.tree.get(id))
        .map(|item| item.node);
    assert_eq!(inside, Some(laid.node("tall")?));
    let below = laid
        .tree
        .hit_test(Point::new(5.0, 120.0))
        .and_then(|id| laid.tree.get(id))
        .map(|item| item.node);
    assert_ne!(below, Some(laid.node("tall")?));
    Ok(())
}

#[test]
fn layout_is_deterministic() -> Result<()> {
    let markup = r#"<p>Some words that wrap <b>across</b> lines.</p>
        <table><tr><td>x</td><td rowspan="2">y</td></tr><tr><td>z</td></tr></table>
        <ol><li>one</li><li style="float:left">two</li></ol>"#;
    let first = lay_out(markup, "", 120.0)?;
    let second = lay_out(markup, "", 120.0)?;
    let boxes = |laid: &Laid| -> Vec<Rect> {
        laid.tree
            .arena()
            .ids()
            .filter_map(|id| laid.tree.get(id))
            .map(|item| item.geometry.border_box)
            .collect()
    };
    assert_eq!(boxes(&first), boxes(&second));
    assert_eq!(first.tree.size(), second.tree.size());
    Ok(())
}

#[test]
fn empty_document_has_no_boxes() {
    let dom = Dom::new();
    let styles = ComputedStyles::default();
    let mut fonts = FixedFonts { sizes: Vec::new() };
    let tree = layout_document(&dom, &styles, &mut fonts, 500.0, 3);
    assert!(tree.root().is_none());
    assert_eq!(tree.size(), Size::default());
    assert!(tree.hit_test(Point::new(1.0, 1.0)).is_none());
    assert_eq!(tree.generation(), 3);
}

/// Line boxes of the first render item of `id`.
fn line_count(laid: &Laid, id: &str) -> Result<usize> {
    let node = laid.node(id)?;
    let first = *laid
        .tree
        .items_for(node)
        .first()
        .ok_or_else(|| anyhow!("#{id} has no render item"))?;
    let item = laid
        .tree
        .get(first)
        .ok_or_else(|| anyhow!("stale render id"))?;
    Ok(item.lines.len())
}

/// Border box of the first text run reading `text`.
fn word_box(laid: &Laid, text: &str) -> Result<Rect> {
    laid.tree
        .arena()
        .ids()
        .filter_map(|id| laid.tree.get(id))
        .find(|item| item.kind == RenderKind::Text && item.text.as_deref() == Some(text))
        .map(|item| item.geometry.border_box)
        .ok_or_else(|| anyhow!("no text run {text:?}"))
}

#[test]
fn negative_width_clamps_to_zero() -> Result<()> {
    let laid = lay_out(
        r#"<div id="a" style="width:-10px;height:10px"></div>"#,
        "body { margin: 0 }",
        300.0,
    )?;
    let placed = laid.placement("a")?;
    assert_close(placed.width, 0.0);
    assert_close(placed.height, 10.0);
    Ok(())
}

#[test]
fn positioned_box_answers_outside_the_overflow_clip() -> Result<()> {
    let laid = lay_out(
        r#"<div id="o"><div id="abs"></div></div>"#,
        "body { margin: 0 } #o { overflow: hidden; width: 100px; height: 50px } \
         #abs { position: absolute; left: 200px; top: 200px; width: 50px; height: 50px }",
        400.0,
    )?;
    let hit = laid
        .tree
        .hit_test(Point::new(210.0, 210.0))
        .and_then(|id| laid.tree.get(id))
        .map(|item| item.node);
    assert_eq!(hit, Some(laid.node("abs")?));
    Ok(())
}

#[test]
fn white_space_modes_control_breaks() -> Result<()> {
    let laid = lay_out(
        "<div id=\"normal\">aaa bbb ccc</div>\
         <div id=\"nowrap\">aaa bbb ccc</div>\
         <div id=\"wrap\">aaa bbb ccc</div>\
         <div id=\"pre\">a  b\nc</div>\
         <div id=\"line\">x   y\nz</div>",
        "body { margin: 0 } div { width: 40px } \
         #nowrap { white-space: nowrap } #wrap { white-space: pre-wrap } \
         #pre { white-space: pre; width: 400px } #line { white-space: pre-line; width: 400px }",
        400.0,
    )?;
    assert_eq!(line_count(&laid, "normal")?, 3);
    assert_eq!(line_count(&laid, "nowrap")?, 1);
    assert_eq!(line_count(&laid, "wrap")?, 3);

    // `pre` keeps both spaces and the newline.
    assert_eq!(line_count(&laid, "pre")?, 2);
    assert_close(word_box(&laid, "b")?.x, 24.0);
    // `pre-line` collapses the spaces but still breaks at the newline.
    assert_eq!(line_count(&laid, "line")?, 2);
    assert_close(word_box(&laid, "y")?.x, 16.0);
    Ok(())
}

#[test]
fn text_align_and_indent_shift_words() -> Result<()> {
    let laid = lay_out(
        "<div id=\"r\">ab</div><div id=\"c\">cd</div>\
         <div id=\"j\">aa bb cc</div><div id=\"i\">ef gh</div>",
        "body { margin: 0 } div { width: 200px } \
         #r { text-align: right } #c { text-align: center } \
         #j { text-align: justify; width: 60px } #i { text-indent: 24px }",
        400.0,
    )?;
    assert_close(word_box(&laid, "ab")?.x, 184.0);
    assert_close(word_box(&laid, "cd")?.x, 92.0);

    // The first line is stretched to the edge; the last line is not.
    assert_eq!(line_count(&laid, "j")?, 2);
    assert_close(word_box(&laid, "bb")?.right(), 60.0);
    assert_close(word_box(&laid, "cc")?.x, 0.0);

    assert_close(word_box(&laid, "ef")?.x, 24.0);
    assert_close(word_box(&laid, "gh")?.x, 48.0);
    Ok(())
}

#[test]
fn cleared_block_drops_below_the_float() -> Result<()> {
    let laid = lay_out(
        r#"<div id="f"></div><div id="n"></div><div id="c"></div>"#,
        "body { margin: 0 } #f { float: left; width: 100px; height: 50px } \
         #n { height: 10px } #c { clear: left; height: 10px }",
        400.0,
    )?;
    assert_close(laid.placement("n")?.y, 0.0);
    assert!(laid.placement("c")?.y >= 50.0);
    Ok(())
}

#[test]
fn fixed_table_takes_widths_from_the_first_row() -> Result<()> {
    let laid = lay_out(
        r#"<table id="t"><tr><td id="a">x</td><td id="b">y</td></tr>
           <tr><td id="s" colspan="2">wide</td></tr></table>"#,
        "body { margin: 0 } \
         table { table-layout: fixed; width: 300px; border-spacing: 0 } \
         td { padding: 0 } #a { width: 100px }",
        400.0,
    )?;
    let first = laid.placement("a")?;
    let second = laid.placement("b")?;
    assert_close(first.width, 100.0);
    assert_close(second.width, 200.0);
    assert_close(second.x, first.right());
    let spanning = laid.placement("s")?;
    assert_close(spanning.x, 0.0);
    assert_close(spanning.width, 300.0);
    Ok(())
}

#[test]
fn relative_offsets_shift_the_box() -> Result<()> {
    let laid = lay_out(
        r#"<div id="r"></div><div id="next"></div>"#,
        "body { margin: 0 } div { height: 20px } \
         #r { position: relative; left: 10px; top: 5px; width: 50px }",
        400.0,
    )?;
    let shifted = laid.placement("r")?;
    assert_close(shifted.x, 10.0);
    assert_close(shifted.y, 5.0);
    // Following content flows as if the box had not moved.
    assert_close(laid.placement("next")?.y, 20.0);
    Ok(())
}

#[test]
fn inside_markers_count_in_their_own_style() -> Result<()> {
    let laid = lay_out(
        r#"<ol id="o"><li>one</li><li>two</li><li id="l">three</li></ol>
           <ol start="4" id="alpha"><li>four</li></ol>"#,
        "body { margin: 0 } ol { margin: 0; list-style-position: inside } \
         #o { list-style-type: upper-roman } #alpha { list-style-type: lower-alpha }",
        400.0,
    )?;
    let markers: Vec<_> = laid
        .tree
        .arena()
        .ids()
        .filter_map(|id| laid.tree.get(id))
        .filter(|item| item.kind == RenderKind::ListMarker)
        .collect();
    let texts: Vec<&str> = markers
        .iter()
        .filter_map(|marker| marker.text.as_deref())
        .collect();
    assert_eq!(texts, vec!["I.", "II.", "III.", "d."]);

    let item_box = laid.placement("l")?;
    let marker = markers
        .iter()
        .find(|marker| marker.text.as_deref() == Some("III."))
        .ok_or_else(|| anyhow!("third marker missing"))?;
    assert!(marker.geometry.border_box.x >= item_box.x);
    assert!(word_box(&laid, "three")?.x >= marker.geometry.border_box.right());
    Ok(())
}
