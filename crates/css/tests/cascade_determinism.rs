use anyhow::{Result, anyhow};
use css::{
    Dimension, DynamicState, MediaFeatures, Origin, Rgba, SheetSource, Specificity, StyleContext,
    StyleSet, TextAlign, compute_styles,
};
use html::{Dom, NoCustomElements, NodeId, parse_document};

/// Deterministic pseudorandom number generator for tests (xorshift64* variant).
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut value = self.state;
        value ^= value >> 12;
        value ^= value << 25;
        value ^= value >> 27;
        self.state = value;
        value.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn next_index(&mut self, upper: usize) -> usize {
        (self.next_u64() % upper as u64) as usize
    }
}

/// Selectors tried against `<p class="c" data-kind="note">` inside `<div id="x">`,
/// with whether they match and their specificity.
const SELECTORS: [(&str, bool, Specificity); 13] = [
    ("p", true, Specificity(0, 0, 1)),
    (".c", true, Specificity(0, 1, 0)),
    ("p.c", true, Specificity(0, 1, 1)),
    ("div > p", true, Specificity(0, 0, 2)),
    ("#x p", true, Specificity(1, 0, 1)),
    ("#x > p.c", true, Specificity(1, 1, 1)),
    ("[data-kind=note]", true, Specificity(0, 1, 0)),
    ("div p:first-child", true, Specificity(0, 1, 2)),
    ("*", true, Specificity(0, 0, 0)),
    ("span", false, Specificity(0, 0, 1)),
    (".zzz", false, Specificity(0, 1, 0)),
    ("#y p", false, Specificity(1, 0, 1)),
    ("p + p", false, Specificity(0, 0, 2)),
];

fn document() -> Result<(Dom, NodeId)> {
    let mut factory = NoCustomElements;
    let output = parse_document(
        r#"<div id="x" class="a b"><p class="c" data-kind="note">text</p></div>"#,
        &mut factory,
    );
    let dom = output.dom;
    let para = dom
        .descendants(dom.document())
        .find(|node| dom.element(*node).is_some_and(|data| data.tag_name() == "p"))
        .ok_or_else(|| anyhow!("paragraph missing"))?;
    Ok((dom, para))
}

fn color_for(rule: usize) -> Rgba {
    Rgba::new((rule % 256) as u8, (rule / 256) as u8, 7, 255)
}

#[test]
fn winner_matches_reference_sort() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let (dom, para) = document()?;
    let mut rng = DeterministicRng::new(0xC0FF_EE00);

    for round in 0..200 {
        let rule_count = 1 + rng.next_index(12);
        let mut css = String::new();
        let mut best: Option<((bool, Specificity, usize), Rgba)> = None;
        for rule in 0..rule_count {
            let (selector, matches, specificity) = SELECTORS[rng.next_index(SELECTORS.len())];
            let important = rng.next_index(5) == 0;
            let color = color_for(rule);
            css.push_str(&format!(
                "{selector} {{ color: rgb({}, {}, {}){} }}\n",
                color.red,
                color.green,
                color.blue,
                if important { " !important" } else { "" }
            ));
            let key = (important, specificity, rule);
            if matches && best.is_none_or(|(best_key, _)| key > best_key) {
                best = Some((key, color));
            }
        }

        let mut set = StyleSet::new();
        set.add_stylesheet(SheetSource::new(&css, Origin::Author));
        let styles = compute_styles(
            &dom,
            &set,
            &MediaFeatures::default(),
            &DynamicState::default(),
            &StyleContext::default(),
        );
        let resolved = styles
            .get(para)
            .map(|style| style.color)
            .ok_or_else(|| anyhow!("paragraph has no style"))?;
        let expected = best.map_or(Rgba::BLACK, |(_, color)| color);
        assert_eq!(resolved, expected, "round {round} with stylesheet:\n{css}");
    }
    Ok(())
}

#[test]
fn user_and_agent_origins_rank_around_author() -> Result<()> {
    let (dom, para) = document()?;
    let mut set = StyleSet::new();
    set.add_stylesheet(SheetSource::new(
        "p { color: red; text-align: center !important; }",
        Origin::UserAgent,
    ));
    set.add_stylesheet(SheetSource::new(
        "#x p { color: blue } p { text-indent: 3px !important }",
        Origin::User,
    ));
    set.add_stylesheet(SheetSource::new(
        "p { color: green; text-align: right !important; text-indent: 9px !important }",
        Origin::Author,
    ));
    let styles = compute_styles(
        &dom,
        &set,
        &MediaFeatures::default(),
        &DynamicState::default(),
        &StyleContext::default(),
    );
    let style = styles
        .get(para)
        .ok_or_else(|| anyhow!("paragraph has no style"))?;
    // Normal author beats a more specific normal user rule.
    assert_eq!(style.color, Rgba::new(0, 128, 0, 255));
    // Important user and UA declarations beat important author ones.
    assert_eq!(style.text_align, TextAlign::Center);
    assert_eq!(style.text_indent, Dimension::Px(3.0));
    Ok(())
}
