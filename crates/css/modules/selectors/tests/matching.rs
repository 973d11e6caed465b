use css_selectors::{
    ElementAdapter, matches_complex, matches_selector_list, parse_complex_selector,
    parse_selector_list,
};

/// Minimal element tree: parent index, tag, id, classes, attributes, hovered flag.
struct Node {
    parent: Option<usize>,
    tag: &'static str,
    id: Option<&'static str>,
    classes: Vec<&'static str>,
    attrs: Vec<(&'static str, &'static str)>,
    hovered: bool,
    has_text: bool,
}

struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn add(&mut self, parent: Option<usize>, tag: &'static str, classes: &[&'static str]) -> usize {
        self.nodes.push(Node {
            parent,
            tag,
            id: None,
            classes: classes.to_vec(),
            attrs: Vec::new(),
            hovered: false,
            has_text: false,
        });
        self.nodes.len() - 1
    }

    fn siblings(&self, element: usize) -> Vec<usize> {
        let parent = self.nodes[element].parent;
        (0..self.nodes.len())
            .filter(|index| self.nodes[*index].parent == parent)
            .collect()
    }
}

impl ElementAdapter for Tree {
    type Handle = usize;

    fn parent(&self, element: usize) -> Option<usize> {
        self.nodes[element].parent
    }

    fn previous_sibling_element(&self, element: usize) -> Option<usize> {
        let siblings = self.siblings(element);
        let position = siblings.iter().position(|sibling| *sibling == element)?;
        position.checked_sub(1).map(|prev| siblings[prev])
    }

    fn next_sibling_element(&self, element: usize) -> Option<usize> {
        let siblings = self.siblings(element);
        let position = siblings.iter().position(|sibling| *sibling == element)?;
        siblings.get(position + 1).copied()
    }

    fn tag_name(&self, element: usize) -> &str {
        self.nodes[element].tag
    }

    fn element_id(&self, element: usize) -> Option<&str> {
        self.nodes[element].id
    }

    fn has_class(&self, element: usize, class: &str) -> bool {
        self.nodes[element].classes.iter().any(|token| *token == class)
    }

    fn attr(&self, element: usize, name: &str) -> Option<&str> {
        self.nodes[element]
            .attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    fn is_empty(&self, element: usize) -> bool {
        !self.nodes[element].has_text && !self.nodes.iter().any(|node| node.parent == Some(element))
    }

    fn is_hovered(&self, element: usize) -> bool {
        self.nodes[element].hovered
    }
}

fn matches(tree: &Tree, element: usize, selector: &str) -> bool {
    let Ok(sel) = parse_complex_selector(selector) else {
        panic!("selector {selector:?} did not parse");
    };
    matches_complex(tree, element, &sel)
}

/// html > body > div.a > div.b > div.b > p.c
fn sample() -> (Tree, usize) {
    let mut tree = Tree { nodes: Vec::new() };
    let html = tree.add(None, "html", &[]);
    let body = tree.add(Some(html), "body", &[]);
    let outer = tree.add(Some(body), "div", &["a"]);
    let middle = tree.add(Some(outer), "div", &["b"]);
    let inner = tree.add(Some(middle), "div", &["b"]);
    let para = tree.add(Some(inner), "p", &["c"]);
    (tree, para)
}

#[test]
fn descendant_combinator_backtracks() {
    let (tree, para) = sample();
    // The nearest `.b` has parent `.b`, the farther `.b` has parent `.a`.
    assert!(matches(&tree, para, ".a > .b .c"));
    assert!(matches(&tree, para, "html .c"));
    assert!(!matches(&tree, para, ".a > .c"));
    assert!(!matches(&tree, para, "span .c"));
}

#[test]
fn structural_pseudo_classes() {
    let mut tree = Tree { nodes: Vec::new() };
    let list = tree.add(None, "ul", &[]);
    let items: Vec<_> = (0..5).map(|_| tree.add(Some(list), "li", &[])).collect();
    let tail = tree.add(Some(list), "span", &[]);
    tree.nodes[items[1]].has_text = true;

    assert!(matches(&tree, list, ":root"));
    assert!(matches(&tree, items[0], "li:first-child"));
    assert!(matches(&tree, items[2], "li:nth-child(odd)"));
    assert!(!matches(&tree, items[3], "li:nth-child(2n+1)"));
    assert!(matches(&tree, items[3], "li:nth-last-child(3)"));
    assert!(matches(&tree, items[4], "li:last-of-type"));
    assert!(!matches(&tree, items[4], "li:last-child"));
    assert!(matches(&tree, tail, "span:last-child:first-of-type"));
    assert!(matches(&tree, items[0], "li:empty"));
    assert!(!matches(&tree, items[1], "li:empty"));
    assert!(matches(&tree, items[1], "li + li"));
    assert!(matches(&tree, tail, "li:first-child ~ span"));
    assert!(matches(&tree, items[2], "li:not(:first-child)"));
}

#[test]
fn attributes_ids_and_hover() {
    let mut tree = Tree { nodes: Vec::new() };
    let anchor = tree.add(None, "a", &["nav"]);
    tree.nodes[anchor].id = Some("home");
    tree.nodes[anchor].attrs = vec![("href", "https://example.com/x.pdf"), ("lang", "en-GB")];

    assert!(matches(&tree, anchor, "a#home.nav"));
    assert!(matches(&tree, anchor, "a:link"));
    assert!(matches(&tree, anchor, "[href$='.pdf'][lang|=en]"));
    assert!(!matches(&tree, anchor, "a:hover"));
    tree.nodes[anchor].hovered = true;
    assert!(matches(&tree, anchor, "a:hover"));
    assert!(!matches(&tree, anchor, "a::before"));

    let list = parse_selector_list("p, a.nav");
    assert!(matches_selector_list(&tree, anchor, &list));
}
