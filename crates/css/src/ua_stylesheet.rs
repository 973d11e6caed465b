//! Default (master) stylesheet and per-tag display defaults.
//!
//! The stylesheet is plain text handed to each document at construction, so
//! documents with different defaults can coexist.

use crate::style_model::Display;

/// HTML rendering defaults in the spirit of the HTML Standard's rendering section.
pub const DEFAULT_STYLESHEET: &str = r"
html { display: block; }
head, title, style, script, link, meta, base, template, noscript { display: none; }
body { display: block; margin: 8px; }

p, dl, multicol { display: block; margin-top: 1em; margin-bottom: 1em; }
dd { display: block; margin-left: 40px; }
dt, div, center, address, article, aside, footer, header, main, nav, section,
figure, figcaption, form, fieldset, legend, details, summary, hgroup { display: block; }
blockquote { display: block; margin: 1em 40px; }
center { text-align: center; }

h1 { display: block; font-size: 2em; font-weight: bold; margin: 0.67em 0; }
h2 { display: block; font-size: 1.5em; font-weight: bold; margin: 0.83em 0; }
h3 { display: block; font-size: 1.17em; font-weight: bold; margin: 1em 0; }
h4 { display: block; font-weight: bold; margin: 1.33em 0; }
h5 { display: block; font-size: 0.83em; font-weight: bold; margin: 1.67em 0; }
h6 { display: block; font-size: 0.67em; font-weight: bold; margin: 2.33em 0; }

pre, listing, xmp, plaintext { display: block; white-space: pre; margin: 1em 0; font-family: monospace; }
code, kbd, samp, tt { font-family: monospace; }
b, strong, th { font-weight: bold; }
i, em, cite, var, dfn, address { font-style: italic; }
u, ins { text-decoration: underline; }
s, strike, del { text-decoration: line-through; }
big { font-size: larger; }
small { font-size: smaller; }
sub { vertical-align: sub; font-size: smaller; }
sup { vertical-align: super; font-size: smaller; }
nobr { white-space: nowrap; }

a:link { color: #0000ee; text-decoration: underline; cursor: pointer; }

hr { display: block; margin: 0.5em auto; border: 1px inset gray; }
br { display: inline; }
img { display: inline-block; }

ul, menu, dir { display: block; list-style-type: disc; margin: 1em 0; padding-left: 40px; }
ol { display: block; list-style-type: decimal; margin: 1em 0; padding-left: 40px; }
ul ul, ol ul { list-style-type: circle; margin-top: 0; margin-bottom: 0; }
ul ul ul, ol ul ul, ul ol ul, ol ol ul { list-style-type: square; }
ol ol, ul ol { margin-top: 0; margin-bottom: 0; }
li { display: list-item; }

table { display: table; border-spacing: 2px; border-collapse: separate; }
caption { display: table-caption; text-align: center; }
thead { display: table-header-group; vertical-align: middle; }
tbody { display: table-row-group; vertical-align: middle; }
tfoot { display: table-footer-group; vertical-align: middle; }
tr { display: table-row; vertical-align: inherit; }
td, th { display: table-cell; vertical-align: inherit; padding: 1px; }
th { text-align: center; }
col { display: table-column; }
colgroup { display: table-column-group; }
";

/// Display used when no rule sets `display`, so an empty default stylesheet
/// still yields a sensible box tree.
pub fn default_display(tag: &str) -> Display {
    match tag {
        "html" | "body" | "div" | "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol"
        | "menu" | "dir" | "dl" | "dt" | "dd" | "blockquote" | "pre" | "listing" | "xmp"
        | "plaintext" | "center" | "hr" | "form" | "fieldset" | "legend" | "address"
        | "article" | "aside" | "footer" | "header" | "main" | "nav" | "section" | "figure"
        | "figcaption" | "details" | "summary" | "hgroup" => Display::Block,
        "head" | "title" | "style" | "script" | "link" | "meta" | "base" | "template"
        | "noscript" => Display::None,
        "li" => Display::ListItem,
        "img" => Display::InlineBlock,
        "table" => Display::Table,
        "caption" => Display::TableCaption,
        "thead" => Display::TableHeaderGroup,
        "tbody" => Display::TableRowGroup,
        "tfoot" => Display::TableFooterGroup,
        "tr" => Display::TableRow,
        "td" | "th" => Display::TableCell,
        "col" => Display::TableColumn,
        "colgroup" => Display::TableColumnGroup,
        _ => Display::Inline,
    }
}
