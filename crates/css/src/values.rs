//! Value types shared by the property parsers: lengths, dimensions and colors.
//! Spec: <https://www.w3.org/TR/css-values-3/>

/// An 8-bit RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn is_transparent(self) -> bool {
        self.alpha == 0
    }
}

/// Resolves color names csscolorparser does not know (system colors, embedder
/// palettes) into a color string it does.
pub trait ColorResolver {
    fn resolve_color(&self, name: &str) -> Option<String>;
}

/// Parse a CSS color. Unknown identifiers are offered to `resolver`.
pub fn parse_color(text: &str, resolver: Option<&dyn ColorResolver>) -> Option<Rgba> {
    let trimmed = text.trim();
    if let Ok(color) = csscolorparser::parse(trimmed) {
        let [red, green, blue, alpha] = color.to_rgba8();
        return Some(Rgba::new(red, green, blue, alpha));
    }
    let is_ident = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-');
    if !is_ident {
        return None;
    }
    let resolved = resolver?.resolve_color(trimmed)?;
    csscolorparser::parse(resolved.trim()).ok().map(|color| {
        let [red, green, blue, alpha] = color.to_rgba8();
        Rgba::new(red, green, blue, alpha)
    })
}

/// A specified length before resolution. Absolute physical units are folded
/// into points at parse time; `pt` is then converted with the embedder's DPI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f32),
    Pt(f32),
    Em(f32),
    Ex(f32),
    Rem(f32),
    Percent(f32),
    Vw(f32),
    Vh(f32),
}

/// Everything needed to turn a [`Length`] into pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LengthContext {
    pub font_size: f32,
    pub root_font_size: f32,
    /// Pixels per point.
    pub pt_to_px: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for LengthContext {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            root_font_size: 16.0,
            pt_to_px: 96.0 / 72.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

impl Length {
    /// Pixels for every unit except percentages, which need a basis.
    pub fn to_px(self, ctx: &LengthContext) -> Option<f32> {
        Some(match self {
            Self::Px(value) => value,
            Self::Pt(value) => value * ctx.pt_to_px,
            Self::Em(value) => value * ctx.font_size,
            Self::Ex(value) => value * ctx.font_size * 0.5,
            Self::Rem(value) => value * ctx.root_font_size,
            Self::Vw(value) => value * ctx.viewport_width / 100.0,
            Self::Vh(value) => value * ctx.viewport_height / 100.0,
            Self::Percent(_) => return None,
        })
    }
}

/// Parse a single length token: `12px`, `1.5em`, `50%`, `0`.
pub fn parse_length(text: &str) -> Option<Length> {
    let trimmed = text.trim();
    if let Some(number) = trimmed.strip_suffix('%') {
        return number.trim().parse().ok().map(Length::Percent);
    }
    let split = trimmed
        .find(|ch: char| ch.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let value: f32 = number.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(match unit.to_ascii_lowercase().as_str() {
        "" if value == 0.0 => Length::Px(0.0),
        "px" => Length::Px(value),
        "pt" => Length::Pt(value),
        "pc" => Length::Pt(value * 12.0),
        "in" => Length::Pt(value * 72.0),
        "cm" => Length::Pt(value * 72.0 / 2.54),
        "mm" => Length::Pt(value * 72.0 / 25.4),
        "em" => Length::Em(value),
        "ex" => Length::Ex(value),
        "rem" => Length::Rem(value),
        "vw" => Length::Vw(value),
        "vh" => Length::Vh(value),
        _ => return None,
    })
}

/// A computed length-percentage-or-auto. Pixel lengths are absolute by the
/// time they are stored; percentages are resolved during layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Dimension {
    #[default]
    Auto,
    Px(f32),
    Percent(f32),
}

impl Dimension {
    /// Resolve against a percentage basis. `Auto` and percentages against an
    /// unknown basis yield `None`.
    pub fn resolve(self, basis: Option<f32>) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Px(value) => Some(value),
            Self::Percent(percent) => basis.map(|base| base * percent / 100.0),
        }
    }

    /// Resolve, treating `auto` and unresolvable percentages as zero.
    pub fn resolve_or_zero(self, basis: f32) -> f32 {
        self.resolve(Some(basis)).unwrap_or(0.0)
    }

    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// Parse a `<length-percentage> | auto` into a computed [`Dimension`].
pub fn parse_dimension(text: &str, ctx: &LengthContext) -> Option<Dimension> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("auto") {
        return Some(Dimension::Auto);
    }
    match parse_length(trimmed)? {
        Length::Percent(percent) => Some(Dimension::Percent(percent)),
        length => length.to_px(ctx).map(Dimension::Px),
    }
}

/// Extract the target of `url(...)`, with or without quotes.
pub fn parse_url(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let lowered = trimmed.get(..4)?.to_ascii_lowercase();
    if lowered != "url(" || !trimmed.ends_with(')') {
        return None;
    }
    let inner = trimmed.get(4..trimmed.len() - 1)?.trim();
    let unquoted = inner
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| inner.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')))
        .unwrap_or(inner);
    Some(unquoted.to_owned())
}

/// Split a value on top-level whitespace, keeping function arguments and
/// quoted strings together (`url(a b) no-repeat` yields two tokens).
pub fn split_value_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0_i32;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;
    for (index, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => {
                quote = Some(ch);
                start.get_or_insert(index);
            }
            (None, '(') => {
                depth += 1;
                start.get_or_insert(index);
            }
            (None, ')') => depth -= 1,
            (None, _) if ch.is_whitespace() && depth <= 0 => {
                if let Some(begin) = start.take() {
                    tokens.push(text.get(begin..index).unwrap_or_default());
                }
            }
            _ => {
                start.get_or_insert(index);
            }
        }
    }
    if let Some(begin) = start {
        tokens.push(text.get(begin..).unwrap_or_default());
    }
    tokens
}
