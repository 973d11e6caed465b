//! Media Queries Level 3: parsing and evaluation.
//! Spec: <https://www.w3.org/TR/mediaqueries-3/>
//!
//! Queries are parsed once and evaluated against a [`MediaFeatures`] snapshot
//! supplied by the embedder. A query that fails to parse evaluates to false
//! ("not all") without affecting the other queries of the list.

use cssparser::{Parser, ParserInput, Token};

/// Media types.
/// Spec: Section 2.3, Media types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    All,
    Screen,
    Print,
    Speech,
    /// Legacy types (`tv`, `handheld`, ...) that never match a modern device.
    Other,
}

impl MediaType {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "all" => Self::All,
            "screen" => Self::Screen,
            "print" => Self::Print,
            "speech" => Self::Speech,
            _ => Self::Other,
        }
    }

    fn matches(self, device: Self) -> bool {
        self == Self::All || self == device
    }
}

/// Device description queries are evaluated against. Lengths are CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaFeatures {
    pub media_type: MediaType,
    pub width: f32,
    pub height: f32,
    pub device_width: f32,
    pub device_height: f32,
    /// Bits per color component, 0 for monochrome devices.
    pub color: u32,
    pub color_index: u32,
    pub monochrome: u32,
    /// Dots per CSS inch.
    pub resolution: f32,
}

impl Default for MediaFeatures {
    fn default() -> Self {
        Self {
            media_type: MediaType::Screen,
            width: 800.0,
            height: 600.0,
            device_width: 800.0,
            device_height: 600.0,
            color: 8,
            color_index: 0,
            monochrome: 0,
            resolution: 96.0,
        }
    }
}

/// Range prefix of a feature name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Range {
    Min,
    Max,
    Exact,
}

/// Features the engine evaluates.
/// Spec: Section 4, Media features
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Feature {
    Width,
    Height,
    DeviceWidth,
    DeviceHeight,
    Orientation,
    AspectRatio,
    DeviceAspectRatio,
    Color,
    ColorIndex,
    Monochrome,
    Resolution,
    Grid,
}

impl Feature {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "width" => Self::Width,
            "height" => Self::Height,
            "device-width" => Self::DeviceWidth,
            "device-height" => Self::DeviceHeight,
            "orientation" => Self::Orientation,
            "aspect-ratio" => Self::AspectRatio,
            "device-aspect-ratio" => Self::DeviceAspectRatio,
            "color" => Self::Color,
            "color-index" => Self::ColorIndex,
            "monochrome" => Self::Monochrome,
            "resolution" => Self::Resolution,
            "grid" => Self::Grid,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
enum FeatureValue {
    Number(f32),
    Ident(String),
}

/// One `(feature: value)` test.
#[derive(Clone, Debug, PartialEq)]
struct Expression {
    feature: Feature,
    range: Range,
    value: Option<FeatureValue>,
}

impl Expression {
    fn evaluate(&self, device: &MediaFeatures) -> bool {
        let actual = match self.feature {
            Feature::Width => device.width,
            Feature::Height => device.height,
            Feature::DeviceWidth => device.device_width,
            Feature::DeviceHeight => device.device_height,
            Feature::AspectRatio => ratio(device.width, device.height),
            Feature::DeviceAspectRatio => ratio(device.device_width, device.device_height),
            Feature::Color => device.color as f32,
            Feature::ColorIndex => device.color_index as f32,
            Feature::Monochrome => device.monochrome as f32,
            Feature::Resolution => device.resolution,
            Feature::Grid => 0.0,
            Feature::Orientation => {
                let portrait = device.height >= device.width;
                return match &self.value {
                    Some(FeatureValue::Ident(ident)) => match ident.as_str() {
                        "portrait" => portrait,
                        "landscape" => !portrait,
                        _ => false,
                    },
                    None => true,
                    Some(FeatureValue::Number(_)) => false,
                };
            }
        };
        match &self.value {
            None => actual != 0.0,
            Some(FeatureValue::Number(expected)) => match self.range {
                Range::Min => actual >= *expected,
                Range::Max => actual <= *expected,
                Range::Exact => (actual - expected).abs() < 0.01,
            },
            Some(FeatureValue::Ident(_)) => false,
        }
    }
}

fn ratio(width: f32, height: f32) -> f32 {
    if height > 0.0 { width / height } else { 0.0 }
}

/// A single media query.
/// Spec: Section 3, Syntax
#[derive(Clone, Debug, PartialEq)]
pub struct MediaQuery {
    negated: bool,
    media_type: MediaType,
    expressions: Vec<Expression>,
    /// Set when the query failed to parse; it then never matches.
    invalid: bool,
}

impl MediaQuery {
    fn never() -> Self {
        Self {
            negated: false,
            media_type: MediaType::All,
            expressions: Vec::new(),
            invalid: true,
        }
    }

    pub fn matches(&self, device: &MediaFeatures) -> bool {
        if self.invalid {
            return false;
        }
        let result = self.media_type.matches(device.media_type)
            && self
                .expressions
                .iter()
                .all(|expression| expression.evaluate(device));
        result != self.negated
    }
}

/// A comma-separated list of queries. An empty list matches every device.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaQueryList {
    queries: Vec<MediaQuery>,
}

impl MediaQueryList {
    pub fn matches(&self, device: &MediaFeatures) -> bool {
        self.queries.is_empty() || self.queries.iter().any(|query| query.matches(device))
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Parse a media query list such as `screen and (min-width: 600px), print`.
pub fn parse_media_query_list(text: &str) -> MediaQueryList {
    let queries = text
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            parse_query(part).unwrap_or_else(|| {
                log::debug!("media query {part:?} is invalid, treating as not all");
                MediaQuery::never()
            })
        })
        .collect();
    MediaQueryList { queries }
}

fn parse_query(text: &str) -> Option<MediaQuery> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut query = MediaQuery {
        negated: false,
        media_type: MediaType::All,
        expressions: Vec::new(),
        invalid: false,
    };
    let mut seen_type = false;
    let mut expect_and = false;
    while let Ok(token) = parser.next() {
        match token.clone() {
            Token::Ident(ident) => {
                let lowered = ident.to_ascii_lowercase();
                match lowered.as_str() {
                    "not" if !seen_type && !expect_and => query.negated = true,
                    "only" if !seen_type && !expect_and => {}
                    "and" if expect_and => expect_and = false,
                    _ if !seen_type && !expect_and && query.expressions.is_empty() => {
                        query.media_type = MediaType::from_name(&lowered);
                        seen_type = true;
                        expect_and = true;
                    }
                    _ => return None,
                }
            }
            Token::ParenthesisBlock if !expect_and => {
                let expression = parser
                    .parse_nested_block(|block| {
                        parse_expression(block)
                            .ok_or_else(|| block.new_custom_error::<(), ()>(()))
                    })
                    .ok()?;
                query.expressions.push(expression);
                expect_and = true;
            }
            _ => return None,
        }
    }
    let dangling_and = !expect_and && (seen_type || !query.expressions.is_empty());
    if dangling_and || (query.negated && !seen_type) {
        return None;
    }
    Some(query)
}

fn parse_expression(block: &mut Parser) -> Option<Expression> {
    let name = block.expect_ident().ok()?.to_ascii_lowercase();
    let (range, bare) = if let Some(rest) = name.strip_prefix("min-") {
        (Range::Min, rest)
    } else if let Some(rest) = name.strip_prefix("max-") {
        (Range::Max, rest)
    } else {
        (Range::Exact, name.as_str())
    };
    let feature = Feature::from_name(bare)?;
    if block.is_exhausted() {
        return (range == Range::Exact).then_some(Expression {
            feature,
            range,
            value: None,
        });
    }
    block.expect_colon().ok()?;
    let value = match block.next().ok()?.clone() {
        Token::Number { value, .. } => {
            if block.try_parse(|inner| inner.expect_delim('/')).is_ok() {
                let denominator = block.expect_number().ok()?;
                FeatureValue::Number(ratio(value, denominator))
            } else {
                FeatureValue::Number(value)
            }
        }
        Token::Dimension { value, unit, .. } => {
            FeatureValue::Number(to_pixels_or_dpi(value, &unit.to_ascii_lowercase())?)
        }
        Token::Ident(ident) => FeatureValue::Ident(ident.to_ascii_lowercase()),
        _ => return None,
    };
    block.is_exhausted().then_some(Expression {
        feature,
        range,
        value: Some(value),
    })
}

/// Convert a length to CSS pixels, or a resolution to dots per inch.
fn to_pixels_or_dpi(value: f32, unit: &str) -> Option<f32> {
    Some(match unit {
        "px" => value,
        "em" | "rem" => value * 16.0,
        "pt" => value * 96.0 / 72.0,
        "pc" => value * 16.0,
        "in" => value * 96.0,
        "cm" => value * 96.0 / 2.54,
        "mm" => value * 96.0 / 25.4,
        "dpi" => value,
        "dpcm" => value * 2.54,
        "dppx" | "x" => value * 96.0,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(width: f32, height: f32) -> MediaFeatures {
        MediaFeatures {
            width,
            height,
            device_width: width,
            device_height: height,
            ..MediaFeatures::default()
        }
    }

    #[test]
    fn types_and_widths() {
        let device = screen(800.0, 600.0);
        assert!(parse_media_query_list("").matches(&device));
        assert!(parse_media_query_list("screen").matches(&device));
        assert!(!parse_media_query_list("print").matches(&device));
        assert!(parse_media_query_list("print, screen and (min-width: 600px)").matches(&device));
        assert!(!parse_media_query_list("screen and (max-width: 50em)").matches(&device));
        assert!(parse_media_query_list("not print").matches(&device));
        assert!(parse_media_query_list("(orientation: landscape)").matches(&device));
        assert!(parse_media_query_list("(min-aspect-ratio: 4/3)").matches(&device));
        assert!(parse_media_query_list("all and (color)").matches(&device));
    }

    #[test]
    fn malformed_query_is_not_all() {
        let device = screen(800.0, 600.0);
        assert!(!parse_media_query_list("screen and (bogus-feature: 1)").matches(&device));
        assert!(parse_media_query_list("screen and, print, screen").matches(&device));
    }
}
