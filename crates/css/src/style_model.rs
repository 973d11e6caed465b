//! Typed computed style.

use crate::values::{Dimension, Rgba};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    ListItem,
    Table,
    InlineTable,
    TableRowGroup,
    TableHeaderGroup,
    TableFooterGroup,
    TableRow,
    TableCell,
    TableCaption,
    TableColumn,
    TableColumnGroup,
    None,
}

impl Display {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "inline" => Self::Inline,
            "block" => Self::Block,
            "inline-block" => Self::InlineBlock,
            "list-item" => Self::ListItem,
            "table" => Self::Table,
            "inline-table" => Self::InlineTable,
            "table-row-group" => Self::TableRowGroup,
            "table-header-group" => Self::TableHeaderGroup,
            "table-footer-group" => Self::TableFooterGroup,
            "table-row" => Self::TableRow,
            "table-cell" => Self::TableCell,
            "table-caption" => Self::TableCaption,
            "table-column" => Self::TableColumn,
            "table-column-group" => Self::TableColumnGroup,
            "none" => Self::None,
            _ => return None,
        })
    }

    /// Boxes that take part in a block formatting context as blocks.
    pub const fn is_block_level(self) -> bool {
        matches!(self, Self::Block | Self::ListItem | Self::Table)
    }

    pub const fn is_inline_level(self) -> bool {
        matches!(self, Self::Inline | Self::InlineBlock | Self::InlineTable)
    }

    pub const fn is_table_part(self) -> bool {
        matches!(
            self,
            Self::TableRowGroup
                | Self::TableHeaderGroup
                | Self::TableFooterGroup
                | Self::TableRow
                | Self::TableCell
                | Self::TableCaption
                | Self::TableColumn
                | Self::TableColumnGroup
        )
    }

    /// CSS 2.1 §9.7: the display a float, absolute box or root turns into.
    pub const fn blockified(self) -> Self {
        match self {
            Self::InlineTable => Self::Table,
            Self::Inline
            | Self::InlineBlock
            | Self::TableRowGroup
            | Self::TableHeaderGroup
            | Self::TableFooterGroup
            | Self::TableRow
            | Self::TableCell
            | Self::TableCaption
            | Self::TableColumn
            | Self::TableColumnGroup => Self::Block,
            other => other,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Clear {
    #[default]
    None,
    Left,
    Right,
    Both,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoxSizing {
    #[default]
    ContentBox,
    BorderBox,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Sub,
    Super,
    Top,
    TextTop,
    Middle,
    Bottom,
    TextBottom,
    /// Raise (positive) or lower the baseline by this many pixels.
    Length(f32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextDecoration {
    pub underline: bool,
    pub overline: bool,
    pub line_through: bool,
}

impl TextDecoration {
    pub const fn is_none(self) -> bool {
        !self.underline && !self.overline && !self.line_through
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WhiteSpace {
    #[default]
    Normal,
    Nowrap,
    Pre,
    PreWrap,
    PreLine,
}

impl WhiteSpace {
    /// Runs of spaces and tabs collapse to one.
    pub const fn collapses_spaces(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// Newlines in the source force a line break.
    pub const fn preserves_newlines(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap | Self::PreLine)
    }

    pub const fn wraps(self) -> bool {
        matches!(self, Self::Normal | Self::PreWrap | Self::PreLine)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LineHeight {
    #[default]
    Normal,
    /// Multiplier of the element's own font size; inherited as a number.
    Number(f32),
    Px(f32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListStyleType {
    None,
    #[default]
    Disc,
    Circle,
    Square,
    Decimal,
    DecimalLeadingZero,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListStylePosition {
    #[default]
    Outside,
    Inside,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BorderCollapse {
    #[default]
    Separate,
    Collapse,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableLayout {
    #[default]
    Auto,
    Fixed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BorderStyle {
    #[default]
    None,
    Hidden,
    Dotted,
    Dashed,
    Solid,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

impl BorderStyle {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "none" => Self::None,
            "hidden" => Self::Hidden,
            "dotted" => Self::Dotted,
            "dashed" => Self::Dashed,
            "solid" => Self::Solid,
            "double" => Self::Double,
            "groove" => Self::Groove,
            "ridge" => Self::Ridge,
            "inset" => Self::Inset,
            "outset" => Self::Outset,
            _ => return None,
        })
    }

    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderSide {
    pub width: f32,
    pub style: BorderStyle,
    /// `None` is `currentColor`.
    pub color: Option<Rgba>,
}

impl Default for BorderSide {
    fn default() -> Self {
        Self {
            width: 3.0,
            style: BorderStyle::None,
            color: None,
        }
    }
}

/// Per-side values in top, right, bottom, left order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sides<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> Sides<T> {
    pub const fn uniform(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Corner radii in top-left, top-right, bottom-right, bottom-left order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Radii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl Radii {
    pub fn is_zero(&self) -> bool {
        self.top_left <= 0.0
            && self.top_right <= 0.0
            && self.bottom_right <= 0.0
            && self.bottom_left <= 0.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundRepeat {
    #[default]
    Repeat,
    RepeatX,
    RepeatY,
    NoRepeat,
}

/// One background image layer. Layers paint last-to-first, the color below all.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundLayer {
    pub image: String,
    pub repeat: BackgroundRepeat,
    pub position_x: Dimension,
    pub position_y: Dimension,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComputedStyle {
    // Inherited.
    pub color: Rgba,
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub line_height: LineHeight,
    pub text_align: TextAlign,
    pub text_indent: Dimension,
    pub text_transform: TextTransform,
    pub text_decoration: TextDecoration,
    pub white_space: WhiteSpace,
    pub visibility: Visibility,
    pub cursor: String,
    pub list_style_type: ListStyleType,
    pub list_style_position: ListStylePosition,
    pub list_style_image: Option<String>,
    pub border_collapse: BorderCollapse,
    /// Horizontal and vertical spacing between table cells.
    pub border_spacing: (f32, f32),

    // Not inherited.
    pub display: Display,
    pub position: Position,
    pub float: Float,
    pub clear: Clear,
    pub overflow: Overflow,
    pub box_sizing: BoxSizing,
    pub vertical_align: VerticalAlign,
    pub margin: Sides<Dimension>,
    pub padding: Sides<Dimension>,
    pub border: Sides<BorderSide>,
    pub border_radius: Radii,
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    /// `None` is `none`.
    pub max_width: Option<Dimension>,
    pub max_height: Option<Dimension>,
    pub offsets: Sides<Dimension>,
    /// `None` is `auto`.
    pub z_index: Option<i32>,
    pub background_color: Rgba,
    pub background_layers: Vec<BackgroundLayer>,
    pub table_layout: TableLayout,
}

impl ComputedStyle {
    /// Initial values with the embedder's default font.
    pub fn initial(font_family: &str, font_size: f32) -> Self {
        Self {
            color: Rgba::BLACK,
            font_family: font_family.to_owned(),
            font_size,
            font_weight: 400,
            font_style: FontStyle::Normal,
            line_height: LineHeight::Normal,
            text_align: TextAlign::Left,
            text_indent: Dimension::Px(0.0),
            text_transform: TextTransform::None,
            text_decoration: TextDecoration::default(),
            white_space: WhiteSpace::Normal,
            visibility: Visibility::Visible,
            cursor: "auto".to_owned(),
            list_style_type: ListStyleType::Disc,
            list_style_position: ListStylePosition::Outside,
            list_style_image: None,
            border_collapse: BorderCollapse::Separate,
            border_spacing: (0.0, 0.0),
            display: Display::Inline,
            position: Position::Static,
            float: Float::None,
            clear: Clear::None,
            overflow: Overflow::Visible,
            box_sizing: BoxSizing::ContentBox,
            vertical_align: VerticalAlign::Baseline,
            margin: Sides::uniform(Dimension::Px(0.0)),
            padding: Sides::uniform(Dimension::Px(0.0)),
            border: Sides::uniform(BorderSide::default()),
            border_radius: Radii::default(),
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Px(0.0),
            min_height: Dimension::Px(0.0),
            max_width: None,
            max_height: None,
            offsets: Sides::uniform(Dimension::Auto),
            z_index: None,
            background_color: Rgba::TRANSPARENT,
            background_layers: Vec::new(),
            table_layout: TableLayout::Auto,
        }
    }

    /// Inherited properties from `parent`, initial values for the rest.
    pub fn inherit_from(parent: &Self) -> Self {
        let mut style = Self::initial(&parent.font_family, parent.font_size);
        style.color = parent.color;
        style.font_weight = parent.font_weight;
        style.font_style = parent.font_style;
        style.line_height = parent.line_height;
        style.text_align = parent.text_align;
        style.text_indent = parent.text_indent;
        style.text_transform = parent.text_transform;
        style.text_decoration = parent.text_decoration;
        style.white_space = parent.white_space;
        style.visibility = parent.visibility;
        style.cursor.clone_from(&parent.cursor);
        style.list_style_type = parent.list_style_type;
        style.list_style_position = parent.list_style_position;
        style.list_style_image.clone_from(&parent.list_style_image);
        style.border_collapse = parent.border_collapse;
        style.border_spacing = parent.border_spacing;
        style
    }

    /// Style of an anonymous block box wrapping inline content of `parent`.
    pub fn anonymous_block(parent: &Self) -> Self {
        let mut style = Self::inherit_from(parent);
        style.display = Display::Block;
        style
    }

    /// Copy one longhand from `source`, used for `inherit` and `initial`.
    pub fn copy_property(&mut self, source: &Self, name: &str) {
        match name {
            "color" => self.color = source.color,
            "font-family" => self.font_family.clone_from(&source.font_family),
            "font-size" => self.font_size = source.font_size,
            "font-weight" => self.font_weight = source.font_weight,
            "font-style" => self.font_style = source.font_style,
            "line-height" => self.line_height = source.line_height,
            "text-align" => self.text_align = source.text_align,
            "text-indent" => self.text_indent = source.text_indent,
            "text-transform" => self.text_transform = source.text_transform,
            "text-decoration" => self.text_decoration = source.text_decoration,
            "white-space" => self.white_space = source.white_space,
            "visibility" => self.visibility = source.visibility,
            "cursor" => self.cursor.clone_from(&source.cursor),
            "list-style-type" => self.list_style_type = source.list_style_type,
            "list-style-position" => self.list_style_position = source.list_style_position,
            "list-style-image" => self.list_style_image.clone_from(&source.list_style_image),
            "border-collapse" => self.border_collapse = source.border_collapse,
            "border-spacing" => self.border_spacing = source.border_spacing,
            "display" => self.display = source.display,
            "position" => self.position = source.position,
            "float" => self.float = source.float,
            "clear" => self.clear = source.clear,
            "overflow" => self.overflow = source.overflow,
            "box-sizing" => self.box_sizing = source.box_sizing,
            "vertical-align" => self.vertical_align = source.vertical_align,
            "margin-top" => self.margin.top = source.margin.top,
            "margin-right" => self.margin.right = source.margin.right,
            "margin-bottom" => self.margin.bottom = source.margin.bottom,
            "margin-left" => self.margin.left = source.margin.left,
            "padding-top" => self.padding.top = source.padding.top,
            "padding-right" => self.padding.right = source.padding.right,
            "padding-bottom" => self.padding.bottom = source.padding.bottom,
            "padding-left" => self.padding.left = source.padding.left,
            "border-top-width" => self.border.top.width = source.border.top.width,
            "border-right-width" => self.border.right.width = source.border.right.width,
            "border-bottom-width" => self.border.bottom.width = source.border.bottom.width,
            "border-left-width" => self.border.left.width = source.border.left.width,
            "border-top-style" => self.border.top.style = source.border.top.style,
            "border-right-style" => self.border.right.style = source.border.right.style,
            "border-bottom-style" => self.border.bottom.style = source.border.bottom.style,
            "border-left-style" => self.border.left.style = source.border.left.style,
            "border-top-color" => self.border.top.color = source.border.top.color,
            "border-right-color" => self.border.right.color = source.border.right.color,
            "border-bottom-color" => self.border.bottom.color = source.border.bottom.color,
            "border-left-color" => self.border.left.color = source.border.left.color,
            "border-top-left-radius" => {
                self.border_radius.top_left = source.border_radius.top_left;
            }
            "border-top-right-radius" => {
                self.border_radius.top_right = source.border_radius.top_right;
            }
            "border-bottom-right-radius" => {
                self.border_radius.bottom_right = source.border_radius.bottom_right;
            }
            "border-bottom-left-radius" => {
                self.border_radius.bottom_left = source.border_radius.bottom_left;
            }
            "width" => self.width = source.width,
            "height" => self.height = source.height,
            "min-width" => self.min_width = source.min_width,
            "min-height" => self.min_height = source.min_height,
            "max-width" => self.max_width = source.max_width,
            "max-height" => self.max_height = source.max_height,
            "top" => self.offsets.top = source.offsets.top,
            "right" => self.offsets.right = source.offsets.right,
            "bottom" => self.offsets.bottom = source.offsets.bottom,
            "left" => self.offsets.left = source.offsets.left,
            "z-index" => self.z_index = source.z_index,
            "background-color" => self.background_color = source.background_color,
            "background-image" | "background-repeat" | "background-position" => {
                self.background_layers.clone_from(&source.background_layers);
            }
            "table-layout" => self.table_layout = source.table_layout,
            _ => {}
        }
    }

    pub fn is_floating(&self) -> bool {
        self.float != Float::None
    }

    pub fn is_out_of_flow_positioned(&self) -> bool {
        matches!(self.position, Position::Absolute | Position::Fixed)
    }

    pub fn is_positioned(&self) -> bool {
        self.position != Position::Static
    }

    /// Used border color of one side.
    pub fn border_color(&self, side: &BorderSide) -> Rgba {
        side.color.unwrap_or(self.color)
    }

    /// Used border widths; sides whose style is none or hidden are zero.
    pub fn border_widths(&self) -> Sides<f32> {
        let width = |side: &BorderSide| {
            if side.style.is_visible() {
                side.width.max(0.0)
            } else {
                0.0
            }
        };
        Sides {
            top: width(&self.border.top),
            right: width(&self.border.right),
            bottom: width(&self.border.bottom),
            left: width(&self.border.left),
        }
    }

    /// Used line height in pixels for this style's font, given the font's
    /// natural line height for `normal`.
    pub fn used_line_height(&self, natural: f32) -> f32 {
        match self.line_height {
            LineHeight::Normal => natural,
            LineHeight::Number(factor) => (factor * self.font_size).max(0.0),
            LineHeight::Px(pixels) => pixels.max(0.0),
        }
    }
}
