use crate::id_generator::IdGenerator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved id of the tree root. The root is never written to markup.
pub const ROOT_ID: &str = "root";

/// Declares a closed keyword enum with its markup spelling.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$variant_meta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Markup spelling of this keyword
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn from_keyword(keyword: &str) -> Option<Self> {
                match keyword {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyword_enum! {
    /// The closed set of element kinds, spelled as their tag names
    ElementKind {
        Box => "box",
        Text => "text",
        ScrollBox => "scrollbox",
        Input => "input",
        Textarea => "textarea",
        Select => "select",
        TabSelect => "tab-select",
        Slider => "slider",
        AsciiFont => "ascii-font",
    }
}

impl ElementKind {
    /// Tag name used in markup
    pub fn tag(&self) -> &'static str {
        self.as_str()
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::from_keyword(tag)
    }

    /// Label written as `name` when the user never set one
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Box => "Box",
            ElementKind::Text => "Text",
            ElementKind::ScrollBox => "ScrollBox",
            ElementKind::Input => "Input",
            ElementKind::Textarea => "Textarea",
            ElementKind::Select => "Select",
            ElementKind::TabSelect => "TabSelect",
            ElementKind::Slider => "Slider",
            ElementKind::AsciiFont => "AsciiFont",
        }
    }
}

keyword_enum! {
    FlexDirection {
        Row => "row",
        Column => "column",
        RowReverse => "row-reverse",
        ColumnReverse => "column-reverse",
    }
}

keyword_enum! {
    FlexWrap {
        NoWrap => "no-wrap",
        Wrap => "wrap",
        WrapReverse => "wrap-reverse",
    }
}

keyword_enum! {
    JustifyContent {
        FlexStart => "flex-start",
        FlexEnd => "flex-end",
        Center => "center",
        SpaceBetween => "space-between",
        SpaceAround => "space-around",
        SpaceEvenly => "space-evenly",
    }
}

keyword_enum! {
    /// Cross-axis alignment, shared by `alignItems` and `alignSelf`
    Align {
        Auto => "auto",
        FlexStart => "flex-start",
        FlexEnd => "flex-end",
        Center => "center",
        Stretch => "stretch",
        Baseline => "baseline",
    }
}

keyword_enum! {
    PositionType {
        Relative => "relative",
        Absolute => "absolute",
    }
}

keyword_enum! {
    Overflow {
        Visible => "visible",
        Hidden => "hidden",
        Scroll => "scroll",
    }
}

keyword_enum! {
    BorderSide {
        Top => "top",
        Right => "right",
        Bottom => "bottom",
        Left => "left",
    }
}

keyword_enum! {
    BorderStyle {
        Single => "single",
        Double => "double",
        Rounded => "rounded",
        Heavy => "heavy",
    }
}

keyword_enum! {
    TitleAlignment {
        Left => "left",
        Center => "center",
        Right => "right",
    }
}

keyword_enum! {
    WrapMode {
        None => "none",
        Char => "char",
        Word => "word",
    }
}

keyword_enum! {
    #[derive(Default)]
    Orientation {
        #[default]
        Horizontal => "horizontal",
        Vertical => "vertical",
    }
}

keyword_enum! {
    #[derive(Default)]
    AsciiFontFace {
        #[default]
        Tiny => "tiny",
        Block => "block",
        Shade => "shade",
        Slick => "slick",
    }
}

/// A length along one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum Dimension {
    Auto,
    Cells(f64),
    Percent(f64),
}

impl Dimension {
    /// Parse `auto`, `50%` or a plain cell count. Non-finite numbers are rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text == "auto" {
            return Some(Dimension::Auto);
        }
        let finite = |n: &f64| n.is_finite();
        if let Some(percent) = text.strip_suffix('%') {
            return percent.trim().parse().ok().filter(finite).map(Dimension::Percent);
        }
        text.parse().ok().filter(finite).map(Dimension::Cells)
    }
}

/// Which edges of a box draw a border
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    #[default]
    None,
    All,
    Sides(Vec<BorderSide>),
}

/// Layout attributes shared by every element kind.
///
/// Fields are declared in the order the code generator writes them into the
/// `style` object: sizing, flex container, flex item, padding, margin,
/// position, overflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Layout {
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub min_width: Option<Dimension>,
    pub min_height: Option<Dimension>,
    pub max_width: Option<Dimension>,
    pub max_height: Option<Dimension>,

    pub flex_direction: Option<FlexDirection>,
    pub flex_wrap: Option<FlexWrap>,
    pub justify_content: Option<JustifyContent>,
    pub align_items: Option<Align>,
    pub gap: Option<f64>,

    pub flex_grow: Option<f64>,
    pub flex_shrink: Option<f64>,
    pub flex_basis: Option<Dimension>,
    pub align_self: Option<Align>,

    pub padding: Option<f64>,
    pub padding_top: Option<f64>,
    pub padding_right: Option<f64>,
    pub padding_bottom: Option<f64>,
    pub padding_left: Option<f64>,

    pub margin: Option<f64>,
    pub margin_top: Option<f64>,
    pub margin_right: Option<f64>,
    pub margin_bottom: Option<f64>,
    pub margin_left: Option<f64>,

    pub position: Option<PositionType>,
    pub top: Option<Dimension>,
    pub right: Option<Dimension>,
    pub bottom: Option<Dimension>,
    pub left: Option<Dimension>,

    pub overflow: Option<Overflow>,

    /// Written as `visible={false}`, outside the style object
    pub visible: bool,
    /// Written as `backgroundColor`, outside the style object
    pub background_color: Option<String>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
            flex_direction: None,
            flex_wrap: None,
            justify_content: None,
            align_items: None,
            gap: None,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: None,
            align_self: None,
            padding: None,
            padding_top: None,
            padding_right: None,
            padding_bottom: None,
            padding_left: None,
            margin: None,
            margin_top: None,
            margin_right: None,
            margin_bottom: None,
            margin_left: None,
            position: None,
            top: None,
            right: None,
            bottom: None,
            left: None,
            overflow: None,
            visible: true,
            background_color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoxProps {
    pub border: Border,
    pub border_style: Option<BorderStyle>,
    pub border_color: Option<String>,
    pub title: Option<String>,
    pub title_alignment: Option<TitleAlignment>,
}

/// Text content plus the inline emphasis flags set by formatting wrappers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextProps {
    pub content: String,
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub dim: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollBoxProps {
    pub scroll_x: bool,
    pub scroll_y: bool,
    pub sticky_scroll: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputProps {
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub max_length: Option<u32>,
    pub text_color: Option<String>,
    pub cursor_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextareaProps {
    pub placeholder: Option<String>,
    pub initial_value: Option<String>,
    pub wrap_mode: Option<WrapMode>,
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectProps {
    /// Display names; the normalized `value` written next to each is not stored
    pub options: Vec<String>,
    pub selected_index: u32,
    pub show_description: bool,
    pub wrap_selection: bool,
    pub show_scroll_indicator: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabSelectProps {
    pub options: Vec<String>,
    pub tab_width: Option<u32>,
    pub show_underline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SliderProps {
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub orientation: Orientation,
    pub fg: Option<String>,
    pub bg: Option<String>,
}

impl SliderProps {
    pub const DEFAULT_MIN: f64 = 0.0;
    pub const DEFAULT_MAX: f64 = 100.0;
}

impl Default for SliderProps {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
            value: Self::DEFAULT_MIN,
            orientation: Orientation::Horizontal,
            fg: None,
            bg: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AsciiFontProps {
    pub text: String,
    pub font: AsciiFontFace,
    pub color: Option<String>,
}

/// Kind-specific attributes. The variant is fixed for the lifetime of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Element {
    Box(BoxProps),
    Text(TextProps),
    ScrollBox(ScrollBoxProps),
    Input(InputProps),
    Textarea(TextareaProps),
    Select(SelectProps),
    TabSelect(TabSelectProps),
    Slider(SliderProps),
    AsciiFont(AsciiFontProps),
}

impl Element {
    /// All-default attributes for a kind
    pub fn default_for(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Box => Element::Box(BoxProps::default()),
            ElementKind::Text => Element::Text(TextProps::default()),
            ElementKind::ScrollBox => Element::ScrollBox(ScrollBoxProps::default()),
            ElementKind::Input => Element::Input(InputProps::default()),
            ElementKind::Textarea => Element::Textarea(TextareaProps::default()),
            ElementKind::Select => Element::Select(SelectProps::default()),
            ElementKind::TabSelect => Element::TabSelect(TabSelectProps::default()),
            ElementKind::Slider => Element::Slider(SliderProps::default()),
            ElementKind::AsciiFont => Element::AsciiFont(AsciiFontProps::default()),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Box(_) => ElementKind::Box,
            Element::Text(_) => ElementKind::Text,
            Element::ScrollBox(_) => ElementKind::ScrollBox,
            Element::Input(_) => ElementKind::Input,
            Element::Textarea(_) => ElementKind::Textarea,
            Element::Select(_) => ElementKind::Select,
            Element::TabSelect(_) => ElementKind::TabSelect,
            Element::Slider(_) => ElementKind::Slider,
            Element::AsciiFont(_) => ElementKind::AsciiFont,
        }
    }
}

/// One element of the layout tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(flatten)]
    pub element: Element,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(id: impl Into<String>, element: Element) -> Self {
        Self {
            id: id.into(),
            name: None,
            layout: Layout::default(),
            element,
            children: Vec::new(),
        }
    }

    /// An empty tree: a box with the reserved root id
    pub fn root() -> Self {
        Self::new(ROOT_ID, Element::Box(BoxProps::default()))
    }

    /// A fresh node of `kind` with default attributes
    pub fn of_kind(kind: ElementKind, ids: &mut IdGenerator) -> Self {
        Self::new(ids.new_id(), Element::default_for(kind))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.element.kind()
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    /// User label, or the kind's default label
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.kind().label())
    }

    /// Equality of shape and attribute values, ignoring ids
    pub fn structurally_eq(&self, other: &Node) -> bool {
        self.name == other.name
            && self.layout == other.layout
            && self.element == other.element
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.structurally_eq(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::from_tag(kind.tag()), Some(*kind));
        }
        assert_eq!(ElementKind::from_tag("Box"), None);
    }

    #[test]
    fn test_dimension_parse() {
        assert_eq!(Dimension::parse("auto"), Some(Dimension::Auto));
        assert_eq!(Dimension::parse("50%"), Some(Dimension::Percent(50.0)));
        assert_eq!(Dimension::parse("12"), Some(Dimension::Cells(12.0)));
        assert_eq!(Dimension::parse("wide"), None);
        assert_eq!(Dimension::parse("NaN"), None);
        assert_eq!(Dimension::parse("inf%"), None);
    }

    #[test]
    fn test_keyword_defaults() {
        assert_eq!(Orientation::default(), Orientation::Horizontal);
        assert_eq!(AsciiFontFace::default(), AsciiFontFace::Tiny);
        assert_eq!(Orientation::ALL.len(), 2);
    }

    #[test]
    fn test_label_defaults_to_kind() {
        let mut ids = IdGenerator::new();
        let node = Node::of_kind(ElementKind::TabSelect, &mut ids);
        assert_eq!(node.label(), "TabSelect");
        assert_eq!(node.with_name("Tabs").label(), "Tabs");
    }

    #[test]
    fn test_structural_eq_ignores_ids() {
        let a = Node::new("el-1", Element::default_for(ElementKind::Text)).with_name("A");
        let b = Node::new("el-9", Element::default_for(ElementKind::Text)).with_name("A");
        assert!(a.structurally_eq(&b));
        assert_ne!(a, b);

        let c = b.clone().with_name("C");
        assert!(!a.structurally_eq(&c));
    }

    #[test]
    fn test_node_json_shape() {
        let node = Node::new("el-1", Element::default_for(ElementKind::Slider));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "slider");
        assert_eq!(json["max"], 100.0);

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
