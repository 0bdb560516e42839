use crate::ast::*;
use crate::error::{ParseError, ParseResult, Span};
use crate::id_generator::IdGenerator;
use crate::tokenizer::{tokenize, AttrValue, Attribute, SpannedToken, Token};
use std::iter::Peekable;
use std::vec::IntoIter;
use tracing::{debug, instrument};

/// Inline formatting tags. Inside a text element they set flags instead of
/// creating nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wrapper {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Dim,
    Span,
    LineBreak,
}

impl Wrapper {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "strong" | "b" => Some(Wrapper::Bold),
            "em" | "i" => Some(Wrapper::Italic),
            "u" => Some(Wrapper::Underline),
            "s" => Some(Wrapper::Strikethrough),
            "dim" => Some(Wrapper::Dim),
            "span" => Some(Wrapper::Span),
            "br" => Some(Wrapper::LineBreak),
            _ => None,
        }
    }

    fn apply(self, text: &mut TextProps) {
        match self {
            Wrapper::Bold => text.bold = true,
            Wrapper::Italic => text.italic = true,
            Wrapper::Underline => text.underline = true,
            Wrapper::Strikethrough => text.strikethrough = true,
            Wrapper::Dim => text.dim = true,
            Wrapper::Span | Wrapper::LineBreak => {}
        }
    }
}

/// Text collected from the runs inside one text element
#[derive(Default)]
struct TextRuns {
    content: String,
    seen: bool,
}

impl TextRuns {
    fn push_text(&mut self, run: &str) {
        if self.seen && !self.content.ends_with('\n') {
            self.content.push(' ');
        }
        self.content.push_str(run);
        self.seen = true;
    }

    fn push_break(&mut self) {
        self.content.push('\n');
        self.seen = true;
    }

    fn finish(self) -> Option<String> {
        self.seen.then_some(self.content)
    }
}

/// Recursive-descent parser over a token stream
pub struct Parser<'ids> {
    tokens: Peekable<IntoIter<SpannedToken>>,
    end: usize,
    ids: &'ids mut IdGenerator,
}

impl<'ids> Parser<'ids> {
    pub fn new(tokens: Vec<SpannedToken>, ids: &'ids mut IdGenerator) -> Self {
        let end = tokens.last().map(|(_, span)| span.end).unwrap_or(0);
        Self {
            tokens: tokens.into_iter().peekable(),
            end,
            ids,
        }
    }

    /// Parse sibling elements until end of input
    pub fn parse_nodes(&mut self) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();

        while *self.peek() != Token::Eof {
            if let Some(node) = self.parse_child()? {
                nodes.push(node);
            }
        }

        Ok(nodes)
    }

    fn peek(&mut self) -> &Token {
        self.tokens.peek().map(|(token, _)| token).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> SpannedToken {
        let end = self.end;
        self.tokens.next().unwrap_or((Token::Eof, end..end))
    }

    /// Whether the next token belongs to inline text: a run or a formatting wrapper
    fn at_inline(&mut self) -> bool {
        match self.peek() {
            Token::Text(_) => true,
            Token::TagOpen { name, .. } | Token::TagSelfClose { name, .. } => {
                Wrapper::from_tag(name).is_some()
            }
            _ => false,
        }
    }

    /// Consume the closing tag for `expected` if it is next.
    /// Errors on end of input or on a closing tag for anything else.
    fn take_close(&mut self, expected: &str, open_span: &Span) -> ParseResult<bool> {
        let found = match self.peek() {
            Token::Eof => return Err(ParseError::unclosed_tag(expected, open_span.clone())),
            Token::TagClose { name } => name.clone(),
            _ => return Ok(false),
        };

        let (_, span) = self.advance();
        if found == expected {
            Ok(true)
        } else {
            Err(ParseError::MismatchedTag {
                expected: expected.to_string(),
                found,
                span,
            })
        }
    }

    /// Parse one token at element-children level
    fn parse_child(&mut self) -> ParseResult<Option<Node>> {
        let (token, span) = self.advance();
        match token {
            Token::TagOpen { name, attributes } => self.parse_tag(name, attributes, span, false),
            Token::TagSelfClose { name, attributes } => {
                self.parse_tag(name, attributes, span, true)
            }
            Token::TagClose { name } => Err(ParseError::UnexpectedClosingTag { name, span }),
            Token::Text(text) => {
                debug!(%text, "ignoring text outside a text element");
                Ok(None)
            }
            Token::Eof => Ok(None),
        }
    }

    fn parse_tag(
        &mut self,
        name: String,
        attributes: Vec<Attribute>,
        span: Span,
        self_closing: bool,
    ) -> ParseResult<Option<Node>> {
        if let Some(kind) = ElementKind::from_tag(&name) {
            return self
                .parse_element(kind, attributes, span, self_closing)
                .map(Some);
        }

        match Wrapper::from_tag(&name) {
            Some(wrapper) => {
                if !self_closing && wrapper != Wrapper::LineBreak {
                    self.skip_wrapper(&name, &span)?;
                }
                debug!(tag = %name, "skipping formatting tag outside a text element");
                Ok(None)
            }
            None => Err(ParseError::unknown_element(name, span)),
        }
    }

    fn parse_element(
        &mut self,
        kind: ElementKind,
        attributes: Vec<Attribute>,
        span: Span,
        self_closing: bool,
    ) -> ParseResult<Node> {
        let mut node = Node::new(self.ids.new_id(), Element::default_for(kind));
        apply_attributes(&mut node, attributes);

        if self_closing {
            return Ok(node);
        }

        let mut runs = TextRuns::default();
        while !self.take_close(kind.tag(), &span)? {
            let inline = self.at_inline();
            match &mut node.element {
                Element::Text(text) if inline => {
                    self.parse_inline(text, &mut runs, &mut node.children)?
                }
                _ => {
                    if let Some(child) = self.parse_child()? {
                        node.children.push(child);
                    }
                }
            }
        }

        if let (Element::Text(text), Some(content)) = (&mut node.element, runs.finish()) {
            text.content = content;
        }

        Ok(node)
    }

    /// Consume a text run or a formatting wrapper inside a text element.
    ///
    /// Wrappers nest in any order, so `<strong><em>..</em></strong>` and
    /// `<u><strong><em>..</em></strong></u>` both set every flag they mention.
    fn parse_inline(
        &mut self,
        text: &mut TextProps,
        runs: &mut TextRuns,
        children: &mut Vec<Node>,
    ) -> ParseResult<()> {
        let (token, span) = self.advance();
        match token {
            Token::Text(run) => runs.push_text(&run),
            Token::TagSelfClose { name, .. } => {
                if Wrapper::from_tag(&name) == Some(Wrapper::LineBreak) {
                    runs.push_break();
                }
            }
            Token::TagOpen { name, .. } => match Wrapper::from_tag(&name) {
                Some(Wrapper::LineBreak) => runs.push_break(),
                Some(wrapper) => {
                    wrapper.apply(text);
                    while !self.take_close(&name, &span)? {
                        if self.at_inline() {
                            self.parse_inline(text, runs, children)?;
                        } else if let Some(child) = self.parse_child()? {
                            children.push(child);
                        }
                    }
                }
                None => return Err(ParseError::unknown_element(name, span)),
            },
            Token::TagClose { name } => {
                return Err(ParseError::UnexpectedClosingTag { name, span })
            }
            Token::Eof => {}
        }
        Ok(())
    }

    /// Consume a wrapper and everything inside it, balancing nested wrappers of the same name
    fn skip_wrapper(&mut self, name: &str, span: &Span) -> ParseResult<()> {
        let mut depth = 1usize;
        loop {
            let (token, _) = self.advance();
            match token {
                Token::Eof => return Err(ParseError::unclosed_tag(name, span.clone())),
                Token::TagOpen { name: open, .. } if open == name => depth += 1,
                Token::TagClose { name: close } if close == name => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }
}

// ── Attribute mapping ─────────────────────────────────────────────────────

fn apply_attributes(node: &mut Node, attributes: Vec<Attribute>) {
    let kind = node.kind();

    for Attribute { name, value } in attributes {
        let mapped = match name.as_str() {
            "name" => {
                node.name = value
                    .as_str()
                    .filter(|label| *label != kind.label())
                    .map(str::to_string);
                true
            }
            "style" => apply_style(&mut node.layout, &value),
            "visible" => assign(&mut node.layout.visible, value.as_bool()),
            "backgroundColor" => set(&mut node.layout.background_color, string(&value)),
            key => {
                apply_layout(&mut node.layout, key, &value)
                    || apply_element(&mut node.element, key, &value)
            }
        };

        if !mapped {
            debug!(attribute = %name, %kind, "ignoring unrecognized attribute");
        }
    }
}

fn apply_style(layout: &mut Layout, value: &AttrValue) -> bool {
    let AttrValue::Object(entries) = value else {
        return false;
    };

    for (key, entry) in entries {
        if !apply_layout(layout, key, entry) {
            debug!(%key, "ignoring unrecognized style key");
        }
    }
    true
}

fn apply_layout(layout: &mut Layout, key: &str, value: &AttrValue) -> bool {
    match key {
        "width" => set(&mut layout.width, dimension(value)),
        "height" => set(&mut layout.height, dimension(value)),
        "minWidth" => set(&mut layout.min_width, dimension(value)),
        "minHeight" => set(&mut layout.min_height, dimension(value)),
        "maxWidth" => set(&mut layout.max_width, dimension(value)),
        "maxHeight" => set(&mut layout.max_height, dimension(value)),

        "flexDirection" => set(&mut layout.flex_direction, keyword(value, FlexDirection::from_keyword)),
        "flexWrap" => set(&mut layout.flex_wrap, keyword(value, FlexWrap::from_keyword)),
        "justifyContent" => set(&mut layout.justify_content, keyword(value, JustifyContent::from_keyword)),
        "alignItems" => set(&mut layout.align_items, keyword(value, Align::from_keyword)),
        "gap" => set(&mut layout.gap, value.as_f64()),

        "flexGrow" => set(&mut layout.flex_grow, value.as_f64()),
        "flexShrink" => set(&mut layout.flex_shrink, value.as_f64()),
        "flexBasis" => set(&mut layout.flex_basis, dimension(value)),
        "alignSelf" => set(&mut layout.align_self, keyword(value, Align::from_keyword)),

        "padding" => set(&mut layout.padding, value.as_f64()),
        "paddingTop" => set(&mut layout.padding_top, value.as_f64()),
        "paddingRight" => set(&mut layout.padding_right, value.as_f64()),
        "paddingBottom" => set(&mut layout.padding_bottom, value.as_f64()),
        "paddingLeft" => set(&mut layout.padding_left, value.as_f64()),

        "margin" => set(&mut layout.margin, value.as_f64()),
        "marginTop" => set(&mut layout.margin_top, value.as_f64()),
        "marginRight" => set(&mut layout.margin_right, value.as_f64()),
        "marginBottom" => set(&mut layout.margin_bottom, value.as_f64()),
        "marginLeft" => set(&mut layout.margin_left, value.as_f64()),

        "position" => set(&mut layout.position, keyword(value, PositionType::from_keyword)),
        "top" => set(&mut layout.top, dimension(value)),
        "right" => set(&mut layout.right, dimension(value)),
        "bottom" => set(&mut layout.bottom, dimension(value)),
        "left" => set(&mut layout.left, dimension(value)),

        "overflow" => set(&mut layout.overflow, keyword(value, Overflow::from_keyword)),

        _ => false,
    }
}

fn apply_element(element: &mut Element, key: &str, value: &AttrValue) -> bool {
    match element {
        Element::Box(props) => match key {
            "border" => assign(&mut props.border, border(value)),
            "borderStyle" => set(&mut props.border_style, keyword(value, BorderStyle::from_keyword)),
            "borderColor" => set(&mut props.border_color, string(value)),
            "title" => set(&mut props.title, string(value)),
            "titleAlignment" => set(&mut props.title_alignment, keyword(value, TitleAlignment::from_keyword)),
            _ => false,
        },
        Element::Text(props) => match key {
            "content" => assign(&mut props.content, string(value)),
            "fg" => set(&mut props.fg, string(value)),
            "bg" => set(&mut props.bg, string(value)),
            _ => false,
        },
        Element::ScrollBox(props) => match key {
            "scrollX" => assign(&mut props.scroll_x, value.as_bool()),
            "scrollY" => assign(&mut props.scroll_y, value.as_bool()),
            "stickyScroll" => assign(&mut props.sticky_scroll, value.as_bool()),
            _ => false,
        },
        Element::Input(props) => match key {
            "placeholder" => set(&mut props.placeholder, string(value)),
            "value" => set(&mut props.value, string(value)),
            "maxLength" => set(&mut props.max_length, count(value)),
            "textColor" => set(&mut props.text_color, string(value)),
            "cursorColor" => set(&mut props.cursor_color, string(value)),
            _ => false,
        },
        Element::Textarea(props) => match key {
            "placeholder" => set(&mut props.placeholder, string(value)),
            "initialValue" => set(&mut props.initial_value, string(value)),
            "wrapMode" => set(&mut props.wrap_mode, keyword(value, WrapMode::from_keyword)),
            "textColor" => set(&mut props.text_color, string(value)),
            _ => false,
        },
        Element::Select(props) => match key {
            "options" => assign(&mut props.options, options(value)),
            "selectedIndex" => assign(&mut props.selected_index, count(value)),
            "showDescription" => assign(&mut props.show_description, value.as_bool()),
            "wrapSelection" => assign(&mut props.wrap_selection, value.as_bool()),
            "showScrollIndicator" => assign(&mut props.show_scroll_indicator, value.as_bool()),
            _ => false,
        },
        Element::TabSelect(props) => match key {
            "options" => assign(&mut props.options, options(value)),
            "tabWidth" => set(&mut props.tab_width, count(value)),
            "showUnderline" => assign(&mut props.show_underline, value.as_bool()),
            _ => false,
        },
        Element::Slider(props) => match key {
            "min" => assign(&mut props.min, value.as_f64()),
            "max" => assign(&mut props.max, value.as_f64()),
            "value" => assign(&mut props.value, value.as_f64()),
            "orientation" => assign(&mut props.orientation, keyword(value, Orientation::from_keyword)),
            "fg" => set(&mut props.fg, string(value)),
            "bg" => set(&mut props.bg, string(value)),
            _ => false,
        },
        Element::AsciiFont(props) => match key {
            "text" => assign(&mut props.text, string(value)),
            "font" => assign(&mut props.font, keyword(value, AsciiFontFace::from_keyword)),
            "color" => set(&mut props.color, string(value)),
            _ => false,
        },
    }
}

/// Store a converted value; an unconvertible value leaves the field alone
fn assign<T>(slot: &mut T, parsed: Option<T>) -> bool {
    match parsed {
        Some(value) => {
            *slot = value;
            true
        }
        None => false,
    }
}

fn set<T>(slot: &mut Option<T>, parsed: Option<T>) -> bool {
    assign(slot, parsed.map(Some))
}

fn string(value: &AttrValue) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn keyword<T>(value: &AttrValue, from_keyword: fn(&str) -> Option<T>) -> Option<T> {
    value.as_str().and_then(from_keyword)
}

fn dimension(value: &AttrValue) -> Option<Dimension> {
    match value {
        AttrValue::Number(n) => Some(Dimension::Cells(*n)).filter(|_| n.is_finite()),
        other => other.as_str().and_then(Dimension::parse),
    }
}

fn count(value: &AttrValue) -> Option<u32> {
    value
        .as_f64()
        .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32)
}

fn border(value: &AttrValue) -> Option<Border> {
    match value {
        AttrValue::Bool(true) => Some(Border::All),
        AttrValue::Bool(false) => Some(Border::None),
        AttrValue::Array(items) => {
            let sides: Vec<BorderSide> = items
                .iter()
                .filter_map(|item| keyword(item, BorderSide::from_keyword))
                .collect();
            Some(if sides.is_empty() {
                Border::None
            } else {
                Border::Sides(sides)
            })
        }
        _ => None,
    }
}

/// Display names of an option list. Records contribute their `name`;
/// the normalized `value` next to it is not read back.
fn options(value: &AttrValue) -> Option<Vec<String>> {
    let AttrValue::Array(items) = value else {
        return None;
    };

    Some(
        items
            .iter()
            .filter_map(|item| match item {
                AttrValue::Object(_) => item.get("name").and_then(AttrValue::as_str),
                other => other.as_str(),
            })
            .map(str::to_string)
            .collect(),
    )
}

// ── Entry points ──────────────────────────────────────────────────────────

/// Tokenize and parse with a scratch copy of `ids`, committed only on success
fn parse_nodes(source: &str, ids: &mut IdGenerator) -> ParseResult<Vec<Node>> {
    if source.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let tokens = tokenize(source)?;
    let mut scratch = ids.clone();
    let nodes = Parser::new(tokens, &mut scratch).parse_nodes()?;

    if nodes.is_empty() {
        return Err(ParseError::NoElement);
    }

    *ids = scratch;
    Ok(nodes)
}

/// Parse markup holding any number of sibling elements, in source order
#[instrument(skip_all, fields(len = source.len()))]
pub fn parse_multiple(source: &str, ids: &mut IdGenerator) -> ParseResult<Vec<Node>> {
    let nodes = parse_nodes(source, ids)?;
    debug!(count = nodes.len(), "parsed sibling elements");
    Ok(nodes)
}

/// Parse markup holding exactly one top-level element
#[instrument(skip_all, fields(len = source.len()))]
pub fn parse(source: &str, ids: &mut IdGenerator) -> ParseResult<Node> {
    let mut scratch = ids.clone();
    let mut nodes = parse_nodes(source, &mut scratch)?;

    if nodes.len() != 1 {
        return Err(ParseError::MultipleRoots { count: nodes.len() });
    }

    *ids = scratch;
    Ok(nodes.remove(0))
}
