use crate::ast::*;
use std::fmt::Write;

/// Serializer converts a tree back to markup.
///
/// Output is deterministic: attributes at their defaults are omitted, `name`
/// is always written, and layout keys appear in a fixed order, so generating
/// the same tree twice yields the same bytes.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "  ".to_string(),
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent.to_string(),
        }
    }

    /// Serialize the children of `root`, one top-level element per line.
    /// The root's own attributes are never written.
    pub fn serialize(&mut self, root: &Node) -> String {
        let mut output = String::new();
        for child in &root.children {
            self.serialize_node(child, &mut output);
        }
        output
    }

    /// Serialize one element and its subtree at the current indent level
    pub fn serialize_node(&mut self, node: &Node, output: &mut String) {
        self.write_indent(output);
        output.push('<');
        output.push_str(node.kind().tag());
        serialize_attributes(node, output);

        match &node.element {
            Element::Text(text) => self.serialize_text_body(node, text, output),
            _ if node.children.is_empty() => output.push_str(" />\n"),
            _ => {
                output.push_str(">\n");
                self.serialize_children(node, output);
                self.write_close(node, output);
            }
        }
    }

    fn serialize_text_body(&mut self, node: &Node, text: &TextProps, output: &mut String) {
        let has_flags = text.bold || text.italic || text.underline || text.strikethrough || text.dim;

        if text.content.is_empty() && !has_flags && node.children.is_empty() {
            output.push_str(" />\n");
            return;
        }

        output.push('>');
        let inline = wrap_formatting(text, &inline_content(&text.content));

        if node.children.is_empty() {
            output.push_str(&inline);
            output.push_str("</text>\n");
            return;
        }

        output.push('\n');
        self.indent_level += 1;
        if !inline.is_empty() {
            self.write_indent(output);
            output.push_str(&inline);
            output.push('\n');
        }
        self.indent_level -= 1;
        self.serialize_children(node, output);
        self.write_close(node, output);
    }

    fn serialize_children(&mut self, node: &Node, output: &mut String) {
        self.indent_level += 1;
        for child in &node.children {
            self.serialize_node(child, output);
        }
        self.indent_level -= 1;
    }

    fn write_close(&self, node: &Node, output: &mut String) {
        self.write_indent(output);
        output.push_str("</");
        output.push_str(node.kind().tag());
        output.push_str(">\n");
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate markup for the children of `root`
pub fn generate(root: &Node) -> String {
    Serializer::new().serialize(root)
}

/// Generate markup for a single element and its subtree
pub fn generate_node(node: &Node) -> String {
    let mut output = String::new();
    Serializer::new().serialize_node(node, &mut output);
    output
}

// ── Attributes ────────────────────────────────────────────────────────────

fn serialize_attributes(node: &Node, output: &mut String) {
    write_string_attr(output, "name", node.label());

    let style = style_entries(&node.layout);
    if !style.is_empty() {
        let body: Vec<String> = style
            .into_iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect();
        let _ = write!(output, " style={{{{{}}}}}", body.join(", "));
    }

    if !node.layout.visible {
        output.push_str(" visible={false}");
    }
    write_opt_string_attr(output, "backgroundColor", &node.layout.background_color);

    match &node.element {
        Element::Box(props) => {
            match &props.border {
                Border::None => {}
                Border::All => write_flag(output, "border", true),
                Border::Sides(sides) => {
                    let items: Vec<String> = sides.iter().map(|side| quote_js(side.as_str())).collect();
                    let _ = write!(output, " border={{[{}]}}", items.join(", "));
                }
            }
            write_keyword_attr(output, "borderStyle", props.border_style);
            write_opt_string_attr(output, "borderColor", &props.border_color);
            write_opt_string_attr(output, "title", &props.title);
            write_keyword_attr(output, "titleAlignment", props.title_alignment);
        }
        Element::Text(props) => {
            write_opt_string_attr(output, "fg", &props.fg);
            write_opt_string_attr(output, "bg", &props.bg);
        }
        Element::ScrollBox(props) => {
            write_flag(output, "scrollX", props.scroll_x);
            write_flag(output, "scrollY", props.scroll_y);
            write_flag(output, "stickyScroll", props.sticky_scroll);
        }
        Element::Input(props) => {
            write_opt_string_attr(output, "placeholder", &props.placeholder);
            write_opt_string_attr(output, "value", &props.value);
            if let Some(max_length) = props.max_length {
                let _ = write!(output, " maxLength={{{}}}", max_length);
            }
            write_opt_string_attr(output, "textColor", &props.text_color);
            write_opt_string_attr(output, "cursorColor", &props.cursor_color);
        }
        Element::Textarea(props) => {
            write_opt_string_attr(output, "placeholder", &props.placeholder);
            write_opt_string_attr(output, "initialValue", &props.initial_value);
            write_keyword_attr(output, "wrapMode", props.wrap_mode);
            write_opt_string_attr(output, "textColor", &props.text_color);
        }
        Element::Select(props) => {
            write_options(output, &props.options);
            if props.selected_index != 0 {
                let _ = write!(output, " selectedIndex={{{}}}", props.selected_index);
            }
            write_flag(output, "showDescription", props.show_description);
            write_flag(output, "wrapSelection", props.wrap_selection);
            write_flag(output, "showScrollIndicator", props.show_scroll_indicator);
        }
        Element::TabSelect(props) => {
            write_options(output, &props.options);
            if let Some(tab_width) = props.tab_width {
                let _ = write!(output, " tabWidth={{{}}}", tab_width);
            }
            write_flag(output, "showUnderline", props.show_underline);
        }
        Element::Slider(props) => {
            write_number_attr(output, "min", props.min, SliderProps::DEFAULT_MIN);
            write_number_attr(output, "max", props.max, SliderProps::DEFAULT_MAX);
            write_number_attr(output, "value", props.value, SliderProps::DEFAULT_MIN);
            if props.orientation != Orientation::default() {
                write_string_attr(output, "orientation", props.orientation.as_str());
            }
            write_opt_string_attr(output, "fg", &props.fg);
            write_opt_string_attr(output, "bg", &props.bg);
        }
        Element::AsciiFont(props) => {
            if !props.text.is_empty() {
                write_string_attr(output, "text", &props.text);
            }
            if props.font != AsciiFontFace::default() {
                write_string_attr(output, "font", props.font.as_str());
            }
            write_opt_string_attr(output, "color", &props.color);
        }
    }
}

/// Non-default layout keys with their rendered values, in style-object order
fn style_entries(layout: &Layout) -> Vec<(&'static str, String)> {
    let mut entries = Vec::new();

    let dimensions = [
        ("width", layout.width),
        ("height", layout.height),
        ("minWidth", layout.min_width),
        ("minHeight", layout.min_height),
        ("maxWidth", layout.max_width),
        ("maxHeight", layout.max_height),
    ];
    for (key, value) in dimensions {
        push_entry(&mut entries, key, value.map(dimension_literal));
    }

    push_entry(&mut entries, "flexDirection", layout.flex_direction.map(|v| quote_js(v.as_str())));
    push_entry(&mut entries, "flexWrap", layout.flex_wrap.map(|v| quote_js(v.as_str())));
    push_entry(&mut entries, "justifyContent", layout.justify_content.map(|v| quote_js(v.as_str())));
    push_entry(&mut entries, "alignItems", layout.align_items.map(|v| quote_js(v.as_str())));
    push_entry(&mut entries, "gap", layout.gap.map(fmt_number));

    push_entry(&mut entries, "flexGrow", layout.flex_grow.map(fmt_number));
    push_entry(&mut entries, "flexShrink", layout.flex_shrink.map(fmt_number));
    push_entry(&mut entries, "flexBasis", layout.flex_basis.map(dimension_literal));
    push_entry(&mut entries, "alignSelf", layout.align_self.map(|v| quote_js(v.as_str())));

    let spacing = [
        ("padding", layout.padding),
        ("paddingTop", layout.padding_top),
        ("paddingRight", layout.padding_right),
        ("paddingBottom", layout.padding_bottom),
        ("paddingLeft", layout.padding_left),
        ("margin", layout.margin),
        ("marginTop", layout.margin_top),
        ("marginRight", layout.margin_right),
        ("marginBottom", layout.margin_bottom),
        ("marginLeft", layout.margin_left),
    ];
    for (key, value) in spacing {
        push_entry(&mut entries, key, value.map(fmt_number));
    }

    push_entry(&mut entries, "position", layout.position.map(|v| quote_js(v.as_str())));
    let offsets = [
        ("top", layout.top),
        ("right", layout.right),
        ("bottom", layout.bottom),
        ("left", layout.left),
    ];
    for (key, value) in offsets {
        push_entry(&mut entries, key, value.map(dimension_literal));
    }

    push_entry(&mut entries, "overflow", layout.overflow.map(|v| quote_js(v.as_str())));

    entries
}

fn push_entry(entries: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value {
        entries.push((key, value));
    }
}

fn dimension_literal(dimension: Dimension) -> String {
    match dimension {
        Dimension::Auto => quote_js("auto"),
        Dimension::Cells(cells) => fmt_number(cells),
        Dimension::Percent(percent) => format!("\"{}%\"", fmt_number(percent)),
    }
}

fn write_string_attr(output: &mut String, key: &str, value: &str) {
    if value.contains(|c: char| matches!(c, '"' | '\\' | '\n')) {
        let _ = write!(output, " {}={{{}}}", key, quote_js(value));
    } else {
        let _ = write!(output, " {}=\"{}\"", key, value);
    }
}

fn write_opt_string_attr(output: &mut String, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        write_string_attr(output, key, value);
    }
}

fn write_keyword_attr<K: std::fmt::Display>(output: &mut String, key: &str, value: Option<K>) {
    if let Some(value) = value {
        write_string_attr(output, key, &value.to_string());
    }
}

fn write_flag(output: &mut String, key: &str, value: bool) {
    if value {
        output.push(' ');
        output.push_str(key);
    }
}

fn write_number_attr(output: &mut String, key: &str, value: f64, default: f64) {
    if value != default {
        let _ = write!(output, " {}={{{}}}", key, fmt_number(value));
    }
}

fn write_options(output: &mut String, options: &[String]) {
    if options.is_empty() {
        return;
    }
    let records: Vec<String> = options
        .iter()
        .map(|name| {
            format!(
                "{{name: {}, value: {}}}",
                quote_js(name),
                quote_js(&option_value(name))
            )
        })
        .collect();
    let _ = write!(output, " options={{[{}]}}", records.join(", "));
}

/// Cosmetic value written next to an option name: lowercased, whitespace runs as `_`
pub fn option_value(name: &str) -> String {
    let mut value = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                value.push('_');
            }
            in_space = true;
        } else {
            value.extend(ch.to_lowercase());
            in_space = false;
        }
    }
    value
}

/// Shortest decimal form: `3`, `0.5`, `-2`
pub fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Double-quoted string literal with `\`, `"` and control characters escaped
pub fn quote_js(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

// ── Text content ──────────────────────────────────────────────────────────

/// Content as inline markup: lines joined by `<br />`, segments that would not
/// survive tokenizing as plain text written as `{"..."}` literals
fn inline_content(content: &str) -> String {
    content
        .split('\n')
        .map(|segment| {
            let plain = !segment.contains(|c: char| matches!(c, '<' | '>' | '{' | '}'))
                && segment.trim() == segment;
            if plain {
                segment.to_string()
            } else {
                format!("{{{}}}", quote_js(segment))
            }
        })
        .collect::<Vec<_>>()
        .join("<br />")
}

/// Wrap inline content in formatting tags, innermost first:
/// bold+italic as one pair, then underline, strikethrough, dim
fn wrap_formatting(text: &TextProps, inner: &str) -> String {
    let mut wrapped = match (text.bold, text.italic) {
        (true, true) => format!("<strong><em>{}</em></strong>", inner),
        (true, false) => format!("<strong>{}</strong>", inner),
        (false, true) => format!("<em>{}</em>", inner),
        (false, false) => inner.to_string(),
    };

    for (flag, tag) in [(text.underline, "u"), (text.strikethrough, "s"), (text.dim, "dim")] {
        if flag {
            wrapped = format!("<{tag}>{wrapped}</{tag}>");
        }
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_generator::IdGenerator;

    fn root_with(children: Vec<Node>) -> Node {
        Node::root().with_children(children)
    }

    fn text_node(ids: &mut IdGenerator, props: TextProps) -> Node {
        Node::new(ids.new_id(), Element::Text(props))
    }

    #[test]
    fn test_root_attributes_are_not_emitted() {
        let mut root = Node::root().with_name("Screen");
        root.layout.width = Some(Dimension::Cells(80.0));
        assert_eq!(generate(&root), "");
    }

    #[test]
    fn test_default_node_emits_only_name() {
        let mut ids = IdGenerator::new();
        let root = root_with(vec![Node::of_kind(ElementKind::Select, &mut ids)]);
        assert_eq!(generate(&root), "<select name=\"Select\" />\n");
    }

    #[test]
    fn test_nested_indentation() {
        let mut ids = IdGenerator::new();
        let text = text_node(
            &mut ids,
            TextProps {
                content: "Hello".into(),
                ..Default::default()
            },
        );
        let inner = Node::of_kind(ElementKind::Box, &mut ids).with_children(vec![text]);
        let outer = Node::of_kind(ElementKind::Box, &mut ids)
            .with_name("Panel")
            .with_children(vec![inner]);

        let expected = "\
<box name=\"Panel\">
  <box name=\"Box\">
    <text name=\"Text\">Hello</text>
  </box>
</box>
";
        assert_eq!(generate(&root_with(vec![outer])), expected);
    }

    #[test]
    fn test_custom_indent() {
        let mut ids = IdGenerator::new();
        let child = Node::of_kind(ElementKind::Input, &mut ids);
        let parent = Node::of_kind(ElementKind::ScrollBox, &mut ids).with_children(vec![child]);

        let output = Serializer::with_indent("\t").serialize(&root_with(vec![parent]));
        assert_eq!(
            output,
            "<scrollbox name=\"ScrollBox\">\n\t<input name=\"Input\" />\n</scrollbox>\n"
        );
    }

    #[test]
    fn test_style_key_order() {
        let mut ids = IdGenerator::new();
        let mut node = Node::of_kind(ElementKind::Box, &mut ids);
        node.layout.overflow = Some(Overflow::Hidden);
        node.layout.padding = Some(1.0);
        node.layout.flex_grow = Some(1.0);
        node.layout.width = Some(Dimension::Percent(50.0));
        node.layout.flex_direction = Some(FlexDirection::Column);
        node.layout.left = Some(Dimension::Auto);
        node.layout.visible = false;
        node.layout.background_color = Some("#222".into());

        assert_eq!(
            generate_node(&node),
            "<box name=\"Box\" style={{width: \"50%\", flexDirection: \"column\", flexGrow: 1, padding: 1, left: \"auto\", overflow: \"hidden\"}} visible={false} backgroundColor=\"#222\" />\n"
        );
    }

    #[test]
    fn test_formatting_wrap_order() {
        let mut ids = IdGenerator::new();
        let node = text_node(
            &mut ids,
            TextProps {
                content: "Hi".into(),
                bold: true,
                italic: true,
                underline: true,
                ..Default::default()
            },
        );
        assert_eq!(
            generate_node(&node),
            "<text name=\"Text\"><u><strong><em>Hi</em></strong></u></text>\n"
        );

        let node = text_node(
            &mut ids,
            TextProps {
                content: "Old".into(),
                italic: true,
                strikethrough: true,
                dim: true,
                ..Default::default()
            },
        );
        assert_eq!(
            generate_node(&node),
            "<text name=\"Text\"><dim><s><em>Old</em></s></dim></text>\n"
        );
    }

    #[test]
    fn test_text_content_escaping() {
        assert_eq!(inline_content("a\nb"), "a<br />b");
        assert_eq!(inline_content("1 < 2"), "{\"1 < 2\"}");
        assert_eq!(inline_content(" padded"), "{\" padded\"}");
        assert_eq!(inline_content("say \"hi\""), "say \"hi\"");
    }

    #[test]
    fn test_option_records() {
        let mut ids = IdGenerator::new();
        let mut node = Node::of_kind(ElementKind::Select, &mut ids);
        if let Element::Select(props) = &mut node.element {
            props.options = vec!["Dark Blue".into(), "Red".into()];
            props.selected_index = 1;
        }

        assert_eq!(
            generate_node(&node),
            "<select name=\"Select\" options={[{name: \"Dark Blue\", value: \"dark_blue\"}, {name: \"Red\", value: \"red\"}]} selectedIndex={1} />\n"
        );
        assert_eq!(option_value("  Light   Grey"), "_light_grey");
    }

    #[test]
    fn test_strings_with_quotes_use_literals() {
        let mut ids = IdGenerator::new();
        let node = Node::of_kind(ElementKind::Box, &mut ids).with_name("The \"main\" box");
        assert_eq!(
            generate_node(&node),
            "<box name={\"The \\\"main\\\" box\"} />\n"
        );
    }

    #[test]
    fn test_backslashes_use_literals() {
        let mut ids = IdGenerator::new();
        let node = Node::of_kind(ElementKind::Box, &mut ids).with_name("C:\\dir\\");
        assert_eq!(generate_node(&node), "<box name={\"C:\\\\dir\\\\\"} />\n");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(fmt_number(3.0), "3");
        assert_eq!(fmt_number(0.5), "0.5");
        assert_eq!(fmt_number(-2.0), "-2");
    }
}
