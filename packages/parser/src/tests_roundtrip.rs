use crate::ast::*;
use crate::id_generator::IdGenerator;
use crate::parser::{parse, parse_multiple};
use crate::serializer::generate;

/// Parse, generate, parse again; both trees must agree and the text must be stable
fn assert_round_trip(source: &str) -> Node {
    let mut ids = IdGenerator::new();
    let first = Node::root().with_children(parse_multiple(source, &mut ids).unwrap());
    let generated = generate(&first);

    let second = Node::root().with_children(
        parse_multiple(&generated, &mut ids)
            .unwrap_or_else(|e| panic!("regenerated markup failed to parse: {}\n{}", e, generated)),
    );

    assert!(
        first.structurally_eq(&second),
        "round trip changed the tree\n--- generated ---\n{}",
        generated
    );
    assert_eq!(generate(&second), generated);
    first
}

const FULL_LAYOUT: &str = r##"
<box name="Shell" style={{width: "100%", height: "auto", flexDirection: "column", gap: 1, padding: 1, marginTop: 2}} backgroundColor="#101820" border={["top", "left"]} borderStyle="rounded" borderColor="#444" title="Main" titleAlignment="center">
  <text name="Heading" fg="#ffffff" bg="blue"><dim><s><u><strong><em>Welcome</em></strong></u></s></dim></text>
  <scrollbox style={{flexGrow: 1, overflow: "scroll"}} scrollY stickyScroll>
    <input placeholder="Type here" value="draft" maxLength={40} textColor="#eee" cursorColor="#f00" />
    <textarea placeholder="Notes" initialValue={"line \"one\""} wrapMode="word" textColor="#ccc" />
  </scrollbox>
  <select name="Theme" options={[{name: "Dark Blue", value: "dark_blue"}, {name: "Light", value: "light"}]} selectedIndex={1} showDescription wrapSelection showScrollIndicator />
  <tab-select options={["Home", "Settings"]} tabWidth={12} showUnderline />
  <slider visible={false} min={-10} max={10} value={2.5} orientation="vertical" fg="red" bg="black" />
  <ascii-font style={{position: "absolute", top: 0, right: "10%"}} text="TRELLIS" font="shade" color={RGBA.fromHex("#00ff88")} />
</box>
"##;

#[test]
fn test_round_trip_every_kind() {
    let root = assert_round_trip(FULL_LAYOUT);
    let shell = &root.children[0];

    let kinds: Vec<ElementKind> = std::iter::once(shell)
        .chain(shell.children.iter())
        .chain(shell.children[1].children.iter())
        .map(Node::kind)
        .collect();
    for kind in ElementKind::ALL {
        assert!(kinds.contains(kind), "{} missing from the sample", kind);
    }
}

#[test]
fn test_round_trip_keeps_attribute_values() {
    let root = assert_round_trip(FULL_LAYOUT);
    let shell = &root.children[0];

    let Element::Textarea(notes) = &shell.children[1].children[1].element else {
        panic!("expected textarea");
    };
    assert_eq!(notes.initial_value.as_deref(), Some("line \"one\""));

    let slider = &shell.children[4];
    assert!(!slider.layout.visible);
    let Element::Slider(props) = &slider.element else {
        panic!("expected slider");
    };
    assert_eq!((props.min, props.max, props.value), (-10.0, 10.0, 2.5));

    let banner = &shell.children[5];
    assert_eq!(banner.layout.right, Some(Dimension::Percent(10.0)));
}

#[test]
fn test_default_nodes_emit_only_names() {
    let mut ids = IdGenerator::new();
    let nodes: Vec<Node> = ElementKind::ALL
        .iter()
        .map(|kind| Node::of_kind(*kind, &mut ids))
        .collect();
    let root = Node::root().with_children(nodes);

    let generated = generate(&root);
    for (line, kind) in generated.lines().zip(ElementKind::ALL) {
        assert_eq!(line, format!("<{} name=\"{}\" />", kind.tag(), kind.label()));
    }

    let reparsed = parse_multiple(&generated, &mut ids).unwrap();
    for (node, kind) in reparsed.iter().zip(ElementKind::ALL) {
        assert_eq!(node.name, None);
        assert_eq!(node.layout, Layout::default());
        assert_eq!(node.element, Element::default_for(*kind));
    }
}

#[test]
fn test_multiple_siblings_keep_order() {
    let source = (1..=5)
        .map(|n| format!("<text name=\"Line {}\">{}</text>", n, n))
        .collect::<Vec<_>>()
        .join("\n");

    let nodes = parse_multiple(&source, &mut IdGenerator::new()).unwrap();
    let names: Vec<_> = nodes.iter().filter_map(|n| n.name.as_deref()).collect();
    assert_eq!(names, vec!["Line 1", "Line 2", "Line 3", "Line 4", "Line 5"]);
}

#[test]
fn test_formatting_nesting_fidelity() {
    let mut ids = IdGenerator::new();
    let node = Node::new(
        ids.new_id(),
        Element::Text(TextProps {
            content: "Styled".into(),
            bold: true,
            italic: true,
            underline: true,
            ..Default::default()
        }),
    );
    let generated = generate(&Node::root().with_children(vec![node]));
    assert!(generated.contains("<u><strong><em>Styled</em></strong></u>"));

    let parsed = parse(&generated, &mut ids).unwrap();
    let Element::Text(props) = parsed.element else {
        panic!("expected text");
    };
    assert!(props.bold && props.italic && props.underline);
    assert!(!props.strikethrough && !props.dim);
    assert_eq!(props.content, "Styled");
}

#[test]
fn test_every_flag_combination_round_trips() {
    for bits in 0u8..32 {
        let mut ids = IdGenerator::new();
        let node = Node::new(
            ids.new_id(),
            Element::Text(TextProps {
                content: "x".into(),
                bold: bits & 1 != 0,
                italic: bits & 2 != 0,
                underline: bits & 4 != 0,
                strikethrough: bits & 8 != 0,
                dim: bits & 16 != 0,
                ..Default::default()
            }),
        );

        let generated = generate(&Node::root().with_children(vec![node.clone()]));
        let parsed = parse(&generated, &mut ids).unwrap();
        assert_eq!(parsed.element, node.element, "flags {:05b}: {}", bits, generated);
    }
}

#[test]
fn test_awkward_text_content_round_trips() {
    assert_round_trip("<text>{\"a < b\"}<br />{\"  indented\"}<br />say \"hi\"</text>");
    assert_round_trip("<text><strong></strong></text>");
    assert_round_trip("<text>Label<box /></text>");
    assert_round_trip("<text>one<br /><br />three</text>");
}

#[test]
fn test_names_survive_round_trip() {
    let root = assert_round_trip(r#"<box name="Box"><slider name={"Volume \"dB\""} /></box>"#);
    assert_eq!(root.children[0].name, None);
    assert_eq!(
        root.children[0].children[0].name.as_deref(),
        Some("Volume \"dB\"")
    );
}
