use toys::document::split_lines;
use toys::processor::{Processor, consume_lines};
use toys::{Document, Node, NodeId, NodeKind, ParseError, Parser};

fn parse(source: &str) -> Document {
    Parser::default().parse_text(source)
}

fn node<'a>(document: &'a Document, content: &str) -> &'a Node {
    document
        .nodes
        .iter()
        .find(|n| n.content == content)
        .unwrap_or_else(|| panic!("no node with content {:?}", content))
}

#[test]
fn empty_input_yields_no_nodes() {
    assert!(parse("").is_empty());
    assert!(parse("\n\n   \n").is_empty());
}

#[test]
fn ids_start_at_one_and_increase() {
    let document = parse("# A\n\ntext\n\n> quote\n\n## B");
    let ids: Vec<NodeId> = document.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn heading_level_and_content() {
    let document = parse("#   Title\n### Deep  ");
    assert_eq!(document.nodes[0].kind, NodeKind::Heading { level: 1, order: 1 });
    assert_eq!(document.nodes[0].content, "Title");
    assert_eq!(document.nodes[1].heading_level(), Some(3));
    assert_eq!(document.nodes[1].content, "Deep");
    assert_eq!(document.nodes[1].line_span, vec![2]);
}

#[test]
fn heading_links_to_nearest_shallower_level() {
    let document = parse("# A\n## B\n### C\n## D\n### E");
    let a = node(&document, "A");
    let b = node(&document, "B");
    let c = node(&document, "C");
    let d = node(&document, "D");
    let e = node(&document, "E");

    assert_eq!(a.parent_id, None);
    assert_eq!(b.parent_id, Some(a.id));
    assert_eq!(c.parent_id, Some(b.id));
    assert_eq!(d.parent_id, Some(a.id));
    assert_eq!(e.parent_id, Some(d.id));
    assert_eq!(a.children_ids, vec![b.id, d.id]);
}

#[test]
fn heading_without_shallower_heading_is_a_root() {
    let document = parse("## Orphan\n### Child");
    let orphan = node(&document, "Orphan");
    assert_eq!(orphan.parent_id, None);
    assert_eq!(node(&document, "Child").parent_id, Some(orphan.id));
}

#[test]
fn linking_matches_a_backwards_scan() {
    // D is level 3; the latest level-2 heading is still B even though C (level 1) came after it.
    let document = parse("# A\n## B\n# C\n### D");
    assert_eq!(node(&document, "D").parent_id, Some(node(&document, "B").id));
}

#[test]
fn non_heading_links_to_latest_heading_of_any_level() {
    let document = parse("# A\n## B\n\nparagraph\n\n# C\n> quote");
    assert_eq!(node(&document, "paragraph").parent_id, Some(node(&document, "B").id));
    assert_eq!(node(&document, "quote").parent_id, Some(node(&document, "C").id));
}

#[test]
fn content_before_any_heading_is_rootless() {
    let document = parse("intro\n\n# A");
    assert_eq!(node(&document, "intro").parent_id, None);
    assert_eq!(document.roots().count(), 2);
}

#[test]
fn heading_order_follows_previous_same_level_heading() {
    let document = parse("# A\n## B\n## C");
    for n in &document.nodes {
        assert!(matches!(n.kind, NodeKind::Heading { order: 1, .. }));
    }
}

#[test]
fn blockquote_strips_marker_and_joins_with_space() {
    let document = parse(">   first\n> second\n>third\nafter");
    let quote = &document.nodes[0];
    assert_eq!(quote.kind, NodeKind::Blockquote);
    assert_eq!(quote.content, "  first second third");
    assert_eq!(quote.line_span, vec![1, 2, 3]);
    assert_eq!(document.nodes[1].content, "after");
}

#[test]
fn code_fence_excludes_fence_lines() {
    let document = parse("```json\n{\n  \"a\": 1\n}\n```\ntail");
    let fence = &document.nodes[0];
    assert_eq!(fence.kind, NodeKind::CodeFence { lang: "json".into() });
    assert_eq!(fence.content, "{\n  \"a\": 1\n}");
    assert!(!fence.content.contains("```"));
    assert_eq!(fence.line_span, vec![1, 2, 3, 4, 5]);
    assert_eq!(document.nodes[1].content, "tail");
}

#[test]
fn code_fence_keeps_blank_and_marker_like_lines() {
    let document = parse("```\n# not a heading\n\n> not a quote\n```");
    assert_eq!(document.nodes.len(), 1);
    assert_eq!(document.nodes[0].content, "# not a heading\n\n> not a quote");
    assert_eq!(document.nodes[0].kind, NodeKind::CodeFence { lang: String::new() });
}

#[test]
fn empty_code_fence() {
    let document = parse("```json\n```");
    assert_eq!(document.nodes[0].content, "");
    assert_eq!(document.nodes[0].line_span, vec![1, 2]);
}

#[test]
fn unterminated_fence_is_skipped_with_a_warning() {
    let document = parse("# A\n```json\n{\"a\": 1}\n\n> quote");
    assert_eq!(document.diagnostics.len(), 1);
    let warning = &document.diagnostics[0];
    assert!(warning.is_warning());
    assert_eq!(warning.line, 2);

    assert!(!document.nodes.iter().any(|n| matches!(n.kind, NodeKind::CodeFence { .. })));
    assert_eq!(node(&document, "{\"a\": 1}").kind, NodeKind::Paragraph);
    assert_eq!(node(&document, "quote").kind, NodeKind::Blockquote);
}

#[test]
fn failed_fence_leaves_a_gap_in_ids() {
    let document = parse("# A\n```\nbody");
    let ids: Vec<NodeId> = document.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(document.get(3).map(|n| n.parent_id), Some(Some(1)));
}

#[test]
fn paragraph_concatenates_until_blank_line() {
    let document = parse("one\n two \n# three\n\nnext");
    assert_eq!(document.nodes[0].content, "one two # three");
    assert_eq!(document.nodes[0].line_span, vec![1, 2, 3]);
    assert_eq!(document.nodes[1].content, "next");
}

#[test]
fn line_endings_are_normalized() {
    let unix = parse("# A\n> b\n");
    let windows = parse("# A\r\n> b\r\n");
    let mac = parse("# A\r> b\r");
    assert_eq!(unix.nodes, windows.nodes);
    assert_eq!(unix.nodes, mac.nodes);
}

#[test]
fn split_lines_handles_bom_and_trailing_newline() {
    assert_eq!(split_lines("\u{feff}a\nb\n"), vec!["a", "b"]);
    assert_eq!(split_lines("a\r\n\r\nb"), vec!["a", "", "b"]);
    assert!(split_lines("").is_empty());
}

#[test]
fn line_spans_are_strictly_increasing() {
    let document = parse("# A\n> x\n> y\n\n```\n1\n2\n```\npara\ngraph");
    for n in &document.nodes {
        assert!(!n.line_span.is_empty());
        assert!(n.line_span.windows(2).all(|w| w[0] < w[1]), "{:?}", n.line_span);
    }
}

#[test]
fn document_children_resolves_ids() {
    let document = parse("# A\n\none\n\ntwo");
    let root = &document.nodes[0];
    let children: Vec<&str> = document.children(root).map(|n| n.content.as_str()).collect();
    assert_eq!(children, vec!["one", "two"]);
}

// ---------------------------------------------------------------------------
// Processor registry
// ---------------------------------------------------------------------------

/// Treats `!` lines as a single-line construct.
struct BangProcessor;

impl Processor for BangProcessor {
    fn flag(&self) -> &str {
        "!"
    }

    fn recognizes(&self, line: &str) -> bool {
        line.starts_with('!')
    }

    fn consume(&self, lines: &[&str], cursor: &mut usize, id: NodeId) -> Result<Node, ParseError> {
        let (content, span) = consume_lines(lines, cursor, "", |l| &l[1..], |l| !l.starts_with('!'));
        Ok(Node::new(id, NodeKind::Paragraph, content, span))
    }
}

#[test]
fn registered_processor_takes_its_lines() {
    let parser = Parser::new().with_processor(BangProcessor);
    let document = parser.parse(&["!a", "!b", "plain"]);
    assert_eq!(document.nodes[0].content, "ab");
    assert_eq!(document.nodes[1].content, "plain");
}

#[test]
fn duplicate_flags_are_rejected() {
    let mut parser = Parser::new();
    assert!(parser.register(BangProcessor));
    assert!(!parser.register(BangProcessor));
    assert_eq!(parser.flags().collect::<Vec<_>>(), vec!["#", ">", "```", "!"]);
}
