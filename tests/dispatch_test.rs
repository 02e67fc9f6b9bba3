//! Integration tests for the element conversion dispatcher.

use htmldoc::dispatch::{Backend, Dispatcher, Parent, Rule};
use htmldoc::grid::{build_grid, GridCell};
use htmldoc::{parse_html, Node, NodeKind, StyleMap, StyleResolver};
use serde_json::{json, Value};

/// Backend producing JSON blocks and runs.
struct JsonBackend;

impl Backend for JsonBackend {
    type Block = Value;
    type Inline = Value;

    fn line_break(&self) -> Value {
        json!({"break": true})
    }
}

type D = Dispatcher<JsonBackend>;

fn text_run(d: &D, node: &Node, cascaded: &StyleMap) -> Vec<Value> {
    if node.is_line_break() {
        return vec![d.backend().line_break()];
    }
    vec![json!({
        "text": node.text.clone().unwrap_or_default(),
        "style": Value::Object(d.map_styles(cascaded, node)),
    })]
}

fn paragraph(d: &D, node: &Node, cascaded: &StyleMap) -> Vec<Value> {
    let style = Value::Object(d.map_styles(cascaded, node));
    d.convert_to_blocks(
        node,
        cascaded,
        |runs| json!({"paragraph": runs, "style": style.clone()}),
        None,
        false,
    )
}

fn table(d: &D, node: &Node, _cascaded: &StyleMap) -> Vec<Value> {
    let grid = build_grid(&node.content);
    let rows: Vec<Value> = grid
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|slot| match *slot {
                    GridCell::Master { source, colspan, rowspan } => {
                        let text = grid
                            .cell(&node.content, source)
                            .map(Node::plain_text)
                            .unwrap_or_default();
                        json!({"text": text, "colspan": colspan, "rowspan": rowspan})
                    }
                    GridCell::Empty => json!(null),
                    _ => json!("merged"),
                })
                .collect()
        })
        .collect();
    vec![json!({ "table": rows })]
}

fn dispatcher() -> D {
    let mut d = Dispatcher::new(JsonBackend, StyleResolver::docx());
    d.add_builtin_inline_converter(Rule::new(|n: &Node| n.kind == NodeKind::Text, text_run));
    d.add_builtin_block_converter(Rule::new(|n: &Node| n.kind == NodeKind::Table, table));
    d.add_builtin_block_converter(Rule::new(
        |n: &Node| matches!(n.kind, NodeKind::Paragraph | NodeKind::Heading { .. }),
        paragraph,
    ));
    d
}

#[test]
fn test_styles_cascade_into_runs() {
    let nodes = parse_html(r#"<p style="text-align:center; color:red">Hello <b>world</b></p>"#);
    let blocks = dispatcher().convert(&nodes);
    assert_eq!(blocks.len(), 1);

    let block = &blocks[0];
    assert_eq!(block["style"]["alignment"], json!("center"));
    assert_eq!(block["paragraph"][0]["text"], json!("Hello "));
    assert_eq!(block["paragraph"][0]["style"], json!({"color": "FF0000"}));
    assert_eq!(
        block["paragraph"][1]["style"],
        json!({"bold": true, "color": "FF0000"})
    );
}

#[test]
fn test_unmatched_nodes_convert_to_nothing() {
    let nodes = parse_html("<p>a</p><hr><p>b</p>");
    let blocks = dispatcher().convert(&nodes);
    assert_eq!(blocks.len(), 2);
}

#[test]
fn test_user_converter_precedes_builtin() {
    let mut d = dispatcher();
    d.add_block_rule(
        |n| n.kind == NodeKind::Paragraph,
        |_, n, _| vec![json!({ "user": n.plain_text() })],
    );
    let blocks = d.convert(&parse_html("<p>x</p>"));
    assert_eq!(blocks, vec![json!({"user": "x"})]);
}

#[test]
fn test_fallthroughs_compose() {
    let mut d = dispatcher();
    d.add_wrap_rule(
        |n| n.attributes.contains_key("id"),
        |_, n, blocks| {
            let id = n.attribute("id").unwrap_or_default();
            vec![json!({"bookmark": id, "children": blocks})]
        },
    );
    d.add_wrap_rule(
        |_| true,
        |_, _, blocks| blocks.into_iter().map(|b| json!({"section": b})).collect(),
    );

    let blocks = d.convert(&parse_html(r#"<h2 id="top">T</h2>"#));
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["section"]["bookmark"], json!("top"));
    assert_eq!(
        blocks[0]["section"]["children"][0]["paragraph"][0]["text"],
        json!("T")
    );
}

#[test]
fn test_nested_blocks_keep_document_order() {
    let nodes = parse_html("<div>one<p>two</p>three</div>");
    let div = &nodes[0];
    let d = dispatcher();
    let cascaded = d.cascade(div, Parent::root());
    let blocks = d.convert_to_blocks(
        div,
        &cascaded,
        |runs| json!({ "chunk": runs.len() }),
        None,
        false,
    );
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0], json!({"chunk": 1}));
    assert_eq!(blocks[1]["paragraph"][0]["text"], json!("two"));
    assert_eq!(blocks[2], json!({"chunk": 1}));
}

#[test]
fn test_inline_paragraphs_get_breaks() {
    let nodes = parse_html("<ul><li>lead<p>para</p>tail</li></ul>");
    let item = &nodes[0].content[0];
    let mut d = dispatcher();
    d.add_inline_rule(
        |n| n.kind == NodeKind::Paragraph,
        |d, n, c| d.convert_inline_children(n, c),
    );
    let cascaded = d.cascade(item, Parent::root());
    let blocks = d.convert_to_blocks(item, &cascaded, Value::Array, None, true);

    assert_eq!(blocks.len(), 1);
    let runs = blocks[0].as_array().unwrap();
    let texts: Vec<Value> = runs
        .iter()
        .map(|r| r.get("text").cloned().unwrap_or_else(|| json!("<br>")))
        .collect();
    assert_eq!(texts, vec![json!("lead"), json!("<br>"), json!("para"), json!("<br>"), json!("tail")]);
}

#[test]
fn test_table_uses_shared_grid() {
    let nodes = parse_html(
        r#"<table><tr><td colspan="2">wide</td></tr><tr><td>a</td><td>b</td></tr></table>"#,
    );
    let blocks = dispatcher().convert(&nodes);
    assert_eq!(
        blocks,
        vec![json!({"table": [
            [{"text": "wide", "colspan": 2, "rowspan": 1}, "merged"],
            [{"text": "a", "colspan": 1, "rowspan": 1}, {"text": "b", "colspan": 1, "rowspan": 1}]
        ]})]
    );
}
