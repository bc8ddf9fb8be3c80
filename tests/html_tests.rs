use indoc::indoc;
use tagsoup::{parse, NodeData};

fn child_data<'a>(doc: &'a tagsoup::Document, parent: tagsoup::NodeId) -> Vec<&'a NodeData> {
    doc.children(parent)
        .map(|id| doc.get(id).expect("child id must resolve"))
        .collect()
}

fn element_tag<'a>(data: &'a NodeData) -> &'a str {
    match data {
        NodeData::Element { tag, .. } => tag,
        other => panic!("expected Element, got {other:?}"),
    }
}

#[test]
fn nested_elements_and_surrounding_text() {
    // SPEC_FULL.md §8 scenario 1.
    let doc = parse("<p>Hello, <b>world</b>!</p>");
    let root_children = child_data(&doc, doc.root());
    assert_eq!(root_children.len(), 1);
    assert_eq!(element_tag(root_children[0]), "p");

    let p_id = doc.children(doc.root()).next().unwrap();
    let p_children = child_data(&doc, p_id);
    assert_eq!(p_children[0], &NodeData::Text("Hello, ".to_string()));
    assert_eq!(element_tag(p_children[1]), "b");
    assert_eq!(p_children[2], &NodeData::Text("!".to_string()));

    let b_id = doc.children(p_id).nth(1).unwrap();
    let b_children = child_data(&doc, b_id);
    assert_eq!(b_children, vec![&NodeData::Text("world".to_string())]);
}

#[test]
fn void_element_with_attributes_and_trailing_text() {
    // SPEC_FULL.md §8 scenario 2.
    let doc = parse(r#"<img src="a.png" ALT='x'>tail"#);
    let root_children = child_data(&doc, doc.root());
    assert_eq!(root_children.len(), 2);

    match root_children[0] {
        NodeData::Element {
            tag,
            attrs,
            self_closing,
        } => {
            assert_eq!(tag, "img");
            assert!(!self_closing);
            assert_eq!(
                attrs,
                &vec![
                    ("src".to_string(), "a.png".to_string()),
                    ("alt".to_string(), "x".to_string()),
                ]
            );
        }
        other => panic!("expected Element, got {other:?}"),
    }
    assert_eq!(root_children[1], &NodeData::Text("tail".to_string()));

    let img_id = doc.children(doc.root()).next().unwrap();
    assert_eq!(doc.children(img_id).count(), 0);
}

#[test]
fn character_references_resolve_with_backtrack_and_numeric_forms() {
    // SPEC_FULL.md §8 scenario 3.
    let doc = parse("&amp;&#65;&#x42;&notit;&notin;");
    let root_children = child_data(&doc, doc.root());
    assert_eq!(root_children.len(), 1);
    assert_eq!(
        root_children[0],
        &NodeData::Text("&AB\u{00AC}it;\u{2209}".to_string())
    );
}

#[test]
fn comment_forms_including_bang_close_and_empty() {
    // SPEC_FULL.md §8 scenario 4.
    let doc = parse("<!-- hi --><!--x--!><!---->");
    let root_children = child_data(&doc, doc.root());
    assert_eq!(
        root_children,
        vec![
            &NodeData::Comment(" hi ".to_string()),
            &NodeData::Comment("x".to_string()),
            &NodeData::Comment("".to_string()),
        ]
    );
}

#[test]
fn doctype_followed_by_nested_html_document() {
    // SPEC_FULL.md §8 scenario 5.
    let doc = parse("<!DOCTYPE html><html><body></body></html>");
    let root_children = child_data(&doc, doc.root());
    assert_eq!(root_children.len(), 2);
    assert_eq!(
        root_children[0],
        &NodeData::Doctype {
            name: "html".to_string(),
            data: None,
        }
    );
    assert_eq!(element_tag(root_children[1]), "html");

    let html_id = doc.children(doc.root()).nth(1).unwrap();
    let html_children = child_data(&doc, html_id);
    assert_eq!(html_children.len(), 1);
    assert_eq!(element_tag(html_children[0]), "body");
}

#[test]
fn style_element_switches_tokenizer_to_rcdata() {
    // SPEC_FULL.md §8 scenario 6.
    let doc = parse("<style>a<b>c</style>d");
    let root_children = child_data(&doc, doc.root());
    assert_eq!(root_children.len(), 2);
    assert_eq!(element_tag(root_children[0]), "style");
    assert_eq!(root_children[1], &NodeData::Text("d".to_string()));

    let style_id = doc.children(doc.root()).next().unwrap();
    let style_children = child_data(&doc, style_id);
    assert_eq!(style_children, vec![&NodeData::Text("a<b>c".to_string())]);
}

#[test]
fn newline_normalization_is_transparent_to_parse_result() {
    let lf = parse("<p>a\nb</p>");
    let crlf = parse("<p>a\r\nb</p>");
    let cr = parse("<p>a\rb</p>");
    assert_eq!(format!("{lf:?}"), format!("{crlf:?}"));
    assert_eq!(format!("{lf:?}"), format!("{cr:?}"));
}

#[test]
fn mismatched_end_tag_closes_innermost_open_element() {
    // Documented tree-builder simplification (SPEC_FULL.md §4.4): no
    // "in scope" matching, so `</div>` here closes the innermost open
    // element (`span`), not the outer `div`.
    let doc = parse("<div><span>x</div>y");
    let div_id = doc.children(doc.root()).next().unwrap();
    let div_children = child_data(&doc, div_id);
    assert_eq!(element_tag(div_children[0]), "span");

    let span_id = doc.children(div_id).next().unwrap();
    let span_children = child_data(&doc, span_id);
    assert_eq!(span_children, vec![&NodeData::Text("x".to_string())]);

    // "y" lands inside the still-open div, since only span was popped.
    let div_children = child_data(&doc, div_id);
    assert_eq!(div_children[1], &NodeData::Text("y".to_string()));
}

#[test]
fn realistic_document_with_nested_lists_and_attributes() {
    let input = indoc! {r#"
        <!DOCTYPE html>
        <html lang="en">
            <body>
                <ul class="items">
                    <li>one</li>
                    <li>two</li>
                </ul>
            </body>
        </html>
    "#};
    let doc = parse(input);
    let root_children = child_data(&doc, doc.root());
    assert_eq!(
        root_children[0],
        &NodeData::Doctype {
            name: "html".to_string(),
            data: None,
        }
    );

    let html_id = doc.children(doc.root()).nth(1).unwrap();
    match doc.get(html_id).unwrap() {
        NodeData::Element { tag, attrs, .. } => {
            assert_eq!(tag, "html");
            assert_eq!(attrs, &vec![("lang".to_string(), "en".to_string())]);
        }
        other => panic!("expected Element, got {other:?}"),
    }

    let body_id = doc
        .children(html_id)
        .find(|id| matches!(doc.get(*id), Some(NodeData::Element { tag, .. }) if tag == "body"))
        .expect("body element present");
    let ul_id = doc
        .children(body_id)
        .find(|id| matches!(doc.get(*id), Some(NodeData::Element { tag, .. }) if tag == "ul"))
        .expect("ul element present");
    let li_texts: Vec<&NodeData> = doc
        .children(ul_id)
        .flat_map(|li_id| doc.children(li_id))
        .map(|id| doc.get(id).unwrap())
        .collect();
    assert_eq!(
        li_texts,
        vec![
            &NodeData::Text("one".to_string()),
            &NodeData::Text("two".to_string()),
        ]
    );
}

#[test]
fn unterminated_tag_at_eof_still_produces_a_tree() {
    let doc = parse("<div><p>unterminated");
    let div_id = doc.children(doc.root()).next().unwrap();
    assert_eq!(element_tag(doc.get(div_id).unwrap()), "div");
    let p_id = doc.children(div_id).next().unwrap();
    assert_eq!(
        child_data(&doc, p_id),
        vec![&NodeData::Text("unterminated".to_string())]
    );
}
