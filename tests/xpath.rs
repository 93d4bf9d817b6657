//! Integration tests for `XPath` evaluation and result handling.
#![allow(clippy::unwrap_used)]

use xmlhandle::{Error, HtmlDocument, Namespace, XPathKind, XPathValue, XmlDocument};

const NESTED: &str = "<a><b><c/></b><c/></a>";

// ---------- Node-set results ----------

#[test]
fn test_descendant_query_size_and_distance() {
    let doc = XmlDocument::parse(NESTED).unwrap();
    let ctx = doc.xpath_context().unwrap();
    let res = ctx.eval("//c").unwrap();
    assert!(res.is_nodeset());
    let set = res.as_nodeset().unwrap();
    assert_eq!(set.size(), 2);
    assert_eq!(set.end() - set.begin(), 2);
    assert_eq!(res.iter().unwrap().count(), 2);
}

#[test]
fn test_nodes_in_document_order() {
    let doc = XmlDocument::parse("<r><x id=\"1\"/><y><x id=\"2\"/></y><x id=\"3\"/></r>").unwrap();
    let res = doc.root_node().xpath("//x").unwrap();
    let ids: Vec<_> = res
        .iter()
        .unwrap()
        .map(|n| n.attribute("id").unwrap())
        .collect();
    assert_eq!(ids, ["1", "2", "3"]);
}

#[test]
fn test_cursor_walk_matches_iterator() {
    let doc = XmlDocument::parse("<r><i/><i/><i/><i/></r>").unwrap();
    let ctx = doc.xpath_context().unwrap();
    let res = ctx.eval("/r/i").unwrap();
    let set = res.as_nodeset().unwrap();

    let mut via_cursor = Vec::new();
    let mut cur = set.begin();
    while cur != set.end() {
        via_cursor.push(cur.get().unwrap());
        cur += 1;
    }
    let via_iter: Vec<_> = set.iter().collect();
    assert_eq!(via_cursor, via_iter);
}

#[test]
fn test_attribute_nodes() {
    let doc = XmlDocument::parse("<r a=\"1\" b=\"2\"/>").unwrap();
    let ctx = doc.xpath_context().unwrap();
    let res = ctx.eval("/r/@*").unwrap();
    let values: Vec<_> = res.iter().unwrap().map(|n| n.content()).collect();
    assert_eq!(values, ["1", "2"]);
}

// ---------- Scalar results ----------

#[test]
fn test_namespace_axis_members() {
    let doc = XmlDocument::parse("<r xmlns:p=\"urn:p\" xmlns=\"urn:d\"><c/></r>").unwrap();
    let res = doc.root_node().xpath("namespace::*").unwrap();
    let set = res.as_nodeset().unwrap();
    // p, the default namespace and the implicit xml binding.
    assert_eq!(set.len(), 3);
    assert_eq!(set.end() - set.begin(), 3);
    assert!(res.iter().unwrap().all(|n| n.is_null()));

    let mut found: Vec<Namespace> = (0..set.len())
        .map(|i| set.namespace_at(i).unwrap())
        .collect();
    found.sort_by(|a, b| a.prefix.cmp(&b.prefix));
    let prefixes: Vec<_> = found.iter().map(|ns| ns.prefix.as_deref()).collect();
    assert_eq!(prefixes, [None, Some("p"), Some("xml")]);
    assert_eq!(found[0].uri, "urn:d");
}

#[test]
fn test_namespace_members_do_not_outlive_result() {
    let doc = XmlDocument::parse("<r xmlns:p=\"urn:p\"/>").unwrap();
    let first = {
        let res = doc.root_node().xpath("namespace::p").unwrap();
        let set = res.as_nodeset().unwrap();
        (set.at(0), set.namespace_at(0))
    };
    // Nothing points into the freed result: the node slot is null and the
    // namespace was copied out.
    assert!(first.0.is_null());
    assert_eq!(first.1.unwrap().uri, "urn:p");
    assert_eq!(doc.root_node().name(), "r");
}

#[test]
fn test_scalar_results() {
    let doc = XmlDocument::parse("<r><v>3</v><v>4</v></r>").unwrap();
    let ctx = doc.xpath_context().unwrap();
    assert_eq!(ctx.eval("sum(//v)").unwrap().value(), XPathValue::Number(7.0));
    assert_eq!(ctx.eval("//v[1] < //v[2]").unwrap().value(), XPathValue::Boolean(true));
    assert_eq!(
        ctx.eval("concat(//v[1], '-', //v[2])").unwrap().value(),
        XPathValue::String("3-4".into())
    );
}

#[test]
#[cfg(not(feature = "panic-on-error"))]
fn test_every_mismatched_accessor_fails() {
    let doc = XmlDocument::parse("<r><v>1</v></r>").unwrap();
    let ctx = doc.xpath_context().unwrap();
    for (expr, kind) in [
        ("//v", XPathKind::NodeSet),
        ("true()", XPathKind::Boolean),
        ("1.5", XPathKind::Number),
        ("'s'", XPathKind::String),
    ] {
        let res = ctx.eval(expr).unwrap();
        assert_eq!(res.kind(), kind);
        assert_eq!(res.as_nodeset().is_ok(), kind == XPathKind::NodeSet);
        assert_eq!(res.as_boolean().is_ok(), kind == XPathKind::Boolean);
        assert_eq!(res.as_number().is_ok(), kind == XPathKind::Number);
        assert_eq!(res.as_string().is_ok(), kind == XPathKind::String);
        if let Err(Error::TypeMismatch { found, .. }) = res.as_number() {
            assert_eq!(found, kind);
        }
    }
}

// ---------- Contexts ----------

#[test]
fn test_reused_context_is_stateless_between_calls() {
    let doc = XmlDocument::parse(NESTED).unwrap();
    let ctx = doc.xpath_context().unwrap();
    let b = doc.root_node().first_child();
    for _ in 0..3 {
        assert_eq!(ctx.eval_at(b, "count(c)").unwrap().as_number().unwrap(), 1.0);
        assert_eq!(ctx.eval("count(c)").unwrap().as_number().unwrap(), 0.0);
        assert_eq!(ctx.eval("count(a/c)").unwrap().as_number().unwrap(), 1.0);
    }
}

#[test]
fn test_node_xpath_relative_to_node() {
    let doc = XmlDocument::parse(NESTED).unwrap();
    let b = doc.root_node().first_child();
    let res = b.xpath("c").unwrap();
    assert_eq!(res.as_nodeset().unwrap().at(0).parent(), b);
}

#[test]
#[cfg(not(feature = "panic-on-error"))]
fn test_bad_expression_reports_expression() {
    let doc = XmlDocument::parse(NESTED).unwrap();
    let err = doc.root_node().xpath("///").unwrap_err();
    assert!(matches!(err, Error::XPath { ref expression, .. } if expression == "///"));
    assert!(err.to_string().contains("///"));
}

#[test]
fn test_html_query() {
    let doc = HtmlDocument::parse(
        "<html><body><p class=\"x\">one</p><p>two</p></body></html>",
    )
    .unwrap();
    let ctx = doc.xpath_context().unwrap();
    let res = ctx.eval("//p[@class='x']").unwrap();
    assert_eq!(res.as_nodeset().unwrap().at(0).content(), "one");
}

#[test]
fn test_query_after_tree_edit() {
    let doc = XmlDocument::parse("<r/>").unwrap();
    let ctx = doc.xpath_context().unwrap();
    assert!(ctx.eval("/r/n").unwrap().as_nodeset().unwrap().is_empty());
    doc.root_node().create_element("n").unwrap();
    assert_eq!(ctx.eval("/r/n").unwrap().as_nodeset().unwrap().len(), 1);
}
