//! Allocation accounting for the owning handles.
//!
//! Routes the engine's allocator through its own block-counting debug
//! allocator, runs a workload that exercises every ownership transfer, and
//! checks that the live block count returns to where it started.
//!
//! Runs without the test harness: the allocator must be installed on the
//! main thread before the engine allocates anything.
#![allow(unsafe_code, clippy::unwrap_used)]

use xmlhandle::error::clear_last_error;
use xmlhandle::{
    sys, Document, HtmlDocument, Node, ParseOptions, XPathExpression, XmlDocument,
};

fn live_blocks() -> i32 {
    clear_last_error();
    unsafe { sys::xmlMemBlocks() }
}

fn workload() {
    // Parse, navigate, serialize.
    let doc = XmlDocument::parse("<a><b k=\"v\">x</b><c>y</c><c/></a>").unwrap();
    let root = doc.root_node();
    for child in root.children() {
        let _ = (child.name(), child.content(), child.attribute("k"), child.path());
    }
    let _ = doc.to_string(true);
    let _ = root.attributes();

    // Failed parses leave nothing behind.
    if cfg!(not(feature = "panic-on-error")) {
        let _ = XmlDocument::parse_with_options("<a><b></a>", ParseOptions::strict());
        let _ = XmlDocument::parse("");
    }

    // Clones of documents and nodes.
    let copy = doc.clone_document().unwrap();
    let node_copy = copy.root_node().first_child().clone_node().unwrap();
    drop(copy);
    assert_eq!(node_copy.view().name(), "b");

    // set_root hands the old root back as an owned node.
    let mut built = XmlDocument::new();
    drop(built.set_root(Node::new("first").unwrap()));
    let old = built.set_root(node_copy);
    assert_eq!(old.view().name(), "first");
    built.root_node().append_child(old);
    built.root_node().append_child(Node::new_text("t").unwrap());
    built.root_node().append_child(Node::new_comment("c").unwrap());
    built.root_node().create_element("made").unwrap();
    built.root_node().set_attribute("n", "1").unwrap();
    built.root_node().remove_attribute("n");

    let mut parsed = XmlDocument::parse("<p><q/></p>").unwrap();
    let displaced = parsed.set_root(Node::new("r").unwrap());
    drop(parsed);
    assert_eq!(displaced.view().first_child().name(), "q");
    drop(displaced);

    // Detach and re-wrap.
    let mut moved = XmlDocument::parse("<m/>").unwrap();
    let raw = moved.detach();
    drop(moved);
    drop(unsafe { Document::from_raw(raw) });
    let raw_node = Node::new("n").unwrap().into_raw();
    drop(unsafe { Node::from_raw(raw_node) });

    // XPath: contexts, results, copies, compiled expressions, failures.
    let ctx = doc.xpath_context().unwrap();
    let set = ctx.eval("//c").unwrap();
    let set_copy = set.clone();
    drop(set);
    assert_eq!(set_copy.iter().unwrap().count(), 2);
    let _ = ctx.eval("count(//c)").unwrap().to_string_value();
    let _ = ctx.eval("string(//b)").unwrap().as_string();
    if cfg!(not(feature = "panic-on-error")) {
        let _ = ctx.eval("//[");
    }
    let expr = XPathExpression::compile("//b/@k").unwrap();
    let _ = ctx.eval_compiled_at(root, &expr).unwrap().to_string_value();
    let _ = root.xpath("c").unwrap();
    let bindings = root.xpath("namespace::*").unwrap();
    let _ = bindings.as_nodeset().unwrap().namespace_at(0);
    drop(bindings);
    drop(set_copy);
    drop(ctx);

    // Content edits free what they replace.
    root.set_content("gone").unwrap();
    root.add_content(" again").unwrap();
    root.set_name("z").unwrap();

    let html = HtmlDocument::parse("<p>x<br>y").unwrap();
    let _ = html.view().to_html_string(true);
}

fn main() {
    // SAFETY: first engine call of the process, on the main thread.
    let rc = unsafe {
        sys::xmlMemSetup(
            sys::xmlMemFree,
            sys::xmlMemMalloc,
            sys::xmlMemRealloc,
            sys::xmlMemoryStrdup,
        )
    };
    assert_eq!(rc, 0, "xmlMemSetup failed");

    // First pass pays for the engine's one-time global setup.
    workload();
    let baseline = live_blocks();

    for _ in 0..3 {
        workload();
        let now = live_blocks();
        assert_eq!(now, baseline, "engine blocks leaked: {baseline} -> {now}");
    }
    println!("leaks: ok ({baseline} blocks held by engine globals)");
}
