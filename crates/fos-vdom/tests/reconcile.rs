//! Reconciler integration tests
//!
//! Drives the reconciler against an in-memory document and counts the host
//! operations it performs through the document's mutation log.

use fos_dom::{Document, MutationRecord, MutationType};
use fos_vdom::{
    Child, Config, Key, List, Markup, Node, Reconciler, RenderError, attr, class, event, key,
    listener, prop, style,
};

fn mount(doc: &mut Document, config: &Config, node: &mut Node) {
    Reconciler::new(doc, config).reconcile(node, None).unwrap();
    let body = doc.body().unwrap();
    doc.append_child(body, node.handle().unwrap()).unwrap();
    doc.take_records();
}

fn update(doc: &mut Document, config: &Config, next: &mut Node, prev: Node) -> Vec<MutationRecord> {
    Reconciler::new(doc, config).reconcile(next, Some(prev)).unwrap();
    doc.take_records()
}

fn count(records: &[MutationRecord], kind: MutationType) -> usize {
    records.iter().filter(|r| r.mutation_type() == kind).count()
}

fn keyed_item(k: i64) -> Node {
    Node::element("li", [key(k), Node::text(format!("item {k}")).into()])
}

fn child_handles(node: &Node) -> Vec<fos_vdom::NodeId> {
    node.children()
        .iter()
        .filter_map(|c| match c {
            Child::Node(n) => n.handle(),
            _ => None,
        })
        .collect()
}

// ============================================================================
// IDEMPOTENCE AND HANDLE REUSE
// ============================================================================

#[test]
fn test_second_identical_pass_is_silent() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();
    let build = || {
        Node::element(
            "form",
            [
                class("login"),
                attr("method", "post"),
                style("display", "flex"),
                Node::element("input", [prop("value", "name"), prop("disabled", false)]).into(),
                Node::element("button", ["Go".into()]).into(),
            ],
        )
    };

    let mut first = build();
    mount(&mut doc, &config, &mut first);

    let mut second = build();
    let mounts = Reconciler::new(&mut doc, &config).reconcile(&mut second, Some(first)).unwrap();
    assert!(mounts.is_empty());
    assert!(doc.take_records().is_empty());
}

#[test]
fn test_compatible_nodes_keep_handles() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();

    let mut first = Node::element("div", [class("a"), Node::element("span", []).into()]);
    mount(&mut doc, &config, &mut first);
    let handles = (first.handle(), child_handles(&first));

    let mut second = Node::element(
        "div",
        [class("b"), Node::element("span", [attr("x", "1")]).into()],
    );
    let records = update(&mut doc, &config, &mut second, first);

    assert_eq!((second.handle(), child_handles(&second)), handles);
    assert_eq!(count(&records, MutationType::Creation), 0);
    assert_eq!(count(&records, MutationType::ChildList), 0);
}

#[test]
fn test_namespace_change_recreates() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();

    let mut first = Node::element("a", []);
    mount(&mut doc, &config, &mut first);
    let old = first.handle();

    let mut second = Node::element("a", [fos_vdom::namespace("http://www.w3.org/2000/svg")]);
    let records = update(&mut doc, &config, &mut second, first);

    assert_ne!(second.handle(), old);
    assert_eq!(count(&records, MutationType::Creation), 1);
    assert_eq!(doc.parent(old.unwrap()), None);
}

// ============================================================================
// UNKEYED CHILDREN
// ============================================================================

#[test]
fn test_text_changes_in_place() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();

    let mut first = Node::element("p", ["A".into()]);
    mount(&mut doc, &config, &mut first);
    let text = child_handles(&first);

    let mut second = Node::element("p", ["B".into()]);
    let records = update(&mut doc, &config, &mut second, first);

    assert_eq!(child_handles(&second), text);
    assert_eq!(records.len(), 1);
    assert!(matches!(&records[0], MutationRecord::SetText { new_text, .. } if new_text == "B"));
}

#[test]
fn test_dropping_first_child_removes_one() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();

    let mut first = Node::element("div", ["X".into(), "Y".into()]);
    mount(&mut doc, &config, &mut first);

    let mut second = Node::element("div", ["Y".into()]);
    let records = update(&mut doc, &config, &mut second, first);

    assert_eq!(count(&records, MutationType::ChildList), 1);
    assert!(records.iter().any(|r| matches!(r, MutationRecord::Remove { .. })));
    assert_eq!(doc.text_content(second.handle().unwrap()), "Y");
}

#[test]
fn test_absent_slot_leaves_sibling_untouched() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();

    let mut first = Node::element(
        "div",
        [Node::element("b", ["X".into()]).into(), Node::element("i", ["Y".into()]).into()],
    );
    mount(&mut doc, &config, &mut first);
    let handles = child_handles(&first);
    let (x, y) = (handles[0], handles[1]);

    let mut second = Node::element(
        "div",
        [None::<Node>.into(), Node::element("i", ["Y".into()]).into()],
    );
    let records = update(&mut doc, &config, &mut second, first);

    assert_eq!(records, vec![MutationRecord::Remove {
        parent: second.handle().unwrap(),
        child: x,
    }]);
    assert_eq!(child_handles(&second), vec![y]);
}

#[test]
fn test_growing_list_appends() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();

    let mut first = Node::element("ol", [List::new(["1".into(), "2".into()]).into()]);
    mount(&mut doc, &config, &mut first);

    let mut second = Node::element("ol", [List::new(["1".into(), "2".into(), "3".into()]).into()]);
    let records = update(&mut doc, &config, &mut second, first);

    assert_eq!(count(&records, MutationType::Creation), 1);
    assert!(matches!(records.last(), Some(MutationRecord::Append { .. })));
    assert_eq!(doc.text_content(second.handle().unwrap()), "123");
}

// ============================================================================
// KEYED CHILDREN
// ============================================================================

#[test]
fn test_keyed_swap_is_one_insert() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();

    let mut first = Node::element("ul", [keyed_item(1).into(), keyed_item(2).into()]);
    mount(&mut doc, &config, &mut first);
    let handles = child_handles(&first);
    let (one, two) = (handles[0], handles[1]);

    let mut second = Node::element("ul", [keyed_item(2).into(), keyed_item(1).into()]);
    let records = update(&mut doc, &config, &mut second, first);

    assert_eq!(records.len(), 1);
    assert!(matches!(records[0], MutationRecord::Insert { .. }));
    assert_eq!(child_handles(&second), vec![two, one]);
    assert_eq!(doc.children(second.handle().unwrap()), vec![two, one]);
}

#[test]
fn test_keyed_reverse_and_removal() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();

    let mut first = Node::element("ul", (1..=4).map(|k| Markup::from(keyed_item(k))));
    mount(&mut doc, &config, &mut first);
    let before = child_handles(&first);

    let mut second = Node::element("ul", [4, 2, 1].map(|k| Markup::from(keyed_item(k))));
    let records = update(&mut doc, &config, &mut second, first);

    assert_eq!(count(&records, MutationType::Creation), 0);
    assert_eq!(
        records.iter().filter(|r| matches!(r, MutationRecord::Remove { .. })).count(),
        1
    );
    assert_eq!(doc.children(second.handle().unwrap()), vec![before[3], before[1], before[0]]);
}

#[test]
fn test_string_keys_match() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();
    let row = |k: &str| Node::element("tr", [key(k), Node::text(k).into()]);

    let mut first = Node::element("tbody", [row("a").into(), row("b").into()]);
    mount(&mut doc, &config, &mut first);
    let handles = child_handles(&first);

    let mut second = Node::element("tbody", [row("c").into(), row("a").into(), row("b").into()]);
    let records = update(&mut doc, &config, &mut second, first);

    assert_eq!(&child_handles(&second)[1..], &handles[..]);
    assert_eq!(count(&records, MutationType::Creation), 2);
    assert_eq!(doc.text_content(second.handle().unwrap()), "cab");
}

#[test]
fn test_nested_keyed_lists_move_as_units() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();
    let group_a = || List::new([keyed_item(1).into(), keyed_item(2).into()]).keyed("a");
    let group_b = || List::new([keyed_item(3).into()]).keyed("b");

    let mut first = Node::element("ul", [group_a().into(), group_b().into()]);
    mount(&mut doc, &config, &mut first);

    let mut second = Node::element("ul", [group_b().into(), group_a().into()]);
    let records = update(&mut doc, &config, &mut second, first);

    assert_eq!(records.len(), 1);
    assert!(matches!(records[0], MutationRecord::Insert { .. }));
    assert_eq!(doc.text_content(second.handle().unwrap()), "item 3item 1item 2");
}

// ============================================================================
// CONTRACT VIOLATIONS
// ============================================================================

#[test]
fn test_mixed_keys_fail() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();

    let mut node = Node::element("ul", [keyed_item(1).into(), Node::element("li", []).into()]);
    let err = Reconciler::new(&mut doc, &config).reconcile(&mut node, None).unwrap_err();
    assert!(matches!(err, RenderError::MixedKeys));
    assert!(err.to_string().contains("inconsistent keying"));
}

#[test]
fn test_duplicate_keys_fail() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();

    let mut node = Node::element("ul", [keyed_item(7).into(), keyed_item(7).into()]);
    let err = Reconciler::new(&mut doc, &config).reconcile(&mut node, None).unwrap_err();
    assert!(matches!(err, RenderError::DuplicateKey(Key::Int(7))));
}

#[test]
fn test_absent_children_exempt_from_keying() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();

    let mut node = Node::element(
        "ul",
        [keyed_item(1).into(), None::<Node>.into(), keyed_item(2).into()],
    );
    Reconciler::new(&mut doc, &config).reconcile(&mut node, None).unwrap();
    assert_eq!(doc.children(node.handle().unwrap()).len(), 2);
}

// ============================================================================
// LISTENERS
// ============================================================================

#[test]
fn test_listeners_rebind_on_new_identity() {
    let mut doc = Document::new().unwrap();
    let config = Config::default();
    let shared = event::click(|_| {});

    let mut first = Node::element("button", [listener(shared.clone()), event::blur(|_| {}).into()]);
    mount(&mut doc, &config, &mut first);

    let mut second = Node::element("button", [listener(shared), event::blur(|_| {}).into()]);
    let records = update(&mut doc, &config, &mut second, first);

    // the shared click listener stays bound, the fresh blur listener replaces the old one
    assert_eq!(records.len(), 2);
    assert_eq!(count(&records, MutationType::Listeners), 2);
    let handle = second.handle().unwrap();
    assert_eq!(doc.dispatch_event(handle, "click").invoked, 1);
    assert_eq!(doc.dispatch_event(handle, "blur").invoked, 1);
}
