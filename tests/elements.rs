use anyhow::Result;
use topograph::{
    Direction, Graph, GraphEvent, GraphModel, NodeModel, Padding, Rect,
};

fn grouped_graph() -> Result<Graph> {
    let model: GraphModel = serde_json::from_str(
        r#"{
            "direction": "TD",
            "nodes": [
                {"id": "g", "group": true, "padding": 10, "width": 40, "height": 40},
                {"id": "c1", "parent": "g", "x": 0, "y": 0, "width": 50, "height": 50},
                {"id": "c2", "parent": "g", "x": 100, "y": 0, "width": 50, "height": 50},
                {"id": "outside", "x": 300, "y": 300, "width": 50, "height": 50}
            ],
            "edges": [
                {"id": "e1", "source": "outside", "target": "c1"}
            ]
        }"#,
    )?;
    Ok(Graph::from_model(&model)?)
}

#[test]
fn group_bounds_are_the_padded_union_of_leaves() -> Result<()> {
    let graph = grouped_graph()?;
    let mut expected = Rect::new(0.0, 0.0, 50.0, 50.0);
    expected.union(&Rect::new(100.0, 0.0, 50.0, 50.0));
    expected.padding(Padding::Uniform(10.0));
    assert_eq!(graph.group_bounds("g"), expected);
    assert_eq!(graph.effective_bounds("g"), expected);
    Ok(())
}

#[test]
fn collapse_toggle_restores_the_effective_center() -> Result<()> {
    let mut graph = grouped_graph()?;
    let before = graph.effective_bounds("g").center();

    graph.set_collapsed("g", true);
    let collapsed_center = graph.effective_bounds("g").center();
    assert!(
        before.distance_to(collapsed_center) < 1e-3,
        "collapsing must keep the center at {before:?}, got {collapsed_center:?}"
    );
    assert_eq!(
        graph.effective_bounds("g"),
        graph.node("g").unwrap().bounds(),
        "a collapsed group behaves as a leaf"
    );

    graph.set_collapsed("g", false);
    let after = graph.effective_bounds("g").center();
    assert!(
        before.distance_to(after) < 1e-3,
        "expanding back must restore the center, got {after:?}"
    );
    Ok(())
}

#[test]
fn collapse_change_is_notified_once_per_transition() -> Result<()> {
    let mut graph = grouped_graph()?;
    let subscription = graph.events().subscribe();

    graph.set_collapsed("g", false); // already expanded, no-op
    graph.set_collapsed("g", true);
    graph.set_collapsed("g", true); // no change, no event

    let events: Vec<GraphEvent> = graph.events().drain(subscription);
    assert_eq!(
        events,
        vec![GraphEvent::CollapseChanged {
            node: "g".into(),
            collapsed: true
        }]
    );
    graph.events().unsubscribe(subscription);
    Ok(())
}

#[test]
fn collapsed_groups_hide_their_node_children() -> Result<()> {
    let mut graph = grouped_graph()?;
    assert_eq!(graph.children("g").len(), 2);

    graph.set_collapsed("g", true);
    assert!(
        graph.children("g").is_empty(),
        "collapsed groups must not expose node children"
    );
    assert!(graph.is_hidden("c1"));
    assert!(!graph.is_hidden("g"));
    Ok(())
}

#[test]
fn edges_into_a_collapsed_group_are_redirected() -> Result<()> {
    let mut graph = grouped_graph()?;
    graph.set_collapsed("g", true);

    let routable = graph.routable_edges();
    assert_eq!(routable.len(), 1);
    assert_eq!(routable[0].source, "outside");
    assert_eq!(
        routable[0].target, "g",
        "the hidden endpoint should resolve to its collapsed ancestor"
    );
    assert_eq!(graph.visible_endpoint("c1").as_deref(), Some("g"));
    Ok(())
}

#[test]
fn set_model_merges_only_present_fields() -> Result<()> {
    let mut graph = grouped_graph()?;
    graph.set_node_model(&NodeModel {
        id: "c1".into(),
        x: Some(5.0),
        ..NodeModel::default()
    })?;

    let bounds = graph.node("c1").unwrap().bounds();
    assert_eq!(bounds.x, 5.0);
    assert_eq!(bounds.y, 0.0, "unspecified fields must survive the merge");
    assert_eq!(bounds.width, 50.0);
    assert_eq!(bounds.height, 50.0);
    Ok(())
}

#[test]
fn removing_a_group_removes_its_subtree_and_edges() -> Result<()> {
    let mut graph = grouped_graph()?;
    assert!(graph.remove_node("g"));
    assert!(graph.node("c1").is_none());
    assert!(graph.node("c2").is_none());
    assert!(
        graph.edges().is_empty(),
        "edges touching the removed subtree must go with it"
    );
    assert!(graph.node("outside").is_some());
    assert!(!graph.remove_node("g"), "second removal reports absence");
    Ok(())
}

#[test]
fn expanded_groups_contribute_no_parent_translation() -> Result<()> {
    let mut graph = grouped_graph()?;
    let point = topograph::Point::new(7.0, 7.0);

    let group = graph.node("g").unwrap();
    assert_eq!(
        group.translate_to_parent(point),
        point,
        "an expanded group is a pure container"
    );

    graph.set_collapsed("g", true);
    let group = graph.node("g").unwrap();
    let translated = group.translate_to_parent(point);
    let bounds = group.bounds();
    assert_eq!(
        translated,
        point.translate(bounds.x, bounds.y),
        "a collapsed group is positioned and applies its own offset"
    );

    let leaf = graph.node("outside").unwrap();
    assert_eq!(
        leaf.translate_from_parent(leaf.translate_to_parent(point)),
        point
    );
    Ok(())
}

#[test]
fn model_load_rejects_structural_errors() {
    let duplicate: GraphModel = serde_json::from_str(
        r#"{"nodes": [{"id": "a"}, {"id": "a"}], "edges": []}"#,
    )
    .unwrap();
    assert!(Graph::from_model(&duplicate).is_err());

    let dangling: GraphModel = serde_json::from_str(
        r#"{"nodes": [{"id": "a"}], "edges": [{"id": "e", "source": "a", "target": "ghost"}]}"#,
    )
    .unwrap();
    assert!(Graph::from_model(&dangling).is_err());
}

#[test]
fn model_load_rejects_cyclic_parent_chains() {
    let mutual: GraphModel = serde_json::from_str(
        r#"{"nodes": [{"id": "a", "parent": "b"}, {"id": "b", "parent": "a"}], "edges": []}"#,
    )
    .unwrap();
    assert!(
        Graph::from_model(&mutual).is_err(),
        "mutually parented nodes must not load"
    );

    let self_parent: GraphModel =
        serde_json::from_str(r#"{"nodes": [{"id": "a", "parent": "a"}], "edges": []}"#).unwrap();
    assert!(Graph::from_model(&self_parent).is_err());
}

#[test]
fn reparenting_under_a_descendant_is_rejected() -> Result<()> {
    let mut graph = grouped_graph()?;
    let result = graph.set_node_model(&NodeModel {
        id: "g".into(),
        parent: Some("c1".into()),
        ..NodeModel::default()
    });
    assert!(
        result.is_err(),
        "a group cannot move underneath its own child"
    );
    assert!(
        graph.node("g").unwrap().parent().is_none(),
        "the failed reparent must leave the tree untouched"
    );
    assert_eq!(graph.node("c1").unwrap().parent(), Some("g"));
    Ok(())
}

#[test]
fn direction_round_trips_through_the_model() -> Result<()> {
    let model: GraphModel =
        serde_json::from_str(r#"{"direction": "LR", "nodes": [{"id": "a"}]}"#)?;
    let graph = Graph::from_model(&model)?;
    assert_eq!(graph.direction(), Direction::LR);
    assert!(graph.direction().is_horizontal());
    Ok(())
}
