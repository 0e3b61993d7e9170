use topograph::{Anchor, AnchorEnd, Node, Point, Rect, SvgShape};

fn bounds() -> Rect {
    Rect::new(0.0, 0.0, 100.0, 60.0)
}

#[test]
fn rect_anchor_lands_on_the_boundary() {
    let anchor = Anchor::Rect { offset: 0.0 };
    for reference in [
        Point::new(300.0, 30.0),
        Point::new(50.0, -200.0),
        Point::new(-80.0, 120.0),
        Point::new(170.0, 170.0),
    ] {
        let location = anchor.location(bounds(), reference);
        let on_vertical = (location.x - 0.0).abs() < 1e-3 || (location.x - 100.0).abs() < 1e-3;
        let on_horizontal = (location.y - 0.0).abs() < 1e-3 || (location.y - 60.0).abs() < 1e-3;
        assert!(
            on_vertical || on_horizontal,
            "anchor point {location:?} for reference {reference:?} should sit on an edge"
        );
        assert!(
            location.x >= -1e-3 && location.x <= 100.0 + 1e-3,
            "anchor point must stay within the horizontal extent"
        );
        assert!(location.y >= -1e-3 && location.y <= 60.0 + 1e-3);
    }
}

#[test]
fn rect_anchor_offset_leaves_a_gap() {
    let anchor = Anchor::Rect { offset: 6.0 };
    let location = anchor.location(bounds(), Point::new(300.0, 30.0));
    assert!(
        (location.x - 106.0).abs() < 1e-3,
        "offset should push the point outward along the ray, got {location:?}"
    );
}

#[test]
fn ellipse_anchor_lands_on_the_ellipse() {
    let anchor = Anchor::Ellipse { offset: 0.0 };
    let location = anchor.location(bounds(), Point::new(50.0, 500.0));
    // Straight down from center: the boundary is at the vertical semi-axis.
    assert!((location.x - 50.0).abs() < 1e-3);
    assert!((location.y - 60.0).abs() < 1e-3, "got {location:?}");
}

#[test]
fn empty_bounds_fall_back_to_center() {
    let empty = Rect::new(25.0, 25.0, 0.0, 0.0);
    for anchor in [
        Anchor::Center,
        Anchor::Rect { offset: 5.0 },
        Anchor::Ellipse { offset: 5.0 },
        Anchor::Svg {
            shape: None,
            offset: 0.0,
        },
    ] {
        assert_eq!(
            anchor.location(empty, Point::new(900.0, 900.0)),
            empty.center(),
            "degenerate bounds must resolve to the center, never panic"
        );
    }
}

#[test]
fn svg_circle_anchor_uses_the_shape_geometry() {
    let anchor = Anchor::Svg {
        shape: Some(SvgShape::Circle {
            cx: 50.0,
            cy: 30.0,
            r: 20.0,
        }),
        offset: 0.0,
    };
    let location = anchor.location(bounds(), Point::new(500.0, 30.0));
    // Circle radius 20 around the node center, so the boundary sits at x=70.
    assert!((location.x - 70.0).abs() < 1e-3, "got {location:?}");
    assert!((location.y - 30.0).abs() < 1e-3);
}

#[test]
fn svg_polygon_anchor_intersects_a_side() {
    let anchor = Anchor::Svg {
        shape: Some(SvgShape::Polygon {
            points: vec![
                Point::new(50.0, 0.0),
                Point::new(100.0, 30.0),
                Point::new(50.0, 60.0),
                Point::new(0.0, 30.0),
            ],
        }),
        offset: 0.0,
    };
    let location = anchor.location(bounds(), Point::new(500.0, 30.0));
    assert!(
        (location.x - 100.0).abs() < 1e-3 && (location.y - 30.0).abs() < 1e-3,
        "ray straight right should exit through the right vertex, got {location:?}"
    );
}

#[test]
fn svg_anchor_without_shape_falls_back_to_center() {
    let anchor = Anchor::Svg {
        shape: None,
        offset: 3.0,
    };
    assert_eq!(anchor.location(bounds(), Point::new(0.0, 0.0)), bounds().center());
}

#[test]
fn svg_reference_point_comes_from_the_shape_bbox() {
    let anchor = Anchor::Svg {
        shape: Some(SvgShape::Rect {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 20.0,
        }),
        offset: 0.0,
    };
    // Shape bbox center is local (20, 20), translated by the bounds origin.
    let reference = anchor.reference_point(Rect::new(100.0, 100.0, 100.0, 60.0));
    assert_eq!(reference, Point::new(120.0, 120.0));
}

#[test]
fn anchor_resolution_follows_the_fallback_chain() {
    let mut node = Node::new("n");
    node.set_anchor(AnchorEnd::Source, "tls", Anchor::Rect { offset: 1.0 });
    node.set_anchor(AnchorEnd::Source, "", Anchor::Rect { offset: 2.0 });
    node.set_anchor(AnchorEnd::Both, "tls", Anchor::Ellipse { offset: 3.0 });

    // Exact match wins.
    assert_eq!(
        node.anchor(AnchorEnd::Source, "tls"),
        &Anchor::Rect { offset: 1.0 }
    );
    // Unknown kind on a registered end falls to the untyped end anchor.
    assert_eq!(
        node.anchor(AnchorEnd::Source, "mystery"),
        &Anchor::Rect { offset: 2.0 }
    );
    // Target has nothing registered; the typed Both anchor is next.
    assert_eq!(
        node.anchor(AnchorEnd::Target, "tls"),
        &Anchor::Ellipse { offset: 3.0 }
    );
    // And the default (Both, untyped) center terminates every query.
    assert_eq!(node.anchor(AnchorEnd::Target, "mystery"), &Anchor::Center);
    assert_eq!(node.anchor(AnchorEnd::Both, "anything"), &Anchor::Center);
}
