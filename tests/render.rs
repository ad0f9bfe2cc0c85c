mod utils;

use svgscene::*;
use tiny_skia::Pixmap;

use crate::utils::*;

#[test]
fn fills_shapes_in_paint_order() {
    let (mut builder, root) = builder();
    builder.append(&root, filled_rect(0.0, 0.0, 20.0, 20.0, "red"));
    builder.append(&root, filled_rect(10.0, 10.0, 20.0, 20.0, "blue"));
    let document = builder.build();

    let surface = render(&document, 40, 40);

    assert_eq!(pixel(&surface, 5, 5), RED);
    assert_eq!(pixel(&surface, 15, 15), BLUE);
    assert_eq!(pixel(&surface, 25, 25), BLUE);
    assert_eq!(pixel(&surface, 35, 35), TRANSPARENT);
}

#[test]
fn group_client_rect_is_union_of_children() {
    let (mut builder, root) = builder();
    let group = builder.append(&root, NodeData::new(Group::default()));
    builder.append(&group, filled_rect(0.0, 0.0, 10.0, 10.0, "red"));
    builder.append(&group, filled_rect(20.0, 20.0, 10.0, 10.0, "red"));
    let document = builder.build();

    render(&document, 50, 50);

    assert_eq!(document.client_rect(&group), Some(Rect::new(0.0, 0.0, 30.0, 30.0)));
}

#[test]
fn client_rect_does_not_depend_on_child_order() {
    let rects = [(20.0, 20.0, 10.0, 10.0), (0.0, 5.0, 10.0, 10.0), (5.0, 0.0, 2.0, 40.0)];

    let union_for = |order: &[usize]| {
        let (mut builder, root) = builder();
        let group = builder.append(&root, NodeData::new(Group::default()));
        for &i in order {
            let (x, y, w, h) = rects[i];
            builder.append(&group, filled_rect(x, y, w, h, "red"));
        }
        let document = builder.build();
        render(&document, 50, 50);
        document.client_rect(&group)
    };

    let expected = Some(Rect::new(0.0, 0.0, 30.0, 40.0));
    assert_eq!(union_for(&[0, 1, 2]), expected);
    assert_eq!(union_for(&[2, 1, 0]), expected);
    assert_eq!(union_for(&[1, 2, 0]), expected);
}

#[test]
fn transforms_apply_to_content_and_client_rect() {
    let (mut builder, root) = builder();
    let group = builder.append(
        &root,
        NodeData::new(Group::default()).with_transform(Transform::new_translate(20.0, 0.0)),
    );
    builder.append(&group, filled_rect(0.0, 0.0, 10.0, 10.0, "red"));
    let document = builder.build();

    let surface = render(&document, 40, 40);

    assert_eq!(pixel(&surface, 5, 5), TRANSPARENT);
    assert_eq!(pixel(&surface, 25, 5), RED);
    assert_eq!(document.client_rect(&group), Some(Rect::new(20.0, 0.0, 30.0, 10.0)));
}

#[test]
fn invisible_nodes_draw_nothing() {
    let (mut builder, root) = builder();
    let hidden = builder.append(&root, filled_rect(0.0, 0.0, 10.0, 10.0, "red").with_opacity(0.0));
    let singular = builder.append(
        &root,
        NodeData::new(Group::default()).with_transform(Transform::new_scale(0.0, 1.0)),
    );
    builder.append(&singular, filled_rect(20.0, 0.0, 10.0, 10.0, "red"));
    let document = builder.build();

    let surface = render(&document, 40, 40);

    assert_eq!(pixel(&surface, 5, 5), TRANSPARENT);
    assert_eq!(pixel(&surface, 25, 5), TRANSPARENT);
    assert!(document.client_rect(&hidden).is_none());
    assert!(document.client_rect(&singular).is_none());
}

#[test]
fn group_opacity_multiplies_into_children() {
    let (mut builder, root) = builder();
    let group = builder.append(&root, NodeData::new(Group::default()).with_opacity(0.5));
    builder.append(&group, filled_rect(0.0, 0.0, 10.0, 10.0, "red"));
    let document = builder.build();

    let surface = render(&document, 20, 20);
    let (_, _, _, alpha) = pixel(&surface, 5, 5);

    assert!((126..=129).contains(&alpha), "alpha was {}", alpha);
}

#[test]
fn strokes_are_painted() {
    let (mut builder, root) = builder();
    builder.append(
        &root,
        NodeData::new(
            Shape::line(Length::px(0.0), Length::px(20.0), Length::px(40.0), Length::px(20.0))
                .with_stroke(paint("red"))
                .with_stroke_width(ULength::px(4.0)),
        ),
    );
    let document = builder.build();

    let surface = render(&document, 40, 40);

    assert_eq!(pixel(&surface, 20, 20), RED);
    assert_eq!(pixel(&surface, 20, 10), TRANSPARENT);
}

#[test]
fn renders_at_device_scale() {
    let (mut builder, root) = builder();
    builder.append(&root, filled_rect(0.0, 0.0, 10.0, 10.0, "red"));
    let document = builder.build();

    let surface = Renderer::new(&document)
        .with_scale(2.0)
        .render_to_pixmap(20.0, 20.0)
        .unwrap()
        .unwrap();

    assert_eq!((surface.width(), surface.height()), (40, 40));
    assert_eq!(pixel(&surface, 15, 15), RED);
    assert_eq!(pixel(&surface, 25, 25), TRANSPARENT);
}

#[test]
fn background_is_painted_first() {
    let (mut builder, root) = builder();
    builder.append(&root, filled_rect(0.0, 0.0, 10.0, 10.0, "red"));
    let document = builder.build();

    let mut surface = Pixmap::new(20, 20).unwrap();
    Renderer::new(&document)
        .with_background(cssparser::RGBA::new(0, 0, 255, 255))
        .render(&mut surface)
        .unwrap();

    assert_eq!(pixel(&surface, 5, 5), RED);
    assert_eq!(pixel(&surface, 15, 15), BLUE);
}

#[test]
fn percentages_resolve_against_viewport() {
    let (mut builder, root) = builder();
    builder.append(
        &root,
        NodeData::new(
            Shape::rect(
                Length::percent(50.0),
                Length::px(0.0),
                ULength::percent(50.0),
                ULength::percent(100.0),
            )
            .with_fill(paint("red")),
        ),
    );
    let document = builder.build();

    let surface = render(&document, 40, 20);

    assert_eq!(pixel(&surface, 10, 10), TRANSPARENT);
    assert_eq!(pixel(&surface, 30, 10), RED);
}

#[test]
fn nested_document_maps_its_view_box() {
    let (mut builder, root) = builder();
    let nested = builder.append(
        &root,
        NodeData::new(
            Svg::new(ULength::px(50.0), ULength::px(50.0))
                .with_position(Length::px(10.0), Length::px(10.0))
                .with_view_box(ViewBox::new(0.0, 0.0, 10.0, 10.0), AspectRatio::default()),
        ),
    );
    builder.append(&nested, filled_rect(0.0, 0.0, 10.0, 10.0, "lime"));
    // overflows the nested viewport and gets clipped
    builder.append(&nested, filled_rect(5.0, 5.0, 100.0, 100.0, "red"));
    let document = builder.build();

    let surface = render(&document, 100, 100);

    assert_eq!(pixel(&surface, 5, 5), TRANSPARENT);
    assert_eq!(pixel(&surface, 15, 15), LIME);
    assert_eq!(pixel(&surface, 55, 55), RED);
    assert_eq!(pixel(&surface, 65, 65), TRANSPARENT);
    assert_eq!(document.client_rect(&nested), Some(Rect::new(10.0, 10.0, 60.0, 60.0)));
}

#[test]
fn empty_nested_document_draws_nothing() {
    let (mut builder, root) = builder();
    let nested = builder.append(&root, NodeData::new(Svg::new(ULength::px(0.0), ULength::px(50.0))));
    builder.append(&nested, filled_rect(0.0, 0.0, 10.0, 10.0, "red"));
    let document = builder.build();

    let surface = render(&document, 20, 20);

    assert_eq!(pixel(&surface, 5, 5), TRANSPARENT);
    assert!(document.client_rect(&nested).is_none());
}

#[test]
fn font_size_applies_to_descendants() {
    let (mut builder, root) = builder();
    let group = builder.append(&root, NodeData::new(Group::with_font(FontSize::px(10.0))));
    builder.append(
        &group,
        NodeData::new(
            Shape::rect(
                Length::px(0.0),
                Length::px(0.0),
                ULength::new(2.0, LengthUnit::Em),
                ULength::new(1.0, LengthUnit::Em),
            )
            .with_fill(paint("red")),
        ),
    );
    let document = builder.build();

    let surface = render(&document, 40, 40);

    assert_eq!(pixel(&surface, 15, 5), RED);
    assert_eq!(pixel(&surface, 25, 5), TRANSPARENT);
    assert_eq!(pixel(&surface, 5, 15), TRANSPARENT);
}

#[test]
fn mutations_show_up_in_next_render() {
    let (mut builder, root) = builder();
    let shape = builder.append(&root, filled_rect(0.0, 0.0, 10.0, 10.0, "red"));
    let document = builder.build();

    assert_eq!(pixel(&render(&document, 20, 20), 5, 5), RED);

    document.update_element(&shape, |e| {
        if let Element::Shape(ref mut s) = *e {
            s.values.fill = SpecifiedValue::Specified(paint("lime"));
        }
    });
    assert_eq!(pixel(&render(&document, 20, 20), 5, 5), LIME);

    document.set_transform(&shape, Transform::new_translate(10.0, 10.0));
    let surface = render(&document, 20, 20);
    assert_eq!(pixel(&surface, 5, 5), TRANSPARENT);
    assert_eq!(pixel(&surface, 15, 15), LIME);

    document.detach(&shape);
    assert_eq!(pixel(&render(&document, 20, 20), 15, 15), TRANSPARENT);
}

fn unpainted_rect(x: f64, y: f64, w: f64, h: f64) -> NodeData {
    NodeData::new(Shape::rect_px(x, y, w, h))
}

#[test]
fn group_paint_is_inherited_and_overridden() {
    let (mut builder, root) = builder();
    let group = builder.append(
        &root,
        NodeData::new(Group::default().with_values(SpecifiedValues::default().with_fill(paint("lime")))),
    );
    builder.append(&group, unpainted_rect(0.0, 0.0, 10.0, 10.0));
    builder.append(&group, filled_rect(10.0, 0.0, 10.0, 10.0, "red"));
    builder.append(&root, unpainted_rect(20.0, 0.0, 10.0, 10.0));
    let document = builder.build();

    let surface = render(&document, 30, 10);
    assert_eq!(pixel(&surface, 5, 5), LIME);
    assert_eq!(pixel(&surface, 15, 5), RED);
    // outside the group the default fill is black
    assert_eq!(pixel(&surface, 25, 5), (0, 0, 0, 255));
}

#[test]
fn stroke_is_inherited_through_nested_groups() {
    let (mut builder, root) = builder();
    let outer = builder.append(
        &root,
        NodeData::new(Group::default().with_values(
            SpecifiedValues::default()
                .with_stroke(paint("blue"))
                .with_stroke_width(ULength::px(4.0)),
        )),
    );
    let inner = builder.append(
        &outer,
        NodeData::new(Group::default().with_values(SpecifiedValues::default().with_fill(PaintServer::None))),
    );
    builder.append(&inner, unpainted_rect(10.0, 10.0, 20.0, 20.0));
    let document = builder.build();

    let surface = render(&document, 40, 40);
    assert_eq!(pixel(&surface, 10, 20), BLUE);
    assert_eq!(pixel(&surface, 20, 20), TRANSPARENT);
}

#[test]
fn instances_paint_their_template_differently() {
    let (mut builder, root) = builder();
    let defs = builder.append(&root, NodeData::new(Defs));
    let template = builder.append(&defs, NodeData::new(Group::default()).with_name("t"));
    builder.append(&template, unpainted_rect(0.0, 0.0, 10.0, 10.0));
    builder.append(
        &root,
        NodeData::new(Use::new("t").with_values(SpecifiedValues::default().with_fill(paint("lime")))),
    );
    builder.append(
        &root,
        NodeData::new(
            Use::new("t")
                .with_position(Length::px(10.0), Length::px(0.0))
                .with_values(SpecifiedValues::default().with_fill(paint("blue"))),
        ),
    );
    let document = builder.build();

    let surface = render(&document, 20, 10);
    assert_eq!(pixel(&surface, 5, 5), LIME);
    assert_eq!(pixel(&surface, 15, 5), BLUE);
}

#[test]
fn current_color_comes_from_the_document_or_the_nearest_color() {
    let (mut builder, root) = builder();
    builder.append(&root, filled_rect(0.0, 0.0, 10.0, 10.0, "currentColor"));
    let group = builder.append(
        &root,
        NodeData::new(Group::default().with_values(
            SpecifiedValues::default().with_color(cssparser::RGBA::new(0, 255, 0, 255)),
        )),
    );
    builder.append(&group, filled_rect(10.0, 0.0, 10.0, 10.0, "currentColor"));
    let document = builder.build();

    let surface = render(&document, 20, 10);
    assert_eq!(pixel(&surface, 5, 5), (0, 0, 0, 255));
    assert_eq!(pixel(&surface, 15, 5), LIME);

    document.set_current_color(cssparser::RGBA::new(0, 0, 255, 255));

    let surface = render(&document, 20, 10);
    assert_eq!(pixel(&surface, 5, 5), BLUE);
    assert_eq!(pixel(&surface, 15, 5), LIME);
}

#[test]
fn mask_content_does_not_inherit_from_the_masked_node() {
    let (mut builder, root) = builder();
    let mask = builder.append(
        &root,
        NodeData::new(Mask::user_space(
            Length::px(0.0),
            Length::px(0.0),
            ULength::px(20.0),
            ULength::px(20.0),
        ))
        .with_name("m"),
    );
    builder.append(&mask, unpainted_rect(0.0, 0.0, 20.0, 20.0));
    let group = builder.append(
        &root,
        NodeData::new(Group::default().with_values(SpecifiedValues::default().with_fill(paint("white")))),
    );
    builder.append(&group, filled_rect(0.0, 0.0, 20.0, 20.0, "red").with_mask("m"));
    let document = builder.build();

    // the mask content is filled black, so nothing shows through
    assert_eq!(pixel(&render(&document, 20, 20), 10, 10), TRANSPARENT);
}
