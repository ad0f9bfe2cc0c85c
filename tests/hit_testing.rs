mod utils;

use svgscene::*;

use crate::utils::*;

#[test]
fn nothing_is_hit_before_rendering() {
    let (mut builder, root) = builder();
    builder.append(&root, filled_rect(0.0, 0.0, 10.0, 10.0, "red").with_responsible(true));
    let document = builder.build();

    assert_eq!(document.hit_test(5.0, 5.0), id(&root));
}

#[test]
fn responsible_shape_reports_itself() {
    let (mut builder, root) = builder();
    let shape = builder.append(&root, filled_rect(0.0, 0.0, 10.0, 10.0, "red").with_responsible(true));
    let document = builder.build();
    render(&document, 20, 20);

    assert_eq!(document.hit_test(5.0, 5.0), id(&shape));
    assert_eq!(document.hit_test(15.0, 15.0), id(&root));
}

#[test]
fn topmost_shape_wins() {
    let (mut builder, root) = builder();
    let below = builder.append(&root, filled_rect(0.0, 0.0, 20.0, 20.0, "red").with_responsible(true));
    let above = builder.append(&root, filled_rect(10.0, 10.0, 20.0, 20.0, "blue").with_responsible(true));
    let document = builder.build();
    render(&document, 40, 40);

    assert_eq!(document.hit_test(5.0, 5.0), id(&below));
    assert_eq!(document.hit_test(15.0, 15.0), id(&above));
    assert_eq!(document.hit_test(25.0, 25.0), id(&above));
}

#[test]
fn hit_on_passive_child_bubbles_to_responsible_group() {
    let (mut builder, root) = builder();
    let button = builder.append(&root, NodeData::new(Group::default()).with_responsible(true));
    builder.append(&button, filled_rect(0.0, 0.0, 10.0, 10.0, "red"));
    let label = builder.append(&button, filled_rect(2.0, 2.0, 4.0, 4.0, "blue").with_responsible(true));
    let document = builder.build();
    render(&document, 20, 20);

    assert_eq!(document.hit_test(8.0, 8.0), id(&button));
    assert_eq!(document.hit_test(4.0, 4.0), id(&label));
}

#[test]
fn passive_tree_is_transparent_to_hits() {
    let (mut builder, root) = builder();
    let group = builder.append(&root, NodeData::new(Group::default()));
    builder.append(&group, filled_rect(0.0, 0.0, 10.0, 10.0, "red"));
    let document = builder.build();
    render(&document, 20, 20);

    assert_eq!(document.hit_test(5.0, 5.0), id(&root));
}

#[test]
fn hits_follow_transforms() {
    let (mut builder, root) = builder();
    let group = builder.append(
        &root,
        NodeData::new(Group::default()).with_transform(Transform::new_translate(100.0, 0.0)),
    );
    let shape = builder.append(
        &group,
        filled_rect(0.0, 0.0, 10.0, 10.0, "red")
            .with_responsible(true)
            .with_transform(Transform::new_scale(2.0, 2.0)),
    );
    let document = builder.build();
    render(&document, 200, 50);

    assert_eq!(document.hit_test(5.0, 5.0), id(&root));
    assert_eq!(document.hit_test(115.0, 15.0), id(&shape));
    assert_eq!(document.hit_test(125.0, 5.0), id(&root));
}

#[test]
fn singular_transform_is_never_hit() {
    let (mut builder, root) = builder();
    let group = builder.append(
        &root,
        NodeData::new(Group::default()).with_transform(Transform::new_scale(0.0, 0.0)),
    );
    builder.append(&group, filled_rect(0.0, 0.0, 10.0, 10.0, "red").with_responsible(true));
    let document = builder.build();
    render(&document, 20, 20);

    assert_eq!(document.hit_test(0.0, 0.0), id(&root));
    assert_eq!(document.hit_test(5.0, 5.0), id(&root));
}

#[test]
fn clip_path_rejects_hits_outside_it() {
    let (mut builder, root) = builder();
    let clip = builder.append(&root, NodeData::new(ClipPath).with_name("c"));
    builder.append(&clip, filled_rect(0.0, 0.0, 20.0, 20.0, "black"));
    let shape = builder.append(
        &root,
        filled_rect(0.0, 0.0, 40.0, 40.0, "red")
            .with_clip_path("c")
            .with_responsible(true),
    );
    let document = builder.build();
    render(&document, 40, 40);

    assert_eq!(document.hit_test(10.0, 10.0), id(&shape));
    assert_eq!(document.hit_test(30.0, 30.0), id(&root));
}

#[test]
fn stroke_counts_as_a_hit() {
    let (mut builder, root) = builder();
    let line = builder.append(
        &root,
        NodeData::new(
            Shape::line(Length::px(0.0), Length::px(20.0), Length::px(40.0), Length::px(20.0))
                .with_stroke(paint("red"))
                .with_stroke_width(ULength::px(6.0)),
        )
        .with_responsible(true),
    );
    let document = builder.build();
    render(&document, 40, 40);

    assert_eq!(document.hit_test(20.0, 22.0), id(&line));
    assert_eq!(document.hit_test(20.0, 30.0), id(&root));
}

#[test]
fn instance_of_template_is_hit_as_the_instance() {
    let (mut builder, root) = builder();
    let defs = builder.append(&root, NodeData::new(Defs));
    let template = builder.append(&defs, NodeData::new(Group::default()).with_name("t"));
    builder.append(&template, filled_rect(0.0, 0.0, 10.0, 10.0, "red"));
    let instance = builder.append(
        &root,
        NodeData::new(Use::new("t").with_position(Length::px(20.0), Length::px(20.0))).with_responsible(true),
    );
    let document = builder.build();
    render(&document, 40, 40);

    assert_eq!(document.hit_test(25.0, 25.0), id(&instance));
    assert_eq!(document.hit_test(5.0, 5.0), id(&root));
}

#[test]
fn symbol_instance_is_hit_inside_its_viewport() {
    let (mut builder, root) = builder();
    let symbol = builder.append(
        &root,
        NodeData::new(Symbol::new(ViewBox::new(0.0, 0.0, 10.0, 10.0), AspectRatio::default())).with_name("s"),
    );
    let inner = builder.append(&symbol, filled_rect(0.0, 0.0, 20.0, 20.0, "red").with_responsible(true));
    builder.append(
        &root,
        NodeData::new(Use::new("s").with_size(ULength::px(20.0), ULength::px(20.0))),
    );
    let document = builder.build();
    render(&document, 60, 60);

    assert_eq!(document.hit_test(10.0, 10.0), id(&inner));
    // the shape overflows the symbol's viewport, where it is clipped away
    assert_eq!(document.hit_test(30.0, 30.0), id(&root));
}

#[test]
fn nested_document_without_responsible_content_lets_hits_through() {
    let (mut builder, root) = builder();
    let below = builder.append(&root, filled_rect(0.0, 0.0, 20.0, 20.0, "red").with_responsible(true));
    let nested = builder.append(&root, NodeData::new(Svg::new(ULength::px(20.0), ULength::px(20.0))));
    builder.append(&nested, filled_rect(0.0, 0.0, 20.0, 20.0, "blue"));
    let document = builder.build();
    render(&document, 40, 40);

    assert_eq!(document.hit_test(10.0, 10.0), id(&below));
}

#[test]
fn nested_document_reports_responsible_content() {
    let (mut builder, root) = builder();
    let nested = builder.append(
        &root,
        NodeData::new(
            Svg::new(ULength::px(20.0), ULength::px(20.0))
                .with_position(Length::px(10.0), Length::px(10.0))
                .with_view_box(ViewBox::new(0.0, 0.0, 10.0, 10.0), AspectRatio::default()),
        ),
    );
    let shape = builder.append(&nested, filled_rect(0.0, 0.0, 5.0, 5.0, "blue").with_responsible(true));
    let document = builder.build();
    render(&document, 40, 40);

    assert_eq!(document.hit_test(15.0, 15.0), id(&shape));
    assert_eq!(document.hit_test(25.0, 25.0), id(&root));
    assert_eq!(document.hit_test(5.0, 5.0), id(&root));
}

#[test]
fn hits_follow_mutations_after_rerender() {
    let (mut builder, root) = builder();
    let shape = builder.append(&root, filled_rect(0.0, 0.0, 10.0, 10.0, "red").with_responsible(true));
    let document = builder.build();
    render(&document, 40, 40);

    assert_eq!(document.hit_test(5.0, 5.0), id(&shape));

    document.set_transform(&shape, Transform::new_translate(20.0, 0.0));
    render(&document, 40, 40);

    assert_eq!(document.hit_test(5.0, 5.0), id(&root));
    assert_eq!(document.hit_test(25.0, 5.0), id(&shape));

    document.set_responsible(&shape, false);
    render(&document, 40, 40);

    assert_eq!(document.hit_test(25.0, 5.0), id(&root));
}

#[test]
fn hit_coordinates_are_in_user_units_at_any_scale() {
    let (mut builder, root) = builder();
    let shape = builder.append(&root, filled_rect(10.0, 10.0, 10.0, 10.0, "red").with_responsible(true));
    let document = builder.build();

    Renderer::new(&document)
        .with_scale(3.0)
        .render_to_pixmap(40.0, 40.0)
        .unwrap()
        .unwrap();

    assert_eq!(document.hit_test(15.0, 15.0), id(&shape));
    assert_eq!(document.hit_test(45.0, 45.0), id(&root));
}

#[test]
fn each_symbol_instance_is_hit_with_its_own_size() {
    let (mut builder, root) = builder();
    let symbol = builder.append(
        &root,
        NodeData::new(Symbol::new(ViewBox::new(0.0, 0.0, 10.0, 10.0), AspectRatio::default())).with_name("s"),
    );
    builder.append(&symbol, filled_rect(0.0, 0.0, 10.0, 10.0, "red"));
    let small = builder.append(
        &root,
        NodeData::new(Use::new("s").with_size(ULength::px(20.0), ULength::px(20.0))).with_responsible(true),
    );
    let large = builder.append(
        &root,
        NodeData::new(
            Use::new("s")
                .with_position(Length::px(50.0), Length::px(0.0))
                .with_size(ULength::px(40.0), ULength::px(40.0)),
        )
        .with_responsible(true),
    );
    let document = builder.build();
    let surface = render(&document, 100, 50);

    assert_eq!(pixel(&surface, 15, 15), RED);
    assert_eq!(pixel(&surface, 25, 25), TRANSPARENT);
    assert_eq!(pixel(&surface, 85, 35), RED);

    assert_eq!(document.hit_test(15.0, 15.0), id(&small));
    assert_eq!(document.hit_test(25.0, 25.0), id(&root));
    assert_eq!(document.hit_test(85.0, 35.0), id(&large));
    assert_eq!(document.hit_test(95.0, 45.0), id(&root));
}

#[test]
fn huge_clip_path_is_hit_tested() {
    // the document is larger than the surface it is rendered to
    let mut builder = DocumentBuilder::new(
        Session::new_for_test_suite(),
        NodeData::new(Svg::new(ULength::px(400.0), ULength::px(400.0))),
    );
    let root = builder.root();
    let clip = builder.append(&root, NodeData::new(ClipPath).with_name("c"));
    builder.append(&clip, filled_rect(-1e9, -1e9, 2e9, 1e9 + 20.0, "black"));
    let shape = builder.append(
        &root,
        filled_rect(0.0, 0.0, 200.0, 200.0, "red")
            .with_clip_path("c")
            .with_responsible(true),
    );
    let document = builder.build();

    Renderer::new(&document)
        .with_scale(4.0)
        .render_to_pixmap(40.0, 40.0)
        .unwrap()
        .unwrap();

    assert_eq!(document.hit_test(10.0, 10.0), id(&shape));
    assert_eq!(document.hit_test(10.0, 30.0), id(&root));
    // off the surface the clip outline itself decides
    assert_eq!(document.hit_test(150.0, 10.0), id(&shape));
    assert_eq!(document.hit_test(150.0, 30.0), id(&root));
}
