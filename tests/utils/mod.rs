#![allow(dead_code)]

use svgscene::*;
use tiny_skia::Pixmap;

pub fn builder() -> (DocumentBuilder, Node) {
    let builder = DocumentBuilder::new(Session::new_for_test_suite(), NodeData::new(Svg::default()));
    let root = builder.root();
    (builder, root)
}

pub fn paint(s: &str) -> PaintServer {
    PaintServer::parse_str(s).unwrap()
}

pub fn filled_rect(x: f64, y: f64, w: f64, h: f64, color: &str) -> NodeData {
    NodeData::new(Shape::rect_px(x, y, w, h).with_fill(paint(color)))
}

pub fn render(document: &Document, width: u32, height: u32) -> Pixmap {
    let mut surface = Pixmap::new(width, height).unwrap();
    Renderer::new(document).render(&mut surface).unwrap();
    surface
}

/// Returns the premultiplied components of a pixel.
pub fn pixel(surface: &Pixmap, x: u32, y: u32) -> (u8, u8, u8, u8) {
    let p = surface.pixel(x, y).unwrap();
    (p.red(), p.green(), p.blue(), p.alpha())
}

pub const TRANSPARENT: (u8, u8, u8, u8) = (0, 0, 0, 0);
pub const RED: (u8, u8, u8, u8) = (255, 0, 0, 255);
pub const LIME: (u8, u8, u8, u8) = (0, 255, 0, 255);
pub const BLUE: (u8, u8, u8, u8) = (0, 0, 255, 255);

pub fn id(node: &Node) -> NodeId {
    node.borrow().id()
}
