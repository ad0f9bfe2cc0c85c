//! Compose, render and hit-test nested SVG scene graphs.
//!
//! This crate keeps a tree of typed scene nodes (groups, nested documents, shapes,
//! templates and their instances, clip paths, masks and brushes), renders it onto
//! [`tiny_skia::Pixmap`] surfaces, and resolves points back to the node under them.
//!
//! # Basic usage
//!
//! * Build a [`Document`] with a [`DocumentBuilder`], appending [`NodeData`] values.
//! * Create a [`Renderer`] for the document and render it onto a surface, or export
//!   it as PNG.
//! * Ask the [`Document`] for [`Document::hit_test`] and [`Document::client_rect`];
//!   both answer with what the last render computed.
//!
//! # Example
//!
//! ```
//! use svgscene::*;
//!
//! let mut builder = DocumentBuilder::new(Session::new(), NodeData::new(Svg::default()));
//! let root = builder.root();
//!
//! let button = builder.append(&root, NodeData::new(Group::default()).with_responsible(true));
//! builder.append(
//!     &button,
//!     NodeData::new(Shape::rect_px(10.0, 10.0, 30.0, 20.0).with_fill(PaintServer::parse_str("#0080ff").unwrap())),
//! );
//!
//! let document = builder.build();
//!
//! let mut surface = tiny_skia::Pixmap::new(100, 100).unwrap();
//! Renderer::new(&document).render(&mut surface).unwrap();
//!
//! assert_eq!(document.hit_test(20.0, 20.0), button.borrow().id());
//! assert_eq!(document.hit_test(90.0, 90.0), document.root().borrow().id());
//! ```
//!
//! # Diagnostics
//!
//! Problems inside a scene, like references to names that are not defined, never make
//! rendering fail; the offending node just draws nothing.  Set the `SVGSCENE_LOG`
//! environment variable, or use [`Renderer::with_logging`], to have them logged
//! through the [`log`] crate.

#![allow(clippy::clone_on_ref_ptr)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::derive_partial_eq_without_eq)]
#![warn(nonstandard_style, rust_2018_idioms, unused)]
#![warn(trivial_casts, trivial_numeric_casts)]

pub use crate::api::*;

#[macro_use]
mod float_eq;

#[macro_use]
mod log;

#[macro_use]
mod parsers;

mod api;
mod aspect_ratio;
mod coord_units;
mod definitions;
mod document;
mod drawing_ctx;
mod error;
mod glyph_context;
mod gradient;
mod length;
mod limits;
mod node;
mod outline;
mod paint_server;
mod path;
mod path_ops;
mod pattern;
mod properties;
mod rect;
mod region;
mod session;
mod shapes;
mod structure;
mod transform;
mod viewbox;

#[doc(hidden)]
pub mod bench_only {
    pub use crate::path_ops::{boolean_op, simplify};
    pub use crate::rect::IRect;
    pub use crate::region::Region;
}
