//! Presentation properties and their cascade.
//!
//! Shapes, groups and template instances each carry [`SpecifiedValues`].  Drawing
//! and hit testing fold them into [`ComputedValues`] on the way down the tree, so
//! a property set on a shape wins over the one set on its group, which wins over
//! whatever the group inherited.  All the properties here inherit.
//!
//! Clip paths, masks and pattern tiles start a fresh cascade from the document
//! defaults; only the current color carries over.

use cssparser::RGBA;

use crate::length::{Both, ULength};
use crate::paint_server::PaintServer;
use crate::path::FillRule;

/// A property as set on one node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SpecifiedValue<T> {
    /// Not set here; the inherited value applies.
    #[default]
    Unspecified,
    Inherit,
    Specified(T),
}

impl<T: Clone> SpecifiedValue<T> {
    pub fn compute(&self, inherited: &T) -> T {
        match *self {
            SpecifiedValue::Unspecified | SpecifiedValue::Inherit => inherited.clone(),
            SpecifiedValue::Specified(ref v) => v.clone(),
        }
    }

    pub fn is_specified(&self) -> bool {
        matches!(*self, SpecifiedValue::Specified(_))
    }
}

/// The properties set on a node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecifiedValues {
    pub fill: SpecifiedValue<PaintServer>,
    pub fill_opacity: SpecifiedValue<f64>,
    pub fill_rule: SpecifiedValue<FillRule>,
    pub stroke: SpecifiedValue<PaintServer>,
    pub stroke_width: SpecifiedValue<ULength<Both>>,
    pub stroke_opacity: SpecifiedValue<f64>,
    /// What `currentColor` paints with.
    pub color: SpecifiedValue<RGBA>,
}

impl SpecifiedValues {
    pub fn with_fill(mut self, fill: PaintServer) -> SpecifiedValues {
        self.fill = SpecifiedValue::Specified(fill);
        self
    }

    pub fn with_fill_opacity(mut self, opacity: f64) -> SpecifiedValues {
        self.fill_opacity = SpecifiedValue::Specified(unit_interval(opacity));
        self
    }

    pub fn with_fill_rule(mut self, rule: FillRule) -> SpecifiedValues {
        self.fill_rule = SpecifiedValue::Specified(rule);
        self
    }

    pub fn with_stroke(mut self, stroke: PaintServer) -> SpecifiedValues {
        self.stroke = SpecifiedValue::Specified(stroke);
        self
    }

    pub fn with_stroke_width(mut self, width: ULength<Both>) -> SpecifiedValues {
        self.stroke_width = SpecifiedValue::Specified(width);
        self
    }

    pub fn with_stroke_opacity(mut self, opacity: f64) -> SpecifiedValues {
        self.stroke_opacity = SpecifiedValue::Specified(unit_interval(opacity));
        self
    }

    pub fn with_color(mut self, color: RGBA) -> SpecifiedValues {
        self.color = SpecifiedValue::Specified(color);
        self
    }

    /// Folds these values into the ones inherited from the parent.
    pub fn to_computed_values(&self, computed: &mut ComputedValues) {
        computed.fill = self.fill.compute(&computed.fill);
        computed.fill_opacity = self.fill_opacity.compute(&computed.fill_opacity);
        computed.fill_rule = self.fill_rule.compute(&computed.fill_rule);
        computed.stroke = self.stroke.compute(&computed.stroke);
        computed.stroke_width = self.stroke_width.compute(&computed.stroke_width);
        computed.stroke_opacity = self.stroke_opacity.compute(&computed.stroke_opacity);
        computed.color = self.color.compute(&computed.color);
    }
}

/// The properties in effect at a node.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedValues {
    pub fill: PaintServer,
    pub fill_opacity: f64,
    pub fill_rule: FillRule,
    pub stroke: PaintServer,
    pub stroke_width: ULength<Both>,
    pub stroke_opacity: f64,
    pub color: RGBA,
}

/// Black fill, no stroke, black current color.
impl Default for ComputedValues {
    fn default() -> ComputedValues {
        ComputedValues::with_current_color(RGBA::new(0, 0, 0, 255))
    }
}

impl ComputedValues {
    /// The document defaults, with `color` as the current color.
    pub fn with_current_color(color: RGBA) -> ComputedValues {
        ComputedValues {
            fill: PaintServer::SolidColor(RGBA::new(0, 0, 0, 255)),
            fill_opacity: 1.0,
            fill_rule: FillRule::NonZero,
            stroke: PaintServer::None,
            stroke_width: ULength::px(1.0),
            stroke_opacity: 1.0,
            color,
        }
    }

    /// Defaults for content that does not inherit from where it is used, like
    /// the children of a clip path or a mask.
    pub fn reset(&self) -> ComputedValues {
        ComputedValues::with_current_color(self.color)
    }
}

fn unit_interval(v: f64) -> f64 {
    if v.is_nan() {
        1.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
