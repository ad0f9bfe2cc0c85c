//! Ambient viewport and font scope threaded through a traversal.

use crate::length::{resolve, LengthUnit, RawLength};

/// Font size used when no group declares one.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// A font size declared on a group.
///
/// Percentages, `em` and `ex` are relative to the font size of the enclosing scope.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FontSize(pub RawLength);

impl FontSize {
    pub fn px(size: f64) -> FontSize {
        FontSize(RawLength::new(size, LengthUnit::Px))
    }

    fn compute(&self, parent: f64) -> f64 {
        let size = match self.0.unit {
            LengthUnit::Percent => self.0.length * parent,
            _ => resolve(Some(self.0), parent, 0.0, 1.0, parent),
        };

        if size.is_finite() && size >= 0.0 {
            size
        } else {
            parent
        }
    }
}

/// The ambient coordinate and typographic scope at one point of a traversal.
///
/// A fresh context is built for every top-level render and for every nested
/// document; it is passed down explicitly, and scopes are entered through
/// closures so that every push is paired with its pop.
#[derive(Debug, Clone)]
pub struct GlyphContext {
    scale: f64,
    width: f64,
    height: f64,
    font_stack: Vec<f64>,
}

impl GlyphContext {
    pub fn new(scale: f64, width: f64, height: f64) -> GlyphContext {
        GlyphContext {
            scale,
            width,
            height,
            font_stack: vec![DEFAULT_FONT_SIZE],
        }
    }

    /// Device pixels per user unit at the root of this context.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Width and height of the current viewport, in user units.
    pub fn viewport(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn font_size(&self) -> f64 {
        self.font_stack
            .last()
            .copied()
            .unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Pushes a font scope.  Returns whether anything was pushed, so that the caller
    /// can pair it with [`GlyphContext::pop_font`].
    pub fn push_font(&mut self, font: Option<FontSize>) -> bool {
        match font {
            None => false,

            Some(font) => {
                let size = font.compute(self.font_size());
                self.font_stack.push(size);
                true
            }
        }
    }

    pub fn pop_font(&mut self) {
        if self.font_stack.len() > 1 {
            self.font_stack.pop();
        }
    }

    /// The same scope with a different viewport size, e.g. for a symbol instance.
    pub fn resized(&self, width: f64, height: f64) -> GlyphContext {
        GlyphContext {
            width,
            height,
            ..self.clone()
        }
    }

    /// Builds the root context of a nested document of the given size.
    pub fn nested(&self, width: f64, height: f64) -> GlyphContext {
        GlyphContext::new(self.scale, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fonts_are_scoped() {
        let mut ctx = GlyphContext::new(1.0, 100.0, 100.0);
        assert_eq!(ctx.font_size(), DEFAULT_FONT_SIZE);

        assert!(ctx.push_font(Some(FontSize::px(20.0))));
        assert!(ctx.push_font(Some(FontSize(RawLength::new(1.5, LengthUnit::Em)))));
        assert_eq!(ctx.font_size(), 30.0);

        assert!(!ctx.push_font(None));
        ctx.pop_font();
        ctx.pop_font();
        assert_eq!(ctx.font_size(), DEFAULT_FONT_SIZE);

        // the default size is never popped
        ctx.pop_font();
        assert_eq!(ctx.font_size(), DEFAULT_FONT_SIZE);
    }

    #[test]
    fn percentage_font_is_relative_to_parent() {
        let mut ctx = GlyphContext::new(1.0, 100.0, 100.0);
        ctx.push_font(Some(FontSize(RawLength::new(0.5, LengthUnit::Percent))));
        assert_eq!(ctx.font_size(), 6.0);
    }

    #[test]
    fn resized_context_keeps_fonts() {
        let mut ctx = GlyphContext::new(2.0, 100.0, 50.0);
        ctx.push_font(Some(FontSize::px(20.0)));
        let resized = ctx.resized(10.0, 20.0);
        assert_eq!(resized.viewport(), (10.0, 20.0));
        assert_eq!(resized.font_size(), 20.0);
        assert_eq!(ctx.viewport(), (100.0, 50.0));
        ctx.pop_font();

        let nested = ctx.nested(30.0, 40.0);
        assert_eq!(nested.scale(), 2.0);
        assert_eq!(nested.font_size(), DEFAULT_FONT_SIZE);
    }
}
