//! The drawing surface driven by the interpreter.
//!
//! Coordinates passed to path methods are in user space, the surface
//! transforms them with the matrix from the last `set_transform()` call, the
//! same way an html canvas does. A new surface is assumed to be in the
//! default [`GraphicsState`](crate::GraphicsState): identity transform, line
//! width 1, black fill and stroke.
use crate::graphics::{trans::UserToPageSpace, Point, Rgba};

pub trait Surface {
    /// Discard current path, start a new empty one.
    fn begin_path(&mut self);

    fn move_to(&mut self, p: Point);

    fn line_to(&mut self, p: Point);

    /// Circular arc sweeping from `start` to `end` angle, in radians.
    ///
    /// If current path has an open subpath, a straight line connects its
    /// current point to the arc start point.
    fn arc(&mut self, center: Point, radius: f32, start: f32, end: f32);

    fn close_path(&mut self);

    /// Fill current path with fill color, the path is kept.
    fn fill(&mut self);

    /// Stroke current path with stroke color and line width, the path is kept.
    fn stroke(&mut self);

    fn set_line_width(&mut self, width: f32);

    fn set_fill_color(&mut self, color: Rgba);

    fn set_stroke_color(&mut self, color: Rgba);

    fn set_transform(&mut self, ctm: &UserToPageSpace);
}

impl<T: Surface + ?Sized> Surface for &mut T {
    fn begin_path(&mut self) {
        (**self).begin_path();
    }

    fn move_to(&mut self, p: Point) {
        (**self).move_to(p);
    }

    fn line_to(&mut self, p: Point) {
        (**self).line_to(p);
    }

    fn arc(&mut self, center: Point, radius: f32, start: f32, end: f32) {
        (**self).arc(center, radius, start, end);
    }

    fn close_path(&mut self) {
        (**self).close_path();
    }

    fn fill(&mut self) {
        (**self).fill();
    }

    fn stroke(&mut self) {
        (**self).stroke();
    }

    fn set_line_width(&mut self, width: f32) {
        (**self).set_line_width(width);
    }

    fn set_fill_color(&mut self, color: Rgba) {
        (**self).set_fill_color(color);
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        (**self).set_stroke_color(color);
    }

    fn set_transform(&mut self, ctm: &UserToPageSpace) {
        (**self).set_transform(ctm);
    }
}

/// A [`Surface`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    Arc {
        center: Point,
        radius: f32,
        start: f32,
        end: f32,
    },
    ClosePath,
    Fill,
    Stroke,
    SetLineWidth(f32),
    SetFillColor(Rgba),
    SetStrokeColor(Rgba),
    SetTransform(UserToPageSpace),
}

impl Call {
    /// Path construction calls, paint and state calls excluded.
    pub fn is_path(&self) -> bool {
        matches!(
            self,
            Self::BeginPath | Self::MoveTo(_) | Self::LineTo(_) | Self::Arc { .. } | Self::ClosePath
        )
    }
}

/// Surface records calls without drawing anything.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Vec<Call>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<Call> {
        self.calls
    }

    /// Returns how many times `call` recorded.
    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    /// Path construction calls in recorded order.
    pub fn path(&self) -> Vec<Call> {
        self.calls.iter().filter(|c| c.is_path()).cloned().collect()
    }
}

impl Surface for Recorder {
    fn begin_path(&mut self) {
        self.calls.push(Call::BeginPath);
    }

    fn move_to(&mut self, p: Point) {
        self.calls.push(Call::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.calls.push(Call::LineTo(p));
    }

    fn arc(&mut self, center: Point, radius: f32, start: f32, end: f32) {
        self.calls.push(Call::Arc {
            center,
            radius,
            start,
            end,
        });
    }

    fn close_path(&mut self) {
        self.calls.push(Call::ClosePath);
    }

    fn fill(&mut self) {
        self.calls.push(Call::Fill);
    }

    fn stroke(&mut self) {
        self.calls.push(Call::Stroke);
    }

    fn set_line_width(&mut self, width: f32) {
        self.calls.push(Call::SetLineWidth(width));
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.calls.push(Call::SetFillColor(color));
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.calls.push(Call::SetStrokeColor(color));
    }

    fn set_transform(&mut self, ctm: &UserToPageSpace) {
        self.calls.push(Call::SetTransform(*ctm));
    }
}
