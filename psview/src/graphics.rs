//! Graphics state: line width, colors, transform and current point, and the
//! stack used by `gsave` / `grestore`.
use educe::Educe;
use log::info;

pub mod trans;
use trans::UserToPageSpace;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl<U> From<Point> for euclid::Point2D<f32, U> {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl<U> From<euclid::Point2D<f32, U>> for Point {
    fn from(p: euclid::Point2D<f32, U>) -> Self {
        Self::new(p.x, p.y)
    }
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the point moved by (dx, dy).
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Color with 8-bit channels, the range of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[allow(clippy::cast_possible_truncation)]
fn to_channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Rgba {
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from components in `[0, 1]`, out of range values are
    /// clamped.
    pub fn from_unit(r: f32, g: f32, b: f32) -> Self {
        Self::new(to_channel(r), to_channel(g), to_channel(b), 255)
    }

    pub fn gray(g: f32) -> Self {
        Self::from_unit(g, g, g)
    }
}

#[derive(Debug, Clone, PartialEq, Educe)]
#[educe(Default)]
pub struct GraphicsState {
    #[educe(Default = 1.0)]
    pub line_width: f32,
    #[educe(Default(expression = Rgba::BLACK))]
    pub fill_color: Rgba,
    #[educe(Default(expression = Rgba::BLACK))]
    pub stroke_color: Rgba,
    #[educe(Default(expression = UserToPageSpace::identity()))]
    pub transform: UserToPageSpace,
    pub current_point: Point,
}

impl GraphicsState {
    /// Set both fill and stroke color, as `setgray` and `setrgbcolor` do.
    pub fn set_color(&mut self, color: Rgba) {
        self.fill_color = color;
        self.stroke_color = color;
    }

    /// Compose a translation into current transform, the tracked current
    /// point is moved by the same amount.
    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.transform = self.transform.pre_translate((tx, ty).into());
        self.current_point = self.current_point.offset(tx, ty);
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transform = self.transform.pre_scale(sx, sy);
    }
}

/// Saved graphics states, `gsave` pushes, `grestore` pops.
#[derive(Debug, Clone, Default)]
pub struct GraphicsStateStack {
    stack: Vec<GraphicsState>,
}

impl GraphicsStateStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, state: &GraphicsState) {
        self.stack.push(state.clone());
    }

    /// Pop the last saved state, returns None if nothing saved.
    pub fn restore(&mut self) -> Option<GraphicsState> {
        let r = self.stack.pop();
        if r.is_none() {
            info!("restore on empty graphics state stack");
        }
        r
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
