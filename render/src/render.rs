use crate::IntoSkia;
use educe::Educe;
use log::debug;
use psview::{
    page_to_device, PageToDeviceSpace, Point, Rgba, Surface, UserToDeviceSpace, UserToPageSpace,
};
use std::f32::consts::{FRAC_PI_2, TAU};
use tiny_skia::{
    Color as SkiaColor, FillRule, Paint, Path as SkiaPath, PathBuilder, Pixmap, Stroke, Transform,
};

/// Current path in device space.
///
/// Points are transformed by the transform current when they are added,
/// painting a path does not clear it.
#[derive(Debug, Clone, Educe)]
#[educe(Default)]
struct Path {
    #[educe(Default(expression = PathBuilder::new()))]
    builder: PathBuilder,
    /// Built from `builder`, invalid after `builder` changed.
    built: Option<SkiaPath>,
}

impl Path {
    fn path_builder(&mut self) -> &mut PathBuilder {
        self.built = None;
        &mut self.builder
    }

    /// A closed subpath still has a current point, its last point.
    fn has_current_point(&self) -> bool {
        self.builder.last_point().is_some()
    }

    pub fn move_to(&mut self, p: tiny_skia::Point) {
        self.path_builder().move_to(p.x, p.y);
    }

    pub fn line_to(&mut self, p: tiny_skia::Point) {
        self.path_builder().line_to(p.x, p.y);
    }

    pub fn curve_to(&mut self, p1: tiny_skia::Point, p2: tiny_skia::Point, p3: tiny_skia::Point) {
        self.path_builder()
            .cubic_to(p1.x, p1.y, p2.x, p2.y, p3.x, p3.y);
    }

    pub fn close_path(&mut self) {
        self.path_builder().close();
    }

    /// Return None if path is empty or invalid.
    pub fn finish(&mut self) -> Option<&SkiaPath> {
        if self.built.is_none() {
            self.built = self.builder.clone().finish();
            if self.built.is_none() {
                debug!("empty or invalid path");
            }
        }
        self.built.as_ref()
    }

    pub fn clear(&mut self) {
        self.builder.clear();
        self.built = None;
    }
}

/// Drawing attributes the surface was told about.
#[derive(Debug, Clone)]
struct State {
    ctm: UserToPageSpace,
    user_to_device: UserToDeviceSpace,
    stroke: Stroke,
    fill_color: SkiaColor,
    stroke_color: SkiaColor,
}

impl State {
    fn new() -> Self {
        Self {
            ctm: UserToPageSpace::identity(),
            user_to_device: UserToDeviceSpace::identity(),
            stroke: Stroke::default(),
            fill_color: SkiaColor::BLACK,
            stroke_color: SkiaColor::BLACK,
        }
    }

    fn update_user_to_device(&mut self, page_to_device: &PageToDeviceSpace) {
        self.user_to_device = self.ctm.then(page_to_device);
        debug!("ctm to {:?}", self.ctm);
        debug!("user_to_device to {:?}", self.user_to_device);
    }
}

fn paint(color: SkiaColor) -> Paint<'static> {
    let mut r = Paint::default();
    r.set_color(color);
    r.anti_alias = true;
    r
}

/// [`Surface`] rasterizes to a tiny-skia pixmap.
#[derive(Educe)]
#[educe(Debug)]
pub struct SkiaSurface<'c> {
    #[educe(Debug(ignore))]
    canvas: &'c mut Pixmap,
    page_to_device: PageToDeviceSpace,
    state: State,
    path: Path,
}

impl<'c> SkiaSurface<'c> {
    /// `page_height` is the canvas height in page space, before zoom.
    pub fn new(canvas: &'c mut Pixmap, page_height: f32, zoom: f32) -> Self {
        let page_to_device = page_to_device(page_height, zoom);
        let mut state = State::new();
        state.update_user_to_device(&page_to_device);
        Self {
            canvas,
            page_to_device,
            state,
            path: Path::default(),
        }
    }

    fn to_device(&self, p: Point) -> tiny_skia::Point {
        let p = self.state.user_to_device.transform_point(p.into());
        tiny_skia::Point::from_xy(p.x, p.y)
    }

    /// Append a arc of `sweep` radians, `sweep` no more than 90 degrees.
    fn arc_segment(&mut self, center: Point, radius: f32, start: f32, sweep: f32) {
        let k = control_distance(sweep);
        let end = start + sweep;
        let (sin0, cos0) = start.sin_cos();
        let (sin1, cos1) = end.sin_cos();
        let p1 = center.offset(radius * (cos0 - k * sin0), radius * (sin0 + k * cos0));
        let p2 = center.offset(radius * (cos1 + k * sin1), radius * (sin1 - k * cos1));
        let p3 = center.offset(radius * cos1, radius * sin1);
        let (p1, p2, p3) = (self.to_device(p1), self.to_device(p2), self.to_device(p3));
        self.path.curve_to(p1, p2, p3);
    }
}

/// Distance of control points to end points of a cubic Bézier approximates
/// an unit arc of `sweep` radians.
fn control_distance(sweep: f32) -> f32 {
    4.0 / 3.0 * (sweep / 4.0).tan()
}

/// Sweep angle of an arc goes from `start` to `end` with increasing angle.
fn arc_sweep(start: f32, end: f32) -> f32 {
    if end - start >= TAU {
        TAU
    } else {
        (end - start).rem_euclid(TAU)
    }
}

impl<'c> Surface for SkiaSurface<'c> {
    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, p: Point) {
        let p = self.to_device(p);
        self.path.move_to(p);
    }

    fn line_to(&mut self, p: Point) {
        let p = self.to_device(p);
        if self.path.has_current_point() {
            self.path.line_to(p);
        } else {
            self.path.move_to(p);
        }
    }

    fn arc(&mut self, center: Point, radius: f32, start: f32, end: f32) {
        let from = self.to_device(center.offset(radius * start.cos(), radius * start.sin()));
        if self.path.has_current_point() {
            self.path.line_to(from);
        } else {
            self.path.move_to(from);
        }

        let sweep = arc_sweep(start, end);
        #[allow(clippy::cast_possible_truncation)]
        let segments = ((sweep / FRAC_PI_2).ceil() as usize).max(1);
        let step = sweep / segments as f32;
        debug!("arc sweep {sweep} in {segments} segments");
        for i in 0..segments {
            self.arc_segment(center, radius, start + step * i as f32, step);
        }
    }

    fn close_path(&mut self) {
        self.path.close_path();
    }

    fn fill(&mut self) {
        let Some(p) = self.path.finish() else {
            debug!("fill: empty or invalid path");
            return;
        };
        self.canvas.fill_path(
            p,
            &paint(self.state.fill_color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn stroke(&mut self) {
        let user_to_device = self.state.user_to_device.into_skia();
        let Some(device_to_user) = user_to_device.invert() else {
            debug!("stroke: transform not invertible");
            return;
        };
        let Some(p) = self.path.finish() else {
            debug!("stroke: empty or invalid path");
            return;
        };
        // stroke in user space, so line width follows current transform
        let Some(p) = p.clone().transform(device_to_user) else {
            debug!("stroke: path not transformable");
            return;
        };
        self.canvas.stroke_path(
            &p,
            &paint(self.state.stroke_color),
            &self.state.stroke,
            user_to_device,
            None,
        );
    }

    fn set_line_width(&mut self, width: f32) {
        self.state.stroke.width = width;
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.state.fill_color = color.into_skia();
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.state.stroke_color = color.into_skia();
    }

    fn set_transform(&mut self, ctm: &UserToPageSpace) {
        self.state.ctm = *ctm;
        self.state.update_user_to_device(&self.page_to_device);
    }
}
