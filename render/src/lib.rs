use anyhow::{anyhow, Result as AnyResult};
use educe::Educe;
use image::RgbaImage;
use log::info;
use psview::{Diagnostic, Machine, Report, Rgba, SessionOption};
use tiny_skia::Pixmap;

mod into_skia;
mod render;
use into_skia::IntoSkia;
pub use render::SkiaSurface;

/// Option for Render
#[derive(Debug, Educe, Clone, Copy)]
#[educe(Default)]
pub struct RenderOption {
    /// Page width in page space.
    #[educe(Default = 612)]
    width: u32,
    #[educe(Default = 792)]
    height: u32,
    #[educe(Default = 1.0)]
    zoom: f32,
    #[educe(Default(expression = Rgba::WHITE))]
    background_color: Rgba,
    session: SessionOption,
}

impl RenderOption {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn canvas_width(&self) -> u32 {
        (self.width as f32 * self.zoom) as u32
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn canvas_height(&self) -> u32 {
        (self.height as f32 * self.zoom) as u32
    }

    pub fn create_canvas(&self) -> AnyResult<Pixmap> {
        let (w, h) = (self.canvas_width(), self.canvas_height());
        if u64::from(w) * u64::from(h) > 1024 * 1024 * 100 {
            return Err(anyhow!("canvas size too large: {}x{}", w, h));
        }

        let mut r = Pixmap::new(w, h).ok_or_else(|| anyhow!("invalid canvas size: {}x{}", w, h))?;
        if self.background_color.a > 0 {
            r.fill(self.background_color.into_skia());
        }
        Ok(r)
    }

    pub fn to_image(&self, canvas: Pixmap) -> AnyResult<RgbaImage> {
        RgbaImage::from_raw(canvas.width(), canvas.height(), canvas.take())
            .ok_or_else(|| anyhow!("canvas buffer size mismatch"))
    }

    pub fn session(&self) -> SessionOption {
        self.session
    }
}

#[derive(Educe)]
#[educe(Default(new))]
pub struct RenderOptionBuilder(RenderOption);

impl RenderOptionBuilder {
    pub fn zoom(mut self, zoom: f32) -> Self {
        self.0.zoom = zoom;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.0.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.0.height = height;
        self
    }

    pub fn background_color(mut self, color: Rgba) -> Self {
        self.0.background_color = color;
        self
    }

    pub fn session(mut self, session: SessionOption) -> Self {
        self.0.session = session;
        self
    }

    pub fn build(self) -> RenderOption {
        self.0
    }
}

/// Rendered image, and diagnostics of the run.
#[derive(Debug)]
pub struct Rendered {
    pub image: RgbaImage,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn render_script(script: &str, option: RenderOptionBuilder) -> AnyResult<Rendered> {
    render_steps(script, option, None)
}

/// Render only first `steps` top level tokens if `steps` not None, overrides
/// steps in session option.
pub fn render_steps(
    script: &str,
    option: RenderOptionBuilder,
    steps: Option<usize>,
) -> AnyResult<Rendered> {
    let option = option.build();
    let session = match steps {
        Some(_) => option.session.with_steps(steps),
        None => option.session,
    };

    let mut canvas = option.create_canvas()?;
    let surface = SkiaSurface::new(&mut canvas, option.height as f32, option.zoom);
    let mut machine = Machine::with_option(script, surface, session);
    machine.execute();
    let Report {
        stack, diagnostics, ..
    } = machine.finish();
    if !stack.is_empty() {
        info!("operands left on stack: {}", stack);
    }
    let image = option.to_image(canvas)?;
    Ok(Rendered { image, diagnostics })
}
