//! Rasterize small scripts and probe pixels of the result.
use image::{Rgba as Pixel, RgbaImage};
use psview::{MachineError, Rgba, SessionOptionBuilder};
use psview_render::{render_script, render_steps, RenderOptionBuilder, Rendered};
use test_log::test;

const WHITE: Pixel<u8> = Pixel([255, 255, 255, 255]);
const BLACK: Pixel<u8> = Pixel([0, 0, 0, 255]);
const RED: Pixel<u8> = Pixel([255, 0, 0, 255]);

fn option() -> RenderOptionBuilder {
    RenderOptionBuilder::new().width(100).height(100)
}

fn render(script: &str) -> Rendered {
    render_script(script, option()).unwrap()
}

/// Pixel at page space (x, y), y axis goes up.
fn page_pixel(img: &RgbaImage, x: u32, y: u32) -> Pixel<u8> {
    *img.get_pixel(x, img.height() - 1 - y)
}

const SQUARE: &str = "newpath 20 20 moveto 60 20 lineto 60 60 lineto 20 60 lineto closepath";

#[test]
fn empty_script_is_background() {
    let r = render("");
    assert_eq!((r.image.width(), r.image.height()), (100, 100));
    assert!(r.image.pixels().all(|p| *p == WHITE));
    assert!(r.diagnostics.is_empty());
}

#[test]
fn fill_square() {
    let r = render(&format!("{SQUARE} fill"));
    assert_eq!(page_pixel(&r.image, 40, 40), BLACK);
    assert_eq!(page_pixel(&r.image, 10, 10), WHITE);
    assert_eq!(page_pixel(&r.image, 70, 70), WHITE);
}

#[test]
fn origin_is_bottom_left() {
    let r = render("0 0 moveto 30 0 lineto 30 30 lineto 0 30 lineto closepath fill");
    assert_eq!(*r.image.get_pixel(5, 95), BLACK);
    assert_eq!(*r.image.get_pixel(5, 5), WHITE);
}

#[test]
fn fill_with_rgb_color() {
    let r = render(&format!("1 0 0 setrgbcolor {SQUARE} fill"));
    assert_eq!(page_pixel(&r.image, 40, 40), RED);
}

#[test]
fn stroke_line() {
    let r = render("10 50 moveto 90 50 lineto 10 setlinewidth stroke");
    assert_eq!(page_pixel(&r.image, 50, 50), BLACK);
    assert_eq!(page_pixel(&r.image, 50, 52), BLACK);
    assert_eq!(page_pixel(&r.image, 50, 70), WHITE);
}

#[test]
fn stroke_width_follows_scale() {
    let r = render("2 2 scale 5 25 moveto 45 25 lineto 5 setlinewidth stroke");
    // line at page y 50, width 10 in page space
    assert_eq!(page_pixel(&r.image, 50, 47), BLACK);
    assert_eq!(page_pixel(&r.image, 50, 53), BLACK);
    assert_eq!(page_pixel(&r.image, 50, 60), WHITE);
}

#[test]
fn translate_moves_drawing() {
    let r = render("30 30 translate 0 0 moveto 20 0 lineto 20 20 lineto 0 20 lineto closepath fill");
    assert_eq!(page_pixel(&r.image, 40, 40), BLACK);
    assert_eq!(page_pixel(&r.image, 10, 10), WHITE);
}

#[test]
fn gsave_grestore_color() {
    let r = render(&format!(
        "gsave 1 0 0 setrgbcolor grestore {SQUARE} fill"
    ));
    assert_eq!(page_pixel(&r.image, 40, 40), BLACK);
}

#[test]
fn fill_circle() {
    let r = render("newpath 50 50 20 0 360 arc fill");
    assert_eq!(page_pixel(&r.image, 50, 50), BLACK);
    assert_eq!(page_pixel(&r.image, 50, 65), BLACK);
    assert_eq!(page_pixel(&r.image, 50, 75), WHITE);
    assert_eq!(page_pixel(&r.image, 34, 34), WHITE);
}

#[test]
fn definition_reused() {
    let r = render(
        "/box { 0 0 moveto 10 0 lineto 10 10 lineto 0 10 lineto closepath fill }
         gsave 10 10 translate box grestore
         gsave 70 70 translate box grestore",
    );
    assert_eq!(page_pixel(&r.image, 15, 15), BLACK);
    assert_eq!(page_pixel(&r.image, 75, 75), BLACK);
    assert_eq!(page_pixel(&r.image, 45, 45), WHITE);
}

#[test]
fn zoom() {
    let r = render_script(
        "0 0 moveto 10 0 lineto 10 10 lineto 0 10 lineto closepath fill",
        option().zoom(2.0),
    )
    .unwrap();
    assert_eq!((r.image.width(), r.image.height()), (200, 200));
    assert_eq!(page_pixel(&r.image, 15, 15), BLACK);
    assert_eq!(page_pixel(&r.image, 25, 25), WHITE);
}

#[test]
fn errors_do_not_abort() {
    let r = render(&format!("moveto bogus {SQUARE} fill"));
    assert_eq!(page_pixel(&r.image, 40, 40), BLACK);
    assert_eq!(r.diagnostics.len(), 2);
    assert_eq!(
        r.diagnostics[1].error,
        MachineError::UnknownOperator("bogus".to_owned())
    );
}

#[test]
fn steps() {
    let script = format!("{SQUARE} fill");
    // stop before `fill`
    let r = render_steps(&script, option(), Some(14)).unwrap();
    assert!(r.image.pixels().all(|p| *p == WHITE));
    let r = render_steps(&script, option(), Some(15)).unwrap();
    assert_eq!(page_pixel(&r.image, 40, 40), BLACK);
}

#[test]
fn session_option() {
    let session = SessionOptionBuilder::new().max_tokens(4).build();
    let r = render_script(
        &format!("{SQUARE} fill"),
        option().session(session).background_color(Rgba::BLACK),
    )
    .unwrap();
    assert_eq!(page_pixel(&r.image, 90, 90), BLACK);
    assert_eq!(
        r.diagnostics[0].error,
        MachineError::TooManyTokens { limit: 4 }
    );
}
