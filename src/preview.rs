// CPU preview of the current view. The production renderer runs on the GPU;
// this exists so the stores can be inspected from a terminal or saved to disk.

use std::fmt::Write as _;
use std::path::Path;

use image::{ImageResult, Rgb as Pixel, RgbImage};

use crate::color::Rgb;
use crate::math::C;
use crate::tween::Interpolate;
use crate::view::ViewSnapshot;

const ESCAPE_RADIUS: f64 = 2.0;

/// Number of iterations before `|z| > 2`, or `max_iter` if it never escapes.
pub fn mandelbrot_escapes(c: C, max_iter: u32) -> u32 {
    let mut z = C::new(0.0, 0.0);
    for i in 0..max_iter {
        if z.magnitude() > ESCAPE_RADIUS { return i; }
        z = z.square().add(c);
    }
    max_iter
}

/// Maps a pixel to the complex plane. The shorter image side spans
/// `[-2/scale, 2/scale]` around the center.
pub fn pixel_to_c(view: &ViewSnapshot, x: u32, y: u32, width: u32, height: u32) -> C {
    let half = ESCAPE_RADIUS / view.scale;
    let unit = 2.0 * half / width.min(height).max(1) as f64;
    let re = view.center.x + (x as f64 + 0.5 - width as f64 / 2.0) * unit;
    let im = view.center.y - (y as f64 + 0.5 - height as f64 / 2.0) * unit;
    C::new(re, im)
}

/// Bounded points take the bound color; escaped points blend from the
/// transition color (slow escape) to the escape color (fast escape).
pub fn shade(view: &ViewSnapshot, escape: u32) -> Rgb {
    let max_iter = view.max_iter();
    if escape >= max_iter {
        return view.bound_color;
    }
    let t = escape as f64 / max_iter as f64;
    view.escape_color.lerp(&view.transition_color, t)
}

pub fn render(view: &ViewSnapshot, width: u32, height: u32) -> RgbImage {
    let max_iter = view.max_iter();
    RgbImage::from_fn(width, height, |x, y| {
        let c = pixel_to_c(view, x, y, width, height);
        Pixel(shade(view, mandelbrot_escapes(c, max_iter)).to_bytes())
    })
}

pub fn save_png<P: AsRef<Path>>(view: &ViewSnapshot, width: u32, height: u32, path: P) -> ImageResult<()> {
    render(view, width, height).save(path)
}

/// Truecolor terminal preview, two pixel rows per character cell.
pub fn to_ansi(view: &ViewSnapshot, cols: u32, rows: u32) -> String {
    let img = render(view, cols, rows * 2);
    let mut out = String::with_capacity((cols * rows * 40) as usize);
    for row in 0..rows {
        for x in 0..cols {
            let top = img.get_pixel(x, row * 2);
            let bottom = img.get_pixel(x, row * 2 + 1);
            let _ = write!(
                out,
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m\u{2580}",
                top[0], top[1], top[2], bottom[0], bottom[1], bottom[2]
            );
        }
        out.push_str("\x1b[0m\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::hex_to_vec3;
    use crate::math::Point2D;

    fn view() -> ViewSnapshot {
        ViewSnapshot {
            iterations: 50.0,
            center: Point2D::ORIGIN,
            scale: 1.0,
            bound_color: hex_to_vec3("#4D80CC"),
            transition_color: hex_to_vec3("#BE00CC"),
            escape_color: hex_to_vec3("#4D4D4D"),
        }
    }

    #[test]
    fn origin_never_escapes() {
        assert_eq!(mandelbrot_escapes(C::new(0.0, 0.0), 100), 100);
        assert_eq!(mandelbrot_escapes(C::new(-1.0, 0.0), 100), 100);
    }

    #[test]
    fn far_points_escape_quickly() {
        assert!(mandelbrot_escapes(C::new(2.0, 2.0), 100) <= 2);
    }

    #[test]
    fn center_pixel_maps_to_center() {
        let mut v = view();
        v.center = Point2D::new(-0.5, 0.25);
        let c = pixel_to_c(&v, 50, 50, 101, 101);
        assert!((c.re + 0.5).abs() < 1e-12);
        assert!((c.im - 0.25).abs() < 1e-12);
    }

    #[test]
    fn zooming_shrinks_extent() {
        let mut v = view();
        let wide = pixel_to_c(&v, 0, 0, 100, 100);
        v.scale = 4.0;
        let narrow = pixel_to_c(&v, 0, 0, 100, 100);
        assert!(narrow.magnitude() < wide.magnitude());
    }

    #[test]
    fn bounded_pixels_use_bound_color() {
        let v = view();
        assert_eq!(shade(&v, v.max_iter()), v.bound_color);
        assert_eq!(shade(&v, 0), v.escape_color);

        let img = render(&v, 9, 9);
        assert_eq!(img.get_pixel(4, 4).0, v.bound_color.to_bytes());
    }

    #[test]
    fn ansi_preview_has_one_line_per_row() {
        let out = to_ansi(&view(), 8, 3);
        assert_eq!(out.lines().count(), 3);
    }
}
