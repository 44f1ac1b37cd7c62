//! Half-circle needle gauge geometry.
//!
//! The needle sweeps the top semicircle with `angle = π·(1 − percent)`: 0%
//! points left, 50% up and 100% right. Points are in screen coordinates, so
//! `y` grows downward.

use std::f64::consts::PI;

pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 1.0)
}

pub fn needle_angle(percent: f64) -> f64 {
    PI * (1.0 - clamp_percent(percent))
}

pub fn needle_point(cx: f64, cy: f64, radius: f64, percent: f64) -> (f64, f64) {
    let angle = needle_angle(percent);
    (cx + radius * angle.cos(), cy - radius * angle.sin())
}

/// Drawing frame shared by the server template and the page script.
pub const CENTER_X: f64 = 100.0;
pub const CENTER_Y: f64 = 100.0;
pub const OUTER_RADIUS: f64 = 80.0;
pub const INNER_RADIUS: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BandPath {
    pub d: String,
    pub color: &'static str,
}

/// Everything a template needs to draw one gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeLayout {
    pub bands: Vec<BandPath>,
    pub needle_x: String,
    pub needle_y: String,
}

fn arc_point(radius: f64, angle: f64) -> (f64, f64) {
    (
        CENTER_X + radius * angle.cos(),
        CENTER_Y - radius * angle.sin(),
    )
}

/// Splits the half circle into one equal band per colour, left to right.
pub fn layout(percent: f64, colors: &[&'static str]) -> GaugeLayout {
    let step = PI / colors.len().max(1) as f64;
    let bands = colors
        .iter()
        .enumerate()
        .map(|(index, &color)| {
            let start = PI - step * index as f64;
            let end = start - step;
            let (ox1, oy1) = arc_point(OUTER_RADIUS, start);
            let (ox2, oy2) = arc_point(OUTER_RADIUS, end);
            let (ix2, iy2) = arc_point(INNER_RADIUS, end);
            let (ix1, iy1) = arc_point(INNER_RADIUS, start);
            BandPath {
                d: format!(
                    "M {ox1:.2} {oy1:.2} A {OUTER_RADIUS} {OUTER_RADIUS} 0 0 1 {ox2:.2} {oy2:.2} \
                     L {ix2:.2} {iy2:.2} A {INNER_RADIUS} {INNER_RADIUS} 0 0 0 {ix1:.2} {iy1:.2} Z"
                ),
                color,
            }
        })
        .collect();

    let (x, y) = needle_point(CENTER_X, CENTER_Y, OUTER_RADIUS, percent);
    GaugeLayout {
        bands,
        needle_x: format!("{x:.2}"),
        needle_y: format!("{y:.2}"),
    }
}
