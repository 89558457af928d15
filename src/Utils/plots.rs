//! Charts of a Riemann approximation: the true curve of f, the rectangles or
//! trapezoids of the rule, the sample points and an annotation box with the areas.
//!
//! `ChartGeometry` holds everything to draw in data coordinates and is built without
//! touching any backend; `PlottersRenderer` draws it with plotters, as SVG when the
//! target file ends in ".svg" and as a bitmap otherwise.
use crate::numerical::RAM::{ApproximationRequest, ApproximationResult, RamError, RamMethod, f};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const CURVE_POINTS: usize = 500;
/// fraction of the interval width added on both sides of [a, b]
const MARGIN: f64 = 0.05;
const WHEAT: RGBColor = RGBColor(245, 222, 179);

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// sub-interval [x0, x1] at the height of f at the sample point
    Rectangle { x0: f64, x1: f64, height: f64 },
    /// quadrilateral under the chord from (x0, y0) to (x1, y1)
    Trapezoid { x0: f64, x1: f64, y0: f64, y1: f64 },
}

impl Shape {
    fn corners(&self) -> Vec<(f64, f64)> {
        match *self {
            Shape::Rectangle { x0, x1, height } => {
                vec![(x0, 0.0), (x0, height), (x1, height), (x1, 0.0)]
            }
            Shape::Trapezoid { x0, x1, y0, y1 } => vec![(x0, 0.0), (x0, y0), (x1, y1), (x1, 0.0)],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub title: String,
    pub curve: Vec<(f64, f64)>,
    pub shapes: Vec<Shape>,
    pub markers: Vec<(f64, f64)>,
    pub summary: Vec<String>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl ChartGeometry {
    pub fn new(request: &ApproximationRequest, result: &ApproximationResult) -> Self {
        let lo = request.a.min(request.b);
        let hi = request.a.max(request.b);
        let pad = if hi > lo { (hi - lo) * MARGIN } else { 0.5 };
        let (x_min, x_max) = (lo - pad, hi + pad);

        let step = (x_max - x_min) / (CURVE_POINTS - 1) as f64;
        let curve: Vec<(f64, f64)> = (0..CURVE_POINTS)
            .map(|i| {
                let x = x_min + i as f64 * step;
                (x, f(x))
            })
            .collect();

        let grid = &result.grid;
        let shapes: Vec<Shape> = match result.method {
            RamMethod::Trapezoid => grid
                .windows(2)
                .zip(result.sample_ys.windows(2))
                .map(|(x, y)| Shape::Trapezoid {
                    x0: x[0],
                    x1: x[1],
                    y0: y[0],
                    y1: y[1],
                })
                .collect(),
            _ => grid
                .windows(2)
                .zip(result.sample_ys.iter())
                .map(|(x, &height)| Shape::Rectangle {
                    x0: x[0],
                    x1: x[1],
                    height,
                })
                .collect(),
        };
        let markers: Vec<(f64, f64)> = result
            .sample_xs
            .iter()
            .copied()
            .zip(result.sample_ys.iter().copied())
            .collect();

        let ys = curve.iter().map(|p| p.1).chain(markers.iter().map(|p| p.1));
        let (y_lo, y_hi) = ys.fold((0.0_f64, 0.0_f64), |(lo, hi), y| (lo.min(y), hi.max(y)));
        let y_pad = if y_hi > y_lo { (y_hi - y_lo) * 0.1 } else { 1.0 };

        ChartGeometry {
            title: result.title(),
            curve,
            shapes,
            markers,
            summary: result.summary_lines(),
            x_range: (x_min, x_max),
            y_range: (y_lo - y_pad, y_hi + y_pad),
        }
    }
}

/// Seam between the engine output and whatever draws it
pub trait RamRenderer {
    fn render(
        &self,
        request: &ApproximationRequest,
        result: &ApproximationResult,
    ) -> Result<(), RamError>;
}

pub struct PlottersRenderer {
    pub path: PathBuf,
    pub size: (u32, u32),
}

impl PlottersRenderer {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        PlottersRenderer {
            path: path.as_ref().to_path_buf(),
            size: (800, 500),
        }
    }

    fn is_svg(&self) -> bool {
        self.path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("svg"))
            .unwrap_or(false)
    }
}

impl RamRenderer for PlottersRenderer {
    fn render(
        &self,
        request: &ApproximationRequest,
        result: &ApproximationResult,
    ) -> Result<(), RamError> {
        let geometry = ChartGeometry::new(request, result);
        let drawn = if self.is_svg() {
            let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
            draw_chart(&root, &geometry, result.method)
        } else {
            let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
            draw_chart(&root, &geometry, result.method)
        };
        drawn.map_err(|e| RamError::Render(e.to_string()))?;
        info!("chart saved to {}", self.path.display());
        Ok(())
    }
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    geometry: &ChartGeometry,
    method: RamMethod,
) -> Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (x_min, x_max) = geometry.x_range;
    let (y_min, y_max) = geometry.y_range;
    let mut chart = ChartBuilder::on(root)
        .caption(&geometry.title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart.configure_mesh().x_desc("x").y_desc("f(x)").draw()?;

    let label = format!("{} {}", method, method.shape_name());
    match method {
        RamMethod::Trapezoid => {
            let fill = YELLOW.mix(0.5).filled();
            chart
                .draw_series(
                    geometry
                        .shapes
                        .iter()
                        .map(|shape| Polygon::new(shape.corners(), fill)),
                )?
                .label(label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill));
            chart.draw_series(geometry.shapes.iter().map(|shape| {
                let corners = shape.corners();
                PathElement::new(vec![corners[1], corners[2]], BLUE.stroke_width(2))
            }))?;
        }
        _ => {
            let fill = MAGENTA.mix(0.6).filled();
            chart
                .draw_series(
                    geometry
                        .shapes
                        .iter()
                        .map(|shape| Polygon::new(shape.corners(), fill)),
                )?
                .label(label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill));
            chart.draw_series(geometry.shapes.iter().map(|shape| {
                let mut outline = shape.corners();
                outline.push(outline[0]);
                PathElement::new(outline, &BLACK)
            }))?;
        }
    }

    chart
        .draw_series(LineSeries::new(geometry.curve.iter().copied(), RED.stroke_width(2)))?
        .label("f(x) = x^2 + 4x")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart.draw_series(
        geometry
            .markers
            .iter()
            .map(|&point| Circle::new(point, 4, BLACK.filled())),
    )?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    // annotation box in pixel coordinates, top right corner
    let (width, _) = root.dim_in_pixel();
    let (box_w, line_h) = (210, 20);
    let x0 = width as i32 - box_w - 20;
    let y0 = 50;
    let box_h = line_h * geometry.summary.len() as i32 + 10;
    root.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        WHEAT.mix(0.8).filled(),
    ))?;
    root.draw(&Rectangle::new([(x0, y0), (x0 + box_w, y0 + box_h)], BLACK))?;
    for (i, line) in geometry.summary.iter().enumerate() {
        root.draw(&Text::new(
            line.clone(),
            (x0 + 8, y0 + 6 + line_h * i as i32),
            ("sans-serif", 16),
        ))?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::RAM::compute;
    use approx::assert_relative_eq;
    use std::fs;
    use tempfile::tempdir;

    fn geometry_for(a: f64, b: f64, n: usize, method: RamMethod) -> ChartGeometry {
        let request = ApproximationRequest::new(a, b, n, method);
        let result = compute(&request).unwrap();
        ChartGeometry::new(&request, &result)
    }

    #[test]
    fn test_curve_covers_interval_with_margin() {
        let geometry = geometry_for(1.0, 3.0, 4, RamMethod::Left);
        assert_eq!(geometry.curve.len(), CURVE_POINTS);
        assert_relative_eq!(geometry.curve[0].0, 0.9, epsilon = 1e-12);
        assert_relative_eq!(geometry.curve[CURVE_POINTS - 1].0, 3.1, epsilon = 1e-9);
        assert_eq!(geometry.x_range.0, geometry.curve[0].0);
        assert_relative_eq!(geometry.x_range.1, 3.1, epsilon = 1e-12);
    }

    #[test]
    fn test_left_rectangles_span_sub_intervals() {
        let geometry = geometry_for(1.0, 3.0, 4, RamMethod::Left);
        assert_eq!(geometry.shapes.len(), 4);
        assert_eq!(geometry.markers.len(), 4);
        assert_eq!(
            geometry.shapes[0],
            Shape::Rectangle {
                x0: 1.0,
                x1: 1.5,
                height: 5.0
            }
        );
        assert_eq!(geometry.markers[3], (2.5, f(2.5)));
    }

    #[test]
    fn test_right_and_midpoint_heights() {
        let right = geometry_for(0.0, 2.0, 2, RamMethod::Right);
        assert_eq!(
            right.shapes[1],
            Shape::Rectangle {
                x0: 1.0,
                x1: 2.0,
                height: 12.0
            }
        );
        let mid = geometry_for(0.0, 2.0, 2, RamMethod::Midpoint);
        assert_eq!(
            mid.shapes[0],
            Shape::Rectangle {
                x0: 0.0,
                x1: 1.0,
                height: f(0.5)
            }
        );
    }

    #[test]
    fn test_trapezoids_follow_chord() {
        let geometry = geometry_for(0.0, 2.0, 2, RamMethod::Trapezoid);
        assert_eq!(geometry.shapes.len(), 2);
        assert_eq!(geometry.markers.len(), 3);
        assert_eq!(
            geometry.shapes[1],
            Shape::Trapezoid {
                x0: 1.0,
                x1: 2.0,
                y0: 5.0,
                y1: 12.0
            }
        );
        assert_eq!(
            geometry.shapes[1].corners(),
            vec![(1.0, 0.0), (1.0, 5.0), (2.0, 12.0), (2.0, 0.0)]
        );
        assert_eq!(geometry.title, "TRAM Approximation with 2 Trapezoids");
        assert_eq!(geometry.summary.len(), 3);
    }

    #[test]
    fn test_y_range_includes_zero_and_negative_values() {
        // f is negative on (-4, 0)
        let geometry = geometry_for(-3.0, -1.0, 4, RamMethod::Midpoint);
        assert!(geometry.y_range.0 < -3.0);
        assert!(geometry.y_range.1 > 0.0);
    }

    #[test]
    fn test_reversed_interval() {
        let geometry = geometry_for(3.0, 1.0, 2, RamMethod::Left);
        assert!(geometry.x_range.0 < 1.0);
        assert!(geometry.x_range.1 > 3.0);
        assert_eq!(
            geometry.shapes[0],
            Shape::Rectangle {
                x0: 3.0,
                x1: 2.0,
                height: 21.0
            }
        );
    }

    #[test]
    fn test_render_svg_and_png() {
        let dir = tempdir().unwrap();
        let cases = [
            (RamMethod::Left, "left.svg"),
            (RamMethod::Midpoint, "mid.svg"),
            (RamMethod::Trapezoid, "trap.png"),
        ];
        for (method, name) in cases {
            let request = ApproximationRequest::new(1.0, 3.0, 4, method);
            let result = compute(&request).unwrap();
            let path = dir.path().join(name);
            PlottersRenderer::new(&path).render(&request, &result).unwrap();
            assert!(fs::metadata(&path).unwrap().len() > 0, "{} is empty", name);
        }
        let svg = fs::read_to_string(dir.path().join("left.svg")).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("LRAM Approximation with 4 Rectangles"));
    }

    #[test]
    fn test_render_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let request = ApproximationRequest::new(0.0, 2.0, 2, RamMethod::Trapezoid);
        let result = compute(&request).unwrap();
        let path = dir.path().join("no_such_dir").join("chart.png");
        assert!(matches!(
            PlottersRenderer::new(&path).render(&request, &result),
            Err(RamError::Render(_))
        ));
    }
}
