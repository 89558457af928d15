//! # Riemann Approximation Methods (RAM)
//!
//! Left, right, midpoint and trapezoidal approximations of the definite integral of
//! the fixed function f(x) = x^2 + 4x, compared with the closed-form exact area
//! F(b) - F(a), F(x) = x^3/3 + 2x^2.
//!
//! ## Main items
//! - `RamMethod` - which rule to use (LRAM, RRAM, MRAM, TRAM)
//! - `ApproximationRequest` - interval bounds, number of subdivisions and the rule
//! - `ApproximationResult` - sample geometry, exact and approximate areas, % error
//! - `compute()` / `compute_from_str()` - the engine itself
//!
//! ## Example
//! ```rust
//! use RustedRAM::numerical::RAM::{ApproximationRequest, RamMethod, compute};
//! let request = ApproximationRequest::new(0.0, 2.0, 2, RamMethod::Trapezoid);
//! let result = compute(&request).unwrap();
//! assert_eq!(result.sample_xs, vec![0.0, 1.0, 2.0]);
//! assert!((result.approx_area - 11.0).abs() < 1e-12);
//! ```
//!
//! A zero exact area makes the percent error meaningless; instead of reporting
//! NaN or infinity the engine returns `RamError::DegenerateExactArea`.
use log::{debug, info};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

/// relative threshold below which F(b) - F(a) is treated as zero
const DEGENERACY_TOL: f64 = 4.0 * f64::EPSILON;

#[derive(Error, Debug)]
pub enum RamError {
    #[error("Invalid RAM type '{0}'. Choose LRAM, RRAM, MRAM, or TRAM.")]
    InvalidMethod(String),
    #[error(
        "exact area over [{a}, {b}] is zero, percent error is undefined for this interval"
    )]
    DegenerateExactArea { a: f64, b: f64 },
    #[error("number of subdivisions must be a positive integer, got {0}")]
    InvalidSubdivisionCount(i64),
    #[error("interval bounds must be finite, got a = {a}, b = {b}")]
    NonFiniteBound { a: f64, b: f64 },
    #[error("task file error: {0}")]
    TaskFile(String),
    #[error("rendering failed: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Rule used to pick the sample points of each sub-interval
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum RamMethod {
    /// left end of every sub-interval
    #[default]
    #[strum(to_string = "LRAM", serialize = "LEFT")]
    Left,
    /// right end of every sub-interval
    #[strum(to_string = "RRAM", serialize = "RIGHT")]
    Right,
    /// middle of every sub-interval
    #[strum(to_string = "MRAM", serialize = "MIDPOINT", serialize = "MID")]
    Midpoint,
    /// chord between consecutive grid nodes
    #[strum(to_string = "TRAM", serialize = "TRAPEZOID", serialize = "TRAP")]
    Trapezoid,
}

impl RamMethod {
    /// parse a method name, turning strum's error into `InvalidMethod`
    pub fn parse(name: &str) -> Result<Self, RamError> {
        RamMethod::from_str(name.trim()).map_err(|_| RamError::InvalidMethod(name.to_string()))
    }

    /// what the geometric pieces of this rule are called on a chart
    pub fn shape_name(&self) -> &'static str {
        match self {
            RamMethod::Trapezoid => "Trapezoids",
            _ => "Rectangles",
        }
    }

    /// number of points at which f is evaluated for n subdivisions
    pub fn sample_count(&self, n: usize) -> usize {
        match self {
            RamMethod::Trapezoid => n + 1,
            _ => n,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApproximationRequest {
    pub a: f64,
    pub b: f64,
    pub n: usize,
    pub method: RamMethod,
}

impl Default for ApproximationRequest {
    fn default() -> Self {
        ApproximationRequest {
            a: 1.0,
            b: 3.0,
            n: 4,
            method: RamMethod::Left,
        }
    }
}

impl ApproximationRequest {
    pub fn new(a: f64, b: f64, n: usize, method: RamMethod) -> Self {
        ApproximationRequest { a, b, n, method }
    }

    /// checks everything that must hold before any sampling happens
    pub fn validate(&self) -> Result<(), RamError> {
        if !self.a.is_finite() || !self.b.is_finite() {
            return Err(RamError::NonFiniteBound {
                a: self.a,
                b: self.b,
            });
        }
        if self.n == 0 {
            return Err(RamError::InvalidSubdivisionCount(0));
        }
        Ok(())
    }

    pub fn dx(&self) -> f64 {
        (self.b - self.a) / self.n as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApproximationResult {
    pub method: RamMethod,
    pub n: usize,
    pub dx: f64,
    /// n + 1 evenly spaced nodes from a to b
    pub grid: Vec<f64>,
    /// points where f was evaluated, n of them (n + 1 for TRAM)
    pub sample_xs: Vec<f64>,
    pub sample_ys: Vec<f64>,
    pub exact_area: f64,
    pub approx_area: f64,
    /// unsigned, in percent
    pub percent_error: f64,
}

impl ApproximationResult {
    /// text of the chart annotation: exact area, approximate area, % error
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Exact Area: {:.4}", self.exact_area),
            format!("{} Area: {:.4}", self.method, self.approx_area),
            format!("% Error: {:.2}%", self.percent_error),
        ]
    }

    pub fn title(&self) -> String {
        format!(
            "{} Approximation with {} {}",
            self.method,
            self.n,
            self.method.shape_name()
        )
    }
}

/// the function under test
pub fn f(x: f64) -> f64 {
    x * x + 4.0 * x
}

/// F(x) = x^3/3 + 2x^2, F' = f
pub fn antiderivative(x: f64) -> f64 {
    x.powi(3) / 3.0 + 2.0 * x * x
}

/// signed definite integral of f from a to b
pub fn exact_area(a: f64, b: f64) -> f64 {
    antiderivative(b) - antiderivative(a)
}

/// n + 1 evenly spaced nodes; the last one is b itself, not a + n*dx
pub fn grid_nodes(a: f64, b: f64, n: usize) -> Vec<f64> {
    let dx = (b - a) / n as f64;
    let mut nodes: Vec<f64> = (0..n).map(|i| a + i as f64 * dx).collect();
    nodes.push(b);
    nodes
}

/// sample points of `method` on a grid; fewer than two nodes give no sub-interval
pub fn sample_points(method: RamMethod, nodes: &[f64]) -> Vec<f64> {
    if nodes.len() < 2 {
        return Vec::new();
    }
    let last = nodes.len() - 1;
    match method {
        RamMethod::Left => nodes[..last].to_vec(),
        RamMethod::Right => nodes[1..].to_vec(),
        RamMethod::Midpoint => nodes.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect(),
        RamMethod::Trapezoid => nodes.to_vec(),
    }
}

/// area from the values of f at the sample points of `method`
pub fn approximate_area(method: RamMethod, dx: f64, sample_ys: &[f64]) -> f64 {
    match method {
        RamMethod::Left | RamMethod::Right | RamMethod::Midpoint => {
            dx * sample_ys.iter().sum::<f64>()
        }
        RamMethod::Trapezoid => {
            (dx / 2.0)
                * sample_ys
                    .windows(2)
                    .map(|w| w[0] + w[1])
                    .sum::<f64>()
        }
    }
}

fn is_degenerate(a: f64, b: f64, exact: f64) -> bool {
    let scale = antiderivative(a).abs().max(antiderivative(b).abs());
    exact.abs() <= DEGENERACY_TOL * scale
}

pub fn compute(request: &ApproximationRequest) -> Result<ApproximationResult, RamError> {
    request.validate()?;
    let ApproximationRequest { a, b, n, method } = *request;
    let exact = exact_area(a, b);
    if is_degenerate(a, b, exact) {
        return Err(RamError::DegenerateExactArea { a, b });
    }
    let dx = request.dx();
    let grid = grid_nodes(a, b, n);
    let sample_xs = sample_points(method, &grid);
    let sample_ys: Vec<f64> = sample_xs.iter().map(|&x| f(x)).collect();
    let approx = approximate_area(method, dx, &sample_ys);
    let percent_error = ((exact - approx) / exact).abs() * 100.0;
    debug!(
        "{} on [{}, {}] with n = {}: dx = {}, samples = {:?}",
        method, a, b, n, dx, sample_xs
    );
    info!(
        "{}: approximate area {:.6}, exact area {:.6}, error {:.4}%",
        method, approx, exact, percent_error
    );
    Ok(ApproximationResult {
        method,
        n,
        dx,
        grid,
        sample_xs,
        sample_ys,
        exact_area: exact,
        approx_area: approx,
        percent_error,
    })
}

/// entry point for text input: the method name is checked before anything else runs
pub fn compute_from_str(
    a: f64,
    b: f64,
    n: usize,
    method: &str,
) -> Result<ApproximationResult, RamError> {
    let method = RamMethod::parse(method)?;
    compute(&ApproximationRequest::new(a, b, n, method))
}
