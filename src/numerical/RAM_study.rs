//! Convergence study and side-by-side comparison of the four rules.
//! Both only loop over `RAM::compute`; the tables are rendered with tabled.
use crate::numerical::RAM::{
    ApproximationRequest, ApproximationResult, RamError, RamMethod, compute,
};
use log::{info, warn};
use strum::IntoEnumIterator;
use tabled::{builder::Builder, settings::Style};

#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceRow {
    pub n: usize,
    pub approx_area: f64,
    pub percent_error: f64,
}

/// runs `method` for n_start, 2*n_start, ... , n_start * 2^doublings
pub fn convergence_study(
    a: f64,
    b: f64,
    method: RamMethod,
    n_start: usize,
    doublings: u32,
) -> Result<Vec<ConvergenceRow>, RamError> {
    let mut rows = Vec::with_capacity(doublings as usize + 1);
    let mut n = n_start;
    for _ in 0..=doublings {
        let result = compute(&ApproximationRequest::new(a, b, n, method))?;
        rows.push(ConvergenceRow {
            n,
            approx_area: result.approx_area,
            percent_error: result.percent_error,
        });
        n = n.checked_mul(2).ok_or(RamError::InvalidSubdivisionCount(i64::MAX))?;
    }
    if !is_non_increasing(&rows) {
        warn!("{} error grew while n was doubled on [{}, {}]", method, a, b);
    }
    info!("{} convergence study: {} rows", method, rows.len());
    Ok(rows)
}

/// true when the percent error never grows from one row to the next
pub fn is_non_increasing(rows: &[ConvergenceRow]) -> bool {
    rows.windows(2)
        .all(|w| w[1].percent_error <= w[0].percent_error)
}

/// ratio of consecutive errors; about 2 for LRAM/RRAM and 4 for MRAM/TRAM
pub fn error_ratios(rows: &[ConvergenceRow]) -> Vec<f64> {
    rows.windows(2)
        .map(|w| w[0].percent_error / w[1].percent_error)
        .collect()
}

/// one result per rule, in LRAM, RRAM, MRAM, TRAM order
pub fn compare_methods(a: f64, b: f64, n: usize) -> Result<Vec<ApproximationResult>, RamError> {
    RamMethod::iter()
        .map(|method| compute(&ApproximationRequest::new(a, b, n, method)))
        .collect()
}

pub fn summary_table(request: &ApproximationRequest, result: &ApproximationResult) -> String {
    let mut builder = Builder::default();
    builder.push_record(["quantity", "value"]);
    builder.push_record(["method".to_string(), result.method.to_string()]);
    builder.push_record(["interval".to_string(), format!("[{}, {}]", request.a, request.b)]);
    builder.push_record(["n".to_string(), result.n.to_string()]);
    builder.push_record(["dx".to_string(), format!("{}", result.dx)]);
    builder.push_record(["exact area".to_string(), format!("{:.4}", result.exact_area)]);
    builder.push_record([
        format!("{} area", result.method),
        format!("{:.4}", result.approx_area),
    ]);
    builder.push_record(["% error".to_string(), format!("{:.2}%", result.percent_error)]);
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

pub fn convergence_table(method: RamMethod, rows: &[ConvergenceRow]) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        "n".to_string(),
        format!("{} area", method),
        "% error".to_string(),
        "ratio".to_string(),
    ]);
    let ratios = std::iter::once("-".to_string())
        .chain(error_ratios(rows).into_iter().map(|r| format!("{:.3}", r)));
    for (row, ratio) in rows.iter().zip(ratios) {
        builder.push_record([
            row.n.to_string(),
            format!("{:.6}", row.approx_area),
            format!("{:.6}", row.percent_error),
            ratio,
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

pub fn comparison_table(results: &[ApproximationResult]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["method", "n", "approx area", "exact area", "% error"]);
    for result in results {
        builder.push_record([
            result.method.to_string(),
            result.n.to_string(),
            format!("{:.4}", result.approx_area),
            format!("{:.4}", result.exact_area),
            format!("{:.2}", result.percent_error),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}
