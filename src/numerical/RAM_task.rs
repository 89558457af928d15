//! # RAM task
//!
//! Bundles an `ApproximationRequest` with what should happen to the result
//! (chart, exported samples, convergence study, comparison of all rules) and reads
//! both from a task file:
//!
//! ```text
//! integration
//!   a: 1.0
//!   b: 3.0
//!   n: 4
//!   method: LRAM
//! postprocessing
//!   plot: true
//!   plot_file: ram_chart.png
//!   save_to_csv: true
//!   csv_file: ram_samples.csv
//!   convergence: 6
//!   compare: true
//!   loglevel: info
//! ```
//!
//! Every key may be omitted. Common alternative names are understood:
//! "interval" or "ram" for the integration section, "subdivisions" or "rectangles"
//! for n, "ram_type" or "rule" for method. Any other section title or key is an
//! error, so a misspelled name never falls back to the default silently.
use crate::Utils::logger::{
    init_logger, parse_loglevel, save_samples_to_csv, save_samples_to_file,
};
use crate::Utils::plots::{PlottersRenderer, RamRenderer};
use crate::Utils::task_parser::{DocumentMap, DocumentReader, parse_document, parse_file};
use crate::numerical::RAM::{
    ApproximationRequest, ApproximationResult, RamError, RamMethod, compute,
};
use crate::numerical::RAM_study::{
    compare_methods, comparison_table, convergence_study, convergence_table, summary_table,
};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

const INTEGRATION: [&str; 3] = ["integration", "interval", "ram"];
const POSTPROCESSING: [&str; 3] = ["postprocessing", "postprocess", "output"];

const METHOD: &[&str] = &["method", "ram_type", "rule"];
const A: &[&str] = &["a", "start"];
const B: &[&str] = &["b", "end"];
const N: &[&str] = &["n", "subdivisions", "rectangles"];
const INTEGRATION_KEYS: [&[&str]; 4] = [METHOD, A, B, N];

const PLOT: &[&str] = &["plot"];
const PLOT_FILE: &[&str] = &["plot_file", "chart"];
const SAVE_TO_CSV: &[&str] = &["save_to_csv", "csv"];
const CSV_FILE: &[&str] = &["csv_file"];
const SAVE: &[&str] = &["save"];
const TXT_FILE: &[&str] = &["txt_file"];
const CONVERGENCE: &[&str] = &["convergence", "doublings"];
const COMPARE: &[&str] = &["compare"];
const LOGLEVEL: &[&str] = &["loglevel", "log_level"];
const LOG_TO_FILE: &[&str] = &["log_to_file"];
const POSTPROCESSING_KEYS: [&[&str]; 10] = [
    PLOT,
    PLOT_FILE,
    SAVE_TO_CSV,
    CSV_FILE,
    SAVE,
    TXT_FILE,
    CONVERGENCE,
    COMPARE,
    LOGLEVEL,
    LOG_TO_FILE,
];

const TEMPLATE: &str = r#"// RAM task file
// interval [a, b], number of subdivisions n and the rule (LRAM, RRAM, MRAM, TRAM)
integration
  a: 1.0
  b: 3.0
  n: 4
  method: LRAM
// what to do with the result
postprocessing
  plot: true
  plot_file: ram_chart.png
  save_to_csv: false
  csv_file: ram_samples.csv
  save: false
  txt_file: ram_samples.txt
  convergence: 0
  compare: false
  loglevel: info
  log_to_file: false
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct Postprocessing {
    pub plot: bool,
    pub plot_file: PathBuf,
    pub csv_file: Option<PathBuf>,
    pub txt_file: Option<PathBuf>,
    /// number of times n is doubled in the convergence study, None to skip it
    pub convergence: Option<u32>,
    pub compare: bool,
    pub loglevel: String,
    pub log_to_file: bool,
}

impl Default for Postprocessing {
    fn default() -> Self {
        Postprocessing {
            plot: true,
            plot_file: PathBuf::from("ram_chart.png"),
            csv_file: None,
            txt_file: None,
            convergence: None,
            compare: false,
            loglevel: "info".to_string(),
            log_to_file: false,
        }
    }
}

/// What a finished task produced
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub result: ApproximationResult,
    pub tables: Vec<String>,
    pub chart: Option<PathBuf>,
    pub saved: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RamTask {
    pub request: ApproximationRequest,
    pub postprocessing: Postprocessing,
}

fn task_error(e: String) -> RamError {
    RamError::TaskFile(e)
}

impl RamTask {
    pub fn new(request: ApproximationRequest) -> Self {
        RamTask {
            request,
            postprocessing: Postprocessing::default(),
        }
    }

    pub fn from_document(document: &DocumentMap) -> Result<Self, RamError> {
        let reader = DocumentReader::new(document);
        let integration_keys = INTEGRATION_KEYS.concat();
        let postprocessing_keys = POSTPROCESSING_KEYS.concat();
        reader
            .reject_unknown(&[
                (&INTEGRATION[..], &integration_keys[..]),
                (&POSTPROCESSING[..], &postprocessing_keys[..]),
            ])
            .map_err(task_error)?;
        let mut task = RamTask::default();

        // method first: a bad name must stop everything else
        if let Some(name) = reader.text(&INTEGRATION, METHOD).map_err(task_error)? {
            task.request.method = RamMethod::parse(&name)?;
        }
        if let Some(a) = reader.float(&INTEGRATION, A).map_err(task_error)? {
            task.request.a = a;
        }
        if let Some(b) = reader.float(&INTEGRATION, B).map_err(task_error)? {
            task.request.b = b;
        }
        if let Some(n) = reader.integer(&INTEGRATION, N).map_err(task_error)? {
            if n < 1 {
                return Err(RamError::InvalidSubdivisionCount(n));
            }
            task.request.n =
                usize::try_from(n).map_err(|_| RamError::InvalidSubdivisionCount(n))?;
        }

        let post = &mut task.postprocessing;
        if let Some(plot) = reader.boolean(&POSTPROCESSING, PLOT).map_err(task_error)? {
            post.plot = plot;
        }
        if let Some(file) = reader.text(&POSTPROCESSING, PLOT_FILE).map_err(task_error)? {
            post.plot_file = PathBuf::from(file);
        }
        let save_to_csv = reader.boolean(&POSTPROCESSING, SAVE_TO_CSV).map_err(task_error)?;
        let csv_file = reader.text(&POSTPROCESSING, CSV_FILE).map_err(task_error)?;
        post.csv_file = match (save_to_csv, csv_file) {
            (Some(false), _) => None,
            (_, Some(file)) => Some(PathBuf::from(file)),
            (Some(true), None) => Some(PathBuf::from("ram_samples.csv")),
            (None, None) => None,
        };
        let save = reader.boolean(&POSTPROCESSING, SAVE).map_err(task_error)?;
        let txt_file = reader.text(&POSTPROCESSING, TXT_FILE).map_err(task_error)?;
        post.txt_file = match (save, txt_file) {
            (Some(false), _) => None,
            (_, Some(file)) => Some(PathBuf::from(file)),
            (Some(true), None) => Some(PathBuf::from("ram_samples.txt")),
            (None, None) => None,
        };
        if let Some(doublings) = reader.integer(&POSTPROCESSING, CONVERGENCE).map_err(task_error)? {
            post.convergence = match doublings {
                0 => None,
                d if d > 0 => Some(u32::try_from(d).map_err(|_| {
                    RamError::TaskFile(format!("convergence: {} doublings is too many", d))
                })?),
                d => {
                    return Err(RamError::TaskFile(format!(
                        "convergence must not be negative, got {}",
                        d
                    )));
                }
            };
        }
        if let Some(compare) = reader.boolean(&POSTPROCESSING, COMPARE).map_err(task_error)? {
            post.compare = compare;
        }
        if let Some(level) = reader.text(&POSTPROCESSING, LOGLEVEL).map_err(task_error)? {
            parse_loglevel(&level)?;
            post.loglevel = level;
        }
        if let Some(to_file) = reader.boolean(&POSTPROCESSING, LOG_TO_FILE).map_err(task_error)? {
            post.log_to_file = to_file;
        }
        Ok(task)
    }

    pub fn parse_settings_from_str(input: &str) -> Result<Self, RamError> {
        let document = parse_document(input).map_err(task_error)?;
        Self::from_document(&document)
    }

    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, RamError> {
        let document = parse_file(path).map_err(task_error)?;
        Self::from_document(&document)
    }

    pub fn create_template_file<P: AsRef<Path>>(path: P) -> Result<(), RamError> {
        fs::write(path.as_ref(), TEMPLATE)?;
        info!("task template written to {}", path.as_ref().display());
        Ok(())
    }

    /// computes the approximation and carries out the postprocessing
    pub fn run(&self) -> Result<TaskOutcome, RamError> {
        let result = compute(&self.request)?;
        let post = &self.postprocessing;
        let mut tables = vec![summary_table(&self.request, &result)];
        let mut saved = Vec::new();

        let chart = if post.plot {
            PlottersRenderer::new(&post.plot_file).render(&self.request, &result)?;
            Some(post.plot_file.clone())
        } else {
            None
        };
        if let Some(csv_file) = &post.csv_file {
            save_samples_to_csv(&result, csv_file)?;
            saved.push(csv_file.clone());
        }
        if let Some(txt_file) = &post.txt_file {
            save_samples_to_file(&result, txt_file)?;
            saved.push(txt_file.clone());
        }
        if let Some(doublings) = post.convergence {
            let ApproximationRequest { a, b, n, method } = self.request;
            let rows = convergence_study(a, b, method, n, doublings)?;
            tables.push(convergence_table(method, &rows));
        }
        if post.compare {
            let results = compare_methods(self.request.a, self.request.b, self.request.n)?;
            tables.push(comparison_table(&results));
        }
        Ok(TaskOutcome {
            result,
            tables,
            chart,
            saved,
        })
    }

    /// wrapper around `run` that sets up logging first
    pub fn solve(&self) -> Result<TaskOutcome, RamError> {
        let level = parse_loglevel(&self.postprocessing.loglevel)?;
        if let Some(log_file) = init_logger(level, self.postprocessing.log_to_file) {
            info!("logging to {}", log_file.display());
        }
        let outcome = self.run()?;
        for table in &outcome.tables {
            println!("{}", table);
        }
        info!("Program ended");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_missing_keys_take_defaults() {
        let task = RamTask::parse_settings_from_str("integration\n n: 8").unwrap();
        assert_eq!(
            task.request,
            ApproximationRequest::new(1.0, 3.0, 8, RamMethod::Left)
        );
        assert_eq!(task.postprocessing, Postprocessing::default());
    }

    #[test]
    fn test_full_task_with_pseudonyms() {
        let input = r#"
        ram
          a: 0
          b: 2.0
          rectangles: 2
          ram_type: trap
        output
          plot: false
          csv_file: samples.csv
          save: true
          convergence: 3
          compare: true
          loglevel: warn
        "#;
        let task = RamTask::parse_settings_from_str(input).unwrap();
        assert_eq!(
            task.request,
            ApproximationRequest::new(0.0, 2.0, 2, RamMethod::Trapezoid)
        );
        let post = &task.postprocessing;
        assert!(!post.plot);
        assert_eq!(post.csv_file, Some(PathBuf::from("samples.csv")));
        assert_eq!(post.txt_file, Some(PathBuf::from("ram_samples.txt")));
        assert_eq!(post.convergence, Some(3));
        assert!(post.compare);
        assert_eq!(post.loglevel, "warn");
    }

    #[test]
    fn test_save_switch_off_wins_over_file_name() {
        let task = RamTask::parse_settings_from_str(
            "postprocessing\n save_to_csv: false\n csv_file: x.csv",
        )
        .unwrap();
        assert_eq!(task.postprocessing.csv_file, None);
    }

    #[test]
    fn test_invalid_method_in_task() {
        let result = RamTask::parse_settings_from_str("integration\n a: 1\n method: XRAM");
        assert!(matches!(result, Err(RamError::InvalidMethod(name)) if name == "XRAM"));
    }

    #[test]
    fn test_misspelled_names_are_rejected() {
        match RamTask::parse_settings_from_str("integration\n nn: 8\n methd: XRAM") {
            Err(RamError::TaskFile(msg)) => {
                assert!(msg.contains("unknown key"), "{}", msg);
                assert!(msg.contains("'nn'") || msg.contains("'methd'"), "{}", msg);
            }
            other => panic!("expected a task file error, got {:?}", other),
        }
        match RamTask::parse_settings_from_str("integartion\n n: 8") {
            Err(RamError::TaskFile(msg)) => {
                assert_eq!(msg, "unknown section 'integartion'");
            }
            other => panic!("expected a task file error, got {:?}", other),
        }
        match RamTask::parse_settings_from_str("postprocessing\n plto: false") {
            Err(RamError::TaskFile(msg)) => {
                assert_eq!(msg, "unknown key 'plto' in section 'postprocessing'");
            }
            other => panic!("expected a task file error, got {:?}", other),
        }
        // pseudonyms and any letter case are still accepted
        let task = RamTask::parse_settings_from_str("Interval\n Start: 0\n Subdivisions: 8").unwrap();
        assert_eq!(task.request, ApproximationRequest::new(0.0, 3.0, 8, RamMethod::Left));
    }

    #[test]
    fn test_bad_values_in_task() {
        assert!(matches!(
            RamTask::parse_settings_from_str("integration\n n: 0"),
            Err(RamError::InvalidSubdivisionCount(0))
        ));
        assert!(matches!(
            RamTask::parse_settings_from_str("integration\n n: -3"),
            Err(RamError::InvalidSubdivisionCount(-3))
        ));
        assert!(matches!(
            RamTask::parse_settings_from_str("integration\n a: left"),
            Err(RamError::TaskFile(_))
        ));
        assert!(matches!(
            RamTask::parse_settings_from_str("postprocessing\n loglevel: loud"),
            Err(RamError::TaskFile(_))
        ));
        assert!(matches!(
            RamTask::parse_settings_from_str("postprocessing\n convergence: -1"),
            Err(RamError::TaskFile(_))
        ));
        assert!(matches!(
            RamTask::parse_settings_from_str("not a task file"),
            Err(RamError::TaskFile(_))
        ));
    }

    #[test]
    fn test_template_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("task.txt");
        RamTask::create_template_file(&path).unwrap();
        let task = RamTask::parse_file(&path).unwrap();
        assert_eq!(task.request, ApproximationRequest::default());
        assert_eq!(task.postprocessing, Postprocessing::default());
    }

    #[test]
    fn test_run_exports_and_tables() {
        let dir = tempdir().unwrap();
        let mut task = RamTask::new(ApproximationRequest::new(0.0, 2.0, 2, RamMethod::Trapezoid));
        task.postprocessing.plot = false;
        task.postprocessing.csv_file = Some(dir.path().join("samples.csv"));
        task.postprocessing.txt_file = Some(dir.path().join("samples.txt"));
        task.postprocessing.convergence = Some(2);
        task.postprocessing.compare = true;

        let outcome = task.run().unwrap();
        assert_relative_eq!(outcome.result.approx_area, 11.0, epsilon = 1e-12);
        assert_eq!(outcome.tables.len(), 3);
        assert!(outcome.chart.is_none());
        assert_eq!(outcome.saved.len(), 2);
        for path in &outcome.saved {
            assert!(path.exists());
        }
    }

    #[test]
    fn test_run_stops_on_degenerate_interval() {
        let dir = tempdir().unwrap();
        let mut task = RamTask::new(ApproximationRequest::new(-6.0, 0.0, 4, RamMethod::Left));
        task.postprocessing.plot = false;
        task.postprocessing.csv_file = Some(dir.path().join("samples.csv"));
        assert!(matches!(
            task.run(),
            Err(RamError::DegenerateExactArea { .. })
        ));
        assert!(!dir.path().join("samples.csv").exists());
    }
}
