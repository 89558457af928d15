use crate::numerical::RAM::{ApproximationResult, RamError};
use chrono::Local;
use csv::Writer;
use log::info;
use simplelog::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Map a textual log level ("off", "error", "warn", "info", "debug", "trace") to a filter
pub fn parse_loglevel(level: &str) -> Result<LevelFilter, RamError> {
    match level.trim().to_lowercase().as_str() {
        "off" | "none" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(RamError::TaskFile(format!(
            "loglevel must be off, error, warn, info, debug or trace, got '{}'",
            other
        ))),
    }
}

/// Install a terminal logger and, if asked, a file logger writing into
/// log_<date_time>.txt in the working directory. Returns the path of the log file.
/// A logger installed earlier stays in place.
pub fn init_logger(level: LevelFilter, log_to_file: bool) -> Option<PathBuf> {
    init_logger_in(level, log_to_file.then_some(Path::new(".")))
}

fn open_log_file(dir: &Path) -> Option<(PathBuf, File)> {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = dir.join(format!("log_{}.txt", date_and_time));
    match File::create(&path) {
        Ok(file) => Some((path, file)),
        Err(e) => {
            eprintln!("cannot create log file {}: {}", path.display(), e);
            None
        }
    }
}

fn init_logger_in(level: LevelFilter, log_dir: Option<&Path>) -> Option<PathBuf> {
    if level == LevelFilter::Off {
        return None;
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let mut log_path = None;
    if let Some((path, file)) = log_dir.and_then(open_log_file) {
        loggers.push(WriteLogger::new(level, Config::default(), file));
        log_path = Some(path);
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => {
            info!("Program started with loglevel: {}", level);
            log_path
        }
        Err(e) => {
            if let Some(path) = log_path {
                eprintln!("logger not installed ({}), {} not kept", e, path.display());
                let _ = fs::remove_file(path);
            }
            None
        }
    }
}

fn sample_rows(result: &ApproximationResult) -> impl Iterator<Item = [String; 3]> + '_ {
    result
        .sample_xs
        .iter()
        .zip(result.sample_ys.iter())
        .enumerate()
        .map(|(i, (x, y))| [i.to_string(), x.to_string(), y.to_string()])
}

const HEADERS: [&str; 3] = ["index", "x", "f(x)"];

/// sample points and function values as tab separated text
pub fn save_samples_to_file<P: AsRef<Path>>(
    result: &ApproximationResult,
    filename: P,
) -> Result<(), RamError> {
    let mut file = File::create(filename)?;
    writeln!(file, "{}", HEADERS.join("\t"))?;
    for row in sample_rows(result) {
        writeln!(file, "{}", row.join("\t"))?;
    }
    Ok(())
}

pub fn save_samples_to_csv<P: AsRef<Path>>(
    result: &ApproximationResult,
    filename: P,
) -> Result<(), RamError> {
    let file = File::create(filename.as_ref())?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(HEADERS)?;
    for row in sample_rows(result) {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    info!("samples saved to {}", filename.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::RAM::{ApproximationRequest, RamMethod, compute};
    use tempfile::tempdir;

    #[test]
    fn test_parse_loglevel() {
        assert_eq!(parse_loglevel("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_loglevel("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_loglevel("none").unwrap(), LevelFilter::Off);
        assert!(matches!(parse_loglevel("loud"), Err(RamError::TaskFile(_))));
    }

    #[test]
    fn test_logger_off_installs_nothing() {
        assert_eq!(init_logger(LevelFilter::Off, true), None);
    }

    #[test]
    fn test_open_log_file() {
        let dir = tempdir().unwrap();
        let (path, _file) = open_log_file(dir.path()).unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("log_") && name.ends_with(".txt"));
        assert!(open_log_file(&dir.path().join("no_such_dir")).is_none());
    }

    #[test]
    fn test_rejected_logger_leaves_no_log_file() {
        // after this call some logger is installed for the whole test binary
        init_logger_in(LevelFilter::Info, None);
        let dir = tempdir().unwrap();
        assert_eq!(init_logger_in(LevelFilter::Info, Some(dir.path())), None);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_save_samples_to_csv() {
        let result = compute(&ApproximationRequest::new(0.0, 2.0, 2, RamMethod::Trapezoid)).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("samples.csv");
        save_samples_to_csv(&result, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["index", "x", "f(x)"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[1][1], "1");
        assert_eq!(&rows[2][2], "12");
    }

    #[test]
    fn test_save_samples_to_file() {
        let result = compute(&ApproximationRequest::new(1.0, 3.0, 4, RamMethod::Midpoint)).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("samples.txt");
        save_samples_to_file(&result, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "index\tx\tf(x)");
        assert!(lines[1].starts_with("0\t1.25\t"));
    }
}
