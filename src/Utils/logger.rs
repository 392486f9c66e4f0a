use crate::symbolic::engine_config::EngineConfig;
use crate::symbolic::errors::FunctionResult;
use chrono::Local;
use log::info;
use simplelog::*;
use std::fs::File;

/// Log file name like `prefix_2024-01-31_12-00-00.txt`.
pub fn timestamped_log_name(prefix: &str) -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("{}_{}.txt", prefix, date_and_time)
}

/// Console logger plus an optional file logger. Returns false if a global logger was already
/// installed (only the first call in a process wins) or nothing was requested.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> bool {
    if level == LevelFilter::Off {
        return false;
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(filename) = log_file {
        if let Ok(file) = File::create(filename) {
            loggers.push(WriteLogger::new(level, Config::default(), file));
        }
    }
    let installed = CombinedLogger::init(loggers).is_ok();
    if installed {
        info!("logging started with level {}", level);
    }
    installed
}

/// Logger set up from the engine settings.
pub fn init_logger_from_config(
    config: &EngineConfig,
    log_file: Option<&str>,
) -> FunctionResult<bool> {
    let level = config.log_level_filter()?;
    Ok(init_logger(level, log_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_timestamped_log_name() {
        let name = timestamped_log_name("taylor");
        assert!(name.starts_with("taylor_"));
        assert!(name.ends_with(".txt"));
        // taylor_YYYY-MM-DD_HH-MM-SS.txt
        assert_eq!(name.len(), "taylor_".len() + 19 + ".txt".len());
    }

    #[test]
    fn test_logger_off_installs_nothing() {
        assert!(!init_logger(LevelFilter::Off, None));
        let config = EngineConfig::default().with_loglevel(None);
        assert_eq!(init_logger_from_config(&config, None).unwrap(), false);
    }

    #[test]
    fn test_invalid_level_in_config() {
        let config = EngineConfig::default().with_loglevel(Some("loud".to_string()));
        assert!(init_logger_from_config(&config, None).is_err());
    }

    #[test]
    fn test_file_logger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(timestamped_log_name("engine"));
        let path_str = path.to_str().unwrap();
        // another test may have installed the global logger first
        if init_logger(LevelFilter::Info, Some(path_str)) {
            log::logger().flush();
            let mut content = String::new();
            File::open(&path).unwrap().read_to_string(&mut content).unwrap();
            assert!(content.contains("logging started"));
        }
    }
}
