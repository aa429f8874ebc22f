use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;

use crate::common::constants::{LOG_FILE_NAME, LOG_FILE_ROLL_COUNT, LOG_FILE_ROLL_SIZE, LOG_PATTERN};
use crate::common::errors::HybError;

const CONSOLE_APPENDER: &str = "console";
const FILE_APPENDER: &str = "file";

/// Logger settings for the index tools.
///
/// - `log_directory`: where rolling log files are written when `log_in_file` is set.
/// - `log_level`: one of `trace`, `debug`, `info`, `warn`, `error`, `off`.
/// - `console_display`: also log to stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub log_directory: PathBuf,
    pub log_level: String,
    pub log_in_file: bool,
    pub console_display: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { log_directory: PathBuf::from("."), log_level: "info".to_string(), log_in_file: false, console_display: true }
    }
}

impl LoggerConfig {
    pub fn new(log_directory: PathBuf, log_level: String, log_in_file: bool, console_display: bool) -> Self {
        Self { log_directory, log_level, log_in_file, console_display }
    }

    pub fn level(&self) -> Result<LevelFilter, HybError> {
        LevelFilter::from_str(&self.log_level).map_err(|_| HybError::Logger(format!("unknown log level '{}'", self.log_level)))
    }

    pub fn build_logger_config(&self) -> Result<Config, HybError> {
        let level = self.level()?;
        let mut builder = Config::builder();
        let mut root = Root::builder();

        if self.console_display {
            let console = ConsoleAppender::builder()
                .target(log4rs::append::console::Target::Stderr)
                .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                .build();
            builder = builder.appender(Appender::builder().build(CONSOLE_APPENDER, Box::new(console)));
            root = root.appender(CONSOLE_APPENDER);
        }

        if self.log_in_file {
            let log_path = self.log_directory.join(LOG_FILE_NAME);
            let roll_pattern = format!("{}.{{}}", log_path.display());
            let roller = FixedWindowRoller::builder()
                .build(&roll_pattern, LOG_FILE_ROLL_COUNT)
                .map_err(|e| HybError::Logger(e.to_string()))?;
            let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(LOG_FILE_ROLL_SIZE)), Box::new(roller));
            let file = RollingFileAppender::builder()
                .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                .build(log_path, Box::new(policy))?;
            builder = builder.appender(Appender::builder().build(FILE_APPENDER, Box::new(file)));
            root = root.appender(FILE_APPENDER);
        }

        builder.build(root.build(level)).map_err(|e| HybError::Logger(e.to_string()))
    }
}

/// Install the global logger. Can only succeed once per process.
pub fn init_logger(config: &LoggerConfig) -> Result<Handle, HybError> {
    let log4rs_config = config.build_logger_config()?;
    log4rs::init_config(log4rs_config).map_err(|e| HybError::Logger(e.to_string()))
}
