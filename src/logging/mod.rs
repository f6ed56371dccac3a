use std::{
    fs::{create_dir_all, File, OpenOptions},
    io::LineWriter,
    path::Path,
};

use env_logger::{Builder, Env, Target};

use crate::{config, config_error, core::ResolveResult};

pub struct Logger {
    config: config::Log,
}

impl Logger {
    pub fn new(config: config::Log) -> Self {
        Self { config }
    }

    /// Open the configured log file for appending, creating missing parent directories
    fn open_log_file(path: &Path) -> ResolveResult<File> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_dir_all(parent).map_err(|e| {
                    config_error!("Failed to create log path {}: {}", parent.display(), e)
                })?;
            }
        }

        OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| config_error!("Failed to open log file {}: {}", path.display(), e))
    }

    fn builder(&self) -> ResolveResult<Builder> {
        let mut builder = Builder::new();
        builder.filter_level(self.config.level_filter());
        // RUST_LOG still wins over the configured level
        builder.parse_env(Env::default());

        if let Some(path) = &self.config.path {
            let file = Self::open_log_file(path)?;
            builder.target(Target::Pipe(Box::new(LineWriter::new(file))));
        }
        Ok(builder)
    }

    /// Install the global logger. Fails if one is already installed.
    pub fn init_env_logger(&self) -> ResolveResult<()> {
        self.builder()?
            .try_init()
            .map_err(|e| config_error!("Failed to initialise logger: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Write};

    use super::*;

    #[test]
    fn test_log_file_and_parent_dirs_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/nested/strata.log");

        let mut file = Logger::open_log_file(&path).unwrap();
        writeln!(file, "first").unwrap();
        let mut file = Logger::open_log_file(&path).unwrap();
        writeln!(file, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_builder_accepts_config() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(config::Log {
            level: "debug".into(),
            path: Some(dir.path().join("strata.log")),
        });
        assert!(logger.builder().is_ok());
        assert!(dir.path().join("strata.log").is_file());
    }
}
