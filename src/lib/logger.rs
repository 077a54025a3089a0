use directories::ProjectDirs;
use log::LevelFilter;
use std::fs;
use std::io::Write;

use crate::Result;

/// Initialize the logger with file and console output
///
/// # Arguments
///
/// * `verbose` - Enable debug level logging
/// * `quiet` - Suppress console output (logs still written to file)
///
/// # Platform-specific log locations
///
/// * **macOS**: `~/Library/Application Support/com.resource-report.resource-report/resource-report.log`
/// * **Linux**: `~/.local/share/resource-report/resource-report.log`
/// * **Windows**: `C:\Users\<User>\AppData\Local\resource-report\resource-report\data\resource-report.log`
///
pub fn init_logger(verbose: bool, quiet: bool) -> Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Get platform-specific log directory
    let log_path = if let Some(proj_dirs) = ProjectDirs::from("io", "resource-report", "resource-report")
    {
        let log_dir = proj_dirs.data_local_dir();
        fs::create_dir_all(log_dir).map_err(|e| {
            crate::ConfigError::FileError(format!("Failed to create log directory: {}", e))
        })?;
        log_dir.join("resource-report.log")
    } else {
        // Fallback to current directory if ProjectDirs fails
        std::env::current_dir()
            .map_err(|e| {
                crate::ConfigError::FileError(format!("Failed to get current directory: {}", e))
            })?
            .join("resource-report.log")
    };

    // Open log file for writing
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| crate::ConfigError::FileError(format!("Failed to open log file: {}", e)))?;

    // Build logger
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log_level).format_timestamp_secs();

    if quiet {
        // Only write to file when quiet
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    } else {
        // Write to both stderr and file, keeping stdout clean for the report
        struct MultiWriter {
            stderr: std::io::Stderr,
            file: fs::File,
        }

        impl Write for MultiWriter {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.stderr.write_all(buf)?;
                self.file.write_all(buf)?;
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                self.stderr.flush()?;
                self.file.flush()?;
                Ok(())
            }
        }

        let multi_writer = MultiWriter {
            stderr: std::io::stderr(),
            file: log_file,
        };
        builder.target(env_logger::Target::Pipe(Box::new(multi_writer)));
    }

    builder.init();

    log::debug!("Logging to: {}", log_path.display());

    Ok(())
}
