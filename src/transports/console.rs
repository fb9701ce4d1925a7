//! Console transport implementation

use crate::core::{LogLevel, LogRecord, Result, Transport, TransportCapabilities};
use async_trait::async_trait;
#[cfg(feature = "console")]
use colored::Colorize;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Human-readable lines on stdout/stderr
///
/// Lines look like `[ts] [LEVEL] namespace - message key=value ...`.
/// Error and fatal records go to stderr, everything else to stdout.
pub struct ConsoleTransport {
    use_colors: bool,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn uses_colors(&self) -> bool {
        self.use_colors
    }

    /// Render one record as a single line
    pub fn format_line(&self, record: &LogRecord) -> String {
        let timestamp = chrono::DateTime::from_timestamp_millis(record.timestamp)
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| record.timestamp.to_string());

        let mut line = format!(
            "[{}] [{}] {} - {}",
            timestamp,
            self.format_level(record.level),
            record.namespace.as_deref().unwrap_or("-"),
            escape_control(&record.message)
        );

        if let Some(context) = record.context.as_ref().filter(|c| !c.is_empty()) {
            line.push(' ');
            line.push_str(&escape_control(&context.format_fields()));
        }
        if let Some(id) = &record.correlation_id {
            line.push_str(" correlationId=");
            line.push_str(&escape_control(id));
        }

        line
    }

    fn format_level(&self, level: LogLevel) -> String {
        let padded = format!("{:5}", level.to_str());
        #[cfg(feature = "console")]
        if self.use_colors {
            return padded.color(level.color_code()).to_string();
        }
        padded
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape line breaks and tabs so one record stays on one line
fn escape_control(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[async_trait]
impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    fn capabilities(&self) -> TransportCapabilities {
        TransportCapabilities::FLUSH
    }

    async fn write(&self, batch: &[LogRecord]) -> Result<()> {
        for record in batch {
            let line = self.format_line(record);
            // Route Error and Fatal levels to stderr, others to stdout
            match record.level {
                LogLevel::Error | LogLevel::Fatal => eprintln!("{}", line),
                _ => println!("{}", line),
            }
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        use std::io::Write;
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }
}
