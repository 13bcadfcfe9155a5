use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structured log events for an authoring session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    WizardStarted {
        session: String,
        question_count: Option<usize>,
    },
    CountChosen {
        session: String,
        question_count: usize,
    },
    StepEntered {
        session: String,
        step: usize,
        question_count: usize,
        progress: u8,
    },
    QuestionSaved {
        session: String,
        step: usize,
    },
    InputRejected {
        session: String,
        message: String,
    },
    Finished {
        session: String,
        questions: usize,
    },
    ExportWritten {
        session: String,
        path: PathBuf,
        questions: usize,
    },
    PublishCompleted {
        session: String,
        filename: String,
        download_url: String,
        metadata_error: Option<String>,
    },
    PublishFailed {
        session: String,
        error: String,
    },
    SessionCleared {
        session: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for sweetrivia events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger that also appends JSON lines to `log_path`
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let _ = writeln!(file, "{}", event.with_timestamp());
            }
        }

        let line = match self.format {
            LogFormat::Json => serde_json::to_string(event).ok(),
            LogFormat::Pretty => Self::pretty(event),
            LogFormat::Compact => Some(Self::compact(event)),
        };
        if let Some(line) = line {
            let _ = writeln!(std::io::stderr(), "{}", line);
        }
    }

    /// Pretty rendering. Events the interactive wizard already shows return `None`.
    fn pretty(event: &LogEvent) -> Option<String> {
        let line = match event {
            LogEvent::WizardStarted {
                session,
                question_count,
            } => {
                let detail = match question_count {
                    Some(n) => format!("resuming, {} questions", n),
                    None => "new batch".to_string(),
                };
                format!(
                    "{} {} {}",
                    "▶".bright_cyan(),
                    session.bold().bright_white(),
                    format!("({})", detail).dimmed()
                )
            }
            LogEvent::StepEntered {
                step,
                question_count,
                progress,
                ..
            } => format!(
                "{} {}",
                format!("─ Question {} of {} ", step, question_count)
                    .bright_blue()
                    .bold(),
                format!("{}%", progress).dimmed()
            ),
            LogEvent::QuestionSaved { step, .. } => {
                format!("  {} Question {} saved", "✓".bright_green(), step)
            }
            LogEvent::InputRejected { message, .. } => {
                format!("  {} {}", "✗".bright_red(), message.bright_red())
            }
            LogEvent::Finished { questions, .. } => format!(
                "{} {} questions ready",
                "✓".bright_green(),
                questions.to_string().bold()
            ),
            LogEvent::ExportWritten { path, .. } => {
                format!("{} Saved {}", "✓".bright_green(), path.display())
            }
            LogEvent::PublishCompleted {
                filename,
                download_url,
                metadata_error,
                ..
            } => {
                let mut line = format!(
                    "{} Uploaded {}\n  {}",
                    "✓".bright_green(),
                    filename.bold(),
                    download_url.underline()
                );
                if let Some(err) = metadata_error {
                    line.push_str(&format!(
                        "\n  {} Metadata not recorded: {}",
                        "⚠".bright_yellow(),
                        err
                    ));
                }
                line
            }
            LogEvent::PublishFailed { error, .. } => {
                format!("{} Upload failed: {}", "✗".bright_red(), error.bright_red())
            }
            LogEvent::SessionCleared { session } => {
                format!("{} Cleared {}", "↺".bright_yellow(), session)
            }
            LogEvent::CountChosen { .. } => return None,
        };
        Some(line)
    }

    fn compact(event: &LogEvent) -> String {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        match event {
            LogEvent::WizardStarted {
                session,
                question_count,
            } => format!(
                "[{}] wizard:start {} count={}",
                timestamp,
                session,
                question_count.map_or_else(|| "-".to_string(), |n| n.to_string())
            ),
            LogEvent::CountChosen {
                session,
                question_count,
            } => format!("[{}] count:{} {}", timestamp, question_count, session),
            LogEvent::StepEntered {
                session,
                step,
                question_count,
                progress,
            } => format!(
                "[{}] step:{}/{} {}% {}",
                timestamp, step, question_count, progress, session
            ),
            LogEvent::QuestionSaved { session, step } => {
                format!("[{}] saved:{} {}", timestamp, step, session)
            }
            LogEvent::InputRejected { session, message } => {
                format!("[{}] rejected {}: {}", timestamp, session, message)
            }
            LogEvent::Finished { session, questions } => {
                format!("[{}] finished:{} {}", timestamp, questions, session)
            }
            LogEvent::ExportWritten {
                session,
                path,
                questions,
            } => format!(
                "[{}] export:{} {} {}",
                timestamp,
                questions,
                session,
                path.display()
            ),
            LogEvent::PublishCompleted {
                session,
                filename,
                metadata_error,
                ..
            } => format!(
                "[{}] publish:done {} {}{}",
                timestamp,
                session,
                filename,
                if metadata_error.is_some() {
                    " (no metadata)"
                } else {
                    ""
                }
            ),
            LogEvent::PublishFailed { session, error } => {
                format!("[{}] publish:error {}: {}", timestamp, session, error)
            }
            LogEvent::SessionCleared { session } => {
                format!("[{}] cleared {}", timestamp, session)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = LogEvent::QuestionSaved {
            session: "default".to_string(),
            step: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "question_saved");
        assert_eq!(json["step"], 2);
    }

    #[test]
    fn test_file_output_is_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");
        let logger = Logger::with_file(LogFormat::Compact, &path).unwrap();

        logger.log(&LogEvent::SessionCleared {
            session: "s1".to_string(),
        });
        logger.log(&LogEvent::Finished {
            session: "s1".to_string(),
            questions: 3,
        });

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "session_cleared");
        assert!(lines[1]["timestamp"].is_string());
    }

    #[test]
    fn test_compact_rendering() {
        let line = Logger::compact(&LogEvent::StepEntered {
            session: "s1".to_string(),
            step: 1,
            question_count: 3,
            progress: 33,
        });
        assert!(line.ends_with("step:1/3 33% s1"));
    }
}
