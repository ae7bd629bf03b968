/// Severity of the current status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTone {
    #[default]
    Idle,
    Busy,
    Info,
    Warning,
    Error,
}

/// Status line shown by a front-end after each action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub text: String,
    pub tone: StatusTone,
}

#[derive(Clone, Debug)]
pub(crate) enum StatusMessage {
    Loaded {
        readers: usize,
        assignments: usize,
        pruned: usize,
    },
    NoReadersConfigured,
    ScanFinished {
        added: usize,
    },
    Opened {
        file: String,
        reader: String,
    },
    FilesAdded {
        added: usize,
        skipped: usize,
    },
    AssignmentRemoved {
        file: String,
    },
    NotTracked {
        file: String,
    },
    ReaderChanged {
        file: String,
        reader: Option<String>,
    },
    ReaderAdded {
        name: String,
    },
    ReaderRemoved {
        name: String,
    },
    ReaderRenamed {
        name: String,
    },
    DefaultReaderSet {
        name: String,
    },
    SettingsSaved,
    Custom {
        text: String,
        tone: StatusTone,
    },
}

impl StatusMessage {
    pub(crate) fn custom(text: impl Into<String>, tone: StatusTone) -> Self {
        Self::Custom {
            text: text.into(),
            tone,
        }
    }

    pub(crate) fn into_text_and_tone(self) -> (String, StatusTone) {
        match self {
            StatusMessage::Loaded {
                readers,
                assignments,
                pruned: 0,
            } => (
                format!("Loaded {readers} readers and {assignments} files"),
                StatusTone::Idle,
            ),
            StatusMessage::Loaded {
                readers,
                assignments,
                pruned,
            } => (
                format!(
                    "Loaded {readers} readers and {assignments} files ({pruned} missing files dropped)"
                ),
                StatusTone::Info,
            ),
            StatusMessage::NoReadersConfigured => (
                "No PDF readers configured; add one to open files".into(),
                StatusTone::Warning,
            ),
            StatusMessage::ScanFinished { added: 0 } => {
                ("No new PDF files found".into(), StatusTone::Info)
            }
            StatusMessage::ScanFinished { added } => {
                (format!("Found {added} new PDF files"), StatusTone::Info)
            }
            StatusMessage::Opened { file, reader } => {
                (format!("Opened {file} with {reader}"), StatusTone::Info)
            }
            StatusMessage::FilesAdded { added, skipped: 0 } => {
                (format!("Added {added} files"), StatusTone::Info)
            }
            StatusMessage::FilesAdded { added, skipped } => (
                format!("Added {added} files, skipped {skipped}"),
                StatusTone::Info,
            ),
            StatusMessage::AssignmentRemoved { file } => {
                (format!("Removed {file} from the list"), StatusTone::Info)
            }
            StatusMessage::NotTracked { file } => {
                (format!("{file} is not in the list"), StatusTone::Info)
            }
            StatusMessage::ReaderChanged {
                file,
                reader: Some(reader),
            } => (format!("{file} now opens with {reader}"), StatusTone::Info),
            StatusMessage::ReaderChanged { file, reader: None } => (
                format!("{file} now opens with the default reader"),
                StatusTone::Info,
            ),
            StatusMessage::ReaderAdded { name } => {
                (format!("Added reader {name}"), StatusTone::Info)
            }
            StatusMessage::ReaderRemoved { name } => {
                (format!("Removed reader {name}"), StatusTone::Info)
            }
            StatusMessage::ReaderRenamed { name } => {
                (format!("Renamed reader to {name}"), StatusTone::Info)
            }
            StatusMessage::DefaultReaderSet { name } => {
                (format!("{name} is now the default reader"), StatusTone::Info)
            }
            StatusMessage::SettingsSaved => ("Settings saved".into(), StatusTone::Info),
            StatusMessage::Custom { text, tone } => (text, tone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_summary_mentions_pruned_files_only_when_present() {
        let (text, tone) = StatusMessage::Loaded {
            readers: 2,
            assignments: 5,
            pruned: 0,
        }
        .into_text_and_tone();
        assert_eq!(text, "Loaded 2 readers and 5 files");
        assert_eq!(tone, StatusTone::Idle);

        let (text, tone) = StatusMessage::Loaded {
            readers: 2,
            assignments: 5,
            pruned: 1,
        }
        .into_text_and_tone();
        assert!(text.ends_with("(1 missing files dropped)"));
        assert_eq!(tone, StatusTone::Info);
    }
}
