//! Choice of reader for an assignment being opened.
//!
//! An assignment pinned to a reader that still exists opens directly. Anything
//! else (unassigned, or pinned to a removed reader) goes through the prompt.
//! Cancelling the prompt opens the preselected reader (the stored one if it
//! still exists, otherwise the default) without recording a choice, so the
//! user is asked again next time.

use thiserror::Error;
use tracing::debug;

use crate::library::{Assignment, Reader, ReaderId, ReaderRegistry};

/// First step of resolution, before any user interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The stored reader exists; open with it.
    NoReaderNeeded(Reader),
    /// Ask the user. `preselected` is the reader to highlight in the prompt.
    NeedsPrompt { preselected: Option<ReaderId> },
}

/// What the user answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Selected { reader_id: ReaderId, remember: bool },
    Cancelled,
}

/// Asks the user which reader should open a file.
pub trait ReaderPrompt {
    fn choose_reader(
        &mut self,
        assignment: &Assignment,
        readers: &[Reader],
        preselected: Option<&ReaderId>,
    ) -> PromptOutcome;
}

/// Final outcome handed to the launcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Opened with the reader already stored on the assignment.
    Assigned(Reader),
    /// Picked in the prompt; `remember` decides whether it is stored.
    Chosen { reader: Reader, remember: bool },
    /// Prompt cancelled; the preselected reader is used, nothing stored.
    FallbackDefault(Reader),
}

impl Resolved {
    pub fn reader(&self) -> &Reader {
        match self {
            Resolved::Assigned(reader)
            | Resolved::Chosen { reader, .. }
            | Resolved::FallbackDefault(reader) => reader,
        }
    }

    /// Reader id to store on the assignment after a successful open, if any.
    pub fn reader_to_store(&self) -> Option<ReaderId> {
        match self {
            Resolved::Chosen {
                reader,
                remember: true,
            } => Some(reader.id.clone()),
            _ => None,
        }
    }
}

/// Resolution cannot produce a reader.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No PDF readers are configured")]
    NoReaders,
    #[error("Selected reader {0} is not configured")]
    UnknownSelection(ReaderId),
}

/// Decide whether `assignment` can open without asking.
///
/// With `auto_open` off, a valid stored reader is still offered in the prompt
/// as the preselected choice.
pub fn initial_resolution(
    assignment: &Assignment,
    registry: &ReaderRegistry,
    auto_open: bool,
) -> Result<Resolution, ResolveError> {
    if registry.is_empty() {
        return Err(ResolveError::NoReaders);
    }
    let stored = assignment
        .reader_id
        .as_ref()
        .and_then(|id| registry.find(id));
    match stored {
        Some(reader) if auto_open => Ok(Resolution::NoReaderNeeded(reader.clone())),
        Some(reader) => Ok(Resolution::NeedsPrompt {
            preselected: Some(reader.id.clone()),
        }),
        None => {
            if let Some(stale) = &assignment.reader_id {
                debug!(reader = %stale, path = %assignment.file_path.display(), "Stored reader no longer exists");
            }
            Ok(Resolution::NeedsPrompt {
                preselected: registry.default_or_first().map(|reader| reader.id.clone()),
            })
        }
    }
}

/// Run the full resolution, prompting when needed.
pub fn resolve(
    assignment: &Assignment,
    registry: &ReaderRegistry,
    auto_open: bool,
    prompt: &mut dyn ReaderPrompt,
) -> Result<Resolved, ResolveError> {
    let preselected = match initial_resolution(assignment, registry, auto_open)? {
        Resolution::NoReaderNeeded(reader) => return Ok(Resolved::Assigned(reader)),
        Resolution::NeedsPrompt { preselected } => preselected,
    };
    match prompt.choose_reader(assignment, registry.readers(), preselected.as_ref()) {
        PromptOutcome::Selected {
            reader_id,
            remember,
        } => {
            let reader = registry
                .find(&reader_id)
                .cloned()
                .ok_or(ResolveError::UnknownSelection(reader_id))?;
            Ok(Resolved::Chosen { reader, remember })
        }
        PromptOutcome::Cancelled => preselected
            .as_ref()
            .and_then(|id| registry.find(id))
            .or_else(|| registry.default_or_first())
            .cloned()
            .map(Resolved::FallbackDefault)
            .ok_or(ResolveError::NoReaders),
    }
}
