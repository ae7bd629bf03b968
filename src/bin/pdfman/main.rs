//! Command-line front-end for the PDF reader launcher.

use std::io;
use std::path::Path;

use pdfman::config::Theme;
use pdfman::library::ReaderId;
use pdfman::logging;
use pdfman::session::Session;

mod args;
mod output;
mod prompt;

use args::{Command, ConfigChanges, parse_args};
use prompt::TerminalPrompt;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(command) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let mut session = Session::open_default().map_err(|err| err.to_string())?;
    let result = execute(&mut session, command);
    output::print_status(&session);
    result
}

fn execute(session: &mut Session, command: Command) -> Result<(), String> {
    match command {
        Command::List {
            reader,
            search,
            all,
        } => {
            if all {
                session.select_reader(None).map_err(|err| err.to_string())?;
            } else if let Some(reader) = reader {
                let id = reader_id(session, &reader)?;
                session
                    .select_reader(Some(id))
                    .map_err(|err| err.to_string())?;
            }
            session.set_search(search.unwrap_or_default());
            output::print_assignments(&session.visible(), session.readers());
            Ok(())
        }
        Command::Open { path, reader } => {
            let path = absolute(&path);
            match reader {
                Some(reader) => {
                    let id = reader_id(session, &reader)?;
                    session.track(&path).map_err(|err| err.to_string())?;
                    session.open_with(&path, &id).map_err(|err| err.to_string())?;
                }
                None => {
                    let stdin = io::stdin();
                    let mut prompt = TerminalPrompt::new(stdin.lock(), io::stdout());
                    session
                        .open_path(&path, &mut prompt)
                        .map_err(|err| err.to_string())?;
                }
            }
            Ok(())
        }
        Command::Add { paths } => {
            let summary = session
                .add_files(paths.iter().map(|path| absolute(path)))
                .map_err(|err| err.to_string())?;
            for path in &summary.already_tracked {
                eprintln!("Already tracked: {}", path.display());
            }
            for path in &summary.rejected {
                eprintln!("Not an existing PDF file: {}", path.display());
            }
            Ok(())
        }
        Command::Remove { path } => session
            .remove_assignment(&absolute(&path))
            .map(|_| ())
            .map_err(|err| err.to_string()),
        Command::Assign { path, reader } => {
            let id = reader_id(session, &reader)?;
            session
                .change_reader(&absolute(&path), Some(id))
                .map_err(|err| err.to_string())
        }
        Command::Scan => session
            .scan()
            .map(|_| ())
            .map_err(|err| err.to_string()),
        Command::Reveal { path } => session
            .reveal(&absolute(&path))
            .map_err(|err| err.to_string()),
        Command::Readers => {
            output::print_readers(session.readers());
            Ok(())
        }
        Command::ReaderAdd { executable, name } => session
            .add_reader(absolute(&executable), name)
            .map(|_| ())
            .map_err(|err| err.to_string()),
        Command::ReaderRemove { reader } => {
            let id = reader_id(session, &reader)?;
            session
                .remove_reader(&id)
                .map(|_| ())
                .map_err(|err| err.to_string())
        }
        Command::ReaderDefault { reader } => {
            let id = reader_id(session, &reader)?;
            session
                .set_default_reader(&id)
                .map_err(|err| err.to_string())
        }
        Command::ReaderRename { reader, name } => {
            let id = reader_id(session, &reader)?;
            session
                .rename_reader(&id, &name)
                .map_err(|err| err.to_string())
        }
        Command::Config(changes) => apply_config(session, changes),
    }
}

fn apply_config(session: &mut Session, changes: ConfigChanges) -> Result<(), String> {
    if changes.is_empty() {
        output::print_config(&session.config());
        return Ok(());
    }
    let theme = changes
        .theme
        .as_deref()
        .map(str::parse::<Theme>)
        .transpose()?;
    let updated = session
        .update_config(|config| {
            if let Some(max_recent) = changes.max_recent {
                config.max_recent_files = max_recent;
            }
            if let Some(theme) = theme {
                config.theme = theme;
            }
            if let Some(enabled) = changes.notifications {
                config.show_notifications = enabled;
            }
            if let Some(enabled) = changes.auto_open {
                config.auto_open_with_assigned_reader = enabled;
            }
            for folder in &changes.folders_added {
                config.recent_folders.push(absolute(folder));
            }
            for folder in &changes.folders_removed {
                let folder = absolute(folder);
                config.recent_folders.retain(|existing| existing != &folder);
            }
        })
        .map_err(|err| err.to_string())?;
    output::print_config(&updated);
    Ok(())
}

fn reader_id(session: &Session, needle: &str) -> Result<ReaderId, String> {
    session
        .find_reader(needle)
        .map(|reader| reader.id.clone())
        .ok_or_else(|| format!("No reader matches {needle}"))
}

fn absolute(path: &Path) -> std::path::PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
