use time::macros::format_description;
use time::format_description::FormatItem;

use pdfman::config::AppConfig;
use pdfman::library::{Assignment, Reader};
use pdfman::session::{Session, StatusTone};

const OPENED_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Print the session status; informational lines respect `show_notifications`.
pub(crate) fn print_status(session: &Session) {
    let status = session.status();
    if status.text.is_empty() {
        return;
    }
    match status.tone {
        StatusTone::Warning | StatusTone::Error => eprintln!("{}", status.text),
        StatusTone::Info if session.config().show_notifications => println!("{}", status.text),
        _ => {}
    }
}

pub(crate) fn print_assignments(rows: &[&Assignment], readers: &[Reader]) {
    if rows.is_empty() {
        println!("No files to show.");
        return;
    }
    for row in rows {
        let reader = row
            .reader_id
            .as_ref()
            .map(|id| {
                readers
                    .iter()
                    .find(|reader| &reader.id == id)
                    .map(|reader| reader.name.clone())
                    .unwrap_or_else(|| "(removed reader)".to_string())
            })
            .unwrap_or_else(|| "(default)".to_string());
        let opened = row
            .last_opened
            .format(OPENED_FORMAT)
            .unwrap_or_else(|_| row.last_opened.to_string());
        println!(
            "{opened}  {:>9}  {:<20}  {}",
            row.size_label(),
            reader,
            row.file_path.display()
        );
    }
}

pub(crate) fn print_readers(readers: &[Reader]) {
    if readers.is_empty() {
        println!("No readers configured. Add one with `pdfman reader-add <exe>`.");
        return;
    }
    for reader in readers {
        let marker = if reader.is_default { "*" } else { " " };
        let missing = if reader.is_available() { "" } else { "  (missing)" };
        println!(
            "{marker} {}  {}  {}{missing}",
            reader.id,
            reader.name,
            reader.executable_path.display()
        );
    }
}

pub(crate) fn print_config(config: &AppConfig) {
    match toml::to_string_pretty(config) {
        Ok(text) => print!("{text}"),
        Err(err) => eprintln!("Failed to render settings: {err}"),
    }
}
