//! First-run detection of installed PDF readers.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::Reader;

/// A reader we know how to find: display name plus executable path relative
/// to an installation root.
#[derive(Debug, Clone, Copy)]
pub struct KnownReader {
    pub name: &'static str,
    pub relative_path: &'static str,
}

#[cfg(target_os = "windows")]
pub const KNOWN_READERS: &[KnownReader] = &[
    KnownReader {
        name: "Adobe Acrobat Reader",
        relative_path: r"Adobe\Acrobat Reader DC\Reader\AcroRd32.exe",
    },
    KnownReader {
        name: "Microsoft Edge",
        relative_path: r"Microsoft\Edge\Application\msedge.exe",
    },
    KnownReader {
        name: "Mozilla Firefox",
        relative_path: r"Mozilla Firefox\firefox.exe",
    },
    KnownReader {
        name: "Google Chrome",
        relative_path: r"Google\Chrome\Application\chrome.exe",
    },
];

#[cfg(target_os = "macos")]
pub const KNOWN_READERS: &[KnownReader] = &[
    KnownReader {
        name: "Preview",
        relative_path: "Preview.app/Contents/MacOS/Preview",
    },
    KnownReader {
        name: "Skim",
        relative_path: "Skim.app/Contents/MacOS/Skim",
    },
    KnownReader {
        name: "Mozilla Firefox",
        relative_path: "Firefox.app/Contents/MacOS/firefox",
    },
    KnownReader {
        name: "Google Chrome",
        relative_path: "Google Chrome.app/Contents/MacOS/Google Chrome",
    },
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const KNOWN_READERS: &[KnownReader] = &[
    KnownReader {
        name: "Evince",
        relative_path: "evince",
    },
    KnownReader {
        name: "Okular",
        relative_path: "okular",
    },
    KnownReader {
        name: "Zathura",
        relative_path: "zathura",
    },
    KnownReader {
        name: "Mozilla Firefox",
        relative_path: "firefox",
    },
    KnownReader {
        name: "Google Chrome",
        relative_path: "google-chrome",
    },
];

/// Installation roots searched on this platform.
pub fn default_search_roots() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        ["ProgramFiles", "ProgramFiles(x86)"]
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .map(PathBuf::from)
            .collect()
    }
    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/System/Applications"),
            PathBuf::from("/Applications"),
        ]
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        vec![PathBuf::from("/usr/bin"), PathBuf::from("/usr/local/bin")]
    }
}

/// Readers found on this machine; the first one is flagged default.
pub fn detect_installed_readers() -> Vec<Reader> {
    let readers = detect_readers_in(&default_search_roots(), KNOWN_READERS);
    info!(count = readers.len(), "Detected installed PDF readers");
    readers
}

/// Look for each known reader under each root, in table order.
///
/// A reader is reported once even if it exists under several roots.
pub fn detect_readers_in(roots: &[PathBuf], known: &[KnownReader]) -> Vec<Reader> {
    let mut found: Vec<Reader> = Vec::new();
    for candidate in known {
        let Some(executable) = locate(roots, candidate) else {
            continue;
        };
        debug!(reader = candidate.name, path = %executable.display(), "Found reader");
        let mut reader = Reader::new(candidate.name, executable);
        reader.is_default = found.is_empty();
        found.push(reader);
    }
    found
}

fn locate(roots: &[PathBuf], candidate: &KnownReader) -> Option<PathBuf> {
    roots
        .iter()
        .map(|root| root.join(Path::new(candidate.relative_path)))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[KnownReader] = &[
        KnownReader {
            name: "Alpha",
            relative_path: "alpha/alpha.exe",
        },
        KnownReader {
            name: "Beta",
            relative_path: "beta.exe",
        },
        KnownReader {
            name: "Gamma",
            relative_path: "gamma.exe",
        },
    ];

    #[test]
    fn finds_readers_across_roots_in_table_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("beta.exe"), b"").unwrap();
        std::fs::create_dir_all(first.path().join("alpha")).unwrap();
        std::fs::write(first.path().join("alpha/alpha.exe"), b"").unwrap();
        std::fs::write(second.path().join("gamma.exe"), b"").unwrap();
        std::fs::write(first.path().join("gamma.exe"), b"").unwrap();

        let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let readers = detect_readers_in(&roots, TABLE);
        let names: Vec<&str> = readers.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
        assert!(readers[0].is_default);
        assert!(readers[1..].iter().all(|r| !r.is_default));
        assert_eq!(readers[2].executable_path, first.path().join("gamma.exe"));
    }

    #[test]
    fn empty_roots_detect_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(detect_readers_in(&[dir.path().to_path_buf()], TABLE).is_empty());
        assert!(detect_readers_in(&[], TABLE).is_empty());
    }
}
