use std::path::PathBuf;

/// A parsed `pdfman` invocation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    /// Show the recent list.
    List {
        reader: Option<String>,
        search: Option<String>,
        all: bool,
    },
    /// Open a file, tracking it first if needed.
    Open {
        path: PathBuf,
        reader: Option<String>,
    },
    Add {
        paths: Vec<PathBuf>,
    },
    Remove {
        path: PathBuf,
    },
    Assign {
        path: PathBuf,
        reader: String,
    },
    Scan,
    Reveal {
        path: PathBuf,
    },
    Readers,
    ReaderAdd {
        executable: PathBuf,
        name: Option<String>,
    },
    ReaderRemove {
        reader: String,
    },
    ReaderDefault {
        reader: String,
    },
    ReaderRename {
        reader: String,
        name: String,
    },
    Config(ConfigChanges),
}

/// Settings edits requested with `pdfman config`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ConfigChanges {
    pub max_recent: Option<usize>,
    pub theme: Option<String>,
    pub notifications: Option<bool>,
    pub auto_open: Option<bool>,
    pub folders_added: Vec<PathBuf>,
    pub folders_removed: Vec<PathBuf>,
}

impl ConfigChanges {
    pub fn is_empty(&self) -> bool {
        *self == ConfigChanges::default()
    }
}

/// Parse the arguments after the program name. `Ok(None)` means help was printed.
pub(crate) fn parse_args(args: Vec<String>) -> Result<Option<Command>, String> {
    let Some(first) = args.first() else {
        return Ok(Some(Command::List {
            reader: None,
            search: None,
            all: false,
        }));
    };
    if first == "-h" || first == "--help" {
        println!("{}", help_text());
        return Ok(None);
    }
    let rest = &args[1..];
    let command = match first.as_str() {
        "list" => parse_list(rest)?,
        "open" => parse_open(rest)?,
        "add" => {
            if rest.is_empty() {
                return Err("add requires at least one path".to_string());
            }
            Command::Add {
                paths: rest.iter().map(PathBuf::from).collect(),
            }
        }
        "remove" => Command::Remove {
            path: single_path(rest, "remove")?,
        },
        "assign" => match rest {
            [path, reader] => Command::Assign {
                path: PathBuf::from(path),
                reader: reader.clone(),
            },
            _ => return Err("assign requires <path> <reader>".to_string()),
        },
        "scan" => no_arguments(rest, Command::Scan, "scan")?,
        "reveal" => Command::Reveal {
            path: single_path(rest, "reveal")?,
        },
        "readers" => no_arguments(rest, Command::Readers, "readers")?,
        "reader-add" => parse_reader_add(rest)?,
        "reader-remove" => Command::ReaderRemove {
            reader: single_value(rest, "reader-remove")?,
        },
        "reader-default" => Command::ReaderDefault {
            reader: single_value(rest, "reader-default")?,
        },
        "reader-rename" => match rest {
            [reader, name] => Command::ReaderRename {
                reader: reader.clone(),
                name: name.clone(),
            },
            _ => return Err("reader-rename requires <reader> <name>".to_string()),
        },
        "config" => Command::Config(parse_config(rest)?),
        path if !path.starts_with('-') && rest.is_empty() => Command::Open {
            path: PathBuf::from(path),
            reader: None,
        },
        unknown => {
            return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
        }
    };
    Ok(Some(command))
}

fn parse_list(args: &[String]) -> Result<Command, String> {
    let mut reader = None;
    let mut search = None;
    let mut all = false;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--reader" => {
                idx += 1;
                reader = Some(value_for(args, idx, "--reader")?);
            }
            "--search" => {
                idx += 1;
                search = Some(value_for(args, idx, "--search")?);
            }
            "--all" => all = true,
            unknown => return Err(format!("Unknown list option: {unknown}")),
        }
        idx += 1;
    }
    if all && reader.is_some() {
        return Err("--all cannot be combined with --reader".to_string());
    }
    Ok(Command::List {
        reader,
        search,
        all,
    })
}

fn parse_open(args: &[String]) -> Result<Command, String> {
    let mut path = None;
    let mut reader = None;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--reader" => {
                idx += 1;
                reader = Some(value_for(args, idx, "--reader")?);
            }
            value if path.is_none() => path = Some(PathBuf::from(value)),
            unknown => return Err(format!("Unexpected argument for open: {unknown}")),
        }
        idx += 1;
    }
    let path = path.ok_or_else(|| "open requires a path".to_string())?;
    Ok(Command::Open { path, reader })
}

fn parse_reader_add(args: &[String]) -> Result<Command, String> {
    let mut executable = None;
    let mut name = None;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--name" => {
                idx += 1;
                name = Some(value_for(args, idx, "--name")?);
            }
            value if executable.is_none() => executable = Some(PathBuf::from(value)),
            unknown => return Err(format!("Unexpected argument for reader-add: {unknown}")),
        }
        idx += 1;
    }
    let executable = executable.ok_or_else(|| "reader-add requires an executable".to_string())?;
    Ok(Command::ReaderAdd { executable, name })
}

fn parse_config(args: &[String]) -> Result<ConfigChanges, String> {
    let mut changes = ConfigChanges::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        idx += 1;
        let value = value_for(args, idx, flag)?;
        match flag {
            "--max-recent" => {
                let parsed = value
                    .parse::<usize>()
                    .map_err(|_| format!("--max-recent expects a number, got {value}"))?;
                changes.max_recent = Some(parsed);
            }
            "--theme" => changes.theme = Some(value),
            "--notifications" => changes.notifications = Some(parse_switch(flag, &value)?),
            "--auto-open" => changes.auto_open = Some(parse_switch(flag, &value)?),
            "--folder-add" => changes.folders_added.push(PathBuf::from(value)),
            "--folder-remove" => changes.folders_removed.push(PathBuf::from(value)),
            unknown => return Err(format!("Unknown config option: {unknown}")),
        }
        idx += 1;
    }
    Ok(changes)
}

fn parse_switch(flag: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(format!("{flag} expects on or off, got {value}")),
    }
}

fn value_for(args: &[String], idx: usize, flag: &str) -> Result<String, String> {
    args.get(idx)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn single_value(args: &[String], command: &str) -> Result<String, String> {
    match args {
        [value] => Ok(value.clone()),
        _ => Err(format!("{command} requires exactly one argument")),
    }
}

fn single_path(args: &[String], command: &str) -> Result<PathBuf, String> {
    single_value(args, command).map(PathBuf::from)
}

fn no_arguments(args: &[String], command: Command, name: &str) -> Result<Command, String> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(format!("{name} takes no arguments"))
    }
}

pub(crate) fn help_text() -> String {
    [
        "pdfman",
        "",
        "Remembers which PDF reader opens which PDF file.",
        "",
        "Usage:",
        "  pdfman [<file.pdf>]",
        "  pdfman <command> [options]",
        "",
        "Commands:",
        "  list [--reader <id|name>] [--search <text>] [--all]",
        "                              Show recent files (default reader unless given).",
        "  open <path> [--reader <id|name>]",
        "                              Open a file, tracking it first if needed.",
        "  add <path>...               Track PDF files.",
        "  remove <path>               Stop tracking a file.",
        "  assign <path> <id|name>     Open a file with a specific reader from now on.",
        "  scan                        Look for new PDFs in the recent folders.",
        "  reveal <path>               Show a file in the file manager.",
        "  readers                     List configured readers.",
        "  reader-add <exe> [--name <name>]",
        "  reader-remove <id|name>",
        "  reader-default <id|name>",
        "  reader-rename <id|name> <name>",
        "  config [--max-recent <n>] [--theme light|dark|system]",
        "         [--notifications on|off] [--auto-open on|off]",
        "         [--folder-add <dir>] [--folder-remove <dir>]",
        "",
        "Data lives under the OS config directory in PDFManager/",
        "(override the base with PDFMAN_CONFIG_HOME).",
    ]
    .join("\n")
}
