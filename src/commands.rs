//! This module defines the `Command` enum and its associated methods for parsing
//! and handling user commands in the FAT32 recovery tool.

/// Represents a user command in the FAT32 recovery tool.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Command to quit the program.
    Quit,
    /// Command to open a device or disk image, encapsulating its path.
    Open(String),
    /// List the deleted entries of the root directory.
    List,
    /// Print the layout of the volume.
    Layout,
    /// Recover the entry at a 1-based index into a destination directory.
    Recover(usize, String),
    /// Command for an unknown input, encapsulating the raw input as a `String`.
    Unknown(String),
    /// Command for invalid input, encapsulating an error message as a `String`.
    Invalid(String),
    /// Command for an empty input.
    Empty,
}

impl Command {
    /// Parses a string into a `Command` instance.
    ///
    /// # Parameters
    /// - `s`: A string slice representing the user input.
    ///
    /// # Returns
    /// - `Command::Quit` if the input is "quit".
    /// - `Command::Open` with the path if the input is "open" followed by an argument.
    /// - `Command::List` if the input is "list".
    /// - `Command::Layout` if the input is "layout".
    /// - `Command::Recover` if the input is "recover" followed by an index and a directory.
    /// - `Command::Unknown` if the input does not match any known command.
    /// - `Command::Invalid` if the arguments of a known command are missing or malformed.
    /// - `Command::Empty` if the input is empty or contains only whitespace.
    pub fn from_string(s: &str) -> Self {
        let mut parts = s.split_whitespace();
        match parts.next() {
            Some("quit") => Command::Quit,
            Some("open") => match parts.next() {
                Some(arg) => Command::Open(arg.to_string()),
                None => Command::Invalid(String::from(
                    "Missing arg: 'open' expects the path to a device or disk image.",
                )),
            },
            Some("list") => Command::List,
            Some("layout") => Command::Layout,
            Some("recover") => match (parts.next(), parts.next()) {
                (Some(index), Some(dest)) => match index.parse::<usize>() {
                    Ok(index) => Command::Recover(index, dest.to_string()),
                    Err(_) => Command::Invalid(String::from(
                        "Arg parsing error: 'recover' expects an unsigned integer index.",
                    )),
                },
                _ => Command::Invalid(String::from(
                    "Missing arg: 'recover' expects an index and a destination directory.",
                )),
            },
            Some(other) => Command::Unknown(other.to_string()),
            None => Command::Empty,
        }
    }
}
