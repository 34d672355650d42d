//! This module defines the `Command` enum and its associated methods for parsing
//! and handling user commands in the FAT12 inspection tool.
//!
//! The `Command` enum represents various commands that the user can input,
//! such as quitting the program, opening an image, listing files, extracting a file,
//! or handling invalid or unknown commands.

/// Represents a user command in the FAT12 inspection tool.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Command to quit the program.
    Quit,
    /// Command to open a disk image, encapsulating the file path as a `String`.
    Open(String),
    /// Print the boot parameter block.
    Bpb,
    /// Print the entries of the allocation table.
    Fat,
    /// List the names of the root directory entries.
    List,
    /// List the root directory entries with their size, timestamp and attributes.
    Details,
    /// Print the layout of the volume.
    Layout,
    /// Write the content of a file to stdout.
    Get(String),
    /// Write the content of a file to stdout, with the slack of its last cluster.
    Raw(String),
    /// Set the byte offset of the volume for the next `open`.
    Offset(u64),
    /// Skip the BPB validation
    Skip,
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
    /// - `Command::Open` with the file path if the input starts with "open" followed by a valid argument.
    /// - `Command::Bpb`, `Command::Fat`, `Command::List`, `Command::Details` and `Command::Layout`
    ///   for "bpb", "fat", "ls", "details" and "layout".
    /// - `Command::Get` or `Command::Raw` with the file name for "get" and "raw".
    /// - `Command::Offset` if the input is "offset" followed by an unsigned integer.
    /// - `Command::Skip` if the input is "skip".
    /// - `Command::Unknown` if the input does not match any known command.
    /// - `Command::Invalid` if a command is missing its argument or the argument can't be parsed.
    /// - `Command::Empty` if the input is empty or contains only whitespace.
    pub fn from_string(s: &str) -> Self {
        let mut parts = s.split_whitespace();
        match parts.next() {
            Some("quit") => Command::Quit,
            Some("open") => match parts.next() {
                Some(arg) => Command::Open(arg.to_string()),
                None => Command::Invalid(String::from(
                    "Missing arg: 'open' expects the path to a '.img' file.",
                )),
            },
            Some("bpb") => Command::Bpb,
            Some("fat") => Command::Fat,
            Some("ls") => Command::List,
            Some("details") => Command::Details,
            Some("layout") => Command::Layout,
            Some("get") => match parts.next() {
                Some(arg) => Command::Get(arg.to_string()),
                None => Command::Invalid(String::from(
                    "Missing arg: 'get' expects a file name such as HELLO.TXT.",
                )),
            },
            Some("raw") => match parts.next() {
                Some(arg) => Command::Raw(arg.to_string()),
                None => Command::Invalid(String::from(
                    "Missing arg: 'raw' expects a file name such as HELLO.TXT.",
                )),
            },
            Some("offset") => match parts.next() {
                Some(arg) => match arg.parse::<u64>() {
                    Ok(offset) => Command::Offset(offset),
                    Err(_) => Command::Invalid(String::from(
                        "Arg parsing error: 'offset' expects an unsigned integer.",
                    )),
                },
                None => Command::Invalid(String::from(
                    "Missing arg: 'offset' expects the byte offset of the volume.",
                )),
            },
            Some("skip") => Command::Skip,
            Some(other) => Command::Unknown(other.to_string()),
            None => Command::Empty,
        }
    }
}
