//! This is the main entry point for the FAT12 inspection tool.
//!
//! The program provides an interactive command-line interface for analyzing FAT12 disk images.
//! Users can open disk images, print their BPB, FAT and root directory, extract files,
//! and quit the program using commands.

use fat12_inspect::commands::Command;
use fat12_inspect::filesystem::fat_table::FatEntry;
use fat12_inspect::traits::LayoutDisplay;
use fat12_inspect::{ExtractMode, VolumeSession};
use log::{error, warn};
use std::{
    fs::File,
    io::{self, Write},
};

/// Represents the runtime state of the program.
///
/// This struct keeps track of the currently opened image and its decoded volume.
struct RunState {
    /// The currently opened disk image.
    image: Option<File>,
    /// The volume decoded from the image.
    session: Option<VolumeSession>,
    /// Byte offset of the volume used by the next `open`
    volume_offset: u64,
    /// Enable the validation of the bpb
    bpb_validation: bool,
}

/// Number of FAT entries printed per line.
const FAT_ENTRIES_PER_LINE: usize = 4;

fn main() {
    stderrlog::new()
        .module(module_path!())
        .module("fat12_inspect")
        .verbosity(2usize)
        .init()
        .unwrap();

    let mut run_state = RunState {
        image: None,
        session: None,
        volume_offset: 0,
        bpb_validation: true,
    };

    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut s = String::new();
        match io::stdin().read_line(&mut s) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                error!("Failed to read command: {err}");
                break;
            }
        }

        match Command::from_string(&s) {
            Command::Open(path) => open_image(&mut run_state, &path),
            Command::Quit => break,
            Command::Bpb => {
                if let Some(session) = &run_state.session {
                    print!("{}", session.bpb());
                } else {
                    warn!("Open disk image first");
                }
            }
            Command::Fat => {
                if let Some(session) = &run_state.session {
                    print_fat(session);
                } else {
                    warn!("Open disk image first");
                }
            }
            Command::List => print_entries(&run_state, false),
            Command::Details => print_entries(&run_state, true),
            Command::Layout => match &run_state.session {
                Some(session) => match session.display_layout(3) {
                    Ok(layout) => print!("{layout}"),
                    Err(e) => error!("Print layout error: {e}"),
                },
                None => warn!("Open disk image first"),
            },
            Command::Get(name) => extract_file(&mut run_state, &name, ExtractMode::Exact),
            Command::Raw(name) => extract_file(&mut run_state, &name, ExtractMode::WholeClusters),
            Command::Offset(offset) => run_state.volume_offset = offset,
            Command::Skip => run_state.bpb_validation = false,
            Command::Unknown(s) => error!("Unknown command: {s:?}"),
            Command::Invalid(s) => error!("{s}"),
            Command::Empty => {}
        }
    }
}

fn open_image(run_state: &mut RunState, path: &str) {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            error!("Can't open {path}: {err}");
            return;
        }
    };

    match VolumeSession::open(
        &mut file,
        run_state.volume_offset,
        run_state.bpb_validation,
    ) {
        Ok(session) => {
            run_state.image = Some(file);
            run_state.session = Some(session);
        }
        Err(err) => error!("{err}"),
    }
}

fn print_fat(session: &VolumeSession) {
    for (cluster, value) in session.fat().entries().enumerate() {
        if cluster > 0 && cluster % FAT_ENTRIES_PER_LINE == 0 {
            println!();
        }
        print!("{:<5}: {:<18}", cluster, FatEntry::classify(value).to_string());
    }
    println!();
}

fn print_entries(run_state: &RunState, details: bool) {
    let Some(session) = &run_state.session else {
        warn!("Open disk image first");
        return;
    };

    for entry in session.entries() {
        if details {
            println!("{entry:#}");
        } else {
            println!("{entry}");
        }
    }
}

fn extract_file(run_state: &mut RunState, name: &str, mode: ExtractMode) {
    let (Some(session), Some(image)) = (&run_state.session, &mut run_state.image) else {
        warn!("Open disk image first");
        return;
    };

    let stream = match session.open_file(image, name, mode) {
        Ok(stream) => stream,
        Err(err) => {
            error!("{err}");
            return;
        }
    };

    let mut stdout = io::stdout().lock();
    for chunk in stream {
        let written = match chunk {
            Ok(data) => stdout.write_all(&data),
            Err(err) => {
                error!("Extraction of {name} failed: {err}");
                break;
            }
        };
        if let Err(err) = written {
            error!("Failed to write to stdout: {err}");
            break;
        }
    }
    if let Err(err) = stdout.flush() {
        error!("Failed to write to stdout: {err}");
    }
}
