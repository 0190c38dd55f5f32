//! This is the main entry point for the FAT32 recovery tool.
//!
//! The program provides an interactive command-line interface: open a FAT32 device or disk
//! image, list the deleted entries of its root directory and recover them to a destination
//! directory. The exit code is 0 if the last command succeeded and 1 otherwise.

use fat_undelete::commands::Command;
use fat_undelete::traits::LayoutDisplay;
use fat_undelete::{DeletedEntryCatalog, FATError, RecoveryEngine, Volume};
use log::{error, warn};
use std::{
    env,
    fs::File,
    io::{self, Read, Seek, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

/// Errors surfaced by a console command.
#[derive(thiserror::Error, Debug)]
enum CliError {
    /// A command needing a volume was issued before `open`.
    #[error("Open a device or disk image first")]
    NotOpened,
    #[error(transparent)]
    Fat(#[from] FATError),
}

/// Represents the runtime state of the program.
struct RunState<R: Read + Seek> {
    /// The currently opened volume.
    volume: Option<Volume<R>>,
    /// Deleted entries of the opened volume.
    catalog: DeletedEntryCatalog,
    /// Whether the last command failed.
    last_failed: bool,
}

impl<R: Read + Seek> RunState<R> {
    fn new() -> Self {
        Self {
            volume: None,
            catalog: DeletedEntryCatalog::default(),
            last_failed: false,
        }
    }

    fn volume(&self) -> Result<&Volume<R>, CliError> {
        self.volume.as_ref().ok_or(CliError::NotOpened)
    }
}

fn main() -> ExitCode {
    let verbosity = env::args().skip(1).filter(|arg| arg == "-v").count();
    if let Err(err) = stderrlog::new()
        .module(module_path!())
        .module("fat_undelete")
        .verbosity(1 + verbosity)
        .init()
    {
        eprintln!("Failed to initialize logging: {err}");
    }

    let mut run_state: RunState<File> = RunState::new();

    loop {
        print!("> ");
        if let Err(err) = io::stdout().flush() {
            error!("{err}");
        }

        let mut s = String::new();
        match io::stdin().read_line(&mut s) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                error!("Failed to read command: {err}");
                run_state.last_failed = true;
                break;
            }
        }

        let result = match Command::from_string(&s) {
            Command::Open(path) => open_volume(&mut run_state, Path::new(&path)),
            Command::Quit => break,
            Command::List => list(&run_state),
            Command::Layout => layout(&run_state),
            Command::Recover(index, dest) => recover(&mut run_state, index, Path::new(&dest))
                .map(|path| println!("Successfully recovered {}", path.display())),
            Command::Unknown(s) => {
                error!("Unknown command: {s:?}");
                continue;
            }
            Command::Invalid(s) => {
                error!("{s}");
                continue;
            }
            Command::Empty => continue,
        };

        run_state.last_failed = match result {
            Ok(()) => false,
            Err(err) => {
                error!("{err}");
                true
            }
        };
    }

    if run_state.last_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn open_volume(run_state: &mut RunState<File>, path: &Path) -> Result<(), CliError> {
    run_state.volume = None;
    run_state.catalog = DeletedEntryCatalog::default();

    let volume = Volume::open(path)?;
    run_state.catalog = DeletedEntryCatalog::build(&volume)?;
    print!("{}", run_state.catalog);
    run_state.volume = Some(volume);

    Ok(())
}

fn list<R: Read + Seek>(run_state: &RunState<R>) -> Result<(), CliError> {
    run_state.volume()?;
    print!("{}", run_state.catalog);
    Ok(())
}

fn layout<R: Read + Seek>(run_state: &RunState<R>) -> Result<(), CliError> {
    let volume = run_state.volume()?;
    match volume.display_layout(3) {
        Ok(layout) => print!("{layout}"),
        Err(err) => error!("Print layout error: {err}"),
    }
    println!("{}", volume.boot_sector());
    Ok(())
}

fn recover<R: Read + Seek>(
    run_state: &mut RunState<R>,
    index: usize,
    dest: &Path,
) -> Result<PathBuf, CliError> {
    let volume = run_state.volume.as_ref().ok_or(CliError::NotOpened)?;

    let chain = run_state.catalog.get(index)?;
    warn!(
        "Writing to an output directory on the scanned volume can make deleted entries unrecoverable."
    );

    let result = RecoveryEngine::new(volume).recover(chain, dest);

    // The destination may live on the scanned volume: indices are only valid for a fresh scan.
    if let Err(err) = run_state.catalog.rebuild(volume) {
        error!("Failed to rescan the deleted entries: {err}");
    }

    Ok(result?)
}
