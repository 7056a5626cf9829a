use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dicom_viewer::{
    Command, ConsoleSurface, DicomDirectorySource, Outcome, SlotController, SlotId,
    SoftwareRenderer, SortBy, ViewerConfig, ViewerEvent, console::HELP,
};

#[derive(Parser, Debug)]
#[command(version, about = "Orthogonal slice and volume viewer for DICOM series")]
struct Cli {
    /// Series loaded into slot 1 at startup
    #[arg(long)]
    slot1: Option<PathBuf>,

    /// Series loaded into slot 2 at startup
    #[arg(long)]
    slot2: Option<PathBuf>,

    /// Slice ordering: image-position, table-position, instance-number or none
    #[arg(long, default_value = "image-position")]
    sort_by: SortBy,

    /// Width and height of each display surface in pixels
    #[arg(long, default_value_t = 400, value_parser = clap::value_parser!(u32).range(1..=4096))]
    surface_size: u32,

    /// Log filter, e.g. `debug` or `dicom_viewer=trace`
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log)),
        )
        .with_writer(io::stderr)
        .init();

    let config = ViewerConfig {
        sort_by: cli.sort_by,
        surface_size: (cli.surface_size, cli.surface_size),
        ..ViewerConfig::default()
    };
    let (width, height) = config.surface_size;
    let mut viewer = SlotController::new(
        DicomDirectorySource::new(config.sort_by),
        SoftwareRenderer::new(width, height),
        ConsoleSurface::new(),
        config,
    );

    let startup = [(SlotId::Slot1, cli.slot1), (SlotId::Slot2, cli.slot2)];
    for (slot, directory) in startup {
        if let Some(directory) = directory {
            dispatch(&mut viewer, ViewerEvent::LoadRequested { slot, directory });
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        match line?.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => writeln!(stdout, "{HELP}")?,
            Ok(Command::Status) => write!(stdout, "{}", viewer.ui())?,
            Ok(Command::Event(event)) => dispatch(&mut viewer, event),
            Err(err) => writeln!(stdout, "{err}")?,
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}

type Viewer = SlotController<DicomDirectorySource, SoftwareRenderer, ConsoleSurface>;

fn dispatch(viewer: &mut Viewer, event: ViewerEvent) {
    match viewer.handle(event) {
        Ok(Outcome::Applied) => {}
        Ok(Outcome::Ignored(reason)) => info!(?reason, "event ignored"),
        Err(err) => error!("{err}"),
    }
}
