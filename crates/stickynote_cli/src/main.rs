//! Terminal host for a file-backed sticky note board.
//!
//! # Responsibility
//! - Map board surface actions onto `stickynote_core::Board` operations.
//! - Resolve data/log directories from flags, environment and config file.
//! - Keep output deterministic (plain lines or `--json`).

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use stickynote_core::{
    init_logging, Board, BoardConfig, FileStore, Note, NoteId, PersistStatus, Position,
};

#[derive(Parser, Debug)]
#[command(
    name = "stickynote",
    version,
    about = "Sticky note board backed by a local data directory",
    arg_required_else_help = true
)]
struct Cli {
    /// Board data directory (one file per persisted key).
    #[arg(long, global = true, env = "STICKYNOTE_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, env = "STICKYNOTE_LOG_DIR", value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "STICKYNOTE_LOG_LEVEL", value_name = "LEVEL")]
    log_level: Option<String>,

    /// Machine-readable JSON output.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List notes in board order.
    #[command(alias = "ls")]
    List,
    /// Add a blank note.
    #[command(alias = "new")]
    Add,
    /// Replace a note's text.
    Text { id: String, text: String },
    /// Move a note's origin.
    Move {
        id: String,
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
    },
    /// Replay a pointer drag: grab once, then move through each `--to` point.
    Drag(DragArgs),
    /// Advance a note's color (yellow, red, blue, green).
    Color { id: String },
    /// Delete a note.
    #[command(alias = "rm")]
    Delete { id: String },
    /// Show or toggle dark mode.
    DarkMode {
        #[arg(long, default_value_t = false)]
        toggle: bool,
    },
}

#[derive(Args, Debug)]
struct DragArgs {
    id: String,
    /// Pointer position at grab time.
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_hyphen_values = true)]
    grab: Vec<f64>,
    /// Pointer positions during the drag, in order.
    #[arg(
        long = "to",
        num_args = 2,
        value_names = ["X", "Y"],
        allow_hyphen_values = true,
        required = true
    )]
    to: Vec<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).context("failed to initialize logging")?;
    }

    let storage = FileStore::open(&config.data_dir)
        .with_context(|| format!("failed to open board at `{}`", config.data_dir.display()))?;
    let mut board = Board::open(storage);
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );

    run(&mut board, cli.command, cli.json)
}

fn resolve_config(cli: &Cli) -> Result<BoardConfig> {
    let data_dir = match &cli.data_dir {
        Some(dir) => absolutize(dir)?,
        None => BoardConfig::default().data_dir,
    };
    let mut config = BoardConfig::load(&data_dir)?;
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(absolutize(log_dir)?);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(path))
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::List => "list",
        Command::Add => "add",
        Command::Text { .. } => "text",
        Command::Move { .. } => "move",
        Command::Drag(_) => "drag",
        Command::Color { .. } => "color",
        Command::Delete { .. } => "delete",
        Command::DarkMode { .. } => "dark_mode",
    }
}

fn run(board: &mut Board<FileStore>, command: Command, json: bool) -> Result<()> {
    match command {
        Command::List => {
            print_notes(board.store().notes(), json)?;
        }
        Command::Add => {
            let (note, status) = board.add_note();
            ensure_saved(status)?;
            print_note(&note, json)?;
        }
        Command::Text { id, text } => {
            let id = NoteId::from(id);
            ensure_applied(board.set_text(&id, text), &id)?;
            print_existing(board, &id, json)?;
        }
        Command::Move { id, x, y } => {
            let id = NoteId::from(id);
            let position = finite_point(x, y)?;
            ensure_applied(board.set_position(&id, position), &id)?;
            print_existing(board, &id, json)?;
        }
        Command::Drag(args) => {
            let id = NoteId::from(args.id);
            let grab = match args.grab.as_slice() {
                [x, y] => finite_point(*x, *y)?,
                _ => match board.store().note(&id) {
                    Some(note) => note.position,
                    None => bail!("note not found: {id}"),
                },
            };
            let path = args
                .to
                .chunks_exact(2)
                .map(|point| finite_point(point[0], point[1]))
                .collect::<Result<Vec<_>>>()?;
            if !board.grab(&id, grab) {
                bail!("note not found: {id}");
            }
            for point in path {
                if let Some(status) = board.drag_to(&id, point) {
                    ensure_saved(status)?;
                }
            }
            board.release(&id);
            print_existing(board, &id, json)?;
        }
        Command::Color { id } => {
            let id = NoteId::from(id);
            ensure_applied(board.cycle_color(&id), &id)?;
            print_existing(board, &id, json)?;
        }
        Command::Delete { id } => {
            let id = NoteId::from(id);
            ensure_applied(board.delete(&id), &id)?;
            if json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("deleted {id}");
            }
        }
        Command::DarkMode { toggle } => {
            if toggle {
                ensure_saved(board.toggle_dark_mode())?;
            }
            let dark_mode = board.store().dark_mode();
            if json {
                println!("{}", serde_json::json!({ "darkMode": dark_mode }));
            } else {
                println!("dark mode: {}", if dark_mode { "on" } else { "off" });
            }
        }
    }
    Ok(())
}

fn finite_point(x: f64, y: f64) -> Result<Position> {
    let point = Position::new(x, y);
    if !point.is_finite() {
        bail!("coordinates must be finite numbers, got ({x}, {y})");
    }
    Ok(point)
}

/// One-shot process: an unsaved change is lost at exit, so report it as an error.
fn ensure_saved(status: PersistStatus) -> Result<()> {
    status
        .into_result()
        .context("change applied but could not be saved")
}

fn ensure_applied(status: PersistStatus, id: &NoteId) -> Result<()> {
    if status.is_unchanged() {
        bail!("note not found: {id}");
    }
    ensure_saved(status)
}

fn print_existing(board: &Board<FileStore>, id: &NoteId, json: bool) -> Result<()> {
    match board.store().note(id) {
        Some(note) => print_note(note, json),
        None => bail!("note not found: {id}"),
    }
}

fn print_note(note: &Note, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(note)?);
    } else {
        println!("{}", format_note(note));
    }
    Ok(())
}

fn print_notes(notes: &[Note], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(notes)?);
        return Ok(());
    }
    if notes.is_empty() {
        println!("(no notes)");
    }
    for note in notes {
        println!("{}", format_note(note));
    }
    Ok(())
}

fn format_note(note: &Note) -> String {
    format!(
        "{}\t{}\t({}, {})\t{}",
        note.id,
        note.color,
        note.position.x,
        note.position.y,
        note.text.replace('\n', "\\n")
    )
}

#[cfg(test)]
mod tests {
    use super::{finite_point, format_note, Cli, Command};
    use clap::Parser;
    use stickynote_core::{Note, NoteId, Position};

    #[test]
    fn drag_command_parses_grab_and_path() {
        let cli = Cli::try_parse_from([
            "stickynote", "drag", "1", "--grab", "130", "140", "--to", "230", "190", "--to",
            "-10", "5",
        ])
        .unwrap();
        match cli.command {
            Command::Drag(args) => {
                assert_eq!(args.grab, vec![130.0, 140.0]);
                assert_eq!(args.to, vec![230.0, 190.0, -10.0, 5.0]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn move_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["stickynote", "move", "1", "-5", "-7.5"]).unwrap();
        assert!(matches!(cli.command, Command::Move { x, y, .. } if x == -5.0 && y == -7.5));
    }

    #[test]
    fn note_line_escapes_newlines() {
        let mut note = Note::new(NoteId::from("a"));
        note.text = "one\ntwo".to_string();
        note.position = Position::new(1.5, -2.0);
        assert_eq!(format_note(&note), "a\tyellow\t(1.5, -2)\tone\\ntwo");
    }

    #[test]
    fn move_rejects_non_finite_coordinates_before_touching_board() {
        let cli = Cli::try_parse_from(["stickynote", "move", "1", "inf", "0"]).unwrap();
        let Command::Move { x, y, .. } = cli.command else {
            panic!("expected move command");
        };
        assert!(finite_point(x, y).is_err());
        assert!(finite_point(f64::NAN, 1.0).is_err());
        assert_eq!(finite_point(-3.0, 4.5).unwrap(), Position::new(-3.0, 4.5));
    }
}
