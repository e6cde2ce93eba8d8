//! alarmtab command-line front end.
//!
//! Creates, lists, and edits CODESYS alarm tables from the shell.
//!
//! # Usage
//!
//! ```text
//! alarmtab --file <PATH> new
//! alarmtab --file <PATH> list
//! alarmtab --file <PATH> show <ID>
//! alarmtab --file <PATH> add --id <ID> [--details1 <VAR>] [--message <TEXT>] ...
//! alarmtab --file <PATH> edit <ORIGINAL_ID> [--id <NEW_ID>] [--message <TEXT>] ...
//! alarmtab --file <PATH> delete <ID>
//! ```
//!
//! Every command except `new` adopts the file first, creating a header-only table when
//! it does not exist. Log verbosity follows `RUST_LOG` (default `warn`).

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};

use alarmtab::types::{ALARM_CLASSES, CONDITION_VALUES, OBSERVATION_TYPES};
use alarmtab::{AlarmEntry, Error, Outcome, SCHEMA, Session, Store};

/// Command-line editor for CODESYS alarm tables.
#[derive(Parser, Debug)]
#[command(name = "alarmtab", version, about)]
struct Cli {
    /// Alarm table file (UTF-16LE, `;`-delimited).
    #[arg(long, short)]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a fresh table, overwriting any existing file.
    New,
    /// Print every record as `ID  Condition  Class  Message`, numeric ids first.
    List,
    /// Print every stored column of one record.
    Show {
        /// Identifier of the record.
        id: String,
    },
    /// Add a record with a new, unique id.
    Add(AddArgs),
    /// Change a record; omitted flags keep their stored values.
    Edit {
        /// Identifier of the record to change.
        original_id: String,
        #[command(flatten)]
        changes: EditArgs,
    },
    /// Delete a record.
    Delete {
        /// Identifier of the record.
        id: String,
    },
}

#[derive(Args, Debug)]
struct AddArgs {
    /// Unique alarm identifier.
    #[arg(long)]
    id: String,
    /// Observed variable, e.g. `GVL.bMotorFault`.
    #[arg(long, default_value = "")]
    details1: String,
    #[arg(long, default_value = "Digital", value_parser = PossibleValuesParser::new(OBSERVATION_TYPES))]
    observation_type: String,
    /// Value the variable is compared against.
    #[arg(long, default_value = "TRUE", value_parser = PossibleValuesParser::new(CONDITION_VALUES))]
    details3: String,
    #[arg(long, default_value = "Error", value_parser = PossibleValuesParser::new(ALARM_CLASSES))]
    class: String,
    /// Alarm message text.
    #[arg(long, default_value = "")]
    message: String,
}

impl From<AddArgs> for AlarmEntry {
    fn from(args: AddArgs) -> Self {
        AlarmEntry {
            id: args.id,
            observation_type: args.observation_type,
            details1: args.details1.trim().to_string(),
            details3: args.details3,
            class: args.class,
            message: args.message.trim().to_string(),
            ..AlarmEntry::default()
        }
    }
}

#[derive(Args, Debug, Default)]
struct EditArgs {
    /// New identifier.
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    details1: Option<String>,
    #[arg(long, value_parser = PossibleValuesParser::new(OBSERVATION_TYPES))]
    observation_type: Option<String>,
    #[arg(long, value_parser = PossibleValuesParser::new(CONDITION_VALUES))]
    details3: Option<String>,
    #[arg(long, value_parser = PossibleValuesParser::new(ALARM_CLASSES))]
    class: Option<String>,
    #[arg(long)]
    message: Option<String>,
}

impl EditArgs {
    /// Overlay the given flags on the stored values.
    fn apply(self, entry: &mut AlarmEntry) {
        if let Some(id) = self.id {
            entry.id = id;
        }
        if let Some(details1) = self.details1 {
            entry.details1 = details1.trim().to_string();
        }
        if let Some(observation_type) = self.observation_type {
            entry.observation_type = observation_type;
        }
        if let Some(details3) = self.details3 {
            entry.details3 = details3;
        }
        if let Some(class) = self.class {
            entry.class = class;
        }
        if let Some(message) = self.message {
            entry.message = message.trim().to_string();
        }
    }
}

/// Initialize the global `tracing` subscriber with an `EnvFilter`.
///
/// Reads `RUST_LOG`; defaults to `"warn"` so normal command output stays clean. Uses
/// `try_init()` so repeated calls are a silent no-op.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute one command and return the text to print on success.
fn run(cli: Cli) -> Result<String, Error> {
    let mut session = Session::new();

    // `new` overwrites; everything else adopts the file as-is.
    if !matches!(cli.command, Command::New) {
        session.open(&cli.file)?;
    }

    let out = match cli.command {
        Command::New => {
            session.create(&cli.file)?;
            format!("created {}\n", cli.file.display())
        }
        Command::List => {
            let rows = session.rows();
            std::iter::once("ID\tCondition\tClass\tMessage".to_string())
                .chain(rows.iter().map(ToString::to_string))
                .map(|line| line + "\n")
                .collect()
        }
        Command::Show { id } => {
            let record = Store::new(&cli.file).find(&id)?;
            SCHEMA
                .iter()
                .zip(&record.fields)
                .map(|(name, value)| format!("{name}: {value}\n"))
                .collect()
        }
        Command::Add(args) => {
            let entry = AlarmEntry::from(args);
            let id = entry.id.trim().to_string();
            session.add(entry)?;
            format!("added {id}\n")
        }
        Command::Edit {
            original_id,
            changes,
        } => {
            let mut entry = session.begin_edit(&original_id)?;
            changes.apply(&mut entry);
            let id = entry.id.trim().to_string();
            session.save(entry)?;
            format!("saved {id}\n")
        }
        Command::Delete { id } => {
            session.delete(&id)?;
            format!("deleted {id}\n")
        }
    };
    Ok(out)
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let file = cli.file.clone();

    let result = run(cli);
    let outcome = Outcome::from(&result);
    tracing::debug!(%outcome, path = %file.display(), "command finished");

    let output = result
        .map_err(|e| anyhow::Error::new(e).context(format!("{outcome}: {}", file.display())))?;
    print!("{output}");
    Ok(())
}
