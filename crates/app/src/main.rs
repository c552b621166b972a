use std::fmt;
use std::path::PathBuf;

use mathquiz_core::model::{ConfigurationError, Difficulty, Subject};
use storage::repository::Storage;

mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidSeed { raw: String },
    Configuration(ConfigurationError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::Configuration(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<ConfigurationError> for ArgsError {
    fn from(err: ConfigurationError) -> Self {
        Self::Configuration(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

pub(crate) struct Args {
    pub(crate) db_url: String,
    pub(crate) catalog: Option<PathBuf>,
    pub(crate) subjects: Vec<Subject>,
    pub(crate) difficulty: Difficulty,
    pub(crate) seed: Option<u64>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  mathquiz play   [--db <sqlite_url>] [--catalog <file.json>]");
    eprintln!("                  [--subjects algebra,equations,calculus] [--difficulty easy|hard]");
    eprintln!("                  [--seed <u64>]");
    eprintln!("  mathquiz scores [--db <sqlite_url>]");
    eprintln!();
    eprintln!("While playing, type an answer and press enter.");
    eprintln!("  :skip  draw another question");
    eprintln!("  :quit  end the session early");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://scores.db");
    eprintln!("  --subjects algebra,equations,calculus");
    eprintln!("  --difficulty easy");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MATHQUIZ_DB_URL, MATHQUIZ_CATALOG, RUST_LOG (default warn)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Scores,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "scores" => Some(Self::Scores),
            _ => None,
        }
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("MATHQUIZ_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("scores.db".into()), normalize_sqlite_url);
        let mut catalog = std::env::var_os("MATHQUIZ_CATALOG").map(PathBuf::from);
        let mut subjects = Subject::ALL.to_vec();
        let mut difficulty = Difficulty::Easy;
        let mut seed = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--catalog" => {
                    catalog = Some(PathBuf::from(require_value(args, "--catalog")?));
                }
                "--subjects" => {
                    subjects = parse_subjects(&require_value(args, "--subjects")?)?;
                }
                "--difficulty" => {
                    difficulty = require_value(args, "--difficulty")?.parse::<Difficulty>()?;
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            catalog,
            subjects,
            difficulty,
            seed,
        })
    }
}

/// Comma-separated subject names. An empty list is passed through so the session can
/// report it when starting.
fn parse_subjects(raw: &str) -> Result<Vec<Subject>, ArgsError> {
    let mut out: Vec<Subject> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let subject: Subject = part.parse()?;
        if !out.contains(&subject) {
            out.push(subject);
        }
    }
    Ok(out)
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means play.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    tracing::debug!(db_url = %parsed.db_url, ?cmd, "storage ready");

    match cmd {
        Command::Play => terminal::play(&parsed, &storage).await,
        Command::Scores => terminal::print_scores(&storage).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn subjects_are_parsed_case_insensitively_without_duplicates() {
        let subjects = parse_subjects("Algebra, calculus,algebra").unwrap();
        assert_eq!(subjects, [Subject::Algebra, Subject::Calculus]);
    }

    #[test]
    fn empty_subject_list_is_passed_through() {
        assert!(parse_subjects(" , ").unwrap().is_empty());
    }

    #[test]
    fn unknown_subject_is_rejected() {
        assert!(matches!(
            parse_subjects("geometry"),
            Err(ArgsError::Configuration(ConfigurationError::UnknownSubject(_)))
        ));
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--db",
            "sqlite::memory:",
            "--difficulty",
            "hard",
            "--subjects",
            "equations",
            "--seed",
            "42",
        ])
        .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.difficulty, Difficulty::Hard);
        assert_eq!(args.subjects, [Subject::Equations]);
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn unknown_difficulty_is_a_configuration_error() {
        assert!(matches!(
            parse(&["--difficulty", "medium"]),
            Err(ArgsError::Configuration(ConfigurationError::UnknownDifficulty(_)))
        ));
    }

    #[test]
    fn missing_flag_value_is_reported() {
        assert!(matches!(
            parse(&["--seed"]),
            Err(ArgsError::MissingValue { flag: "--seed" })
        ));
    }

    #[test]
    fn relative_db_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/scores.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/scores.db"));
    }
}
