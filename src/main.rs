mod app;
mod help;
mod jumpto;
mod page;
mod theme;
use crate::app::{App, StatusLine};
use crate::jumpto::YMD_FMT;
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use monthgrid::{CalendarGrid, GridConfig};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use time::{Date, Duration, Month, OffsetDateTime};

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(RunOptions),
    Help,
    Version,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct RunOptions {
    config: Option<PathBuf>,
    log_file: Option<PathBuf>,
    today: Option<Date>,
    range: Option<(Date, Date)>,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = RunOptions::default();
        let mut dates = Vec::new();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('c') | Arg::Long("config") => {
                    opts.config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Long("log") => opts.log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Long("today") => opts.today = Some(parse_ymd(parser.value()?.string()?)?),
                Arg::Value(value) if dates.len() < 2 => dates.push(parse_ymd(value.string()?)?),
                _ => return Err(arg.unexpected()),
            }
        }
        match dates[..] {
            [] => (),
            [start, end] => opts.range = Some((start, end)),
            _ => return Err(lexopt::Error::from("START and END must be given together")),
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => opts.run(),
            Command::Help => {
                println!("Usage: monthgrid [<options>] [START END]");
                println!();
                println!("Page through a month-grid calendar, selecting days and viewing events");
                println!();
                println!("START and END are YYYY-MM-DD dates; END is exclusive.");
                println!();
                println!("Options:");
                println!("  -c, --config FILE   Read grid settings and events from a TOML file");
                println!("      --log FILE      Write log messages to FILE");
                println!("      --today DATE    Treat DATE as the current date");
                println!("  -h, --help          Display this help message and exit");
                println!("  -V, --version       Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

impl RunOptions {
    fn run(self) -> anyhow::Result<()> {
        init_logging(self.log_file.as_deref())?;
        let mut config = match self.config {
            Some(ref path) => GridConfig::from_path(path).context("failed to load configuration")?,
            None => GridConfig::default(),
        };
        if let Some((start, end)) = self.range {
            config.start = Some(start.midnight().assume_utc());
            config.end = Some(end.midnight().assume_utc());
        } else if config.start.is_none() && config.end.is_none() {
            let year = OffsetDateTime::now_utc().year();
            let start = Date::from_calendar_date(year, Month::January, 1)
                .context("failed to determine current year")?;
            let end = Date::from_calendar_date(year + 1, Month::January, 1)
                .context("failed to determine next year")?;
            config.start = Some(start.midnight().assume_utc());
            config.end = Some(end.midnight().assume_utc());
        }
        let mut grid = CalendarGrid::new(config.clone(), StatusLine::default());
        if let Some(today) = self.today {
            grid = grid.with_now(today.midnight().assume_utc() + Duration::hours(12));
        }
        config.configure(&mut grid);
        with_terminal(|mut terminal| {
            terminal.hide_cursor().context("failed to hide cursor")?;
            App::new(grid)
                .run(&mut terminal)
                .context("failed to run calendar")?;
            Ok(())
        })
    }
}

fn parse_ymd(value: String) -> Result<Date, lexopt::Error> {
    match Date::parse(&value, &YMD_FMT) {
        Ok(d) => Ok(d),
        Err(e) => Err(lexopt::Error::ParsingFailed {
            value,
            error: Box::new(e),
        }),
    }
}

// The terminal belongs to the calendar, so only log when given somewhere
// else to write to (or when RUST_LOG asks for it)
fn default_log_filter(log_file: Option<&Path>) -> &'static str {
    if log_file.is_some() {
        "debug"
    } else {
        "off"
    }
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(log_file)),
    );
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("failed to initialize logging")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
