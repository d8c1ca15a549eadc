use anyhow::Context;
use clap::{Parser, ValueEnum};
use minefield_core as game;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

mod render;
mod settings;
mod shell;

#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
enum OrderArg {
    SlowestFirst,
    FastestFirst,
}

impl From<OrderArg> for game::RankOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::SlowestFirst => Self::SlowestFirst,
            OrderArg::FastestFirst => Self::FastestFirst,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
enum HistoryArg {
    Seeded,
    Persisted,
}

impl From<HistoryArg> for game::HistorySource {
    fn from(value: HistoryArg) -> Self {
        match value {
            HistoryArg::Seeded => Self::Seeded,
            HistoryArg::Persisted => Self::Persisted,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Number of rows [default: 8]
    #[arg(short, long)]
    rows: Option<game::Coord>,

    /// Number of columns [default: 8]
    #[arg(short, long)]
    cols: Option<game::Coord>,

    /// Number of mines [default: 10]
    #[arg(short, long)]
    mines: Option<game::CellCount>,

    /// Player name, asked for interactively when missing
    #[arg(short, long)]
    name: Option<String>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// TOML file with default settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Leaderboard file [default: leaderboard.txt]
    #[arg(long)]
    leaderboard: Option<PathBuf>,

    /// Leaderboard ranking direction
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Where the leaderboard history comes from
    #[arg(long, value_enum)]
    history: Option<HistoryArg>,

    /// Flags block left clicks and the cascade
    #[arg(long)]
    protect_flags: bool,

    /// Emit updates as JSON lines instead of drawing the board
    #[arg(long)]
    json: bool,
}

/// Command-line flags layered over the settings file.
#[derive(Clone, Debug, PartialEq)]
struct Options {
    config: game::GameConfig,
    flag_policy: game::FlagPolicy,
    store: game::LeaderboardStore,
}

impl Options {
    fn resolve(args: &Args, settings: settings::Settings) -> anyhow::Result<Self> {
        let defaults = game::GameConfig::DEFAULT;
        let size = (
            args.rows.or(settings.rows).unwrap_or(defaults.rows()),
            args.cols.or(settings.cols).unwrap_or(defaults.cols()),
        );
        let mines = args.mines.or(settings.mines).unwrap_or(defaults.mines);
        let config = game::GameConfig::new(size, mines).context("cannot start a game")?;

        let flag_policy = if args.protect_flags || settings.protect_flags.unwrap_or(false) {
            game::FlagPolicy::Protect
        } else {
            game::FlagPolicy::RevealThrough
        };

        let leaderboard = settings.leaderboard;
        let path = args
            .leaderboard
            .clone()
            .or(leaderboard.path)
            .unwrap_or_else(|| PathBuf::from(game::DEFAULT_LEADERBOARD_PATH));
        let order = args
            .order
            .map(Into::into)
            .or(leaderboard.order)
            .unwrap_or_default();
        let history = args
            .history
            .map(Into::into)
            .or(leaderboard.history)
            .unwrap_or_default();
        let store = game::LeaderboardStore::new(path)
            .with_order(order)
            .with_history(history);

        Ok(Self {
            config,
            flag_policy,
            store,
        })
    }
}

fn random_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(seed_from_elapsed)
        .unwrap_or_default()
}

/// Folds the whole seconds and the sub-second nanos into one seed without truncating either.
fn seed_from_elapsed(elapsed: Duration) -> u64 {
    elapsed.as_secs().rotate_left(32) ^ u64::from(elapsed.subsec_nanos())
}

fn prompt_name<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> anyhow::Result<String> {
    write!(output, "Enter your name: ")?;
    output.flush()?;
    let mut name = String::new();
    input
        .read_line(&mut name)
        .context("could not read player name")?;
    Ok(name)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let settings = match &args.config {
        Some(path) => settings::Settings::load(path)?,
        None => settings::Settings::default(),
    };
    let options = Options::resolve(&args, settings)?;
    log::debug!("options: {:?}", options);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    let name = match &args.name {
        Some(name) => Some(name.clone()),
        None if !args.json => Some(prompt_name(&mut input, &mut output)?),
        None => None,
    };

    let seed = args.seed.unwrap_or_else(random_seed);
    log::debug!("seed: {}", seed);

    let mut session = game::GameSession::start(
        options.config,
        game::RandomBoardGenerator::from_seed(seed),
        options.flag_policy,
        name.as_deref(),
        options.store,
    )?;

    let mode = if args.json {
        shell::OutputMode::Json
    } else {
        shell::OutputMode::Text
    };
    shell::run(&mut session, input, output, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("minefield").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn clock_seed_keeps_seconds_past_nanosecond_range() {
        // 2^64 ns is about 584 years, both times share their sub-second part
        let near = Duration::new(1_000, 123);
        let far = Duration::new(1_000 + 600 * 365 * 24 * 3600, 123);

        assert_ne!(seed_from_elapsed(near), seed_from_elapsed(far));
        assert_ne!(seed_from_elapsed(near), seed_from_elapsed(Duration::new(1_000, 124)));
        assert_eq!(seed_from_elapsed(Duration::ZERO), 0);
    }

    #[test]
    fn defaults_match_classic_board() {
        let options = Options::resolve(&args(&[]), settings::Settings::default()).unwrap();

        assert_eq!(options.config, game::GameConfig::DEFAULT);
        assert_eq!(options.flag_policy, game::FlagPolicy::RevealThrough);
        assert_eq!(options.store, game::LeaderboardStore::default());
    }

    #[test]
    fn flags_override_settings_file() {
        let settings = settings::Settings::parse(
            "rows = 16\ncols = 16\nmines = 40\n[leaderboard]\norder = \"fastest-first\"\n",
        )
        .unwrap();

        let options = Options::resolve(
            &args(&["--mines", "12", "--order", "slowest-first", "--protect-flags"]),
            settings,
        )
        .unwrap();

        assert_eq!(options.config, game::GameConfig::new((16, 16), 12).unwrap());
        assert_eq!(options.flag_policy, game::FlagPolicy::Protect);
        assert_eq!(options.store.order(), game::RankOrder::SlowestFirst);
    }

    #[test]
    fn invalid_board_is_rejected() {
        let result = Options::resolve(
            &args(&["-r", "2", "-c", "2", "-m", "4"]),
            settings::Settings::default(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn prompt_reads_one_line() {
        let mut output = Vec::new();

        let name = prompt_name(&mut "Ada\nl 0 0\n".as_bytes(), &mut output).unwrap();

        assert_eq!(name, "Ada\n");
        assert_eq!(output, b"Enter your name: ");
    }
}
