mod tui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use stepkit::audio::{self, OfflineOutput};
use stepkit::middle::Middle;
use stepkit::pipeline::persistence;
use stepkit::shared::InputEvent;
use stepkit::{DrumMachine, EngineConfig, Song};

/// Terminal 16-step drum machine.
#[derive(Parser, Debug)]
#[command(name = "stepkit", version)]
struct Args {
    /// Song file to open (default: .stepkit/song.json in the current directory)
    song: Option<PathBuf>,

    /// Engine config (JSON); unset fields keep their defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log scheduled steps too
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Render the song offline to a WAV file instead of opening the TUI
    #[arg(long, value_name = "OUT")]
    bounce: Option<PathBuf>,

    /// How many times to play the whole pattern when bouncing (default: 1)
    #[arg(long, requires = "bounce", value_parser = clap::value_parser!(u32).range(1..))]
    loops: Option<u32>,
}

// stderr belongs to the TUI, so logs go to a file
fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let log_path = std::env::temp_dir().join("stepkit.log");

    let Ok(log_file) = File::create(&log_path) else {
        return;
    };
    if WriteLogger::init(log_level, Config::default(), log_file).is_ok() {
        log::info!("stepkit starting (log level: {:?}, log: {})", log_level, log_path.display());
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let song_path = match args.song {
        Some(path) => path,
        None => persistence::default_song_path(&std::env::current_dir()?),
    };
    let song = if song_path.exists() {
        persistence::load_song(&song_path)?
    } else {
        log::info!("no song at {}, starting from the default beat", song_path.display());
        Song::default()
    };

    if let Some(out) = args.bounce {
        let loops = args.loops.unwrap_or(1) as usize;
        return bounce(song, config, &out, loops);
    }
    run_tui(song, song_path, config)
}

// Plays the pattern `loops` times on an offline output and writes the result.
// The render stops exactly `loops` pattern lengths after the first note, so
// the file loops cleanly.
fn bounce(song: Song, config: EngineConfig, out: &Path, loops: usize) -> anyhow::Result<()> {
    let output = OfflineOutput::new(config.render_sample_rate, config.master_gain);
    let look_ahead = config.look_ahead();
    let groove = song.groove();
    let bar_secs = 16.0 * groove.seconds_per_sixteenth();
    let end = config.start_offset_secs + bar_secs * (song.bars.len() * loops) as f64;
    let sample_rate = output.sample_rate() as f64;
    let end_frames = (end * sample_rate).round() as usize;

    let mut machine = DrumMachine::new(output, config);
    machine.apply_distortion(&song.distortion);

    // wall clock is simulated in lock step with the render clock
    let mut now = Instant::now();
    machine.start(&song.bars, &groove, now)?;
    while machine.output().rendered().len() < end_frames {
        let remaining = (end_frames - machine.output().rendered().len()) as f64 / sample_rate;
        machine.output_mut().advance(look_ahead.as_secs_f64().min(remaining));
        now += look_ahead;
        machine.tick(&song.bars, &groove, now);
    }
    machine.stop();

    machine.output().write_wav(out)?;
    println!("bounced {} bars to {}", song.bars.len() * loops, out.display());
    Ok(())
}

fn run_tui(song: Song, song_path: PathBuf, config: EngineConfig) -> anyhow::Result<()> {
    let output = audio::open_output(&config)?;
    let mut middle = Middle::new(song, output, config).with_song_path(song_path);

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    crossterm::execute!(std::io::stdout(), terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let frame_rate = Duration::from_millis(16); // ~60fps

    loop {
        let ds = middle.display_state();
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds);
        })?;

        // wake up in time for the next scheduler poll
        let timeout = middle
            .next_tick_in(Instant::now())
            .map_or(frame_rate, |d| d.min(frame_rate));

        for event in tui::input::poll_input(timeout)? {
            let quit = event == InputEvent::Quit;
            middle.handle_input(event, Instant::now());
            if quit {
                // save before quitting
                if let Err(e) = middle.save() {
                    log::warn!("could not save on quit: {e:#}");
                }
                return Ok(());
            }
        }

        middle.tick(Instant::now());
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(list: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("stepkit").chain(list.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_song_and_flags() {
        let a = parse(&["beat.json", "--config", "cfg.json", "--verbose"]).unwrap();
        assert_eq!(a.song, Some(PathBuf::from("beat.json")));
        assert_eq!(a.config, Some(PathBuf::from("cfg.json")));
        assert!(a.verbose);
        assert_eq!(a.loops, None);
        assert_eq!(a.bounce, None);
    }

    #[test]
    fn parses_bounce() {
        let a = parse(&["--bounce", "out.wav", "--loops", "4", "song.json"]).unwrap();
        assert_eq!(a.bounce, Some(PathBuf::from("out.wav")));
        assert_eq!(a.loops, Some(4));
        assert_eq!(a.song, Some(PathBuf::from("song.json")));
    }

    #[test]
    fn flag_is_not_taken_as_a_value() {
        assert!(parse(&["--config", "--verbose"]).is_err());
        assert!(parse(&["--bounce", "-v"]).is_err());
    }

    #[test]
    fn loops_need_a_bounce() {
        let err = parse(&["--loops", "2"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse(&["--bounce", "o.wav", "--loops"]).is_err());
        assert!(parse(&["--bounce", "o.wav", "--loops", "lots"]).is_err());
        assert!(parse(&["--bounce", "o.wav", "--loops", "0"]).is_err());
        assert!(parse(&["--loud"]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn bounce_writes_one_loop() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("loop.wav");
        let config = EngineConfig { render_sample_rate: 8000, ..EngineConfig::default() };
        let mut song = Song::default();
        song.set_bpm(120.0);

        bounce(song, config, &out, 1).unwrap();
        let reader = hound::WavReader::open(&out).unwrap();
        // 2 s bar + 5 ms lead-in
        assert_eq!(reader.duration(), 16040);
    }
}
