use std::io::{BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use parley::voice::{AudioCapture, PiperSynthesizer, SystemPlayer, WhisperTranscriber};
use parley::{ChatClient, Config, ConversationHistory, Session, TurnSettings, TurnStatus};

/// Parley - local voice assistant (whisper.cpp + Ollama + piper)
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    /// Root directory holding whisper.cpp/, piper-tts/, and scratch files
    #[arg(long, env = "PARLEY_ROOT")]
    root: Option<std::path::PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,parley=info",
        1 => "info,parley=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let config = Config::from_root(root)?;
    tracing::debug!(?config, "loaded configuration");

    // Fail fast on a misconfigured install rather than failing every turn
    config.verify_assets()?;

    let history = match &config.system_prompt {
        Some(prompt) => ConversationHistory::with_system(config.max_history, prompt),
        None => ConversationHistory::new(config.max_history),
    };

    let settings = TurnSettings {
        recording_path: config.recording_path.clone(),
        recording_duration: config.recording_duration,
        exit_phrase: config.exit_phrase.clone(),
        farewell: config.farewell.clone(),
    };

    let mut session = Session::new(
        AudioCapture::new(config.sample_rate),
        WhisperTranscriber::new(
            &config.whisper_executable,
            &config.whisper_model,
            config.whisper_dir(),
        ),
        ChatClient::new(
            config.chat_url.clone(),
            config.chat_model.clone(),
            config.chat_timeout,
        )?,
        PiperSynthesizer::new(
            &config.piper_executable,
            &config.piper_model,
            &config.synthesis_path,
        ),
        SystemPlayer::new(),
        settings,
        history,
    );

    println!("Local voice assistant - ready!");
    println!("Press Enter to start recording, then speak.");
    println!("Say \"{}\" to exit.", config.exit_phrase);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("Press Enter to record... ");
        std::io::stdout().flush()?;

        // EOF on stdin ends the session; there is no other keyboard exit
        let Some(line) = lines.next() else {
            tracing::info!("stdin closed, exiting");
            break;
        };
        line?;

        match session.run_turn() {
            TurnStatus::Completed => {}
            TurnStatus::RecordingFailed => {
                println!("Skipping turn due to a recording error.");
            }
            TurnStatus::TranscriptionEmpty => {
                println!("Could not transcribe audio clearly. Please try again.");
            }
            TurnStatus::ModelFailed => {
                println!("Sorry, I couldn't get a response from the language model.");
            }
            TurnStatus::SynthesisFailed => {
                println!("Skipping playback due to a speech synthesis error.");
            }
            TurnStatus::ExitRequested => {
                println!("Assistant: {}", config.farewell);
                break;
            }
        }
    }

    println!("Exiting assistant.");
    Ok(())
}
