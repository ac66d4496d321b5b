//! Interactive command-line driver — loads the models once, then reads
//! speaker/text pairs and writes one WAV per utterance.
//!
//! Usage:
//!   vits-tts [--assets DIR] [--speaker N] [--output FILE] [--text TEXT]
//!
//! Without `--text` the program enters an interactive loop mirroring the
//! one-shot mode: enter a speaker number (0–4) and a line of text, get a
//! WAV file.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use vits_tts::TextToSpeech;

struct Args {
    assets: PathBuf,
    speaker: i64,
    output: PathBuf,
    text: Option<String>,
}

fn parse_args() -> Result<Option<Args>> {
    let mut assets = PathBuf::from("assets");
    let mut speaker = 0i64;
    let mut output = PathBuf::from("output_audio.wav");
    let mut text = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next().with_context(|| format!("{flag} expects a value"))
        };
        match arg.as_str() {
            "--assets" => assets = PathBuf::from(value("--assets")?),
            "--speaker" => {
                speaker = value("--speaker")?.parse().context("--speaker expects an integer")?
            }
            "--output" => output = PathBuf::from(value("--output")?),
            "--text" => text = Some(value("--text")?),
            "--help" => {
                println!(
                    "Usage: vits-tts [--assets DIR] [--speaker N] \
                     [--output FILE] [--text TEXT]"
                );
                return Ok(None);
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(Some(Args { assets, speaker, output, text }))
}

fn load_pipeline(assets: &Path) -> Result<TextToSpeech> {
    TextToSpeech::load(
        &assets.join("tokenizer_config.json"),
        &assets.join("phonemizer_model.onnx"),
        &assets.join("vits_model.onnx"),
    )
    .with_context(|| format!("cannot load pipeline from {}", assets.display()))
}

fn synthesize(tts: &TextToSpeech, text: &str, speaker: i64, output: &Path) -> Result<()> {
    tts.synthesize_to_file(text, output, speaker)
        .with_context(|| format!("synthesis failed for {text:?}"))?;
    println!("Saved {} ({} Hz)", output.display(), tts.sample_rate());
    Ok(())
}

fn interactive_loop(tts: &TextToSpeech, output: &Path) -> Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("Enter speaker number (0-4) or 'exit' to quit: ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?.trim().to_string();

        if line.eq_ignore_ascii_case("exit") {
            break;
        }
        let speaker: i64 = match line.parse() {
            Ok(n) if (0..=4).contains(&n) => n,
            _ => {
                println!("Invalid speaker number. Please enter a number between 0 and 4.");
                continue;
            }
        };

        print!("Enter text: ");
        std::io::stdout().flush()?;
        let Some(text) = lines.next() else { break };
        let text = text?.trim().to_string();
        if text.is_empty() {
            println!("Input was empty. Please try again.");
            continue;
        }

        if let Err(e) = synthesize(tts, &text, speaker, output) {
            eprintln!("Error: {e:#}");
        }
    }
    println!("Exiting.");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let Some(args) = parse_args()? else { return Ok(()) };
    let tts = load_pipeline(&args.assets)?;

    match &args.text {
        Some(text) => synthesize(&tts, text, args.speaker, &args.output),
        None => interactive_loop(&tts, &args.output),
    }
}
