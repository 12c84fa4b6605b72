use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parlance::api::ApiServer;
use parlance::audio::{AudioCapture, AudioPlayback};
use parlance::gateway::{
    DEFAULT_TTS_MODEL, ElevenLabsTts, OUTPUT_SAMPLE_RATE, TextToSpeech as _,
};
use parlance::{Config, Daemon, Pipeline};

/// Parlance - voice conversation gateway
#[derive(Parser)]
#[command(name = "parlance", version, about)]
struct Cli {
    /// Port for the HTTP/WebSocket server
    #[arg(long, env = "PARLANCE_PORT", default_value = "8080")]
    port: u16,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the microphone/speaker conversation loop
    Talk,
    /// Run a typed conversation loop (no microphone needed)
    Text,
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Show the current voice configuration
    CheckVoice,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,parlance=info",
        1 => "info,parlance=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env();

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Talk => {
                config.validate()?;
                config.log_summary();
                Daemon::new(config)?.run().await.map_err(Into::into)
            }
            Command::Text => {
                config.validate()?;
                Daemon::new(config)?.run_text().await.map_err(Into::into)
            }
            Command::TestMic { duration } => test_mic(&config, duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::TestTts { text } => test_tts(&config, &text).await,
            Command::CheckVoice => {
                check_voice(&config);
                Ok(())
            }
        };
    }

    // Default: serve the HTTP/WebSocket surface
    config.validate()?;
    config.log_summary();

    tracing::info!(port = cli.port, "starting parlance gateway");
    let pipeline = Pipeline::from_config(&config)?;
    ApiServer::new(pipeline, cli.port).run().await?;

    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(config: &Config, duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new(config.sample_rate)?;
    capture.start()?;

    let sample_rate = capture.sample_rate();
    println!("Sample rate: {sample_rate} Hz");
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.peek_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );

        // Clear buffer each second
        capture.clear_buffer();
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");
    println!("  4. Try: pavucontrol (to check levels)");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut playback = AudioPlayback::new(OUTPUT_SAMPLE_RATE)?;

    // Generate 2 seconds of 440Hz sine wave
    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (OUTPUT_SAMPLE_RATE as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / OUTPUT_SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!(
        "Playing {} samples at {} Hz...",
        samples.len(),
        OUTPUT_SAMPLE_RATE
    );

    playback.play(samples).await?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");
    println!("  3. Try: pavucontrol (to check output levels)");

    Ok(())
}

/// Test TTS output
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let tts = ElevenLabsTts::new(
        config.elevenlabs_api_key.clone(),
        config.voice_id.clone(),
        DEFAULT_TTS_MODEL.to_string(),
    )?;

    println!("Synthesizing speech...");
    let pcm = tts.synthesize(text).await?;
    println!("Got {} bytes of PCM audio data", pcm.len());

    println!("Playing audio...");
    let mut playback = AudioPlayback::new(OUTPUT_SAMPLE_RATE)?;
    playback.play_pcm(&pcm).await?;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}

/// Show the current voice configuration
fn check_voice(config: &Config) {
    println!("Current voice configuration:");
    println!("  Voice ID: {}", config.voice_id);

    if config.voice_id.is_default() {
        println!("  Using default voice: Rachel");
    } else {
        println!("  Using custom voice: {}", config.voice_id);
    }
}
