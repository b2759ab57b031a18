//! saavy-render - render the demo sequence through the block renderer
//!
//! Usage:
//!   saavy-render [config.toml] [--wav out.wav] [--seconds N] [--play]
//!
//! Set RUST_LOG=info for per-renderer totals, including stuck notes released
//! at each loop wrap.

mod playback;
mod sequencer;

use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result, WrapErr};
use saavy_render::{
    io::StereoOutput,
    midi::{MidiBlock, MidiEvent},
    render::EventSender,
    synth::{patch::SynthPatch, SubtractiveSynth},
    BlockInputs, RenderNode, RendererConfig,
};

use sequencer::{demo_tracks, Sequencer};

const BPM: f64 = 112.0;
const PPQ: u32 = 96;
const LEAD_TRACK: u16 = 1;
const BASS_TRACK: u16 = 2;

struct Args {
    config: Option<PathBuf>,
    wav: PathBuf,
    seconds: f32,
    play: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: None,
        wav: PathBuf::from("saavy-render.wav"),
        seconds: 12.0,
        play: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--wav" => {
                args.wav = iter
                    .next()
                    .map(PathBuf::from)
                    .ok_or_else(|| eyre!("--wav needs a path"))?;
            }
            "--seconds" => {
                let value = iter.next().ok_or_else(|| eyre!("--seconds needs a value"))?;
                args.seconds = value
                    .parse()
                    .wrap_err_with(|| format!("invalid --seconds value {value:?}"))?;
            }
            "--play" => args.play = true,
            other if other.starts_with("--") => return Err(eyre!("unknown flag {other}")),
            path => args.config = Some(PathBuf::from(path)),
        }
    }
    Ok(args)
}

/// Two renderers listening to different tracks of the same stream.
struct Band {
    lead: RenderNode,
    bass: RenderNode,
    lead_out: StereoOutput,
    bass_out: StereoOutput,
    stream: MidiBlock,
    sequencer: Sequencer,
    block_frames: usize,
}

impl Band {
    fn new(config: &RendererConfig, sample_rate: f32) -> Result<(Self, EventSender)> {
        let block_frames = config.block_frames;

        let mut lead = RenderNode::<SubtractiveSynth>::new(config.clone());
        lead.prepare(sample_rate, block_frames, &BlockInputs::for_track(LEAD_TRACK))
            .wrap_err("failed to prepare lead renderer")?;
        let bends = lead.event_sender();

        let mut bass = RenderNode::<SubtractiveSynth>::new(config.clone().with_patch(bass_patch(&config.patch)));
        bass.prepare(sample_rate, block_frames, &BlockInputs::for_track(BASS_TRACK))
            .wrap_err("failed to prepare bass renderer")?;

        let (tracks, loop_ticks) = demo_tracks(PPQ);
        let sequencer = Sequencer::new(BPM, PPQ, sample_rate as f64, loop_ticks, tracks);

        let band = Self {
            lead,
            bass,
            lead_out: StereoOutput::new(block_frames),
            bass_out: StereoOutput::new(block_frames),
            stream: MidiBlock::with_capacity(256),
            sequencer,
            block_frames,
        };
        Ok((band, bends))
    }

    /// Render one block into `interleaved` (2 * block_frames samples).
    fn render_block(&mut self, interleaved: &mut [f32]) {
        let frames = self.block_frames;
        self.sequencer.fill_block(&mut self.stream, frames);

        self.lead
            .execute(&BlockInputs::for_track(LEAD_TRACK), &self.stream, &mut self.lead_out);
        self.bass
            .execute(&BlockInputs::for_track(BASS_TRACK), &self.stream, &mut self.bass_out);

        for (i, pair) in interleaved.chunks_exact_mut(2).take(frames).enumerate() {
            pair[0] = self.lead_out.left[i] + self.bass_out.left[i];
            pair[1] = self.lead_out.right[i] + self.bass_out.right[i];
        }
    }

    fn block_frames(&self) -> usize {
        self.block_frames
    }

    fn log_summary(&self) {
        for (name, node) in [("lead", &self.lead), ("bass", &self.bass)] {
            if let Some(processor) = node.processor() {
                let stats = processor.stats();
                log::info!(
                    "{name}: {} blocks, {} events matched of {} ({} ignored), {} stuck notes released",
                    stats.blocks,
                    stats.events_matched,
                    stats.events_seen,
                    stats.events_ignored,
                    stats.notes_unstuck
                );
                if stats.pending_overflows > 0 {
                    log::warn!(
                        "{name}: {} note actions applied early, block was too busy",
                        stats.pending_overflows
                    );
                }
            }
        }
        log::info!("sequence looped {} times", self.sequencer.loops());
    }
}

fn bass_patch(base: &SynthPatch) -> SynthPatch {
    let mut patch = base.clone();
    patch.mono_mode = true;
    patch.envelope.release_ms = 120.0;
    patch.envelope.sustain = 0.8;
    patch.filter.cutoff_hz = 500.0;
    patch.delay.enabled = false;
    patch.gain_db -= 2.0;
    patch
}

/// Slow vibrato-ish bend, sent like a controller thread would.
fn bend_at(block: usize) -> MidiEvent {
    let phase = block as f32 * 0.02;
    MidiEvent::pitch_bend(0, 0.15 * phase.sin()).on_track(LEAD_TRACK)
}

fn render_to_wav(config: &RendererConfig, args: &Args) -> Result<()> {
    let sample_rate = config.sample_rate;
    let (mut band, mut bends) = Band::new(config, sample_rate)?;

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: sample_rate as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&args.wav, spec)
        .wrap_err_with(|| format!("failed to create {}", args.wav.display()))?;

    let blocks = (args.seconds.max(0.0) * sample_rate / band.block_frames() as f32).ceil() as usize;
    let mut interleaved = vec![0.0f32; 2 * band.block_frames()];
    let mut peak = 0.0f32;

    for block in 0..blocks {
        if block % 8 == 0 && bends.send(bend_at(block)).is_err() {
            log::warn!("bend queue full, dropping bend");
        }
        band.render_block(&mut interleaved);
        for &sample in &interleaved {
            peak = peak.max(sample.abs());
            writer.write_sample(sample).wrap_err("failed to write sample")?;
        }
    }
    writer.finalize().wrap_err("failed to finalize WAV")?;

    band.log_summary();
    println!(
        "Wrote {:.1}s to {} (peak {:.3})",
        blocks as f32 * band.block_frames() as f32 / sample_rate,
        args.wav.display(),
        peak
    );
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => RendererConfig::load(path)
            .wrap_err_with(|| format!("failed to load config {}", path.display()))?,
        None => RendererConfig::default(),
    };
    config.validate().wrap_err("invalid renderer config")?;

    println!("=== saavy-render ===");
    println!("BPM: {BPM}");
    println!("Block: {} frames, {} voices", config.block_frames, config.voice_count);

    if args.play {
        playback::play(|sample_rate| {
            Band::new(&config, sample_rate).map(|(band, bends)| {
                playback::spawn_bend_thread(bends);
                band
            })
        })
    } else {
        render_to_wav(&config, &args)
    }
}
