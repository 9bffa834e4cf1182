//! Audio setup and the realtime callback

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;
use std::sync::Arc;

use acid_dsp::{
    dsp::{param::AtomicF32, DspModule},
    synth::SynthMessage,
    AcidSynth, Transport, MAX_BLOCK_SIZE,
};

use super::ui::UiApp;

/// Capacity of the UI -> audio note queue
const NOTE_QUEUE_SIZE: usize = 256;
/// Capacity of the audio -> UI scope queue (samples)
const SCOPE_QUEUE_SIZE: usize = 16_384;

/// Application builder
pub struct Acid {
    bpm: f64,
}

impl Acid {
    pub fn new() -> Self {
        Self { bpm: 120.0 }
    }

    /// Set the arpeggiator tempo in beats per minute
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    /// Open the default output device, start streaming and hand the terminal
    /// to the UI until it quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        log::info!("output: {sample_rate} Hz, {channels} channels");

        let mut synth = AcidSynth::new();
        synth.prepare(sample_rate, MAX_BLOCK_SIZE);
        let controls = synth.controls();

        let bpm = Arc::new(AtomicF32::new(self.bpm as f32));
        let (note_tx, mut note_rx) = RingBuffer::<SynthMessage>::new(NOTE_QUEUE_SIZE);
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_QUEUE_SIZE);

        let audio_bpm = Arc::clone(&bpm);
        let mut position: i64 = 0;
        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let channels = channels.max(1);
                for block in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    let transport = Transport::new(audio_bpm.load() as f64, position);
                    synth.render_interleaved(block, channels, transport, &mut note_rx);
                    position += (block.len() / channels) as i64;

                    // Scope is best-effort; drop samples when the UI lags
                    for frame in block.chunks_exact(channels) {
                        let _ = scope_tx.push(frame[0]);
                    }
                }
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;

        stream.play().wrap_err("failed to start audio stream")?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(controls, note_tx, scope_rx, bpm, sample_rate).run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for Acid {
    fn default() -> Self {
        Self::new()
    }
}
