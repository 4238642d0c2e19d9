//! Blip synthesis and a trigger sink that queues blips for playback.
//!
//! No audio device is opened here. A playback backend drains the queue and
//! plays the shared PCM buffer once per voice.

use std::f64::consts::TAU;
use std::sync::Arc;

use crate::events::{TriggerEvent, TriggerSink};
use crate::grid::FamilyId;
use crate::points::PointId;

/// A short decaying sine tone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blip {
    pub sample_rate: u32,
    pub seconds: f64,
    pub frequency: f64,
}

impl Default for Blip {
    fn default() -> Self {
        Blip {
            sample_rate: 48_000,
            seconds: 0.06,
            frequency: 880.0,
        }
    }
}

/// Peak amplitude as a fraction of full scale
const AMPLITUDE: f64 = 0.25;
/// Exponential decay over the length of the blip
const DECAY: f64 = 6.0;

impl Blip {
    /// Number of sample frames.
    pub fn frames(&self) -> usize {
        (self.sample_rate as f64 * self.seconds) as usize
    }

    /// Mono samples before quantization, in `[-AMPLITUDE, AMPLITUDE]`.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        let n = self.frames();
        let sr = self.sample_rate as f64;
        (0..n).map(move |i| {
            let i = i as f64;
            let phase = TAU * i * self.frequency / sr;
            let envelope = (-DECAY * i / n as f64).exp();
            phase.sin() * AMPLITUDE * envelope
        })
    }

    /// 16-bit little-endian interleaved stereo PCM.
    pub fn pcm(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.frames() * 4);
        for s in self.samples() {
            let v = (s * 32767.0) as i16;
            let bytes = v.to_le_bytes();
            // left, then right
            out.extend_from_slice(&bytes);
            out.extend_from_slice(&bytes);
        }
        out
    }
}

/// One queued playback of the blip.
#[derive(Clone, Debug)]
pub struct Voice {
    pub family: FamilyId,
    pub point: PointId,
    pub tick: u64,
    pub pcm: Arc<[u8]>,
}

/// Turns every trigger into a queued voice. Voices may overlap.
#[derive(Debug)]
pub struct BlipSink {
    pcm: Arc<[u8]>,
    queue: Vec<Voice>,
}

impl BlipSink {
    pub fn new(blip: Blip) -> Self {
        BlipSink {
            pcm: blip.pcm().into(),
            queue: Vec::new(),
        }
    }

    pub fn pcm(&self) -> &[u8] {
        &self.pcm
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Hand all queued voices to the backend.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Voice> {
        self.queue.drain(..)
    }
}

impl Default for BlipSink {
    fn default() -> Self {
        BlipSink::new(Blip::default())
    }
}

impl TriggerSink for BlipSink {
    fn trigger(&mut self, event: &TriggerEvent) {
        self.queue.push(Voice {
            family: event.family,
            point: event.point,
            tick: event.tick,
            pcm: Arc::clone(&self.pcm),
        });
    }
}
