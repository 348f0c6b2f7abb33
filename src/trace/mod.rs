//! Bus trace replay
//!
//! Drives a [`BusDevice`] from a recorded list of transactions, the way a CPU
//! core would, and renders the synth output frame by frame.

pub mod clock;
pub mod parser;

pub use clock::FrameClock;
pub use parser::{parse_line, parse_trace};

use crate::bus::BusDevice;
use crate::sinks::ScriptedKeys;
use crate::synth::SynthRenderer;
use log::{debug, info};

/// One trace line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceCommand {
    /// Write a word to an address
    Write {
        /// Bus address
        address: u16,
        /// Data word
        word: u16,
    },
    /// Read an address
    Read {
        /// Bus address
        address: u16,
    },
    /// Queue a key press for the next key poll
    Key(char),
    /// Advance this many frames
    Frames(u32),
}

/// A read performed during replay and its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRecord {
    /// Frame the read happened in
    pub frame: u64,
    /// Bus address
    pub address: u16,
    /// Word returned
    pub data: u16,
}

/// Replays trace commands against a bus device
pub struct TraceRunner<D: BusDevice> {
    device: D,
    keys: ScriptedKeys,
    clock: FrameClock,
    renderer: Option<SynthRenderer>,
    channels: u16,
    realtime: bool,
    output: Vec<f32>,
    reads: Vec<ReadRecord>,
    stall_cycles: u64,
}

impl<D: BusDevice> TraceRunner<D> {
    /// Create a runner; `keys` must be the key source the device polls
    pub fn new(device: D, keys: ScriptedKeys, clock: FrameClock) -> Self {
        TraceRunner {
            device,
            keys,
            clock,
            renderer: None,
            channels: 2,
            realtime: false,
            output: Vec::new(),
            reads: Vec::new(),
            stall_cycles: 0,
        }
    }

    /// Render audio offline into an interleaved buffer while replaying
    pub fn with_renderer(mut self, renderer: SynthRenderer, channels: u16) -> Self {
        self.renderer = Some(renderer);
        self.channels = channels.max(1);
        self
    }

    /// Sleep one frame length per frame so a live audio device keeps up
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Execute one command
    pub fn step(&mut self, command: TraceCommand) {
        match command {
            TraceCommand::Write { address, word } => {
                self.stall_cycles += self.device.write(address, word) as u64;
            }
            TraceCommand::Read { address } => {
                let result = self.device.read(address);
                self.stall_cycles += result.delay as u64;
                debug!("R 0x{:04X} = 0x{:04X}", address, result.data);
                self.reads.push(ReadRecord {
                    frame: self.clock.get_frame_count(),
                    address,
                    data: result.data,
                });
            }
            TraceCommand::Key(key) => self.keys.push(key),
            TraceCommand::Frames(frames) => {
                for _ in 0..frames {
                    self.advance_frame();
                }
            }
        }
    }

    /// Execute every command in order
    pub fn run(&mut self, commands: &[TraceCommand]) {
        for &command in commands {
            self.step(command);
        }
        info!(
            "trace replayed: {} frames, {} reads, {} stall cycles",
            self.clock.get_frame_count(),
            self.reads.len(),
            self.stall_cycles
        );
    }

    /// Keep rendering until the synth falls silent or `max_frames` pass
    pub fn drain(&mut self, max_frames: u32) {
        for _ in 0..max_frames {
            match self.renderer.as_ref() {
                Some(renderer) if renderer.is_active() => self.advance_frame(),
                _ => break,
            }
        }
    }

    fn advance_frame(&mut self) {
        self.device.tick_frame();
        let samples = self.clock.advance_frame();
        if let Some(renderer) = self.renderer.as_mut() {
            let start = self.output.len();
            self.output
                .resize(start + samples * self.channels as usize, 0.0);
            renderer.render_interleaved(&mut self.output[start..], self.channels);
        }
        if self.realtime {
            std::thread::sleep(self.clock.frame_duration());
        }
    }

    /// The driven device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable access to the driven device
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Frame clock
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Reads performed so far
    pub fn reads(&self) -> &[ReadRecord] {
        &self.reads
    }

    /// Sum of the stall cycles reported by the device
    pub fn stall_cycles(&self) -> u64 {
        self.stall_cycles
    }

    /// Rendered interleaved audio
    pub fn output(&self) -> &[f32] {
        &self.output
    }

    /// Output channel count
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Give back the device and the rendered audio
    pub fn finish(self) -> (D, Vec<f32>) {
        (self.device, self.output)
    }
}
