//! End-to-end tests: CPU transactions in, audio and key feedback out.

use approx::assert_relative_eq;
use parking_lot::Mutex;
use std::sync::Arc;
use tonebus::synth::MixerFlags;
use tonebus::{
    synth_channel, AudioMode, AudioSink, BusDevice, KeyboardView, PeripheralBus,
    PeripheralConfig, Sample, SampleBank, ScriptedKeys, SynthSink, WaveType,
};

#[derive(Debug, Clone, PartialEq)]
enum Played {
    Tone { hz: f32, secs: f32 },
    Sample(u16),
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Played>>>);

impl Recorder {
    fn take(&self) -> Vec<Played> {
        std::mem::take(&mut *self.0.lock())
    }
}

impl AudioSink for Recorder {
    fn play_tone(&mut self, frequency_hz: f32, duration_secs: f32, _volume: f32) {
        self.0.lock().push(Played::Tone {
            hz: frequency_hz,
            secs: duration_secs,
        });
    }

    fn play_sample(&mut self, id: u16, _sample: &Sample) {
        self.0.lock().push(Played::Sample(id));
    }
}

struct Rig {
    bus: PeripheralBus,
    audio: Recorder,
    keyboard: KeyboardView,
    keys: ScriptedKeys,
}

fn rig() -> Rig {
    let audio = Recorder::default();
    let keyboard = KeyboardView::new();
    let keys = ScriptedKeys::new();
    let mut samples = SampleBank::new();
    samples.insert(0, Sample::new("kick", vec![0.5; 100], 22_050));
    samples.insert(1, Sample::new("snare", vec![0.25; 100], 22_050));

    let bus = PeripheralBus::new(PeripheralConfig::default())
        .with_audio(audio.clone())
        .with_visual(keyboard.clone())
        .with_keys(keys.clone())
        .with_samples(samples);
    Rig {
        bus,
        audio,
        keyboard,
        keys,
    }
}

fn assert_tone(played: &Played, hz: f32, secs: f32) {
    match played {
        Played::Tone { hz: h, secs: s } => {
            assert_relative_eq!(*h, hz, epsilon = 1e-3);
            assert_relative_eq!(*s, secs, epsilon = 1e-5);
        }
        other => panic!("expected tone, got {:?}", other),
    }
}

#[test]
fn test_play_frequency_a4() {
    let mut rig = rig();
    rig.bus.write(0x9001, 0x0016);
    let played = rig.audio.take();
    assert_eq!(played.len(), 1);
    assert_tone(&played[0], 440.0, 0.1);
}

#[test]
fn test_play_frequency_wave_types() {
    let mut rig = rig();
    // code 0x16 (440 Hz), duration code 4 (0.5 s)
    rig.bus.write(0x9001, 0x0416);
    rig.bus.write(0x9001, 0x1416);
    rig.bus.write(0x9001, 0x2416);
    rig.bus.write(0x9001, 0x3416);
    let played = rig.audio.take();
    assert_tone(&played[0], 440.0, 0.5);
    assert_tone(&played[1], 440.0, 0.4);
    assert_tone(&played[2], 484.0, 0.5);
    assert_tone(&played[3], 396.0, 0.5);
}

#[test]
fn test_frequency_range_extremes() {
    let mut rig = rig();
    rig.bus.write(0x9001, 0x0000);
    rig.bus.write(0x9001, 0x0FFF);
    let played = rig.audio.take();
    assert_tone(&played[0], 220.0, 0.1);
    assert_tone(&played[1], 2770.0, 1.6);
}

#[test]
fn test_two_phase_frequency_binding() {
    let mut rig = rig();
    rig.bus.write(0x9004, b'a' as u16);
    rig.bus.write(0x9004, 440);
    assert_eq!(rig.bus.state().keys.binding('a').frequency, Some(440));
    assert_eq!(rig.bus.state().keys.pending_key(), None);
}

#[test]
fn test_lone_value_write_is_noop() {
    let mut rig = rig();
    rig.bus.write(0x9004, 440);
    assert_eq!(rig.bus.state().keys.binding_count(), 0);
    assert!(rig.audio.take().is_empty());
}

#[test]
fn test_unknown_address() {
    let mut rig = rig();
    assert_eq!(rig.bus.read(0x8000).data, 0);
    rig.bus.write(0x8000, 0x1234);
    rig.bus.write(0x900B, 0x0016);
    assert!(rig.audio.take().is_empty());
    assert_eq!(rig.bus.state().keys.binding_count(), 0);
    assert!(rig.keyboard.snapshot().highlighted_keys().is_empty());
}

#[test]
fn test_keypress_highlight_lifecycle() {
    let mut rig = rig();
    rig.keys.push('J');
    assert_eq!(rig.bus.read(0x9000).data, b'j' as u16);
    assert_eq!(rig.keyboard.snapshot().highlighted_keys(), vec!['j']);

    for _ in 0..29 {
        rig.bus.tick_frame();
    }
    assert!(rig.bus.state().keys.is_highlighted('j'));
    assert!(rig.keyboard.snapshot().key('j').highlighted);

    rig.bus.tick_frame();
    assert!(!rig.bus.state().keys.is_highlighted('j'));
    assert!(!rig.keyboard.snapshot().key('j').highlighted);
    assert_eq!(rig.bus.read(0x9000).data, 0);
}

#[test]
fn test_show_key_uses_color_and_frequency() {
    let mut rig = rig();
    rig.bus.write(0x9004, b'q' as u16);
    rig.bus.write(0x9004, 523);
    rig.bus.write(0x9006, b'q' as u16);
    rig.bus.write(0x9006, 0xE0);
    rig.bus.write(0x9003, b'Q' as u16);

    let played = rig.audio.take();
    assert_eq!(played.len(), 1);
    assert_tone(&played[0], 523.0, 0.5);

    let snapshot = rig.keyboard.snapshot();
    assert!(snapshot.key('q').highlighted);
    assert_eq!(snapshot.key('q').color, (252, 0, 0));
    assert_eq!(rig.bus.state().keys.highlights().remaining('q'), 50);

    for _ in 0..50 {
        rig.bus.tick_frame();
    }
    assert!(!rig.keyboard.snapshot().key('q').highlighted);
}

#[test]
fn test_show_unbound_key_defaults_white_and_silent() {
    let mut rig = rig();
    rig.bus.write(0x9003, b'z' as u16);
    assert!(rig.audio.take().is_empty());
    assert_eq!(rig.keyboard.snapshot().key('z').color, (252, 252, 255));
    assert!(rig.bus.state().keys.is_highlighted('z'));
}

#[test]
fn test_key_modes() {
    let mut rig = rig();
    rig.bus.write(0x9004, b's' as u16);
    rig.bus.write(0x9004, 330);
    rig.bus.write(0x9005, b's' as u16);
    rig.bus.write(0x9005, 1);

    // mode 1 = Sample
    rig.bus.write(0x900A, 0x0100 | b's' as u16);
    rig.bus.write(0x9003, b's' as u16);
    assert_eq!(rig.audio.take(), vec![Played::Sample(1)]);

    // mode 2 = Both, wave 2 = Triangle
    rig.bus.write(0x900A, 0x2200 | b's' as u16);
    let binding = rig.bus.state().keys.binding('s');
    assert_eq!(binding.mode, Some(AudioMode::BOTH));
    assert_eq!(binding.wave, Some(WaveType::Triangle));
    rig.bus.write(0x9003, b's' as u16);
    let played = rig.audio.take();
    assert_eq!(played.len(), 2);
    assert_tone(&played[0], 363.0, 0.5);
    assert_eq!(played[1], Played::Sample(1));

    // reserved mode 3 falls back to Frequency
    rig.bus.write(0x900A, 0x0300 | b's' as u16);
    rig.bus.write(0x9003, b's' as u16);
    let played = rig.audio.take();
    assert_eq!(played.len(), 1);
    assert_tone(&played[0], 330.0, 0.5);
}

#[test]
fn test_play_combined() {
    let mut rig = rig();
    rig.bus.write(0x9009, 0x0116);
    let played = rig.audio.take();
    assert_eq!(played.len(), 2);
    assert_tone(&played[0], 440.0, 0.5);
    assert_eq!(played[1], Played::Sample(1));
}

#[test]
fn test_sample_ports() {
    let mut rig = rig();
    assert_eq!(rig.bus.read(0x9007).data, 2);
    rig.bus.write(0x9008, 0);
    rig.bus.write(0x9002, 0);
    rig.bus.write(0x9002, 77);
    let played = rig.audio.take();
    assert_eq!(played[0], Played::Sample(0));
    assert_tone(&played[1], 200.0, 0.25);
}

#[test]
fn test_delayed_variant_reports_one_cycle() {
    let config = PeripheralConfig {
        transaction_delay: 1,
        ..PeripheralConfig::default()
    };
    let mut bus = PeripheralBus::new(config);
    for address in [0x9000u16, 0x9004, 0x9007, 0x1234] {
        assert_eq!(bus.read(address).delay, 1);
        assert_eq!(bus.write(address, 0), 1);
    }
}

#[test]
fn test_synth_renders_a4_for_a_tenth_of_a_second() {
    let config = PeripheralConfig::default();
    let (controller, mut renderer) = synth_channel(&config);
    let mut bus = PeripheralBus::new(config).with_audio(SynthSink::new(controller));

    bus.write(0x9001, 0x0016);
    let mut block = vec![0.0f32; 2 * 5000];
    renderer.render_interleaved(&mut block, 2);

    let active: Vec<f32> = block.chunks_exact(2).map(|f| f[0]).collect();
    let last_nonzero = active.iter().rposition(|&s| s != 0.0).unwrap();
    assert!(last_nonzero < 4410);
    assert!(last_nonzero > 4300);
    assert!(block.chunks_exact(2).all(|f| f[0] == f[1]));

    // A4 has 44 zero crossings in 0.1 s
    let crossings = active[..4410]
        .windows(2)
        .filter(|w| w[0] <= 0.0 && w[1] > 0.0)
        .count();
    assert!((43..=45).contains(&crossings), "crossings {}", crossings);
}

#[test]
fn test_out_of_range_binding_sounds_fallback_on_synth() {
    let config = PeripheralConfig::default();
    let (controller, mut renderer) = synth_channel(&config);
    let mut bus = PeripheralBus::new(config).with_audio(SynthSink::new(controller));

    bus.write(0x9004, b'a' as u16);
    bus.write(0x9004, 30_000);
    bus.write(0x9003, b'a' as u16);
    let block = renderer.render_mono(22_050);
    assert!(block.iter().any(|&s| s != 0.0));
    assert_relative_eq!(renderer.oscillator().voice().frequency, 200.0);

    // a long note already ringing is replaced, not left playing
    bus.write(0x9001, 0x0F16);
    renderer.render_mono(100);
    assert_relative_eq!(renderer.oscillator().voice().frequency, 440.0);
    bus.write(0x9003, b'a' as u16);
    renderer.render_mono(1);
    assert_relative_eq!(renderer.oscillator().voice().frequency, 200.0);
}

#[test]
fn test_muted_samples_leave_tone_only() {
    let config = PeripheralConfig::default();
    let (controller, mut renderer) = synth_channel(&config);
    renderer.mixer_mut().set_flags(MixerFlags::TONE);
    let mut samples = SampleBank::new();
    samples.insert(0, Sample::new("dc", vec![1.0; 4_000], 44_100));
    let mut bus = PeripheralBus::new(config)
        .with_audio(SynthSink::new(controller))
        .with_samples(samples);

    bus.write(0x9002, 0);
    assert!(renderer.render_mono(2_000).iter().all(|&s| s == 0.0));
}
