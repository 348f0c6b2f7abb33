#[cfg(not(feature = "trace"))]
fn main() {
    eprintln!(
        "The tonebus CLI replays bus traces and requires the \"trace\" feature. Rebuild with `--features trace`."
    );
}

#[cfg(feature = "trace")]
mod cli {
    use std::env;
    use std::fs;

    use anyhow::{bail, Context};
    use tonebus::synth::MixerFlags;
    use tonebus::trace::FrameClock;
    use tonebus::{
        parse_trace, synth_channel, KeyboardView, PeripheralBus, PeripheralConfig, SampleBank,
        ScriptedKeys, SynthSink, TraceRunner,
    };
    use tracing_subscriber::EnvFilter;

    /// Frames rendered after the trace ends so the last note can ring out
    const DEFAULT_TAIL_FRAMES: u32 = 120;

    const USAGE: &str = "\
Usage:
  tonebus [options] <trace.txt>

Options:
  --config <file.json>   Load peripheral configuration
  --samples <dir>        Load *.wav files as samples 0, 1, 2, ...
  --wav <out.wav>        Render the audio to a WAV file
  --play                 Play through the audio device (needs the \"streaming\" feature)
  --delay <cycles>       Per-transaction stall cycles (overrides config)
  --no-tones             Mute the tone voice
  --no-samples           Mute sample playback
  --tail <frames>        Max frames rendered after the trace (default 120)
  -h, --help             Show this help

Trace lines:
  W <addr> <word>   write       R <addr>   read
  K <char>          key press   F <n>      advance n frames
";

    struct Options {
        trace: String,
        config: Option<String>,
        samples: Option<String>,
        wav: Option<String>,
        play: bool,
        delay: Option<u16>,
        mixer: MixerFlags,
        tail: u32,
    }

    fn parse_args() -> anyhow::Result<Option<Options>> {
        let mut trace = None;
        let mut config = None;
        let mut samples = None;
        let mut wav = None;
        let mut play = false;
        let mut delay = None;
        let mut mixer = MixerFlags::all();
        let mut tail = DEFAULT_TAIL_FRAMES;

        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => return Ok(None),
                "--config" => config = Some(args.next().context("--config requires a path")?),
                "--samples" => {
                    samples = Some(args.next().context("--samples requires a directory")?)
                }
                "--wav" => wav = Some(args.next().context("--wav requires a path")?),
                "--play" => play = true,
                "--no-tones" => mixer.remove(MixerFlags::TONE),
                "--no-samples" => mixer.remove(MixerFlags::SAMPLE),
                "--delay" => {
                    let value = args.next().context("--delay requires a cycle count")?;
                    delay = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid --delay '{}'", value))?,
                    );
                }
                "--tail" => {
                    let value = args.next().context("--tail requires a frame count")?;
                    tail = value
                        .parse()
                        .with_context(|| format!("invalid --tail '{}'", value))?;
                }
                _ if arg.starts_with('-') => bail!("Unknown flag: {}", arg),
                _ => trace = Some(arg),
            }
        }

        match trace {
            Some(trace) => Ok(Some(Options {
                trace,
                config,
                samples,
                wav,
                play,
                delay,
                mixer,
                tail,
            })),
            None => Ok(None),
        }
    }

    fn init_logging() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }

    pub fn run() -> anyhow::Result<()> {
        init_logging();

        let Some(options) = parse_args()? else {
            eprint!("{}", USAGE);
            return Ok(());
        };

        if options.play && options.wav.is_some() {
            bail!("--play and --wav cannot be combined");
        }
        if options.play && !cfg!(feature = "streaming") {
            bail!("--play requires the \"streaming\" feature");
        }
        if options.wav.is_some() && !cfg!(feature = "export") {
            bail!("--wav requires the \"export\" feature");
        }

        let mut config = match &options.config {
            Some(path) => PeripheralConfig::load(path)?,
            None => PeripheralConfig::default(),
        };
        if let Some(delay) = options.delay {
            config.transaction_delay = delay;
        }

        let samples = match &options.samples {
            Some(dir) => SampleBank::load_dir(dir)?,
            None => SampleBank::new(),
        };

        let text = fs::read_to_string(&options.trace)
            .with_context(|| format!("Failed to read trace '{}'", options.trace))?;
        let commands = parse_trace(&text)?;

        println!("tonebus - peripheral bus trace replay");
        println!("=====================================");
        println!("Trace:    {} ({} commands)", options.trace, commands.len());
        println!("Samples:  {}", samples.len());
        println!(
            "Output:   {} Hz, {} ch, {} fps\n",
            config.sample_rate, config.channels, config.frame_rate
        );

        let (controller, mut renderer) = synth_channel(&config);
        renderer.mixer_mut().set_flags(options.mixer);
        let keys = ScriptedKeys::new();
        let keyboard = KeyboardView::new();
        let bus = PeripheralBus::new(config)
            .with_audio(SynthSink::new(controller))
            .with_visual(keyboard.clone())
            .with_keys(keys.clone())
            .with_samples(samples);
        let clock = FrameClock::new(config.sample_rate, config.frame_rate);

        if options.play {
            play(bus, keys, clock, renderer, &commands, options.tail)?;
        } else {
            let mut runner =
                TraceRunner::new(bus, keys, clock).with_renderer(renderer, config.channels);
            runner.run(&commands);
            runner.drain(options.tail);
            report(&runner);

            if let Some(path) = &options.wav {
                write_output(path, runner.output(), config.sample_rate, config.channels)?;
                println!("Wrote {}", path);
            }
        }

        let highlighted = keyboard.snapshot().highlighted_keys();
        if !highlighted.is_empty() {
            let keys: String = highlighted.into_iter().collect();
            println!("Still highlighted: {}", keys);
        }
        Ok(())
    }

    fn report(runner: &TraceRunner<PeripheralBus>) {
        for read in runner.reads() {
            println!(
                "  frame {:>5}  R 0x{:04X} = 0x{:04X}",
                read.frame, read.address, read.data
            );
        }
        let stats = runner.device().stats();
        println!(
            "\n{} transactions ({} reads, {} writes, {} unknown), {} frames, {} stall cycles",
            stats.transactions(),
            stats.reads(),
            stats.writes(),
            stats.unknown(),
            runner.clock().get_frame_count(),
            runner.stall_cycles()
        );
    }

    #[cfg(feature = "export")]
    fn write_output(path: &str, samples: &[f32], sample_rate: u32, channels: u16) -> anyhow::Result<()> {
        tonebus::write_wav(path, samples, sample_rate, channels)?;
        Ok(())
    }

    #[cfg(not(feature = "export"))]
    fn write_output(_path: &str, _samples: &[f32], _sample_rate: u32, _channels: u16) -> anyhow::Result<()> {
        bail!("--wav requires the \"export\" feature")
    }

    #[cfg(feature = "streaming")]
    fn play(
        bus: PeripheralBus,
        keys: ScriptedKeys,
        clock: FrameClock,
        renderer: tonebus::SynthRenderer,
        commands: &[tonebus::TraceCommand],
        tail: u32,
    ) -> anyhow::Result<()> {
        use tonebus::{AudioDevice, StreamConfig};

        let config = *bus.config();
        let device = AudioDevice::new(StreamConfig::from_peripheral(&config), renderer)?;
        let mut runner = TraceRunner::new(bus, keys, clock).with_realtime(true);
        runner.run(commands);
        for _ in 0..tail {
            runner.step(tonebus::TraceCommand::Frames(1));
        }
        report(&runner);
        device.finish();
        Ok(())
    }

    #[cfg(not(feature = "streaming"))]
    fn play(
        _bus: PeripheralBus,
        _keys: ScriptedKeys,
        _clock: FrameClock,
        _renderer: tonebus::SynthRenderer,
        _commands: &[tonebus::TraceCommand],
        _tail: u32,
    ) -> anyhow::Result<()> {
        bail!("--play requires the \"streaming\" feature")
    }
}

#[cfg(feature = "trace")]
fn main() -> anyhow::Result<()> {
    cli::run()
}
