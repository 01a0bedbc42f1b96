//! cpal microphone capture.
//!
//! `cpal::Stream` is not `Send`, so each opened input gets an owner thread
//! that builds the stream and serves play/pause/close commands over a
//! channel. The returned `StreamingSource` holds the command side as its
//! `StreamControl` and receives samples through a `StreamFeeder`.

use std::sync::mpsc;
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SupportedBufferSize};

use audio_recorder_core::{CaptureFormat, RecorderError, StreamControl, StreamFeeder, StreamingSource};

use crate::convert;

/// Seconds of audio the source can hold between acquisition reads.
const RING_SECONDS: usize = 2;

/// Read error code after the device disappears.
pub const ERROR_DEAD_OBJECT: i32 = -6;

type Reply = mpsc::Sender<Result<(), RecorderError>>;

enum Command {
    Play(Reply),
    Pause(Reply),
    Close,
}

/// Open the system default microphone with its default config.
pub fn open_default_input() -> Result<StreamingSource, RecorderError> {
    open_input(None)
}

/// Open the input device named `device_name`, or the default one.
pub fn open_input(device_name: Option<&str>) -> Result<StreamingSource, RecorderError> {
    let device_name = device_name.map(str::to_owned);
    let (ready_tx, ready_rx) = mpsc::channel();
    let (command_tx, command_rx) = mpsc::channel();

    let owner = thread::Builder::new()
        .name("cpal-input-stream".into())
        .spawn(move || match build_stream(device_name.as_deref()) {
            Ok((stream, source)) => {
                if ready_tx.send(Ok(source)).is_ok() {
                    serve(stream, command_rx);
                }
            }
            Err(e) => {
                let _ = ready_tx.send(Err(e));
            }
        })
        .map_err(|e| RecorderError::Unknown(format!("failed to spawn input stream thread: {}", e)))?;

    let ready = ready_rx
        .recv()
        .unwrap_or_else(|_| Err(RecorderError::Device("input stream thread exited during setup".into())));

    match ready {
        Ok(source) => {
            let control = CpalControl {
                commands: command_tx,
                owner: Some(owner),
            };
            Ok(source.with_control(Box::new(control)))
        }
        Err(e) => {
            let _ = owner.join();
            Err(e)
        }
    }
}

fn build_stream(device_name: Option<&str>) -> Result<(cpal::Stream, StreamingSource), RecorderError> {
    let host = cpal::default_host();
    let device = find_device(&host, device_name)?;
    let supported = device
        .default_input_config()
        .map_err(|e| RecorderError::Device(format!("no input config: {}", e)))?;

    let sample_format = supported.sample_format();
    let bits = match sample_format {
        SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16 => 16,
        SampleFormat::I8 | SampleFormat::U8 => 8,
        other => {
            return Err(RecorderError::InvalidFormat(format!(
                "unsupported sample format: {:?}",
                other
            )))
        }
    };
    let format = CaptureFormat::new(supported.sample_rate().0, supported.channels(), bits)?;

    let frame_size = format.frame_size() as usize;
    let minimum = match supported.buffer_size() {
        SupportedBufferSize::Range { min, .. } => (*min as usize).max(1) * frame_size,
        SupportedBufferSize::Unknown => frame_size,
    };

    let (source, feeder) = StreamingSource::new(format, format.byte_rate() as usize * RING_SECONDS);
    let source = source.with_minimum_buffer_size(minimum);

    let config: cpal::StreamConfig = supported.into();
    let stream = match sample_format {
        SampleFormat::F32 => build_input::<f32>(&device, &config, feeder, convert::f32_to_pcm16),
        SampleFormat::I16 => build_input::<i16>(&device, &config, feeder, convert::i16_to_pcm16),
        SampleFormat::U16 => build_input::<u16>(&device, &config, feeder, convert::u16_to_pcm16),
        SampleFormat::I8 => build_input::<i8>(&device, &config, feeder, convert::i8_to_pcm8),
        SampleFormat::U8 => build_input::<u8>(&device, &config, feeder, convert::u8_to_pcm8),
        other => Err(RecorderError::InvalidFormat(format!(
            "unsupported sample format: {:?}",
            other
        ))),
    }?;

    log::info!(
        "input device {} opened ({}, {:?})",
        device.name().unwrap_or_else(|_| "unknown".into()),
        format,
        sample_format
    );
    Ok((stream, source))
}

fn find_device(host: &cpal::Host, name: Option<&str>) -> Result<cpal::Device, RecorderError> {
    let Some(name) = name else {
        return host
            .default_input_device()
            .ok_or_else(|| RecorderError::Device("no default input device".into()));
    };

    host.input_devices()
        .map_err(|e| RecorderError::Device(format!("failed to list input devices: {}", e)))?
        .find(|d| d.name().map(|n| n == name).unwrap_or(false))
        .ok_or_else(|| RecorderError::Device(format!("input device not found: {}", name)))
}

fn build_input<T: cpal::SizedSample>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    feeder: StreamFeeder,
    to_pcm: fn(&[T], &mut Vec<u8>),
) -> Result<cpal::Stream, RecorderError> {
    let error_feeder = feeder.clone();
    let mut pcm = Vec::new();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                pcm.clear();
                to_pcm(data, &mut pcm);
                feeder.push(&pcm);
            },
            move |err| {
                log::error!("input stream error: {}", err);
                if let cpal::StreamError::DeviceNotAvailable = err {
                    error_feeder.fail(ERROR_DEAD_OBJECT);
                }
            },
            None,
        )
        .map_err(|e| RecorderError::Device(format!("failed to build input stream: {}", e)))
}

/// Owner thread body: keeps `stream` alive until closed.
fn serve(stream: cpal::Stream, commands: mpsc::Receiver<Command>) {
    for command in commands {
        match command {
            Command::Play(reply) => {
                let played = stream
                    .play()
                    .map_err(|e| RecorderError::Device(format!("failed to start input stream: {}", e)));
                let _ = reply.send(played);
            }
            Command::Pause(reply) => {
                let paused = stream
                    .pause()
                    .map_err(|e| RecorderError::Device(format!("failed to pause input stream: {}", e)));
                let _ = reply.send(paused);
            }
            Command::Close => break,
        }
    }
    drop(stream);
    log::debug!("input stream closed");
}

struct CpalControl {
    commands: mpsc::Sender<Command>,
    owner: Option<thread::JoinHandle<()>>,
}

impl CpalControl {
    fn request(&self, command: impl FnOnce(Reply) -> Command) -> Result<(), RecorderError> {
        let gone = || RecorderError::Device("input stream thread is gone".into());
        let (reply_tx, reply_rx) = mpsc::channel();
        self.commands.send(command(reply_tx)).map_err(|_| gone())?;
        reply_rx.recv().map_err(|_| gone())?
    }

    fn shutdown(&mut self) {
        if let Some(owner) = self.owner.take() {
            let _ = self.commands.send(Command::Close);
            if owner.join().is_err() {
                log::error!("input stream thread panicked");
            }
        }
    }
}

impl StreamControl for CpalControl {
    fn play(&mut self) -> Result<(), RecorderError> {
        self.request(Command::Play)
    }

    fn pause(&mut self) -> Result<(), RecorderError> {
        self.request(Command::Pause)
    }

    fn close(&mut self) {
        self.shutdown();
    }
}

impl Drop for CpalControl {
    fn drop(&mut self) {
        self.shutdown();
    }
}
