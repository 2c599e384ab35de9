//! Standalone Audio Stream
//!
//! Runs the isolator between a capture device and an output device:
//!
//! ```text
//! Input device ──cpal──▶ rtrb ring ──▶ output callback
//!                                        ├─ IsolatorProcessor (in place)
//!                                        └─ peak metering ──▶ SharedState
//! ```
//!
//! Both callbacks are real-time: no allocation, no locks. Everything that
//! allocates (ring, processor scratch) is created in `new_duplex()`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig as CpalStreamConfig};
use crossbeam_channel::Sender;
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::info;

use crate::config::{EngineConfig, StreamConfig};
use crate::error::{EngineError, EngineResult};
use crate::message::Event;
use crate::params::IsolatorParams;
use crate::processor::IsolatorProcessor;

/// Meter state written by the output callback and read by the control thread
pub struct SharedState {
    /// Rust pattern: AtomicF32 doesn't exist, so we use bit-casting
    peak_left_bits: AtomicU32,
    peak_right_bits: AtomicU32,
    underruns: AtomicU32,
    overruns: AtomicU32,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            peak_left_bits: AtomicU32::new(0.0_f32.to_bits()),
            peak_right_bits: AtomicU32::new(0.0_f32.to_bits()),
            underruns: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
        }
    }

    pub fn set_peaks(&self, left: f32, right: f32) {
        self.peak_left_bits.store(left.to_bits(), Ordering::Relaxed);
        self.peak_right_bits.store(right.to_bits(), Ordering::Relaxed);
    }

    pub fn peaks(&self) -> (f32, f32) {
        (
            f32::from_bits(self.peak_left_bits.load(Ordering::Relaxed)),
            f32::from_bits(self.peak_right_bits.load(Ordering::Relaxed)),
        )
    }

    pub fn record_underrun(&self) {
        self.underruns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn underruns(&self) -> u32 {
        self.underruns.load(Ordering::Relaxed)
    }

    pub fn record_overrun(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Peak per channel of an interleaved buffer. Mono reports the same peak twice.
pub fn interleaved_peaks(data: &[f32], channels: usize) -> (f32, f32) {
    match channels {
        1 => {
            let peak = data.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
            (peak, peak)
        }
        2 => data.chunks_exact(2).fold((0.0_f32, 0.0_f32), |(l, r), frame| {
            (l.max(frame[0].abs()), r.max(frame[1].abs()))
        }),
        _ => (0.0, 0.0),
    }
}

/// A running capture + output stream pair
pub struct AudioStream {
    // Held to keep audio flowing; dropping a cpal stream stops it
    capture_stream: Stream,
    output_stream: Stream,

    pub shared: Arc<SharedState>,
    pub config: StreamConfig,
    events: Sender<Event>,
}

impl AudioStream {
    /// Build and start a duplex stream processing `input` into `output`.
    ///
    /// The processor is prepared here with the stream's sample rate, channel
    /// count and buffer size, then moved into the output callback.
    pub fn new_duplex(
        config: EngineConfig,
        input: &Device,
        output: &Device,
        params: Arc<IsolatorParams>,
        events: Sender<Event>,
    ) -> EngineResult<Self> {
        let stream_config = config.stream;
        stream_config.validate()?;

        let mut processor = IsolatorProcessor::new(params);
        processor.prepare(
            stream_config.sample_rate as f64,
            stream_config.buffer_size as usize,
            stream_config.channels as usize,
        )?;

        let shared = Arc::new(SharedState::new());
        let (producer, consumer) = RingBuffer::<f32>::new(config.ring_buffer_samples());

        let cpal_config = CpalStreamConfig {
            channels: stream_config.channels,
            sample_rate: cpal::SampleRate(stream_config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(stream_config.buffer_size),
        };

        let capture_stream = Self::build_capture_stream(
            input,
            &cpal_config,
            producer,
            Arc::clone(&shared),
            events.clone(),
        )?;
        let output_stream = Self::build_output_stream(
            output,
            &cpal_config,
            consumer,
            processor,
            Arc::clone(&shared),
            events.clone(),
        )?;

        capture_stream
            .play()
            .map_err(|e| EngineError::StreamPlayError(e.to_string()))?;
        output_stream
            .play()
            .map_err(|e| EngineError::StreamPlayError(e.to_string()))?;

        info!(
            sample_rate = stream_config.sample_rate,
            channels = stream_config.channels,
            buffer_size = stream_config.buffer_size,
            latency_ms = stream_config.latency_ms(),
            "Audio stream started"
        );
        let _ = events.try_send(Event::Started {
            sample_rate: stream_config.sample_rate,
            channels: stream_config.channels,
        });

        Ok(Self {
            capture_stream,
            output_stream,
            shared,
            config: stream_config,
            events,
        })
    }

    fn build_capture_stream(
        device: &Device,
        config: &CpalStreamConfig,
        mut producer: Producer<f32>,
        shared: Arc<SharedState>,
        events: Sender<Event>,
    ) -> EngineResult<Stream> {
        let err_events = events.clone();

        device
            .build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Real-time audio callback - NO allocations allowed here
                    let to_write = data.len().min(producer.slots());
                    if let Ok(mut chunk) = producer.write_chunk(to_write) {
                        let (first, second) = chunk.as_mut_slices();
                        let split = first.len();
                        first.copy_from_slice(&data[..split]);
                        second.copy_from_slice(&data[split..split + second.len()]);
                        chunk.commit_all();
                    }

                    if to_write < data.len() {
                        // Ring full: output is not consuming fast enough
                        shared.record_overrun();
                        let _ = events.try_send(Event::BufferOverrun);
                    }
                },
                move |err| {
                    let _ = err_events.try_send(Event::error(err));
                },
                None,
            )
            .map_err(|e| EngineError::StreamBuildError(e.to_string()))
    }

    fn build_output_stream(
        device: &Device,
        config: &CpalStreamConfig,
        mut consumer: Consumer<f32>,
        mut processor: IsolatorProcessor,
        shared: Arc<SharedState>,
        events: Sender<Event>,
    ) -> EngineResult<Stream> {
        let err_events = events.clone();
        let channels = config.channels as usize;

        device
            .build_output_stream(
                config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    // Real-time audio callback - NO allocations allowed here
                    let to_read = data.len().min(consumer.slots());
                    if to_read < data.len() {
                        data[to_read..].fill(0.0);
                        shared.record_underrun();
                        let _ = events.try_send(Event::BufferUnderrun);
                    }

                    if let Ok(chunk) = consumer.read_chunk(to_read) {
                        let (first, second) = chunk.as_slices();
                        data[..first.len()].copy_from_slice(first);
                        data[first.len()..to_read].copy_from_slice(second);
                        chunk.commit_all();
                    }

                    processor.process_interleaved(data);

                    let (left, right) = interleaved_peaks(data, channels);
                    shared.set_peaks(left, right);
                },
                move |err| {
                    let _ = err_events.try_send(Event::error(err));
                },
                None,
            )
            .map_err(|e| EngineError::StreamBuildError(e.to_string()))
    }

    /// Current peak levels (for meters)
    pub fn peaks(&self) -> (f32, f32) {
        self.shared.peaks()
    }

    /// Pause both streams. Dropping the stream afterwards releases the devices.
    pub fn stop(&self) -> EngineResult<()> {
        self.capture_stream
            .pause()
            .map_err(|e| EngineError::StreamPlayError(e.to_string()))?;
        self.output_stream
            .pause()
            .map_err(|e| EngineError::StreamPlayError(e.to_string()))?;

        info!(
            underruns = self.shared.underruns(),
            overruns = self.shared.overruns(),
            "Audio stream stopped"
        );
        let _ = self.events.try_send(Event::Stopped);
        Ok(())
    }
}
