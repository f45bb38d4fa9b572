use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::io::Cursor;
use tracing::{debug, info, warn};

use crate::error::AudioError;

/// One voice clip at a time: samples land in a heap ring sized for the longest
/// allowed recording and leave as a mono 16-bit WAV.
pub struct VoiceRecorder {
    sample_rate: u32,
    capacity: usize,
    session: Option<RecordingSession>,
}

struct RecordingSession {
    producer: HeapProd<f32>,
    consumer: HeapCons<f32>,
    dropped: usize,
}

impl VoiceRecorder {
    pub fn new(sample_rate: u32, max_recording_secs: u32) -> Self {
        Self {
            sample_rate,
            capacity: (sample_rate as usize * max_recording_secs as usize).max(1),
            session: None,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Rejects a second start while a clip is open.
    pub fn start(&mut self, permission_granted: bool) -> Result<(), AudioError> {
        if self.session.is_some() {
            return Err(AudioError::AlreadyActive);
        }
        if !permission_granted {
            return Err(AudioError::PermissionDenied);
        }
        let (producer, consumer) = HeapRb::<f32>::new(self.capacity).split();
        self.session = Some(RecordingSession {
            producer,
            consumer,
            dropped: 0,
        });
        info!(rate = self.sample_rate, "recording started");
        Ok(())
    }

    /// Returns how many samples were kept. Past capacity the tail is dropped.
    pub fn push_samples(&mut self, samples: &[f32]) -> Result<usize, AudioError> {
        let session = self.session.as_mut().ok_or(AudioError::NotActive)?;
        let kept = session.producer.push_slice(samples);
        session.dropped += samples.len() - kept;
        Ok(kept)
    }

    pub fn buffered(&self) -> usize {
        self.session
            .as_ref()
            .map(|s| s.consumer.occupied_len())
            .unwrap_or(0)
    }

    /// Closes the clip and encodes it. The recorder is idle afterwards either way.
    pub fn stop(&mut self) -> Result<Vec<u8>, AudioError> {
        let mut session = self.session.take().ok_or(AudioError::NotActive)?;
        if session.dropped > 0 {
            warn!(dropped = session.dropped, "recording exceeded its buffer");
        }

        let mut samples = vec![0.0f32; session.consumer.occupied_len()];
        let read = session.consumer.pop_slice(&mut samples);
        samples.truncate(read);
        if samples.is_empty() {
            return Err(AudioError::EmptyRecording);
        }

        debug!(samples = samples.len(), "recording stopped");
        encode_wav(&samples, self.sample_rate)
    }

    /// Drops any open clip. Used after an error so the next start succeeds.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            debug!("recorder reset");
        }
    }
}

pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, AudioError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(value)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Reads a WAV clip back into mono f32 samples (first channel only).
pub fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u32), AudioError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(channels)
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok((samples, spec.sample_rate))
}
