//! Audio capture from microphone
//!
//! Records a fixed-duration mono clip from the default input device and
//! writes it as 16-bit PCM WAV to a scratch path, overwriting any prior
//! clip. Capture blocks the caller for the full duration; there is no
//! early stop or voice-activity detection.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};

use crate::error::CaptureError;

/// Captures audio from the default input device
pub struct AudioCapture {
    sample_rate: u32,
}

impl AudioCapture {
    /// Create a capture instance for the given sample rate
    ///
    /// Device lookup happens per recording so an unplugged microphone is a
    /// per-turn failure, not a startup one.
    #[must_use]
    pub const fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Record `duration` of audio to `path`, overwriting
    ///
    /// Blocks for the full duration, then encodes the captured samples as
    /// 16-bit mono WAV.
    ///
    /// # Errors
    ///
    /// Returns error if no input device is available, the stream fails, or
    /// the WAV write fails
    pub fn record(&self, path: &Path, duration: Duration) -> Result<PathBuf, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| CaptureError::Stream(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(self.sample_rate)
                    && c.max_sample_rate() >= SampleRate(self.sample_rate)
            })
            .ok_or(CaptureError::NoSuitableConfig {
                sample_rate: self.sample_rate,
            })?;

        let config: StreamConfig = supported_config
            .with_sample_rate(SampleRate(self.sample_rate))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = self.sample_rate,
            duration_secs = duration.as_secs(),
            "recording"
        );

        let buffer = Arc::new(Mutex::new(Vec::<f32>::new()));
        let buffer_clone = Arc::clone(&buffer);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer_clone.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;
        std::thread::sleep(duration);
        drop(stream);

        let mut samples = buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();

        // The callback can deliver a partial extra block past the duration
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected = (duration.as_secs_f64() * f64::from(self.sample_rate)) as usize;
        samples.truncate(expected);

        write_wav(path, &samples, self.sample_rate)?;

        tracing::debug!(path = %path.display(), samples = samples.len(), "clip saved");
        Ok(path.to_path_buf())
    }
}

/// Write f32 samples as a 16-bit mono WAV file
fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), CaptureError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let encode = |e: hound::Error| CaptureError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(encode)?;

    for &sample in samples {
        // f32 [-1.0, 1.0] to i16
        #[allow(clippy::cast_possible_truncation)]
        let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(sample_i16).map_err(encode)?;
    }

    writer.finalize().map_err(encode)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_wav_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        let samples: Vec<f32> = (0..1600).map(|i| f32::from(i as i16) / 32768.0).collect();
        write_wav(&path, &samples, 16_000).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 1600);
    }

    #[test]
    fn test_write_wav_clamps_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hot.wav");

        write_wav(&path, &[2.0, -2.0], 16_000).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples().map(Result::unwrap).collect();
        assert_eq!(samples, vec![32767, -32768]);
    }
}
