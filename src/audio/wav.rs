// WAV inspection and trimming with hound
// Peak-amplitude silence detection plus the fixed and randomized window
// trims used by the time-signature dataset

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use rand::Rng;
use thiserror::Error;

use super::QualityChecker;

/// Errors from the silence check. Non-fatal by contract: callers record
/// an unknown quality flag and keep the row.
#[derive(Debug, Error)]
pub enum QualityCheckError {
    #[error("failed to read WAV file: {0}")]
    WavRead(#[from] hound::Error),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// Errors from trim operations.
#[derive(Debug, Error)]
pub enum TrimError {
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("trim window of {requested}s exceeds source duration {available}s")]
    WindowTooLong { requested: f64, available: f64 },
}

/// Silence detector: an artifact is silent when no sample's normalized
/// amplitude reaches the threshold.
#[derive(Debug, Clone, Copy)]
pub struct PeakAmplitudeChecker {
    pub threshold: f32,
}

impl Default for PeakAmplitudeChecker {
    fn default() -> Self {
        // Comfortably above dither noise, far below audible content.
        PeakAmplitudeChecker { threshold: 1e-4 }
    }
}

impl QualityChecker for PeakAmplitudeChecker {
    fn is_silent(&self, wav_path: &Path) -> Result<bool, QualityCheckError> {
        let mut reader = WavReader::open(wav_path)?;
        let spec = reader.spec();
        let peak = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .try_fold(0f32, |peak, sample| sample.map(|s| peak.max(s.abs())))?,
            (SampleFormat::Int, bits) if bits <= 32 => {
                let full_scale = (1u64 << (bits - 1)) as f32;
                reader.samples::<i32>().try_fold(0f32, |peak, sample| {
                    sample.map(|s| peak.max(s.abs() as f32 / full_scale))
                })?
            }
            (format, bits) => {
                return Err(QualityCheckError::UnsupportedFormat(format!(
                    "{format:?}/{bits}-bit"
                )))
            }
        };
        Ok(peak < self.threshold)
    }
}

/// Duration of a WAV file in seconds.
pub fn duration_secs(wav_path: &Path) -> Result<f64, TrimError> {
    let reader = WavReader::open(wav_path)?;
    let spec = reader.spec();
    let frames = reader.duration();
    Ok(frames as f64 / spec.sample_rate as f64)
}

fn copy_window(
    src: &Path,
    dst: &Path,
    start_frame: u32,
    frame_count: u32,
) -> Result<(), TrimError> {
    let mut reader = WavReader::open(src)?;
    let spec = reader.spec();
    reader.seek(start_frame).map_err(hound::Error::from)?;

    let samples_to_copy = frame_count as usize * spec.channels as usize;
    let mut writer = WavWriter::create(dst, spec)?;
    match spec.sample_format {
        SampleFormat::Float => {
            for sample in reader.samples::<f32>().take(samples_to_copy) {
                writer.write_sample(sample?)?;
            }
        }
        SampleFormat::Int => {
            for sample in reader.samples::<i32>().take(samples_to_copy) {
                writer.write_sample(sample?)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

fn frames_for(spec: &WavSpec, seconds: f64) -> u32 {
    (seconds * spec.sample_rate as f64).round() as u32
}

/// Copy the first `target_secs` of audio to `dst`. A shorter source is
/// copied whole.
pub fn trim(src: &Path, dst: &Path, target_secs: f64) -> Result<(), TrimError> {
    let (spec, total_frames) = {
        let reader = WavReader::open(src)?;
        (reader.spec(), reader.duration())
    };
    let frames = frames_for(&spec, target_secs).min(total_frames);
    copy_window(src, dst, 0, frames)
}

/// Copy a `target_secs` window starting at a random offset, and return
/// the offset in seconds. The rng is supplied by the caller so trims are
/// reproducible under a fixed seed.
pub fn random_trim(
    src: &Path,
    dst: &Path,
    target_secs: f64,
    rng: &mut impl Rng,
) -> Result<f64, TrimError> {
    let (spec, total_frames) = {
        let reader = WavReader::open(src)?;
        (reader.spec(), reader.duration())
    };
    let window_frames = frames_for(&spec, target_secs);
    if window_frames > total_frames {
        return Err(TrimError::WindowTooLong {
            requested: target_secs,
            available: total_frames as f64 / spec.sample_rate as f64,
        });
    }
    let max_start = total_frames - window_frames;
    let start_frame = if max_start == 0 {
        0
    } else {
        rng.random_range(0..=max_start)
    };
    copy_window(src, dst, start_frame, window_frames)?;
    Ok(start_frame as f64 / spec.sample_rate as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;

    fn write_test_wav(dir: &Path, name: &str, seconds: f64, amplitude: f32) -> PathBuf {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let path = dir.join(name);
        let mut writer = WavWriter::create(&path, spec).unwrap();
        let frames = (seconds * spec.sample_rate as f64) as usize;
        for i in 0..frames {
            let phase = i as f32 * 440.0 / spec.sample_rate as f32;
            let value = (phase * std::f32::consts::TAU).sin() * amplitude;
            writer
                .write_sample((value * i16::MAX as f32) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn test_silence_detection() {
        let dir = tempfile::tempdir().unwrap();
        let loud = write_test_wav(dir.path(), "loud.wav", 0.5, 0.5);
        let silent = write_test_wav(dir.path(), "silent.wav", 0.5, 0.0);

        let checker = PeakAmplitudeChecker::default();
        assert!(!checker.is_silent(&loud).unwrap());
        assert!(checker.is_silent(&silent).unwrap());
    }

    #[test]
    fn test_trim_to_target_duration() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_test_wav(dir.path(), "src.wav", 2.0, 0.5);
        let dst = dir.path().join("trimmed.wav");

        trim(&src, &dst, 0.5).unwrap();
        let trimmed = duration_secs(&dst).unwrap();
        assert!((trimmed - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_trim_of_short_source_copies_everything() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_test_wav(dir.path(), "short.wav", 0.25, 0.5);
        let dst = dir.path().join("trimmed.wav");

        trim(&src, &dst, 5.0).unwrap();
        assert!((duration_secs(&dst).unwrap() - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_random_trim_is_reproducible_under_a_seed() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_test_wav(dir.path(), "src.wav", 2.0, 0.5);

        let offset_a = random_trim(
            &src,
            &dir.path().join("a.wav"),
            0.5,
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap();
        let offset_b = random_trim(
            &src,
            &dir.path().join("b.wav"),
            0.5,
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap();

        assert_eq!(offset_a, offset_b);
        assert!((duration_secs(&dir.path().join("a.wav")).unwrap() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_random_trim_rejects_oversized_windows() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_test_wav(dir.path(), "src.wav", 0.5, 0.5);
        let result = random_trim(
            &src,
            &dir.path().join("out.wav"),
            2.0,
            &mut StdRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(TrimError::WindowTooLong { .. })));
    }
}
