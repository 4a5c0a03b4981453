/// WAV I/O between the pipeline and ffmpeg
use crate::error::{MasteringError, Result};
use std::path::Path;
use xz_core::AudioBuffer;

/// Write a buffer as 32-bit float WAV
pub fn write_float_wav(path: &Path, audio: &AudioBuffer) -> Result<()> {
    let channels = u16::try_from(audio.channels())
        .map_err(|_| MasteringError::unsupported("channels", audio.channels().to_string()))?;
    let spec = hound::WavSpec {
        channels,
        sample_rate: audio.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in audio.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a WAV file into a buffer with samples clamped to [-1, 1]
pub fn read_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| v.clamp(-1.0, 1.0)))
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| (v as f32 / max_val).clamp(-1.0, 1.0)))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    Ok(AudioBuffer::from_interleaved(
        samples,
        usize::from(spec.channels),
        spec.sample_rate,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_wav_keeps_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let audio = AudioBuffer::from_interleaved(vec![0.0, 0.5, -0.25, 0.75], 2, 48_000).unwrap();

        write_float_wav(&path, &audio).unwrap();
        let back = read_wav(&path).unwrap();

        assert_eq!(back, audio);
    }

    #[test]
    fn read_clamps_overs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hot.wav");
        let audio = AudioBuffer::from_interleaved(vec![1.5, -2.0, 0.5], 1, 44_100).unwrap();
        write_float_wav(&path, &audio).unwrap();

        let back = read_wav(&path).unwrap();

        assert_eq!(back.samples(), &[1.0, -1.0, 0.5]);
    }

    #[test]
    fn reads_integer_pcm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pcm16.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        writer.write_sample(i16::MAX).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.write_sample(i16::MIN).unwrap();
        writer.finalize().unwrap();

        let back = read_wav(&path).unwrap();

        assert!((back.samples()[0] - 1.0).abs() < 1e-4);
        assert_eq!(back.samples()[1], 0.0);
        assert_eq!(back.samples()[2], -1.0);
    }
}
