//! 内置音效合成
//!
//! 每个音效由若干声部叠加而成，声部频率可线性滑动，相位为闭式解。
//! 整体再乘以淡入淡出包络，首尾样本为 0。

use std::f64::consts::TAU;
use std::io::Cursor;

use crate::errors::Result;
use crate::models::sounds::entities::SoundEffect;

const FADE_IN_SECS: f64 = 0.005;
const FADE_OUT_SECS: f64 = 0.02;
const MASTER_GAIN: f64 = 0.8;

#[derive(Debug, Clone, Copy)]
enum Wave {
    Sine,
    Triangle,
    /// 奇次谐波叠加的柔和方波
    Square,
    /// 基频加二、三次谐波
    Bright,
}

impl Wave {
    fn sample(self, phase: f64) -> f64 {
        match self {
            Wave::Sine => phase.sin(),
            Wave::Triangle => {
                let x = (phase / TAU).rem_euclid(1.0);
                4.0 * (x - 0.5).abs() - 1.0
            }
            Wave::Square => {
                (phase.sin() + (3.0 * phase).sin() / 3.0 + (5.0 * phase).sin() / 5.0) * 0.8
            }
            Wave::Bright => {
                (phase.sin() + 0.5 * (2.0 * phase).sin() + 0.25 * (3.0 * phase).sin()) / 1.75
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Voice {
    start: f64,
    duration: f64,
    freq_start: f64,
    freq_end: f64,
    wave: Wave,
    gain: f64,
    /// 指数衰减速率（1/秒），0 表示不衰减
    decay: f64,
}

impl Voice {
    fn note(start: f64, duration: f64, freq: f64, wave: Wave, gain: f64, decay: f64) -> Self {
        Self {
            start,
            duration,
            freq_start: freq,
            freq_end: freq,
            wave,
            gain,
            decay,
        }
    }

    fn sweep(start: f64, duration: f64, from: f64, to: f64, wave: Wave, gain: f64, decay: f64) -> Self {
        Self {
            start,
            duration,
            freq_start: from,
            freq_end: to,
            wave,
            gain,
            decay,
        }
    }

    fn sample(&self, t: f64) -> f64 {
        let local = t - self.start;
        if local < 0.0 || local >= self.duration {
            return 0.0;
        }
        // 线性扫频的相位积分
        let slope = (self.freq_end - self.freq_start) / self.duration;
        let phase = TAU * (self.freq_start * local + slope * local * local / 2.0);

        let attack = (local / 0.004).min(1.0);
        let release = ((self.duration - local) / 0.01).min(1.0);
        let envelope = attack * release * (-self.decay * local).exp();
        self.wave.sample(phase) * self.gain * envelope
    }
}

struct Recipe {
    duration: f64,
    voices: Vec<Voice>,
}

fn recipe(effect: SoundEffect) -> Recipe {
    match effect {
        SoundEffect::Chime => Recipe {
            duration: 0.6,
            voices: vec![
                Voice::note(0.0, 0.6, 1046.5, Wave::Sine, 0.6, 5.0),
                Voice::note(0.12, 0.48, 1318.5, Wave::Sine, 0.5, 5.0),
            ],
        },
        SoundEffect::Sparkle => Recipe {
            duration: 0.5,
            voices: [1568.0, 1760.0, 2093.0, 2349.3, 2637.0]
                .iter()
                .enumerate()
                .map(|(i, &f)| {
                    let start = i as f64 * 0.08;
                    Voice::note(start, 0.5 - start, f, Wave::Triangle, 0.35, 12.0)
                })
                .collect(),
        },
        SoundEffect::Coin => Recipe {
            duration: 0.35,
            voices: vec![
                Voice::note(0.0, 0.08, 987.77, Wave::Square, 0.4, 0.0),
                Voice::note(0.08, 0.27, 1318.51, Wave::Square, 0.4, 8.0),
            ],
        },
        SoundEffect::Fanfare => Recipe {
            duration: 0.9,
            voices: [392.0, 523.25, 659.25, 783.99]
                .iter()
                .enumerate()
                .map(|(i, &f)| {
                    let start = i as f64 * 0.15;
                    let length = if i == 3 { 0.9 - start } else { 0.15 };
                    Voice::note(start, length, f, Wave::Bright, 0.5, 1.5)
                })
                .collect(),
        },
        SoundEffect::Buzz => Recipe {
            duration: 0.45,
            voices: vec![
                Voice::note(0.0, 0.45, 110.0, Wave::Square, 0.45, 1.0),
                Voice::note(0.0, 0.45, 116.5, Wave::Square, 0.3, 1.0),
            ],
        },
        SoundEffect::Thud => Recipe {
            duration: 0.3,
            voices: vec![Voice::sweep(0.0, 0.3, 150.0, 50.0, Wave::Sine, 0.9, 10.0)],
        },
        SoundEffect::Descend => Recipe {
            duration: 0.7,
            voices: vec![Voice::sweep(0.0, 0.7, 660.0, 220.0, Wave::Triangle, 0.5, 2.0)],
        },
    }
}

pub fn duration(effect: SoundEffect) -> f64 {
    recipe(effect).duration
}

pub fn sample_count(effect: SoundEffect, sample_rate: u32) -> usize {
    (f64::from(sample_rate) * duration(effect)).round() as usize
}

/// 合成单声道浮点样本，范围 [-1, 1]
pub fn synthesize(effect: SoundEffect, sample_rate: u32) -> Vec<f32> {
    let recipe = recipe(effect);
    let rate = f64::from(sample_rate.max(1));
    let n = sample_count(effect, sample_rate);

    (0..n)
        .map(|i| {
            let t = i as f64 / rate;
            let fade_in = (t / FADE_IN_SECS).min(1.0);
            let fade_out = ((recipe.duration - t) / FADE_OUT_SECS).clamp(0.0, 1.0);
            let mixed: f64 = recipe.voices.iter().map(|v| v.sample(t)).sum();
            ((mixed * MASTER_GAIN * fade_in * fade_out).clamp(-1.0, 1.0)) as f32
        })
        .collect()
}

/// 编码为 16 位单声道 PCM WAV
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec)?;
        for &sample in samples {
            writer.write_sample((sample * f32::from(i16::MAX)) as i16)?;
        }
        writer.finalize()?;
    }
    Ok(buffer.into_inner())
}

pub fn render_wav(effect: SoundEffect, sample_rate: u32) -> Result<Vec<u8>> {
    encode_wav(&synthesize(effect, sample_rate), sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths_and_silent_edges() {
        for effect in SoundEffect::ALL {
            for rate in [8000, 44100] {
                let samples = synthesize(effect, rate);
                let expected = (f64::from(rate) * duration(effect)).round() as usize;
                assert_eq!(samples.len(), expected, "{effect} @ {rate}");
                assert_eq!(samples[0], 0.0, "{effect} first sample");
                assert!(samples[samples.len() - 1].abs() < 0.01, "{effect} last sample");
                assert!(samples.iter().all(|s| s.abs() <= 1.0));
                assert!(samples.iter().any(|s| s.abs() > 0.05), "{effect} is audible");
            }
        }
    }

    #[test]
    fn test_wav_is_16bit_mono() {
        let bytes = render_wav(SoundEffect::Coin, 22050).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(reader.len() as usize, sample_count(SoundEffect::Coin, 22050));
    }
}
