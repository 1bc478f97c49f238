use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::Source;
use std::time::Duration;

/// White noise generator: flat power across the spectrum, the steady hiss
/// used as the ambient focus track.
pub struct WhiteNoise {
    sample_rate: u32,
    rng: StdRng,
}

impl WhiteNoise {
    pub fn new() -> Self {
        Self {
            sample_rate: 44100,
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for WhiteNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for WhiteNoise {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample: f32 = self.rng.gen_range(-1.0..1.0);

        Some(sample * 0.25) // Scale down amplitude
    }
}

impl Source for WhiteNoise {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1 // Mono
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
