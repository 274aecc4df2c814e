use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use super::HeightMap;

const NOISE_OCTAVES: i32 = 5;
const NOISE_GAIN: f32 = 0.5;
const NOISE_LACUNARITY: f32 = 2.0;

impl HeightMap {
    /// Procedural fBm height map normalized to `[0,1]`.
    ///
    /// `frequency` is in cycles per pixel; around `4.0 / width` gives a few
    /// hills across the map.
    pub fn from_noise(width: usize, height: usize, seed: i32, frequency: f32) -> HeightMap {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(frequency));
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(NOISE_OCTAVES));
        noise.set_fractal_gain(Some(NOISE_GAIN));
        noise.set_fractal_lacunarity(Some(NOISE_LACUNARITY));

        HeightMap::from_fn(width, height, |col, row| {
            let raw = noise.get_noise_2d(col as f32, row as f32);
            // fBm with OpenSimplex2 outputs in [-1, 1]
            ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
        })
    }
}
