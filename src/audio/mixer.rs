// Audio mixer - Implements NES APU non-linear mixing formula
//
// The NES uses a non-linear mixing approach that simulates the analog
// characteristics of the hardware. This produces more accurate sound
// compared to simple linear mixing.

use crate::apu::constants::{pulse_mix_lut, tnd_mix_lut};

/// APU mixer implementing the NES non-linear mixing formula
///
/// The NES uses separate lookup tables for the pulse channels and the
/// triangle/noise/DMC channels:
///
/// ```text
/// pulse_out = pulse_lut[pulse1 + pulse2]
/// tnd_out = tnd_lut[3*triangle + 2*noise + dmc]
/// output = pulse_out + tnd_out
/// ```
///
/// Where pulse1, pulse2, triangle, noise, and dmc are the raw output
/// values from each channel (0-15 for pulse, 0-15 for triangle,
/// 0-15 for noise, 0-127 for DMC). With every channel silent, `output`
/// is exactly `0.0` - there is no DC offset.
pub struct Mixer {
    /// Volume control (0.0 = mute, 1.0 = full volume)
    volume: f32,
    /// Pulse channel mixing lookup table, indexed by pulse1+pulse2
    pulse_lut: [f32; 31],
    /// Triangle/noise/DMC mixing lookup table, indexed by 3*tri+2*noise+dmc
    tnd_lut: [f32; 203],
}

impl Mixer {
    /// Create a new mixer with full volume
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            pulse_lut: pulse_mix_lut(),
            tnd_lut: tnd_mix_lut(),
        }
    }

    /// Create a new mixer with specified volume
    ///
    /// # Arguments
    ///
    /// * `volume` - Volume level (0.0 = mute, 1.0 = full volume)
    pub fn with_volume(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
            pulse_lut: pulse_mix_lut(),
            tnd_lut: tnd_mix_lut(),
        }
    }

    /// Set the master volume
    ///
    /// # Arguments
    ///
    /// * `volume` - Volume level (0.0 = mute, 1.0 = full volume)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Get the current volume
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Mix all APU channels using the non-linear formula
    ///
    /// # Arguments
    ///
    /// * `pulse1` - Pulse channel 1 output (0-15)
    /// * `pulse2` - Pulse channel 2 output (0-15)
    /// * `triangle` - Triangle channel output (0-15)
    /// * `noise` - Noise channel output (0-15)
    /// * `dmc` - DMC channel output (0-127)
    ///
    /// # Returns
    ///
    /// Mixed audio sample as f32. Silence mixes to exactly `0.0`; the loudest
    /// combination of all five channels is a little above `1.0`.
    pub fn mix(&self, pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) -> f32 {
        let pulse_out = self.mix_pulse(pulse1, pulse2);
        let tnd_out = self.mix_tnd(triangle, noise, dmc);

        (pulse_out + tnd_out) * self.volume
    }

    /// Mix pulse channels using the NES non-linear lookup table
    ///
    /// `pulse_lut[n] = 95.52 / (8128/n + 100)`, `pulse_lut[0] = 0`
    ///
    /// # Arguments
    ///
    /// * `pulse1` - Pulse channel 1 output (0-15)
    /// * `pulse2` - Pulse channel 2 output (0-15)
    ///
    /// # Returns
    ///
    /// Mixed pulse output in range [0.0, ~1.0]
    fn mix_pulse(&self, pulse1: u8, pulse2: u8) -> f32 {
        self.pulse_lut[(pulse1 as usize) + (pulse2 as usize)]
    }

    /// Mix triangle, noise, and DMC channels using the NES non-linear lookup table
    ///
    /// `tnd_lut[n] = 163.67 / (24329/n + 100)`, `tnd_lut[0] = 0`
    ///
    /// # Arguments
    ///
    /// * `triangle` - Triangle channel output (0-15)
    /// * `noise` - Noise channel output (0-15)
    /// * `dmc` - DMC channel output (0-127)
    ///
    /// # Returns
    ///
    /// Mixed TND output in range [0.0, ~1.0]
    fn mix_tnd(&self, triangle: u8, noise: u8, dmc: u8) -> f32 {
        let index = 3 * (triangle as usize) + 2 * (noise as usize) + (dmc as usize);
        self.tnd_lut[index]
    }

    /// Mix channels with individual volume control
    ///
    /// This is useful for debugging individual channels or implementing
    /// per-channel volume control.
    ///
    /// # Arguments
    ///
    /// * `pulse1` - Pulse channel 1 output (0-15)
    /// * `pulse2` - Pulse channel 2 output (0-15)
    /// * `triangle` - Triangle channel output (0-15)
    /// * `noise` - Noise channel output (0-15)
    /// * `dmc` - DMC channel output (0-127)
    /// * `pulse1_vol` - Pulse 1 volume multiplier (0.0-1.0)
    /// * `pulse2_vol` - Pulse 2 volume multiplier (0.0-1.0)
    /// * `triangle_vol` - Triangle volume multiplier (0.0-1.0)
    /// * `noise_vol` - Noise volume multiplier (0.0-1.0)
    /// * `dmc_vol` - DMC volume multiplier (0.0-1.0)
    ///
    /// # Returns
    ///
    /// Mixed audio sample as f32; silence mixes to exactly `0.0`.
    #[allow(dead_code)]
    #[allow(clippy::too_many_arguments)]
    pub fn mix_with_channel_volumes(
        &self,
        pulse1: u8,
        pulse2: u8,
        triangle: u8,
        noise: u8,
        dmc: u8,
        pulse1_vol: f32,
        pulse2_vol: f32,
        triangle_vol: f32,
        noise_vol: f32,
        dmc_vol: f32,
    ) -> f32 {
        // Apply individual channel volumes
        let p1 = (pulse1 as f32 * pulse1_vol.clamp(0.0, 1.0)) as u8;
        let p2 = (pulse2 as f32 * pulse2_vol.clamp(0.0, 1.0)) as u8;
        let tri = (triangle as f32 * triangle_vol.clamp(0.0, 1.0)) as u8;
        let noi = (noise as f32 * noise_vol.clamp(0.0, 1.0)) as u8;
        let d = (dmc as f32 * dmc_vol.clamp(0.0, 1.0)) as u8;

        self.mix(p1, p2, tri, noi, d)
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}
