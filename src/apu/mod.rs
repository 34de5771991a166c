// APU module - Audio Processing Unit implementation
//
// This module contains the APU emulation for the NES (Ricoh 2A03): two pulse
// channels, a triangle channel, a noise channel, and a delta modulation
// channel (DMC), driven by a shared frame sequencer.
//
// ## Register Map
//
// ### Pulse 1 ($4000-$4003)
// | Address | Description                           |
// |---------|---------------------------------------|
// | $4000   | Duty cycle, envelope                  |
// | $4001   | Sweep unit                            |
// | $4002   | Timer low byte                        |
// | $4003   | Length counter, timer high bits       |
//
// ### Pulse 2 ($4004-$4007)
// | Address | Description                           |
// |---------|---------------------------------------|
// | $4004   | Duty cycle, envelope                  |
// | $4005   | Sweep unit                            |
// | $4006   | Timer low byte                        |
// | $4007   | Length counter, timer high bits       |
//
// ### Triangle ($4008-$400B)
// | Address | Description                           |
// |---------|---------------------------------------|
// | $4008   | Linear counter                        |
// | $4009   | Unused                                |
// | $400A   | Timer low byte                        |
// | $400B   | Length counter, timer high bits       |
//
// ### Noise ($400C-$400F)
// | Address | Description                           |
// |---------|---------------------------------------|
// | $400C   | Envelope                              |
// | $400D   | Unused                                |
// | $400E   | Mode, period                          |
// | $400F   | Length counter                        |
//
// ### DMC ($4010-$4013)
// | Address | Description                           |
// |---------|---------------------------------------|
// | $4010   | Flags, rate                           |
// | $4011   | Direct load                           |
// | $4012   | Sample address                        |
// | $4013   | Sample length                         |
//
// ### Control ($4015, $4017)
// | Address | Description                           |
// |---------|---------------------------------------|
// | $4015   | Status/Control (R/W)                  |
// | $4017   | Frame counter (W)                     |

pub mod channels;
pub mod components;
pub mod constants;

#[cfg(test)]
#[path = "tests"]
mod integration_tests {
    mod frame_counter_tests;
    mod init_tests;
    mod pulse_tests;
    mod triangle_tests;
}

use crate::bus::MemoryMappedDevice;
use channels::{DmcChannel, NoiseChannel, PulseChannel, TriangleChannel};
use components::{FrameCounter, FrameEvent};
use constants::{pulse_mix_lut, tnd_mix_lut};
use serde::{Deserialize, Serialize};

// ============================================================================
// APU Main Structure
// ============================================================================

/// APU structure representing the Audio Processing Unit state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Apu {
    /// Pulse channel 1
    pub(crate) pulse1: PulseChannel,
    /// Pulse channel 2
    pub(crate) pulse2: PulseChannel,
    /// Triangle channel
    pub(crate) triangle: TriangleChannel,
    /// Noise channel
    pub(crate) noise: NoiseChannel,
    /// DMC (sample playback) channel
    pub(crate) dmc: DmcChannel,

    /// Frame sequencer driving quarter/half frame clocks and the frame IRQ
    frame_sequencer: FrameCounter,

    /// Pending DMC sample read, set when the DMC output unit needs a byte
    /// from CPU memory. The bus is responsible for servicing this and
    /// calling `dmc_load_sample`.
    dmc_read_pending: Option<u16>,

    /// Raw value most recently written to $4015, for diagnostic purposes
    status_control: u8,
    /// Raw value most recently written to $4017, for diagnostic purposes
    frame_counter: u8,

    /// Non-linear mixing lookup tables, rebuilt on construction or restore
    /// rather than serialized (they're a pure function of the constants).
    #[serde(skip, default = "pulse_mix_lut")]
    pulse_table: [f32; 31],
    #[serde(skip, default = "tnd_mix_lut")]
    tnd_table: [f32; 203],
}

impl Apu {
    /// Create a new APU instance with default state
    ///
    /// Initializes all registers to their power-on state.
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::apu::Apu;
    ///
    /// let apu = Apu::new();
    /// ```
    pub fn new() -> Self {
        Apu {
            pulse1: PulseChannel::new(1),
            pulse2: PulseChannel::new(2),
            triangle: TriangleChannel::new(),
            noise: NoiseChannel::new(),
            dmc: DmcChannel::new(),
            frame_sequencer: FrameCounter::new(),
            dmc_read_pending: None,
            status_control: 0x00,
            frame_counter: 0x00,
            pulse_table: pulse_mix_lut(),
            tnd_table: tnd_mix_lut(),
        }
    }

    /// Reset APU to power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Clock the APU timer (called every CPU cycle)
    ///
    /// Pulse, noise, and DMC timers are clocked every other CPU cycle (the
    /// APU runs at half the CPU clock); the triangle timer is clocked every
    /// CPU cycle. The frame sequencer advances every CPU cycle and dispatches
    /// quarter/half-frame events as it crosses its step boundaries.
    pub fn clock(&mut self, apu_cycle: bool) {
        self.triangle.clock_timer();

        if apu_cycle {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
            self.noise.clock_timer();
            self.dmc.clock_timer();
            if let Some(addr) = self.dmc.needs_sample_read() {
                self.dmc_read_pending = Some(addr);
            }
        }

        for event in self.frame_sequencer.clock() {
            self.dispatch_frame_event(event);
        }
    }

    fn dispatch_frame_event(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::QuarterFrame => self.clock_quarter_frame(),
            FrameEvent::HalfFrame => self.clock_half_frame(),
            FrameEvent::SetIrq => {}
        }
    }

    /// Clock the frame sequencer quarter frame: envelopes and the triangle's
    /// linear counter.
    pub fn clock_quarter_frame(&mut self) {
        self.pulse1.clock_envelope();
        self.pulse2.clock_envelope();
        self.noise.clock_envelope();
        self.triangle.clock_linear_counter();
    }

    /// Clock the frame sequencer half frame: everything a quarter frame
    /// clocks, plus length counters and the sweep units.
    pub fn clock_half_frame(&mut self) {
        self.clock_quarter_frame();

        self.pulse1.clock_length_counter();
        self.pulse1.clock_sweep();
        self.pulse2.clock_length_counter();
        self.pulse2.clock_sweep();
        self.triangle.clock_length_counter();
        self.noise.clock_length_counter();
    }

    /// Returns `Some(address)` if the DMC needs a sample byte fetched from
    /// CPU memory, taking and clearing the pending request.
    pub fn take_pending_dmc_read(&mut self) -> Option<u16> {
        self.dmc_read_pending.take()
    }

    /// Feed a sample byte read by the bus back to the DMC channel.
    pub fn dmc_load_sample(&mut self, byte: u8) {
        self.dmc.load_sample_byte(byte);
    }

    /// Whether the frame sequencer or DMC channel has a pending IRQ.
    pub fn irq_pending(&self) -> bool {
        self.frame_sequencer.irq_pending() || self.dmc.irq_pending()
    }

    /// Whether the frame sequencer specifically has a pending IRQ (bit 6 of $4015).
    pub fn frame_irq_pending(&self) -> bool {
        self.frame_sequencer.irq_pending()
    }

    /// Get the mixed output sample from all channels (normalized to `[0, 1]`)
    ///
    /// Uses the NES's non-linear mixing formulas:
    /// `pulse_out = 95.52 / (8128 / (pulse1 + pulse2) + 100)`
    /// `tnd_out   = 163.67 / (24329 / (3*tri + 2*noise + dmc) + 100)`
    pub fn output(&self) -> f32 {
        let pulse_index = (self.pulse1.output() + self.pulse2.output()) as usize;
        let tnd_index = (3 * self.triangle.output() as usize)
            + (2 * self.noise.output() as usize)
            + self.dmc.output() as usize;

        self.pulse_table[pulse_index] + self.tnd_table[tnd_index]
    }

    /// Get the output from pulse channel 1 (0-15)
    pub fn pulse1_output(&self) -> u8 {
        self.pulse1.output()
    }

    /// Get the output from pulse channel 2 (0-15)
    pub fn pulse2_output(&self) -> u8 {
        self.pulse2.output()
    }

    /// Get the output from the triangle channel (0-15)
    pub fn triangle_output(&self) -> u8 {
        self.triangle.output()
    }

    /// Get the output from the noise channel (0-15)
    pub fn noise_output(&self) -> u8 {
        self.noise.output()
    }

    /// Get the output from the DMC channel (0-127)
    pub fn dmc_output(&self) -> u8 {
        self.dmc.output()
    }

    /// Read from an APU register
    fn read_register(&mut self, addr: u16) -> u8 {
        match addr {
            // Pulse, triangle, noise, and the first three DMC registers are write-only.
            0x4000..=0x4013 => 0,

            // $4014: OAM DMA - not part of the APU, handled by the bus
            0x4014 => 0,

            // $4015: Status - channel active bits, frame IRQ, DMC IRQ.
            // Reading this register clears the frame interrupt flag.
            0x4015 => {
                let mut status = 0u8;
                if self.pulse1.is_active() {
                    status |= 0x01;
                }
                if self.pulse2.is_active() {
                    status |= 0x02;
                }
                if self.triangle.is_active() {
                    status |= 0x04;
                }
                if self.noise.is_active() {
                    status |= 0x08;
                }
                if self.dmc.is_active() {
                    status |= 0x10;
                }
                if self.frame_sequencer.irq_pending() {
                    status |= 0x40;
                }
                if self.dmc.irq_pending() {
                    status |= 0x80;
                }

                self.frame_sequencer.clear_irq();

                status
            }

            // $4016: Controller 1 - not part of the APU
            0x4016 => 0,

            // $4017: Frame counter / controller 2 - write only for the frame counter
            0x4017 => 0,

            _ => 0,
        }
    }

    /// Write to an APU register
    fn write_register(&mut self, addr: u16, data: u8) {
        match addr {
            // Pulse 1 ($4000-$4003)
            0x4000 => self.pulse1.write_register_0(data),
            0x4001 => self.pulse1.write_register_1(data),
            0x4002 => self.pulse1.write_register_2(data),
            0x4003 => self.pulse1.write_register_3(data),

            // Pulse 2 ($4004-$4007)
            0x4004 => self.pulse2.write_register_0(data),
            0x4005 => self.pulse2.write_register_1(data),
            0x4006 => self.pulse2.write_register_2(data),
            0x4007 => self.pulse2.write_register_3(data),

            // Triangle ($4008-$400B)
            0x4008 => self.triangle.write_register_0(data),
            0x4009 => self.triangle.write_register_1(data),
            0x400A => self.triangle.write_register_2(data),
            0x400B => self.triangle.write_register_3(data),

            // Noise ($400C-$400F)
            0x400C => self.noise.write_register_0(data),
            0x400D => self.noise.write_register_1(data),
            0x400E => self.noise.write_register_2(data),
            0x400F => self.noise.write_register_3(data),

            // DMC ($4010-$4013)
            0x4010 => self.dmc.write_register_0(data),
            0x4011 => self.dmc.write_register_1(data),
            0x4012 => self.dmc.write_register_2(data),
            0x4013 => self.dmc.write_register_3(data),

            // $4014: OAM DMA - not part of the APU, handled by the bus
            0x4014 => {}

            // $4015: Status/Control - enable/disable channels
            // Bit 0: Enable Pulse 1      Bit 3: Enable Noise
            // Bit 1: Enable Pulse 2      Bit 4: Enable DMC
            // Bit 2: Enable Triangle
            0x4015 => {
                self.status_control = data;
                self.pulse1.set_enabled((data & 0x01) != 0);
                self.pulse2.set_enabled((data & 0x02) != 0);
                self.triangle.set_enabled((data & 0x04) != 0);
                self.noise.set_enabled((data & 0x08) != 0);
                self.dmc.set_enabled((data & 0x10) != 0);
                if let Some(addr) = self.dmc.needs_sample_read() {
                    self.dmc_read_pending = Some(addr);
                }
            }

            // $4016: Controller 1 - not part of the APU
            0x4016 => {}

            // $4017: Frame Counter
            // Bit 6: IRQ inhibit flag
            // Bit 7: Sequencer mode (0 = 4-step, 1 = 5-step)
            0x4017 => {
                self.frame_counter = data;
                for event in self.frame_sequencer.write_control(data) {
                    self.dispatch_frame_event(event);
                }
            }

            _ => {}
        }
    }
}

impl MemoryMappedDevice for Apu {
    /// Read a byte from APU registers
    fn read(&mut self, addr: u16) -> u8 {
        self.read_register(addr)
    }

    /// Write a byte to APU registers
    fn write(&mut self, addr: u16, data: u8) {
        self.write_register(addr, data);
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}
