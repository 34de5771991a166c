// Emulator module - Frame scheduler
//
// Ties the CPU, PPU, and APU together at their real relative clock rates and
// delivers NMI/IRQ at instruction boundaries, the way the real hardware
// interleaves these components: the PPU free-runs off the master clock while
// the CPU only advances between PPU dots, and interrupts are only visible to
// the CPU at the start of its next instruction fetch.

use super::Emulator;
use crate::audio::AudioSystem;

/// PPU dots advanced per CPU cycle.
///
/// NTSC runs the PPU at exactly 3x the CPU clock. PAL runs it at 3.2x, which
/// needs fractional accumulation rather than a flat integer multiplier.
const NTSC_PPU_DOTS_PER_CPU_CYCLE: f64 = 3.0;
const PAL_PPU_DOTS_PER_CPU_CYCLE: f64 = 3.2;

impl Emulator {
    /// Run the emulator until one full PPU frame has completed, stepping the
    /// CPU, PPU, and APU at their correct relative rates.
    ///
    /// Delivers NMI (PPU VBlank) and IRQ (APU frame/DMC IRQ, mapper scanline
    /// IRQ) at CPU instruction boundaries, matching real 6502 interrupt
    /// latency. Stops early if the CPU halts on an illegal opcode.
    ///
    /// If `audio` is given, every APU sample tick (once per CPU cycle) is
    /// mixed down and pushed into it.
    pub fn run_frame(&mut self, mut audio: Option<&mut AudioSystem>) {
        if self.paused || self.cpu.halted {
            return;
        }

        let dots_per_cycle = if self.pal_timing {
            PAL_PPU_DOTS_PER_CPU_CYCLE
        } else {
            NTSC_PPU_DOTS_PER_CPU_CYCLE
        };

        loop {
            let cpu_cycles = self.cpu.step(&mut self.bus);

            let mut frame_complete = false;
            let last_scanline = self.bus.ppu().scanline();
            self.ppu_dot_credit += cpu_cycles as f64 * dots_per_cycle;
            while self.ppu_dot_credit >= 1.0 {
                if self.bus.ppu_mut().step() {
                    frame_complete = true;
                }
                self.ppu_dot_credit -= 1.0;
            }
            if self.bus.ppu().scanline() != last_scanline {
                self.bus.clock_mapper_scanline();
            }

            for _ in 0..cpu_cycles {
                self.apu_cycle_parity = !self.apu_cycle_parity;
                self.bus.apu_mut().clock(self.apu_cycle_parity);

                if let Some(addr) = self.bus.apu_mut().take_pending_dmc_read() {
                    let byte = self.bus.read(addr);
                    self.bus.apu_mut().dmc_load_sample(byte);
                }

                if let Some(audio) = audio.as_deref_mut() {
                    let apu = self.bus.apu();
                    audio.process_apu_sample(
                        apu.pulse1_output(),
                        apu.pulse2_output(),
                        apu.triangle_output(),
                        apu.noise_output(),
                        apu.dmc_output(),
                    );
                }
            }

            if self.bus.ppu_mut().nmi_pending() {
                self.bus.ppu_mut().clear_nmi();
                self.cpu.nmi(&mut self.bus);
            } else if self.bus.apu().irq_pending() || self.bus.mapper_irq_pending() {
                self.cpu.irq(&mut self.bus);
                self.bus.clear_mapper_irq();
            }

            if self.cpu.halted || frame_complete {
                break;
            }
        }
    }

    /// Run a single CPU instruction and its corresponding PPU/APU catch-up,
    /// without waiting for a full frame. Used by the interactive debugger's
    /// single-step mode.
    pub fn step_instruction(&mut self) {
        if self.paused || self.cpu.halted {
            return;
        }

        let dots_per_cycle = if self.pal_timing {
            PAL_PPU_DOTS_PER_CPU_CYCLE
        } else {
            NTSC_PPU_DOTS_PER_CPU_CYCLE
        };

        let cpu_cycles = self.cpu.step(&mut self.bus);

        let last_scanline = self.bus.ppu().scanline();
        self.ppu_dot_credit += cpu_cycles as f64 * dots_per_cycle;
        while self.ppu_dot_credit >= 1.0 {
            self.bus.ppu_mut().step();
            self.ppu_dot_credit -= 1.0;
        }
        if self.bus.ppu().scanline() != last_scanline {
            self.bus.clock_mapper_scanline();
        }

        for _ in 0..cpu_cycles {
            self.apu_cycle_parity = !self.apu_cycle_parity;
            self.bus.apu_mut().clock(self.apu_cycle_parity);
            if let Some(addr) = self.bus.apu_mut().take_pending_dmc_read() {
                let byte = self.bus.read(addr);
                self.bus.apu_mut().dmc_load_sample(byte);
            }
        }

        if self.bus.ppu_mut().nmi_pending() {
            self.bus.ppu_mut().clear_nmi();
            self.cpu.nmi(&mut self.bus);
        } else if self.bus.apu().irq_pending() || self.bus.mapper_irq_pending() {
            self.cpu.irq(&mut self.bus);
            self.bus.clear_mapper_irq();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Emulator;

    #[test]
    fn run_frame_advances_ppu_frame_count() {
        let mut emulator = Emulator::new();
        emulator.reset();
        let start = emulator.bus().ppu().frame_count();
        emulator.run_frame(None);
        assert_eq!(
            emulator.bus().ppu().frame_count(),
            start + 1,
            "one run_frame call should render exactly one frame"
        );
    }

    #[test]
    fn run_frame_stops_on_illegal_opcode() {
        let mut emulator = Emulator::new();
        emulator.reset();
        // $02 is an illegal opcode on the 6502; the CPU halts on it rather
        // than treating it as a NOP.
        emulator.bus_mut().write(emulator.cpu().pc, 0x02);
        emulator.run_frame(None);
        assert!(emulator.cpu().halted, "CPU should halt on illegal opcode");
    }

    #[test]
    fn step_instruction_does_not_run_past_one_instruction_worth_of_ppu_dots() {
        let mut emulator = Emulator::new();
        emulator.reset();
        let before = emulator.bus().ppu().frame_count();
        emulator.step_instruction();
        // A single instruction is nowhere near a full frame (29780 CPU cycles).
        assert_eq!(emulator.bus().ppu().frame_count(), before);
    }
}
