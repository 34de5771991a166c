// Emulator module - Main emulator coordinator
//
// This module provides the main emulator interface that coordinates all NES components
// (CPU, PPU, APU, Bus) and implements quality-of-life features like save states,
// screenshots, speed control, and configuration management.

mod config;
mod recent_roms;
mod save_state;
mod scheduler;
mod screenshot;

pub use config::{EmulatorConfig, SpeedMode};
pub use recent_roms::RecentRomsList;
pub use save_state::{SaveState, SaveStateError};
pub use screenshot::{save_screenshot, ScreenshotError};

use crate::bus::Bus;
use crate::cartridge::{mappers::create_mapper, Cartridge, Mapper};
use crate::cpu::Cpu;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

/// Main emulator structure
///
/// Coordinates all NES components and provides high-level functionality
/// for running games, saving/loading states, and managing configuration.
pub struct Emulator {
    /// CPU (6502 processor)
    cpu: Cpu,

    /// Bus (connects all components)
    bus: Bus,

    /// Currently loaded cartridge (retained for metadata; the Bus/PPU talk
    /// to the cartridge through the `Mapper` built from it)
    cartridge: Option<Cartridge>,

    /// Configuration
    config: EmulatorConfig,

    /// Currently loaded ROM path
    rom_path: Option<PathBuf>,

    /// Paused state
    paused: bool,

    /// Speed mode
    speed_mode: SpeedMode,

    /// Frame timing for speed control
    #[allow(dead_code)]
    last_frame_time: Option<Instant>,

    /// Fractional PPU dots owed to the PPU since the last whole dot was
    /// stepped. NTSC's 3 dots/cycle ratio is exact, but this stays a float
    /// so PAL's 3.2 ratio works the same way.
    ppu_dot_credit: f64,

    /// Whether the loaded cartridge targets PAL timing (affects the PPU dot
    /// ratio and frame rate). Defaults to NTSC.
    pal_timing: bool,

    /// Alternates every CPU cycle; fed to `Apu::clock` so half-rate units
    /// (pulse/noise/DMC timers) tick at the correct rate relative to the
    /// quarter/half-rate frame sequencer events.
    apu_cycle_parity: bool,
}

impl Emulator {
    /// Create a new emulator instance
    ///
    /// Initializes all components to their power-on state.
    ///
    /// # Returns
    ///
    /// A new emulator instance
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// ```
    pub fn new() -> Self {
        Emulator {
            cpu: Cpu::new(),
            bus: Bus::new(),
            cartridge: None,
            config: EmulatorConfig::load_or_default(),
            rom_path: None,
            paused: false,
            speed_mode: SpeedMode::Normal,
            last_frame_time: None,
            ppu_dot_credit: 0.0,
            pal_timing: false,
            apu_cycle_parity: false,
        }
    }

    /// Load a ROM file
    ///
    /// Loads a ROM from the specified path and initializes the emulator state.
    /// Adds the ROM to the recent ROMs list.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the ROM file (.nes)
    ///
    /// # Returns
    ///
    /// Result indicating success or error
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.load_rom("game.nes").expect("Failed to load ROM");
    /// ```
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadRomError> {
        let path = path.as_ref();
        let cartridge = Cartridge::from_ines_file(path)?;
        let has_battery = cartridge.has_battery;

        let mapper: Box<dyn Mapper> = create_mapper(cartridge.clone())?;
        let mapper: Rc<RefCell<Box<dyn Mapper>>> = Rc::new(RefCell::new(mapper));
        if has_battery {
            let save_path = battery_save_path(path);
            if let Err(e) = mapper.borrow_mut().load_save(&save_path) {
                eprintln!(
                    "warning: failed to load battery save at {}: {e}",
                    save_path.display()
                );
            }
        }
        self.bus.attach_cartridge(mapper);

        self.cartridge = Some(cartridge);
        self.rom_path = Some(path.to_path_buf());

        // Add to recent ROMs list; this is a convenience feature, so a
        // failure here shouldn't stop the ROM from loading.
        let mut recent_roms = RecentRomsList::load_or_default();
        recent_roms.add(path);
        if let Err(e) = recent_roms.save() {
            eprintln!("warning: failed to update recent ROMs list: {e}");
        }

        // Reset the emulator
        self.reset();

        Ok(())
    }

    /// Persist the loaded cartridge's battery-backed RAM, if any, to its
    /// companion `.sav` file next to the ROM.
    pub fn save_battery_ram(&self) -> std::io::Result<()> {
        let Some(cartridge) = &self.cartridge else {
            return Ok(());
        };
        if !cartridge.has_battery {
            return Ok(());
        }
        let Some(rom_path) = &self.rom_path else {
            return Ok(());
        };
        if let Some(ram) = self.bus.cartridge_ram() {
            let save_path = battery_save_path(rom_path);
            if let Some(dir) = save_path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(save_path, ram)?;
        }
        Ok(())
    }

    /// Reset the emulator
    ///
    /// Resets all components to their power-on state, as if pressing the reset button.
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.reset();
    /// ```
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.paused = false;
    }

    /// Save state to a file
    ///
    /// Saves the complete emulator state to a file slot.
    ///
    /// # Arguments
    ///
    /// * `slot` - Save slot number (0-9)
    ///
    /// # Returns
    ///
    /// Result indicating success or error
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.save_state(0).expect("Failed to save state");
    /// ```
    pub fn save_state(&self, slot: u8) -> Result<(), SaveStateError> {
        let save_state = SaveState::from_emulator(self)?;
        save_state.save_to_file(slot, self.rom_path.as_deref())
    }

    /// Quick save to slot 0
    ///
    /// Convenience method for quick save (F5 hotkey).
    ///
    /// # Returns
    ///
    /// Result indicating success or error
    pub fn quick_save(&self) -> Result<(), SaveStateError> {
        self.save_state(0)
    }

    /// Load state from a file
    ///
    /// Loads the complete emulator state from a file slot.
    ///
    /// # Arguments
    ///
    /// * `slot` - Save slot number (0-9)
    ///
    /// # Returns
    ///
    /// Result indicating success or error
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.load_state(0).expect("Failed to load state");
    /// ```
    pub fn load_state(&mut self, slot: u8) -> Result<(), SaveStateError> {
        let save_state = SaveState::load_from_file(slot, self.rom_path.as_deref())?;
        save_state.restore_to_emulator(self)
    }

    /// Quick load from slot 0
    ///
    /// Convenience method for quick load (F7 hotkey).
    ///
    /// # Returns
    ///
    /// Result indicating success or error
    pub fn quick_load(&mut self) -> Result<(), SaveStateError> {
        self.load_state(0)
    }

    /// Take a screenshot
    ///
    /// Captures the current frame buffer and saves it as a PNG file.
    ///
    /// # Returns
    ///
    /// Result containing the path to the saved screenshot or an error
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// let screenshot_path = emulator.screenshot().expect("Failed to save screenshot");
    /// println!("Screenshot saved to: {}", screenshot_path.display());
    /// ```
    pub fn screenshot(&self) -> Result<PathBuf, ScreenshotError> {
        screenshot::save_screenshot(self.bus.ppu().frame(), self.rom_path.as_deref())
    }

    /// Set speed mode
    ///
    /// Controls emulation speed (normal, fast forward, slow motion).
    ///
    /// # Arguments
    ///
    /// * `mode` - The speed mode to set
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::{Emulator, SpeedMode};
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.set_speed_mode(SpeedMode::FastForward2x);
    /// ```
    pub fn set_speed_mode(&mut self, mode: SpeedMode) {
        self.speed_mode = mode;
    }

    /// Get current speed mode
    ///
    /// # Returns
    ///
    /// The current speed mode
    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    /// Pause the emulator
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.pause();
    /// ```
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the emulator
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.resume();
    /// ```
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause state
    ///
    /// # Example
    ///
    /// ```
    /// use nes_rs::emulator::Emulator;
    ///
    /// let mut emulator = Emulator::new();
    /// emulator.toggle_pause();
    /// ```
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Check if emulator is paused
    ///
    /// # Returns
    ///
    /// true if paused, false otherwise
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Get reference to CPU
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Get mutable reference to CPU
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Get reference to Bus
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Get mutable reference to Bus
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Get reference to configuration
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Get mutable reference to configuration
    pub fn config_mut(&mut self) -> &mut EmulatorConfig {
        &mut self.config
    }

    /// Get the currently loaded ROM path
    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Path to the battery-backed save RAM file for a given ROM, i.e.
/// `games/mario.nes` -> `saves/mario.sav`.
fn battery_save_path(rom_path: &Path) -> PathBuf {
    let stem = rom_path
        .file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("default"));
    PathBuf::from("saves").join(stem).with_extension("sav")
}

/// Errors that can occur while loading a ROM and constructing its mapper.
///
/// Mirrors the iNES parsing and mapper-construction failure modes so the CLI
/// driver can map each one to its documented exit code.
#[derive(Debug)]
pub enum LoadRomError {
    /// The ROM file itself was invalid (bad magic, truncated, or named an
    /// unsupported mapper in its header).
    Ines(crate::cartridge::INesError),
    /// The header named a supported mapper ID but its own construction
    /// failed (e.g. a declared bank count that doesn't add up).
    Mapper(crate::cartridge::mappers::MapperError),
}

impl std::fmt::Display for LoadRomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadRomError::Ines(e) => write!(f, "{e}"),
            LoadRomError::Mapper(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadRomError {}

impl From<crate::cartridge::INesError> for LoadRomError {
    fn from(e: crate::cartridge::INesError) -> Self {
        LoadRomError::Ines(e)
    }
}

impl From<crate::cartridge::mappers::MapperError> for LoadRomError {
    fn from(e: crate::cartridge::mappers::MapperError) -> Self {
        LoadRomError::Mapper(e)
    }
}
