// NES Emulator - Main Entry Point
//
// Parses the `-p=<path>` ROM argument, loads the cartridge, and opens a
// display window driving the real CPU/PPU/APU pipeline. Falls back to the
// display test pattern when no ROM is given, for bring-up of the display
// system on its own.

use nes_rs::display::window::EmulatorHaltedError;
use nes_rs::display::{run_display, run_emulator, WindowConfig};
use nes_rs::emulator::LoadRomError;
use nes_rs::input::InputConfig;
use std::path::PathBuf;
use std::process::ExitCode;

/// Process exit codes, per the CLI contract.
mod exit_code {
    pub const MISSING_PATH: u8 = 1;
    pub const UNREADABLE_FILE: u8 = 2;
    pub const BAD_MAGIC: u8 = 3;
    pub const TRUNCATED: u8 = 4;
    pub const UNSUPPORTED_MAPPER: u8 = 5;
    pub const INVALID_OPCODE: u8 = 6;
}

/// Parse the `-p=<path>` argument out of the process's command line.
///
/// Returns `None` if no such argument was given; the caller decides whether
/// that's an error or a fallback to the display system's test pattern.
fn parse_rom_path() -> Option<PathBuf> {
    std::env::args()
        .find_map(|arg| arg.strip_prefix("-p=").map(PathBuf::from))
}

fn main() -> ExitCode {
    println!("NES Emulator (nes-rs) v0.1.0");
    println!("==============================");
    println!();

    // Load or create input configuration
    let config_path = "input_config.toml";
    let _input_config = InputConfig::load_or_default(config_path);
    println!("Input configuration loaded from '{}'", config_path);
    println!();

    let window_config = WindowConfig::new()
        .with_scale(3) // 768x720 window (256x240 * 3)
        .with_fps(60) // 60 FPS (NTSC)
        .with_vsync(true); // Enable VSync for smooth display

    let Some(rom_path) = parse_rom_path() else {
        eprintln!("no ROM given (-p=<path>); starting display test pattern instead");
        if let Err(e) = run_display(window_config) {
            eprintln!("display error: {e}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    };

    if !rom_path.exists() {
        eprintln!("error: ROM file not found: {}", rom_path.display());
        return ExitCode::from(exit_code::UNREADABLE_FILE);
    }

    println!("Loading ROM: {}", rom_path.display());
    println!("Press the close button or Ctrl+C to exit.");
    println!();

    if let Err(e) = run_emulator(window_config, &rom_path) {
        if let Some(load_err) = e.downcast_ref::<LoadRomError>() {
            let code = match load_err {
                LoadRomError::Ines(ines_err) => match ines_err {
                    nes_rs::INesError::Io(_) => exit_code::UNREADABLE_FILE,
                    nes_rs::INesError::BadMagic => exit_code::BAD_MAGIC,
                    nes_rs::INesError::Truncated => exit_code::TRUNCATED,
                    nes_rs::INesError::UnsupportedMapper(_) => exit_code::UNSUPPORTED_MAPPER,
                },
                LoadRomError::Mapper(mapper_err) => match mapper_err {
                    nes_rs::cartridge::mappers::MapperError::UnsupportedMapper(_) => {
                        exit_code::UNSUPPORTED_MAPPER
                    }
                    nes_rs::cartridge::mappers::MapperError::InvalidConfiguration(_) => {
                        exit_code::TRUNCATED
                    }
                },
            };
            eprintln!("error: {load_err}");
            return ExitCode::from(code);
        }

        if let Some(halt_err) = e.downcast_ref::<EmulatorHaltedError>() {
            eprintln!("error: {halt_err}");
            return ExitCode::from(exit_code::INVALID_OPCODE);
        }

        eprintln!("error: {e}");
        return ExitCode::from(exit_code::INVALID_OPCODE);
    }

    println!("Emulator window closed.");
    ExitCode::SUCCESS
}
