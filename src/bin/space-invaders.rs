use pocketcolor::cpu8080::space_invaders::SpaceInvadersMachine;
use std::{env, fs::File, io::Read, path::Path};

fn print_usage() {
    println!("Usage: space-invaders <rom_file> [frames]");
}

/// Cycles per video frame at the board's ~2MHz clock and 60Hz refresh.
const CYCLES_PER_FRAME: u32 = 33_333;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let mut rom = Vec::new();
    File::open(Path::new(&args[1]))?.read_to_end(&mut rom)?;

    let frames: u32 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(60);

    let mut machine = SpaceInvadersMachine::new(&rom);

    for _ in 0..frames {
        let mut cycles = 0u32;
        while cycles < CYCLES_PER_FRAME / 2 {
            cycles += machine.step() as u32;
        }
        machine.interrupt(1); // mid-screen

        while cycles < CYCLES_PER_FRAME {
            cycles += machine.step() as u32;
        }
        machine.interrupt(2); // end-of-frame, vblank
    }

    let checksum: u32 = machine.bus.video_ram().iter().map(|&b| b as u32).sum();
    println!(
        "ran {frames} frames, pc=0x{:04x}, video ram checksum=0x{:08x}",
        machine.cpu.pc, checksum
    );

    Ok(())
}
