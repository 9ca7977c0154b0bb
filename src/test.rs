use pocketcolor_common::error::Error;

use crate::{
    devices::buffer::BufferDevice,
    gb::{GameBoy, GameBoyMode},
    ppu::FRAME_BUFFER_SIZE,
};

#[derive(Default)]
pub struct TestOptions {
    pub mode: Option<GameBoyMode>,
    pub ppu_enabled: Option<bool>,
    pub apu_enabled: Option<bool>,
    pub dma_enabled: Option<bool>,
    pub timer_enabled: Option<bool>,
    pub boot: bool,
}

pub fn build_test(options: TestOptions) -> Box<GameBoy> {
    let device = Box::<BufferDevice>::default();
    let mut game_boy = Box::new(GameBoy::new(options.mode));
    game_boy.set_ppu_enabled(options.ppu_enabled.unwrap_or(true));
    game_boy.set_apu_enabled(options.apu_enabled.unwrap_or(true));
    game_boy.set_dma_enabled(options.dma_enabled.unwrap_or(true));
    game_boy.set_timer_enabled(options.timer_enabled.unwrap_or(true));
    game_boy.attach_serial(device);
    game_boy.load(options.boot).unwrap();
    game_boy
}

/// Builds a test machine loaded with a cartridge whose ROM bank 0 holds
/// `program`, starting at 0x0150 (right after the header), and runs the
/// CPU until it reaches `addr` or `max_cycles` elapses, whichever comes
/// first. Useful for exercising short hand-assembled instruction
/// sequences without depending on external ROM fixtures.
pub fn run_program(program: &[u8], addr: u16, max_cycles: u64, options: TestOptions) -> Box<GameBoy> {
    let mut data = [0u8; 32 * 1024];
    data[0x0150..0x0150 + program.len()].copy_from_slice(program);
    let mut game_boy = build_test(options);
    game_boy.load_rom(&data, None).unwrap();
    game_boy.cpu().set_pc(0x0150);
    let mut cycles = 0u64;
    while game_boy.cpu_i().pc() != addr && cycles < max_cycles {
        cycles += game_boy.clock() as u64;
    }
    game_boy
}

pub fn run_test(
    rom_path: &str,
    max_cycles: Option<u64>,
    options: TestOptions,
) -> Result<Box<GameBoy>, Error> {
    let max_cycles = max_cycles.unwrap_or(u64::MAX);
    let mut game_boy = build_test(options);
    game_boy.load_rom_file(rom_path, None)?;
    game_boy.clocks_cycles(max_cycles as usize);
    Ok(game_boy)
}

pub fn run_step_test(
    rom_path: &str,
    addr: u16,
    options: TestOptions,
) -> Result<Box<GameBoy>, Error> {
    let mut game_boy = build_test(options);
    game_boy.load_rom_file(rom_path, None)?;
    game_boy.step_to(addr);
    Ok(game_boy)
}

pub fn run_serial_test(
    rom_path: &str,
    max_cycles: Option<u64>,
    options: TestOptions,
) -> Result<(String, Box<GameBoy>), Error> {
    let mut game_boy = run_test(rom_path, max_cycles, options)?;
    Ok((game_boy.serial().device().state(), game_boy))
}

pub fn run_image_test(
    rom_path: &str,
    max_cycles: Option<u64>,
    options: TestOptions,
) -> Result<([u8; FRAME_BUFFER_SIZE], Box<GameBoy>), Error> {
    let mut game_boy = run_test(rom_path, max_cycles, options)?;
    Ok((*game_boy.frame_buffer(), game_boy))
}

#[cfg(test)]
mod tests {
    use crate::consts::{IF_ADDR, NR10_ADDR, NR12_ADDR, NR13_ADDR, NR14_ADDR, TAC_ADDR, TIMA_ADDR, TMA_ADDR};

    use super::{run_program, TestOptions};

    #[test]
    fn test_boot_state() {
        let game_boy = run_program(&[0x00], 0x0151, 10, TestOptions { boot: true, ..Default::default() });

        assert_eq!(game_boy.cpu_i().sp(), 0xfffe);
        assert_eq!(game_boy.cpu_i().af(), 0x01b0);
        assert_eq!(game_boy.cpu_i().bc(), 0x0013);
        assert_eq!(game_boy.cpu_i().de(), 0x00d8);
        assert_eq!(game_boy.cpu_i().hl(), 0x014d);
        assert!(!game_boy.cpu_i().ime());
    }

    #[test]
    fn test_daa_after_add() {
        // LD A,0x45 ; LD B,0x38 ; ADD A,B ; DAA ; HALT
        let program = [0x3e, 0x45, 0x06, 0x38, 0x80, 0x27, 0x76];
        let game_boy = run_program(&program, 0x0156, 1_000, TestOptions::default());

        assert_eq!(game_boy.cpu_i().af() >> 8, 0x83);
        assert!(!game_boy.cpu_i().half_carry());
        assert!(!game_boy.cpu_i().carry());
    }

    #[test]
    fn test_timer_irq_timing() {
        // Select the fastest TAC divider (every 16 cycles) and preload
        // TIMA one tick away from overflow so the IRQ fires promptly.
        let mut game_boy = run_program(&[0x76], 0x0151, 4, TestOptions::default());
        game_boy.write_memory(TMA_ADDR, 0x00);
        game_boy.write_memory(TIMA_ADDR, 0xff);
        game_boy.write_memory(TAC_ADDR, 0x05);

        let mut cycles = 0;
        while game_boy.mmu().read(IF_ADDR) & 0x04 == 0x00 && cycles < 1_000 {
            game_boy.timer_clock(4);
            cycles += 4;
        }

        assert_eq!(game_boy.mmu().read(IF_ADDR) & 0x04, 0x04);
        assert_eq!(game_boy.mmu().read(TIMA_ADDR), 0x00);
    }

    #[test]
    fn test_ch1_sweep_disables_on_overflow() {
        let mut game_boy = run_program(&[0x76], 0x0151, 4, TestOptions::default());
        // Sweep up, fastest pace, maximum slope.
        game_boy.write_memory(NR10_ADDR, 0x71);
        game_boy.write_memory(NR12_ADDR, 0xf0);
        game_boy.write_memory(NR13_ADDR, 0xff);
        // Trigger with the wavelength already near the 11-bit ceiling.
        game_boy.write_memory(NR14_ADDR, 0x87);

        for _ in 0..4096 {
            game_boy.apu_clock(32);
        }

        assert_eq!(game_boy.apu().read(0xff26) & 0x01, 0x00);
    }
}
