//! Space Invaders arcade board driver: the 8080 core wired to the
//! board's memory map and its one piece of custom hardware, a 16-bit
//! bit-shift register used to do fast fine-pixel scrolling math in
//! software. Grounded in `examples/original_source/space_invaders.c`.
//!
//! The real board raises `RST 2` off a video-sync timer; this driver
//! leaves *when* to call [`SpaceInvadersMachine::interrupt`] to the
//! caller rather than starting a wall-clock timer of its own, there's
//! no host clock to synchronize against in a headless test harness.

use super::i8080::{Bus8080, I8080};

const ROM_SIZE: usize = 0x2000;
const RAM_SIZE: usize = 0x2000; // work RAM (0x2000-0x23ff) + video RAM (0x2400-0x3fff)

/// The board's address space and I/O ports: two ROM halves mapped
/// read-only, a shared work/video RAM region, and the bit-shift
/// register on ports 2-4.
pub struct SpaceInvadersBus {
    rom: Vec<u8>,
    ram: Vec<u8>,
    shift0: u8,
    shift1: u8,
    shift_offset: u8,
}

impl SpaceInvadersBus {
    pub fn new(rom: &[u8]) -> Self {
        let mut data = vec![0u8; ROM_SIZE];
        let len = rom.len().min(ROM_SIZE);
        data[..len].copy_from_slice(&rom[..len]);

        Self {
            rom: data,
            ram: vec![0u8; RAM_SIZE],
            shift0: 0,
            shift1: 0,
            shift_offset: 0,
        }
    }

    /// The video RAM window (`0x2400-0x3fff`), exposed for harnesses
    /// that want to inspect the framebuffer without caring about the
    /// rest of the address space.
    pub fn video_ram(&self) -> &[u8] {
        &self.ram[0x0400..]
    }
}

impl Bus8080 for SpaceInvadersBus {
    fn read(&mut self, addr: u16) -> u8 {
        let addr = addr & 0x3fff;
        if (addr as usize) < ROM_SIZE {
            self.rom[addr as usize]
        } else {
            self.ram[addr as usize - ROM_SIZE]
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        let addr = addr & 0x3fff;
        if (addr as usize) >= ROM_SIZE {
            self.ram[addr as usize - ROM_SIZE] = value;
        }
    }

    fn input(&mut self, port: u8) -> u8 {
        match port {
            3 => {
                let shifted = ((self.shift1 as u16) << 8 | self.shift0 as u16) >> (8 - self.shift_offset);
                shifted as u8
            }
            // ports 0/1/2 carry coin slot, start buttons and dip
            // switches, stubbed since no control input drives this
            // harness
            _ => 0,
        }
    }

    fn output(&mut self, port: u8, value: u8) {
        match port {
            2 => self.shift_offset = value & 0x07,
            4 => {
                self.shift0 = self.shift1;
                self.shift1 = value;
            }
            // port 3 (sound) and port 5 (sound/watchdog) are not
            // modeled, the harness exercises the CPU, not the board's
            // audio hardware
            _ => {}
        }
    }
}

/// Wraps the 8080 core and the board bus together with the interrupt
/// entry point the real hardware drives off its video timer.
pub struct SpaceInvadersMachine {
    pub cpu: I8080,
    pub bus: SpaceInvadersBus,
}

impl SpaceInvadersMachine {
    pub fn new(rom: &[u8]) -> Self {
        Self {
            cpu: I8080::new(),
            bus: SpaceInvadersBus::new(rom),
        }
    }

    pub fn step(&mut self) -> u8 {
        self.cpu.step(&mut self.bus).cycles
    }

    /// Services an `RST n` interrupt if the CPU has interrupts
    /// enabled, mirroring how `space_invaders.c` fires `RST 2` at
    /// mid-screen and `RST 1` at end-of-frame. Disables further
    /// interrupts the way the real 8080 does on acknowledgement, the
    /// ROM re-enables them with `EI` once it's done handling one.
    pub fn interrupt(&mut self, rst_number: u8) {
        if !self.cpu.int_enable {
            return;
        }
        self.cpu.int_enable = false;
        let pc = self.cpu.pc;
        self.cpu.sp = self.cpu.sp.wrapping_sub(2);
        let [hi, lo] = pc.to_be_bytes();
        self.bus.write(self.cpu.sp, lo);
        self.bus.write(self.cpu.sp.wrapping_add(1), hi);
        self.cpu.pc = (rst_number as u16) * 8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_register() {
        let rom = vec![0u8; 4];
        let mut machine = SpaceInvadersMachine::new(&rom);

        machine.bus.output(2, 7); // shift offset 7
        machine.bus.output(4, 0xff);
        machine.bus.output(4, 0x01);

        // shift1=0x01, shift0=0xff -> (0x01ff) >> (8-7) = 0xff
        assert_eq!(machine.bus.input(3), 0xff);
    }

    #[test]
    fn test_rom_reads_back_and_ram_is_writable() {
        let mut rom = vec![0u8; ROM_SIZE];
        rom[0] = 0xaa;
        let mut machine = SpaceInvadersMachine::new(&rom);

        assert_eq!(machine.bus.read(0x0000), 0xaa);

        machine.bus.write(0x2400, 0x42);
        assert_eq!(machine.bus.read(0x2400), 0x42);
        assert_eq!(machine.bus.video_ram()[0], 0x42);
    }

    #[test]
    fn test_interrupt_pushes_return_address_and_disables_ime() {
        let rom = vec![0u8; 4];
        let mut machine = SpaceInvadersMachine::new(&rom);
        machine.cpu.int_enable = true;
        machine.cpu.pc = 0x1234;
        machine.cpu.sp = 0x2500;

        machine.interrupt(2);

        assert_eq!(machine.cpu.pc, 0x10);
        assert!(!machine.cpu.int_enable);
        assert_eq!(machine.bus.read(0x24fe), 0x34);
        assert_eq!(machine.bus.read(0x24ff), 0x12);
    }
}
