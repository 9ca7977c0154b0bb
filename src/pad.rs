//! Joypad functions and structures.

use pocketcolor_common::{
    data::{read_u8, write_u8},
    error::Error,
};

use crate::{
    mmu::BusComponent,
    state::{StateComponent, StateFormat},
};

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

pub struct Pad {
    down: bool,
    up: bool,
    left: bool,
    right: bool,
    start: bool,
    select: bool,
    b: bool,
    a: bool,
    selection: PadSelection,

    /// Boolean value set when a newly-pressed key transitions the
    /// currently selected row's output bit from high to low, requesting
    /// the joypad interrupt to be handled by the next CPU clock.
    int_pad: bool,
}

#[derive(Clone, Copy, PartialEq)]
pub enum PadSelection {
    Action,
    Direction,
}

#[cfg_attr(feature = "wasm", wasm_bindgen)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PadKey {
    Up,
    Down,
    Left,
    Right,
    Start,
    Select,
    A,
    B,
}

impl Pad {
    pub fn new() -> Self {
        Self {
            down: false,
            up: false,
            left: false,
            right: false,
            start: false,
            select: false,
            b: false,
            a: false,
            selection: PadSelection::Action,
            int_pad: false,
        }
    }

    pub fn reset(&mut self) {
        self.down = false;
        self.up = false;
        self.left = false;
        self.right = false;
        self.start = false;
        self.select = false;
        self.b = false;
        self.a = false;
        self.selection = PadSelection::Action;
        self.int_pad = false;
    }

    /// Returns the row-select output byte for the currently active
    /// selection, each bit active low and set to 1 when no key in the
    /// row is currently pressed.
    fn row_bits(&self) -> u8 {
        match self.selection {
            PadSelection::Action => {
                (if self.a { 0x00 } else { 0x01 })
                    | (if self.b { 0x00 } else { 0x02 })
                    | (if self.select { 0x00 } else { 0x04 })
                    | (if self.start { 0x00 } else { 0x08 })
            }
            PadSelection::Direction => {
                (if self.right { 0x00 } else { 0x01 })
                    | (if self.left { 0x00 } else { 0x02 })
                    | (if self.up { 0x00 } else { 0x04 })
                    | (if self.down { 0x00 } else { 0x08 })
            }
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr & 0x00ff {
            0x0000 => {
                let mut value = self.row_bits();
                value |= if self.selection == PadSelection::Direction {
                    0x10
                } else {
                    0x00
                } | if self.selection == PadSelection::Action {
                    0x20
                } else {
                    0x00
                };
                value | 0xc0
            }
            addr => panic!("Reading from unknown Pad location 0x{:04x}", addr),
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr & 0x00ff {
            0x0000 => {
                self.selection = if value & 0x20 == 0x00 {
                    PadSelection::Action
                } else if value & 0x10 == 0x00 {
                    PadSelection::Direction
                } else {
                    self.selection
                }
            }
            addr => panic!("Writing to unknown Pad location 0x{:04x}", addr),
        }
    }

    pub fn key_press(&mut self, key: PadKey) {
        // only the high-to-low transition of a bit in the currently
        // selected row is able to trigger the joypad interrupt, so the
        // previous state of the row is captured before the key itself
        // is updated
        let before = self.row_bits();

        match key {
            PadKey::Up => self.up = true,
            PadKey::Down => self.down = true,
            PadKey::Left => self.left = true,
            PadKey::Right => self.right = true,
            PadKey::Start => self.start = true,
            PadKey::Select => self.select = true,
            PadKey::A => self.a = true,
            PadKey::B => self.b = true,
        }

        let after = self.row_bits();
        if before & !after != 0 {
            self.int_pad = true;
        }
    }

    pub fn key_lift(&mut self, key: PadKey) {
        match key {
            PadKey::Up => self.up = false,
            PadKey::Down => self.down = false,
            PadKey::Left => self.left = false,
            PadKey::Right => self.right = false,
            PadKey::Start => self.start = false,
            PadKey::Select => self.select = false,
            PadKey::A => self.a = false,
            PadKey::B => self.b = false,
        }
    }

    #[inline(always)]
    pub fn int_pad(&self) -> bool {
        self.int_pad
    }

    #[inline(always)]
    pub fn set_int_pad(&mut self, value: bool) {
        self.int_pad = value;
    }

    #[inline(always)]
    pub fn ack_pad(&mut self) {
        self.set_int_pad(false);
    }
}

impl BusComponent for Pad {
    fn read(&self, addr: u16) -> u8 {
        self.read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.write(addr, value);
    }
}

impl Default for Pad {
    fn default() -> Self {
        Self::new()
    }
}

impl StateComponent for Pad {
    fn state(&self, _format: Option<StateFormat>) -> Result<Vec<u8>, Error> {
        let mut data = Vec::new();
        let flags = (self.down as u8)
            | (self.up as u8) << 1
            | (self.left as u8) << 2
            | (self.right as u8) << 3
            | (self.start as u8) << 4
            | (self.select as u8) << 5
            | (self.b as u8) << 6
            | (self.a as u8) << 7;
        write_u8(&mut data, flags)?;
        write_u8(
            &mut data,
            match self.selection {
                PadSelection::Action => 0,
                PadSelection::Direction => 1,
            },
        )?;
        write_u8(&mut data, self.int_pad as u8)?;
        Ok(data)
    }

    fn set_state(&mut self, data: &[u8], _format: Option<StateFormat>) -> Result<(), Error> {
        let mut cursor = std::io::Cursor::new(data);
        let flags = read_u8(&mut cursor)?;
        self.down = flags & 0x01 != 0;
        self.up = flags & 0x02 != 0;
        self.left = flags & 0x04 != 0;
        self.right = flags & 0x08 != 0;
        self.start = flags & 0x10 != 0;
        self.select = flags & 0x20 != 0;
        self.b = flags & 0x40 != 0;
        self.a = flags & 0x80 != 0;
        self.selection = match read_u8(&mut cursor)? {
            0 => PadSelection::Action,
            _ => PadSelection::Direction,
        };
        self.int_pad = read_u8(&mut cursor)? != 0;
        Ok(())
    }
}
