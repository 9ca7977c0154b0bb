//! Save state functions and structures.
//!
//! Supports the native BOS format (optionally Zippy-compressed as BOSC)
//! plus read-only interoperability structures for the BESS format used
//! by other emulators.

use std::io::{Cursor, Read, Write};

use pocketcolor_common::{
    data::{read_bytes, read_u32, read_u8, write_bytes, write_u32, write_u8},
    error::Error,
};
use pocketcolor_encoding::zippy::{decode_zippy, encode_zippy};

/// Magic number (`BOS\0`) present at the start of every BOS formatted
/// save state, used to quickly validate and distinguish the format of
/// an arbitrary save state buffer.
pub const BOS_MAGIC: u32 = 0x00534f42;

/// Magic number (`BOSC`) present at the start of a Zippy-compressed
/// BOS save state.
pub const BOSC_MAGIC: u32 = 0x43534f42;

/// Magic number (`BESS`) present at the footer of a BESS formatted
/// save state, as defined by the format's specification.
pub const BESS_MAGIC: u32 = 0x53534542;

pub const BOS_VERSION: u8 = 1;

/// Hints the granularity that a [`StateComponent`] should serialize
/// itself at, currently only used to allow components to skip large,
/// easily reconstructed buffers (e.g. decoded tile caches) on a
/// minimal save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateFormat {
    Full,
    Minimal,
}

impl Default for StateFormat {
    fn default() -> Self {
        Self::Full
    }
}

/// A component of the emulator capable of serializing and restoring
/// its internal state as an opaque byte buffer, the building block
/// used by [`StateManager`] to assemble a complete [`BosState`].
pub trait StateComponent {
    fn state(&self, format: Option<StateFormat>) -> Result<Vec<u8>, Error>;
    fn set_state(&mut self, data: &[u8], format: Option<StateFormat>) -> Result<(), Error>;
}

/// The on-the-wire format of a save state buffer, as determined by
/// its leading magic number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveStateFormat {
    Bos,
    Bosc,
    Bess,
}

impl SaveStateFormat {
    pub fn description(&self) -> &'static str {
        match self {
            SaveStateFormat::Bos => "BOS",
            SaveStateFormat::Bosc => "BOSC",
            SaveStateFormat::Bess => "BESS",
        }
    }
}

impl std::fmt::Display for SaveStateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Trait implemented by the top-level save state containers, allowing
/// them to be written to and read back from an arbitrary byte sink.
pub trait Serialize {
    fn write(&self, writer: &mut dyn Write) -> Result<(), Error>;
    fn read(reader: &mut dyn Read) -> Result<Self, Error>
    where
        Self: Sized;
}

/// A single named, length-prefixed block of component state within a
/// [`BosState`], identified by a short ASCII tag (e.g. `CPU0`, `PPU0`).
#[derive(Clone)]
pub struct BosBlock {
    pub tag: [u8; 4],
    pub data: Vec<u8>,
}

impl BosBlock {
    pub fn new(tag: &[u8; 4], data: Vec<u8>) -> Self {
        Self { tag: *tag, data }
    }
}

/// An uncompressed RGB thumbnail image embedded in a save state,
/// primarily for presentation in a front-end's load-state browser.
#[derive(Clone, Default)]
pub struct Thumbnail {
    pub width: u16,
    pub height: u16,
    /// RGB (3 bytes per pixel) pixel data, row-major, top-to-bottom.
    pub pixels: Vec<u8>,
}

impl Thumbnail {
    /// Writes the thumbnail out as an uncompressed 24-bit BMP file.
    pub fn save_bmp(&self, writer: &mut dyn Write) -> Result<(), Error> {
        let row_size = (self.width as usize * 3).div_ceil(4) * 4;
        let pixel_data_size = row_size * self.height as usize;
        let file_size = 14 + 40 + pixel_data_size;

        // BITMAPFILEHEADER
        writer.write_all(b"BM")?;
        writer.write_all(&(file_size as u32).to_le_bytes())?;
        writer.write_all(&0u16.to_le_bytes())?;
        writer.write_all(&0u16.to_le_bytes())?;
        writer.write_all(&(54u32).to_le_bytes())?;

        // BITMAPINFOHEADER
        writer.write_all(&40u32.to_le_bytes())?;
        writer.write_all(&(self.width as i32).to_le_bytes())?;
        writer.write_all(&(self.height as i32).to_le_bytes())?;
        writer.write_all(&1u16.to_le_bytes())?;
        writer.write_all(&24u16.to_le_bytes())?;
        writer.write_all(&0u32.to_le_bytes())?;
        writer.write_all(&(pixel_data_size as u32).to_le_bytes())?;
        writer.write_all(&2835i32.to_le_bytes())?;
        writer.write_all(&2835i32.to_le_bytes())?;
        writer.write_all(&0u32.to_le_bytes())?;
        writer.write_all(&0u32.to_le_bytes())?;

        // pixel data, bottom-up, BGR order, rows padded to 4 bytes
        for y in (0..self.height as usize).rev() {
            let mut row = Vec::with_capacity(row_size);
            for x in 0..self.width as usize {
                let offset = (y * self.width as usize + x) * 3;
                let pixel = &self.pixels[offset..offset + 3];
                row.push(pixel[2]);
                row.push(pixel[1]);
                row.push(pixel[0]);
            }
            row.resize(row_size, 0);
            writer.write_all(&row)?;
        }

        Ok(())
    }
}

/// The native, uncompressed save state format. Stores a short header,
/// an optional thumbnail and a sequence of tagged blocks, one per
/// serialized emulator component.
#[derive(Clone, Default)]
pub struct BosState {
    pub version: u8,
    pub title: String,
    pub thumbnail: Option<Thumbnail>,
    pub blocks: Vec<BosBlock>,
}

impl BosState {
    pub fn new() -> Self {
        Self {
            version: BOS_VERSION,
            title: String::new(),
            thumbnail: None,
            blocks: Vec::new(),
        }
    }

    pub fn block(&self, tag: &[u8; 4]) -> Option<&BosBlock> {
        self.blocks.iter().find(|block| &block.tag == tag)
    }

    pub fn save_image_bmp(&self, path: &str) -> Result<(), Error> {
        let thumbnail = self
            .thumbnail
            .as_ref()
            .ok_or_else(|| Error::CustomError(String::from("save state has no thumbnail")))?;
        let mut file = std::fs::File::create(path)?;
        thumbnail.save_bmp(&mut file)
    }
}

impl Serialize for BosState {
    fn write(&self, writer: &mut dyn Write) -> Result<(), Error> {
        write_u32(writer, BOS_MAGIC)?;
        write_u8(writer, self.version)?;

        let title_bytes = self.title.as_bytes();
        write_u8(writer, title_bytes.len() as u8)?;
        write_bytes(writer, title_bytes)?;

        match &self.thumbnail {
            Some(thumbnail) => {
                write_u8(writer, 1)?;
                write_u32(writer, thumbnail.width as u32)?;
                write_u32(writer, thumbnail.height as u32)?;
                write_u32(writer, thumbnail.pixels.len() as u32)?;
                write_bytes(writer, &thumbnail.pixels)?;
            }
            None => write_u8(writer, 0)?,
        }

        write_u32(writer, self.blocks.len() as u32)?;
        for block in &self.blocks {
            write_bytes(writer, &block.tag)?;
            write_u32(writer, block.data.len() as u32)?;
            write_bytes(writer, &block.data)?;
        }

        Ok(())
    }

    fn read(reader: &mut dyn Read) -> Result<Self, Error> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let mut cursor: Cursor<&[u8]> = Cursor::new(&buffer);

        let magic = read_u32(&mut cursor)?;
        if magic != BOS_MAGIC {
            return Err(Error::InvalidData);
        }
        let version = read_u8(&mut cursor)?;

        let title_len = read_u8(&mut cursor)? as usize;
        let title = String::from_utf8_lossy(&read_bytes(&mut cursor, title_len)?).into_owned();

        let thumbnail = if read_u8(&mut cursor)? == 1 {
            let width = read_u32(&mut cursor)? as u16;
            let height = read_u32(&mut cursor)? as u16;
            let pixel_count = read_u32(&mut cursor)? as usize;
            let pixels = read_bytes(&mut cursor, pixel_count)?;
            Some(Thumbnail {
                width,
                height,
                pixels,
            })
        } else {
            None
        };

        let block_count = read_u32(&mut cursor)?;
        let mut blocks = Vec::with_capacity(block_count as usize);
        for _ in 0..block_count {
            let tag_bytes = read_bytes(&mut cursor, 4)?;
            let tag = [tag_bytes[0], tag_bytes[1], tag_bytes[2], tag_bytes[3]];
            let size = read_u32(&mut cursor)? as usize;
            let data = read_bytes(&mut cursor, size)?;
            blocks.push(BosBlock::new(&tag, data));
        }

        Ok(Self {
            version,
            title,
            thumbnail,
            blocks,
        })
    }
}

/// A Zippy-compressed (Huffman + RLE) wrapper around a [`BosState`],
/// used to keep persisted save states small.
#[derive(Clone)]
pub struct BoscState {
    bos: BosState,
}

impl BoscState {
    pub fn bos(&self) -> BosState {
        self.bos.clone()
    }
}

impl Serialize for BoscState {
    fn write(&self, writer: &mut dyn Write) -> Result<(), Error> {
        let mut bos_buffer = Vec::new();
        self.bos.write(&mut bos_buffer)?;
        let compressed = encode_zippy(&bos_buffer)?;

        write_u32(writer, BOSC_MAGIC)?;
        write_u32(writer, bos_buffer.len() as u32)?;
        write_bytes(writer, &compressed)?;

        Ok(())
    }

    fn read(reader: &mut dyn Read) -> Result<Self, Error> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let mut cursor: Cursor<&[u8]> = Cursor::new(&buffer);

        let magic = read_u32(&mut cursor)?;
        if magic != BOSC_MAGIC {
            return Err(Error::InvalidData);
        }
        let _decompressed_size = read_u32(&mut cursor)?;
        let position = cursor.position() as usize;
        let compressed = &buffer[position..];

        let bos_buffer = decode_zippy(compressed)?;
        let bos = BosState::read(&mut Cursor::new(bos_buffer.as_slice()))?;

        Ok(Self { bos })
    }
}

#[repr(packed)]
pub struct BeesBlock {
    pub magic: u32,
    pub size: u32,
}

#[repr(packed)]
pub struct BeesBuffer {
    pub size: u32,
    pub offset: u32,
}

#[repr(packed)]
pub struct BeesFooter {
    pub start_offset: u32,
    pub magic: u32,
}

#[repr(packed)]
pub struct BeesCore {
    pub header: BeesBlock,

    pub major: u16,
    pub minor: u16,

    pub model: u32,

    pub pc: u16,
    pub af: u16,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub sp: u16,

    pub ime: u8,
    pub ie: u8,
    // 0 = running; 1 = halted; 2 = stopped
    pub execution_mode: u8,
    _padding: u8,

    pub io_registers: [u8; 0x80],

    pub ram: BeesBuffer,
    pub vram: BeesBuffer,
    pub mbc_ram: BeesBuffer,
    pub oam: BeesBuffer,
    pub hram: BeesBuffer,
    pub background_palettes: BeesBuffer,
    pub object_palettes: BeesBuffer,
}

/// Entry point for detecting and decoding save state buffers,
/// independent of the `GameBoy` instance that might eventually
/// consume them.
pub struct StateManager;

impl StateManager {
    /// Peeks at the leading magic number of `data` to determine which
    /// save state format it was encoded with.
    pub fn format(data: &[u8]) -> Result<SaveStateFormat, Error> {
        if data.len() < 4 {
            return Err(Error::InvalidData);
        }
        let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        match magic {
            BOS_MAGIC => Ok(SaveStateFormat::Bos),
            BOSC_MAGIC => Ok(SaveStateFormat::Bosc),
            _ if data.len() >= 4 && &data[data.len() - 4..] == BESS_MAGIC.to_le_bytes() => {
                Ok(SaveStateFormat::Bess)
            }
            _ => Err(Error::InvalidData),
        }
    }

    pub fn read_bos(data: &[u8]) -> Result<BosState, Error> {
        BosState::read(&mut Cursor::new(data))
    }

    pub fn write_bos(state: &BosState) -> Result<Vec<u8>, Error> {
        let mut buffer = Vec::new();
        state.write(&mut buffer)?;
        Ok(buffer)
    }

    pub fn read_bosc(data: &[u8]) -> Result<BoscState, Error> {
        BoscState::read(&mut Cursor::new(data))
    }

    pub fn write_bosc(state: &BosState) -> Result<Vec<u8>, Error> {
        let bosc = BoscState { bos: state.clone() };
        let mut buffer = Vec::new();
        bosc.write(&mut buffer)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::{BosBlock, BosState, Serialize, StateManager};

    #[test]
    fn test_bos_round_trip() {
        let mut state = BosState::new();
        state.title = String::from("test-rom");
        state
            .blocks
            .push(BosBlock::new(b"CPU0", vec![0x01, 0x02, 0x03]));

        let buffer = StateManager::write_bos(&state).unwrap();
        let restored = StateManager::read_bos(&buffer).unwrap();

        assert_eq!(restored.title, "test-rom");
        assert_eq!(restored.block(b"CPU0").unwrap().data, vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_bosc_round_trip() {
        let mut state = BosState::new();
        state.title = String::from("compressed");
        state
            .blocks
            .push(BosBlock::new(b"PPU0", vec![0xaa; 256]));

        let buffer = StateManager::write_bosc(&state).unwrap();
        assert_eq!(StateManager::format(&buffer).unwrap(), super::SaveStateFormat::Bosc);

        let bosc_state = StateManager::read_bosc(&buffer).unwrap();
        let restored = bosc_state.bos();

        assert_eq!(restored.title, "compressed");
        assert_eq!(restored.block(b"PPU0").unwrap().data, vec![0xaa; 256]);
    }
}
