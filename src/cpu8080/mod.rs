//! Self-test CPU variants: a shared Intel 8080 decoder core, a Z80
//! superset built on top of it, and three harness drivers that exercise
//! the decoder tables outside the Game Boy timing and memory map.
//!
//! These are not part of the Game Boy emulation path, the LR35902 core
//! lives in [`crate::cpu`] and [`crate::inst`] and never touches this
//! module tree. They exist to validate the 8080/Z80 opcode tables
//! against the classic diagnostic ROMs (`cpudiag`, `zexdoc`-style
//! exercisers) and against the Space Invaders arcade board, which runs
//! on a bare 8080 with a custom bit-shift-register peripheral.

pub mod cpudiag;
pub mod exercize;
pub mod i8080;
pub mod space_invaders;
pub mod z80;
