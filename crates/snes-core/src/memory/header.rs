//! Cartridge header scoring and parsing.
//!
//! Cartridge images carry an internal header at a scheme-specific offset.
//! Nothing in the image says which scheme it uses, so detection scores both
//! candidate locations and keeps the more plausible one. Images without a
//! recognisable header are normal during bring-up and quietly fall back to
//! [`MappingScheme::LoRom`].

use crate::memory::map::MappingScheme;

/// Length of the internal header window (`base..base + 0x20`).
pub const HEADER_BYTES: usize = 0x20;
/// Offset of the extended maker code relative to the header base (negative).
pub const MAKER_CODE_BACK_OFFSET: usize = 0x10;
/// Offset of the four-byte extended game code relative to the header base (negative).
pub const GAME_CODE_BACK_OFFSET: usize = 0x0E;
/// Length of the title field.
pub const TITLE_BYTES: usize = 21;
/// Size of the copier prefix some dumps carry in front of the image.
pub const COPIER_HEADER_BYTES: usize = 512;

const MAP_MODE_OFFSET: usize = 0x15;
const CARTRIDGE_TYPE_OFFSET: usize = 0x16;
const ROM_SIZE_OFFSET: usize = 0x17;
const SRAM_SIZE_OFFSET: usize = 0x18;
const REGION_OFFSET: usize = 0x19;
const VERSION_OFFSET: usize = 0x1B;
const COMPLEMENT_OFFSET: usize = 0x1C;
const CHECKSUM_OFFSET: usize = 0x1E;

/// Plausible range of the ROM-size byte (256 KiB to 8 MiB).
const PLAUSIBLE_ROM_SIZES: core::ops::RangeInclusive<u8> = 0x08..=0x0D;

const SCORE_MAKER_CODE: u32 = 1;
const SCORE_GAME_CODE_BYTE: u32 = 1;
const SCORE_ROM_SIZE: u32 = 2;
const SCORE_CHECKSUM_PAIR: u32 = 4;

/// Parsed internal cartridge header.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CartridgeHeader {
    /// Scheme whose header location this was read from.
    pub scheme: MappingScheme,
    /// Title with trailing padding removed; non-ASCII bytes become `?`.
    pub title: String,
    /// Raw map-mode byte.
    pub map_mode: u8,
    /// Raw cartridge-type byte.
    pub cartridge_type: u8,
    /// ROM size as `log2(size / 1 KiB)`.
    pub rom_size: u8,
    /// Save RAM size as `log2(size / 1 KiB)`, 0 when absent.
    pub sram_size: u8,
    /// Destination region code.
    pub region: u8,
    /// Mask ROM version.
    pub version: u8,
    /// Stored checksum.
    pub checksum: u16,
    /// Stored checksum complement.
    pub complement: u16,
}

impl CartridgeHeader {
    /// Parses the header at `scheme`'s location, or `None` when the image
    /// is too short to contain it.
    #[must_use]
    pub fn parse(rom: &[u8], scheme: MappingScheme) -> Option<Self> {
        let base = scheme.header_base();
        let window = rom.get(base..base + HEADER_BYTES)?;

        let title = window[..TITLE_BYTES]
            .iter()
            .map(|&byte| if is_printable(byte) { char::from(byte) } else { '?' })
            .collect::<String>()
            .trim_end()
            .to_string();

        Some(Self {
            scheme,
            title,
            map_mode: window[MAP_MODE_OFFSET],
            cartridge_type: window[CARTRIDGE_TYPE_OFFSET],
            rom_size: window[ROM_SIZE_OFFSET],
            sram_size: window[SRAM_SIZE_OFFSET],
            region: window[REGION_OFFSET],
            version: window[VERSION_OFFSET],
            checksum: u16::from_le_bytes([window[CHECKSUM_OFFSET], window[CHECKSUM_OFFSET + 1]]),
            complement: u16::from_le_bytes([
                window[COMPLEMENT_OFFSET],
                window[COMPLEMENT_OFFSET + 1],
            ]),
        })
    }

    /// Returns `true` when checksum and complement are bitwise inverses.
    #[must_use]
    pub const fn checksum_pair_valid(&self) -> bool {
        self.checksum ^ self.complement == 0xFFFF
    }

    /// ROM size in bytes implied by the size byte, saturating on absurd values.
    #[must_use]
    pub const fn rom_size_bytes(&self) -> usize {
        size_from_exponent(self.rom_size)
    }

    /// Save RAM size in bytes implied by the size byte (0 when absent).
    #[must_use]
    pub const fn sram_size_bytes(&self) -> usize {
        if self.sram_size == 0 {
            0
        } else {
            size_from_exponent(self.sram_size)
        }
    }
}

/// Scores the header candidate for `scheme`.
///
/// Returns 0 when the image does not reach the candidate window.
#[must_use]
pub fn score_header(rom: &[u8], scheme: MappingScheme) -> u32 {
    let base = scheme.header_base();
    let Some(window) = rom.get(base - MAKER_CODE_BACK_OFFSET..base + HEADER_BYTES) else {
        return 0;
    };
    let header = &window[MAKER_CODE_BACK_OFFSET..];

    let mut score = 0;

    if is_printable(window[0]) {
        score += SCORE_MAKER_CODE;
    }

    let game_code_start = MAKER_CODE_BACK_OFFSET - GAME_CODE_BACK_OFFSET;
    for &byte in &window[game_code_start..game_code_start + 4] {
        if is_printable(byte) {
            score += SCORE_GAME_CODE_BYTE;
        }
    }

    if PLAUSIBLE_ROM_SIZES.contains(&header[ROM_SIZE_OFFSET]) {
        score += SCORE_ROM_SIZE;
    }

    let complement = u16::from_le_bytes([header[COMPLEMENT_OFFSET], header[COMPLEMENT_OFFSET + 1]]);
    let checksum = u16::from_le_bytes([header[CHECKSUM_OFFSET], header[CHECKSUM_OFFSET + 1]]);
    if checksum ^ complement == 0xFFFF {
        score += SCORE_CHECKSUM_PAIR;
    }

    score
}

/// Picks the mapping scheme whose header candidate scores higher.
///
/// Ties, including images with no header at all, favor [`MappingScheme::LoRom`].
#[must_use]
pub fn detect_scheme(rom: &[u8]) -> MappingScheme {
    let lorom = score_header(rom, MappingScheme::LoRom);
    let hirom = score_header(rom, MappingScheme::HiRom);
    log::debug!("header scores: lorom={lorom} hirom={hirom} ({} bytes)", rom.len());

    if hirom > lorom {
        MappingScheme::HiRom
    } else {
        MappingScheme::LoRom
    }
}

/// Drops a 512-byte copier prefix when the image length says one is present.
#[must_use]
pub fn strip_copier_header(image: &[u8]) -> &[u8] {
    if image.len() % 1024 == COPIER_HEADER_BYTES {
        &image[COPIER_HEADER_BYTES..]
    } else {
        image
    }
}

const fn size_from_exponent(exponent: u8) -> usize {
    match 1024_usize.checked_shl(exponent as u32) {
        Some(size) => size,
        None => usize::MAX,
    }
}

const fn is_printable(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7E)
}
