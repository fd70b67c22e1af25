//! Banked 24-bit memory bus: work RAM, save RAM, cartridge ROM and I/O.

/// Cartridge header scoring, parsing and copier-prefix handling.
pub mod header;
/// Host-supplied I/O register handlers.
pub mod io;
/// Mapping schemes and the pure address decoder.
pub mod map;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::rc::Rc;

use thiserror::Error;

use crate::api::CpuBus;

pub use header::{detect_scheme, score_header, strip_copier_header, CartridgeHeader};
pub use io::{default_io_read, device_handler, IoHandler, IoReadFn, IoWriteFn, MmioDevice};
pub use map::{
    map_address, MappedAddress, MappingScheme, MemoryRegion, ADDRESS_MASK, SAVE_RAM_BYTES,
    WORK_RAM_BYTES,
};

/// Value observed when nothing drives the data bus.
pub const OPEN_BUS: u8 = 0xFF;

/// Save RAM import failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SaveRamError {
    /// The supplied image does not fit in the save RAM array.
    #[error("save RAM image is {len} bytes; at most {max} fit")]
    TooLarge {
        /// Length of the rejected image.
        len: usize,
        /// Capacity of the save RAM array.
        max: usize,
    },
}

/// System memory bus owning every storage region and the I/O handler table.
pub struct Bus {
    work_ram: Box<[u8]>,
    save_ram: Box<[u8]>,
    rom: Vec<u8>,
    scheme: MappingScheme,
    io_handlers: HashMap<u16, IoHandler>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("scheme", &self.scheme)
            .field("rom_len", &self.rom.len())
            .field("io_handlers", &self.io_handlers.len())
            .finish_non_exhaustive()
    }
}

impl Bus {
    /// Creates a bus with zeroed RAM, no cartridge and the LoROM scheme.
    #[must_use]
    pub fn new() -> Self {
        Self {
            work_ram: vec![0; WORK_RAM_BYTES].into_boxed_slice(),
            save_ram: vec![0; SAVE_RAM_BYTES].into_boxed_slice(),
            rom: Vec::new(),
            scheme: MappingScheme::default(),
            io_handlers: HashMap::new(),
        }
    }

    /// Replaces the cartridge image and selects its mapping scheme.
    ///
    /// Any byte sequence is accepted, including an empty one.
    pub fn load_cartridge(&mut self, image: &[u8]) {
        self.rom = image.to_vec();
        self.scheme = detect_scheme(&self.rom);
        log::debug!(
            "loaded {} byte cartridge as {:?}",
            self.rom.len(),
            self.scheme
        );
    }

    /// Clears work RAM. ROM, save RAM, scheme and handlers are kept.
    pub fn reset(&mut self) {
        self.work_ram.fill(0);
    }

    /// Active mapping scheme.
    #[must_use]
    pub const fn scheme(&self) -> MappingScheme {
        self.scheme
    }

    /// Overrides the detected mapping scheme.
    pub const fn set_scheme(&mut self, scheme: MappingScheme) {
        self.scheme = scheme;
    }

    /// Loaded cartridge image.
    #[must_use]
    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    /// Work RAM contents.
    #[must_use]
    pub fn work_ram(&self) -> &[u8] {
        &self.work_ram
    }

    /// Save RAM contents, for persisting battery-backed data.
    #[must_use]
    pub fn save_ram(&self) -> &[u8] {
        &self.save_ram
    }

    /// Mutable save RAM contents.
    pub fn save_ram_mut(&mut self) -> &mut [u8] {
        &mut self.save_ram
    }

    /// Copies a persisted save image into save RAM, zero-filling the rest.
    ///
    /// # Errors
    ///
    /// Returns [`SaveRamError::TooLarge`] when `image` exceeds the save RAM
    /// size. Save RAM is left untouched in that case.
    pub fn import_save_ram(&mut self, image: &[u8]) -> Result<(), SaveRamError> {
        if image.len() > SAVE_RAM_BYTES {
            return Err(SaveRamError::TooLarge {
                len: image.len(),
                max: SAVE_RAM_BYTES,
            });
        }
        let (head, tail) = self.save_ram.split_at_mut(image.len());
        head.copy_from_slice(image);
        tail.fill(0);
        Ok(())
    }

    /// Reads one byte, running the I/O read handler when one is mapped.
    pub fn read(&mut self, addr: u32) -> u8 {
        let mapped = map_address(self.scheme, addr);
        match mapped.region {
            MemoryRegion::Io => {
                let offset = mapped.offset as u16;
                self.io_handlers
                    .get_mut(&offset)
                    .and_then(|handler| handler.read(offset))
                    .unwrap_or_else(|| default_io_read(offset))
            }
            _ => self.read_storage(mapped),
        }
    }

    /// Writes one byte. ROM and open-bus writes are discarded.
    pub fn write(&mut self, addr: u32, value: u8) {
        let mapped = map_address(self.scheme, addr);
        match mapped.region {
            MemoryRegion::WorkRam => {
                let len = self.work_ram.len();
                self.work_ram[mapped.offset as usize % len] = value;
            }
            MemoryRegion::SaveRam => {
                let len = self.save_ram.len();
                self.save_ram[mapped.offset as usize % len] = value;
            }
            MemoryRegion::Io => {
                let offset = mapped.offset as u16;
                let handled = self
                    .io_handlers
                    .get_mut(&offset)
                    .is_some_and(|handler| handler.write(offset, value));
                if !handled {
                    log::trace!("unhandled I/O write {value:#04x} -> {offset:#06x}");
                }
            }
            MemoryRegion::Rom | MemoryRegion::OpenBus => {}
        }
    }

    /// Reads a little-endian word from `addr` and `addr + 1` (24-bit wrap).
    pub fn read16(&mut self, addr: u32) -> u16 {
        let low = self.read(addr);
        let high = self.read(addr.wrapping_add(1) & ADDRESS_MASK);
        u16::from_le_bytes([low, high])
    }

    /// Writes a little-endian word to `addr` and `addr + 1` (24-bit wrap).
    pub fn write16(&mut self, addr: u32, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write(addr, low);
        self.write(addr.wrapping_add(1) & ADDRESS_MASK, high);
    }

    /// Reads one byte without side effects. I/O reads as open bus.
    #[must_use]
    pub fn peek(&self, addr: u32) -> u8 {
        let mapped = map_address(self.scheme, addr);
        match mapped.region {
            MemoryRegion::Io => OPEN_BUS,
            _ => self.read_storage(mapped),
        }
    }

    /// Copies `length` bytes through the normal read/write paths.
    ///
    /// Source and destination advance independently and wrap at 24 bits, so
    /// I/O handlers observe every transferred byte.
    pub fn dma_copy(&mut self, source: u32, dest: u32, length: usize) {
        let mut source = source & ADDRESS_MASK;
        let mut dest = dest & ADDRESS_MASK;
        for _ in 0..length {
            let value = self.read(source);
            self.write(dest, value);
            source = source.wrapping_add(1) & ADDRESS_MASK;
            dest = dest.wrapping_add(1) & ADDRESS_MASK;
        }
    }

    /// Installs callbacks for one I/O register, replacing any earlier ones.
    pub fn register_io_handler(
        &mut self,
        addr: u16,
        on_read: Option<IoReadFn>,
        on_write: Option<IoWriteFn>,
    ) {
        self.io_handlers
            .insert(addr, IoHandler::new(on_read, on_write));
    }

    /// Routes every register in `range` to a shared device.
    pub fn register_io_device<D>(&mut self, range: RangeInclusive<u16>, device: &Rc<RefCell<D>>)
    where
        D: MmioDevice + 'static,
    {
        for addr in range {
            self.io_handlers.insert(addr, device_handler(device));
        }
    }

    /// Removes the handler for one register, restoring default behavior.
    pub fn clear_io_handler(&mut self, addr: u16) {
        self.io_handlers.remove(&addr);
    }

    fn read_storage(&self, mapped: MappedAddress) -> u8 {
        let offset = mapped.offset as usize;
        match mapped.region {
            MemoryRegion::WorkRam => self.work_ram[offset % self.work_ram.len()],
            MemoryRegion::SaveRam => self.save_ram[offset % self.save_ram.len()],
            MemoryRegion::Rom => self.rom.get(offset).copied().unwrap_or(OPEN_BUS),
            MemoryRegion::Io | MemoryRegion::OpenBus => OPEN_BUS,
        }
    }
}

impl CpuBus for Bus {
    fn read(&mut self, addr: u32) -> u8 {
        Self::read(self, addr)
    }

    fn write(&mut self, addr: u32, value: u8) {
        Self::write(self, addr, value);
    }
}

#[cfg(test)]
mod tests {
    use super::{Bus, MappingScheme, MmioDevice, SaveRamError, SAVE_RAM_BYTES};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn lorom_image() -> Vec<u8> {
        (0..0x1_0000_u32).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn low_ram_mirror_is_visible_from_every_system_bank() {
        let mut bus = Bus::new();
        bus.write(0x00_0123, 0x42);
        assert_eq!(bus.read(0x7E_0123), 0x42);
        assert_eq!(bus.read(0x3F_0123), 0x42);
        assert_eq!(bus.read(0x80_0123), 0x42);
        assert_eq!(bus.work_ram()[0x123], 0x42);
    }

    #[test]
    fn rom_reads_past_image_are_open_bus_and_writes_are_ignored() {
        let mut bus = Bus::new();
        bus.load_cartridge(&[0xAA, 0xBB]);
        assert_eq!(bus.read(0x00_8000), 0xAA);
        assert_eq!(bus.read(0x00_8001), 0xBB);
        assert_eq!(bus.read(0x00_8002), 0xFF);

        bus.write(0x00_8000, 0x11);
        assert_eq!(bus.read(0x00_8000), 0xAA);
        assert_eq!(bus.rom(), &[0xAA, 0xBB]);
    }

    #[test]
    fn empty_cartridge_defaults_to_lorom() {
        let mut bus = Bus::new();
        bus.load_cartridge(&[]);
        assert_eq!(bus.scheme(), MappingScheme::LoRom);
        assert_eq!(bus.read(0x00_FFFC), 0xFF);
    }

    #[test]
    fn unhandled_io_uses_status_defaults() {
        let mut bus = Bus::new();
        assert_eq!(bus.read(0x00_4210), 0x02);
        assert_eq!(bus.read(0x80_4212), 0x00);
        assert_eq!(bus.read(0x00_2100), 0xFF);
        bus.write(0x00_2100, 0x80);
        assert_eq!(bus.read(0x00_2100), 0xFF);
    }

    #[test]
    fn io_handlers_receive_register_offset_and_last_registration_wins() {
        let mut bus = Bus::new();
        let written = Rc::new(Cell::new(0_u8));
        let sink = Rc::clone(&written);

        bus.register_io_handler(0x2140, Some(Box::new(|_| 0x11)), None);
        bus.register_io_handler(
            0x2140,
            Some(Box::new(|offset| (offset >> 8) as u8)),
            Some(Box::new(move |_, value| sink.set(value))),
        );

        assert_eq!(bus.read(0x80_2140), 0x21);
        bus.write(0x00_2140, 0x5A);
        assert_eq!(written.get(), 0x5A);

        bus.clear_io_handler(0x2140);
        assert_eq!(bus.read(0x00_2140), 0xFF);
    }

    #[test]
    fn write_only_handler_reads_default() {
        let mut bus = Bus::new();
        bus.register_io_handler(0x4210, None, Some(Box::new(|_, _| {})));
        assert_eq!(bus.read(0x00_4210), 0x02);
    }

    #[test]
    fn io_device_covers_its_register_range() {
        struct Ports([u8; 4]);
        impl MmioDevice for Ports {
            fn read(&mut self, offset: u16) -> u8 {
                self.0[usize::from(offset - 0x2140)]
            }
            fn write(&mut self, offset: u16, value: u8) {
                self.0[usize::from(offset - 0x2140)] = value;
            }
        }

        let ports = Rc::new(RefCell::new(Ports([0; 4])));
        let mut bus = Bus::new();
        bus.register_io_device(0x2140..=0x2143, &ports);

        bus.write(0x00_2143, 0x77);
        assert_eq!(ports.borrow().0[3], 0x77);
        assert_eq!(bus.read(0x00_2143), 0x77);
        assert_eq!(bus.read(0x00_2144), 0xFF);
    }

    #[test]
    fn peek_has_no_io_side_effects() {
        let mut bus = Bus::new();
        let reads = Rc::new(Cell::new(0_u32));
        let counter = Rc::clone(&reads);
        bus.register_io_handler(
            0x2139,
            Some(Box::new(move |_| {
                counter.set(counter.get() + 1);
                0
            })),
            None,
        );

        assert_eq!(bus.peek(0x00_2139), 0xFF);
        assert_eq!(reads.get(), 0);
        bus.read(0x00_2139);
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn word_access_is_little_endian_and_wraps_at_24_bits() {
        let mut bus = Bus::new();
        bus.write16(0x7E_1000, 0xBEEF);
        assert_eq!(bus.read(0x7E_1000), 0xEF);
        assert_eq!(bus.read(0x7E_1001), 0xBE);
        assert_eq!(bus.read16(0x7E_1000), 0xBEEF);

        bus.write(0xFF_FFFF, 0x34);
        bus.write(0x00_0000, 0x12);
        assert_eq!(bus.read16(0xFF_FFFF), 0x1234);
    }

    #[test]
    fn dma_copy_moves_rom_into_work_ram() {
        let mut bus = Bus::new();
        bus.load_cartridge(&lorom_image());
        bus.set_scheme(MappingScheme::LoRom);
        bus.dma_copy(0x00_8000, 0x7E_2000, 16);
        for i in 0..16 {
            assert_eq!(bus.read(0x7E_2000 + i), (i % 251) as u8);
        }
    }

    #[test]
    fn dma_copy_feeds_io_write_handlers() {
        let mut bus = Bus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        bus.register_io_handler(
            0x2118,
            None,
            Some(Box::new(move |_, value| sink.borrow_mut().push(value))),
        );
        bus.write(0x7E_0000, 1);
        bus.write(0x7E_0001, 2);
        bus.write(0x7E_0002, 3);

        // Destination advances too, so only the first byte hits 0x2118.
        bus.dma_copy(0x7E_0000, 0x00_2118, 3);
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn reset_clears_work_ram_but_keeps_save_ram_and_rom() {
        let mut bus = Bus::new();
        bus.load_cartridge(&[0x5A]);
        bus.write(0x7E_0010, 0x99);
        bus.write(0x70_0010, 0x66);

        bus.reset();

        assert_eq!(bus.read(0x7E_0010), 0x00);
        assert_eq!(bus.read(0x70_0010), 0x66);
        assert_eq!(bus.read(0x00_8000), 0x5A);
    }

    #[test]
    fn hirom_save_ram_window_maps_into_save_ram() {
        let mut bus = Bus::new();
        bus.set_scheme(MappingScheme::HiRom);
        bus.write(0x20_6001, 0xC3);
        assert_eq!(bus.save_ram()[1], 0xC3);
        assert_eq!(bus.read(0xA0_6001), 0xC3);
    }

    #[test]
    fn save_ram_import_zero_fills_and_rejects_oversize_images() {
        let mut bus = Bus::new();
        bus.save_ram_mut()[10] = 0xEE;
        bus.import_save_ram(&[1, 2, 3]).expect("small image fits");
        assert_eq!(&bus.save_ram()[..4], &[1, 2, 3, 0]);
        assert_eq!(bus.save_ram()[10], 0);

        let oversize = vec![0; SAVE_RAM_BYTES + 1];
        assert_eq!(
            bus.import_save_ram(&oversize),
            Err(SaveRamError::TooLarge {
                len: SAVE_RAM_BYTES + 1,
                max: SAVE_RAM_BYTES
            })
        );
        assert_eq!(bus.save_ram()[0], 1);
    }
}
