//! Host-supplied I/O register handlers.
//!
//! The I/O window (`0x2000..=0x5FFF` in system banks) has no storage of its
//! own. Each 16-bit register offset can carry a read callback, a write
//! callback, or both. Offsets without a handler fall back to fixed defaults.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Status register polled for the vertical-blank NMI flag.
pub const NMI_STATUS_REGISTER: u16 = 0x4210;
/// Status register polled for the blanking/auto-joypad flags.
pub const HVBJOY_STATUS_REGISTER: u16 = 0x4212;

/// Read callback signature: receives the 16-bit register offset.
pub type IoReadFn = Box<dyn FnMut(u16) -> u8>;
/// Write callback signature: receives the 16-bit register offset and value.
pub type IoWriteFn = Box<dyn FnMut(u16, u8)>;

/// Read/write callbacks bound to one I/O register offset.
#[derive(Default)]
pub struct IoHandler {
    read: Option<IoReadFn>,
    write: Option<IoWriteFn>,
}

impl IoHandler {
    /// Creates a handler from optional callbacks.
    #[must_use]
    pub fn new(read: Option<IoReadFn>, write: Option<IoWriteFn>) -> Self {
        Self { read, write }
    }

    /// Creates a handler that only answers reads.
    #[must_use]
    pub fn reader(read: impl FnMut(u16) -> u8 + 'static) -> Self {
        Self::new(Some(Box::new(read)), None)
    }

    /// Creates a handler that only observes writes.
    #[must_use]
    pub fn writer(write: impl FnMut(u16, u8) + 'static) -> Self {
        Self::new(None, Some(Box::new(write)))
    }

    /// Invokes the read callback, or returns `None` when absent.
    pub fn read(&mut self, offset: u16) -> Option<u8> {
        self.read.as_mut().map(|read| read(offset))
    }

    /// Invokes the write callback; returns `false` when absent.
    pub fn write(&mut self, offset: u16, value: u8) -> bool {
        self.write.as_mut().is_some_and(|write| {
            write(offset, value);
            true
        })
    }

    /// Returns `true` when a read callback is installed.
    #[must_use]
    pub const fn has_read(&self) -> bool {
        self.read.is_some()
    }

    /// Returns `true` when a write callback is installed.
    #[must_use]
    pub const fn has_write(&self) -> bool {
        self.write.is_some()
    }
}

impl fmt::Debug for IoHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoHandler")
            .field("read", &self.has_read())
            .field("write", &self.has_write())
            .finish()
    }
}

/// Device-side contract for peripherals that own a block of I/O registers.
///
/// Devices are shared through `Rc<RefCell<_>>` so the host keeps a handle to
/// inspect them while the bus routes register traffic.
pub trait MmioDevice {
    /// Reads a device register.
    fn read(&mut self, offset: u16) -> u8;

    /// Writes a device register.
    fn write(&mut self, offset: u16, value: u8);
}

/// Builds a handler that forwards both directions to a shared device.
pub fn device_handler<D>(device: &Rc<RefCell<D>>) -> IoHandler
where
    D: MmioDevice + 'static,
{
    let reader = Rc::clone(device);
    let writer = Rc::clone(device);
    IoHandler::new(
        Some(Box::new(move |offset| reader.borrow_mut().read(offset))),
        Some(Box::new(move |offset, value| {
            writer.borrow_mut().write(offset, value);
        })),
    )
}

/// Value returned for an unhandled I/O read at `offset`.
///
/// `0x4210` reads as CPU version 2 with no NMI latched and `0x4212` as "not
/// blanking, joypad ready", so polling loops make progress without a video
/// model attached.
#[must_use]
pub const fn default_io_read(offset: u16) -> u8 {
    match offset {
        NMI_STATUS_REGISTER => 0x02,
        HVBJOY_STATUS_REGISTER => 0x00,
        _ => 0xFF,
    }
}
