#![no_main]

use libfuzzer_sys::fuzz_target;
use snes_core::{disassemble_window, Machine, MachineConfig};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let mut machine = Machine::new(MachineConfig::default());
    machine.load_cartridge(data);
    machine.reset();

    let interrupts = data[0];
    for step in 0..256_u32 {
        if interrupts & 0x01 != 0 && step % 64 == 0 {
            machine.cpu_mut().raise_nmi();
        }
        machine.cpu_mut().set_irq_line(interrupts & 0x02 != 0);
        machine.step();
    }

    let _ = disassemble_window(|addr| machine.bus().peek(addr), 0x00_8000, 16, true, false);
});
