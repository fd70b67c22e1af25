//! Width-aware arithmetic with carry/overflow results.

use crate::state::Width;

/// Result of an add or subtract at a given width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArithResult {
    /// Result truncated to the operation width.
    pub value: u16,
    /// Carry out (`1` = no borrow for subtraction).
    pub carry: bool,
    /// Signed overflow.
    pub overflow: bool,
}

/// `ADC`: `a + b + carry`, binary or packed BCD.
#[must_use]
pub fn add(a: u16, b: u16, carry: bool, width: Width, decimal: bool) -> ArithResult {
    let b = b & width.mask();
    if decimal {
        add_decimal(a & width.mask(), b, carry, width)
    } else {
        add_binary(a & width.mask(), b, carry, width)
    }
}

/// `SBC`: `a - b - !carry`, binary or packed BCD.
#[must_use]
pub fn subtract(a: u16, b: u16, carry: bool, width: Width, decimal: bool) -> ArithResult {
    let inverted = !b & width.mask();
    if decimal {
        subtract_decimal(a & width.mask(), inverted, carry, width)
    } else {
        add_binary(a & width.mask(), inverted, carry, width)
    }
}

/// `CMP`/`CPX`/`CPY`: returns the difference and the carry (`register >= operand`).
#[must_use]
pub const fn compare(register: u16, operand: u16, width: Width) -> (u16, bool) {
    let register = register & width.mask();
    let operand = operand & width.mask();
    (register.wrapping_sub(operand) & width.mask(), register >= operand)
}

fn add_binary(a: u16, b: u16, carry: bool, width: Width) -> ArithResult {
    let mask = u32::from(width.mask());
    let sign = u32::from(width.sign_bit());
    let (a, b) = (u32::from(a), u32::from(b));
    let sum = a + b + u32::from(carry);
    let result = sum & mask;
    ArithResult {
        value: result as u16,
        carry: sum > mask,
        overflow: !(a ^ b) & (a ^ result) & sign != 0,
    }
}

// Digit-serial BCD: each nibble is corrected before its carry feeds the next.
// Overflow is taken from the top digit before its decimal correction.
fn add_decimal(a: u16, b: u16, carry: bool, width: Width) -> ArithResult {
    let (a, b) = (i32::from(a), i32::from(b));
    let sign = i32::from(width.sign_bit());
    let digits = width.bytes() * 2;
    let mut result = 0_i32;
    let mut carry = i32::from(carry);
    let mut overflow = false;

    for digit in 0..digits {
        let shift = 4 * u32::from(digit);
        let nibble = 0xF << shift;
        result = (a & nibble) + (b & nibble) + (carry << shift) + (result & ((1 << shift) - 1));
        if digit == digits - 1 {
            overflow = !(a ^ b) & (a ^ result) & sign != 0;
        }
        if result > (0xA << shift) - 1 {
            result += 0x6 << shift;
        }
        carry = i32::from(result > (0x10 << shift) - 1);
    }

    ArithResult {
        value: (result & i32::from(width.mask())) as u16,
        carry: carry != 0,
        overflow,
    }
}

fn subtract_decimal(a: u16, inverted: u16, carry: bool, width: Width) -> ArithResult {
    let (a, b) = (i32::from(a), i32::from(inverted));
    let sign = i32::from(width.sign_bit());
    let digits = width.bytes() * 2;
    let mut result = 0_i32;
    let mut carry = i32::from(carry);
    let mut overflow = false;

    for digit in 0..digits {
        let shift = 4 * u32::from(digit);
        let nibble = 0xF << shift;
        result = (a & nibble) + (b & nibble) + (carry << shift) + (result & ((1 << shift) - 1));
        if digit == digits - 1 {
            overflow = !(a ^ b) & (a ^ result) & sign != 0;
        }
        if result <= (0x10 << shift) - 1 {
            result -= 0x6 << shift;
        }
        carry = i32::from(result > (0x10 << shift) - 1);
    }

    ArithResult {
        value: (result & i32::from(width.mask())) as u16,
        carry: carry != 0,
        overflow,
    }
}
