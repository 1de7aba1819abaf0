use super::*;

/// Rising edge for the single-word latches.
/// DFF always captures. Bit and Register capture when `load` is set.
/// PC gives reset priority over load, and load priority over inc.
pub(super) fn latch(gate: &mut BuiltInGate, pins: &mut Pins) {
    match gate.primitive {
        Primitive::Dff => gate.state = pins.input(0),
        Primitive::Bit | Primitive::Register => {
            if pins.bit(1) {
                gate.state = pins.input(0);
            }
        },
        Primitive::Pc => {
            if pins.bit(3) {
                gate.state = 0;
            } else if pins.bit(1) {
                gate.state = pins.input(0);
            } else if pins.bit(2) {
                gate.state = gate.state.wrapping_add(1);
            }
        },
        primitive => unreachable!("{primitive:?} is not a latch"),
    }
}

// Pins are `in, load, address` for RAMn and Screen alike.

pub(super) fn write(gate: &mut BuiltInGate, pins: &mut Pins) {
    if pins.bit(1) {
        let address = pins.input(2) as usize % gate.memory.len();
        gate.memory[address] = pins.input(0);
    }
}

pub(super) fn read(gate: &BuiltInGate, pins: &mut Pins) {
    let address = pins.input(2) as usize % gate.memory.len();
    pins.set_output(0, gate.memory[address]);
}
