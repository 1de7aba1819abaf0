use super::*;

pub(super) fn re_compute(gate: &BuiltInGate, pins: &mut Pins) {
    match gate.primitive {
        Primitive::Keyboard => pins.set_output(0, gate.state),
        Primitive::Rom32K => {
            let address = pins.input(0) as usize % gate.memory.len();
            pins.set_output(0, gate.memory[address]);
        },
        primitive => unreachable!("{primitive:?} is not a computer part"),
    }
}
