use super::*;

pub(super) fn re_compute(primitive: Primitive, pins: &mut Pins) {
    match primitive {
        Primitive::HalfAdder => {
            let a = pins.input(0);
            let b = pins.input(1);
            pins.set_output(0, a ^ b);
            pins.set_output(1, a & b);
        },
        Primitive::FullAdder => {
            let sum = (pins.input(0) & 1) + (pins.input(1) & 1) + (pins.input(2) & 1);
            pins.set_output(0, sum % 2);
            pins.set_output(1, sum / 2);
        },
        Primitive::Add16 => {
            let out = pins.input(0).wrapping_add(pins.input(1));
            pins.set_output(0, out);
        },
        Primitive::Inc16 => {
            let out = pins.input(0).wrapping_add(1);
            pins.set_output(0, out);
        },
        Primitive::Alu => alu(pins),
        _ => unreachable!("{primitive:?} is not an arithmetic gate"),
    }
}

/// Inputs are `x, y, zx, nx, zy, ny, f, no`. Outputs are `out, zr, ng`.
fn alu(pins: &mut Pins) {
    let mut x = pins.input(0);
    let mut y = pins.input(1);

    if pins.bit(2) {
        x = 0;
    }
    if pins.bit(3) {
        x = !x;
    }
    if pins.bit(4) {
        y = 0;
    }
    if pins.bit(5) {
        y = !y;
    }

    let mut out = if pins.bit(6) { x.wrapping_add(y) } else { x & y };
    if pins.bit(7) {
        out = !out;
    }

    pins.set_output(0, out);
    pins.set_output(1, if out == 0 { 1 } else { 0 });
    pins.set_output(2, if (out as i16) < 0 { 1 } else { 0 });
}
