use super::*;

pub(super) fn re_compute(primitive: Primitive, pins: &mut Pins) {
    match primitive {
        Primitive::Nand => {
            let out = !(pins.input(0) & pins.input(1)) & 1;
            pins.set_output(0, out);
        },
        Primitive::Not => {
            let out = !pins.input(0) & 1;
            pins.set_output(0, out);
        },
        Primitive::Not16 => {
            let out = !pins.input(0);
            pins.set_output(0, out);
        },
        Primitive::And => {
            let out = pins.input(0) & pins.input(1);
            pins.set_output(0, out);
        },
        Primitive::Or => {
            let out = pins.input(0) | pins.input(1);
            pins.set_output(0, out);
        },
        Primitive::Xor => {
            let out = pins.input(0) ^ pins.input(1);
            pins.set_output(0, out);
        },
        Primitive::Mux => {
            let out = if pins.bit(2) { pins.input(1) } else { pins.input(0) };
            pins.set_output(0, out);
        },
        // a, b, c, d are inputs 0 through 3, so sel indexes them directly.
        Primitive::Mux4Way16 => {
            let sel = pins.input(4) & 0b11;
            let out = pins.input(sel as usize);
            pins.set_output(0, out);
        },
        Primitive::Mux8Way16 => {
            let sel = pins.input(8) & 0b111;
            let out = pins.input(sel as usize);
            pins.set_output(0, out);
        },
        Primitive::DMux => demux(pins, 2),
        Primitive::DMux4Way => demux(pins, 4),
        Primitive::DMux8Way => demux(pins, 8),
        Primitive::Or8Way => {
            let out = if pins.input(0) & 0xff != 0 { 1 } else { 0 };
            pins.set_output(0, out);
        },
        _ => unreachable!("{primitive:?} is not a logic gate"),
    }
}

fn demux(pins: &mut Pins, ways: usize) {
    let value = pins.input(0);
    let sel = pins.input(1) as usize;
    for i in 0..ways {
        pins.set_output(i, if i == sel { value } else { 0 });
    }
}
