use super::*;

mod arithmetic;
mod computer;
mod logic;
mod memory;

use std::collections::BTreeMap;

use lazy_static::lazy_static;

/// The closed set of natively implemented chips.
/// A `BUILTIN` clause names one of these through its catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Nand,
    Not,
    Not16,
    And,
    Or,
    Xor,
    Mux,
    Mux4Way16,
    Mux8Way16,
    DMux,
    DMux4Way,
    DMux8Way,
    Or8Way,

    HalfAdder,
    FullAdder,
    Add16,
    Inc16,
    Alu,

    Dff,
    Bit,
    Register,
    Pc,
    /// Word memory with the given number of registers.
    Ram(usize),

    Screen,
    Keyboard,
    Rom32K,
}

pub const SCREEN_SIZE: usize = 8192;
pub const ROM_SIZE: usize = 32768;

impl Primitive {
    /// How many input and output pins the primitive reads and writes.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            Primitive::Nand => (2, 1),
            Primitive::Not => (1, 1),
            Primitive::Not16 => (1, 1),
            Primitive::And => (2, 1),
            Primitive::Or => (2, 1),
            Primitive::Xor => (2, 1),
            Primitive::Mux => (3, 1),
            Primitive::Mux4Way16 => (5, 1),
            Primitive::Mux8Way16 => (9, 1),
            Primitive::DMux => (2, 2),
            Primitive::DMux4Way => (2, 4),
            Primitive::DMux8Way => (2, 8),
            Primitive::Or8Way => (1, 1),
            Primitive::HalfAdder => (2, 2),
            Primitive::FullAdder => (3, 2),
            Primitive::Add16 => (2, 1),
            Primitive::Inc16 => (1, 1),
            Primitive::Alu => (8, 3),
            Primitive::Dff => (1, 1),
            Primitive::Bit => (2, 1),
            Primitive::Register => (2, 1),
            Primitive::Pc => (4, 1),
            Primitive::Ram(_) => (3, 1),
            Primitive::Screen => (3, 1),
            Primitive::Keyboard => (0, 1),
            Primitive::Rom32K => (1, 1),
        }
    }

    /// Latches only ever show what they stored on the last clock.
    pub fn is_output_latched(&self) -> bool {
        matches!(self, Primitive::Dff | Primitive::Bit | Primitive::Register | Primitive::Pc)
    }

    fn memory_size(&self) -> usize {
        match self {
            Primitive::Ram(size) => *size,
            Primitive::Screen => SCREEN_SIZE,
            Primitive::Rom32K => ROM_SIZE,
            _ => 0,
        }
    }
}

#[derive(Debug)]
pub struct BuiltInDef {
    pub name: &'static str,
    pub hdl: &'static str,
    pub primitive: Primitive,
}

macro_rules! catalog {
    ($($name:literal => $primitive:expr, $hdl:literal;)*) => {
        vec![$(BuiltInDef { name: $name, hdl: $hdl, primitive: $primitive }),*]
    };
}

lazy_static! {
    static ref CATALOG: BTreeMap<&'static str, BuiltInDef> = {
        let defs = catalog! {
            "Nand" => Primitive::Nand, "CHIP Nand { IN a, b; OUT out; BUILTIN Nand; }";
            "Not" => Primitive::Not, "CHIP Not { IN in; OUT out; BUILTIN Not; }";
            "Not16" => Primitive::Not16, "CHIP Not16 { IN in[16]; OUT out[16]; BUILTIN Not16; }";
            "And" => Primitive::And, "CHIP And { IN a, b; OUT out; BUILTIN And; }";
            "And16" => Primitive::And, "CHIP And16 { IN a[16], b[16]; OUT out[16]; BUILTIN And; }";
            "Or" => Primitive::Or, "CHIP Or { IN a, b; OUT out; BUILTIN Or; }";
            "Or16" => Primitive::Or, "CHIP Or16 { IN a[16], b[16]; OUT out[16]; BUILTIN Or; }";
            "Xor" => Primitive::Xor, "CHIP Xor { IN a, b; OUT out; BUILTIN Xor; }";
            "Mux" => Primitive::Mux, "CHIP Mux { IN a, b, sel; OUT out; BUILTIN Mux; }";
            "Mux16" => Primitive::Mux, "CHIP Mux16 { IN a[16], b[16], sel; OUT out[16]; BUILTIN Mux; }";
            "Mux4Way16" => Primitive::Mux4Way16,
                "CHIP Mux4Way16 { IN a[16], b[16], c[16], d[16], sel[2]; OUT out[16]; BUILTIN Mux4Way16; }";
            "Mux8Way16" => Primitive::Mux8Way16,
                "CHIP Mux8Way16 { IN a[16], b[16], c[16], d[16], e[16], f[16], g[16], h[16], sel[3]; OUT out[16]; BUILTIN Mux8Way16; }";
            "DMux" => Primitive::DMux, "CHIP DMux { IN in, sel; OUT a, b; BUILTIN DMux; }";
            "DMux4Way" => Primitive::DMux4Way, "CHIP DMux4Way { IN in, sel[2]; OUT a, b, c, d; BUILTIN DMux4Way; }";
            "DMux8Way" => Primitive::DMux8Way,
                "CHIP DMux8Way { IN in, sel[3]; OUT a, b, c, d, e, f, g, h; BUILTIN DMux8Way; }";
            "Or8Way" => Primitive::Or8Way, "CHIP Or8Way { IN in[8]; OUT out; BUILTIN Or8Way; }";

            "HalfAdder" => Primitive::HalfAdder, "CHIP HalfAdder { IN a, b; OUT sum, carry; BUILTIN HalfAdder; }";
            "FullAdder" => Primitive::FullAdder, "CHIP FullAdder { IN a, b, c; OUT sum, carry; BUILTIN FullAdder; }";
            "Add16" => Primitive::Add16, "CHIP Add16 { IN a[16], b[16]; OUT out[16]; BUILTIN Add16; }";
            "Inc16" => Primitive::Inc16, "CHIP Inc16 { IN in[16]; OUT out[16]; BUILTIN Inc16; }";
            "ALU" => Primitive::Alu,
                "CHIP ALU { IN x[16], y[16], zx, nx, zy, ny, f, no; OUT out[16], zr, ng; BUILTIN ALU; }";

            "DFF" => Primitive::Dff, "CHIP DFF { IN in; OUT out; BUILTIN DFF; CLOCKED in; }";
            "Bit" => Primitive::Bit, "CHIP Bit { IN in, load; OUT out; BUILTIN Bit; CLOCKED in, load; }";
            "Register" => Primitive::Register,
                "CHIP Register { IN in[16], load; OUT out[16]; BUILTIN Register; CLOCKED in, load; }";
            "PC" => Primitive::Pc,
                "CHIP PC { IN in[16], load, inc, reset; OUT out[16]; BUILTIN PC; CLOCKED in, load, inc, reset; }";
            "RAM8" => Primitive::Ram(8),
                "CHIP RAM8 { IN in[16], load, address[3]; OUT out[16]; BUILTIN RAM8; CLOCKED in, load; }";
            "RAM64" => Primitive::Ram(64),
                "CHIP RAM64 { IN in[16], load, address[6]; OUT out[16]; BUILTIN RAM64; CLOCKED in, load; }";
            "RAM512" => Primitive::Ram(512),
                "CHIP RAM512 { IN in[16], load, address[9]; OUT out[16]; BUILTIN RAM512; CLOCKED in, load; }";
            "RAM4K" => Primitive::Ram(4096),
                "CHIP RAM4K { IN in[16], load, address[12]; OUT out[16]; BUILTIN RAM4K; CLOCKED in, load; }";
            "RAM16K" => Primitive::Ram(16384),
                "CHIP RAM16K { IN in[16], load, address[14]; OUT out[16]; BUILTIN RAM16K; CLOCKED in, load; }";

            "Screen" => Primitive::Screen,
                "CHIP Screen { IN in[16], load, address[13]; OUT out[16]; BUILTIN Screen; CLOCKED in, load; }";
            "Keyboard" => Primitive::Keyboard, "CHIP Keyboard { OUT out[16]; BUILTIN Keyboard; }";
            "ROM32K" => Primitive::Rom32K, "CHIP ROM32K { IN address[15]; OUT out[16]; BUILTIN ROM32K; }";
        };
        defs.into_iter().map(|def| (def.name, def)).collect()
    };
}

/// Looks up a catalog entry by chip name.
pub fn builtin(name: &str) -> Option<&'static BuiltInDef> {
    CATALOG.get(name)
}

pub fn builtin_names() -> Vec<&'static str> {
    CATALOG.keys().copied().collect()
}

/// A view of one gate's pins inside the circuit's [`Graph`].
pub struct Pins<'a> {
    graph: &'a mut Graph,
    inputs: &'a [NodeId],
    outputs: &'a [NodeId],
}

impl<'a> Pins<'a> {
    pub fn new(graph: &'a mut Graph, inputs: &'a [NodeId], outputs: &'a [NodeId]) -> Pins<'a> {
        Pins { graph, inputs, outputs }
    }

    fn input(&self, i: usize) -> Word {
        self.graph.get(self.inputs[i])
    }

    fn bit(&self, i: usize) -> bool {
        self.input(i) != 0
    }

    fn set_output(&mut self, i: usize, value: Word) {
        self.graph.set(self.outputs[i], value);
    }
}

/// The runtime half of a built-in chip: its primitive plus whatever it remembers
/// between clock phases.
#[derive(Debug, Clone)]
pub struct BuiltInGate {
    primitive: Primitive,
    state: Word,
    memory: Vec<Word>,
}

impl BuiltInGate {
    pub fn new(primitive: Primitive) -> BuiltInGate {
        BuiltInGate {
            primitive,
            state: 0,
            memory: vec![0; primitive.memory_size()],
        }
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub(crate) fn re_compute(&mut self, pins: &mut Pins) {
        match self.primitive {
            Primitive::HalfAdder
            | Primitive::FullAdder
            | Primitive::Add16
            | Primitive::Inc16
            | Primitive::Alu => arithmetic::re_compute(self.primitive, pins),
            Primitive::Dff | Primitive::Bit | Primitive::Register | Primitive::Pc => (),
            Primitive::Ram(_) | Primitive::Screen => memory::read(self, pins),
            Primitive::Keyboard | Primitive::Rom32K => computer::re_compute(self, pins),
            _ => logic::re_compute(self.primitive, pins),
        }
    }

    pub(crate) fn clock_up(&mut self, pins: &mut Pins) {
        match self.primitive {
            Primitive::Dff | Primitive::Bit | Primitive::Register | Primitive::Pc => memory::latch(self, pins),
            Primitive::Ram(_) | Primitive::Screen => memory::write(self, pins),
            _ => (),
        }
    }

    pub(crate) fn clock_down(&mut self, pins: &mut Pins) {
        match self.primitive {
            Primitive::Dff | Primitive::Bit | Primitive::Register | Primitive::Pc => pins.set_output(0, self.state),
            Primitive::Ram(_) | Primitive::Screen => memory::read(self, pins),
            _ => (),
        }
    }

    /// The key code a `Keyboard` reports on its next evaluation. 0 means no key.
    pub fn press_key(&mut self, key: Word) {
        if self.primitive == Primitive::Keyboard {
            self.state = key;
        }
    }

    pub fn memory(&self) -> &[Word] {
        &self.memory
    }

    /// Overwrites memory from address 0 onwards. Extra words are dropped.
    pub fn load_memory(&mut self, words: &[Word]) {
        for (slot, word) in self.memory.iter_mut().zip(words) {
            *slot = *word;
        }
    }
}
