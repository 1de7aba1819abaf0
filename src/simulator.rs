use super::*;

use log::*;

/// How [`HardwareSimulator::get_formatted`] renders a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Decimal,
    Binary,
    Hex,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Format, String> {
        match s {
            "dec" | "decimal" | "D" => Ok(Format::Decimal),
            "bin" | "binary" | "B" => Ok(Format::Binary),
            "hex" | "X" => Ok(Format::Hex),
            _ => Err(format!("Unknown format {s}")),
        }
    }
}

/// A snapshot of one pin of the loaded chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinValue {
    pub name: String,
    pub width: Width,
    pub value: Word,
}

/// Drives a loaded chip through time.
/// A full clock cycle is a tick (rising edge) followed by a tock (falling edge).
#[derive(Debug, Default)]
pub struct HardwareSimulator {
    circuit: Option<Circuit>,
    time: u64,
    clock_up: bool,
}

impl HardwareSimulator {
    pub fn new() -> HardwareSimulator {
        HardwareSimulator::default()
    }

    /// Compiles and instantiates the named chip, resetting the clock.
    /// On failure, whatever was loaded before stays loaded.
    pub fn load_gate(&mut self, name: &str, workspace: &mut Workspace) -> Result<(), HdlError> {
        let class = workspace.gate_class(name)?;
        self.load_class(&class);
        Ok(())
    }

    pub fn load_class(&mut self, class: &std::sync::Arc<GateClass>) {
        let mut circuit = class.new_instance();
        circuit.eval();
        info!("Loaded chip {}", class.name());
        self.circuit = Some(circuit);
        self.time = 0;
        self.clock_up = false;
    }

    pub fn circuit(&self) -> Option<&Circuit> {
        self.circuit.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.circuit.is_some()
    }

    fn loaded(&self) -> Result<&Circuit, HdlError> {
        self.circuit.as_ref().ok_or_else(|| HdlError::runtime("No chip is loaded"))
    }

    fn loaded_mut(&mut self) -> Result<&mut Circuit, HdlError> {
        self.circuit.as_mut().ok_or_else(|| HdlError::runtime("No chip is loaded"))
    }

    pub fn eval(&mut self) -> Result<(), HdlError> {
        self.loaded_mut()?.eval();
        Ok(())
    }

    /// Runs the next clock phase: a tick if the clock is low, a tock if it is high.
    pub fn step(&mut self) -> Result<(), HdlError> {
        if self.clock_up {
            self.tock()
        } else {
            self.tick()
        }
    }

    pub fn tick(&mut self) -> Result<(), HdlError> {
        let circuit = self.loaded_mut()?;
        circuit.tick();
        self.clock_up = true;
        trace!("tick {}", self.time());
        Ok(())
    }

    pub fn tock(&mut self) -> Result<(), HdlError> {
        let circuit = self.loaded_mut()?;
        circuit.tock();
        self.clock_up = false;
        self.time += 1;
        trace!("tock {}", self.time());
        Ok(())
    }

    /// Completed clock cycles, with a `+` while the clock is high.
    pub fn time(&self) -> String {
        if self.clock_up {
            format!("{}+", self.time)
        } else {
            self.time.to_string()
        }
    }

    pub fn cycles(&self) -> u64 {
        self.time
    }

    /// Drives the input pin at `index`. The value wraps to 16 bits, then is masked to the pin's width.
    pub fn set_input_pin(&mut self, index: usize, value: i64) -> Result<(), HdlError> {
        let circuit = self.loaded()?;
        let Some(pin_info) = circuit.class().input_pins_info().get(index) else {
            return Err(HdlError::runtime(format!("{} has no input pin #{index}", circuit.class().name())));
        };
        let name = pin_info.name.clone();
        self.set_input(&name, value)
    }

    pub fn set_input(&mut self, name: &str, value: i64) -> Result<(), HdlError> {
        let circuit = self.loaded_mut()?;
        let word = value as Word;
        if circuit.set(name, word).is_none() {
            return Err(HdlError::runtime(format!("{} has no input pin {name}", circuit.class().name())));
        }
        debug!("{name} = {word}");
        Ok(())
    }

    /// The raw value of any pin of the loaded chip.
    pub fn value(&self, name: &str) -> Result<Word, HdlError> {
        let circuit = self.loaded()?;
        circuit
            .get(name)
            .ok_or_else(|| HdlError::runtime(format!("{} has no pin {name}", circuit.class().name())))
    }

    /// The value of a pin in decimal.
    pub fn get_value(&self, name: &str) -> Result<String, HdlError> {
        self.get_formatted(name, Format::Decimal)
    }

    pub fn get_formatted(&self, name: &str, format: Format) -> Result<String, HdlError> {
        let value = self.value(name)?;
        let width = self.pin_width(name)?;
        Ok(format_value(value, width, format))
    }

    fn pin_width(&self, name: &str) -> Result<Width, HdlError> {
        let class = self.loaded()?.class();
        class
            .pin(name)
            .and_then(|(pin_type, index)| class.pin_info(pin_type, index))
            .map(|pin_info| pin_info.width)
            .ok_or_else(|| HdlError::runtime(format!("{} has no pin {name}", class.name())))
    }

    /// The current value of every pin of the given type, in declaration order.
    pub fn pins(&self, pin_type: PinType) -> Result<Vec<PinValue>, HdlError> {
        let circuit = self.loaded()?;
        let class = circuit.class();
        let nodes = circuit.gate().pins(pin_type);
        Ok(class
            .pins_info(pin_type)
            .iter()
            .zip(nodes)
            .map(|(pin_info, node)| PinValue {
                name: pin_info.name.clone(),
                width: pin_info.width,
                value: circuit.graph().get(*node),
            })
            .collect())
    }

    /// Sets the key code reported by every `Keyboard` in the chip. 0 releases the key.
    pub fn press_key(&mut self, key: Word) -> Result<(), HdlError> {
        let circuit = self.loaded_mut()?;
        circuit.gate_mut().visit_builtins_mut(&mut |builtin| builtin.press_key(key));
        circuit.eval();
        Ok(())
    }

    /// Loads a program into every `ROM32K` in the chip.
    pub fn load_rom(&mut self, words: &[Word]) -> Result<(), HdlError> {
        let circuit = self.loaded_mut()?;
        let mut found = false;
        circuit.gate_mut().visit_builtins_mut(&mut |builtin| {
            if builtin.primitive() == Primitive::Rom32K {
                builtin.load_memory(words);
                found = true;
            }
        });
        if !found {
            return Err(HdlError::runtime(format!("{} has no ROM32K", circuit.class().name())));
        }
        circuit.eval();
        Ok(())
    }

    /// A word of the first `Screen` in the chip.
    pub fn screen_word(&self, address: usize) -> Result<Word, HdlError> {
        let circuit = self.loaded()?;
        let mut word = None;
        circuit.gate().visit_builtins(&mut |builtin| {
            if word.is_none() && builtin.primitive() == Primitive::Screen {
                word = Some(builtin.memory().get(address).copied().unwrap_or(0));
            }
        });
        word.ok_or_else(|| HdlError::runtime(format!("{} has no Screen", circuit.class().name())))
    }
}

/// Decimal is signed for full 16-bit pins and unsigned for narrower ones.
pub fn format_value(value: Word, width: Width, format: Format) -> String {
    let value = value & width_mask(width);
    match format {
        Format::Decimal if width == WORD_WIDTH => (value as i16).to_string(),
        Format::Decimal => value.to_string(),
        Format::Binary => to_binary_string(value, width),
        Format::Hex => format!("{:0digits$x}", value, digits = (width + 3) / 4),
    }
}
