use super::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

const HELP: &str = "\
set <pin> <value>      drive an input pin (decimal, 0x.. or 0b..)
get <pin> [dec|bin|hex]
eval                   recompute the combinational logic
tick | tock            run half a clock cycle
step [n]               run n clock phases (default 1)
run                    run whole clock cycles until Ctrl-C
show                   print every pin of the chip
json                   print every pin of the chip as JSON
load <chip>            re-read the workspace and load a chip
key <code>             hold a key down (0 releases it)
rom <file>             load a .hack program into the ROM32K
screen <address>       print a word of the Screen
help | quit";

pub struct Repl {
    simulator: HardwareSimulator,
    workspace: Workspace,
    readline: rustyline::DefaultEditor,
    interrupted: Arc<AtomicBool>,
}

impl Repl {
    pub fn new(simulator: HardwareSimulator, workspace: Workspace) -> anyhow::Result<Repl> {
        let readline = rustyline::DefaultEditor::new()?;

        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = interrupted.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

        Ok(Repl {
            simulator,
            workspace,
            readline,
            interrupted,
        })
    }

    fn prompt(&self) -> String {
        match self.simulator.circuit() {
            Some(circuit) => format!("{} @{}> ", circuit.class().name(), self.simulator.time()),
            None => "> ".to_string(),
        }
    }

    fn readline(&mut self) -> anyhow::Result<Option<String>> {
        loop {
            let prompt = self.prompt();
            match self.readline.readline(&prompt) {
                Ok(line) => {
                    self.readline.add_history_entry(line.as_str())?;
                    return Ok(Some(line));
                },
                Err(rustyline::error::ReadlineError::Eof) => return Ok(None),
                Err(rustyline::error::ReadlineError::Interrupted) => (),
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.show();
        while let Some(line) = self.readline()? {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }
            match self.exec(&words) {
                Ok(true) => (),
                Ok(false) => break,
                Err(e) => eprintln!("{e}"),
            }
        }
        Ok(())
    }

    /// Runs one command. Returns `false` when the session should end.
    fn exec(&mut self, words: &[&str]) -> anyhow::Result<bool> {
        match words {
            ["quit" | "exit" | "q"] => return Ok(false),
            ["help" | "?"] => println!("{HELP}"),
            ["set", pin, value] => {
                self.simulator.set_input(pin, parse_value(value)?)?;
                self.simulator.eval()?;
                self.show_outputs()?;
            },
            ["get", pin] => println!("{pin} = {}", self.simulator.get_value(pin)?),
            ["get", pin, format] => {
                let format: Format = format.parse().map_err(anyhow::Error::msg)?;
                println!("{pin} = {}", self.simulator.get_formatted(pin, format)?);
            },
            ["eval"] => {
                self.simulator.eval()?;
                self.show_outputs()?;
            },
            ["tick"] => {
                self.simulator.tick()?;
                self.show_outputs()?;
            },
            ["tock"] => {
                self.simulator.tock()?;
                self.show_outputs()?;
            },
            ["step"] => {
                self.simulator.step()?;
                self.show_outputs()?;
            },
            ["step", n] => {
                for _ in 0..n.parse::<usize>()? {
                    self.simulator.step()?;
                }
                self.show_outputs()?;
            },
            ["run"] => self.run_until_interrupted()?,
            ["show"] => self.show(),
            ["json"] => println!("{}", serde_json::to_string_pretty(&self.to_json()?)?),
            ["load", name] => {
                let name = name.strip_suffix(".hdl").unwrap_or(*name);
                self.workspace.reload()?;
                self.simulator.load_gate(name, &mut self.workspace)?;
                self.show();
            },
            ["key", code] => {
                self.simulator.press_key(parse_value(code)? as Word)?;
                self.show_outputs()?;
            },
            ["rom", filename] => {
                let text = std::fs::read_to_string(filename)?;
                let words = parse_hack(&text)?;
                self.simulator.load_rom(&words)?;
                println!("Loaded {} words", words.len());
            },
            ["screen", address] => {
                let word = self.simulator.screen_word(address.parse()?)?;
                println!("{}", to_binary_string(word, WORD_WIDTH));
            },
            _ => anyhow::bail!("Unknown command: {}. Try help.", words.join(" ")),
        }
        Ok(true)
    }

    fn run_until_interrupted(&mut self) -> anyhow::Result<()> {
        self.interrupted.store(false, Ordering::SeqCst);
        while !self.interrupted.load(Ordering::SeqCst) {
            self.simulator.tick()?;
            self.simulator.tock()?;
        }
        println!("Stopped at {}", self.simulator.time());
        self.show_outputs()?;
        Ok(())
    }

    fn show_pins(&self, title: &str, pin_type: PinType) -> anyhow::Result<()> {
        let pins = self.simulator.pins(pin_type)?;
        if pins.is_empty() {
            return Ok(());
        }
        println!("{title}:");
        for pin in pins {
            println!(
                "    {:>16}   {:>6}   {}",
                to_binary_string(pin.value, pin.width),
                format_value(pin.value, pin.width, Format::Decimal),
                pin.name,
            );
        }
        Ok(())
    }

    fn show_outputs(&self) -> anyhow::Result<()> {
        self.show_pins("OUT", PinType::Output)
    }

    fn show(&self) {
        if !self.simulator.is_loaded() {
            println!("No chip is loaded");
            return;
        }
        println!("Time: {}", self.simulator.time());
        for (title, pin_type) in [("IN", PinType::Input), ("OUT", PinType::Output), ("PARTS", PinType::Internal)] {
            if let Err(e) = self.show_pins(title, pin_type) {
                eprintln!("{e}");
            }
        }
    }

    fn to_json(&self) -> anyhow::Result<Value> {
        let pins = |pin_type| -> anyhow::Result<Value> {
            let mut map = serde_json::Map::new();
            for pin in self.simulator.pins(pin_type)? {
                map.insert(pin.name, json!({ "width": pin.width, "value": pin.value }));
            }
            Ok(Value::Object(map))
        };
        let name = self.simulator.circuit().map(|circuit| circuit.class().name().to_string());
        Ok(json!({
            "chip": name,
            "time": self.simulator.time(),
            "inputs": pins(PinType::Input)?,
            "outputs": pins(PinType::Output)?,
            "internal": pins(PinType::Internal)?,
        }))
    }
}

/// Decimal (possibly negative), `0x` hex, or `0b` binary.
fn parse_value(s: &str) -> anyhow::Result<i64> {
    let value = if let Some(hex) = s.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)?
    } else if let Some(bin) = s.strip_prefix("0b") {
        i64::from_str_radix(bin, 2)?
    } else {
        s.parse()?
    };
    Ok(value)
}

/// One 16-digit binary word per line, blank lines skipped.
fn parse_hack(text: &str) -> anyhow::Result<Vec<Word>> {
    let mut words = vec![];
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.len() != WORD_WIDTH {
            anyhow::bail!("Line {}: expected {WORD_WIDTH} binary digits", i + 1);
        }
        words.push(Word::from_str_radix(line, 2)?);
    }
    Ok(words)
}
