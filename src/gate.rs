use super::*;

use std::sync::Arc;

/// A live instance of a [`GateClass`].
/// Its pins are nodes in the [`Graph`] owned by the enclosing [`Circuit`].
#[derive(Debug, Clone)]
pub struct Gate {
    class: Arc<GateClass>,
    input_pins: Vec<NodeId>,
    output_pins: Vec<NodeId>,
    behavior: Behavior,
}

#[derive(Debug, Clone)]
pub enum Behavior {
    BuiltIn(BuiltInGate),
    Composite {
        internal_pins: Vec<NodeId>,
        parts: Vec<Gate>,
    },
}

impl Gate {
    pub(crate) fn new(class: Arc<GateClass>, input_pins: Vec<NodeId>, output_pins: Vec<NodeId>, behavior: Behavior) -> Gate {
        Gate {
            class,
            input_pins,
            output_pins,
            behavior,
        }
    }

    pub fn class(&self) -> &Arc<GateClass> {
        &self.class
    }

    pub fn input_pins(&self) -> &[NodeId] {
        &self.input_pins
    }

    pub fn output_pins(&self) -> &[NodeId] {
        &self.output_pins
    }

    pub fn internal_pins(&self) -> &[NodeId] {
        match &self.behavior {
            Behavior::BuiltIn(_) => &[],
            Behavior::Composite { internal_pins, .. } => internal_pins,
        }
    }

    pub fn parts(&self) -> &[Gate] {
        match &self.behavior {
            Behavior::BuiltIn(_) => &[],
            Behavior::Composite { parts, .. } => parts,
        }
    }

    pub fn pins(&self, pin_type: PinType) -> &[NodeId] {
        match pin_type {
            PinType::Input => self.input_pins(),
            PinType::Output => self.output_pins(),
            PinType::Internal => self.internal_pins(),
        }
    }

    /// The node behind the named pin, whatever its type.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        let (pin_type, index) = self.class.pin(name)?;
        let pins = match pin_type {
            PinType::Input => &self.input_pins,
            PinType::Output => &self.output_pins,
            PinType::Internal => match &self.behavior {
                Behavior::Composite { internal_pins, .. } => internal_pins,
                Behavior::BuiltIn(_) => return None,
            },
        };
        pins.get(index).copied()
    }

    /// Recomputes the outputs from the current inputs.
    pub fn eval(&mut self, graph: &mut Graph) {
        self.re_compute(graph);
    }

    /// The rising edge: settle the combinational logic, then let clocked parts sample their inputs.
    pub fn tick(&mut self, graph: &mut Graph) {
        self.eval(graph);
        self.clock_up(graph);
    }

    /// The falling edge: clocked parts publish what they sampled, then the logic settles again.
    pub fn tock(&mut self, graph: &mut Graph) {
        self.clock_down(graph);
        self.eval(graph);
    }

    fn re_compute(&mut self, graph: &mut Graph) {
        match &mut self.behavior {
            Behavior::BuiltIn(builtin) => {
                builtin.re_compute(&mut Pins::new(graph, &self.input_pins, &self.output_pins));
            },
            Behavior::Composite { parts, .. } => {
                for part in parts {
                    part.eval(graph);
                }
            },
        }
    }

    fn clock_up(&mut self, graph: &mut Graph) {
        match &mut self.behavior {
            Behavior::BuiltIn(builtin) => {
                builtin.clock_up(&mut Pins::new(graph, &self.input_pins, &self.output_pins));
            },
            Behavior::Composite { parts, .. } => {
                if self.class.is_clocked() {
                    for part in parts {
                        part.tick(graph);
                    }
                }
            },
        }
    }

    fn clock_down(&mut self, graph: &mut Graph) {
        match &mut self.behavior {
            Behavior::BuiltIn(builtin) => {
                builtin.clock_down(&mut Pins::new(graph, &self.input_pins, &self.output_pins));
            },
            Behavior::Composite { parts, .. } => {
                if self.class.is_clocked() {
                    for part in parts {
                        part.tock(graph);
                    }
                }
            },
        }
    }

    /// Visits every built-in gate in the instance tree, depth first in part order.
    pub fn visit_builtins(&self, f: &mut dyn FnMut(&BuiltInGate)) {
        match &self.behavior {
            Behavior::BuiltIn(builtin) => f(builtin),
            Behavior::Composite { parts, .. } => {
                for part in parts {
                    part.visit_builtins(f);
                }
            },
        }
    }

    pub fn visit_builtins_mut(&mut self, f: &mut dyn FnMut(&mut BuiltInGate)) {
        match &mut self.behavior {
            Behavior::BuiltIn(builtin) => f(builtin),
            Behavior::Composite { parts, .. } => {
                for part in parts {
                    part.visit_builtins_mut(f);
                }
            },
        }
    }
}

/// A top-level gate together with the node arena its whole instance tree lives in.
#[derive(Debug, Clone)]
pub struct Circuit {
    graph: Graph,
    gate: Gate,
}

impl Circuit {
    pub(crate) fn new(graph: Graph, gate: Gate) -> Circuit {
        Circuit { graph, gate }
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut Gate {
        &mut self.gate
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn class(&self) -> &Arc<GateClass> {
        self.gate.class()
    }

    pub fn eval(&mut self) {
        self.gate.eval(&mut self.graph);
    }

    pub fn tick(&mut self) {
        self.gate.tick(&mut self.graph);
    }

    pub fn tock(&mut self) {
        self.gate.tock(&mut self.graph);
    }

    /// Drives an input pin. The value is masked to the pin's width.
    pub fn set(&mut self, name: &str, value: Word) -> Option<()> {
        let (PinType::Input, index) = self.class().pin(name)? else {
            return None;
        };
        let width = self.class().input_pins_info()[index].width;
        let node = self.gate.input_pins()[index];
        self.graph.set(node, value & width_mask(width));
        Some(())
    }

    /// The value of any input, output, or internal pin of the top-level gate.
    pub fn get(&self, name: &str) -> Option<Word> {
        self.gate.node(name).map(|node| self.graph.get(node))
    }
}
