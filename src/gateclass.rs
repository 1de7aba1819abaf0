use super::*;

use std::collections::BTreeMap;
use std::sync::Arc;

pub type Width = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinInfo {
    pub name: String,
    pub width: Width,
}

impl PinInfo {
    pub fn new<S: Into<String>>(name: S, width: Width) -> PinInfo {
        PinInfo { name: name.into(), width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinType {
    Input,
    Output,
    Internal,
}

impl std::fmt::Display for PinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinType::Input => write!(f, "input"),
            PinType::Output => write!(f, "output"),
            PinType::Internal => write!(f, "internal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    /// A part input fed by one of the chip's input pins.
    FromInput,
    /// A part output driving one of the chip's output pins.
    ToOutput,
    FromInternal,
    ToInternal,
    FromTrue,
    FromFalse,
}

impl ConnectionKind {
    /// Whether the part side of the connection is one of the part's inputs or outputs.
    pub fn part_pin_type(self) -> PinType {
        match self {
            ConnectionKind::ToOutput | ConnectionKind::ToInternal => PinType::Output,
            _ => PinType::Input,
        }
    }
}

/// One `partPin=gatePin` clause of a `PARTS` section, checked but not yet wired.
/// `gate_pin_index` indexes the pin list selected by `kind` and is unused for constants.
#[derive(Debug, Clone)]
pub struct Connection {
    pub kind: ConnectionKind,
    pub gate_pin_index: usize,
    pub part_index: usize,
    pub part_pin_name: String,
    /// Indexes the part's inputs or outputs, per [`ConnectionKind::part_pin_type`].
    pub part_pin_index: usize,
    pub gate_sub_bus: Option<SubBus>,
    pub part_sub_bus: Option<SubBus>,
}

#[derive(Debug)]
pub enum GateBody {
    BuiltIn(Primitive),
    Composite {
        parts: Vec<Arc<GateClass>>,
        connections: Vec<Connection>,
    },
}

/// A compiled chip: its pins and how it is implemented.
/// One class is shared by every instance made from it.
#[derive(Debug)]
pub struct GateClass {
    pub(crate) name: String,
    pub(crate) input_pins_info: Vec<PinInfo>,
    pub(crate) output_pins_info: Vec<PinInfo>,
    pub(crate) internal_pins_info: Vec<PinInfo>,
    pub(crate) pins_by_name: BTreeMap<String, (PinType, usize)>,
    pub(crate) is_clocked: bool,
    pub(crate) is_input_clocked: Vec<bool>,
    pub(crate) is_output_clocked: Vec<bool>,
    pub(crate) body: GateBody,
}

impl GateClass {
    pub(crate) fn new(name: String, inputs: Vec<PinInfo>, outputs: Vec<PinInfo>, body: GateBody) -> GateClass {
        let mut class = GateClass {
            name,
            is_input_clocked: vec![false; inputs.len()],
            is_output_clocked: vec![false; outputs.len()],
            input_pins_info: vec![],
            output_pins_info: vec![],
            internal_pins_info: vec![],
            pins_by_name: BTreeMap::new(),
            is_clocked: false,
            body,
        };
        for pin_info in inputs {
            class.register_pin(pin_info, PinType::Input);
        }
        for pin_info in outputs {
            class.register_pin(pin_info, PinType::Output);
        }
        class
    }

    /// Adds a pin to the registry and returns its index within its type.
    pub(crate) fn register_pin(&mut self, pin_info: PinInfo, pin_type: PinType) -> usize {
        let pins = match pin_type {
            PinType::Input => &mut self.input_pins_info,
            PinType::Output => &mut self.output_pins_info,
            PinType::Internal => &mut self.internal_pins_info,
        };
        let index = pins.len();
        self.pins_by_name.insert(pin_info.name.clone(), (pin_type, index));
        pins.push(pin_info);
        index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_pins_info(&self) -> &[PinInfo] {
        &self.input_pins_info
    }

    pub fn output_pins_info(&self) -> &[PinInfo] {
        &self.output_pins_info
    }

    pub fn internal_pins_info(&self) -> &[PinInfo] {
        &self.internal_pins_info
    }

    pub fn pins_info(&self, pin_type: PinType) -> &[PinInfo] {
        match pin_type {
            PinType::Input => &self.input_pins_info,
            PinType::Output => &self.output_pins_info,
            PinType::Internal => &self.internal_pins_info,
        }
    }

    pub fn pin(&self, name: &str) -> Option<(PinType, usize)> {
        self.pins_by_name.get(name).copied()
    }

    pub fn pin_info(&self, pin_type: PinType, index: usize) -> Option<&PinInfo> {
        self.pins_info(pin_type).get(index)
    }

    /// Looks up an input or output pin. Internal pins are private to the chip.
    pub fn interface_pin(&self, name: &str) -> Option<(PinType, usize, &PinInfo)> {
        match self.pin(name)? {
            (PinType::Internal, _index) => None,
            (pin_type, index) => Some((pin_type, index, self.pin_info(pin_type, index)?)),
        }
    }

    pub fn is_clocked(&self) -> bool {
        self.is_clocked
    }

    pub fn is_input_clocked(&self, index: usize) -> bool {
        self.is_input_clocked.get(index).copied().unwrap_or(false)
    }

    pub fn is_output_clocked(&self, index: usize) -> bool {
        self.is_output_clocked.get(index).copied().unwrap_or(false)
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.body, GateBody::BuiltIn(_))
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match &self.body {
            GateBody::BuiltIn(primitive) => Some(*primitive),
            GateBody::Composite { .. } => None,
        }
    }

    pub fn parts(&self) -> &[Arc<GateClass>] {
        match &self.body {
            GateBody::BuiltIn(_) => &[],
            GateBody::Composite { parts, .. } => parts,
        }
    }

    pub fn connections(&self) -> &[Connection] {
        match &self.body {
            GateBody::BuiltIn(_) => &[],
            GateBody::Composite { connections, .. } => connections,
        }
    }

    pub fn body(&self) -> &GateBody {
        &self.body
    }

    fn part_pin_clocked(part: &GateClass, name: &str) -> bool {
        match part.pin(name) {
            Some((PinType::Input, index)) => part.is_input_clocked(index),
            Some((PinType::Output, index)) => part.is_output_clocked(index),
            _ => false,
        }
    }

    /// A composite chip is clocked when any of its parts is.
    /// An input is clocked when every part input it feeds is clocked,
    /// and an output is clocked when every part output driving it is clocked.
    pub(crate) fn infer_clocking(&mut self) {
        let GateBody::Composite { parts, connections } = &self.body else {
            return;
        };

        let mut inputs: Vec<Option<bool>> = vec![None; self.input_pins_info.len()];
        let mut outputs: Vec<Option<bool>> = vec![None; self.output_pins_info.len()];
        for connection in connections {
            let clocked = GateClass::part_pin_clocked(&parts[connection.part_index], &connection.part_pin_name);
            let slot = match connection.kind {
                ConnectionKind::FromInput => &mut inputs[connection.gate_pin_index],
                ConnectionKind::ToOutput => &mut outputs[connection.gate_pin_index],
                _ => continue,
            };
            *slot = Some(slot.unwrap_or(true) && clocked);
        }

        self.is_clocked = parts.iter().any(|part| part.is_clocked());
        self.is_input_clocked = inputs.into_iter().map(|clocked| clocked.unwrap_or(false)).collect();
        self.is_output_clocked = outputs.into_iter().map(|clocked| clocked.unwrap_or(false)).collect();
    }

    /// Parts are evaluated in the order they are declared, so a part reading an internal pin
    /// computed by a later part sees last evaluation's value, and a combinational loop never settles.
    /// Returns a description of each such hazard.
    /// Clocked part inputs and latched part outputs break the chain: those only change on the clock.
    pub fn evaluation_order_hazards(&self) -> Vec<String> {
        use petgraph::algo::toposort;
        use petgraph::graph::{DiGraph, NodeIndex};

        let GateClass { body: GateBody::Composite { parts, connections }, .. } = self else {
            return vec![];
        };

        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..parts.len()).map(|part_index| graph.add_node(part_index)).collect();

        let mut drivers: BTreeMap<usize, (usize, &str)> = BTreeMap::new();
        for connection in connections {
            if connection.kind == ConnectionKind::ToInternal {
                drivers.insert(connection.gate_pin_index, (connection.part_index, connection.part_pin_name.as_str()));
            }
        }

        let mut hazards = vec![];
        for connection in connections {
            if connection.kind != ConnectionKind::FromInternal {
                continue;
            }
            let reader = connection.part_index;
            if GateClass::part_pin_clocked(&parts[reader], &connection.part_pin_name) {
                continue;
            }
            let Some(&(driver, driver_pin)) = drivers.get(&connection.gate_pin_index) else {
                continue;
            };
            if GateClass::part_pin_clocked(&parts[driver], driver_pin) {
                continue;
            }
            graph.update_edge(nodes[driver], nodes[reader], ());
            if driver > reader {
                let pin = &self.internal_pins_info[connection.gate_pin_index].name;
                hazards.push(format!(
                    "{}: part {} ({}) reads {pin} before part {} ({}) computes it",
                    self.name,
                    reader + 1,
                    parts[reader].name(),
                    driver + 1,
                    parts[driver].name(),
                ));
            }
        }

        if let Err(cycle) = toposort(&graph, None) {
            let part_index = graph[cycle.node_id()];
            hazards.push(format!(
                "{}: combinational loop through part {} ({})",
                self.name,
                part_index + 1,
                parts[part_index].name(),
            ));
        }
        hazards
    }
}
