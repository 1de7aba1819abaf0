use super::*;

use std::sync::Arc;

use log::*;

impl GateClass {
    /// Builds a fresh instance of this chip, with all nodes at 0 apart from constant inputs.
    pub fn new_instance(self: &Arc<Self>) -> Circuit {
        let mut graph = Graph::new();
        let gate = instantiate(self, &mut graph);
        debug!("Instantiated {} with {} nodes", self.name(), graph.len());
        Circuit::new(graph, gate)
    }
}

pub(crate) fn instantiate(class: &Arc<GateClass>, graph: &mut Graph) -> Gate {
    match class.body() {
        GateBody::BuiltIn(primitive) => {
            let input_pins = class.input_pins_info().iter().map(|_| graph.add_node()).collect();
            let output_pins = class.output_pins_info().iter().map(|_| graph.add_node()).collect();
            Gate::new(class.clone(), input_pins, output_pins, Behavior::BuiltIn(BuiltInGate::new(*primitive)))
        },
        GateBody::Composite { parts, connections } => instantiate_composite(class, parts, connections, graph),
    }
}

/// Wires the parts of a composite chip together in two passes.
/// The first pass connects the chip's own pins and creates each internal pin's node
/// from the part output driving it. The second pass hooks the readers of internal pins
/// onto those nodes and pushes constants into the part inputs tied to `true` or `false`.
fn instantiate_composite(
    class: &Arc<GateClass>,
    parts: &[Arc<GateClass>],
    connections: &[Connection],
    graph: &mut Graph,
) -> Gate {
    let part_gates: Vec<Gate> = parts.iter().map(|part| instantiate(part, graph)).collect();
    let input_pins: Vec<NodeId> = class.input_pins_info().iter().map(|_| graph.add_node()).collect();
    let output_pins: Vec<NodeId> = class.output_pins_info().iter().map(|_| graph.add_node()).collect();
    let mut internal_pins: Vec<Option<NodeId>> = vec![None; class.internal_pins_info().len()];

    let mut deferred = vec![];
    for connection in connections {
        let part_gate = &part_gates[connection.part_index];
        let part_node = part_gate.pins(connection.kind.part_pin_type())[connection.part_pin_index];
        let index = connection.gate_pin_index;
        match connection.kind {
            ConnectionKind::FromInput => connect_gate_to_part(
                graph,
                input_pins[index],
                connection.gate_sub_bus,
                part_node,
                connection.part_sub_bus,
            ),
            ConnectionKind::ToOutput => connect_gate_to_part(
                graph,
                part_node,
                connection.part_sub_bus,
                output_pins[index],
                connection.gate_sub_bus,
            ),
            ConnectionKind::ToInternal => {
                let node = match connection.part_sub_bus {
                    Some(sub_bus) => graph.add_sub_node(sub_bus),
                    None => graph.add_node(),
                };
                graph.connect(part_node, node);
                internal_pins[index] = Some(node);
            },
            ConnectionKind::FromInternal | ConnectionKind::FromTrue | ConnectionKind::FromFalse => {
                deferred.push((connection, part_node));
            },
        }
    }

    let internal_pins: Vec<NodeId> = internal_pins.into_iter().map(|node| node.unwrap_or_else(|| graph.add_node())).collect();

    for (connection, part_node) in deferred {
        match connection.kind {
            ConnectionKind::FromInternal => connect_gate_to_part(
                graph,
                internal_pins[connection.gate_pin_index],
                connection.gate_sub_bus,
                part_node,
                connection.part_sub_bus,
            ),
            _ => {
                let part_gate = &part_gates[connection.part_index];
                let pin_width = part_gate.class().input_pins_info()[connection.part_pin_index].width;
                let value = if connection.kind == ConnectionKind::FromTrue {
                    width_mask(connection.part_sub_bus.map_or(pin_width, |sub_bus| sub_bus.width()))
                } else {
                    0
                };
                let target = match connection.part_sub_bus {
                    Some(sub_bus) => graph.add_adapter(part_node, sub_bus),
                    None => part_node,
                };
                graph.set(target, value);
            },
        }
    }

    Gate::new(
        class.clone(),
        input_pins,
        output_pins,
        Behavior::Composite {
            internal_pins,
            parts: part_gates,
        },
    )
}

/// Makes `target` follow `source`.
/// A source sub bus is read through a sub node, a target sub bus is written through an adapter.
pub(crate) fn connect_gate_to_part(
    graph: &mut Graph,
    source: NodeId,
    source_sub_bus: Option<SubBus>,
    target: NodeId,
    target_sub_bus: Option<SubBus>,
) {
    let target = match target_sub_bus {
        Some(sub_bus) => graph.add_adapter(target, sub_bus),
        None => target,
    };
    match source_sub_bus {
        Some(sub_bus) => {
            let sub_node = graph.add_sub_node(sub_bus);
            graph.connect(source, sub_node);
            graph.connect(sub_node, target);
        },
        None => graph.connect(source, target),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gate_sub_bus_to_part() {
        let mut graph = Graph::new();
        let bus = graph.add_node();
        let pin = graph.add_node();
        connect_gate_to_part(&mut graph, bus, Some(SubBus::new(4, 7)), pin, None);
        graph.set(bus, 0x0a50);
        assert_eq!(graph.get(pin), 0x5);
    }

    #[test]
    fn part_to_gate_sub_bus() {
        let mut graph = Graph::new();
        let out = graph.add_node();
        let low = graph.add_node();
        let high = graph.add_node();
        connect_gate_to_part(&mut graph, low, None, out, Some(SubBus::new(0, 7)));
        connect_gate_to_part(&mut graph, high, None, out, Some(SubBus::new(8, 15)));
        graph.set(low, 0x34);
        graph.set(high, 0x12);
        assert_eq!(graph.get(out), 0x1234);
    }

    #[test]
    fn slice_to_slice() {
        let mut graph = Graph::new();
        let source = graph.add_node();
        let target = graph.add_node();
        connect_gate_to_part(&mut graph, source, Some(SubBus::new(0, 3)), target, Some(SubBus::new(12, 15)));
        graph.set(source, 0xffa);
        assert_eq!(graph.get(target), 0xa000);
    }
}
