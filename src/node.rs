use super::*;

pub type NodeId = usize;

/// Every signal is carried in a 16-bit cell, whatever the width of its pin.
pub type Word = u16;

pub const WORD_WIDTH: usize = 16;

/// The bit range `[low, high]` of a pin, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubBus {
    pub low: usize,
    pub high: usize,
}

impl SubBus {
    pub fn new(low: usize, high: usize) -> SubBus {
        SubBus { low, high }
    }

    pub fn width(&self) -> usize {
        self.high - self.low + 1
    }

    pub fn mask(&self) -> Word {
        mask(self.low, self.high)
    }
}

impl std::fmt::Display for SubBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.low == self.high {
            write!(f, "[{}]", self.low)
        } else {
            write!(f, "[{}..{}]", self.low, self.high)
        }
    }
}

/// ORs together the powers of two from bit `low` through bit `high`.
pub fn mask(low: usize, high: usize) -> Word {
    let mut mask: Word = 0;
    for bit in low..=high.min(WORD_WIDTH - 1) {
        mask |= 1 << bit;
    }
    mask
}

/// The mask covering a whole pin of the given width.
pub fn width_mask(width: usize) -> Word {
    if width == 0 {
        0
    } else {
        mask(0, width - 1)
    }
}

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Plain,
    /// Stores the full value of its source but only shows `[low, high]`, shifted down.
    Sub { mask: Word, shift: u32 },
    /// Writes land in the `[low, high]` slice of `target`. Reads see all of `target`.
    Adapter { target: NodeId, mask: Word, shift: u32 },
}

#[derive(Debug, Clone)]
struct Node {
    value: Word,
    connections: Vec<NodeId>,
    kind: NodeKind,
}

/// The arena holding every node of one live circuit.
/// Listener edges are stored as [`NodeId`]s into the same arena.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph { nodes: vec![] }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let node_id = self.nodes.len();
        self.nodes.push(Node {
            value: 0,
            connections: vec![],
            kind,
        });
        node_id
    }

    pub fn add_node(&mut self) -> NodeId {
        self.push(NodeKind::Plain)
    }

    pub fn add_sub_node(&mut self, sub_bus: SubBus) -> NodeId {
        self.push(NodeKind::Sub {
            mask: sub_bus.mask(),
            shift: sub_bus.low as u32,
        })
    }

    pub fn add_adapter(&mut self, target: NodeId, sub_bus: SubBus) -> NodeId {
        self.push(NodeKind::Adapter {
            target,
            mask: sub_bus.mask(),
            shift: sub_bus.low as u32,
        })
    }

    pub fn get(&self, node_id: NodeId) -> Word {
        let node = &self.nodes[node_id];
        match node.kind {
            NodeKind::Plain => node.value,
            NodeKind::Sub { mask, shift } => (node.value & mask) >> shift,
            NodeKind::Adapter { target, .. } => self.get(target),
        }
    }

    /// Writes `value` and pushes the visible result into every listener.
    /// Writing the value a node already holds does nothing.
    pub fn set(&mut self, node_id: NodeId, value: Word) {
        match self.nodes[node_id].kind {
            NodeKind::Adapter { target, mask, shift } => {
                let kept = self.get(target) & !mask;
                let written = (value << shift) & mask;
                self.set(target, kept | written);
            },
            NodeKind::Plain | NodeKind::Sub { .. } => {
                let node = &mut self.nodes[node_id];
                if node.value == value {
                    return;
                }
                node.value = value;

                let visible = self.get(node_id);
                for i in 0..self.nodes[node_id].connections.len() {
                    let listener = self.nodes[node_id].connections[i];
                    self.set(listener, visible);
                }
            },
        }
    }

    /// Registers `target` as a listener of `source`.
    pub fn connect(&mut self, source: NodeId, target: NodeId) {
        let connections = &mut self.nodes[source].connections;
        if !connections.contains(&target) {
            connections.push(target);
        }
    }

    pub fn connections(&self, node_id: NodeId) -> &[NodeId] {
        &self.nodes[node_id].connections
    }
}

pub fn to_binary_string(value: Word, width: usize) -> String {
    format!("{:0width$b}", value & width_mask(width), width = width)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn node_set() {
        let mut graph = Graph::new();
        let node = graph.add_node();
        assert_eq!(to_binary_string(graph.get(node), 16), "0000000000000000");

        graph.set(node, 5);
        assert_eq!(to_binary_string(graph.get(node), 16), "0000000000000101");

        graph.set(node, -1i16 as Word);
        assert_eq!(to_binary_string(graph.get(node), 16), "1111111111111111");
    }

    #[test]
    fn masks() {
        assert_eq!(mask(0, 0), 0b1);
        assert_eq!(mask(7, 11), 0b0000_1111_1000_0000);
        assert_eq!(mask(0, 15), 0xffff);
        assert_eq!(mask(15, 15), 0x8000);
        assert_eq!(width_mask(3), 0b111);
        assert_eq!(SubBus::new(2, 5).width(), 4);
    }

    #[test]
    fn idempotent_set() {
        let mut graph = Graph::new();
        let source = graph.add_node();
        let listener = graph.add_node();
        graph.connect(source, listener);

        graph.set(source, 5);
        assert_eq!(graph.get(listener), 5);

        // Scribble over the listener behind the source's back.
        // Writing the same value again must not propagate.
        graph.set(listener, 9);
        graph.set(source, 5);
        assert_eq!(graph.get(listener), 9);

        graph.set(source, 6);
        assert_eq!(graph.get(listener), 6);
    }

    #[test]
    fn fan_out() {
        let mut graph = Graph::new();
        let source = graph.add_node();
        let a = graph.add_node();
        let b = graph.add_node();
        let c = graph.add_node();
        graph.connect(source, a);
        graph.connect(source, b);
        graph.connect(b, c);
        graph.connect(source, a);
        assert_eq!(graph.connections(source), &[a, b]);

        graph.set(source, 42);
        assert_eq!(graph.get(a), 42);
        assert_eq!(graph.get(b), 42);
        assert_eq!(graph.get(c), 42);
    }

    #[test]
    fn sub_node() {
        let mut graph = Graph::new();
        let node = graph.add_sub_node(SubBus::new(7, 11));
        let sub_bus = graph.add_adapter(node, SubBus::new(7, 11));

        graph.set(sub_bus, 5);
        assert_eq!(to_binary_string(graph.get(node), 16), "0000000000000101");

        graph.set(sub_bus, 0);
        assert_eq!(to_binary_string(graph.get(node), 16), "0000000000000000");
    }

    #[test]
    fn sub_node_listener() {
        let mut graph = Graph::new();
        let bus = graph.add_node();
        let high_byte = graph.add_sub_node(SubBus::new(8, 15));
        let out = graph.add_node();
        graph.connect(bus, high_byte);
        graph.connect(high_byte, out);

        graph.set(bus, 0xab12);
        assert_eq!(graph.get(high_byte), 0xab);
        assert_eq!(graph.get(out), 0xab);
    }

    #[test]
    fn adapter_one() {
        let mut graph = Graph::new();
        let node = graph.add_node();
        let sub_bus = graph.add_adapter(node, SubBus::new(0, 0));

        graph.set(sub_bus, 1);
        assert_eq!(to_binary_string(graph.get(node), 16), "0000000000000001");
    }

    #[test]
    fn adapter_multiple() {
        let mut graph = Graph::new();
        let node = graph.add_node();
        let sub_bus = graph.add_adapter(node, SubBus::new(7, 11));

        graph.set(sub_bus, 5);
        assert_eq!(to_binary_string(graph.get(node), 16), "0000001010000000");

        graph.set(sub_bus, 0);
        assert_eq!(to_binary_string(graph.get(node), 16), "0000000000000000");
    }

    #[test]
    fn adapters_cover_16_bits() {
        let mut graph = Graph::new();
        let node = graph.add_node();

        let sub1 = graph.add_adapter(node, SubBus::new(0, 0));
        let sub2 = graph.add_adapter(node, SubBus::new(1, 5));
        let sub3 = graph.add_adapter(node, SubBus::new(6, 12));
        let sub4 = graph.add_adapter(node, SubBus::new(13, 15));

        graph.set(sub1, 1);
        assert_eq!(to_binary_string(graph.get(node), 16), "0000000000000001");

        graph.set(sub2, 31);
        assert_eq!(to_binary_string(graph.get(node), 16), "0000000000111111");

        graph.set(sub3, 127);
        assert_eq!(to_binary_string(graph.get(node), 16), "0001111111111111");

        graph.set(sub4, 7);
        assert_eq!(to_binary_string(graph.get(node), 16), "1111111111111111");

        // Oversized writes are clipped to the slice.
        graph.set(sub2, 0xffc0);
        assert_eq!(to_binary_string(graph.get(node), 16), "1111111111000001");
    }
}
