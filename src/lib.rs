//! An HDL compiler and two-phase gate-level simulator.
//!
//! Chips are described in HDL, compiled into [`GateClass`]es through a [`Workspace`],
//! instantiated into a [`Circuit`] of signal nodes, and driven through time
//! by a [`HardwareSimulator`].

mod builtins;
mod depends;
mod error;
mod gate;
mod gateclass;
mod lexer;
mod loc;
mod node;
mod parse;
mod simulator;
mod wiring;
mod workspace;


pub use builtins::{builtin, builtin_names, BuiltInDef, BuiltInGate, Pins, Primitive, ROM_SIZE, SCREEN_SIZE};
pub use depends::{CycleDetected, Depends};
pub use error::HdlError;
pub use gate::{Behavior, Circuit, Gate};
pub use gateclass::{Connection, ConnectionKind, GateBody, GateClass, PinInfo, PinType, Width};
pub use lexer::{Lexer, Token, TokenKind};
pub use loc::{HasLoc, LineCol, Loc, Source, SourceInfo};
pub use node::{mask, to_binary_string, width_mask, Graph, NodeId, SubBus, Word, WORD_WIDTH};
pub use parse::parse_chip;
pub use simulator::{format_value, Format, HardwareSimulator, PinValue};
pub use workspace::Workspace;
