use super::*;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::*;

/// Compiles the HDL text of one chip into a [`GateClass`].
/// Parts are looked up (and compiled on demand) through `workspace`.
pub fn parse_chip(source_info: SourceInfo, text: &str, workspace: &mut Workspace) -> Result<GateClass, HdlError> {
    let mut parser = Parser::new(source_info, text, workspace)?;
    parser.parse_chip()
}

/// A recursive descent parser with one token of lookahead.
pub(crate) struct Parser<'a, 'w> {
    lexer: Lexer<'a>,
    token: Token,
    workspace: &'w mut Workspace,
}

/// What the parser has learned about one internal pin so far.
#[derive(Debug)]
struct InternalPin {
    name: String,
    loc: Loc,
    driver: Option<(Width, Loc)>,
    readers: Vec<Reader>,
}

#[derive(Debug)]
struct Reader {
    width: Width,
    sub_bus: Option<SubBus>,
    loc: Loc,
}

/// A composite chip under construction.
struct Composite {
    class: GateClass,
    parts: Vec<Arc<GateClass>>,
    connections: Vec<Connection>,
    internal_pins: Vec<InternalPin>,
    /// Bits already driven, per output pin.
    driven_outputs: Vec<Word>,
    /// Bits already fed, per part input pin.
    driven_part_inputs: BTreeMap<(usize, String), Word>,
}

impl<'a, 'w> Parser<'a, 'w> {
    pub(crate) fn new(source_info: SourceInfo, text: &'a str, workspace: &'w mut Workspace) -> Result<Parser<'a, 'w>, HdlError> {
        let mut lexer = Lexer::new(source_info, text);
        let token = lexer.advance()?.clone();
        Ok(Parser { lexer, token, workspace })
    }

    fn bump(&mut self) -> Result<Token, HdlError> {
        let next = self.lexer.advance()?.clone();
        Ok(std::mem::replace(&mut self.token, next))
    }

    fn is(&self, kind: TokenKind) -> bool {
        self.token.is(kind)
    }

    fn eat(&mut self, kind: TokenKind) -> Result<Option<Token>, HdlError> {
        if self.is(kind) {
            Ok(Some(self.bump()?))
        } else {
            Ok(None)
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token, HdlError> {
        if self.is(kind) {
            self.bump()
        } else {
            self.unexpected(&format!("Expected {kind} {context}"))
        }
    }

    fn unexpected<T>(&self, message: &str) -> Result<T, HdlError> {
        let found = if self.is(TokenKind::Eof) {
            "end of file".to_string()
        } else {
            format!("'{}'", self.token.literal)
        };
        Err(HdlError::parse(&self.token.loc, format!("{message}, found {found}")))
    }

    pub(crate) fn parse_chip(&mut self) -> Result<GateClass, HdlError> {
        self.expect(TokenKind::Chip, "at the start of a chip definition")?;
        let name = self.expect(TokenKind::Identifier, "for the chip name")?;
        self.expect(TokenKind::LBrace, "after the chip name")?;

        let mut inputs: Option<Vec<(PinInfo, Loc)>> = None;
        let mut outputs: Option<Vec<(PinInfo, Loc)>> = None;
        loop {
            let slot = if self.is(TokenKind::In) {
                &mut inputs
            } else if self.is(TokenKind::Out) {
                &mut outputs
            } else {
                break;
            };
            let keyword = self.bump()?;
            if slot.is_some() {
                return Err(HdlError::parse(&keyword.loc, format!("{} is declared twice", keyword.literal)));
            }
            *slot = Some(self.parse_pin_decls()?);
        }
        let inputs = inputs.unwrap_or_default();
        let outputs = outputs.unwrap_or_default();

        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for (pin_info, loc) in inputs.iter().chain(outputs.iter()) {
            if !seen.insert(pin_info.name.as_str()) {
                return Err(HdlError::parse(loc, format!("Pin {} is declared twice", pin_info.name)));
            }
        }

        let inputs: Vec<PinInfo> = inputs.into_iter().map(|(pin_info, _loc)| pin_info).collect();
        let outputs: Vec<PinInfo> = outputs.into_iter().map(|(pin_info, _loc)| pin_info).collect();

        let class = if self.eat(TokenKind::BuiltIn)?.is_some() {
            self.parse_builtin(&name, inputs, outputs)?
        } else if self.eat(TokenKind::Parts)?.is_some() {
            self.expect(TokenKind::Colon, "after 'PARTS'")?;
            self.parse_parts(&name, inputs, outputs)?
        } else {
            return self.unexpected("Expected 'PARTS:' or 'BUILTIN'");
        };

        self.expect(TokenKind::RBrace, "at the end of the chip definition")?;
        self.expect(TokenKind::Eof, "after the chip definition")?;
        Ok(class)
    }

    /// `name ([width])? (, name ([width])?)* ;`
    fn parse_pin_decls(&mut self) -> Result<Vec<(PinInfo, Loc)>, HdlError> {
        let mut pins = vec![];
        loop {
            let name = self.expect(TokenKind::Identifier, "for a pin name")?;
            let mut width = 1;
            if self.eat(TokenKind::LBracket)?.is_some() {
                let int = self.expect(TokenKind::Int, "for the pin width")?;
                width = parse_int(&int)?;
                if width < 1 || width > WORD_WIDTH {
                    return Err(HdlError::parse(
                        &int.loc,
                        format!("Width of pin {} must be between 1 and {WORD_WIDTH}", name.literal),
                    ));
                }
                self.expect(TokenKind::RBracket, "after the pin width")?;
            }
            pins.push((PinInfo::new(name.literal, width), name.loc));

            if self.eat(TokenKind::Comma)?.is_none() {
                self.expect(TokenKind::Semicolon, "after the pin list")?;
                return Ok(pins);
            }
        }
    }

    fn parse_builtin(&mut self, name: &Token, inputs: Vec<PinInfo>, outputs: Vec<PinInfo>) -> Result<GateClass, HdlError> {
        let impl_name = self.expect(TokenKind::Identifier, "for the built-in implementation")?;
        let Some(def) = builtin(&impl_name.literal) else {
            return Err(HdlError::parse(
                &impl_name.loc,
                format!("There is no built-in implementation named {}", impl_name.literal),
            ));
        };
        self.expect(TokenKind::Semicolon, "after the built-in implementation")?;

        let (arity_in, arity_out) = def.primitive.arity();
        if inputs.len() < arity_in || outputs.len() < arity_out {
            return Err(HdlError::parse(
                &impl_name.loc,
                format!(
                    "Built-in {} needs {arity_in} input and {arity_out} output pins, {} declares {} and {}",
                    impl_name.literal,
                    name.literal,
                    inputs.len(),
                    outputs.len(),
                ),
            ));
        }

        let mut class = GateClass::new(name.literal.clone(), inputs, outputs, GateBody::BuiltIn(def.primitive));
        if def.primitive.is_output_latched() {
            class.is_output_clocked.fill(true);
        }

        if self.eat(TokenKind::Clocked)?.is_some() {
            class.is_clocked = true;
            for (pin_info, loc) in self.parse_pin_decls()? {
                match class.pin(&pin_info.name) {
                    Some((PinType::Input, index)) => class.is_input_clocked[index] = true,
                    Some((PinType::Output, index)) => class.is_output_clocked[index] = true,
                    _ => {
                        return Err(HdlError::parse(
                            &loc,
                            format!("Clocked pin {} is not a pin of {}", pin_info.name, name.literal),
                        ))
                    },
                }
            }
        }
        Ok(class)
    }

    fn parse_parts(&mut self, name: &Token, inputs: Vec<PinInfo>, outputs: Vec<PinInfo>) -> Result<GateClass, HdlError> {
        let mut composite = Composite {
            driven_outputs: vec![0; outputs.len()],
            // Parts and connections are moved in by `finish`.
            class: GateClass::new(
                name.literal.clone(),
                inputs,
                outputs,
                GateBody::Composite { parts: vec![], connections: vec![] },
            ),
            parts: vec![],
            connections: vec![],
            internal_pins: vec![],
            driven_part_inputs: BTreeMap::new(),
        };

        while self.is(TokenKind::Identifier) {
            self.parse_part(&mut composite)?;
        }
        if !self.is(TokenKind::RBrace) {
            return self.unexpected("Expected a part name");
        }
        composite.finish()
    }

    /// `PartName ( wiring (, wiring)* ) ;`
    fn parse_part(&mut self, composite: &mut Composite) -> Result<(), HdlError> {
        let part_name = self.bump()?;
        let part = self.workspace.part_class(&part_name.literal, composite.class.name(), &part_name.loc)?;
        let part_index = composite.parts.len();
        debug!("{}: part {} is {}", composite.class.name(), part_index + 1, part.name());
        composite.parts.push(part);

        self.expect(TokenKind::LParen, "after the part name")?;
        loop {
            self.parse_wiring(composite, part_index)?;
            if self.eat(TokenKind::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, "at the end of the part's connections")?;
        self.expect(TokenKind::Semicolon, "after the part")?;
        Ok(())
    }

    /// `partPin([sub])? = (gatePin([sub])? | true | false)`
    fn parse_wiring(&mut self, composite: &mut Composite, part_index: usize) -> Result<(), HdlError> {
        let left = self.expect(TokenKind::Identifier, "for a part pin name")?;
        let left_sub_bus = self.parse_sub_bus()?;
        self.expect(TokenKind::Equal, "after the part pin")?;

        if !(self.is(TokenKind::Identifier) || self.is(TokenKind::True) || self.is(TokenKind::False)) {
            return self.unexpected("Expected a pin name, 'true' or 'false'");
        }
        let right = self.bump()?;
        let right_sub_bus = self.parse_sub_bus()?;
        if !right.is(TokenKind::Identifier) {
            if let Some((_sub_bus, loc)) = right_sub_bus {
                return Err(HdlError::parse(&loc, format!("{} can not be sub-bused", right.literal)));
            }
        }

        composite.connect(part_index, &left, left_sub_bus, &right, right_sub_bus)
    }

    /// `[i]` or `[low..high]`
    fn parse_sub_bus(&mut self) -> Result<Option<(SubBus, Loc)>, HdlError> {
        let Some(open) = self.eat(TokenKind::LBracket)? else {
            return Ok(None);
        };
        let low = parse_int(&self.expect(TokenKind::Int, "in the sub bus")?)?;
        let mut high = low;
        if self.eat(TokenKind::Dot)?.is_some() {
            self.expect(TokenKind::Dot, "in the sub bus range")?;
            high = parse_int(&self.expect(TokenKind::Int, "at the end of the sub bus range")?)?;
        }
        let close = self.expect(TokenKind::RBracket, "at the end of the sub bus")?;
        let loc = open.loc.to(&close.loc);
        if low > high {
            return Err(HdlError::parse(&loc, format!("Bad sub bus: {low} is greater than {high}")));
        }
        Ok(Some((SubBus::new(low, high), loc)))
    }
}

fn parse_int(token: &Token) -> Result<usize, HdlError> {
    token
        .literal
        .parse()
        .map_err(|_| HdlError::parse(&token.loc, format!("{} is not a valid number", token.literal)))
}

/// The width a connection carries: the sub bus if there is one, the whole pin otherwise.
fn check_sub_bus(
    sub_bus: Option<(SubBus, Loc)>,
    pin_name: &str,
    pin_width: Width,
) -> Result<(Option<SubBus>, Width), HdlError> {
    match sub_bus {
        None => Ok((None, pin_width)),
        Some((sub_bus, loc)) => {
            if sub_bus.high >= pin_width {
                return Err(HdlError::parse(
                    &loc,
                    format!("Sub bus {sub_bus} is out of range for {pin_name}, which is {pin_width} bits wide"),
                ));
            }
            Ok((Some(sub_bus), sub_bus.width()))
        },
    }
}

fn check_widths(loc: &Loc, left: &str, left_width: Width, right: &str, right_width: Width) -> Result<(), HdlError> {
    if left_width != right_width {
        return Err(HdlError::parse(
            loc,
            format!("Width of {left} ({left_width}) does not match width of {right} ({right_width})"),
        ));
    }
    Ok(())
}

/// Records `bits` as driven in `driven`, failing if any of them already were.
fn claim_bits(driven: &mut Word, bits: Word, loc: &Loc, what: &str) -> Result<(), HdlError> {
    if *driven & bits != 0 {
        return Err(HdlError::parse(loc, format!("{what} is connected more than once")));
    }
    *driven |= bits;
    Ok(())
}

impl Composite {
    fn connect(
        &mut self,
        part_index: usize,
        left: &Token,
        left_sub_bus: Option<(SubBus, Loc)>,
        right: &Token,
        right_sub_bus: Option<(SubBus, Loc)>,
    ) -> Result<(), HdlError> {
        let part = self.parts[part_index].clone();
        let Some((part_pin_type, part_pin_index, part_pin_info)) = part.interface_pin(&left.literal) else {
            return Err(HdlError::parse(
                &left.loc,
                format!("{} is not a pin of {}", left.literal, part.name()),
            ));
        };
        let (part_sub_bus, part_width) = check_sub_bus(left_sub_bus, &left.literal, part_pin_info.width)?;
        let part_pin_name = left.literal.clone();
        let full_part_pin = format!("{}.{}", part.name(), left.literal);

        if part_pin_type == PinType::Input {
            let driven = self.driven_part_inputs.entry((part_index, part_pin_name.clone())).or_insert(0);
            let bits = part_sub_bus.map_or(width_mask(part_width), |sub_bus| sub_bus.mask());
            claim_bits(driven, bits, &left.loc, &format!("Part pin {full_part_pin}"))?;
        }

        let mut connection = Connection {
            kind: ConnectionKind::FromTrue,
            gate_pin_index: 0,
            part_index,
            part_pin_name,
            part_pin_index,
            gate_sub_bus: None,
            part_sub_bus,
        };

        if !right.is(TokenKind::Identifier) {
            if part_pin_type != PinType::Input {
                return Err(HdlError::parse(
                    &right.loc,
                    format!("The output pin {full_part_pin} can not be connected to {}", right.literal),
                ));
            }
            connection.kind = if right.is(TokenKind::True) {
                ConnectionKind::FromTrue
            } else {
                ConnectionKind::FromFalse
            };
            self.connections.push(connection);
            return Ok(());
        }

        let gate_pin = match self.class.pin(&right.literal) {
            Some(gate_pin) => gate_pin,
            None => {
                let index = self.class.register_pin(PinInfo::new(right.literal.clone(), 0), PinType::Internal);
                self.internal_pins.push(InternalPin {
                    name: right.literal.clone(),
                    loc: right.loc.clone(),
                    driver: None,
                    readers: vec![],
                });
                (PinType::Internal, index)
            },
        };

        match (gate_pin, part_pin_type) {
            ((PinType::Input, index), PinType::Input) => {
                let gate_width = self.class.input_pins_info[index].width;
                let (gate_sub_bus, gate_width) = check_sub_bus(right_sub_bus, &right.literal, gate_width)?;
                check_widths(&left.loc, &full_part_pin, part_width, &right.literal, gate_width)?;
                connection.kind = ConnectionKind::FromInput;
                connection.gate_pin_index = index;
                connection.gate_sub_bus = gate_sub_bus;
            },
            ((PinType::Input, _index), _) => {
                return Err(HdlError::parse(
                    &right.loc,
                    format!("The output pin {full_part_pin} can not drive the input pin {}", right.literal),
                ));
            },
            ((PinType::Output, index), PinType::Output) => {
                let gate_width = self.class.output_pins_info[index].width;
                let (gate_sub_bus, gate_width) = check_sub_bus(right_sub_bus, &right.literal, gate_width)?;
                check_widths(&left.loc, &full_part_pin, part_width, &right.literal, gate_width)?;
                let bits = gate_sub_bus.map_or(width_mask(gate_width), |sub_bus| sub_bus.mask());
                claim_bits(
                    &mut self.driven_outputs[index],
                    bits,
                    &right.loc,
                    &format!("Output pin {}", right.literal),
                )?;
                connection.kind = ConnectionKind::ToOutput;
                connection.gate_pin_index = index;
                connection.gate_sub_bus = gate_sub_bus;
            },
            ((PinType::Output, _index), _) => {
                return Err(HdlError::parse(
                    &right.loc,
                    format!("The output pin {} can not feed the input pin {full_part_pin}", right.literal),
                ));
            },
            ((PinType::Internal, index), PinType::Output) => {
                let internal_pin = &mut self.internal_pins[index];
                if let Some((_sub_bus, loc)) = right_sub_bus {
                    return Err(HdlError::parse(
                        &loc,
                        format!("The internal pin {} can not be sub-bused where it is driven", right.literal),
                    ));
                }
                if internal_pin.driver.is_some() {
                    return Err(HdlError::parse(
                        &right.loc,
                        format!("The internal pin {} is driven more than once", right.literal),
                    ));
                }
                internal_pin.driver = Some((part_width, right.loc.clone()));
                connection.kind = ConnectionKind::ToInternal;
                connection.gate_pin_index = index;
            },
            ((PinType::Internal, index), _) => {
                let sub_bus = right_sub_bus.as_ref().map(|(sub_bus, _loc)| *sub_bus);
                let loc = right_sub_bus.map_or(right.loc.clone(), |(_sub_bus, loc)| loc);
                self.internal_pins[index].readers.push(Reader {
                    width: part_width,
                    sub_bus,
                    loc,
                });
                connection.kind = ConnectionKind::FromInternal;
                connection.gate_pin_index = index;
                connection.gate_sub_bus = sub_bus;
            },
        }

        self.connections.push(connection);
        Ok(())
    }

    /// Settles internal pin widths once every part has been seen, then builds the class.
    fn finish(self) -> Result<GateClass, HdlError> {
        let Composite {
            mut class,
            parts,
            connections,
            internal_pins,
            ..
        } = self;

        for (index, internal_pin) in internal_pins.iter().enumerate() {
            let Some((width, _loc)) = &internal_pin.driver else {
                return Err(HdlError::parse(
                    &internal_pin.loc,
                    format!(
                        "{} is not a pin of {} and is not driven by any part output",
                        internal_pin.name,
                        class.name(),
                    ),
                ));
            };
            if internal_pin.readers.is_empty() {
                return Err(HdlError::parse(
                    &internal_pin.loc,
                    format!("The internal pin {} is never read by any part", internal_pin.name),
                ));
            }
            for reader in &internal_pin.readers {
                let read_width = match reader.sub_bus {
                    None => *width,
                    Some(sub_bus) => {
                        if sub_bus.high >= *width {
                            return Err(HdlError::parse(
                                &reader.loc,
                                format!(
                                    "Sub bus {sub_bus} is out of range for {}, which is {width} bits wide",
                                    internal_pin.name,
                                ),
                            ));
                        }
                        sub_bus.width()
                    },
                };
                check_widths(&reader.loc, &internal_pin.name, read_width, "the part pin it feeds", reader.width)?;
            }
            class.internal_pins_info[index].width = *width;
        }

        class.body = GateBody::Composite { parts, connections };
        class.infer_clocking();
        for hazard in class.evaluation_order_hazards() {
            warn!("{hazard}");
        }
        Ok(class)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(text: &str) -> Result<GateClass, HdlError> {
        let mut workspace = Workspace::new();
        parse_chip(SourceInfo::from_chip("Test", text), text, &mut workspace)
    }

    fn parse_error(text: &str) -> String {
        match parse(text) {
            Ok(class) => panic!("{} should not have compiled", class.name()),
            Err(error) => error.to_string(),
        }
    }

    #[test]
    fn parse_builtin() {
        let class = parse("CHIP Reg { IN in[16], load; OUT out[16]; BUILTIN Register; CLOCKED in, load; }").unwrap();
        assert_eq!(class.name(), "Reg");
        assert_eq!(class.primitive(), Some(Primitive::Register));
        assert_eq!(class.input_pins_info(), &[PinInfo::new("in", 16), PinInfo::new("load", 1)]);
        assert!(class.is_clocked());
        assert!(class.is_input_clocked(0));
        assert!(class.is_input_clocked(1));
        assert!(!class.is_output_clocked(0));
    }

    #[test]
    fn out_before_in() {
        let class = parse("CHIP N { OUT out; IN a, b; BUILTIN Nand; }").unwrap();
        assert_eq!(class.pin("a"), Some((PinType::Input, 0)));
        assert_eq!(class.pin("out"), Some((PinType::Output, 0)));
    }

    #[test]
    fn parse_composite() {
        let class = parse(
            "CHIP And {
                IN a, b;
                OUT out;
                PARTS:
                Nand(a=a, b=b, out=nandOut);
                Nand(a=nandOut, b=nandOut, out=out);
            }",
        )
        .unwrap();
        assert_eq!(class.parts().len(), 2);
        assert_eq!(class.internal_pins_info(), &[PinInfo::new("nandOut", 1)]);
        let kinds: Vec<ConnectionKind> = class.connections().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ConnectionKind::FromInput,
                ConnectionKind::FromInput,
                ConnectionKind::ToInternal,
                ConnectionKind::FromInternal,
                ConnectionKind::FromInternal,
                ConnectionKind::ToOutput,
            ],
        );
        let part_pins: Vec<usize> = class.connections().iter().map(|c| c.part_pin_index).collect();
        assert_eq!(part_pins, vec![0, 1, 0, 0, 1, 0]);
        assert!(!class.is_clocked());
        assert!(!class.is_builtin());
        assert_eq!(class.primitive(), None);

        let empty = parse("CHIP Empty { IN a; OUT out; PARTS: }").unwrap();
        assert!(!empty.is_builtin());
        assert_eq!(empty.primitive(), None);
        assert!(empty.parts().is_empty());
    }

    #[test]
    fn internal_width_from_driver() {
        let class = parse(
            "CHIP W {
                IN a[16];
                OUT out[4];
                PARTS:
                Not16(in=a, out=n);
                Not16(in[0..3]=n[4..7], out[0..3]=out);
            }",
        )
        .unwrap();
        assert_eq!(class.internal_pins_info(), &[PinInfo::new("n", 16)]);
        let reader = &class.connections()[2];
        assert_eq!(reader.kind, ConnectionKind::FromInternal);
        assert_eq!(reader.gate_sub_bus, Some(SubBus::new(4, 7)));
        assert_eq!(reader.part_sub_bus, Some(SubBus::new(0, 3)));
    }

    #[test]
    fn composite_clocking() {
        let class = parse(
            "CHIP Latch {
                IN in, sel;
                OUT out;
                PARTS:
                Mux(a=prev, b=in, sel=sel, out=next);
                DFF(in=next, out=prev, out=out);
            }",
        )
        .unwrap();
        assert!(class.is_clocked());
        assert!(!class.is_input_clocked(0));
        assert!(class.evaluation_order_hazards().is_empty());
    }

    #[test]
    fn hazards() {
        let class = parse(
            "CHIP Late {
                IN a;
                OUT out;
                PARTS:
                Not(in=x, out=out);
                Not(in=a, out=x);
            }",
        )
        .unwrap();
        let hazards = class.evaluation_order_hazards();
        assert_eq!(hazards.len(), 1);
        assert!(hazards[0].contains("reads x before part 2"));

        let class = parse(
            "CHIP Loop {
                IN a;
                OUT out;
                PARTS:
                And(a=a, b=y, out=x, out=out);
                Not(in=x, out=y);
            }",
        )
        .unwrap();
        assert!(class.evaluation_order_hazards().iter().any(|hazard| hazard.contains("combinational loop")));
    }

    #[test]
    fn dangling_internal_pin() {
        let error = parse_error("CHIP X { IN a; OUT b; PARTS: Nand(a=a, b=a, out=b2); }");
        assert!(error.contains("b2"), "{error}");

        let error = parse_error("CHIP X { IN a; OUT b; PARTS: Nand(a=a, b=c, out=b); }");
        assert!(error.contains("c is not a pin of X"), "{error}");
    }

    #[test]
    fn width_mismatch() {
        let error = parse_error("CHIP X { IN a[4]; OUT b; PARTS: Not(in=a[0..2], out=b); }");
        assert!(error.contains("does not match"), "{error}");

        let error = parse_error("CHIP X { IN a[4]; OUT b; PARTS: Not(in=a, out=b); }");
        assert!(error.contains("does not match"), "{error}");

        let error = parse_error("CHIP X { IN a; OUT b; PARTS: Not16(in[0]=a, out=w); Not(in=w, out=b); }");
        assert!(error.contains("does not match"), "{error}");
    }

    #[test]
    fn bad_pins() {
        let error = parse_error("CHIP X { IN a; OUT b; PARTS: Nand(a=a, c=a, out=b); }");
        assert!(error.contains("c is not a pin of Nand"), "{error}");

        let error = parse_error("CHIP X { IN a; OUT b; PARTS: Not(in=a, out=a); }");
        assert!(error.contains("can not drive the input pin a"), "{error}");

        let error = parse_error("CHIP X { IN a; OUT b; PARTS: Not(in=b, out=b); }");
        assert!(error.contains("can not feed"), "{error}");

        let error = parse_error("CHIP X { IN a; OUT b; PARTS: Not(in=a, out=true); }");
        assert!(error.contains("can not be connected to true"), "{error}");

        let error = parse_error("CHIP X { IN a[2]; OUT b; PARTS: Not(in=a[2], out=b); }");
        assert!(error.contains("out of range"), "{error}");

        let error = parse_error("CHIP X { IN a; OUT b; PARTS: Not(in=true[0], out=b); }");
        assert!(error.contains("can not be sub-bused"), "{error}");
    }

    #[test]
    fn multiple_drivers() {
        let error = parse_error("CHIP X { IN a; OUT b; PARTS: Not(in=a, out=b); Not(in=a, out=b); }");
        assert!(error.contains("Output pin b is connected more than once"), "{error}");

        let error = parse_error("CHIP X { IN a; OUT b; PARTS: Not(in=a, in=a, out=b); }");
        assert!(error.contains("Part pin Not.in is connected more than once"), "{error}");

        let error = parse_error(
            "CHIP X { IN a; OUT b; PARTS: Not(in=a, out=w); Not(in=a, out=w); Not(in=w, out=b); }",
        );
        assert!(error.contains("driven more than once"), "{error}");

        // Disjoint slices of the same output are fine.
        parse("CHIP X { IN a; OUT b[2]; PARTS: Not(in=a, out=b[0]); Not(in=a, out=b[1]); }").unwrap();
    }

    #[test]
    fn syntax_errors() {
        assert!(parse_error("CHIP X { IN a; OUT b; }").contains("Expected 'PARTS:' or 'BUILTIN'"));
        assert!(parse_error("CHIP X { IN a; IN c; OUT b; BUILTIN Not; }").contains("IN is declared twice"));
        assert!(parse_error("CHIP X { IN a, a; OUT b; BUILTIN Nand; }").contains("Pin a is declared twice"));
        assert!(parse_error("CHIP X { IN a[17]; OUT b; BUILTIN Not; }").contains("between 1 and 16"));
        assert!(parse_error("CHIP X { IN a; OUT b; BUILTIN Frob; }").contains("no built-in implementation"));
        assert!(parse_error("CHIP X { IN a; OUT b; BUILTIN Nand; }").contains("needs 2 input"));
        assert!(parse_error("CHIP X { IN a; OUT b; BUILTIN Not; CLOCKED c; }").contains("Clocked pin c"));
        assert!(parse_error("CHIP X { IN a; OUT b; BUILTIN Not; } extra").contains("after the chip definition"));
        assert!(parse_error("CHIP X { IN a; OUT b; PARTS: Not(in=a[1..0], out=b); }").contains("Bad sub bus"));
        assert!(parse_error("CHIP X { IN a; OUT b; PARTS: Not(in=a out=b); }").contains("Expected ')'"));
        assert!(parse_error("CHIP X { IN a; OUT b; PARTS: Not(in=a, out=b) }").contains("Expected ';'"));
    }

    #[test]
    fn error_location() {
        let error = parse("CHIP X {\n  IN a;\n  OUT b;\n  PARTS:\n  Nand(a=a, b=a, out=b2);\n}").unwrap_err();
        assert!(matches!(error, HdlError::Parse(_, _)));
        assert_eq!(error.loc().to_string(), "Test.hdl:5:22");
    }
}
