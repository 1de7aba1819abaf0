use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Int,

    Chip,
    In,
    Out,
    Parts,
    BuiltIn,
    Clocked,
    True,
    False,

    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Equal,
    Comma,
    Semicolon,
    Colon,
    Dot,

    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Int => "integer",
            TokenKind::Chip => "'CHIP'",
            TokenKind::In => "'IN'",
            TokenKind::Out => "'OUT'",
            TokenKind::Parts => "'PARTS'",
            TokenKind::BuiltIn => "'BUILTIN'",
            TokenKind::Clocked => "'CLOCKED'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Equal => "'='",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Eof => "end of file",
        };
        write!(f, "{s}")
    }
}

fn keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "CHIP" => Some(TokenKind::Chip),
        "IN" => Some(TokenKind::In),
        "OUT" => Some(TokenKind::Out),
        "PARTS" => Some(TokenKind::Parts),
        "BUILTIN" => Some(TokenKind::BuiltIn),
        "CLOCKED" => Some(TokenKind::Clocked),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub loc: Loc,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl HasLoc for Token {
    fn loc(&self) -> Loc {
        self.loc.clone()
    }
}

/// Turns HDL text into [`Token`]s, one per call to [`Lexer::advance`].
pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    source_info: SourceInfo,
    token: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source_info: SourceInfo, text: &'a str) -> Lexer<'a> {
        Lexer {
            text,
            pos: 0,
            source_info,
            token: None,
        }
    }

    pub fn has_more_tokens(&self) -> bool {
        match &self.token {
            Some(token) => !token.is(TokenKind::Eof),
            None => true,
        }
    }

    pub fn advance(&mut self) -> Result<&Token, HdlError> {
        self.skip_whitespace_and_comments()?;

        let start = self.pos;
        let kind = match self.cur() {
            None => TokenKind::Eof,
            Some(ch) if ch.is_ascii_alphabetic() => {
                while self.cur().map_or(false, |ch| ch.is_ascii_alphanumeric()) {
                    self.pos += 1;
                }
                keyword(&self.text[start..self.pos]).unwrap_or(TokenKind::Identifier)
            },
            Some(ch) if ch.is_ascii_digit() => {
                while self.cur().map_or(false, |ch| ch.is_ascii_digit()) {
                    self.pos += 1;
                }
                TokenKind::Int
            },
            Some(ch) => {
                let kind = match ch {
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '=' => TokenKind::Equal,
                    ',' => TokenKind::Comma,
                    ';' => TokenKind::Semicolon,
                    ':' => TokenKind::Colon,
                    '.' => TokenKind::Dot,
                    _ => {
                        let ch = self.text[self.pos..].chars().next().unwrap_or(ch);
                        let loc = Loc::from(&self.source_info, start, start + ch.len_utf8());
                        return Err(HdlError::Lexical(loc, format!("Unexpected character {ch:?}")));
                    },
                };
                self.pos += 1;
                kind
            },
        };

        let token = Token {
            kind,
            literal: self.text[start..self.pos].to_string(),
            loc: Loc::from(&self.source_info, start, self.pos),
        };
        let token: &Token = self.token.insert(token);
        Ok(token)
    }

    fn cur(&self) -> Option<char> {
        self.text.as_bytes().get(self.pos).map(|b| *b as char)
    }

    fn peek_char(&self) -> Option<char> {
        self.text.as_bytes().get(self.pos + 1).map(|b| *b as char)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), HdlError> {
        loop {
            match (self.cur(), self.peek_char()) {
                (Some(' ' | '\t' | '\n' | '\r'), _) => self.pos += 1,
                (Some('/'), Some('/')) => {
                    while self.cur().map_or(false, |ch| ch != '\n') {
                        self.pos += 1;
                    }
                },
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match (self.cur(), self.peek_char()) {
                            (Some('*'), Some('/')) => {
                                self.pos += 2;
                                break;
                            },
                            (Some(_), _) => self.pos += 1,
                            (None, _) => {
                                let loc = Loc::from(&self.source_info, start, self.pos);
                                return Err(HdlError::Lexical(loc, "Unterminated comment".to_string()));
                            },
                        }
                    }
                },
                _ => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(text: &str) -> Result<Vec<TokenKind>, HdlError> {
        let mut lexer = Lexer::new(SourceInfo::from_chip("Test", text), text);
        let mut kinds = vec![];
        while lexer.has_more_tokens() {
            kinds.push(lexer.advance()?.kind);
        }
        Ok(kinds)
    }

    #[test]
    fn tokens() {
        use TokenKind::*;
        let text = "CHIP Not16 { IN in[16]; OUT out; BUILTIN Not16; CLOCKED in; }";
        assert_eq!(
            kinds(text).unwrap(),
            vec![
                Chip, Identifier, LBrace,
                In, Identifier, LBracket, Int, RBracket, Semicolon,
                Out, Identifier, Semicolon,
                BuiltIn, Identifier, Semicolon,
                Clocked, Identifier, Semicolon,
                RBrace, Eof,
            ],
        );
    }

    #[test]
    fn comments() {
        use TokenKind::*;
        let text = "
            // File name: projects/01/And.hdl
            /**
             * And gate: out = 1 if (a == 1 and b == 1), 0 otherwise
             */
            a[0..7]=true, // trailing
            b=false /* inline */ ;
        ";
        assert_eq!(
            kinds(text).unwrap(),
            vec![
                Identifier, LBracket, Int, Dot, Dot, Int, RBracket, Equal, True, Comma,
                Identifier, Equal, False, Semicolon,
                Eof,
            ],
        );
    }

    #[test]
    fn literals() {
        let text = "Mux4Way16 sel2 012";
        let mut lexer = Lexer::new(SourceInfo::from_chip("Test", text), text);
        assert_eq!(lexer.advance().unwrap().literal, "Mux4Way16");
        assert_eq!(lexer.advance().unwrap().literal, "sel2");
        let token = lexer.advance().unwrap().clone();
        assert_eq!(token.kind, TokenKind::Int);
        assert_eq!(token.literal, "012");
        assert_eq!(token.loc.start().to_string(), "1:16");
        assert!(lexer.has_more_tokens());
        lexer.advance().unwrap();
        assert!(!lexer.has_more_tokens());
    }

    #[test]
    fn errors() {
        assert!(matches!(kinds("CHIP A { IN a-b; }"), Err(HdlError::Lexical(_, _))));
        assert!(matches!(kinds("CHIP A { IN a_b; }"), Err(HdlError::Lexical(_, _))));
        assert!(matches!(kinds("CHIP A { /* never closed"), Err(HdlError::Lexical(_, _))));
        assert!(matches!(kinds("CHIP Ä"), Err(HdlError::Lexical(_, _))));
    }
}
