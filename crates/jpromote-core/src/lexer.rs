/// Token kinds for the Java subset. Keywords are `Ident` tokens; the
/// parser matches on their text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Str,
    Char,
    Punct,
    Eof,
}

/// A token plus the trivia (whitespace and comments) that precedes it.
/// Printing a token as `prefix + text` reproduces the source exactly,
/// which is what makes untouched files round-trip byte-identically.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub prefix: String,
    pub line: u32,
}

impl Token {
    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == text
    }

    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punct && self.text.len() == ch.len_utf8() && self.text.starts_with(ch)
    }

    /// The token as it appeared in the source, trivia included.
    pub fn raw(&self) -> String {
        format!("{}{}", self.prefix, self.text)
    }
}

pub struct Lexer<'a> {
    source: &'a [u8],
    position: usize,
    line: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            position: 0,
            line: 1,
        }
    }

    /// Tokenize the whole input. Lexing never fails: malformed trailing
    /// constructs (an unterminated string or comment) are consumed to the
    /// end of input and surface later as parse errors, if at all.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let prefix = self.read_trivia();
            let line = self.line;
            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    prefix,
                    line,
                });
                return tokens;
            }
            let (kind, text) = self.read_token();
            tokens.push(Token {
                kind,
                text,
                prefix,
                line,
            });
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    fn peek(&self) -> u8 {
        self.source.get(self.position).copied().unwrap_or(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.position + offset).copied().unwrap_or(0)
    }

    fn bump(&mut self) -> u8 {
        let b = self.peek();
        self.position += 1;
        if b == b'\n' {
            self.line += 1;
        }
        b
    }

    /// Whitespace and comments before the next token.
    fn read_trivia(&mut self) -> String {
        let start = self.position;
        loop {
            let b = self.peek();
            if b.is_ascii_whitespace() && b != 0 {
                self.bump();
            } else if b == b'/' && self.peek_at(1) == b'/' {
                while !self.is_at_end() && self.peek() != b'\n' {
                    self.bump();
                }
            } else if b == b'/' && self.peek_at(1) == b'*' {
                self.bump();
                self.bump();
                while !self.is_at_end() && !(self.peek() == b'*' && self.peek_at(1) == b'/') {
                    self.bump();
                }
                if !self.is_at_end() {
                    self.bump();
                    self.bump();
                }
            } else {
                break;
            }
        }
        String::from_utf8_lossy(&self.source[start..self.position]).into_owned()
    }

    fn read_token(&mut self) -> (TokenKind, String) {
        let start = self.position;
        let b = self.peek();
        if is_ident_start(b) {
            while is_ident_continue(self.peek()) {
                self.bump();
            }
            (TokenKind::Ident, self.text_from(start))
        } else if b.is_ascii_digit() {
            self.read_number();
            (TokenKind::Number, self.text_from(start))
        } else if b == b'"' {
            self.read_quoted(b'"');
            (TokenKind::Str, self.text_from(start))
        } else if b == b'\'' {
            self.read_quoted(b'\'');
            (TokenKind::Char, self.text_from(start))
        } else {
            // Multi-byte UTF-8 sequences become one Punct token each.
            self.bump();
            while !self.is_at_end() && (self.peek() & 0xC0) == 0x80 {
                self.bump();
            }
            (TokenKind::Punct, self.text_from(start))
        }
    }

    fn read_number(&mut self) {
        while !self.is_at_end() {
            let b = self.peek();
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.bump();
            } else if b == b'.' && self.peek_at(1).is_ascii_digit() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn read_quoted(&mut self, quote: u8) {
        self.bump();
        while !self.is_at_end() {
            let b = self.bump();
            if b == b'\\' && !self.is_at_end() {
                self.bump();
            } else if b == quote {
                break;
            }
        }
    }

    fn text_from(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.source[start..self.position]).into_owned()
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}
