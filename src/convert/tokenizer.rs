//! Formula tokenizer
//!
//! Splits spreadsheet formula text like `SUM(A2:A10) * "x"` into a lossless
//! token stream: concatenating every token's text gives back the input. The
//! transpiler rewrites only reference tokens and the formatter only touches
//! the whitespace around operators, so string literals survive verbatim.

/// Error literals Excel can store in a formula
const ERROR_LITERALS: &[&str] = &[
    "#GETTING_DATA",
    "#DIV/0!",
    "#VALUE!",
    "#SPILL!",
    "#NAME?",
    "#NULL!",
    "#CALC!",
    "#REF!",
    "#NUM!",
    "#N/A",
];

/// What a token is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Run of whitespace, kept as-is
    Whitespace,
    /// A double-quoted string literal, quotes included
    String,
    /// Numeric literal (`12`, `0.9`, `1.5E+10`)
    Number,
    /// `TRUE` / `FALSE`
    Boolean,
    /// `#REF!`, `#N/A`, ...
    ErrorLiteral,
    /// Name immediately followed by `(`
    Function,
    /// Any other bare name (named range, destination identifier, ...)
    Name,
    /// Cell reference (`B2`, `$A$1`), possibly sheet-qualified
    CellRef { sheet: Option<String> },
    /// Range reference (`A2:A10`, `B:B`), possibly sheet-qualified
    RangeRef { sheet: Option<String> },
    /// `+ - * / ^ & = <> < > <= >= %`
    Operator,
    OpenParen,
    CloseParen,
    Comma,
    /// Anything else (`{`, `;`, `[`, stray `:`), passed through untouched
    Other,
}

/// One token and the exact source text it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Char offset into the tokenized text
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// The reference part of a (possibly sheet-qualified) reference token:
    /// `Sheet2!A2:A10` → `A2:A10`
    pub fn reference_text(&self) -> &str {
        match &self.kind {
            TokenKind::CellRef { sheet: Some(_) } | TokenKind::RangeRef { sheet: Some(_) } => self
                .text
                .rsplit_once('!')
                .map(|(_, reference)| reference)
                .unwrap_or(&self.text),
            _ => &self.text,
        }
    }
}

/// Error during tokenization
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizeError {
    pub message: String,
    pub position: usize,
}

impl TokenizeError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tokenize error at position {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for TokenizeError {}

/// Concatenate token texts back into formula text
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

/// Tokenizer for formula text. A leading `=` is not special here; strip it
/// before tokenizing if it is not wanted as an operator.
pub struct Tokenizer {
    chars: Vec<char>,
    position: usize,
}

impl Tokenizer {
    pub fn new(formula: &str) -> Self {
        Self {
            chars: formula.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire formula into a vector of tokens
    pub fn tokenize(mut self) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        let start = self.position;
        let c = match self.peek() {
            None => return Ok(None),
            Some(c) => c,
        };

        let token = match c {
            c if c.is_whitespace() => {
                let text = self.take_while(char::is_whitespace);
                Token::new(TokenKind::Whitespace, text, start)
            }

            '"' => self.read_string()?,

            '\'' => self.read_quoted_sheet()?,

            '#' => self.read_error_literal(),

            '(' => self.single(TokenKind::OpenParen),
            ')' => self.single(TokenKind::CloseParen),
            ',' => self.single(TokenKind::Comma),

            '+' | '-' | '*' | '/' | '^' | '&' | '=' | '%' => self.single(TokenKind::Operator),

            // Comparison operators, longest match first
            '<' => match self.peek_at(1) {
                Some('=') | Some('>') => self.multi(TokenKind::Operator, 2),
                _ => self.single(TokenKind::Operator),
            },
            '>' => match self.peek_at(1) {
                Some('=') => self.multi(TokenKind::Operator, 2),
                _ => self.single(TokenKind::Operator),
            },

            c if c.is_ascii_digit() => self.read_number(),
            '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.read_number(),

            c if is_word_start(c) => self.read_word(),

            _ => self.single(TokenKind::Other),
        };

        Ok(Some(token))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        self.multi(kind, 1)
    }

    fn multi(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.position;
        let text: String = self.chars[start..start + len].iter().collect();
        self.position += len;
        Token::new(kind, text, start)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            text.push(c);
            self.position += 1;
        }
        text
    }

    /// Read a double-quoted string; `""` is an escaped quote
    fn read_string(&mut self) -> Result<Token, TokenizeError> {
        let start = self.position;
        let mut text = String::new();
        if let Some(quote) = self.advance() {
            text.push(quote);
        }

        loop {
            match self.advance() {
                None => {
                    return Err(TokenizeError::new("Unterminated string literal", start));
                }
                Some('"') => {
                    text.push('"');
                    if self.peek() == Some('"') {
                        self.advance();
                        text.push('"');
                    } else {
                        break;
                    }
                }
                Some(c) => text.push(c),
            }
        }

        Ok(Token::new(TokenKind::String, text, start))
    }

    /// Read `'Sheet Name'!Ref`. A quoted run not followed by `!` is kept as
    /// an opaque token.
    fn read_quoted_sheet(&mut self) -> Result<Token, TokenizeError> {
        let start = self.position;
        self.advance();
        let mut name = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(TokenizeError::new("Unterminated quoted sheet name", start));
                }
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.advance();
                        name.push('\'');
                    } else {
                        break;
                    }
                }
                Some(c) => name.push(c),
            }
        }

        let quoted: String = self.chars[start..self.position].iter().collect();
        if self.peek() == Some('!') {
            self.advance();
            return Ok(self.read_qualified_reference(start, name, quoted));
        }
        Ok(Token::new(TokenKind::Other, quoted, start))
    }

    fn read_error_literal(&mut self) -> Token {
        let start = self.position;
        let rest: String = self.chars[start..].iter().take(16).collect();
        let upper = rest.to_ascii_uppercase();
        match ERROR_LITERALS.iter().find(|lit| upper.starts_with(*lit)) {
            Some(lit) => self.multi(TokenKind::ErrorLiteral, lit.chars().count()),
            None => self.single(TokenKind::Other),
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        let mut text = self.take_while(|c| c.is_ascii_digit());

        if self.peek() == Some('.') {
            self.advance();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }

        // Exponent: only when digits actually follow
        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign = matches!(self.peek_at(1), Some('+') | Some('-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    if let Some(c) = self.advance() {
                        text.push(c);
                    }
                }
                text.push_str(&self.take_while(|c| c.is_ascii_digit()));
            }
        }

        Token::new(TokenKind::Number, text, start)
    }

    /// Read a name-like word and decide what it is from its shape and what
    /// follows it
    fn read_word(&mut self) -> Token {
        let start = self.position;
        let word = self.take_while(is_word_char);

        match self.peek() {
            Some('!') => {
                self.advance();
                let qualified = word.clone();
                return self.read_qualified_reference(start, word, qualified);
            }
            Some('(') => return Token::new(TokenKind::Function, word, start),
            _ => {}
        }

        if let Some(range) = self.try_range_tail(&word) {
            return Token::new(TokenKind::RangeRef { sheet: None }, range, start);
        }

        if is_reference_shape(&word, true) {
            return Token::new(TokenKind::CellRef { sheet: None }, word, start);
        }

        if word.eq_ignore_ascii_case("TRUE") || word.eq_ignore_ascii_case("FALSE") {
            return Token::new(TokenKind::Boolean, word, start);
        }

        Token::new(TokenKind::Name, word, start)
    }

    /// If `left` is a range bound and `:bound` follows, consume it and return
    /// the whole range text
    fn try_range_tail(&mut self, left: &str) -> Option<String> {
        if self.peek() != Some(':') || !is_reference_shape(left, false) {
            return None;
        }

        let mut end = self.position + 1;
        while end < self.chars.len() && is_word_char(self.chars[end]) {
            end += 1;
        }
        let right: String = self.chars[self.position + 1..end].iter().collect();
        if !is_reference_shape(&right, false) {
            return None;
        }

        self.position = end;
        Some(format!("{}:{}", left, right))
    }

    /// After `Sheet!` has been consumed, read the reference it qualifies.
    /// `prefix` is the sheet as written (quotes included).
    fn read_qualified_reference(&mut self, start: usize, sheet: String, prefix: String) -> Token {
        let word = self.take_while(is_word_char);
        let head = format!("{}!", prefix);

        if let Some(range) = self.try_range_tail(&word) {
            return Token::new(
                TokenKind::RangeRef { sheet: Some(sheet) },
                head + &range,
                start,
            );
        }
        if is_reference_shape(&word, true) {
            return Token::new(
                TokenKind::CellRef { sheet: Some(sheet) },
                head + &word,
                start,
            );
        }
        // `Sheet!Name`, `Sheet!#REF!` and friends: keep the text, treat as a name
        Token::new(TokenKind::Name, head + &word, start)
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '.'
}

/// Shape check for `[$]?[A-Z]+[$]?[0-9]*`. With `need_row`, the row digits
/// are mandatory (a lone cell); without, a bare column is accepted too (a
/// range bound). `$` only counts before the column and before the row.
fn is_reference_shape(word: &str, need_row: bool) -> bool {
    let bytes = word.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'$') {
        i += 1;
    }
    let letters_start = i;
    while i < bytes.len() && bytes[i].is_ascii_uppercase() {
        i += 1;
    }
    if i == letters_start {
        return false;
    }
    let row_marker = bytes.get(i) == Some(&b'$');
    if row_marker {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let has_row = i > digits_start;
    if i != bytes.len() || (row_marker && !has_row) {
        return false;
    }
    has_row || !need_row
}
