//! Tokenizer for operation documents.
//!
//! Only as much structure as classification and inline identifier lookup
//! need: words, numbers, strings, and punctuation. Lexing never fails;
//! characters outside the recognized set become [`Token::Other`] so that
//! every document still classifies to exactly one outcome.

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Names and keywords alike (`query`, `mutation`, `repairs`, `id`)
    Word(String),
    /// Unsigned integer literal that fits in a u64
    Int(u64),
    /// Any other numeric literal (decimals, exponents, oversized integers),
    /// kept as written
    Number(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Comma,
    /// Anything else: `$`, `!`, `=`, `@`, `.`, `-`, stray unicode
    Other(char),
}

pub fn lex(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        // Line comment
        if c == '#' {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        // Block string
        if c == '"' && chars.get(pos + 1) == Some(&'"') && chars.get(pos + 2) == Some(&'"') {
            pos += 3;
            let start = pos;
            while pos < chars.len() && !chars[pos..].starts_with(&['"', '"', '"']) {
                pos += 1;
            }
            let s: String = chars[start..pos].iter().collect();
            pos = (pos + 3).min(chars.len());
            tokens.push(Token::Str(s));
            continue;
        }

        // String literal. An unterminated string swallows the rest of the
        // document.
        if c == '"' {
            pos += 1;
            let mut s = String::new();
            while pos < chars.len() {
                let sc = chars[pos];
                pos += 1;
                match sc {
                    '"' => break,
                    '\\' if pos < chars.len() => {
                        match chars[pos] {
                            'n' => s.push('\n'),
                            't' => s.push('\t'),
                            other => s.push(other),
                        }
                        pos += 1;
                    }
                    _ => s.push(sc),
                }
            }
            tokens.push(Token::Str(s));
            continue;
        }

        // Number
        if c.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            let mut is_int = true;
            if pos + 1 < chars.len() && chars[pos] == '.' && chars[pos + 1].is_ascii_digit() {
                is_int = false;
                pos += 1; // consume '.'
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
            if pos < chars.len() && matches!(chars[pos], 'e' | 'E') {
                let mut exp_end = pos + 1;
                if exp_end < chars.len() && matches!(chars[exp_end], '+' | '-') {
                    exp_end += 1;
                }
                if exp_end < chars.len() && chars[exp_end].is_ascii_digit() {
                    is_int = false;
                    pos = exp_end;
                    while pos < chars.len() && chars[pos].is_ascii_digit() {
                        pos += 1;
                    }
                }
            }
            let s: String = chars[start..pos].iter().collect();
            match s.parse::<u64>() {
                Ok(n) if is_int => tokens.push(Token::Int(n)),
                _ => tokens.push(Token::Number(s)),
            }
            continue;
        }

        // Name
        if c.is_ascii_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            tokens.push(Token::Word(chars[start..pos].iter().collect()));
            continue;
        }

        let token = match c {
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ':' => Token::Colon,
            ',' => Token::Comma,
            other => Token::Other(other),
        };
        tokens.push(token);
        pos += 1;
    }

    tokens
}
