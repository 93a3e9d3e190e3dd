//! Path globs with `*` and `**` wildcards.
//!
//! A pattern compiles to a short token program that is matched against the
//! whole candidate path:
//!
//! - `**` matches any sequence of characters, including `/`
//! - `*` matches any sequence of characters except `/`
//! - every other character matches itself (so `.`, `?`, `[` are literal)
//!
//! Backslashes are treated as path separators in both the pattern and the
//! candidate, so `src\**` and `src/**` are the same pattern.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// `*`
    AnySegment,
    /// `**`
    AnyPath,
}

/// A compiled glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glob {
    source: String,
    tokens: Vec<Token>,
}

impl Glob {
    /// Compile a pattern. Compilation cannot fail: any string is a valid glob.
    pub fn new(pattern: &str) -> Self {
        let normalized = normalize_separators(pattern);
        let mut tokens: Vec<Token> = Vec::new();
        let mut literal = String::new();
        let mut chars = normalized.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '*' {
                literal.push(ch);
                continue;
            }

            let mut run = 1;
            while chars.peek() == Some(&'*') {
                chars.next();
                run += 1;
            }

            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }

            // `**` is read before `*`, so any run of two or more crosses separators.
            let wildcard = if run >= 2 {
                Token::AnyPath
            } else {
                Token::AnySegment
            };
            push_wildcard(&mut tokens, wildcard);
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self {
            source: pattern.to_string(),
            tokens,
        }
    }

    /// The pattern as it was written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Test a path against this glob. Separators are normalized first.
    pub fn is_match(&self, path: &str) -> bool {
        let normalized = normalize_separators(path);
        match_tokens(&self.tokens, normalized.as_bytes())
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Replace `\` with `/` so matching is independent of the host platform.
pub(crate) fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Adjacent wildcards collapse: `AnyPath` absorbs its neighbours.
fn push_wildcard(tokens: &mut Vec<Token>, wildcard: Token) {
    match (tokens.last(), &wildcard) {
        (Some(Token::AnyPath), _) => {}
        (Some(Token::AnySegment), Token::AnyPath) => {
            tokens.pop();
            tokens.push(Token::AnyPath);
        }
        (Some(Token::AnySegment), Token::AnySegment) => {}
        _ => tokens.push(wildcard),
    }
}

fn match_tokens(tokens: &[Token], path: &[u8]) -> bool {
    let Some((first, rest)) = tokens.split_first() else {
        return path.is_empty();
    };

    match first {
        Token::Literal(lit) => {
            let lit = lit.as_bytes();
            path.starts_with(lit) && match_tokens(rest, &path[lit.len()..])
        }
        Token::AnySegment => {
            for split in 0..=path.len() {
                if split > 0 && path[split - 1] == b'/' {
                    break;
                }
                if match_tokens(rest, &path[split..]) {
                    return true;
                }
            }
            false
        }
        Token::AnyPath => {
            if rest.is_empty() {
                return true;
            }
            (0..=path.len()).any(|split| match_tokens(rest, &path[split..]))
        }
    }
}
