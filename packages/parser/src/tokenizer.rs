use crate::error::{ParseError, ParseResult, Span};
use logos::Logos;

/// Call wrappers that build a color from a string literal, e.g. `RGBA.fromHex("#ff0000")`
const COLOR_BUILDERS: &[&str] = &["RGBA.fromHex", "parseColor"];

/// Value of a tag attribute after literal disambiguation
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<AttrValue>),
    /// Flat key/value record, entries in source order
    Object(Vec<(String, AttrValue)>),
    /// Expression text that is none of the above, kept verbatim
    Raw(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) | AttrValue::Raw(s) => Some(s),
            _ => None,
        }
    }

    /// Finite numeric value; `NaN` and the infinities count as absent
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::String(s) | AttrValue::Raw(s) => s.trim().parse().ok(),
            _ => None,
        };
        n.filter(|n: &f64| n.is_finite())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up a key of an object value
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        match self {
            AttrValue::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

/// Token types for Trellis markup
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<name ...>`
    TagOpen {
        name: String,
        attributes: Vec<Attribute>,
    },
    /// `<name ... />`
    TagSelfClose {
        name: String,
        attributes: Vec<Attribute>,
    },
    /// `</name>`
    TagClose { name: String },
    /// Trimmed, non-empty run of characters between tags
    Text(String),
    Eof,
}

pub type SpannedToken = (Token, Span);

/// Lexer for the inside of a tag: name, attribute names, `=` and values
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum TagPart {
    #[regex(r"[A-Za-z_][A-Za-z0-9_.:\-]*")]
    Ident,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    Quoted,

    #[token("{", braced_group)]
    Braced,
}

fn braced_group(lex: &mut logos::Lexer<TagPart>) -> bool {
    match balanced_len(lex.remainder(), 1) {
        Some(len) => {
            lex.bump(len);
            true
        }
        None => false,
    }
}

/// Tracks quotes, comments and bracket depth one character at a time
#[derive(Default)]
struct Nesting {
    depth: usize,
    quote: Option<char>,
    escaped: bool,
    in_comment: bool,
    prev: Option<char>,
}

impl Nesting {
    fn starting_at(depth: usize) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    /// Feed one character. Returns true when the character is structural,
    /// i.e. outside string literals and comments.
    fn step(&mut self, ch: char) -> bool {
        let prev = self.prev.replace(ch);

        if self.in_comment {
            if prev == Some('*') && ch == '/' {
                self.in_comment = false;
            }
            return false;
        }

        if let Some(quote) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == quote {
                self.quote = None;
            }
            return false;
        }

        match ch {
            '*' if prev == Some('/') => {
                self.in_comment = true;
                self.prev = None;
                false
            }
            '"' | '\'' | '`' => {
                self.quote = Some(ch);
                false
            }
            '{' | '[' | '(' => {
                self.depth += 1;
                true
            }
            '}' | ']' | ')' => {
                self.depth = self.depth.saturating_sub(1);
                true
            }
            _ => true,
        }
    }
}

/// Length of `text` up to and including the bracket that brings `depth` back to zero
fn balanced_len(text: &str, depth: usize) -> Option<usize> {
    let mut nesting = Nesting::starting_at(depth);
    for (i, ch) in text.char_indices() {
        if nesting.step(ch) && nesting.depth == 0 {
            return Some(i + ch.len_utf8());
        }
    }
    None
}

/// Split on `separator` where it appears outside brackets and strings
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut nesting = Nesting::default();
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        if nesting.step(ch) && ch == separator && nesting.depth == 0 {
            parts.push(&text[start..i]);
            start = i + ch.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Strip matching quotes and resolve backslash escapes.
/// `None` when `text` is not exactly one string literal.
pub fn unquote(text: &str) -> Option<String> {
    let quote = text.chars().next().filter(|c| matches!(c, '"' | '\'' | '`'))?;
    let body = text.strip_prefix(quote)?.strip_suffix(quote)?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                other => out.push(other),
            },
            c if c == quote => return None,
            c => out.push(c),
        }
    }
    Some(out)
}

fn color_call(text: &str) -> Option<String> {
    COLOR_BUILDERS.iter().find_map(|builder| {
        let args = text
            .strip_prefix(builder)?
            .trim_start()
            .strip_prefix('(')?
            .strip_suffix(')')?;
        unquote(args.trim())
    })
}

fn looks_numeric(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.')
}

/// Interpret the inside of a `{...}` attribute value
pub fn parse_literal(source: &str) -> AttrValue {
    let text = source.trim();

    if let Some(items) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return AttrValue::Array(
            split_top_level(items, ',')
                .into_iter()
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(parse_literal)
                .collect(),
        );
    }

    if let Some(body) = text.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
        return AttrValue::Object(parse_object(body));
    }

    match text {
        "true" => return AttrValue::Bool(true),
        "false" => return AttrValue::Bool(false),
        _ => {}
    }

    if looks_numeric(text) {
        if let Some(n) = text.parse::<f64>().ok().filter(|n| n.is_finite()) {
            return AttrValue::Number(n);
        }
    }

    if let Some(s) = unquote(text) {
        return AttrValue::String(s);
    }

    if let Some(color) = color_call(text) {
        return AttrValue::String(color);
    }

    AttrValue::Raw(text.to_string())
}

/// `key: value, key: value` with the key split off at the first colon
fn parse_object(body: &str) -> Vec<(String, AttrValue)> {
    split_top_level(body, ',')
        .into_iter()
        .filter_map(|entry| {
            let (key, value) = entry.split_once(':')?;
            let key = key.trim();
            let key = unquote(key).unwrap_or_else(|| key.to_string());
            if key.is_empty() {
                return None;
            }
            Some((key, parse_literal(value)))
        })
        .collect()
}

fn starts_tag(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('<')
        && matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '/')
}

/// Length of the tag starting at `rest[0] == '<'`, including the closing `>`
fn tag_len(rest: &str) -> Option<usize> {
    let mut nesting = Nesting::default();
    for (i, ch) in rest.char_indices().skip(1) {
        if nesting.step(ch) && ch == '>' && nesting.depth == 0 {
            return Some(i + 1);
        }
    }
    None
}

fn lex_tag(source: &str, span: Span) -> ParseResult<Token> {
    let inner = &source[1..source.len() - 1];

    if let Some(rest) = inner.strip_prefix('/') {
        let name = rest.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ParseError::malformed_tag(
                format!("invalid closing tag '{}'", source),
                span,
            ));
        }
        return Ok(Token::TagClose {
            name: name.to_string(),
        });
    }

    let (body, self_closing) = match inner.trim_end().strip_suffix('/') {
        Some(body) => (body, true),
        None => (inner, false),
    };

    let mut lexer = TagPart::lexer(body);
    let name = match lexer.next() {
        Some(Ok(TagPart::Ident)) => lexer.slice().to_string(),
        _ => return Err(ParseError::malformed_tag("expected a tag name", span)),
    };

    let mut attributes = Vec::new();
    let mut pending: Option<String> = None;

    while let Some(part) = lexer.next() {
        match part {
            Ok(TagPart::Ident) => {
                if let Some(bare) = pending.replace(lexer.slice().to_string()) {
                    attributes.push(Attribute {
                        name: bare,
                        value: AttrValue::Bool(true),
                    });
                }
            }
            Ok(TagPart::Equals) => {
                let Some(attr) = pending.take() else {
                    return Err(ParseError::malformed_tag(
                        "'=' without an attribute name",
                        span,
                    ));
                };
                let value = match lexer.next() {
                    Some(Ok(TagPart::Quoted)) => {
                        let quoted = lexer.slice();
                        AttrValue::String(quoted[1..quoted.len() - 1].to_string())
                    }
                    Some(Ok(TagPart::Braced)) => {
                        let braced = lexer.slice();
                        parse_literal(&braced[1..braced.len() - 1])
                    }
                    _ => {
                        return Err(ParseError::malformed_tag(
                            format!("missing value for attribute '{}'", attr),
                            span,
                        ))
                    }
                };
                attributes.push(Attribute { name: attr, value });
            }
            Ok(TagPart::Quoted) | Ok(TagPart::Braced) => {
                // Spreads such as `{...props}` carry nothing we can map
                tracing::debug!(value = lexer.slice(), tag = %name, "ignoring unnamed attribute value");
            }
            Err(()) => {
                return Err(ParseError::malformed_tag(
                    format!("unexpected '{}' in <{}>", lexer.slice(), name),
                    span,
                ));
            }
        }
    }

    if let Some(bare) = pending {
        attributes.push(Attribute {
            name: bare,
            value: AttrValue::Bool(true),
        });
    }

    Ok(if self_closing {
        Token::TagSelfClose { name, attributes }
    } else {
        Token::TagOpen { name, attributes }
    })
}

/// Resolve `{"..."}` string expressions and drop `{/* */}` comments inside a text run
fn resolve_text(run: &str) -> String {
    let mut out = String::with_capacity(run.len());
    let mut rest = run;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match balanced_len(after, 1) {
            Some(len) => {
                let inner = after[..len - 1].trim();
                let is_comment = inner.starts_with("/*") && inner.ends_with("*/");
                if !is_comment {
                    match parse_literal(inner) {
                        AttrValue::String(s) => out.push_str(&s),
                        _ => out.push_str(&rest[open..open + 1 + len]),
                    }
                }
                rest = &after[len..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn push_text(tokens: &mut Vec<SpannedToken>, source: &str, span: Span) {
    let raw = &source[span.clone()];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }

    let text = resolve_text(trimmed);
    if text.is_empty() {
        return;
    }

    let start = span.start + (raw.len() - raw.trim_start().len());
    tokens.push((Token::Text(text), start..start + trimmed.len()));
}

/// Tokenize markup into tags and text runs, terminated by [`Token::Eof`]
pub fn tokenize(source: &str) -> ParseResult<Vec<SpannedToken>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];

        if starts_tag(rest) {
            push_text(&mut tokens, source, text_start..pos);
            let len = tag_len(rest).ok_or(ParseError::UnterminatedTag {
                span: pos..source.len(),
            })?;
            let span = pos..pos + len;
            let token = lex_tag(&source[span.clone()], span.clone())?;
            tokens.push((token, span));
            pos += len;
            text_start = pos;
        } else if rest.starts_with('{') {
            // Keep `<` inside `{"..."}` expressions from opening a tag
            pos += balanced_len(&rest[1..], 1).map_or(1, |len| len + 1);
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    push_text(&mut tokens, source, text_start..source.len());
    tokens.push((Token::Eof, source.len()..source.len()));

    Ok(tokens)
}
