//! Python content reduction without a parser.
//!
//! Source is split into logical lines (bracket, backslash and triple-quote
//! continuations folded in) by a small lexer that knows where strings and
//! comments are. Docstrings and definitions are then recognized from the
//! indentation structure.

use crate::reduce::{ContentReducer, NameFilter};

/// Stands in for a whole string literal in a line's shape.
const STRING_MARK: char = '\u{0}';
const STRING_PREFIXES: &str = "rRbBuUfF";

#[derive(Debug, Default, Clone, Copy)]
pub struct PythonReducer;

impl ContentReducer for PythonReducer {
    fn name(&self) -> &'static str {
        "python"
    }

    fn strip_comments(&self, content: &str) -> Option<String> {
        let lexed = Lexed::new(content).ok()?;
        Some(lexed.without_comments_and_docstrings(content.ends_with('\n')))
    }

    fn signatures(&self, content: &str, keep_full: &NameFilter) -> Option<String> {
        Some(match Lexed::new(content) {
            Ok(lexed) => lexed.signatures(keep_full),
            Err(reason) => format!("# ERROR: unable to parse Python file: {}\n{}", reason, content),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefKind {
    Function,
    Class,
}

#[derive(Debug, Clone)]
struct LogicalLine<'a> {
    first: usize,
    last: usize,
    indent: &'a str,
    /// Code with strings collapsed to `STRING_MARK` and comments removed.
    shape: String,
    /// Physical lines with comments removed.
    code: Vec<String>,
    had_comment: bool,
}

impl<'a> LogicalLine<'a> {
    fn start(index: usize, raw: &'a str) -> Self {
        let indent = &raw[..raw.len() - raw.trim_start().len()];
        Self {
            first: index,
            last: index,
            indent,
            shape: String::new(),
            code: Vec::new(),
            had_comment: false,
        }
    }

    fn width(&self) -> usize {
        self.indent.len()
    }

    fn is_blank(&self) -> bool {
        self.shape.trim().is_empty()
    }

    fn is_decorator(&self) -> bool {
        self.shape.trim_start().starts_with('@')
    }

    /// A statement made only of (implicitly concatenated) string literals.
    fn is_string_only(&self) -> bool {
        let compact: String = self.shape.chars().filter(|c| !c.is_whitespace()).collect();
        let mut rest = compact.as_str();
        let mut saw_string = false;
        while !rest.is_empty() {
            rest = rest.trim_start_matches(|c| STRING_PREFIXES.contains(c));
            match rest.strip_prefix(STRING_MARK) {
                Some(after) => {
                    rest = after;
                    saw_string = true;
                }
                None => return false,
            }
        }
        saw_string
    }

    fn definition(&self) -> Option<(DefKind, &str)> {
        let text = self.shape.trim_start();
        let (kind, rest) = if let Some(rest) = text.strip_prefix("class ") {
            (DefKind::Class, rest)
        } else if let Some(rest) = text.strip_prefix("def ") {
            (DefKind::Function, rest)
        } else if let Some(rest) = text
            .strip_prefix("async")
            .map(str::trim_start)
            .and_then(|r| r.strip_prefix("def "))
        {
            (DefKind::Function, rest)
        } else {
            return None;
        };
        let rest = rest.trim_start();
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        (end > 0).then(|| (kind, &rest[..end]))
    }

    /// The header ends with `:`, so the body sits on the following lines.
    fn opens_block(&self) -> bool {
        self.shape.trim_end().ends_with(':')
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenString {
    quote: char,
    triple: bool,
}

struct Lexed<'a> {
    physical: Vec<&'a str>,
    lines: Vec<LogicalLine<'a>>,
}

impl<'a> Lexed<'a> {
    fn new(src: &'a str) -> Result<Self, String> {
        let physical: Vec<&str> = src.lines().collect();
        let mut lines = Vec::new();
        let mut current: Option<LogicalLine<'a>> = None;
        let mut open: Option<OpenString> = None;
        let mut depth: usize = 0;

        for (index, raw) in physical.iter().copied().enumerate() {
            let logical = current.get_or_insert_with(|| LogicalLine::start(index, raw));
            logical.last = index;

            let chars: Vec<char> = raw.chars().collect();
            let mut code = String::new();
            let mut continued = false;
            let mut i = 0;
            while i < chars.len() {
                let ch = chars[i];
                if let Some(string) = open {
                    code.push(ch);
                    if ch == '\\' {
                        match chars.get(i + 1) {
                            Some(&next) => {
                                code.push(next);
                                i += 2;
                            }
                            None => {
                                continued = true;
                                i += 1;
                            }
                        }
                        continue;
                    }
                    if ch == string.quote {
                        if !string.triple {
                            open = None;
                        } else if chars.get(i + 1) == Some(&ch) && chars.get(i + 2) == Some(&ch) {
                            code.push(ch);
                            code.push(ch);
                            open = None;
                            i += 3;
                            continue;
                        }
                    }
                    i += 1;
                    continue;
                }

                match ch {
                    '#' => {
                        logical.had_comment = true;
                        break;
                    }
                    '\'' | '"' => {
                        let triple = chars.get(i + 1) == Some(&ch) && chars.get(i + 2) == Some(&ch);
                        open = Some(OpenString { quote: ch, triple });
                        logical.shape.push(STRING_MARK);
                        let width = if triple { 3 } else { 1 };
                        code.extend(std::iter::repeat_n(ch, width));
                        i += width;
                        continue;
                    }
                    '(' | '[' | '{' => depth += 1,
                    ')' | ']' | '}' => depth = depth.saturating_sub(1),
                    '\\' if i + 1 == chars.len() => continued = true,
                    _ => {}
                }
                code.push(ch);
                logical.shape.push(ch);
                i += 1;
            }

            match open {
                Some(string) if !string.triple && !continued => {
                    return Err(format!("unterminated string literal on line {}", index + 1));
                }
                Some(_) => logical.code.push(code),
                None => logical.code.push(code.trim_end().to_string()),
            }
            logical.shape.push(' ');

            if open.is_none() && depth == 0 && !continued {
                if let Some(done) = current.take() {
                    lines.push(done);
                }
            }
        }

        if open.is_some() {
            return Err("unterminated triple-quoted string".to_string());
        }
        if depth > 0 {
            return Err("unbalanced brackets at end of file".to_string());
        }
        lines.extend(current);
        Ok(Self { physical, lines })
    }

    fn next_code_line(&self, after: usize) -> Option<&LogicalLine<'a>> {
        self.lines[after + 1..].iter().find(|l| !l.is_blank())
    }

    fn without_comments_and_docstrings(&self, trailing_newline: bool) -> String {
        let mut out: Vec<String> = Vec::new();
        let mut previous: Option<&LogicalLine> = None;

        for (index, line) in self.lines.iter().enumerate() {
            if line.is_blank() {
                if !line.had_comment {
                    out.push(String::new());
                }
                continue;
            }

            let owner = match previous {
                None => Some(None),
                Some(p) if p.definition().is_some() && p.opens_block() && line.width() > p.width() => {
                    Some(Some(p))
                }
                _ => None,
            };
            if let (Some(owner), true) = (owner, line.is_string_only()) {
                if let Some(header) = owner {
                    let body_ends = self
                        .next_code_line(index)
                        .is_none_or(|next| next.width() <= header.width());
                    if body_ends {
                        out.push(format!("{}pass", line.indent));
                    }
                }
                previous = Some(line);
                continue;
            }

            out.extend(line.code.iter().cloned());
            previous = Some(line);
        }

        let mut text = out.join("\n");
        if trailing_newline && !text.is_empty() {
            text.push('\n');
        }
        text
    }

    fn signatures(&self, keep_full: &NameFilter) -> String {
        let code: Vec<&LogicalLine> = self.lines.iter().filter(|l| !l.is_blank()).collect();
        let mut out: Vec<String> = Vec::new();
        let mut i = 0;

        while i < code.len() {
            if code[i].width() > 0 {
                i += 1;
                continue;
            }
            let start = i;
            while code[i].is_decorator() && i + 1 < code.len() && code[i + 1].width() == 0 {
                i += 1;
            }
            let head = code[i];
            let Some((kind, name)) = head.definition() else {
                i += 1;
                continue;
            };
            let mut end = i + 1;
            while end < code.len() && code[end].width() > 0 {
                end += 1;
            }
            let body = &code[i + 1..end];

            if keep_full.matches(name) {
                let last = body.last().map_or(head.last, |l| l.last);
                out.extend(
                    self.physical[code[start].first..=last]
                        .iter()
                        .map(|l| l.to_string()),
                );
                out.push(String::new());
                i = end;
                continue;
            }

            for line in &code[start..i] {
                out.extend(line.code.iter().cloned());
            }
            if !head.opens_block() {
                out.extend(header_before_body(&head.code));
                out.push(format!("{}    pass", head.indent));
                out.push(String::new());
                i = end;
                continue;
            }
            out.extend(head.code.iter().cloned());

            let body_indent = body.first().map_or("    ".to_string(), |l| l.indent.to_string());
            let docstring = body.first().filter(|l| l.is_string_only());
            if let Some(doc) = docstring {
                out.extend(doc.code.iter().cloned());
            }

            match kind {
                DefKind::Function => out.push(format!("{}pass", body_indent)),
                DefKind::Class => {
                    let methods = method_signatures(body, &body_indent);
                    let has_methods = !methods.is_empty();
                    out.extend(methods);
                    if docstring.is_none() && !has_methods {
                        out.push(format!("{}pass", body_indent));
                    }
                }
            }
            out.push(String::new());
            i = end;
        }

        out.join("\n")
    }
}

/// Method headers (with decorators and docstring) of a class body, each
/// preceded by a blank line and followed by `pass`.
fn method_signatures(body: &[&LogicalLine], member_indent: &str) -> Vec<String> {
    let mut out = Vec::new();
    let width = member_indent.len();
    let mut k = 0;
    while k < body.len() {
        if body[k].width() != width {
            k += 1;
            continue;
        }
        let start = k;
        while body[k].is_decorator() && k + 1 < body.len() && body[k + 1].width() == width {
            k += 1;
        }
        let head = body[k];
        if !matches!(head.definition(), Some((DefKind::Function, _))) {
            k += 1;
            continue;
        }

        out.push(String::new());
        for line in &body[start..k] {
            out.extend(line.code.iter().cloned());
        }
        if !head.opens_block() {
            out.extend(header_before_body(&head.code));
            out.push(format!("{}    pass", head.indent));
        } else {
            out.extend(head.code.iter().cloned());
            let inner = body.get(k + 1).filter(|l| l.width() > width);
            let inner_indent = inner.map_or(format!("{}    ", member_indent), |l| l.indent.to_string());
            if let Some(doc) = inner.filter(|l| l.is_string_only()) {
                out.extend(doc.code.iter().cloned());
            }
            out.push(format!("{}pass", inner_indent));
        }
        k += 1;
    }
    out
}

/// Lines of a one-line definition up to and including the `:` that closes
/// its header, e.g. `def f(x: int): return x` becomes `def f(x: int):`.
fn header_before_body(lines: &[String]) -> Vec<String> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (j, line) in lines.iter().enumerate() {
        let mut chars = line.char_indices();
        while let Some((at, c)) = chars.next() {
            match quote {
                Some(_) if c == '\\' => {
                    chars.next();
                }
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None => match c {
                    '\'' | '"' => quote = Some(c),
                    '(' | '[' | '{' => depth += 1,
                    ')' | ']' | '}' => depth = depth.saturating_sub(1),
                    ':' if depth == 0 => {
                        let mut head: Vec<String> = lines[..j].to_vec();
                        head.push(line[..=at].to_string());
                        return head;
                    }
                    _ => {}
                },
            }
        }
    }
    lines.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r##"#!/usr/bin/env python
"""Module docstring."""
import os  # needed for paths

URL = "http://example.com/#anchor"


@cached
def load(path: str,
         strict: bool = False) -> dict:
    """Load a file.

    Returns a dict.
    """
    # read it
    with open(path) as f:
        return parse(f.read())


class Store(Base):
    '''Keeps things.'''

    @property
    def size(self):
        return len(self.items)

    async def fetch(self, key):
        """Fetch one."""
        data = "# not a comment"
        return data


def main():
    print(load("x"))
"##;

    fn reduce(src: &str) -> String {
        PythonReducer.strip_comments(src).unwrap()
    }

    #[test]
    fn strips_comments_and_docstrings_but_keeps_strings() {
        let expected = r##"import os

URL = "http://example.com/#anchor"


@cached
def load(path: str,
         strict: bool = False) -> dict:
    with open(path) as f:
        return parse(f.read())


class Store(Base):

    @property
    def size(self):
        return len(self.items)

    async def fetch(self, key):
        data = "# not a comment"
        return data


def main():
    print(load("x"))
"##;
        assert_eq!(reduce(SAMPLE), expected);
    }

    #[test]
    fn docstring_only_body_becomes_pass() {
        let src = "def todo():\n    \"\"\"Later.\"\"\"\n\nx = 1\n";
        assert_eq!(reduce(src), "def todo():\n    pass\n\nx = 1\n");
    }

    #[test]
    fn unterminated_string_cannot_be_stripped() {
        assert!(PythonReducer.strip_comments("x = '''open\n").is_none());
        assert!(PythonReducer.strip_comments("x = 'open\n").is_none());
    }

    #[test]
    fn signatures_keep_headers_docstrings_and_full_bodies() {
        let keep = NameFilter::new(&["main"], &CollectingReporter::new());
        let out = PythonReducer.signatures(SAMPLE, &keep).unwrap();
        let expected = r##"@cached
def load(path: str,
         strict: bool = False) -> dict:
    """Load a file.

    Returns a dict.
    """
    pass

class Store(Base):
    '''Keeps things.'''

    @property
    def size(self):
        pass

    async def fetch(self, key):
        """Fetch one."""
        pass

def main():
    print(load("x"))
"##;
        assert_eq!(out, expected);
    }

    #[test]
    fn one_line_definitions_lose_their_body() {
        let src = "def f(): return 1\n\nclass Point: x: int = 0\n\nclass Shape:\n    def area(self, k={'a': 1}): return k['a']\n\n    def name(self) -> str: return \"s:1\"\n";
        let out = PythonReducer.signatures(src, &NameFilter::empty()).unwrap();
        let expected = "def f():\n    pass\n\nclass Point:\n    pass\n\nclass Shape:\n\n    def area(self, k={'a': 1}):\n        pass\n\n    def name(self) -> str:\n        pass\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn empty_class_gets_pass() {
        let out = PythonReducer
            .signatures("class Marker:\n    x = 1\n", &NameFilter::empty())
            .unwrap();
        assert_eq!(out, "class Marker:\n    pass\n");
    }

    #[test]
    fn unparsable_source_is_flagged_not_dropped() {
        let out = PythonReducer
            .signatures("def broken(:\n", &NameFilter::empty())
            .unwrap();
        assert!(out.starts_with("# ERROR: unable to parse Python file"));
        assert!(out.ends_with("def broken(:\n"));
    }
}
