use nu_ansi_term::{Color, Style};
use reckon_core::functions::FunctionRegistry;
use reckon_core::lexer::{LexError, lex_with};
use reckon_core::token::{Class, classify};
use reedline::{StyledText, ValidationResult, Validator};

fn color(class: Option<Class>) -> Color {
    match class {
        Some(Class::Function) => Color::Blue,
        Some(Class::Operator) | Some(Class::Punctuation) => Color::White,
        Some(Class::Literal(_)) => Color::Cyan,
        Some(Class::Comment) => Color::DarkGray,
        Some(Class::Reference) => Color::Yellow,
        None => Color::Red,
    }
}

/// Colors input by token class, and leftover text in red.
pub struct Highlighter {
    registry: FunctionRegistry,
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            registry: FunctionRegistry::standard(),
        }
    }
}

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _: usize) -> StyledText {
        let mut output = StyledText::new();
        let mut spans: Vec<(std::ops::Range<usize>, Color)> =
            match lex_with(line, |word| self.registry.is_keyword(word)) {
                Ok(lexemes) => lexemes
                    .into_iter()
                    .map(|lexeme| {
                        let class = classify(&lexeme.text, &self.registry);
                        (lexeme.span, color(class))
                    })
                    .collect(),
                Err(LexError::BadInput { residue }) => residue
                    .into_iter()
                    .map(|r| (r.span, Color::Red))
                    .collect(),
            };
        spans.sort_by_key(|(span, _)| span.start);

        let plain = Style::new().fg(Color::White);
        let mut cursor = 0;
        for (span, fg) in spans {
            if span.start < cursor || span.end > line.len() {
                continue;
            }
            if span.start > cursor {
                output.push((plain, line[cursor..span.start].to_string()));
            }
            output.push((Style::new().fg(fg), line[span.clone()].to_string()));
            cursor = span.end;
        }
        if cursor < line.len() {
            output.push((plain, line[cursor..].to_string()));
        }
        output
    }
}

/// Keeps reading lines while parentheses are open.
pub struct ParenValidator;

impl Validator for ParenValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        if open_parens(line) > 0 {
            ValidationResult::Incomplete
        } else {
            ValidationResult::Complete
        }
    }
}

/// Parentheses opened and not yet closed. Text inside comments does not
/// count.
pub fn open_parens(buffer: &str) -> usize {
    let mut depth: isize = 0;
    let mut in_comment = false;
    let mut chars = buffer.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '[' if !in_comment && chars.peek() == Some(&'"') => in_comment = true,
            ']' if in_comment => in_comment = false,
            '(' if !in_comment => depth += 1,
            ')' if !in_comment => depth -= 1,
            _ => {}
        }
    }
    depth.max(0) as usize
}
