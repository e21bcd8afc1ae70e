//! Terminal diagnostics for the two stages that can reject input. Rendering
//! goes through `ariadne`; color is only used when stderr is a terminal.

use std::collections::HashMap;
use std::fmt;
use std::io::IsTerminal;
use std::ops::Range;
use std::path::Path;

use ariadne::{sources, Config, Label, Report, ReportKind};

use crate::parser::ParseError;
use crate::tokenizer::{LexicalError, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticStage {
    Tokenize,
    Parse,
    Io,
}

impl fmt::Display for DiagnosticStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticStage::Tokenize => "tokenize",
            DiagnosticStage::Parse => "parse",
            DiagnosticStage::Io => "io",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLabel {
    pub file_id: String,
    pub span: Range<usize>,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct CompilerDiagnostic {
    pub code: String,
    pub stage: DiagnosticStage,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub labels: Vec<SourceLabel>,
    pub notes: Vec<String>,
    pub sources: HashMap<String, String>,
}

impl CompilerDiagnostic {
    pub fn new(
        code: impl Into<String>,
        stage: DiagnosticStage,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            stage,
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            sources: HashMap::new(),
        }
    }

    pub fn with_source(mut self, file_id: impl Into<String>, source: impl Into<String>) -> Self {
        self.sources.insert(file_id.into(), source.into());
        self
    }

    pub fn with_label(
        mut self,
        file_id: impl Into<String>,
        span: Range<usize>,
        message: impl Into<String>,
    ) -> Self {
        self.labels.push(SourceLabel {
            file_id: file_id.into(),
            span,
            message: message.into(),
        });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn render_plain(&self) -> String {
        self.render_with_color(false)
    }

    pub fn render_terminal_auto(&self) -> String {
        self.render_with_color(std::io::stderr().is_terminal())
    }

    fn render_with_color(&self, use_color: bool) -> String {
        let (primary_file_id, primary_span) = if let Some(label) = self.labels.first() {
            (label.file_id.clone(), sanitize_span(&label.span))
        } else if let Some((file_id, source)) = self.sources.iter().next() {
            let end = next_char_boundary(source, 0);
            (file_id.clone(), 0..end)
        } else {
            ("<unknown>".to_string(), 0..1)
        };

        let severity_prefix = match self.severity {
            DiagnosticSeverity::Error => "error",
        };

        let mut report = Report::build(
            ReportKind::Error,
            (primary_file_id.clone(), primary_span.clone()),
        )
        .with_code(self.code.clone())
        .with_message(format!(
            "{severity_prefix}[{}:{}]: {}",
            self.stage, self.code, self.message
        ))
        .with_config(Config::default().with_color(use_color));

        for label in &self.labels {
            report = report.with_label(
                Label::new((label.file_id.clone(), sanitize_span(&label.span)))
                    .with_message(label.message.clone()),
            );
        }

        for note in &self.notes {
            report = report.with_note(note.clone());
        }

        let mut source_entries = self
            .sources
            .iter()
            .map(|(id, src)| (id.clone(), src.clone()))
            .collect::<Vec<_>>();
        if source_entries.is_empty() {
            source_entries.push((primary_file_id.clone(), String::new()));
        } else if !source_entries.iter().any(|(id, _)| id == &primary_file_id) {
            source_entries.push((primary_file_id.clone(), String::new()));
        }

        let mut output = Vec::new();
        match report.finish().write(sources(source_entries), &mut output) {
            Ok(()) => String::from_utf8_lossy(&output).trim_end().to_string(),
            Err(_) => self.fallback_render(),
        }
    }

    fn fallback_render(&self) -> String {
        let mut out = format!("error[{}:{}]: {}", self.stage, self.code, self.message);
        for note in &self.notes {
            out.push('\n');
            out.push_str("note: ");
            out.push_str(note);
        }
        out
    }
}

impl fmt::Display for CompilerDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_plain())
    }
}

#[derive(Clone, Debug, Default)]
pub struct CompilerDiagnosticBundle {
    pub diagnostics: Vec<CompilerDiagnostic>,
}

impl CompilerDiagnosticBundle {
    pub fn push(&mut self, diagnostic: CompilerDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn render_plain(&self) -> String {
        self.render_all(false)
    }

    pub fn render_terminal_auto(&self) -> String {
        self.render_all(std::io::stderr().is_terminal())
    }

    fn render_all(&self, use_color: bool) -> String {
        self.diagnostics
            .iter()
            .map(|diagnostic| diagnostic.render_with_color(use_color))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl fmt::Display for CompilerDiagnosticBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_plain())
    }
}

pub fn diagnostic_from_lexical_error(
    source: &str,
    source_path: Option<&Path>,
    error: &LexicalError,
) -> CompilerDiagnostic {
    let file_id = file_id_from_path(source_path);
    let span = span_from_position(source, &error.position);
    CompilerDiagnostic::new(
        "AEC-TOKENIZE-001",
        DiagnosticStage::Tokenize,
        "invalid character",
    )
    .with_source(file_id.clone(), source.to_string())
    .with_label(file_id, span, error.to_string())
    .with_note(format!(
        "at line {}, column {}; the character was skipped",
        error.position.line, error.position.column
    ))
}

pub fn diagnostic_from_parse_error(
    source: &str,
    source_path: Option<&Path>,
    error: &ParseError,
) -> CompilerDiagnostic {
    let file_id = file_id_from_path(source_path);
    let code = match error {
        ParseError::Syntax { .. } => "AEC-PARSE-001",
        ParseError::UndeclaredVariable { .. } => "AEC-PARSE-002",
        ParseError::DivisionByZero => "AEC-PARSE-003",
    };
    let mut diagnostic =
        CompilerDiagnostic::new(code, DiagnosticStage::Parse, error.to_string())
            .with_source(file_id, source.to_string())
            .with_note("the statement was discarded; the symbol table is unchanged");
    if let ParseError::UndeclaredVariable { name } = error {
        diagnostic = diagnostic.with_note(format!("assign a value to `{name}` first"));
    }
    diagnostic
}

pub fn file_id_from_path(path: Option<&Path>) -> String {
    path.map(|value| value.display().to_string())
        .unwrap_or_else(|| "<repl>".to_string())
}

pub fn span_from_position(source: &str, position: &Position) -> Range<usize> {
    let start = line_column_to_byte_index(source, position.line, position.column);
    let end = next_char_boundary(source, start);
    sanitize_span(&(start..end))
}

pub fn sanitize_span(span: &Range<usize>) -> Range<usize> {
    if span.end <= span.start {
        span.start..span.start.saturating_add(1)
    } else {
        span.clone()
    }
}

pub fn line_column_to_byte_index(source: &str, line_1_based: u32, column_1_based: u32) -> usize {
    let mut line = 1_u32;
    let mut column = 1_u32;
    for (idx, ch) in source.char_indices() {
        if line == line_1_based && column == column_1_based {
            return idx;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    source.len()
}

pub fn next_char_boundary(source: &str, start: usize) -> usize {
    if start >= source.len() {
        return start.saturating_add(1);
    }
    let mut iter = source[start..].char_indices();
    let _ = iter.next();
    if let Some((delta, _)) = iter.next() {
        start + delta
    } else {
        source.len()
    }
}
