//! Renders construction diagnostics, against the notation source when one is given.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;
use super::message::{DiagnosticMessage, Severity};

/// Renders diagnostics against the grammar notation source.
///
/// Each source report carries the failing rule as its primary label, then the
/// construction point as a note and every hint as a help line. Without a
/// source every diagnostic prints as one plain line.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    /// Name shown in the `-->` line, usually the grammar file.
    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let Some(source) = self.source else {
            for (i, diag) in self.diagnostics.iter().enumerate() {
                if i > 0 {
                    w.write_char('\n')?;
                }
                write!(w, "{diag}")?;
            }
            return Ok(());
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            let report = self.report(diag, source);
            write!(w, "{}", renderer.render(&report))?;
        }
        Ok(())
    }

    fn report<'a>(&self, diag: &'a DiagnosticMessage, source: &'a str) -> Vec<Group<'a>>
    where
        's: 'a,
    {
        let primary = AnnotationKind::Primary.span(clamp(diag.range, source.len()));
        let primary = match diag.rule() {
            Some(rule) => primary.label(format!("in rule `{rule}`")),
            None => primary,
        };
        let mut snippet = Snippet::source(source).line_start(1).annotation(primary);
        if let Some(path) = self.path {
            snippet = snippet.path(path);
        }
        for related in &diag.related {
            snippet = snippet.annotation(
                AnnotationKind::Context
                    .span(clamp(related.range, source.len()))
                    .label(related.message.as_str()),
            );
        }

        let mut group = level(diag.severity())
            .primary_title(diag.message())
            .element(snippet);
        if let Some(point) = diag.point() {
            group = group.element(Level::NOTE.message(format!("construction point `{point}`")));
        }
        for hint in diag.hints() {
            group = group.element(Level::HELP.message(hint.as_str()));
        }
        vec![group]
    }
}

fn level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

/// Zero-width ranges widen to one byte so the caret has something to point at.
fn clamp(range: TextRange, limit: usize) -> std::ops::Range<usize> {
    let start = usize::from(range.start()).min(limit);
    let end = usize::from(range.end()).min(limit);
    if start == end {
        return start..(start + 1).min(limit);
    }
    start..end
}
