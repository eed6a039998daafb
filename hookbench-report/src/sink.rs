//! Output Sinks
//!
//! Line-oriented writers with a known width. Report code only names the
//! emphasis it wants; turning that into ANSI styling is the sink's job.

use console::style;
use std::io::{self, Write};

/// Semantic styling for a span of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    /// Regular text
    Plain,
    /// De-emphasized text (file names, missing values)
    Muted,
    /// Highlighted text (measured values)
    Strong,
}

/// Destination for report text
pub trait Sink {
    /// Write `text` without a trailing newline
    fn write(&mut self, text: &str, emphasis: Emphasis) -> io::Result<()>;

    /// Usable line width in columns
    fn width(&self) -> usize;

    /// Write `text` followed by a newline
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.write(text, Emphasis::Plain)?;
        self.write("\n", Emphasis::Plain)
    }

    /// Full-width separator with a centred title: `----- title -----`
    fn write_sep(&mut self, sep: char, title: &str) -> io::Result<()> {
        let line = separator_line(sep, title, self.width());
        self.write_line(&line)
    }
}

/// Separator with `title` centred in `width` columns
pub fn separator_line(sep: char, title: &str, width: usize) -> String {
    let fill = width.saturating_sub(title.chars().count() + 2) / 2;
    let half: String = std::iter::repeat_n(sep, fill).collect();
    let mut line = format!("{} {} {}", half, title, half);
    if line.chars().count() < width {
        line.push(sep);
    }
    line
}

/// Sink over any writer, optionally styled with ANSI escapes
pub struct TerminalSink<W: Write> {
    out: W,
    width: usize,
    color: bool,
}

impl<W: Write> TerminalSink<W> {
    /// Wrap `out`, laying out to `width` columns
    pub fn new(out: W, width: usize, color: bool) -> Self {
        Self { out, width, color }
    }

    /// Whether ANSI styling is emitted
    pub fn color(&self) -> bool {
        self.color
    }

    /// Flush and return the writer
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl TerminalSink<io::Stdout> {
    /// Sink on stdout
    pub fn stdout(width: usize, color: bool) -> Self {
        Self::new(io::stdout(), width, color)
    }
}

impl<W: Write> Sink for TerminalSink<W> {
    fn write(&mut self, text: &str, emphasis: Emphasis) -> io::Result<()> {
        if !self.color {
            return self.out.write_all(text.as_bytes());
        }

        let styled = style(text).force_styling(true);
        match emphasis {
            Emphasis::Plain => self.out.write_all(text.as_bytes()),
            Emphasis::Muted => write!(self.out, "{}", styled.dim().white()),
            Emphasis::Strong => write!(self.out, "{}", styled.bold().white()),
        }
    }

    fn width(&self) -> usize {
        self.width
    }
}

/// In-memory sink keeping emphasis alongside the text
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    width: usize,
    spans: Vec<(Emphasis, String)>,
}

impl BufferSink {
    /// Empty buffer laid out to `width` columns
    pub fn new(width: usize) -> Self {
        Self {
            width,
            spans: Vec::new(),
        }
    }

    /// Everything written, without styling
    pub fn text(&self) -> String {
        self.spans.iter().map(|(_, text)| text.as_str()).collect()
    }

    /// Text written with the given emphasis, span by span
    pub fn spans_with(&self, emphasis: Emphasis) -> Vec<&str> {
        self.spans
            .iter()
            .filter(|(e, _)| *e == emphasis)
            .map(|(_, text)| text.as_str())
            .collect()
    }

    /// Written text split into lines
    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }
}

impl Sink for BufferSink {
    fn write(&mut self, text: &str, emphasis: Emphasis) -> io::Result<()> {
        self.spans.push((emphasis, text.to_string()));
        Ok(())
    }

    fn width(&self) -> usize {
        self.width
    }
}
