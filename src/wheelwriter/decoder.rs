//! Decoding Wheelwriter bytes into markup events.
//!
//! The decoder is a three-state automaton:
//!
//! - `Text`: bytes are text (EBCDIC) or single-byte control codes.
//! - `InBracket`: collecting a `[2b ... 2b]` bracket.
//! - `PostDecoration`: the previous character was bold or underlined. The
//!   format marks every decorated character with its own prefix code, so
//!   the next byte decides whether the decoration continues. A byte that
//!   is not a decoration code ends all decorations and is then read again
//!   as text.
//!
//! Input may arrive in chunks of any size; everything needed to resume is
//! kept in the [`Decoder`].

use super::accent::{self, Accent, AccentBracket, Selector};
use super::bracket::{BracketBuffer, BracketKind, Title};
use super::codes;
use super::header::FileHeader;
use crate::ebcdic::CodeTable;
use crate::markup::{Attributes, MarkupEvent, MarkupSink, attributes, tags};
use crate::util::hex_dump;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    InBracket,
    PostDecoration,
}

/// Underline style. The typewriter writes only single underlines; the
/// other variants exist for callers driving [`Decoder::set_decoration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underline {
    Single,
    Double,
    Words,
}

impl Underline {
    fn attributes(self) -> Attributes {
        match self {
            Underline::Single => Attributes::new(),
            Underline::Double => attributes([(tags::STYLE_ATTR, "double")]),
            Underline::Words => attributes([(tags::STYLE_ATTR, "words")]),
        }
    }
}

/// Text styling currently open in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoration {
    pub bold: bool,
    pub underline: Option<Underline>,
}

impl Decoration {
    pub const NONE: Decoration = Decoration {
        bold: false,
        underline: None,
    };

    pub fn is_active(&self) -> bool {
        self.bold || self.underline.is_some()
    }

    fn with_bold(self) -> Self {
        Self { bold: true, ..self }
    }

    fn with_underline(self) -> Self {
        Self {
            underline: Some(self.underline.unwrap_or(Underline::Single)),
            ..self
        }
    }
}

/// Configuration for decoding.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Flush pending text before decoration changes and keep `b` around
    /// `u`, producing well-nested markup. Off by default: decoration events
    /// are then emitted exactly where their codes occur.
    pub nested_decorations: bool,
    /// Emit a hex dump comment for every bracket, not just unknown ones.
    pub dump_brackets: bool,
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nested_decorations(mut self, nested: bool) -> Self {
        self.nested_decorations = nested;
        self
    }

    pub fn with_dump_brackets(mut self, dump: bool) -> Self {
        self.dump_brackets = dump;
        self
    }
}

/// Document metadata collected while decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    pub header: Option<FileHeader>,
    pub title: Option<String>,
}

/// Resumable Wheelwriter decoder. One instance decodes one document.
pub struct Decoder {
    config: DecoderConfig,
    table: &'static CodeTable,
    state: State,
    bracket: BracketBuffer,
    decoration: Decoration,
    pending: String,
    brackets_seen: usize,
    /// Stream offset of the next byte, for diagnostics.
    offset: u64,
    info: DocumentInfo,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            table: CodeTable::cp1047(),
            state: State::Text,
            bracket: BracketBuffer::new(),
            decoration: Decoration::NONE,
            pending: String::new(),
            brackets_seen: 0,
            offset: 0,
            info: DocumentInfo::default(),
        }
    }

    /// Header and title seen so far.
    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    pub fn into_info(self) -> DocumentInfo {
        self.info
    }

    /// Decoration currently open.
    pub fn decoration(&self) -> Decoration {
        self.decoration
    }

    /// Decode the next chunk of input.
    pub fn feed<S: MarkupSink + ?Sized>(&mut self, input: &[u8], sink: &mut S) -> Result<(), S::Error> {
        let mut pos = 0;
        while pos < input.len() {
            match self.state {
                State::Text => {
                    self.text_byte(input[pos], sink)?;
                    pos += 1;
                    self.offset += 1;
                }
                State::InBracket => {
                    let consumed = self.bracket.fill(&input[pos..]);
                    pos += consumed;
                    self.offset += consumed as u64;
                    if self.bracket.is_complete() {
                        self.state = self.evaluate_bracket(sink)?;
                    }
                }
                State::PostDecoration => {
                    self.state = State::Text;
                    if self.post_decoration_byte(input[pos], sink)? {
                        pos += 1;
                        self.offset += 1;
                    }
                }
            }
        }
        Ok(())
    }

    /// End the document: dump an unterminated bracket, close decorations
    /// and flush pending text.
    pub fn finish<S: MarkupSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), S::Error> {
        if self.state == State::InBracket {
            let bracket = self.bracket.take();
            log::warn!(
                "input ends inside a bracket of {} bytes; dumped as comment",
                bracket.len()
            );
            sink.comment(&hex_dump(&bracket))?;
        }
        self.state = State::Text;
        self.set_decoration(Decoration::NONE, sink)?;
        self.flush_text(sink)
    }

    /// Change the open decoration, emitting events for what changed.
    pub fn set_decoration<S: MarkupSink + ?Sized>(
        &mut self,
        new: Decoration,
        sink: &mut S,
    ) -> Result<(), S::Error> {
        let old = self.decoration;
        if new == old {
            return Ok(());
        }
        self.decoration = new;

        if self.config.nested_decorations {
            self.flush_text(sink)?;
            let bold_changes = old.bold != new.bold;
            if old.underline.is_some() && (old.underline != new.underline || bold_changes) {
                sink.end_element(tags::UNDERLINE)?;
            }
            if old.bold && !new.bold {
                sink.end_element(tags::BOLD)?;
            }
            if new.bold && !old.bold {
                sink.start_element(tags::BOLD, Attributes::new())?;
            }
            if let Some(underline) = new.underline
                && (old.underline != new.underline || bold_changes)
            {
                sink.start_element(tags::UNDERLINE, underline.attributes())?;
            }
        } else {
            if old.bold != new.bold {
                if new.bold {
                    sink.start_element(tags::BOLD, Attributes::new())?;
                } else {
                    sink.end_element(tags::BOLD)?;
                }
            }
            if old.underline != new.underline {
                if old.underline.is_some() {
                    sink.end_element(tags::UNDERLINE)?;
                }
                if let Some(underline) = new.underline {
                    sink.start_element(tags::UNDERLINE, underline.attributes())?;
                }
            }
        }
        Ok(())
    }

    fn text_byte<S: MarkupSink + ?Sized>(&mut self, byte: u8, sink: &mut S) -> Result<(), S::Error> {
        match byte {
            codes::NUL => {}
            codes::PARAGRAPH => self.break_element(tags::PARAGRAPH, sink)?,
            codes::HARD_PAGE => self.break_element(tags::PAGE, sink)?,
            codes::HARD_LINE => self.break_element(tags::LINE, sink)?,
            codes::UNDERLINE => self.set_decoration(self.decoration.with_underline(), sink)?,
            codes::BOLD => self.set_decoration(self.decoration.with_bold(), sink)?,
            codes::BOLD_UNDERLINE => {
                self.set_decoration(self.decoration.with_bold().with_underline(), sink)?
            }
            codes::HARD_SPACE => self.pending.push('\u{00A0}'),
            codes::SOFT_SPACE => self.pending.push(' '),
            codes::MARKER => {
                self.flush_text(sink)?;
                if self.brackets_seen == 0 {
                    // the header record is fixed-length and may contain 2b
                    self.bracket.start_fixed(codes::FILE_HEADER, codes::HEADER_LEN);
                } else {
                    self.bracket.start();
                }
                self.state = State::InBracket;
            }
            other if codes::is_reserved(other) => {
                log::trace!("dropped code {other:#04x} at offset {}", self.offset);
            }
            other => {
                self.pending.push(self.table.to_char(other));
                if self.decoration.is_active() {
                    self.state = State::PostDecoration;
                }
            }
        }
        Ok(())
    }

    /// Returns whether `byte` was consumed.
    fn post_decoration_byte<S: MarkupSink + ?Sized>(
        &mut self,
        byte: u8,
        sink: &mut S,
    ) -> Result<bool, S::Error> {
        match byte {
            codes::UNDERLINE => {
                if self.decoration.bold {
                    let next = Decoration {
                        bold: false,
                        ..self.decoration.with_underline()
                    };
                    self.set_decoration(next, sink)?;
                }
                Ok(true)
            }
            codes::BOLD => {
                if self.decoration.underline.is_some() {
                    let next = Decoration {
                        bold: true,
                        underline: None,
                    };
                    self.set_decoration(next, sink)?;
                }
                Ok(true)
            }
            codes::BOLD_UNDERLINE => {
                self.set_decoration(self.decoration.with_bold().with_underline(), sink)?;
                Ok(true)
            }
            _ => {
                self.set_decoration(Decoration::NONE, sink)?;
                Ok(false)
            }
        }
    }

    fn break_element<S: MarkupSink + ?Sized>(&mut self, tag: &str, sink: &mut S) -> Result<(), S::Error> {
        self.flush_text(sink)?;
        sink.empty_element(tag, Attributes::new())?;
        sink.line_break()
    }

    fn flush_text<S: MarkupSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), S::Error> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.pending);
        sink.event(MarkupEvent::characters(text))
    }

    /// Interpret the completed bracket and pick the state to continue in.
    fn evaluate_bracket<S: MarkupSink + ?Sized>(&mut self, sink: &mut S) -> Result<State, S::Error> {
        let bracket = self.bracket.take();
        let first = self.brackets_seen == 0;
        self.brackets_seen += 1;
        self.pending.clear();

        let kind = BracketKind::classify(&bracket);
        log::trace!(
            "{kind:?} bracket of {} bytes ending at offset {}",
            bracket.len(),
            self.offset
        );

        let mut next = State::Text;
        let mut dumped = false;
        match kind {
            BracketKind::Accent => next = self.accent(&bracket, sink)?,
            BracketKind::Title => {
                let title = Title::parse(&bracket);
                sink.comment(&title.comment())?;
                sink.comment(&hex_dump(&bracket))?;
                sink.line_break()?;
                self.info.title = Some(title.text);
                dumped = true;
            }
            BracketKind::Tab => {}
            BracketKind::SoftLine => {
                sink.empty_element(tags::LINE, attributes([(tags::TYPE_ATTR, tags::SOFT)]))?;
            }
            BracketKind::FileHeader if first => {
                match FileHeader::parse(&bracket) {
                    Ok(header) => {
                        log::debug!("file header: {}", header.summary().trim());
                        sink.comment(&header.summary())?;
                        self.info.header = Some(header);
                    }
                    Err(e) => log::warn!("{e}"),
                }
                sink.comment(&hex_dump(&bracket))?;
                sink.line_break()?;
                dumped = true;
            }
            BracketKind::FileHeader => {
                log::warn!(
                    "header bracket at offset {} is not the first bracket; dumped as unknown",
                    self.offset
                );
                sink.comment(&hex_dump(&bracket))?;
                dumped = true;
            }
            BracketKind::Unknown(code) => {
                log::warn!(
                    "unknown bracket kind {code:#04x} at offset {}; dumped as comment",
                    self.offset
                );
                sink.comment(&hex_dump(&bracket))?;
                dumped = true;
            }
        }

        if self.config.dump_brackets && !dumped {
            sink.comment(&hex_dump(&bracket))?;
        }
        Ok(next)
    }

    fn accent<S: MarkupSink + ?Sized>(&mut self, bracket: &[u8], sink: &mut S) -> Result<State, S::Error> {
        let Some(fields) = AccentBracket::parse(bracket) else {
            log::warn!("accent bracket of {} bytes is too short", bracket.len());
            sink.comment(&hex_dump(bracket))?;
            return Ok(State::Text);
        };

        let mut next = State::Text;
        if let Some(selector) = fields.selector {
            next = State::PostDecoration;
            let current = self.decoration;
            match selector {
                Selector::Underline => self.set_decoration(current.with_underline(), sink)?,
                Selector::Bold => self.set_decoration(current.with_bold(), sink)?,
                Selector::BoldUnderline => {
                    self.set_decoration(current.with_bold().with_underline(), sink)?
                }
                Selector::Unknown(byte) => {
                    log::debug!("accent decoration selector {byte:#04x} ignored");
                    next = State::Text;
                }
            }
        }

        match accent::compose(fields.base, fields.diacritic) {
            Accent::Composed(ch) => self.pending.push(ch),
            Accent::MicroStep => {}
            Accent::Unresolved { base, diacritic } => {
                log::warn!(
                    "no accent for base {base:#04x} with diacritic {diacritic:#04x} at offset {}",
                    self.offset
                );
                self.pending.push_str(&accent::placeholder(base, diacritic));
            }
        }
        Ok(next)
    }
}
