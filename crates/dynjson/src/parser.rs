//! Converts interchange text into a runtime [`Value`].
//!
//! The parser is an explicit-stack state machine rather than a recursive
//! descent: the value being scanned is the active [`Frame`] and every open
//! container around it is suspended on a `Vec`, so memory grows with nesting
//! depth only and the host call stack is never involved. The depth is capped
//! by [`ParseOptions::max_depth`].
//!
//! # Key design decisions
//!
//! - **Assignment on completion**: a member is written into its container only
//!   when its frame completes. Objects therefore see keys in source order, and
//!   a reviver always receives fully built (and already revived) children.
//! - **First-member fall-through**: right after `{` or `[` the container frame
//!   pushes its first member frame without consuming anything; every later
//!   member needs a `,`. `[1 2]` and `[1,]` are both rejected.
//! - **UTF-16 positions**: input is scanned as UTF-16 code units so string
//!   values keep lone surrogates from `\u` escapes, and error positions are
//!   code-unit offsets.

use tracing::{debug, trace};

use crate::error::{Error, Result, SyntaxErrorKind};
use crate::lexer::{
    self, COLON, COMMA, LEFT_BRACE, LEFT_BRACKET, MINUS, QUOTE, RIGHT_BRACE, RIGHT_BRACKET,
};
use crate::options::ParseOptions;
use crate::value::{ArrayRef, Callable, JsString, ObjectRef, Value};

/// Parse interchange text into a value with default options and no reviver.
pub fn parse(text: &str) -> Result<Value> {
    parse_with(text, None, &ParseOptions::default())
}

/// Parse interchange text, passing every produced value through `reviver`.
///
/// The reviver is called as `reviver(key, value)` with the containing object
/// or array as receiver, innermost values first. Returning
/// [`Value::Undefined`] removes the member; any other result replaces it.
pub fn parse_with_reviver(text: &str, reviver: &Callable) -> Result<Value> {
    parse_with(text, Some(reviver), &ParseOptions::default())
}

pub fn parse_with(text: &str, reviver: Option<&Callable>, options: &ParseOptions) -> Result<Value> {
    let units: Vec<u16> = text.encode_utf16().collect();
    parse_units(&units, reviver, options)
}

/// Parse text already held as UTF-16 code units (e.g. a [`JsString`]).
pub fn parse_units(
    units: &[u16],
    reviver: Option<&Callable>,
    options: &ParseOptions,
) -> Result<Value> {
    trace!(len = units.len(), reviver = reviver.is_some(), "parse");
    let result = Parser::new(units, reviver, options.max_depth).run();
    if let Err(err) = &result {
        match err {
            Error::Syntax { kind, position } => {
                debug!(category = kind.category(), position, "parse failed");
            }
            other => debug!(error = %other, "parse failed"),
        }
    }
    result
}

/// An open container, shared between its own frame and its members' slots.
#[derive(Debug, Clone)]
enum Container {
    Object(ObjectRef),
    Array(ArrayRef),
}

#[derive(Debug, Clone)]
enum FrameState {
    AwaitingValue,
    AwaitingName,
    Inside(Container),
    Complete,
}

/// Where a frame's value goes once it completes.
enum Slot {
    Root,
    Member { holder: ObjectRef, name: JsString },
    Element { holder: ArrayRef, index: usize },
}

impl Slot {
    /// The key handed to the reviver: `""`, the member name, or the index as a string.
    fn key(&self) -> Value {
        match self {
            Slot::Root => Value::String(JsString::default()),
            Slot::Member { name, .. } => Value::String(name.clone()),
            Slot::Element { index, .. } => Value::from(index.to_string()),
        }
    }

    fn receiver(&self) -> Value {
        match self {
            Slot::Root => Value::Undefined,
            Slot::Member { holder, .. } => Value::Object(holder.clone()),
            Slot::Element { holder, .. } => Value::Array(holder.clone()),
        }
    }
}

/// One value under construction.
struct Frame {
    slot: Slot,
    /// Set once the frame is `Complete`.
    value: Value,
    /// Members started so far; also tells the first member from later ones.
    element_count: usize,
    state: FrameState,
}

impl Frame {
    fn new(slot: Slot, state: FrameState) -> Self {
        Self {
            slot,
            value: Value::Undefined,
            element_count: 0,
            state,
        }
    }

    /// Stands in for the root once it has been handed out.
    fn finished() -> Self {
        Self::new(Slot::Root, FrameState::Complete)
    }
}

struct Parser<'a> {
    units: &'a [u16],
    pos: usize,
    active: Frame,
    /// Open containers enclosing `active`, outermost first.
    suspended: Vec<Frame>,
    reviver: Option<&'a Callable>,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(units: &'a [u16], reviver: Option<&'a Callable>, max_depth: usize) -> Self {
        Self {
            units,
            pos: 0,
            active: Frame::new(Slot::Root, FrameState::AwaitingValue),
            suspended: Vec::new(),
            reviver,
            max_depth,
        }
    }

    fn run(mut self) -> Result<Value> {
        loop {
            self.skip_separators();
            match self.active.state.clone() {
                FrameState::AwaitingValue => self.scan_value()?,
                FrameState::AwaitingName => self.scan_name()?,
                FrameState::Inside(container) => self.scan_delimiter(container)?,
                FrameState::Complete => {
                    if let Some(root) = self.complete()? {
                        // Only separators may follow the root.
                        self.skip_separators();
                        if self.pos < self.units.len() {
                            return Err(self.unexpected_token());
                        }
                        return Ok(root);
                    }
                }
            }
        }
    }

    fn skip_separators(&mut self) {
        self.pos = lexer::skip_separators(self.units, self.pos);
    }

    fn peek(&self) -> Option<u16> {
        self.units.get(self.pos).copied()
    }

    fn unexpected_token(&self) -> Error {
        Error::syntax(SyntaxErrorKind::UnexpectedToken, self.pos)
    }

    fn unexpected_end(&self) -> Error {
        Error::syntax(SyntaxErrorKind::UnexpectedEnd, self.units.len())
    }

    /// Error for a token that is not allowed here, or for running out of input.
    fn unexpected(&self) -> Error {
        if self.pos >= self.units.len() {
            self.unexpected_end()
        } else {
            self.unexpected_token()
        }
    }

    /// The active frame is waiting for a value: dispatch on its first character.
    fn scan_value(&mut self) -> Result<()> {
        let Some(unit) = self.peek() else {
            return Err(self.unexpected_end());
        };

        let value = match unit {
            QUOTE => {
                let (s, end) = lexer::scan_string(self.units, self.pos)?;
                self.pos = end;
                Value::String(s)
            }
            LEFT_BRACE => return self.open(Container::Object(ObjectRef::new())),
            LEFT_BRACKET => return self.open(Container::Array(ArrayRef::new())),
            MINUS if !self.units.get(self.pos + 1).is_some_and(|&u| lexer::is_digit(u)) => {
                self.pos += 1;
                return Err(self.unexpected());
            }
            u if u == MINUS || lexer::is_digit(u) => {
                let (n, end) = lexer::scan_number(self.units, self.pos)?;
                self.pos = end;
                Value::Number(n)
            }
            _ => self.scan_keyword()?,
        };

        self.active.value = value;
        self.active.state = FrameState::Complete;
        Ok(())
    }

    fn scan_keyword(&mut self) -> Result<Value> {
        for (word, value) in [
            ("null", Value::Null),
            ("true", Value::Boolean(true)),
            ("false", Value::Boolean(false)),
        ] {
            if lexer::match_keyword(self.units, self.pos, word) {
                self.pos += word.len();
                return Ok(value);
            }
        }
        Err(self.unexpected_token())
    }

    /// Turns the active frame into an open container.
    fn open(&mut self, container: Container) -> Result<()> {
        // Opening makes `suspended.len() + 1` open containers.
        if self.suspended.len() >= self.max_depth {
            return Err(Error::DepthLimit {
                limit: self.max_depth,
            });
        }
        self.pos += 1;
        self.active.state = FrameState::Inside(container);
        Ok(())
    }

    /// The active frame is an object member waiting for its name and `:`.
    fn scan_name(&mut self) -> Result<()> {
        if self.peek() != Some(QUOTE) {
            return Err(self.unexpected());
        }
        let (name, end) = lexer::scan_string(self.units, self.pos)?;
        self.pos = end;

        self.skip_separators();
        if self.peek() != Some(COLON) {
            return Err(self.unexpected());
        }
        self.pos += 1;

        if let Slot::Member { name: slot_name, .. } = &mut self.active.slot {
            *slot_name = name;
        }
        self.active.state = FrameState::AwaitingValue;
        Ok(())
    }

    /// The active frame is an open container: expect a separator, its closing
    /// delimiter, or (only before the first member) the start of a member.
    fn scan_delimiter(&mut self, container: Container) -> Result<()> {
        let Some(unit) = self.peek() else {
            return Err(self.unexpected_end());
        };
        let first = self.active.element_count == 0;

        match (container, unit) {
            (Container::Array(array), RIGHT_BRACKET) => {
                self.pos += 1;
                // Members removed by the reviver stay as trailing holes.
                array.set_len(self.active.element_count);
                self.close(Value::Array(array));
                Ok(())
            }
            (Container::Object(object), RIGHT_BRACE) => {
                self.pos += 1;
                self.close(Value::Object(object));
                Ok(())
            }
            (container, COMMA) if !first => {
                self.pos += 1;
                self.push_member(container);
                Ok(())
            }
            (container, _) if first => {
                self.push_member(container);
                Ok(())
            }
            _ => Err(self.unexpected_token()),
        }
    }

    fn close(&mut self, value: Value) {
        self.active.value = value;
        self.active.state = FrameState::Complete;
    }

    /// Suspends the active container and starts a frame for its next member.
    fn push_member(&mut self, container: Container) {
        let index = self.active.element_count;
        self.active.element_count += 1;
        let member = match container {
            Container::Object(holder) => Frame::new(
                Slot::Member {
                    holder,
                    name: JsString::default(),
                },
                FrameState::AwaitingName,
            ),
            Container::Array(holder) => {
                Frame::new(Slot::Element { holder, index }, FrameState::AwaitingValue)
            }
        };
        let container = std::mem::replace(&mut self.active, member);
        self.suspended.push(container);
    }

    /// Finishes the active frame: runs the reviver and stores the result in
    /// the container, whose frame becomes active again. Returns the document
    /// value once the root completes.
    fn complete(&mut self) -> Result<Option<Value>> {
        let parent = self.suspended.pop().unwrap_or_else(Frame::finished);
        let frame = std::mem::replace(&mut self.active, parent);

        let value = match self.reviver {
            Some(reviver) => {
                let key = frame.slot.key();
                reviver.call(&frame.slot.receiver(), &[key, frame.value])?
            }
            None => frame.value,
        };

        match frame.slot {
            Slot::Root => return Ok(Some(value)),
            Slot::Member { holder, name } => {
                if value.is_undefined() {
                    holder.delete(&name);
                } else {
                    holder.set(name, value);
                }
            }
            Slot::Element { holder, index } => {
                if value.is_undefined() {
                    holder.delete(index);
                } else {
                    holder.set(index, value);
                }
            }
        }
        Ok(None)
    }
}
