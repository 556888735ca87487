//! The JSON grammar state machine shared by the parse and generate paths.
//!
//! [`Grammar`] owns no buffer: it is driven purely by [`GrammarEvent`]s and
//! tracks nesting on a state stack plus one element counter per open
//! container. The events are read/write symmetric, so a [`Parser`] and a
//! [`Generator`] operating on the same document can push events through one
//! shared machine and keep a single consistent view of the structure.
//!
//! [`Parser`]: crate::Parser
//! [`Generator`]: crate::Generator

use std::{cell::RefCell, fmt, rc::Rc};

use crate::error::StructureError;

/// A single nesting/ordering state, held on the machine's stack.
///
/// The innermost state is the stack top. The initial [`Start`] entry is
/// consumed by a top-level container open, so an empty stack means the
/// document is complete.
///
/// [`Start`]: GrammarState::Start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarState {
    /// No event has been seen yet.
    Start,
    /// An object is open and not yet closed.
    ObjectStarted,
    /// Inside an object, before a member name.
    AwaitName,
    /// A member name has been read; a `:` must follow.
    NameRead,
    /// A `:` has been seen; the member value must follow.
    AwaitValue,
    /// A member value has been read.
    ValueRead,
    /// An array is open and not yet closed.
    ArrayStarted,
    /// Inside an array, before an element.
    AwaitElement,
    /// An array element has been read.
    ElementRead,
    /// A bare top-level scalar has been read.
    PlainValueRead,
}

impl fmt::Display for GrammarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "Start",
            Self::ObjectStarted => "ObjectStarted",
            Self::AwaitName => "AwaitName",
            Self::NameRead => "NameRead",
            Self::AwaitValue => "AwaitValue",
            Self::ValueRead => "ValueRead",
            Self::ArrayStarted => "ArrayStarted",
            Self::AwaitElement => "AwaitElement",
            Self::ElementRead => "ElementRead",
            Self::PlainValueRead => "PlainValueRead",
        })
    }
}

/// An abstract grammar event.
///
/// The machine never cares whether a parser or a generator drives it; both
/// sides issue the same events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarEvent {
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// `:` between a member name and its value.
    NameSeparator,
    /// `,` between members or elements.
    ValueSeparator,
    /// A quoted string (member name or string value).
    String,
    /// A number, boolean or null literal.
    Value,
}

impl fmt::Display for GrammarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StartObject => "StartObject",
            Self::EndObject => "EndObject",
            Self::StartArray => "StartArray",
            Self::EndArray => "EndArray",
            Self::NameSeparator => "NameSeparator",
            Self::ValueSeparator => "ValueSeparator",
            Self::String => "String",
            Self::Value => "Value",
        })
    }
}

/// Single-threaded shared handle to a [`Grammar`], for a parser/generator
/// pair operating on the same document.
pub type SharedGrammar = Rc<RefCell<Grammar>>;

/// The JSON grammar state machine.
///
/// Every transition is validated before any state moves, so a rejected event
/// leaves the machine exactly as it was.
#[derive(Debug)]
pub struct Grammar {
    stack: Vec<GrammarState>,
    /// One entry per open container: members/elements read so far. A close
    /// arriving right after a `,` sees a nonzero counter and is rejected.
    counters: Vec<usize>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    /// Creates a machine in the initial [`GrammarState::Start`] state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec![GrammarState::Start],
            counters: Vec::new(),
        }
    }

    /// Wraps the machine in the shared handle a parser/generator pair uses.
    #[must_use]
    pub fn into_shared(self) -> SharedGrammar {
        Rc::new(RefCell::new(self))
    }

    /// The innermost state, or `None` once a top-level container document has
    /// completed.
    #[must_use]
    pub fn current(&self) -> Option<GrammarState> {
        self.stack.last().copied()
    }

    /// Count of containers currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack
            .iter()
            .filter(|s| matches!(s, GrammarState::ObjectStarted | GrammarState::ArrayStarted))
            .count()
    }

    /// Returns the machine to its initial state.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.stack.push(GrammarState::Start);
        self.counters.clear();
    }

    /// Applies one event.
    ///
    /// # Errors
    ///
    /// Returns a [`StructureError`] when the event is illegal in the current
    /// state; the machine is left unchanged.
    pub fn transition(&mut self, event: GrammarEvent) -> Result<(), StructureError> {
        use GrammarState::{
            ArrayStarted, AwaitElement, AwaitName, AwaitValue, ElementRead, NameRead,
            ObjectStarted, PlainValueRead, Start, ValueRead,
        };

        match event {
            GrammarEvent::StartObject => {
                self.open_slot(event)?;
                self.stack.push(ObjectStarted);
                self.stack.push(AwaitName);
                self.counters.push(0);
            }
            GrammarEvent::StartArray => {
                self.open_slot(event)?;
                self.stack.push(ArrayStarted);
                self.stack.push(AwaitElement);
                self.counters.push(0);
            }
            GrammarEvent::EndObject => {
                match self.current() {
                    Some(ValueRead) => {}
                    Some(AwaitName) => {
                        // Legal only for an empty object; a nonzero counter
                        // means a `,` put us here.
                        if self.counters.last().is_some_and(|c| *c > 0) {
                            return Err(StructureError::DanglingSeparator);
                        }
                    }
                    Some(state) => {
                        return Err(StructureError::InvalidTransition { state, event });
                    }
                    None => return Err(StructureError::DocumentComplete { event }),
                }
                self.close_container(ObjectStarted)?;
            }
            GrammarEvent::EndArray => {
                match self.current() {
                    Some(ElementRead) => {}
                    Some(AwaitElement) => {
                        if self.counters.last().is_some_and(|c| *c > 0) {
                            return Err(StructureError::DanglingSeparator);
                        }
                    }
                    Some(state) => {
                        return Err(StructureError::InvalidTransition { state, event });
                    }
                    None => return Err(StructureError::DocumentComplete { event }),
                }
                self.close_container(ArrayStarted)?;
            }
            GrammarEvent::NameSeparator => match self.current() {
                Some(NameRead) => self.swap(AwaitValue),
                Some(state) => return Err(StructureError::InvalidTransition { state, event }),
                None => return Err(StructureError::DocumentComplete { event }),
            },
            GrammarEvent::ValueSeparator => match self.current() {
                Some(ValueRead) => self.swap(AwaitName),
                Some(ElementRead) => self.swap(AwaitElement),
                Some(state) => return Err(StructureError::InvalidTransition { state, event }),
                None => return Err(StructureError::DocumentComplete { event }),
            },
            GrammarEvent::String => match self.current() {
                Some(AwaitName) => {
                    self.swap(NameRead);
                    self.bump_counter();
                }
                Some(AwaitValue) => self.swap(ValueRead),
                Some(AwaitElement) => {
                    self.swap(ElementRead);
                    self.bump_counter();
                }
                Some(Start) => self.swap(PlainValueRead),
                Some(state) => return Err(StructureError::InvalidTransition { state, event }),
                None => return Err(StructureError::DocumentComplete { event }),
            },
            GrammarEvent::Value => match self.current() {
                Some(AwaitValue) => self.swap(ValueRead),
                Some(AwaitElement) => {
                    self.swap(ElementRead);
                    self.bump_counter();
                }
                Some(state) => return Err(StructureError::InvalidTransition { state, event }),
                None => return Err(StructureError::DocumentComplete { event }),
            },
        }

        Ok(())
    }

    /// Resolves the enclosing slot before a container open: the container
    /// becomes the pending member value or array element, or consumes the
    /// initial `Start` entry at top level.
    fn open_slot(&mut self, event: GrammarEvent) -> Result<(), StructureError> {
        match self.current() {
            Some(GrammarState::AwaitValue) => self.swap(GrammarState::ValueRead),
            Some(GrammarState::AwaitElement) => {
                self.swap(GrammarState::ElementRead);
                self.bump_counter();
            }
            Some(GrammarState::Start) => {
                self.stack.pop();
            }
            Some(state) => return Err(StructureError::InvalidTransition { state, event }),
            None => return Err(StructureError::DocumentComplete { event }),
        }
        Ok(())
    }

    /// Pops the slot state and the container state below it, which must be
    /// `expected`. Validated before anything is popped.
    fn close_container(&mut self, expected: GrammarState) -> Result<(), StructureError> {
        let below = self
            .stack
            .len()
            .checked_sub(2)
            .and_then(|i| self.stack.get(i))
            .copied();
        match below {
            Some(found) if found == expected => {
                self.stack.pop();
                self.stack.pop();
                self.counters.pop();
                Ok(())
            }
            Some(found) => Err(StructureError::UnbalancedClose { expected, found }),
            None => Err(StructureError::UnbalancedClose {
                expected,
                // Stack bottom reached; report what is left.
                found: self.current().unwrap_or(GrammarState::Start),
            }),
        }
    }

    fn swap(&mut self, state: GrammarState) {
        self.stack.pop();
        self.stack.push(state);
    }

    fn bump_counter(&mut self) {
        if let Some(counter) = self.counters.last_mut() {
            *counter += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Grammar, GrammarEvent::*, GrammarState};

    #[test]
    fn depth_tracks_open_containers() {
        let mut g = Grammar::new();
        assert_eq!(g.depth(), 0);
        g.transition(StartObject).unwrap();
        g.transition(String).unwrap();
        g.transition(NameSeparator).unwrap();
        g.transition(StartArray).unwrap();
        assert_eq!(g.depth(), 2);
        g.transition(EndArray).unwrap();
        assert_eq!(g.depth(), 1);
        g.transition(EndObject).unwrap();
        assert_eq!(g.depth(), 0);
        assert_eq!(g.current(), None);
    }

    #[test]
    fn failed_transition_leaves_machine_unchanged() {
        let mut g = Grammar::new();
        g.transition(StartObject).unwrap();
        assert_eq!(g.current(), Some(GrammarState::AwaitName));
        assert!(g.transition(Value).is_err());
        assert_eq!(g.current(), Some(GrammarState::AwaitName));
        assert_eq!(g.depth(), 1);
        // Still usable after the rejection.
        g.transition(String).unwrap();
        assert_eq!(g.current(), Some(GrammarState::NameRead));
    }

    #[test]
    fn reset_restores_the_initial_state() {
        let mut g = Grammar::new();
        g.transition(StartArray).unwrap();
        g.transition(Value).unwrap();
        g.reset();
        assert_eq!(g.current(), Some(GrammarState::Start));
        assert_eq!(g.depth(), 0);
        g.transition(StartObject).unwrap();
    }
}
