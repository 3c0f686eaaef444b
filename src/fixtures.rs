//! Instrumented alternatives that log every lifecycle hook they run.

use allele_internal::{Capabilities, Unsupported};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    CopyConstruct,
    CopyAssign,
    MoveAssign,
    DefaultConstruct,
    Drop(u32),
}

pub(crate) mod journal {
    use super::Event;
    use std::cell::RefCell;

    thread_local! {
        static EVENTS: RefCell<Vec<Event>> = RefCell::new(Vec::new());
    }

    pub(crate) fn record(event: Event) {
        EVENTS.with(|events| events.borrow_mut().push(event));
    }

    pub(crate) fn take() -> Vec<Event> {
        EVENTS.with(|events| events.take())
    }

    pub(crate) fn clear() {
        take();
    }

    pub(crate) fn drops() -> usize {
        EVENTS.with(|events| {
            events
                .borrow()
                .iter()
                .filter(|event| matches!(event, Event::Drop(_)))
                .count()
        })
    }
}

/// Supports everything.
#[derive(Debug, PartialEq)]
pub(crate) struct Tracked(pub(crate) u32);

impl Capabilities for Tracked {
    const COPY_CONSTRUCTIBLE: bool = true;
    const COPY_ASSIGNABLE: bool = true;
    const DEFAULT_CONSTRUCTIBLE: bool = true;

    fn copy_construct(&self) -> Result<Self, Unsupported> {
        journal::record(Event::CopyConstruct);
        Ok(Tracked(self.0))
    }

    fn copy_assign(&mut self, source: &Self) -> Result<(), Unsupported> {
        journal::record(Event::CopyAssign);
        self.0 = source.0;
        Ok(())
    }

    fn move_assign(&mut self, source: Self) {
        journal::record(Event::MoveAssign);
        *self = source;
    }

    fn default_construct() -> Result<Self, Unsupported> {
        journal::record(Event::DefaultConstruct);
        Ok(Tracked(0))
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        journal::record(Event::Drop(self.0));
    }
}

/// Can't be constructed from a value, only assigned over a default.
#[derive(Debug, PartialEq)]
pub(crate) struct OnlyAssign(pub(crate) u32);

impl Capabilities for OnlyAssign {
    const MOVE_CONSTRUCTIBLE: bool = false;
    const COPY_ASSIGNABLE: bool = true;
    const DEFAULT_CONSTRUCTIBLE: bool = true;

    fn copy_assign(&mut self, source: &Self) -> Result<(), Unsupported> {
        journal::record(Event::CopyAssign);
        self.0 = source.0;
        Ok(())
    }

    fn move_assign(&mut self, source: Self) {
        journal::record(Event::MoveAssign);
        *self = source;
    }

    fn default_construct() -> Result<Self, Unsupported> {
        journal::record(Event::DefaultConstruct);
        Ok(OnlyAssign(0))
    }
}

impl Drop for OnlyAssign {
    fn drop(&mut self) {
        journal::record(Event::Drop(self.0));
    }
}

/// Move-only.
#[derive(Debug, PartialEq)]
pub(crate) struct NoCopy(pub(crate) u32);

impl Capabilities for NoCopy {}

impl Drop for NoCopy {
    fn drop(&mut self) {
        journal::record(Event::Drop(self.0));
    }
}

/// Claims a trivial drop it does not have.
#[derive(Debug, PartialEq)]
pub(crate) struct Mislabelled(pub(crate) u32);

impl Capabilities for Mislabelled {
    const TRIVIALLY_DESTRUCTIBLE: bool = true;
}

impl Drop for Mislabelled {
    fn drop(&mut self) {
        journal::record(Event::Drop(self.0));
    }
}

/// Neither moved into place nor default-constructed, so it never fills a slot.
#[derive(Debug, PartialEq)]
pub(crate) struct Immovable(pub(crate) u32);

impl Capabilities for Immovable {
    const MOVE_CONSTRUCTIBLE: bool = false;
}

impl Drop for Immovable {
    fn drop(&mut self) {
        journal::record(Event::Drop(self.0));
    }
}
