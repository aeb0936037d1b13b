//! UI-facing load states and the stale-response guard shared by fetchers.

use crate::error::FetchFailure;

/// Observable state of one fetched resource.
///
/// Loading, empty, and failed are separate variants so a view can never
/// confuse "still waiting" with "nothing there" or "backend down".
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    /// Nothing requested yet.
    Idle,
    /// A request is in flight; no data is shown.
    Loading,
    /// The request succeeded with no data.
    Empty,
    Ready(T),
    Unavailable(FetchFailure),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Borrow the ready value, if any.
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Unavailable(failure) => Some(failure),
            _ => None,
        }
    }
}

impl<T> Loadable<Vec<T>> {
    /// Wrap a fetched list, mapping an empty list to [`Loadable::Empty`].
    pub fn from_list(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Ready(items)
        }
    }
}

/// Monotonic request counter that lets only the latest request land.
///
/// Each request takes a ticket with [`Generation::begin`]; when its response
/// arrives the caller checks [`Generation::is_current`] and drops the result
/// if a newer request has started since.
#[derive(Debug, Default, Clone, Copy)]
pub struct Generation {
    current: u64,
}

impl Generation {
    /// Start a new request and supersede all earlier ones.
    pub fn begin(&mut self) -> u64 {
        self.current = self.current.wrapping_add(1);
        self.current
    }

    /// Invalidate any in-flight request without starting a new one.
    pub fn invalidate(&mut self) {
        self.current = self.current.wrapping_add(1);
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.current == ticket
    }
}
