//! Per-feed state owned by the session.

use std::fmt::Display;

/// What a panel knows about its feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState<T> {
    /// Last successful result. Never cleared by a failure.
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// What a panel should draw.
#[derive(Debug, PartialEq)]
pub enum PanelView<'a, T> {
    Loading,
    Failed(&'a str),
    Ready(&'a T),
}

impl<T> FeedState<T> {
    /// Data wins over errors; a failure only shows while nothing has loaded.
    pub fn view(&self) -> PanelView<'_, T> {
        match (&self.data, &self.error) {
            (Some(data), _) => PanelView::Ready(data),
            (None, _) if self.loading => PanelView::Loading,
            (None, Some(error)) => PanelView::Failed(error),
            (None, None) => PanelView::Loading,
        }
    }

    /// Like [`FeedState::view`], but a refresh in progress hides old data.
    pub fn view_while_refreshing(&self) -> PanelView<'_, T> {
        if self.loading {
            PanelView::Loading
        } else {
            self.view()
        }
    }
}

/// Why a fetch was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Timer-driven; only shows a loading state before the first result.
    Poll,
    /// User asked for it; always shows a loading state.
    Manual,
}

/// Sequence number handed to an in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// A [`FeedState`] plus the guard that keeps overlapping fetches in order.
///
/// Each fetch gets a ticket; a completing fetch is applied only if its ticket
/// is still the latest one issued. An older response that arrives late is
/// dropped instead of overwriting a newer one.
#[derive(Debug)]
pub struct FeedSlot<T> {
    state: FeedState<T>,
    issued: u64,
}

impl<T> Default for FeedSlot<T> {
    fn default() -> Self {
        Self {
            state: FeedState::default(),
            issued: 0,
        }
    }
}

impl<T> FeedSlot<T> {
    /// A slot that shows as loading before its first fetch is even issued.
    pub fn pending() -> Self {
        let mut slot = Self::default();
        slot.state.loading = true;
        slot
    }

    pub fn state(&self) -> &FeedState<T> {
        &self.state
    }

    pub fn begin(&mut self, trigger: Trigger) -> Ticket {
        self.issued += 1;
        if trigger == Trigger::Manual || self.state.data.is_none() {
            self.state.loading = true;
        }
        Ticket(self.issued)
    }

    /// Apply a finished fetch. Returns `false` if it was superseded.
    pub fn complete<E: Display>(&mut self, ticket: Ticket, result: Result<T, E>) -> bool {
        if ticket.0 != self.issued {
            return false;
        }
        self.state.loading = false;
        match result {
            Ok(data) => {
                self.state.data = Some(data);
                self.state.error = None;
            }
            Err(e) => self.state.error = Some(e.to_string()),
        }
        true
    }

    /// Fail the feed outside of a fetch, e.g. when it can never start.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.issued += 1;
        self.state.loading = false;
        self.state.error = Some(message.into());
    }
}
