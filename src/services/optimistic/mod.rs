//! Optimistic values backed by an asynchronous store.
//!
//! A value is shown as soon as a write is started (`Pending`). When the
//! store confirms, it becomes `Committed`; when the store rejects it, the
//! previous value is restored and the failure is kept until acknowledged.
//!
//! Every write carries a generation. Only the write that produced the
//! current proposal can settle it; answers to older writes are reported as
//! superseded.

#[derive(Clone, Debug, PartialEq)]
pub enum Optimistic<T> {
    Committed(T),
    Pending {
        previous: T,
        proposed: T,
        generation: u64,
    },
    Failed {
        previous: T,
        attempted: T,
        error: String,
    },
}

/// How a store answer related to the value it was settling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settled {
    /// The answer settled the current proposal
    Applied,
    /// A newer write is pending; the current proposal was kept
    Superseded,
    /// Nothing was pending for this generation
    NotPending,
}

impl<T: Clone> Optimistic<T> {
    pub fn new(value: T) -> Self {
        Optimistic::Committed(value)
    }

    /// Value to display: the proposal while pending, the rolled-back value
    /// after a failure.
    pub fn current(&self) -> &T {
        match self {
            Optimistic::Committed(value) => value,
            Optimistic::Pending { proposed, .. } => proposed,
            Optimistic::Failed { previous, .. } => previous,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Optimistic::Pending { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Optimistic::Failed { .. })
    }

    /// Generation of the write in flight, if any
    pub fn generation(&self) -> Option<u64> {
        match self {
            Optimistic::Pending { generation, .. } => Some(*generation),
            _ => None,
        }
    }

    /// Start write `generation`. A new proposal replaces any earlier pending
    /// one but keeps the last confirmed value as the rollback target.
    pub fn begin(&mut self, proposed: T, generation: u64) {
        let previous = match self {
            Optimistic::Committed(value) => value.clone(),
            Optimistic::Pending { previous, .. } => previous.clone(),
            Optimistic::Failed { previous, .. } => previous.clone(),
        };
        *self = Optimistic::Pending {
            previous,
            proposed,
            generation,
        };
    }

    /// The store accepted write `generation`, which stored `accepted`.
    ///
    /// If a newer write is pending, `accepted` becomes its rollback target.
    pub fn confirm(&mut self, generation: u64, accepted: T) -> Settled {
        match self {
            Optimistic::Pending {
                proposed,
                generation: pending,
                ..
            } if *pending == generation => {
                *self = Optimistic::Committed(proposed.clone());
                Settled::Applied
            }
            Optimistic::Pending {
                previous,
                generation: pending,
                ..
            } if *pending > generation => {
                *previous = accepted;
                Settled::Superseded
            }
            _ => Settled::NotPending,
        }
    }

    /// The store rejected write `generation`; roll back if it is the
    /// current proposal.
    pub fn fail(&mut self, generation: u64, error: impl Into<String>) -> Settled {
        match self {
            Optimistic::Pending {
                previous,
                proposed,
                generation: pending,
            } if *pending == generation => {
                *self = Optimistic::Failed {
                    previous: previous.clone(),
                    attempted: proposed.clone(),
                    error: error.into(),
                };
                Settled::Applied
            }
            Optimistic::Pending {
                generation: pending,
                ..
            } if *pending > generation => Settled::Superseded,
            _ => Settled::NotPending,
        }
    }

    /// Dismiss a failure, settling on the rolled-back value.
    pub fn acknowledge(&mut self) {
        if let Optimistic::Failed { previous, .. } = self {
            *self = Optimistic::Committed(previous.clone());
        }
    }

    /// Replace the value with fresh store data unless a write is in flight.
    pub fn refresh(&mut self, value: T) {
        match self {
            Optimistic::Pending { previous, .. } => *previous = value,
            _ => *self = Optimistic::Committed(value),
        }
    }
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Message the host UI should surface (e.g. as a toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
