/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Correlation of asynchronous calls with their completions.
//!
//! Every asynchronous call gets a [`CorrelationId`] when it is dispatched. The call's
//! result arrives later as a [`Completion`] carrying that same id on the [`Completions`]
//! channel of the object that dispatched it. Each id is delivered exactly once.
//! Completions of different calls arrive in no particular order.

use crate::rest::errors::FlickrError;
use async_stream::stream;
use futures::{FutureExt, Stream};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Identifies one asynchronous call. Unique within the process, carries no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CorrelationId(u64);

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Shared by every correlator so two clients never hand out the same id
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Mints correlation ids. Safe to share between threads.
///
/// All correlators draw from one process-wide counter, so an id is never reused no matter
/// which client allocated it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Correlator;

impl Correlator {
    pub fn new() -> Self {
        Self
    }

    /// Allocates an id that has never been handed out before in this process.
    ///
    /// # Panics
    ///
    /// If the 64 bit id space is used up.
    pub fn begin(&self) -> CorrelationId {
        allocate(&NEXT_ID)
    }
}

fn allocate(counter: &AtomicU64) -> CorrelationId {
    match counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_add(1)) {
        Ok(id) => CorrelationId(id),
        Err(_) => panic!("correlation id space exhausted"),
    }
}

/// Result of one asynchronous call
#[derive(Debug)]
pub enum CallOutcome<T> {
    Success(T),
    Failure(FlickrError),
}

impl<T> CallOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    pub fn map<U>(self, op: impl FnOnce(T) -> U) -> CallOutcome<U> {
        match self {
            CallOutcome::Success(v) => CallOutcome::Success(op(v)),
            CallOutcome::Failure(e) => CallOutcome::Failure(e),
        }
    }

    /// Like [`map`](CallOutcome::map) for conversions that can fail, e.g. parsing a reply
    pub fn and_then<U>(self, op: impl FnOnce(T) -> Result<U, FlickrError>) -> CallOutcome<U> {
        match self {
            CallOutcome::Success(v) => op(v).into(),
            CallOutcome::Failure(e) => CallOutcome::Failure(e),
        }
    }

    pub fn into_result(self) -> Result<T, FlickrError> {
        match self {
            CallOutcome::Success(v) => Ok(v),
            CallOutcome::Failure(e) => Err(e),
        }
    }
}

impl<T> From<Result<T, FlickrError>> for CallOutcome<T> {
    fn from(result: Result<T, FlickrError>) -> Self {
        match result {
            Ok(v) => CallOutcome::Success(v),
            Err(e) => CallOutcome::Failure(e),
        }
    }
}

/// Notification that the call `id` finished
#[derive(Debug)]
pub struct Completion<T> {
    pub id: CorrelationId,
    pub outcome: CallOutcome<T>,
}

impl<T> Completion<T> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Receiving end for the completions of every call dispatched through one facade.
#[derive(Debug)]
pub struct Completions<T> {
    rx: mpsc::UnboundedReceiver<Completion<T>>,
}

impl<T> Completions<T> {
    /// Waits for the next completion. `None` once the dispatching facade and all of its
    /// in-flight calls are gone.
    pub async fn recv(&mut self) -> Option<Completion<T>> {
        self.rx.recv().await
    }

    /// Returns a completion if one is already waiting
    pub fn try_recv(&mut self) -> Option<Completion<T>> {
        self.rx.try_recv().ok()
    }

    pub fn into_stream(mut self) -> impl Stream<Item = Completion<T>> {
        stream! {
            while let Some(completion) = self.rx.recv().await {
                yield completion;
            }
        }
    }
}

// Sending end shared by a facade's clones; runs each call and reports it exactly once
pub(crate) struct Notifier<T> {
    tx: mpsc::UnboundedSender<Completion<T>>,
}

impl<T> Clone for Notifier<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").finish()
    }
}

impl<T: Send + 'static> Notifier<T> {
    pub(crate) fn channel() -> (Notifier<T>, Completions<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier { tx }, Completions { rx })
    }

    /// Allocates an id and spawns `work` on the current tokio runtime.
    ///
    /// On a multi-thread runtime `work` may start before this returns, but its completion
    /// cannot be received before the caller holds the id: it is only readable from the
    /// caller's own [`Completions`]. Whatever `work` resolves to, or a panic inside it, is
    /// sent as the single completion for the returned id.
    pub(crate) fn dispatch<F>(
        &self,
        correlator: &Correlator,
        work: F,
    ) -> Result<CorrelationId, FlickrError>
    where
        F: Future<Output = Result<T, FlickrError>> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            FlickrError::invalid_argument("asynchronous calls need a running tokio runtime")
        })?;
        let id = correlator.begin();
        let tx = self.tx.clone();
        runtime.spawn(async move {
            let outcome = match AssertUnwindSafe(work).catch_unwind().await {
                Ok(result) => CallOutcome::from(result),
                Err(_) => CallOutcome::Failure(FlickrError::Aborted(format!(
                    "call {id} panicked in the transport"
                ))),
            };
            log::debug!("call {id} completed, success: {}", outcome.is_success());
            if tx.send(Completion { id, outcome }).is_err() {
                log::warn!("completion for call {id} dropped, the receiver is gone");
            }
        });
        Ok(id)
    }
}
