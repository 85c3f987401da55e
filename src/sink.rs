//! Consumers of connection events.
//!
//! The engine reports through the narrow [`EventSink`] contract and never
//! inspects a sink's state. `ConnectionMap` is the coordinator's view of
//! current links; the other sinks record, log, or serialize events.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::ecs::events::LinkEvent;
use crate::ecs::time::SimTime;
use crate::error::SinkError;
use crate::id::AgentId;

/// Receiver of connection events, called from the delivery phase of a tick.
pub trait EventSink: Send {
    /// Consume one event. Errors are logged by the engine and otherwise ignored.
    fn handle(&mut self, event: &LinkEvent) -> Result<(), SinkError>;

    /// Called once per tick after all of the tick's events. Default: no-op.
    fn tick_completed(&mut self, now: SimTime) -> Result<(), SinkError> {
        let _ = now;
        Ok(())
    }
}

/// Current links as a receiver -> emitter map.
///
/// A `Connected` overwrites any stale entry for the receiver; a `Disconnected`
/// removes it. Both are idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionMap {
    connections: BTreeMap<AgentId, AgentId>,
}

impl ConnectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &LinkEvent) {
        match event {
            LinkEvent::Connected {
                receiver, emitter, ..
            } => {
                self.connections.insert(receiver.clone(), emitter.clone());
            }
            LinkEvent::Disconnected { receiver, .. } => {
                self.connections.remove(receiver);
            }
        }
    }

    pub fn emitter_for(&self, receiver: &AgentId) -> Option<&AgentId> {
        self.connections.get(receiver)
    }

    pub fn connections(&self) -> &BTreeMap<AgentId, AgentId> {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl fmt::Display for ConnectionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (receiver, emitter)) in self.connections.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{receiver} -> {emitter}")?;
        }
        f.write_str("}")
    }
}

impl EventSink for ConnectionMap {
    fn handle(&mut self, event: &LinkEvent) -> Result<(), SinkError> {
        self.apply(event);
        Ok(())
    }
}

/// Keeps every event and every completed tick time, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRecorder {
    pub events: Vec<LinkEvent>,
    pub completed_ticks: Vec<SimTime>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for EventRecorder {
    fn handle(&mut self, event: &LinkEvent) -> Result<(), SinkError> {
        self.events.push(event.clone());
        Ok(())
    }

    fn tick_completed(&mut self, now: SimTime) -> Result<(), SinkError> {
        self.completed_ticks.push(now);
        Ok(())
    }
}

/// Logs every event through `tracing` and the connection table after each tick.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    map: ConnectionMap,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connections(&self) -> &ConnectionMap {
        &self.map
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &LinkEvent) -> Result<(), SinkError> {
        match event {
            LinkEvent::Connected {
                receiver, emitter, ..
            } => tracing::info!("agent {receiver} connected to {emitter}"),
            LinkEvent::Disconnected { receiver, .. } => {
                tracing::info!("agent {receiver} disconnected")
            }
        }
        self.map.apply(event);
        Ok(())
    }

    fn tick_completed(&mut self, now: SimTime) -> Result<(), SinkError> {
        tracing::debug!(now = now.as_millis(), "current connections: {}", self.map);
        Ok(())
    }
}

/// Writes each event as one JSON object per line.
#[derive(Debug)]
pub struct JsonlSink<W: Write> {
    writer: W,
}

impl JsonlSink<BufWriter<File>> {
    /// Create (or truncate) a JSONL file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> EventSink for JsonlSink<W> {
    fn handle(&mut self, event: &LinkEvent) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn tick_completed(&mut self, _now: SimTime) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// A sink shared between the engine and an observer.
///
/// Clone it, hand one clone to the simulation, and `lock()` the other to read.
#[derive(Debug, Default)]
pub struct SharedSink<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> SharedSink<S> {
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Lock the sink. A panic in another holder does not poison access.
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SharedSink<EventRecorder> {
    pub fn events(&self) -> Vec<LinkEvent> {
        self.lock().events.clone()
    }

    pub fn completed_ticks(&self) -> Vec<SimTime> {
        self.lock().completed_ticks.clone()
    }
}

impl<S: EventSink> EventSink for SharedSink<S> {
    fn handle(&mut self, event: &LinkEvent) -> Result<(), SinkError> {
        self.lock().handle(event)
    }

    fn tick_completed(&mut self, now: SimTime) -> Result<(), SinkError> {
        self.lock().tick_completed(now)
    }
}

/// Forwards every call to each inner sink in order.
///
/// All sinks see every call even if an earlier one fails; the first error is
/// returned.
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<Box<dyn EventSink>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    fn each(
        &mut self,
        mut f: impl FnMut(&mut dyn EventSink) -> Result<(), SinkError>,
    ) -> Result<(), SinkError> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(err) = f(&mut **sink) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl EventSink for FanOut {
    fn handle(&mut self, event: &LinkEvent) -> Result<(), SinkError> {
        self.each(|sink| sink.handle(event))
    }

    fn tick_completed(&mut self, now: SimTime) -> Result<(), SinkError> {
        self.each(|sink| sink.tick_completed(now))
    }
}
