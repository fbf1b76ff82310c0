use crate::constants::DEFAULT_EVENT_CAPACITY;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::{self, Receiver, Sender};

/// Notifications fired synchronously from inside a read call.
///
/// Neither hook influences control flow; they exist so collaborators can
/// watch the stream.
pub trait StreamObserver: Send {
    /// `bytes` fresh bytes were just pulled from the source.
    fn source_read(&mut self, _bytes: usize) {}

    /// The source and the stretcher tail are exhausted. Fired once per stream.
    fn end_of_stream(&mut self) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StreamObserver for NoopObserver {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    SourceRead { bytes: usize },
    EndOfStream,
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<StreamEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<StreamEvent>(capacity);
        Self { tx }
    }

    pub fn send(&self, event: StreamEvent) {
        // No subscribers is the normal case when nobody is watching
        if self.tx.receiver_count() == 0 {
            return;
        }

        if let Err(e) = self.tx.send(event) {
            error!("Error while sending event: {:?}", e);
        }
    }

    pub fn subscribe(&self) -> Subscriber {
        Subscriber::new(self.tx.subscribe())
    }
}

impl StreamObserver for EventBus {
    fn source_read(&mut self, bytes: usize) {
        self.send(StreamEvent::SourceRead { bytes });
    }

    fn end_of_stream(&mut self) {
        self.send(StreamEvent::EndOfStream);
    }
}

pub struct Subscriber {
    rx: Receiver<StreamEvent>,
}

impl Subscriber {
    pub fn new(rx: Receiver<StreamEvent>) -> Self {
        Self { rx }
    }

    pub fn try_recv(&mut self) -> Result<StreamEvent, TryRecvError> {
        self.rx.try_recv()
    }

    pub async fn recv(&mut self) -> Option<StreamEvent> {
        loop {
            let event = self.rx.recv().await;

            match event {
                Ok(event) => break Some(event),
                Err(RecvError::Closed) => break None,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("EventBus::Subscriber lagging behind stream, skipping {skipped} events");
                }
            }
        }
    }

    /// Everything queued right now, without waiting.
    pub fn drain(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("EventBus::Subscriber lagging behind stream, skipping {skipped} events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        events
    }
}

pub fn debug(bus: &EventBus) {
    let mut subscriber = bus.subscribe();
    tokio::spawn(async move {
        while let Some(event) = subscriber.recv().await {
            if matches!(event, StreamEvent::SourceRead { .. }) {
                trace!("Received event: {:?}", event);
            } else {
                debug!("Received event: {:?}", event);
            }
        }
    });
}
