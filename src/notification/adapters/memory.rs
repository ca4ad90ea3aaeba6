//! In-memory broker and handler adapters for notification tests.

use crate::notification::{
    domain::{ConsumerTag, Notification, QueueName},
    ports::{
        DeliveryAcker, DeliveryContext, DeliveryStream, InboundDelivery, MessageChannel,
        MessageChannelError, MessageChannelResult, NotificationHandler, OutboundMessage,
    },
};
use async_trait::async_trait;
use futures::{
    StreamExt,
    channel::mpsc::{UnboundedSender, unbounded},
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// A message accepted by [`InMemoryBroker::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Routing queue.
    pub queue: QueueName,
    /// Message as handed to the broker.
    pub message: OutboundMessage,
}

/// In-memory broker channel.
///
/// Models queue declaration, default-exchange routing, manual
/// acknowledgement, consumer cancellation and channel closure without a
/// network connection. Publishing to an undeclared queue is accepted and the
/// message dropped, as an AMQP broker does for unroutable messages.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
}

#[derive(Debug, Default)]
struct BrokerState {
    queues: HashMap<QueueName, VecDeque<OutboundMessage>>,
    consumers: Vec<ActiveConsumer>,
    held: Vec<ActiveConsumer>,
    published: Vec<PublishedMessage>,
    acknowledged: Vec<u64>,
    cancelled: Vec<ConsumerTag>,
    declarations: usize,
    failing_publishes: usize,
    failing_acks: HashSet<u64>,
    hold_on_cancel: bool,
    reject_consume: bool,
    closed: bool,
    last_delivery_tag: u64,
}

#[derive(Debug)]
struct ActiveConsumer {
    queue: QueueName,
    tag: ConsumerTag,
    sender: UnboundedSender<MessageChannelResult<InboundDelivery>>,
}

fn lock_error(err: impl ToString) -> MessageChannelError {
    MessageChannelError::broker(std::io::Error::other(err.to_string()))
}

impl InMemoryBroker {
    /// Creates an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MessageChannelResult<MutexGuard<'_, BrokerState>> {
        self.state.lock().map_err(lock_error)
    }

    /// Makes the next `count` publishes fail with a broker error.
    ///
    /// # Errors
    ///
    /// Returns a broker error when lock acquisition fails.
    pub fn fail_next_publishes(&self, count: usize) -> MessageChannelResult<()> {
        self.lock()?.failing_publishes = count;
        Ok(())
    }

    /// Makes the acknowledgement of `delivery_tag` fail once.
    ///
    /// # Errors
    ///
    /// Returns a broker error when lock acquisition fails.
    pub fn fail_ack_for(&self, delivery_tag: u64) -> MessageChannelResult<()> {
        self.lock()?.failing_acks.insert(delivery_tag);
        Ok(())
    }

    /// Keeps delivery streams open after cancellation, simulating a broker
    /// that never confirms the cancel.
    ///
    /// # Errors
    ///
    /// Returns a broker error when lock acquisition fails.
    pub fn hold_streams_on_cancel(&self) -> MessageChannelResult<()> {
        self.lock()?.hold_on_cancel = true;
        Ok(())
    }

    /// Makes subsequent `consume` calls fail.
    ///
    /// # Errors
    ///
    /// Returns a broker error when lock acquisition fails.
    pub fn reject_consume(&self) -> MessageChannelResult<()> {
        self.lock()?.reject_consume = true;
        Ok(())
    }

    /// Returns every message accepted for publication, in order.
    ///
    /// # Errors
    ///
    /// Returns a broker error when lock acquisition fails.
    pub fn published(&self) -> MessageChannelResult<Vec<PublishedMessage>> {
        Ok(self.lock()?.published.clone())
    }

    /// Returns the delivery tags acknowledged so far.
    ///
    /// # Errors
    ///
    /// Returns a broker error when lock acquisition fails.
    pub fn acknowledged(&self) -> MessageChannelResult<Vec<u64>> {
        Ok(self.lock()?.acknowledged.clone())
    }

    /// Returns the consumer tags cancelled so far.
    ///
    /// # Errors
    ///
    /// Returns a broker error when lock acquisition fails.
    pub fn cancelled(&self) -> MessageChannelResult<Vec<ConsumerTag>> {
        Ok(self.lock()?.cancelled.clone())
    }

    /// Returns how many times a queue was declared.
    ///
    /// # Errors
    ///
    /// Returns a broker error when lock acquisition fails.
    pub fn declarations(&self) -> MessageChannelResult<usize> {
        Ok(self.lock()?.declarations)
    }

    /// Returns the number of messages waiting in `queue` for a consumer.
    ///
    /// # Errors
    ///
    /// Returns a broker error when lock acquisition fails.
    pub fn queue_depth(&self, queue: &QueueName) -> MessageChannelResult<usize> {
        Ok(self.lock()?.queues.get(queue).map_or(0, VecDeque::len))
    }

    /// Returns whether the channel has been closed.
    ///
    /// # Errors
    ///
    /// Returns a broker error when lock acquisition fails.
    pub fn is_closed(&self) -> MessageChannelResult<bool> {
        Ok(self.lock()?.closed)
    }

    fn acker(&self, delivery_tag: u64) -> Box<dyn DeliveryAcker> {
        Box::new(InMemoryAcker {
            state: Arc::clone(&self.state),
            delivery_tag,
        })
    }

    fn next_delivery(&self, state: &mut BrokerState, message: OutboundMessage) -> InboundDelivery {
        state.last_delivery_tag = state.last_delivery_tag.saturating_add(1);
        let delivery_tag = state.last_delivery_tag;
        InboundDelivery::new(
            delivery_tag,
            Some(message.content_type),
            message.body,
            self.acker(delivery_tag),
        )
    }

    /// Hands `message` to the first live consumer of `queue`, or leaves it
    /// queued when none is attached.
    fn route(&self, state: &mut BrokerState, queue: &QueueName, message: OutboundMessage) {
        state.consumers.retain(|consumer| !consumer.sender.is_closed());
        let target = state
            .consumers
            .iter()
            .position(|consumer| &consumer.queue == queue);
        let Some(index) = target else {
            if let Some(backlog) = state.queues.get_mut(queue) {
                backlog.push_back(message);
            }
            return;
        };
        let delivery = self.next_delivery(state, message);
        if let Some(consumer) = state.consumers.get(index) {
            // A receiver dropped between the retain and here loses the message,
            // which matches an unacknowledged delivery on a dead consumer.
            if consumer.sender.unbounded_send(Ok(delivery)).is_err() {
                state.consumers.remove(index);
            }
        }
    }
}

#[async_trait]
impl MessageChannel for InMemoryBroker {
    async fn declare_queue(&self, queue: &QueueName) -> MessageChannelResult<()> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(MessageChannelError::Closed);
        }
        state.declarations = state.declarations.saturating_add(1);
        state.queues.entry(queue.clone()).or_default();
        Ok(())
    }

    async fn publish(
        &self,
        queue: &QueueName,
        message: &OutboundMessage,
    ) -> MessageChannelResult<()> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(MessageChannelError::Closed);
        }
        if state.failing_publishes > 0 {
            state.failing_publishes -= 1;
            return Err(MessageChannelError::broker(std::io::Error::other(
                "injected publish failure",
            )));
        }
        state.published.push(PublishedMessage {
            queue: queue.clone(),
            message: message.clone(),
        });
        if state.queues.contains_key(queue) {
            self.route(&mut state, queue, message.clone());
        }
        Ok(())
    }

    async fn consume(
        &self,
        queue: &QueueName,
        tag: &ConsumerTag,
    ) -> MessageChannelResult<DeliveryStream> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(MessageChannelError::Closed);
        }
        if state.reject_consume {
            return Err(MessageChannelError::broker(std::io::Error::other(
                "consume rejected",
            )));
        }
        let backlog: Vec<OutboundMessage> = state
            .queues
            .get_mut(queue)
            .ok_or_else(|| {
                MessageChannelError::broker(std::io::Error::other(format!(
                    "no queue '{queue}'"
                )))
            })?
            .drain(..)
            .collect();

        let (sender, receiver) = unbounded();
        for message in backlog {
            let delivery = self.next_delivery(&mut state, message);
            sender.unbounded_send(Ok(delivery)).map_err(lock_error)?;
        }
        state.consumers.push(ActiveConsumer {
            queue: queue.clone(),
            tag: tag.clone(),
            sender,
        });
        Ok(receiver.boxed())
    }

    async fn cancel(&self, tag: &ConsumerTag) -> MessageChannelResult<()> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(MessageChannelError::Closed);
        }
        let index = state
            .consumers
            .iter()
            .position(|consumer| &consumer.tag == tag)
            .ok_or_else(|| MessageChannelError::UnknownConsumer(tag.clone()))?;
        let consumer = state.consumers.remove(index);
        state.cancelled.push(tag.clone());
        if state.hold_on_cancel {
            state.held.push(consumer);
        }
        Ok(())
    }

    async fn close(&self) -> MessageChannelResult<()> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(MessageChannelError::Closed);
        }
        state.closed = true;
        state.consumers.clear();
        state.held.clear();
        Ok(())
    }
}

#[derive(Debug)]
struct InMemoryAcker {
    state: Arc<Mutex<BrokerState>>,
    delivery_tag: u64,
}

#[async_trait]
impl DeliveryAcker for InMemoryAcker {
    async fn ack(&self) -> MessageChannelResult<()> {
        let mut state = self.state.lock().map_err(lock_error)?;
        if state.closed {
            return Err(MessageChannelError::Closed);
        }
        if state.failing_acks.remove(&self.delivery_tag) {
            return Err(MessageChannelError::broker(std::io::Error::other(
                "injected ack failure",
            )));
        }
        state.acknowledged.push(self.delivery_tag);
        Ok(())
    }
}

/// Handler that records every notification it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingHandler {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the notifications received so far, in delivery order.
    ///
    /// # Errors
    ///
    /// Returns a broker error when lock acquisition fails.
    pub fn received(&self) -> MessageChannelResult<Vec<Notification>> {
        Ok(self.received.lock().map_err(lock_error)?.clone())
    }
}

#[async_trait]
impl NotificationHandler for RecordingHandler {
    async fn handle(&self, notification: Notification, _context: DeliveryContext<'_>) {
        if let Ok(mut received) = self.received.lock() {
            received.push(notification);
        }
    }
}
