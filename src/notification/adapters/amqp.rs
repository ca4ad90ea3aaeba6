//! AMQP 0-9-1 channel adapter backed by `lapin`.

use crate::notification::{
    domain::{ConsumerTag, QueueName},
    ports::{
        DeliveryAcker, DeliveryStream, InboundDelivery, MessageChannel, MessageChannelError,
        MessageChannelResult, OutboundMessage,
    },
};
use async_trait::async_trait;
use futures::StreamExt;
use lapin::{
    BasicProperties, Channel, Connection,
    acker::Acker,
    message::Delivery,
    options::{
        BasicAckOptions, BasicCancelOptions, BasicConsumeOptions, BasicPublishOptions,
        QueueDeclareOptions,
    },
    types::FieldTable,
};

/// AMQP reply code for a normal close.
pub const REPLY_SUCCESS: u16 = 200;

/// Delivery mode 1: the broker keeps the message in memory only.
const DELIVERY_MODE_TRANSIENT: u8 = 1;

/// Delivery mode 2: the broker persists the message.
const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// Broker channel over an AMQP connection.
#[derive(Debug, Clone)]
pub struct AmqpChannel {
    channel: Channel,
}

impl AmqpChannel {
    /// Wraps an open `lapin` channel.
    #[must_use]
    pub const fn new(channel: Channel) -> Self {
        Self { channel }
    }

    /// Opens a new channel on `connection`.
    ///
    /// # Errors
    ///
    /// Returns [`MessageChannelError::Broker`] when the broker refuses the
    /// channel.
    pub async fn open(connection: &Connection) -> MessageChannelResult<Self> {
        let channel = connection
            .create_channel()
            .await
            .map_err(MessageChannelError::broker)?;
        Ok(Self::new(channel))
    }
}

#[async_trait]
impl MessageChannel for AmqpChannel {
    async fn declare_queue(&self, queue: &QueueName) -> MessageChannelResult<()> {
        let options = QueueDeclareOptions {
            durable: true,
            exclusive: false,
            auto_delete: false,
            ..QueueDeclareOptions::default()
        };
        self.channel
            .queue_declare(queue.as_str(), options, FieldTable::default())
            .await
            .map_err(MessageChannelError::broker)?;
        Ok(())
    }

    async fn publish(
        &self,
        queue: &QueueName,
        message: &OutboundMessage,
    ) -> MessageChannelResult<()> {
        let delivery_mode = if message.persistent {
            DELIVERY_MODE_PERSISTENT
        } else {
            DELIVERY_MODE_TRANSIENT
        };
        let properties = BasicProperties::default()
            .with_content_type(message.content_type.clone().into())
            .with_delivery_mode(delivery_mode);
        self.channel
            .basic_publish(
                "",
                queue.as_str(),
                BasicPublishOptions::default(),
                &message.body,
                properties,
            )
            .await
            .map_err(MessageChannelError::broker)?;
        Ok(())
    }

    async fn consume(
        &self,
        queue: &QueueName,
        tag: &ConsumerTag,
    ) -> MessageChannelResult<DeliveryStream> {
        let consumer = self
            .channel
            .basic_consume(
                queue.as_str(),
                tag.as_str(),
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(MessageChannelError::broker)?;
        Ok(consumer
            .map(|delivery| delivery.map(into_inbound).map_err(MessageChannelError::broker))
            .boxed())
    }

    async fn cancel(&self, tag: &ConsumerTag) -> MessageChannelResult<()> {
        self.channel
            .basic_cancel(tag.as_str(), BasicCancelOptions::default())
            .await
            .map_err(MessageChannelError::broker)
    }

    async fn close(&self) -> MessageChannelResult<()> {
        self.channel
            .close(REPLY_SUCCESS, "OK")
            .await
            .map_err(MessageChannelError::broker)
    }
}

fn into_inbound(delivery: Delivery) -> InboundDelivery {
    let content_type = delivery
        .properties
        .content_type()
        .as_ref()
        .map(|value| value.as_str().to_owned());
    let Delivery {
        delivery_tag,
        data,
        acker,
        ..
    } = delivery;
    InboundDelivery::new(delivery_tag, content_type, data, Box::new(AmqpAcker(acker)))
}

struct AmqpAcker(Acker);

#[async_trait]
impl DeliveryAcker for AmqpAcker {
    async fn ack(&self) -> MessageChannelResult<()> {
        self.0
            .ack(BasicAckOptions::default())
            .await
            .map_err(MessageChannelError::broker)
    }
}
