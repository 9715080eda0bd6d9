use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::{
    models::{conversation::Conversation, integration::Channel},
    ports::{ChannelSenders, MessageSender},
};
use crate::error::AppError;
use crate::infra::backend::client::BackendClient;

#[derive(Serialize)]
struct SendRequest<'a> {
    company_id: &'a str,
    conversation_id: &'a str,
    recipient_id: &'a str,
    content: &'a str,
}

/// Relays an outbound message through the `send-{channel}-message` function.
pub struct FunctionMessageSender {
    client: Arc<BackendClient>,
    channel: Channel,
}

impl FunctionMessageSender {
    pub fn new(client: Arc<BackendClient>, channel: Channel) -> Self {
        Self { client, channel }
    }

    fn function(&self) -> String {
        format!("send-{}-message", self.channel.as_str())
    }
}

#[async_trait]
impl MessageSender for FunctionMessageSender {
    #[instrument(skip(self, conversation, content), fields(channel = %self.channel, conversation_id = %conversation.id))]
    async fn send(&self, company_id: &str, conversation: &Conversation, content: &str) -> Result<(), AppError> {
        let _: Value = self
            .client
            .invoke(
                &self.function(),
                &SendRequest {
                    company_id,
                    conversation_id: &conversation.id,
                    recipient_id: &conversation.contact_id,
                    content,
                },
            )
            .await?;
        debug!("Relayed message to {}", conversation.contact_id);
        Ok(())
    }
}

pub fn channel_senders(client: &Arc<BackendClient>) -> ChannelSenders {
    ChannelSenders {
        whatsapp: Arc::new(FunctionMessageSender::new(client.clone(), Channel::WhatsApp)),
        instagram: Arc::new(FunctionMessageSender::new(client.clone(), Channel::Instagram)),
        facebook: Arc::new(FunctionMessageSender::new(client.clone(), Channel::Facebook)),
    }
}
