use crate::error::TransportError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Открытое соединение с релеем: исходящие и входящие текстовые кадры.
/// Закрытие `incoming` означает, что транспорт закрыт.
/// Drop `outgoing` to close the link from this side.
#[derive(Debug)]
pub struct RelayLink {
    pub outgoing: mpsc::UnboundedSender<String>,
    pub incoming: mpsc::UnboundedReceiver<String>,
}

impl RelayLink {
    pub fn new(
        outgoing: mpsc::UnboundedSender<String>,
        incoming: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        Self { outgoing, incoming }
    }

    pub fn send(&self, text: String) -> Result<(), TransportError> {
        self.outgoing
            .send(text)
            .map_err(|_| TransportError::Unreachable("relay link is closed".to_owned()))
    }
}

/// Устанавливает новое соединение с релеем.
#[async_trait]
pub trait RelayConnector: Send + Sync {
    async fn connect(&self) -> Result<RelayLink, TransportError>;
}
