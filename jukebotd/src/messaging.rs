use async_trait::async_trait;
use eyre::Result;

/// Outbound side of the chat gateway. The real gateway lives behind this
/// port; the default implementation just writes to the terminal.
#[async_trait]
pub(crate) trait MessagingPort: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

pub(crate) struct StdoutPort;

#[async_trait]
impl MessagingPort for StdoutPort {
    async fn send(&self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }
}
