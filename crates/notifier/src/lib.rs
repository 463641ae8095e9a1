//! Push delivery through Firebase Cloud Messaging.
//!
//! The server never talks to FCM directly: it asks the process-wide
//! [`Messaging`] handle for a [`PushSender`], which is built from the service
//! account credentials the first time it is needed and reused afterwards.

pub mod credentials;
pub mod error;
pub mod fcm;
pub mod message;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

pub use credentials::{ServiceAccount, ServiceAccountAuth, TokenSource};
pub use error::PushError;
pub use fcm::FcmClient;
pub use message::PushMessage;

/// Anything that can hand a message to the push provider.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Send one message, returning the provider-assigned message name.
    async fn send(&self, message: &PushMessage) -> Result<String, PushError>;
}

/// Lazily-initialised messaging client shared by all requests.
///
/// Initialisation runs at most once: concurrent first callers wait on the same
/// `OnceCell` instead of racing to build separate clients. A failed
/// initialisation (missing credentials) is not cached; the next caller tries
/// again.
pub struct Messaging {
    account: ServiceAccount,
    sender: OnceCell<Arc<dyn PushSender>>,
}

impl Messaging {
    pub fn new(account: ServiceAccount) -> Self {
        Self {
            account,
            sender: OnceCell::new(),
        }
    }

    /// A handle that is already initialised with the given sender.
    pub fn with_sender(sender: Arc<dyn PushSender>) -> Self {
        Self {
            account: ServiceAccount::default(),
            sender: OnceCell::new_with(Some(sender)),
        }
    }

    /// Get the shared sender, building it on first use.
    pub async fn sender(&self) -> Result<Arc<dyn PushSender>, PushError> {
        let sender = self
            .sender
            .get_or_try_init(|| async {
                let (project_id, client_email, private_key) = self.account.validate()?;
                let auth = ServiceAccountAuth::new(client_email, private_key)?;
                let client = FcmClient::new(project_id, TokenSource::ServiceAccount(auth))?;

                tracing::info!(project_id, "FCM messaging client initialised");
                Ok::<Arc<dyn PushSender>, PushError>(Arc::new(client))
            })
            .await?;

        Ok(Arc::clone(sender))
    }

    pub fn is_initialised(&self) -> bool {
        self.sender.initialized()
    }
}
