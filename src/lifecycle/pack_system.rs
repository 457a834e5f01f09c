use crate::clients::PackClient;
use crate::config::AppConfig;
use crate::pack_actor::{self, PackContext};
use crate::service::{HttpOrderService, OrderService, ServiceError, Session};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Owns the running pack actor.
///
/// The order service and the session are injected into the actor when it
/// starts, so the same wiring serves the HTTP backend and the test mock.
///
/// # Example
///
/// ```ignore
/// let system = PackSystem::from_config(&config)?;
///
/// system.pack_client.open(order_id).await?;
/// let countdown = system.pack_client.begin_completion_countdown(order_id).await?;
///
/// system.shutdown().await?;
/// ```
pub struct PackSystem {
    /// Client for interacting with the pack actor
    pub pack_client: PackClient,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl PackSystem {
    /// Spawns the pack actor against `service`.
    pub fn new(service: Arc<dyn OrderService>, session: Session, buffer: usize, countdown: Duration) -> Self {
        let (actor, client) = pack_actor::new(buffer);
        let handle = tokio::spawn(actor.run(PackContext::new(service, session)));

        Self {
            pack_client: PackClient::new(client, countdown),
            handles: vec![handle],
        }
    }

    /// Spawns the pack actor against the REST order service named in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let service = HttpOrderService::new(&config.api_base_url, config.request_timeout())?;
        info!(base_url = service.base_url(), "Using order service");
        Ok(Self::new(
            Arc::new(service),
            config.session(),
            config.actor_buffer,
            config.countdown(),
        ))
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the client closes the channel once every clone is gone,
    /// including the ones held by running countdowns, so drop or finish
    /// countdowns first. Returns an error if an actor task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.pack_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
