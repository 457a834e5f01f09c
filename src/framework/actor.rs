//! # Generic Actor Server
//!
//! [`ResourceActor`] owns the working copy of every open entity and processes
//! requests one at a time. Because a single task owns the store, two requests
//! for the same entity can never interleave: a save and a commit issued back to
//! back run strictly in arrival order.

use super::client::ResourceClient;
use super::entity::ActorEntity;
use super::error::FrameworkError;
use super::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of open entities.
///
/// # Usage Pattern
///
/// 1.  **Create**: call [`ResourceActor::new`] to get the actor and its client.
/// 2.  **Wire**: pass dependencies into [`ResourceActor::run`] as the context.
/// 3.  **Run**: spawn the run loop in a background task.
///
/// The loop ends once every client (and every clone of it) has been dropped.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; callers wait when
    /// it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    pub async fn run(mut self, context: T::Context) {
        // Extract just the type name (e.g., "PackOrder" instead of the full path)
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Open { id, respond_to } => {
                    debug!(entity_type, %id, "Open");
                    match T::load(&id, &context).await {
                        Ok(item) => {
                            let reopened = self.store.insert(id.clone(), item.clone()).is_some();
                            info!(entity_type, %id, reopened, size = self.store.len(), "Opened");
                            let _ = respond_to.send(Ok(item));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Open failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    if let Some(item) = self.store.get_mut(&id) {
                        let result = item
                            .handle_action(action, &context)
                            .await
                            .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                        match &result {
                            Ok(_) => info!(entity_type, %id, "Action ok"),
                            Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                        }
                        let _ = respond_to.send(result);
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Close { id, respond_to } => {
                    debug!(entity_type, %id, "Close");
                    let closed = match self.store.remove(&id) {
                        Some(item) => {
                            item.on_close(&context).await;
                            info!(entity_type, %id, size = self.store.len(), "Closed");
                            true
                        }
                        None => false,
                    };
                    let _ = respond_to.send(Ok(closed));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}
