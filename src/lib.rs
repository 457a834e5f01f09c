//! # Pack Status
//!
//! > **Packing status for distribution orders, with a cancellable completion countdown.**
//!
//! An order is a set of packages (bundles of items) plus loose additional
//! items. Packers tick items off; the crate derives whether the order is
//! `Pending`, `Opened` or ready to be `Completed`, saves progress to the
//! order service, and completes the order after a countdown the packer can
//! still cancel.
//!
//! ## 🏗️ Architecture Notes
//!
//! ### 1. One actor owns the orders
//! Every open order lives inside a single [`ResourceActor`](framework::ResourceActor).
//! Requests are processed one at a time, so a save, a toggle and a countdown
//! commit on the same order can never interleave.
//!
//! ### 2. Context injection
//! The actor gets its [`OrderService`](service::OrderService) and
//! [`Session`](service::Session) through `run()`. Tests inject a
//! [`MockOrderService`](service::MockOrderService); the binary injects the
//! REST client.
//!
//! ### 3. Stored vs derived status
//! [`derive_status`](model::derive_status) is a pure function of the packed
//! flags. The status stored on an order is that value capped at `Opened`;
//! only a committed completion stores `Completed`, and it never goes back.
//!
//! ### 4. Type-safe errors
//! [`PackError`](pack_actor::PackError) travels through the actor boxed and
//! comes back out of [`PackClient`](clients::PackClient) with its variant intact.
//!
//! ## 🗺️ Module Tour
//!
//! - [`framework`] - generic resource actor, client and test mocks
//! - [`model`] - orders, packages, items, status derivation and wire formats
//! - [`pack_actor`] - the packing state machine
//! - [`clients`] - [`PackClient`](clients::PackClient) and
//!   [`CompletionCountdown`](clients::CompletionCountdown)
//! - [`service`] - the order service seam and its HTTP implementation
//! - [`lifecycle`] - [`PackSystem`](lifecycle::PackSystem) and tracing setup
//! - [`config`] - TOML and environment configuration
//! - [`qr`] - order references from scanned QR payloads
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! PACK_API_URL=https://orders.example.com/api PACK_TOKEN=... pack-status show 1042
//! pack-status pack 1042 41 42 a:9
//! pack-status complete 1042
//! ```

pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod pack_actor;
pub mod qr;
pub mod service;
