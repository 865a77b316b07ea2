//! Provider and model management for relay.
//!
//! This crate provides:
//! - A provider store mirroring the remote provider list
//! - Per-provider enabled-model associations
//! - Logo resolution with registry icons and favicon fallback
//! - A session controller for provider edit screens
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  ProviderSession                     │
//! │        (form, notices, navigation, confirm)          │
//! └─────────────────────────────────────────────────────┘
//!              │                          │
//!              ▼                          ▼
//! ┌────────────────────────┐  ┌────────────────────────┐
//! │     ProviderStore      │  │ ModelAssociationManager│
//! │  (cached provider list)│  │ (enabled models cache) │
//! └────────────────────────┘  └────────────────────────┘
//!              │                          │
//!              └────────────┬─────────────┘
//!                           ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                   RemoteGateway                      │
//! │         (HttpGateway / InMemoryGateway)              │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The identity resolver sits beside this stack and only reads provider
//! fields.

mod error;
mod types;

pub mod associations;
pub mod gateway;
pub mod identity;
pub mod session;
pub mod store;

pub use associations::ModelAssociationManager;
pub use error::{Error, Result};
pub use store::ProviderStore;
pub use types::{
    ApiKey, AssociationId, ModelAssociation, Provider, ProviderDraft, ProviderId, ProviderKind,
    RemoteModel,
};
