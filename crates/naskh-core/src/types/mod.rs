//! Shared types for naskh

pub mod event;
pub mod operation;

pub use event::{
    CreatedEventData, DeletedEventData, EventGridEvent, RenamedEventData, StorageEventKind,
    SubscriptionValidationData,
};
pub use operation::{MirrorOperation, ObjectKind};
