// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod aggregate_service;
pub mod content_loader;
pub mod tree_engine;
pub mod tree_service;

#[cfg(test)]
mod aggregate_service_tests;

pub use aggregate_service::AggregateService;

pub use content_loader::ContentLoader;

pub use tree_engine::TreeEngine;

pub use tree_service::{
    AttachMediaRequest,
    CreateNodeRequest,
    MoveNodeRequest,
    SetContentRequest,
    TreeService,
    UpdateNodeRequest,
};
