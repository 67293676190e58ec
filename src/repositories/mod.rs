// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO invariant enforcement
// - NO event emission
// - Every call runs on the connection/transaction it is given
// - Explicit SQL only

mod row;

pub mod media_repository;
pub mod meta_repository;
pub mod node_repository;
pub mod translation_repository;

pub use media_repository::{MediaRepository, SqliteMediaRepository};
pub use meta_repository::{MetaRepository, SqliteMetaRepository};
pub use node_repository::{NodeRepository, SqliteNodeRepository};
pub use translation_repository::{SqliteTranslationRepository, TranslationRepository};
