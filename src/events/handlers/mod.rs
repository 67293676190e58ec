// events/handlers/mod.rs
//
// Event handlers. Registration goes through closures; the bus's
// EventHandler type stays internal.

mod aggregate_handler;

pub use aggregate_handler::register_aggregate_handlers;
