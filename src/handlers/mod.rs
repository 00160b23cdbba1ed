// handlers/mod.rs - HTTP handlers grouped by resource
//
// Each handler extracts its inputs, runs one service operation and wraps the
// result in the success envelope. Protected routes additionally see the
// `AuthUser` injected by the identity middleware.

pub mod health;
pub mod invite;
pub mod note;
pub mod task;
pub mod user;
pub mod workspace;

pub use health::health;
