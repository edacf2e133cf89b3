//! Domain models and request payloads for the Todolist API.

pub mod todo;
pub mod user;

pub use todo::{Todo, TodoAddRequest, TodoUpdateRequest};
pub use user::{LoginRequest, PasswordRequest, RegisterRequest, UpdateUserRequest, User};
