mod rest_api;
mod services;
mod snapshot;

pub use self::{rest_api::*, services::*};
