//! Use case implementations.

mod sign_in_use_case;
mod update_avatar_use_case;

pub use sign_in_use_case::SignInUseCase;
pub use update_avatar_use_case::{UpdateAvatarError, UpdateAvatarUseCase};
