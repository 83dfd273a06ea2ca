// Saved plugin selections
pub mod profile;

pub use profile::{profile_path, Profile, ProfileError};
