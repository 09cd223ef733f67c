//! Multi-floor buildings: layout generation and player interaction

pub mod building;
pub mod interaction;
pub mod layout;

pub use building::{Building, Floor, Room};
pub use interaction::{Interaction, InteractionContext};
