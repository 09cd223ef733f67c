//! Moving entities: shared body physics, the player, projectiles, pickups

pub mod body;
pub mod pickup;
pub mod player;
pub mod projectile;

pub use body::Body;
pub use pickup::{Pickup, PickupKind};
pub use player::{Player, PlayerInput, PlayerIntent};
pub use projectile::{Projectile, ProjectileOwner, ProjectileStep};
