mod coordinator;

pub use coordinator::{Membership, RoomCoordinator};
