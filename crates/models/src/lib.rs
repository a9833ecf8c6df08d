//! Record and payload types exchanged with the hosted data service.
//! - JSON field names match the remote tables column for column.
//! - Client payloads are separate types from stored records; ids and
//!   creation timestamps are only ever assigned by the data service.

pub mod errors;
pub mod event;
pub mod invitation;
pub mod dress_code;
pub mod image;
mod serde_helpers;

pub use dress_code::DressCode;
pub use event::{Event, NewEvent};
pub use image::{ImageName, StoredObject};
pub use invitation::{Invitation, InvitationStatus, NewInvitation};
