//! Resource gateways over the hosted data service.
//! - Each gateway validates its input, issues one data-service call and
//!   decodes the result into `models` types.
//! - Data access goes through the traits in `store`, implemented over HTTP in
//!   `supabase` and in memory in `memory`.

pub mod errors;
pub mod query;
pub mod store;
pub mod supabase;
pub mod events;
pub mod invitations;
pub mod dress_codes;
pub mod images;
pub mod seed;
#[cfg(any(test, feature = "test_utils"))]
pub mod memory;

pub use dress_codes::DressCodeService;
pub use errors::ServiceError;
pub use events::EventService;
pub use images::ImageService;
pub use invitations::InvitationService;
