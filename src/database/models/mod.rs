pub mod application;
pub mod link;
pub mod lookup;
pub mod server;
pub mod user;

pub use application::{ApplicationChanges, ApplicationRecord, NewApplication};
pub use link::{LinkChanges, LinkRecord, NewLink};
pub use lookup::{Lookup, LookupRecord};
pub use server::{NewServer, ServerRecord};
pub use user::{Credentials, NewUser, UserChanges, UserRecord};
