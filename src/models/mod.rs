//! Typed shapes of the site's documents.
//!
//! Documents are stored loosely as JSON; these types describe the fields the
//! public pages and the dashboard rely on. Unknown fields survive a round trip
//! through each struct's flattened `extra` map.

mod admission;
mod calendar;
mod envelope;
mod fees;
mod homepage;
mod lenient;
mod person;
mod program;

pub use admission::*;
pub use calendar::*;
pub use envelope::*;
pub use fees::*;
pub use homepage::*;
pub use person::*;
pub use program::*;
