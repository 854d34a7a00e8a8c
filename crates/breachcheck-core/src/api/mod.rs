//! API implementation submodules.
//!
//! [`BreachApi`] talks to the first-party endpoints. The other submodules
//! contain `impl BreachCheck` blocks; the struct itself lives in `lib.rs`.

mod builder;
mod checks;
mod offline;
mod remote;

pub use builder::BreachCheckBuilder;
pub use remote::BreachApi;
