//! Tagged-union storage over a closed, type-level list of alternatives.
//!
//! A [`Variant`] holds at most one value of the types in its list, in place,
//! with a small bit-packed tag saying which one. What may happen to a value is
//! decided by the type's [`Capabilities`]: every construction and assignment
//! goes through one copy-or-move policy that prefers assigning over a live
//! value, then constructing, then default-constructing and assigning.
//!
//! ```rust
//! use allele::{Action, Alts, Capabilities, Variant};
//!
//! #[derive(Capabilities, Clone, Default, Debug, PartialEq)]
//! #[capabilities(clone, default)]
//! struct Rgb(u8, u8, u8);
//!
//! let mut colour = Variant::<Alts![Rgb, String]>::with(Rgb(0, 0, 0));
//! assert_eq!(colour.set_copied(&Rgb(255, 0, 0)), Ok(Action::Assign));
//!
//! // A variant converts into one that has every alternative it has
//! let wider: Variant<Alts![u32, String, Rgb]> = colour.widen().unwrap();
//! assert_eq!(wider.get::<Rgb, _>(), Ok(&Rgb(255, 0, 0)));
//! ```

extern crate self as allele;

mod error;
#[cfg(test)]
mod fixtures;
mod list;
mod policy;
mod tag;
mod variant;
mod widen;

pub use allele_internal::{extent, Capabilities, Unsupported};
pub use allele_macro::Capabilities;
pub use error::VariantError;
pub use list::{
    Alternatives, Cons, DebugAt, EqAt, Here, Locate, Nil, Select, There, P0, P1, P10, P11, P12,
    P13, P14, P15, P2, P3, P4, P5, P6, P7, P8, P9,
};
pub use policy::Action;
pub use tag::Vacancy;
pub use variant::Variant;
pub use widen::Embed;
