//! Abstract Coxeter groups.
//!
//! A [`CoxeterMatrix`] lists the bond label of every mirror pair; a
//! [`CoxeterGroup`] enumerates the group it presents. Nothing here knows
//! about geometry; see [`crate::symmetry`] for the realization.

mod group;
mod matrix;

pub use group::{word_letters, CoxeterGroup, Element, IDENTITY_WORD};
pub use matrix::{CoxeterMatrix, Exchange, SpaceType, LETTERS, MAX_RANK};
