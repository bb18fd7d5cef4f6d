//! multirange - in-memory multi-criteria range counting
//!
//! Elements are indexed under named indices, each keyed by an ordered list of
//! criteria extracted from the element, and observed at ordered positions.
//! Queries count observations, distinct values, or summed observations
//! within inclusive position ranges.

pub mod cli;
pub mod index;
pub mod observability;
