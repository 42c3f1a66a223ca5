//! Genetics module - genome encoding, crossover, mutation and parent selection.

pub mod crossover;
pub mod genome;
pub mod mutation;
pub mod selection;

pub use crossover::{crossover_at, one_point_crossover};
pub use genome::{decode, encode, Genome};
pub use mutation::{random_index_pair, MutationKind};
pub use selection::{select_parents, tournament_select, SelectionStrategy};
