//! Grammar engine for extracting table dependencies from tokenized HiveQL

pub mod grammar;
pub mod graph;
pub mod grouping;
pub mod traverse;

#[cfg(test)]
mod tests;
