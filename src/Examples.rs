//! examples of usage of RustedRAM
/// approximations of the default interval, convergence and comparison
pub mod ram_examples;
