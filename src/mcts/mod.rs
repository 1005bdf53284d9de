pub mod adapter;
pub mod backpropagation;
pub mod decision;
pub mod expansion;
pub mod hyperparameters;
pub mod move_space;
pub mod node;
pub mod pruning;
pub mod selection;
pub mod session;
pub mod simulation;
pub mod timings;
pub mod tree;
