//! Logistic regression training and evaluation on the bundled
//! handwritten-digits corpus.
//!
//! The `digits-classifier` binary is a thin clap front end over
//! these modules; everything it does is reachable from here too.

/// Layer 1: command line parsing and dispatch.
pub mod cli;
/// Layer 2: train and infer workflows.
pub mod application;
/// Layer 3: errors, hyperparameters, stages and traits.
pub mod domain;
/// Layer 4: datasets and the digits corpus.
pub mod data;
/// Layer 5: objective, solvers, model and evaluation.
pub mod ml;
/// Layer 6: config file, model store and metrics CSV.
pub mod infra;
