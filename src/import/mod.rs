pub mod calculator;
pub mod error;
pub mod header;
pub mod normalize;
pub mod reconcile;
pub mod rules;
pub mod service;
pub mod template;
pub mod validate;
