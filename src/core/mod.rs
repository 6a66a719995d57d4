pub mod affinity;
pub mod config;
pub mod content;
pub mod controller;
pub mod host;
pub mod lint;
pub mod normalizer;
pub mod plan;
pub mod resolver;
