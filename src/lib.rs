//! Narrative Terminal: branching dialogue progression for a narrative RPG
//! terminal scene.
//!
//! Authored scene content is normalized into a typed model, then played
//! back by a state machine that resolves player input against declared
//! choice sets and tracks Dreamweaver thread affinity across the run. A
//! cinematic plan builder flattens the same content into an ordered beat
//! list for hosts that stage a run up front.

pub mod core;
pub mod schema;
