pub mod handoff;
pub mod participant;
pub mod project;
pub mod quote;
pub mod room;
pub mod selection;
