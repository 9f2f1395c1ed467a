//! Wave-based arcade shooter core: formations, wave scheduling, the
//! Timed/Survival run state machine and local score persistence.  The
//! terminal front-end lives in the binary.

pub mod compute;
pub mod config;
pub mod enemy;
pub mod entities;
pub mod error;
pub mod formation;
pub mod persistence;
pub mod run;
pub mod scheduler;
pub mod session;
pub mod spawner;
pub mod store;
