//! Application service layer for mission solving.
//!
//! Turns validated mission definitions into runtime segments, flies them in
//! order and summarizes the result.

pub mod error;
pub mod run_service;
pub mod runtime_compile;

pub use error::{AppError, AppResult};
pub use run_service::{
    RunSummary, SegmentSummary, load_mission, load_summary, run_mission, run_mission_file,
    save_summary,
};
pub use runtime_compile::{
    build_contributor, build_numerics, build_profile, build_root_finder, build_segment,
    compile_mission,
};
