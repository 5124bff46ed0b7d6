pub mod acquisition;
pub mod band;
pub mod blend;
pub mod composite;
pub mod consts;
pub mod error;
pub mod harmonize;
pub mod io;
pub mod morphology;
pub mod pipeline;
pub mod quality;
pub mod ranking;
pub mod scene;
