pub mod pipeline;
pub mod presentation;
pub mod task;

pub use pipeline::{tick, CycleStats, PipelineState, TickError, TickReport};
pub use presentation::{DisplayFrame, LogPresenter, PresentationSink};
pub use task::PeriodicTask;
