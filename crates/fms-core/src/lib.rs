#![deny(missing_docs)]
#![doc = "Trajectory basis model and collaborator interfaces for the FMS engine."]

pub mod collection;
pub mod errors;
pub mod events;
pub mod history;
pub mod linalg;
pub mod provider;
pub mod rng;
mod trajectory;

pub use collection::{BasisCollection, Slot, SlotStatus};
pub use errors::{ErrorInfo, FmsError};
pub use events::{EventArg, EventKind, EventSink, LogEvent, LogSink, MemorySink, NullSink};
pub use history::CouplingWindow;
pub use linalg::{condition_number, pseudo_inverse, PseudoInverse, DEFAULT_RCOND};
pub use provider::{IntegralProvider, Propagator};
pub use rng::{derive_substream_seed, RngHandle};
pub use trajectory::Trajectory;

/// Complex scalar used for amplitudes and overlaps.
pub type Complex64 = num_complex::Complex<f64>;
