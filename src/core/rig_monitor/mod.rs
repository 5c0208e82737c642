//! Rig monitoring core.
//!
//! Polls the sensor store at a fixed rate, derives the compensated screwjack
//! position, evaluates the safety limits and presents at most one alert.

pub mod alerts;
pub mod channels;
pub mod presenter;
mod reader;
mod runtime;
pub mod sample;
mod session;
pub mod store;

pub use alerts::{evaluate_alert, AlertConfig, AlertKind};
pub use channels::{Channel, LOGGING_SIGNAL_KEY};
pub use presenter::{AlertPresenter, AlertState, Annunciator, LogAnnunciator, Transition};
pub use reader::{parse_reading, SampleObserver, SampleReader};
pub use runtime::AlarmRuntime;
pub use sample::{compensate_position, is_valid, Sample, Snapshot, NO_DATA};
pub use session::SessionController;
pub use store::{MemoryStore, RedisConnector, RedisStore, StoreClient, StoreConnector};
