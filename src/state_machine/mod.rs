mod engine;
mod record;
mod service;
mod status;

pub use engine::{FORCED_WARNING, StatusTransitionEngine, TransitionValidation};
pub use record::{FulfillmentRecord, StatusLog, TransitionFields};
pub use service::{AppliedTransition, TransitionRequest, TransitionService};
pub use status::{FulfillmentStatus, RequiredField, SlaWindow};
