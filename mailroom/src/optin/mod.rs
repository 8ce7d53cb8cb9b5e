//! Double opt-in subscription flow.
//!
//! ```text
//! subscribe() → contact created (unsubscribed = true) → confirmation email
//!   → user clicks link → email.clicked webhook → confirm() → unsubscribed = false
//! ```

pub mod confirm;
pub mod subscribe;

pub use confirm::{confirm, ConfirmError, ConfirmationOutcome};
pub use subscribe::{subscribe, SubscribeError, SubscribeOutcome, SubscribeRequest, SubscribeSettings};
