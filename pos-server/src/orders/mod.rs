//! Order Commit Engine
//!
//! - **payload**: loosely typed cart → normalized [`OrderDraft`]
//! - **money**: decimal totals and tolerances
//! - **engine**: transactional create / update / delete and read models
//!
//! ```text
//! JSON body → payload::normalize → OrderDraft → OrderCommitEngine → SQLite (1 tx)
//! ```

pub mod engine;
pub mod error;
pub mod money;
pub mod payload;

pub use engine::{CreateOutcome, OrderCommitEngine};
pub use error::{OrderError, OrderResult};
pub use payload::{CartLine, ItemPayload, OrderDraft, OrderPayload};
