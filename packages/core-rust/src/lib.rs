//! errand core: request outcomes, normalized error taxonomy, and failure
//! classification. No async runtime; the orchestration lives in `errand-client`.

pub mod classify;
pub mod error;
pub mod ext;
pub mod outcome;

pub use classify::{classify, classify_panic};
pub use error::{
    BusinessError, Cancelled, ErrorInfo, ErrorKind, TransportError, UNKNOWN_ERROR_MESSAGE,
};
pub use ext::LogOnError;
pub use outcome::Outcome;
