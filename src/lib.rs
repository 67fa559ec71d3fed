pub mod ntp;
pub mod timestamp;
pub mod roundtrip;
pub mod traits;
pub mod net;
pub mod session;
pub mod error;
pub mod config;
pub mod report;

pub use error::{ErrorKind, QueryError};
pub use net::{NoReverseDns, SystemReverseDns, UdpTransport};
pub use session::{QueryResult, Session};
