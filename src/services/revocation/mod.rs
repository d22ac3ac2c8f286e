pub mod checker;
pub mod valkey;

pub use checker::{
    FailClosedRevocationChecker, RevocationChecker, RevocationError, StaticRevocationChecker,
};
pub use valkey::ValkeyRevocationChecker;
