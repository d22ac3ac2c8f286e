pub mod claims;
pub mod codec;
pub mod data;
pub mod grants;
pub mod keys;
pub mod provider;
pub mod validator;

pub use codec::{TokenCodec, TokenEncodingError};
pub use data::{Grant, TokenData};
pub use grants::{GrantResolver, RoleGrant, RoleGrantResolver};
pub use keys::KeyError;
pub use provider::{JwtTokenDataProvider, RevocationNotWired, TokenDataProvider, TokenError};
pub use validator::{TokenDecodingError, TokenValidator};
