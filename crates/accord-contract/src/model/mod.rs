//! In-memory contract model.
//!
//! Contracts are assembled through owned-`self` builders and are plain data
//! once built.

mod body;
mod contract;
mod http;
mod messaging;
pub mod patterns;
mod value;

pub use body::{
    Body, BodyMatcher, BodyMatchers, BodyMatchersBuilder, BodyNode, MatchingType, Multipart,
    MultipartBuilder, NamedPart, PathType,
};
pub use contract::{Contract, ContractBuilder, Interaction};
pub use http::{
    Cookie, Header, QueryParameter, Request, RequestBuilder, Response, ResponseBuilder, Url,
    UrlKind,
};
pub use messaging::{Execution, Input, InputBuilder, OutputMessage, OutputMessageBuilder};
pub use value::{DualValue, RegexPattern, Side};
