//! Client side of the contest platform: HTTP wrapper, typed API calls,
//! the persisted session and debounced search.

pub mod api;
pub mod http;
pub mod search;
pub mod session;

pub use api::{ApiClient, ContestQuery, LeaderboardQuery};
pub use http::{ApiError, ApiResponse, HttpClient, RequestOptions, NETWORK_ERROR};
pub use search::Debouncer;
pub use session::{SessionError, SessionState, SessionStore};
