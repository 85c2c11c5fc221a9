//! Page-level hydration
//!
//! The server render attaches its client's cache to the page props under
//! [`HYDRATION_PROP_KEY`] ([`attach_cache_state`]); the browser render reads
//! it back and gets a hydrated client through a [`HydrationScope`]
//! ([`use_client_for_page`]).

mod props;
mod scope;

pub use props::{attach_cache_state, PageProps, HYDRATION_PROP_KEY};
pub use scope::{use_client_for_page, HydrationScope};
