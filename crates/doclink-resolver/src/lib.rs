//! Active resolution layer built on `doclink-core`'s path hierarchy:
//! descent, walk-up, look-ahead disambiguation (§4.4), the minimal-
//! disambiguation engine (§4.5), the `Reference` intern pool and
//! per-parent resolution cache (§5), and the `LinkResolver` facade that
//! exposes §6's external interface.

pub mod cache;
pub mod disambiguation;
pub mod error;
pub mod facade;
pub mod reference;
pub mod resolver;

pub use cache::ResolutionCache;
pub use disambiguation::{minimal_disambiguator, select, MinimalSuffix};
pub use error::{near_misses, Candidate, ErrorPayload, ResolutionError, Replacement, Solution};
pub use facade::{AnchorSectionInput, BundleInfo, LinkResolver};
pub use reference::{Reference, ReferencePool};
pub use resolver::Resolver;
