//! File-backed fixture backend for restclient.
//!
//! A request for `GET /v5/term/current.json` on service `sws` is answered
//! from `<root>/sws/file/v5/term/current.json`. Each root is searched for,
//! in order:
//!
//! 1. the URL with reserved characters (`? | < > = : * , ; + & " @ $`)
//!    replaced by `_`, then that path plus `/index.html`;
//! 2. the URL as given, then plus `/index.html`;
//! 3. the same four spellings after percent-decoding.
//!
//! URLs with a query string are also matched against the directory listing
//! so that parameters may appear in any order in the filename. More than
//! one match is an [`AmbiguousFixture`](restclient_core::DaoError::AmbiguousFixture)
//! error. A `.http-headers` sidecar next to the body supplies headers and
//! optionally a status.
//!
//! ```no_run
//! use restclient_core::Context;
//! use restclient_fixture::{FixtureBackend, FixtureRoots};
//!
//! # async fn example() -> Result<(), restclient_core::DaoError> {
//! let roots = FixtureRoots::new();
//! roots.register("/srv/app/resources");
//!
//! let backend = FixtureBackend::new("sws", roots, Vec::new());
//! let response = backend
//!     .load_url(&Context::new(), "/student/v5/course/2013,spring,TRAIN,100/A.json")
//!     .await?;
//! println!("{} {}", response.status, response.text());
//! # Ok(())
//! # }
//! ```

mod backend;
pub mod path;
mod roots;
mod sidecar;

pub use backend::{FixtureBackend, NAMESPACE};
pub use roots::FixtureRoots;
