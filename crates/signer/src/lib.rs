//! Client-side request signing for the Chef Infra Server API
//! (`X-Ops-Sign: algorithm=sha1;version=1.0;`).
//!
//! ```no_run
//! use chef_signer::{Identity, Method, RequestDescriptor, RequestSigner};
//!
//! # fn main() -> Result<(), chef_signer::SigningError> {
//! let identity = Identity::from_pem_file("web01", "/etc/chef/client.pem")?;
//! let signer = RequestSigner::new(identity);
//! let descriptor = RequestDescriptor::new(Method::Get, "chef.example.com", "/organizations/acme/nodes/web01");
//! for (name, value) in signer.sign(&descriptor)?.iter() {
//!     println!("{name}: {value}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod identity;
pub mod request;
pub mod signing;
pub mod verify;

pub use error::{SigningError, VerificationError};
pub use identity::Identity;
pub use request::{Method, RequestDescriptor};
pub use signing::{RequestSigner, SignedHeaderSet, sign};
pub use verify::{VerifiedRequest, Verifier};
