//! Type and satisfaction model for Miniscript-style script fragments.
//!
//! - [`types`]: the property system classifying fragments (`Type`).
//! - [`node`]: fragments coupling a script template with witness builders.
//! - [`witness`]: witness builders and their resolution against secret material.
//! - [`lift`]: rewriting of disjunctive alternatives into one threshold.
//!
//! ```rust
//! use hyscript::{key::CompressedPublicKey, node::Node};
//!
//! let key = CompressedPublicKey::from_hex(
//!     "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
//! )
//! .unwrap();
//! let node = Node::pk(&key).unwrap();
//! assert_eq!(node.ty().canonical_text(), "Konduesm");
//! assert_eq!(node.satisfaction().len(), 1);
//! ```

pub mod error;
pub mod key;
pub mod lift;
pub mod node;
pub mod script;
pub mod types;
pub mod witness;

pub use error::{Error, ScriptResult};
pub use node::{FragmentArgs, FragmentKind, Node};
pub use types::Type;
