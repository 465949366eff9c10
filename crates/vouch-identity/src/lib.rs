//! Vouch Identity: DID generation, DID documents, DID resolution, and the
//! identity directory that answers "who is calling, and in which role".

pub mod did;
pub mod did_resolver;
pub mod directory;
pub mod document;
pub mod error;

pub use did::{generate_keystore, keypair_from_keystore, keystore_from_keypair, keystore_from_private_key};
pub use did_resolver::{
    DidResolver, EthrRegistryClient, LocalDidResolver, NetworkDidResolver, NetworkResolverConfig,
    RegistryClient,
};
pub use directory::{HttpIdentityDirectory, Identity, IdentityLookup, StaticDirectory};
pub use document::{chain_id, DidDocument, VerificationMethod};
pub use error::IdentityError;
