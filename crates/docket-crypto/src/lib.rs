//! Cryptographic primitives for docket.
//!
//! Provides the domain-separated BLAKE3 hasher used to store and verify
//! user credentials. All crypto operations wrap established libraries.

pub mod hasher;

pub use hasher::CredentialHasher;
