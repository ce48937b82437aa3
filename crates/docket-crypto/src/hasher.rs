/// Domain-separated BLAKE3 credential hasher.
///
/// The hash input is `domain ":" password username`. The username acts as
/// a per-user salt, so two users sharing a password get different digests.
/// Output is the lowercase hex encoding of the 32-byte digest.
pub struct CredentialHasher {
    domain: &'static str,
}

impl CredentialHasher {
    /// Hasher for user passwords.
    pub const PASSWORD: Self = Self {
        domain: "docket-password-v1",
    };

    fn digest(&self, username: &str, password: &str) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(password.as_bytes());
        hasher.update(username.as_bytes());
        hasher.finalize()
    }

    /// Hash a credential pair into its stored hex form.
    pub fn hash(&self, username: &str, password: &str) -> String {
        hex::encode(self.digest(username, password).as_bytes())
    }

    /// Check a credential pair against a stored hex digest.
    ///
    /// Malformed stored digests never verify. Comparison is constant-time.
    pub fn verify(&self, username: &str, password: &str, stored: &str) -> bool {
        match blake3::Hash::from_hex(stored) {
            Ok(expected) => self.digest(username, password) == expected,
            Err(_) => false,
        }
    }
}
