use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

use super::errors::HashError;

/// Algorithm identifier embedded in encoded hashes.
const ALGORITHM_ID: &str = "argon2id";

/// Argon2 version this build derives with (0x13 = 19).
const KDF_VERSION: u32 = 0x13;

/// Salt length in bytes for freshly encoded hashes.
const SALT_LENGTH: usize = 64;

/// Tunable Argon2id cost parameters.
///
/// The defaults are what new hashes are encoded with. Verification always
/// uses the parameters recovered from the stored hash, so defaults can be
/// raised without invalidating existing credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB units.
    pub memory_kib: u32,
    /// Iteration count (time cost).
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
    /// Derived key length in bytes.
    pub output_length: usize,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 2,
            parallelism: 4,
            output_length: 512,
        }
    }
}

/// Password hashing implementation.
///
/// Derives salted Argon2id hashes and serializes them as a single
/// self-describing string:
///
/// ```text
/// $argon2id$v=19$m=65536,t=2,p=4$<base64 salt>$<base64 hash>
/// ```
///
/// with unpadded standard base64. This is the only form a hash is ever
/// persisted in.
pub struct PasswordHasher {
    params: HashParams,
}

impl PasswordHasher {
    /// Create a hasher with the default cost parameters.
    pub fn new() -> Self {
        Self {
            params: HashParams::default(),
        }
    }

    /// Create a hasher with explicit cost parameters.
    pub fn with_params(params: HashParams) -> Self {
        Self { params }
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Encoded hash string carrying algorithm id, version, cost parameters,
    /// salt, and derived key
    ///
    /// # Errors
    /// * `InvalidParams` - Configured cost parameters rejected by the KDF
    /// * `DerivationFailed` - Key derivation failed
    pub fn encode(&self, password: &str) -> Result<String, HashError> {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);

        let key = derive_key(password.as_bytes(), &salt, &self.params)?;

        Ok(format!(
            "${}$v={}$m={},t={},p={}${}${}",
            ALGORITHM_ID,
            KDF_VERSION,
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            STANDARD_NO_PAD.encode(salt),
            STANDARD_NO_PAD.encode(key),
        ))
    }

    /// Verify a password against a stored encoded hash.
    ///
    /// Re-derives the key with the salt and cost parameters recovered from
    /// the stored string, not this hasher's defaults, and compares in
    /// constant time.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `encoded` - Stored hash string
    ///
    /// # Returns
    /// `true` if the password matches, `false` otherwise
    ///
    /// # Errors
    /// * `InvalidFormat` - Wrong field count, unparsable parameters, or
    ///   invalid base64
    /// * `AlgorithmMismatch` - Hash was produced by a different algorithm
    /// * `VersionMismatch` - Hash was produced by a different KDF version
    pub fn verify(&self, password: &str, encoded: &str) -> Result<bool, HashError> {
        let decoded = DecodedHash::parse(encoded)?;
        let candidate = derive_key(password.as_bytes(), &decoded.salt, &decoded.params)?;
        Ok(candidate.ct_eq(&decoded.key).into())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters, salt, and key recovered from an encoded hash string.
struct DecodedHash {
    params: HashParams,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl DecodedHash {
    fn parse(encoded: &str) -> Result<Self, HashError> {
        let fields: Vec<&str> = encoded.split('$').collect();
        // Leading '$' yields an empty first field; six fields total.
        if fields.len() != 6 || !fields[0].is_empty() {
            return Err(HashError::InvalidFormat);
        }

        if fields[1] != ALGORITHM_ID {
            return Err(HashError::AlgorithmMismatch(fields[1].to_string()));
        }

        let version: u32 = fields[2]
            .strip_prefix("v=")
            .and_then(|v| v.parse().ok())
            .ok_or(HashError::InvalidFormat)?;
        if version != KDF_VERSION {
            return Err(HashError::VersionMismatch(version));
        }

        let (memory_kib, iterations, parallelism) = parse_cost_field(fields[3])?;

        let salt = STANDARD_NO_PAD
            .decode(fields[4])
            .map_err(|_| HashError::InvalidFormat)?;
        let key = STANDARD_NO_PAD
            .decode(fields[5])
            .map_err(|_| HashError::InvalidFormat)?;

        Ok(Self {
            params: HashParams {
                memory_kib,
                iterations,
                parallelism,
                output_length: key.len(),
            },
            salt,
            key,
        })
    }
}

/// Parse the `m=<memory>,t=<iterations>,p=<parallelism>` field.
fn parse_cost_field(field: &str) -> Result<(u32, u32, u32), HashError> {
    let mut parts = field.split(',');
    let memory = parse_cost_part(parts.next(), "m=")?;
    let iterations = parse_cost_part(parts.next(), "t=")?;
    let parallelism = parse_cost_part(parts.next(), "p=")?;
    if parts.next().is_some() {
        return Err(HashError::InvalidFormat);
    }
    Ok((memory, iterations, parallelism))
}

fn parse_cost_part(part: Option<&str>, prefix: &str) -> Result<u32, HashError> {
    part.and_then(|p| p.strip_prefix(prefix))
        .and_then(|v| v.parse().ok())
        .ok_or(HashError::InvalidFormat)
}

fn derive_key(password: &[u8], salt: &[u8], params: &HashParams) -> Result<Vec<u8>, HashError> {
    let cost = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(params.output_length),
    )
    .map_err(|e| HashError::InvalidParams(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, cost);

    let mut key = vec![0u8; params.output_length];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| HashError::DerivationFailed(e.to_string()))?;
    Ok(key)
}
