// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delegation tokens and their binary storage format.
//!
//! Wire format: 4-byte magic `FTKS`, 1-byte version, 4-byte token count
//! (big-endian), then per token four length-prefixed fields: kind, service,
//! identifier, password.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Token kind issued by the resource manager for its own renewal.
pub const RM_DELEGATION_TOKEN: &str = "RM_DELEGATION_TOKEN";

/// Token kind issued by a distributed filesystem namenode.
pub const FS_DELEGATION_TOKEN: &str = "HDFS_DELEGATION_TOKEN";

const MAGIC: &[u8; 4] = b"FTKS";
const FORMAT_VERSION: u8 = 1;

/// Maximum encoded field size (16 MB)
const MAX_FIELD_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("not a token storage buffer")]
    BadMagic,
    #[error("unsupported token storage version {0}")]
    UnsupportedVersion(u8),
    #[error("token storage truncated")]
    Truncated,
    #[error("token field too large: {0} bytes")]
    FieldTooLarge(usize),
    #[error("token {0} is not valid UTF-8")]
    InvalidText(&'static str),
}

/// A single security token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: String,
    /// Service the token is valid for, e.g. an RM or namenode address
    pub service: String,
    pub identifier: Vec<u8>,
    pub password: Vec<u8>,
}

impl Token {
    pub fn new(kind: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            service: service.into(),
            identifier: Vec::new(),
            password: Vec::new(),
        }
    }

    pub fn with_secret(mut self, identifier: &[u8], password: &[u8]) -> Self {
        self.identifier = identifier.to_vec();
        self.password = password.to_vec();
        self
    }
}

/// A set of tokens keyed by (kind, service).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    tokens: BTreeMap<(String, String), Token>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token, replacing any token of the same kind and service.
    pub fn add_token(&mut self, token: Token) {
        self.tokens
            .insert((token.kind.clone(), token.service.clone()), token);
    }

    /// Merge `other` into `self`; entries of `other` win on collision.
    pub fn merge(&mut self, other: Credentials) {
        self.tokens.extend(other.tokens);
    }

    pub fn get(&self, kind: &str, service: &str) -> Option<&Token> {
        self.tokens.get(&(kind.to_string(), service.to_string()))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Keep every token except resource-manager tokens issued for an
    /// endpoint other than `rm_service`.
    pub fn retain_for_resource_manager(self, rm_service: &str) -> Credentials {
        Credentials {
            tokens: self
                .tokens
                .into_iter()
                .filter(|(_, t)| t.kind != RM_DELEGATION_TOKEN || t.service == rm_service)
                .collect(),
        }
    }

    /// Serialize into the binary token storage format.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(&(self.tokens.len() as u32).to_be_bytes());
        for token in self.tokens.values() {
            write_field(&mut buf, token.kind.as_bytes());
            write_field(&mut buf, token.service.as_bytes());
            write_field(&mut buf, &token.identifier);
            write_field(&mut buf, &token.password);
        }
        buf
    }

    /// Parse the binary token storage format.
    pub fn decode(bytes: &[u8]) -> Result<Credentials, CredentialsError> {
        let mut reader = Reader { bytes, pos: 0 };
        if reader.take(MAGIC.len())? != MAGIC {
            return Err(CredentialsError::BadMagic);
        }
        let version = reader.take(1)?[0];
        if version != FORMAT_VERSION {
            return Err(CredentialsError::UnsupportedVersion(version));
        }
        let count = reader.u32()?;
        let mut credentials = Credentials::new();
        for _ in 0..count {
            let kind = String::from_utf8(reader.field()?.to_vec())
                .map_err(|_| CredentialsError::InvalidText("kind"))?;
            let service = String::from_utf8(reader.field()?.to_vec())
                .map_err(|_| CredentialsError::InvalidText("service"))?;
            let identifier = reader.field()?.to_vec();
            let password = reader.field()?.to_vec();
            credentials.add_token(Token {
                kind,
                service,
                identifier,
                password,
            });
        }
        Ok(credentials)
    }
}

impl FromIterator<Token> for Credentials {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut credentials = Credentials::new();
        for token in iter {
            credentials.add_token(token);
        }
        credentials
    }
}

fn write_field(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
    buf.extend_from_slice(data);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CredentialsError> {
        let end = self.pos.checked_add(n).ok_or(CredentialsError::Truncated)?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(CredentialsError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32, CredentialsError> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn field(&mut self) -> Result<&'a [u8], CredentialsError> {
        let len = self.u32()? as usize;
        if len > MAX_FIELD_SIZE {
            return Err(CredentialsError::FieldTooLarge(len));
        }
        self.take(len)
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
