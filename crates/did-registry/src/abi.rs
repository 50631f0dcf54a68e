//! # Call Encoding
//!
//! Selector-prefixed call data in the standard contract ABI layout.
//!
//! ## Layout
//!
//! Arguments are encoded as a tuple: one 32-byte head word per argument,
//! followed by the tails of dynamic arguments. A dynamic argument's head word
//! holds the byte offset of its tail, measured from the start of the tuple.
//!
//! | Type | Kind | Encoding |
//! |------|------|----------|
//! | `address` | static | left-padded to 32 bytes |
//! | `uint256` | static | 32-byte big-endian |
//! | `bytes4` | static | right-padded to 32 bytes |
//! | `string` | dynamic | length word + UTF-8 bytes, zero-padded to 32 |
//! | `T[]` | dynamic | length word + elements encoded as a tuple |

use crate::domain::value_objects::{Address, Bytes, Selector, U256};
use crate::errors::AbiError;
use std::fmt;

/// Size of one ABI word.
pub const WORD: usize = 32;

// =============================================================================
// PARAMETER TYPES & TOKENS
// =============================================================================

/// Declared type of a function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// `address`
    Address,
    /// `uint256`
    Uint256,
    /// `bytes4`
    Bytes4,
    /// `string`
    String,
    /// `T[]`
    Array(&'static ParamType),
}

impl ParamType {
    /// Returns true if the value lives in the tail section.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::String | Self::Array(_))
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("address"),
            Self::Uint256 => f.write_str("uint256"),
            Self::Bytes4 => f.write_str("bytes4"),
            Self::String => f.write_str("string"),
            Self::Array(inner) => write!(f, "{inner}[]"),
        }
    }
}

/// A decoded (or to-be-encoded) argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `address`
    Address(Address),
    /// `uint256`
    Uint(U256),
    /// `bytes4`
    Selector(Selector),
    /// `string`
    String(String),
    /// `T[]`
    Array(Vec<Token>),
}

impl Token {
    fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Uint(_) => "uint256",
            Self::Selector(_) => "bytes4",
            Self::String(_) => "string",
            Self::Array(_) => "array",
        }
    }

    fn type_check(&self, param: &ParamType) -> Result<(), AbiError> {
        let ok = match (self, param) {
            (Self::Address(_), ParamType::Address)
            | (Self::Uint(_), ParamType::Uint256)
            | (Self::Selector(_), ParamType::Bytes4)
            | (Self::String(_), ParamType::String) => true,
            (Self::Array(items), ParamType::Array(inner)) => {
                for item in items {
                    item.type_check(inner)?;
                }
                true
            }
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(AbiError::TypeMismatch {
                expected: param.to_string(),
                actual: self.kind().to_string(),
            })
        }
    }

    /// Extracts an address.
    pub fn into_address(self) -> Result<Address, AbiError> {
        match self {
            Self::Address(a) => Ok(a),
            other => Err(mismatch("address", &other)),
        }
    }

    /// Extracts a `uint256`.
    pub fn into_uint(self) -> Result<U256, AbiError> {
        match self {
            Self::Uint(v) => Ok(v),
            other => Err(mismatch("uint256", &other)),
        }
    }

    /// Extracts a string.
    pub fn into_string(self) -> Result<String, AbiError> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }

    /// Extracts a `bytes4`.
    pub fn into_selector(self) -> Result<Selector, AbiError> {
        match self {
            Self::Selector(s) => Ok(s),
            other => Err(mismatch("bytes4", &other)),
        }
    }

    /// Extracts a `bytes4[]`.
    pub fn into_selectors(self) -> Result<Vec<Selector>, AbiError> {
        match self {
            Self::Array(items) => items.into_iter().map(Self::into_selector).collect(),
            other => Err(mismatch("bytes4[]", &other)),
        }
    }

    /// Extracts an `address[]`.
    pub fn into_addresses(self) -> Result<Vec<Address>, AbiError> {
        match self {
            Self::Array(items) => items.into_iter().map(Self::into_address).collect(),
            other => Err(mismatch("address[]", &other)),
        }
    }

    /// Wraps a selector list as a `bytes4[]` token.
    #[must_use]
    pub fn selectors(selectors: &[Selector]) -> Self {
        Self::Array(selectors.iter().copied().map(Self::Selector).collect())
    }
}

fn mismatch(expected: &str, actual: &Token) -> AbiError {
    AbiError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.kind().to_string(),
    }
}

// =============================================================================
// FUNCTION SIGNATURES
// =============================================================================

/// Static description of one callable function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Function {
    /// Function name, e.g. `createDID`.
    pub name: &'static str,
    /// Parameter types in declaration order.
    pub inputs: &'static [ParamType],
    /// Return types.
    pub outputs: &'static [ParamType],
}

impl Function {
    /// Canonical signature, e.g. `createDID(address,uint256,string)`.
    #[must_use]
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.inputs.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, params.join(","))
    }

    /// Selector derived from [`Self::signature`].
    #[must_use]
    pub fn selector(&self) -> Selector {
        Selector::from_signature(&self.signature())
    }

    /// Encodes `selector ++ encode(args)`.
    pub fn encode_call(&self, args: &[Token]) -> Result<Bytes, AbiError> {
        check_arity(self.inputs, args)?;
        let mut out = self.selector().as_bytes().to_vec();
        out.extend_from_slice(&encode(args));
        Ok(Bytes::from(out))
    }

    /// Decodes the argument tuple (call data without the selector).
    pub fn decode_input(&self, args: &[u8]) -> Result<Vec<Token>, AbiError> {
        decode(self.inputs, args)
    }

    /// Encodes a return tuple.
    pub fn encode_output(&self, values: &[Token]) -> Result<Bytes, AbiError> {
        check_arity(self.outputs, values)?;
        Ok(Bytes::from(encode(values)))
    }

    /// Decodes a return tuple.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        decode(self.outputs, data)
    }
}

fn check_arity(params: &[ParamType], tokens: &[Token]) -> Result<(), AbiError> {
    if params.len() != tokens.len() {
        return Err(AbiError::ArityMismatch {
            expected: params.len(),
            actual: tokens.len(),
        });
    }
    for (token, param) in tokens.iter().zip(params) {
        token.type_check(param)?;
    }
    Ok(())
}

/// Splits call data into selector and argument bytes.
pub fn split_call(data: &[u8]) -> Result<(Selector, &[u8]), AbiError> {
    let selector = Selector::from_call_data(data).ok_or(AbiError::MissingSelector(data.len()))?;
    Ok((selector, &data[4..]))
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes tokens as a tuple.
#[must_use]
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::String(_) | Token::Array(_) => {
                head.extend_from_slice(&usize_word(head_len + tail.len()));
                tail.extend_from_slice(&encode_tail(token));
            }
            _ => head.extend_from_slice(&static_word(token)),
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn encode_tail(token: &Token) -> Vec<u8> {
    match token {
        Token::String(s) => {
            let bytes = s.as_bytes();
            let mut out = usize_word(bytes.len()).to_vec();
            out.extend_from_slice(bytes);
            out.resize(WORD + padded_len(bytes.len()), 0);
            out
        }
        Token::Array(items) => {
            let mut out = usize_word(items.len()).to_vec();
            out.extend_from_slice(&encode(items));
            out
        }
        _ => static_word(token).to_vec(),
    }
}

fn static_word(token: &Token) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    match token {
        Token::Address(a) => word[12..].copy_from_slice(a.as_bytes()),
        Token::Uint(v) => v.to_big_endian(&mut word),
        Token::Selector(s) => word[..4].copy_from_slice(s.as_bytes()),
        Token::String(_) | Token::Array(_) => {}
    }
    word
}

fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

const fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a tuple of `params` from `data`.
pub fn decode(params: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    let mut tokens = Vec::with_capacity(params.len());
    for (index, param) in params.iter().enumerate() {
        let head_offset = index * WORD;
        let token = if param.is_dynamic() {
            let tail_offset = read_usize(data, head_offset)?;
            decode_tail(param, data, tail_offset)?
        } else {
            decode_static(param, data, head_offset)?
        };
        tokens.push(token);
    }
    Ok(tokens)
}

fn decode_static(param: &ParamType, data: &[u8], offset: usize) -> Result<Token, AbiError> {
    let word = read_word(data, offset)?;
    match param {
        ParamType::Address => {
            if word[..12].iter().any(|&b| b != 0) {
                return Err(AbiError::InvalidAddress(offset));
            }
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&word[12..]);
            Ok(Token::Address(Address::new(bytes)))
        }
        ParamType::Uint256 => Ok(Token::Uint(U256::from_big_endian(word))),
        ParamType::Bytes4 => {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(&word[..4]);
            Ok(Token::Selector(Selector::new(bytes)))
        }
        ParamType::String | ParamType::Array(_) => decode_tail(param, data, offset),
    }
}

fn decode_tail(param: &ParamType, data: &[u8], offset: usize) -> Result<Token, AbiError> {
    let len = read_usize(data, offset)?;
    let body_start = offset
        .checked_add(WORD)
        .ok_or(AbiError::OffsetOutOfRange(offset))?;
    match param {
        ParamType::String => {
            let bytes = read_slice(data, body_start, len)?;
            let s = String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)?;
            Ok(Token::String(s))
        }
        ParamType::Array(inner) => {
            let body = data.get(body_start..).ok_or(AbiError::UnexpectedEof {
                offset: body_start,
                needed: 0,
            })?;
            // Every element owns at least one head word; reject lengths the
            // buffer cannot possibly hold before allocating.
            if len > body.len() / WORD {
                return Err(AbiError::UnexpectedEof {
                    offset: body_start,
                    needed: len.saturating_mul(WORD),
                });
            }
            let params = vec![**inner; len];
            Ok(Token::Array(decode(&params, body)?))
        }
        _ => decode_static(param, data, offset),
    }
}

fn read_word(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    read_slice(data, offset, WORD)
}

fn read_slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8], AbiError> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(AbiError::UnexpectedEof {
            offset,
            needed: len,
        })
}

fn read_usize(data: &[u8], offset: usize) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(read_word(data, offset)?);
    if value.bits() > 32 {
        return Err(AbiError::OffsetOutOfRange(offset));
    }
    usize::try_from(value.low_u64()).map_err(|_| AbiError::OffsetOutOfRange(offset))
}

// =============================================================================
// TESTS
// =============================================================================
