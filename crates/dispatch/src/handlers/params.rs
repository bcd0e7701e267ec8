// Path: crates/dispatch/src/handlers/params.rs
//! Typed access to a task's opaque, SCALE-encoded parameters.

use lvm_types::codec::from_bytes_canonical;
use lvm_types::error::DispatchError;
use lvm_types::Opcode;
use parity_scale_codec::{Decode, Encode};

/// The parameters of one task, viewed through the opcode that will consume them.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    opcode: Opcode,
    raw: &'a [Vec<u8>],
}

impl<'a> Params<'a> {
    pub fn new(opcode: Opcode, raw: &'a [Vec<u8>]) -> Self {
        Self { opcode, raw }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Decodes parameter `index` as a `T`.
    pub fn decode<T: Decode>(&self, index: usize) -> Result<T, DispatchError> {
        let bytes = self
            .raw
            .get(index)
            .ok_or(DispatchError::ParameterCount {
                opcode: self.opcode.name(),
                expected: index + 1,
                got: self.raw.len(),
            })?;
        from_bytes_canonical(bytes).map_err(|reason| DispatchError::BadParameterEncoding {
            opcode: self.opcode.name(),
            index,
            expected: std::any::type_name::<T>(),
            reason,
        })
    }
}

// --- Decoders ---

pub(crate) fn none(_: &Params<'_>) -> Result<(), DispatchError> {
    Ok(())
}

pub(crate) fn one<A: Decode>(p: &Params<'_>) -> Result<A, DispatchError> {
    p.decode(0)
}

pub(crate) fn two<A: Decode, B: Decode>(p: &Params<'_>) -> Result<(A, B), DispatchError> {
    Ok((p.decode(0)?, p.decode(1)?))
}

pub(crate) fn three<A: Decode, B: Decode, C: Decode>(
    p: &Params<'_>,
) -> Result<(A, B, C), DispatchError> {
    Ok((p.decode(0)?, p.decode(1)?, p.decode(2)?))
}

pub(crate) fn four<A: Decode, B: Decode, C: Decode, D: Decode>(
    p: &Params<'_>,
) -> Result<(A, B, C, D), DispatchError> {
    Ok((p.decode(0)?, p.decode(1)?, p.decode(2)?, p.decode(3)?))
}

// --- Encoders ---

pub(crate) fn nothing(_: ()) -> Vec<Vec<u8>> {
    Vec::new()
}

pub(crate) fn single<T: Encode>(value: T) -> Vec<Vec<u8>> {
    vec![value.encode()]
}
