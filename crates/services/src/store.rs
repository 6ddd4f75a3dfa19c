//! Small typed accessors over the raw state store, shared by the services.

use meridian_api::state::StateAccess;
use meridian_types::codec;
use meridian_types::error::{StateError, TransactionError};
use parity_scale_codec::{Decode, Encode};

pub(crate) fn get_u64(state: &dyn StateAccess, key: &[u8]) -> Result<u64, TransactionError> {
    match state.get(key)? {
        Some(bytes) => {
            let arr: [u8; 8] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| StateError::InvalidValue("expected an 8-byte integer".into()))?;
            Ok(u64::from_le_bytes(arr))
        }
        None => Ok(0),
    }
}

pub(crate) fn put_u64(
    state: &mut dyn StateAccess,
    key: &[u8],
    value: u64,
) -> Result<(), TransactionError> {
    state.insert(key, &value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn get_u128(state: &dyn StateAccess, key: &[u8]) -> Result<u128, TransactionError> {
    match state.get(key)? {
        Some(bytes) => {
            let arr: [u8; 16] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| StateError::InvalidValue("expected a 16-byte integer".into()))?;
            Ok(u128::from_le_bytes(arr))
        }
        None => Ok(0),
    }
}

pub(crate) fn put_u128(
    state: &mut dyn StateAccess,
    key: &[u8],
    value: u128,
) -> Result<(), TransactionError> {
    state.insert(key, &value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn get_record<T: Decode>(
    state: &dyn StateAccess,
    key: &[u8],
) -> Result<Option<T>, TransactionError> {
    state
        .get(key)?
        .map(|bytes| {
            codec::from_bytes_canonical(&bytes).map_err(|e| StateError::Decode(e).into())
        })
        .transpose()
}

pub(crate) fn put_record<T: Encode>(
    state: &mut dyn StateAccess,
    key: &[u8],
    value: &T,
) -> Result<(), TransactionError> {
    state.insert(key, &codec::to_bytes_canonical(value)?)?;
    Ok(())
}
