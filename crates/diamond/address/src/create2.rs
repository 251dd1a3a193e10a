//! CREATE2 address prediction (EIP-1014)
//!
//! `keccak256(0xff ++ deployer ++ salt ++ keccak256(init_code))[12..]`

use diamond_types::{keccak256, Address, B256, MAX_INIT_CODE_SIZE};

use crate::error::{AddressError, Result};

/// Predict from a precomputed init code hash.
pub fn predict_address(deployer: Address, salt: B256, init_code_hash: B256) -> Address {
    // always 85 bytes: 0xff + 20 + 32 + 32
    let mut preimage = [0xff; 85];
    preimage[1..21].copy_from_slice(deployer.as_slice());
    preimage[21..53].copy_from_slice(salt.as_slice());
    preimage[53..].copy_from_slice(init_code_hash.as_slice());

    let hash = keccak256(preimage);
    Address::from_slice(&hash[12..])
}

/// Hash init code, rejecting code above the creation size ceiling before hashing.
pub fn init_code_hash(init_code: &[u8]) -> Result<B256> {
    if init_code.len() > MAX_INIT_CODE_SIZE {
        return Err(AddressError::InitCodeTooLarge {
            size: init_code.len(),
            limit: MAX_INIT_CODE_SIZE,
        });
    }
    Ok(keccak256(init_code))
}

/// Predict from raw init code; agrees with [`predict_address`] bit for bit.
pub fn predict_address_from_code(deployer: Address, salt: B256, init_code: &[u8]) -> Result<Address> {
    Ok(predict_address(deployer, salt, init_code_hash(init_code)?))
}
