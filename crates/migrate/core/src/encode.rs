//! Creation-payload encoding: artifact bytecode followed by the ABI-encoded
//! constructor arguments.

use crate::error::DeployError;
use alloy_dyn_abi::{
    DynSolType,
    JsonAbiExt,
};
use alloy_primitives::Bytes;
use migrate_artifacts::ContractArtifact;

/// Build the data field of a contract-creation transaction.
///
/// Argument values arrive in their command-line string form and are coerced
/// to the types the artifact's constructor declares. The argument count must
/// match the constructor exactly; a missing constructor accepts no arguments.
pub fn creation_data(
    artifact: &ContractArtifact,
    constructor_args: &[String],
) -> Result<Bytes, DeployError> {
    let constructor = artifact.abi.constructor();
    let expected = constructor.map_or(0, |constructor| constructor.inputs.len());
    if expected != constructor_args.len() {
        return Err(DeployError::InvalidConstructorArgs {
            contract: artifact.contract_name.clone(),
            expected,
            got: constructor_args.len(),
        });
    }

    let Some(constructor) = constructor else {
        return Ok(artifact.bytecode.clone());
    };
    if constructor.inputs.is_empty() {
        return Ok(artifact.bytecode.clone());
    }

    let mut values = Vec::with_capacity(constructor.inputs.len());
    for (input, raw) in constructor.inputs.iter().zip(constructor_args) {
        let selector = input.selector_type();
        let ty = DynSolType::parse(&selector)?;
        let value = ty
            .coerce_str(raw)
            .map_err(|source| DeployError::BadConstructorArg {
                value: raw.clone(),
                ty: selector.into_owned(),
                reason: source.to_string(),
            })?;
        values.push(value);
    }

    let encoded = constructor.abi_encode_input(&values)?;
    let mut data = artifact.bytecode.to_vec();
    data.extend_from_slice(&encoded);
    Ok(data.into())
}
