//! # Attestation verifier
//!
//! Interface of the external contract that judges a proof of completion.
//! The bounty contract never inspects attestations itself; it only asks the
//! configured verifier and treats any failure of that call as a rejection.

use soroban_sdk::{contractclient, Address, Bytes, BytesN, Env};

/// Contract interface every attestation verifier must expose.
#[contractclient(name = "AttestationVerifierClient")]
pub trait AttestationVerifier {
    /// Return `true` to accept `payload` as proof for `attestation_reference`.
    fn verify(env: Env, attestation_reference: BytesN<32>, payload: Bytes) -> bool;
}

/// Ask `verifier` about `payload`.
///
/// A `false` answer, a contract error, a recoverable host error or an
/// undecodable return value all count as a rejection. Budget exhaustion is
/// not recoverable and aborts the whole invocation.
pub fn accepts(
    env: &Env,
    verifier: &Address,
    attestation_reference: &BytesN<32>,
    payload: &Bytes,
) -> bool {
    let client = AttestationVerifierClient::new(env, verifier);
    matches!(
        client.try_verify(attestation_reference, payload),
        Ok(Ok(true))
    )
}
