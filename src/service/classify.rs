/// Text printed on stdout by dig when an AXFR does not produce a zone. A
/// failed transfer and a zone dump share the same channel, so the payload is
/// all there is to go on. Matching is exact and case-sensitive.
pub const FAILURE_SIGNATURES: [&str; 6] = [
    "Transfer failed.",
    "failed: connection refused.",
    "communications error",
    "failed: network unreachable.",
    "failed: host unreachable.",
    "connection timed out; no servers could be reached",
];

pub fn is_successful_transfer(response: &str) -> bool {
    !response.is_empty()
        && !FAILURE_SIGNATURES
            .iter()
            .any(|signature| response.contains(signature))
}
