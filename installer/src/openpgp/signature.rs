//! The detached-signature reader.
//!
//! Release tooling has published detached signatures as a binary packet
//! stream, as ASCII armor, and as a bare packet followed by trailing bytes.
//! [`parse_signature`] tries each encoding in turn and keeps the first
//! signature it finds.

use super::OpenPgpError;
use log::debug;
use pgp::composed::{Deserializable, StandaloneSignature};
use pgp::packet::{Packet, PacketParser};

type Strategy = fn(&[u8]) -> Result<StandaloneSignature, String>;

const STRATEGIES: [(&str, Strategy); 3] = [
    ("binary packet stream", from_packet_stream),
    ("ASCII armor", from_armored_stream),
    ("raw packet framing", from_raw_packets),
];

/// Reads a detached signature in any supported encoding.
///
/// The encodings are tried in order: a binary packet stream, the same
/// stream wrapped in ASCII armor, and finally a scan of the raw packets for
/// the first signature packet, stopping at the first framing error. When
/// several signatures are present the first is returned.
///
/// # Errors
///
/// Returns [`OpenPgpError::UnsupportedSignatureFormat`] when no encoding
/// yields a signature.
pub fn parse_signature(bytes: &[u8]) -> Result<StandaloneSignature, OpenPgpError> {
    for (name, attempt) in STRATEGIES {
        match attempt(bytes) {
            Ok(signature) => {
                debug!(target: "wizcli::openpgp", "signature read as {name}");
                return Ok(signature);
            }
            Err(err) => {
                debug!(target: "wizcli::openpgp", "signature is not {name}: {err}");
            }
        }
    }
    Err(OpenPgpError::UnsupportedSignatureFormat)
}

fn from_packet_stream(bytes: &[u8]) -> Result<StandaloneSignature, String> {
    StandaloneSignature::from_bytes(bytes).map_err(|err| err.to_string())
}

fn from_armored_stream(bytes: &[u8]) -> Result<StandaloneSignature, String> {
    StandaloneSignature::from_armor_single(bytes)
        .map(|(signature, _headers)| signature)
        .map_err(|err| err.to_string())
}

fn from_raw_packets(bytes: &[u8]) -> Result<StandaloneSignature, String> {
    for packet in PacketParser::new(bytes) {
        match packet {
            Ok(Packet::Signature(signature)) => return Ok(StandaloneSignature::new(signature)),
            Ok(_) => {}
            Err(err) => return Err(err.to_string()),
        }
    }
    Err("no signature packet".to_owned())
}
