//! EISA/PnP device identification.
//!
//! Firmware identifies devices through `_HID` and `_CID` objects holding
//! compressed EISA IDs. [`encode_eisa_id`] turns the textual `AAA####` form
//! into that integer so drivers can match against it with
//! [`Interpreter::check_pnp_id`].

use alloc::vec::Vec;

use log::debug;

use crate::eval::Interpreter;
use crate::host::Host;
use crate::namespace::{NamespaceStore, NodeId, Object};
use crate::resolve::resolve_child;
use crate::value::{Value, clean_value};
use crate::walk::Walk;

/// Hardware ID object name.
pub const HID: &str = "_HID";
/// Compatible ID object name.
pub const CID: &str = "_CID";

/// Length of the textual EISA ID form (`AAA####`).
const EISA_ID_LEN: usize = 7;

/// A compressed EISA/PnP device identifier.
///
/// The 3-letter manufacturer code is packed into the upper 16 bits and the
/// product ID into the lower 16, then the whole word is byte-swapped to the
/// order firmware stores in `_HID`/`_CID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EisaId {
    /// The encoded 32-bit value, as found in `_HID`/`_CID`.
    pub raw: u32,
}

impl EisaId {
    /// Encodes a textual `AAA####` identifier.
    #[must_use]
    pub fn encode(text: &str) -> Self {
        Self {
            raw: encode_eisa_id(text),
        }
    }

    /// Decodes the EISA ID into a 7-character ASCII string (e.g., `"PNP0A03"`).
    #[must_use]
    pub fn decode(&self) -> [u8; 7] {
        //   Bits 30-26: first char - 'A' + 1
        //   Bits 25-21: second char - 'A' + 1
        //   Bits 20-16: third char - 'A' + 1
        //   Bits 15-0:  product ID as 4 hex digits
        let packed = self.raw.swap_bytes();
        let letter = |shift: u32| ((packed >> shift) & 0x1F) as u8 + b'@';
        let digit = |shift: u32| {
            let nibble = ((packed >> shift) & 0xF) as u8;
            if nibble < 10 {
                b'0' + nibble
            } else {
                b'A' + nibble - 10
            }
        };

        [
            letter(26),
            letter(21),
            letter(16),
            digit(12),
            digit(8),
            digit(4),
            digit(0),
        ]
    }
}

/// Encodes a textual `AAA####` EISA ID into its 32-bit firmware form.
///
/// Letters are reduced by `0x40` and packed 5 bits each, most significant
/// first, followed by the four hex digits 4 bits each; the result is then
/// byte-swapped. Malformed input yields a deterministic but meaningless
/// value: missing characters count as `'0'` and non-hex digits as zero.
#[must_use]
pub fn encode_eisa_id(text: &str) -> u32 {
    let bytes = text.as_bytes();
    let at = |i: usize| bytes.get(i).copied().unwrap_or(b'0');

    let mut value = 0u32;
    for i in 0..3 {
        value = (value << 5) | u32::from(at(i).wrapping_sub(0x40) & 0x1F);
    }
    for i in 3..EISA_ID_LEN {
        value = (value << 4) | u32::from(hex_value(at(i)));
    }
    value.swap_bytes()
}

/// Converts an ASCII hex digit to its value; anything else is zero.
fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'A'..=b'F' => c - b'A' + 10,
        b'a'..=b'f' => c - b'a' + 10,
        _ => 0,
    }
}

/// Returns `true` if an evaluated `_HID`/`_CID` value identifies `id`.
fn id_matches(value: &Value, id: u32) -> bool {
    match value {
        Value::Integer(v) => *v == u64::from(id),
        Value::String(s) => s.len() == EISA_ID_LEN && encode_eisa_id(s) == id,
        Value::Package(elements) => elements.iter().any(|e| id_matches(e, id)),
        _ => false,
    }
}

impl<S: NamespaceStore, H: Host> Interpreter<'_, S, H> {
    /// Returns `true` if the `_HID` or `_CID` of `device` evaluates to `id`.
    ///
    /// Each evaluated identifier is cleaned whether or not it matched. An
    /// identifier that fails to evaluate counts as a mismatch.
    pub fn check_pnp_id(&mut self, device: NodeId, id: u32) -> bool {
        self.pnp_object_matches(device, HID, id) || self.pnp_object_matches(device, CID, id)
    }

    /// Returns every device in the namespace whose `_HID` or `_CID` is `id`,
    /// in preorder.
    pub fn find_devices(&mut self, id: u32) -> Vec<NodeId> {
        let devices: Vec<NodeId> = Walk::new(self.namespace())
            .filter(|&node| matches!(self.namespace().object(node), Object::Device))
            .collect();
        devices
            .into_iter()
            .filter(|&node| self.check_pnp_id(node, id))
            .collect()
    }

    fn pnp_object_matches(&mut self, device: NodeId, name: &str, id: u32) -> bool {
        let Some(node) = resolve_child(self.namespace(), device, name) else {
            return false;
        };

        match self.eval_node(node) {
            Ok(mut value) => {
                let matched = id_matches(&value, id);
                clean_value(self.host_mut(), &mut value);
                matched
            }
            Err(err) => {
                debug!(
                    "aml: {name} of {} failed to evaluate: {err}",
                    self.namespace().name(device)
                );
                false
            }
        }
    }
}
