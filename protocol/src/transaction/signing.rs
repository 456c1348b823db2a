//! Transaction signing with curve-tagged ECDSA keys.
//!
//! Signing is a separate step from building because the keys may not be
//! available at construction time, and because a parsed transaction can be
//! re-signed once its inputs are resolved. Every input signs the *same*
//! preimage, [`Transaction::serialize`] with `full = false`: a transaction
//! has one canonical preimage, not one per input.

use super::error::TransactionError;
use super::transaction::Transaction;
use crate::crypto::PrivateKey;

impl Transaction {
    /// Signs every input owned by one of `keys`, returning how many inputs
    /// were signed.
    ///
    /// The signing procedure:
    /// 1. Derive each key's public point on the key's own curve.
    /// 2. Attach the key to every resolved input on the same curve whose
    ///    public key matches.
    /// 3. Sign the shared preimage on each input holding a key.
    ///
    /// Keys that match no input are ignored; an input is never signed with a
    /// key that does not own it. Unresolved inputs cannot be matched and stay
    /// unsigned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ecliptic_protocol::crypto::{AddressFormat, Curve, PrivateKey};
    /// use ecliptic_protocol::transaction::{
    ///     Amount, ResolvedOutput, Transaction, TransactionInput, TransactionOutput, TxHash,
    /// };
    ///
    /// let key = PrivateKey::generate(Curve::Secp256k1);
    /// let input = TransactionInput::new(TxHash::from_bytes([1; 32]), 0, Curve::Secp256k1)
    ///     .with_resolution(ResolvedOutput {
    ///         amount: Amount::from_units(10),
    ///         public_key: key.public_point().unwrap(),
    ///     });
    /// let to = key.address(AddressFormat::Compressed).unwrap();
    /// let output = TransactionOutput::new(&to, Amount::from_units(10), Curve::Secp256k1).unwrap();
    ///
    /// let mut tx = Transaction::new(vec![input], vec![output], None).unwrap();
    /// assert_eq!(tx.sign(&[key]).unwrap(), 1);
    /// assert!(tx.verify(true));
    /// ```
    pub fn sign(&mut self, keys: &[PrivateKey]) -> Result<usize, TransactionError> {
        for key in keys {
            let point = key.public_point()?;
            for input in self.inputs.iter_mut() {
                if input.curve() == key.curve() && input.public_key() == Some(&point) {
                    input.attach_private_key(key.clone());
                }
            }
        }

        let preimage = self.serialize(false);
        let mut signed = 0;
        for input in self.inputs.iter_mut().filter(|i| i.has_private_key()) {
            input.sign(&preimage)?;
            signed += 1;
        }

        if signed > 0 {
            // Fresh signatures replace anything read from the wire.
            self.pending_signatures.clear();
            self.invalidate_cache();
        }
        tracing::debug!(signed, inputs = self.inputs.len(), "signed transaction inputs");
        Ok(signed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
