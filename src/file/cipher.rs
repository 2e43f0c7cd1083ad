//! Header cipher hooks
//!
//! The salt, key and encryption steps of the header protocol. Nothing here
//! encrypts: [`NoCipher`] is the only implementation, and exists so an
//! encrypting variant can be plugged in without touching the protocol.

/// Salt generation, key derivation and block encryption for a block file
pub trait HeaderCipher: Send {
    /// Produce the salt block for a new file. Must return exactly
    /// `magic_block.len()` bytes.
    fn generate_salt(&mut self, magic_block: &[u8]) -> Vec<u8>;

    /// Derive the file key from the salt block
    fn init_key(&mut self, salt: &[u8]);

    /// Whether the maybe-encrypted paths transform data
    fn is_encrypted(&self) -> bool {
        false
    }

    /// Encrypt `data` in place; `offset` is its position in the file
    fn encrypt(&self, _offset: u64, _data: &mut [u8]) {}

    /// Decrypt `data` in place; `offset` is its position in the file
    fn decrypt(&self, _offset: u64, _data: &mut [u8]) {}
}

/// Plain files: the salt is a copy of the magic block and no key is derived
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCipher;

impl HeaderCipher for NoCipher {
    fn generate_salt(&mut self, magic_block: &[u8]) -> Vec<u8> {
        magic_block.to_vec()
    }

    fn init_key(&mut self, _salt: &[u8]) {}
}
