//jetstake-common/src/crypto.rs
//! Deterministic identity derivation
//!
//! Routing on the ledger needs no stored directory: the address of a user's
//! stake account is a pure function of (router identity, owner identity), and
//! the address of a jetton wallet is a pure function of (jetton master
//! identity, owner identity). Any actor can re-derive either address locally
//! and the result is stable across the life of the network.

use crate::types::Identity;
use sha2::{Digest, Sha256};

// Domain separation tags so the two derivation families can never collide
const STAKE_ACCOUNT_DOMAIN: &[u8] = b"jetstake/stake-account/v1";
const JETTON_WALLET_DOMAIN: &[u8] = b"jetstake/jetton-wallet/v1";
const SEED_DOMAIN: &[u8] = b"jetstake/seed/v1";

/// Identity derivation utilities
pub struct AddressDerivation;

impl AddressDerivation {
    /// Derive the stake account identity owned by `owner` under `router`
    pub fn stake_account(router: &Identity, owner: &Identity) -> Identity {
        Self::derive(STAKE_ACCOUNT_DOMAIN, router, owner)
    }

    /// Derive the jetton wallet identity owned by `owner` under `master`
    pub fn jetton_wallet(master: &Identity, owner: &Identity) -> Identity {
        Self::derive(JETTON_WALLET_DOMAIN, master, owner)
    }

    /// Derive a top-level identity from a human-readable seed
    ///
    /// Used for treasuries and root actors in tests and the devnet binary.
    pub fn from_seed(seed: &str) -> Identity {
        let mut hasher = Sha256::new();
        hasher.update(SEED_DOMAIN);
        hasher.update(seed.as_bytes());
        hasher.finalize().into()
    }

    fn derive(domain: &[u8], parent: &Identity, owner: &Identity) -> Identity {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        hasher.update(parent);
        hasher.update(owner);
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let router = AddressDerivation::from_seed("router");
        let owner = AddressDerivation::from_seed("alice");

        let a = AddressDerivation::stake_account(&router, &owner);
        let b = AddressDerivation::stake_account(&router, &owner);
        assert_eq!(a, b);
    }

    #[test]
    fn test_derivation_families_do_not_collide() {
        let parent = AddressDerivation::from_seed("parent");
        let owner = AddressDerivation::from_seed("alice");

        let account = AddressDerivation::stake_account(&parent, &owner);
        let wallet = AddressDerivation::jetton_wallet(&parent, &owner);
        assert_ne!(account, wallet);
    }

    #[test]
    fn test_distinct_owners_get_distinct_accounts() {
        let router = AddressDerivation::from_seed("router");
        let alice = AddressDerivation::from_seed("alice");
        let bob = AddressDerivation::from_seed("bob");

        assert_ne!(
            AddressDerivation::stake_account(&router, &alice),
            AddressDerivation::stake_account(&router, &bob)
        );
    }
}
