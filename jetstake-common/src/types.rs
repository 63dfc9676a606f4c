//jetstake-common/src/types.rs
//! Common type definitions and constants used throughout jetstake

/// Actor identity - 32-byte derived address
///
/// Identifies any participant on the ledger: users, stake accounts, the stake
/// router and jetton wallets. Opaque and immutable once assigned; used as a
/// map key throughout.
pub type Identity = [u8; 32];

/// Native coin amount in nanotons
pub type Coins = u128;

/// Correlation id echoed through a message chain
pub type QueryId = u64;

/// 32-bit wire operation code
pub type OpCode = u32;

/// One whole native coin expressed in nanotons
pub const ONE_TON: Coins = 1_000_000_000;

/// Runtime constants
pub mod runtime {
    /// Default flat processing fee charged per handled message (0.01 ton)
    pub const DEFAULT_PROCESSING_FEE: super::Coins = 10_000_000;

    /// Default actor mailbox capacity
    pub const DEFAULT_MAILBOX_CAPACITY: usize = 1024;

    /// Native endowment given to a freshly spawned treasury (one million ton)
    pub const TREASURY_ENDOWMENT: super::Coins = 1_000_000 * super::ONE_TON;
}

/// Short hex rendering of an identity for log output
pub fn short_hex(id: &Identity) -> String {
    hex::encode(&id[..4])
}

/// Render a nanoton amount as a decimal ton string, trimming trailing zeros
pub fn fmt_tons(amount: Coins) -> String {
    let whole = amount / ONE_TON;
    let frac = amount % ONE_TON;
    if frac == 0 {
        return format!("{whole}");
    }
    let frac = format!("{frac:09}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Utility extension for identity values
pub trait IdentityExt {
    /// The all-zero identity, used as an explicit "nobody" marker
    fn zero() -> Self;
    /// Check whether every byte is zero
    fn is_zero(&self) -> bool;
}

impl IdentityExt for Identity {
    fn zero() -> Self {
        [0u8; 32]
    }

    fn is_zero(&self) -> bool {
        self.iter().all(|&b| b == 0)
    }
}
