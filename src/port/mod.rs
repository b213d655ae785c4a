//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!     ┌──────────────┐      ┌─────────────────────┐      ┌──────────────┐
//!     │  CLI adapter │ ───▶ │ Application + Domain │ ───▶ │ Store adapter│
//!     └──────────────┘      └─────────────────────┘      └──────────────┘
//! ```

pub mod outbound;

pub use outbound::store::WagerStore;
