//! Data layer: raw record, loading, and the channel/parameter views.
//!
//! Architecture:
//! ```text
//!  converted record (.json)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse → RawRecord (structs, 1-D / 2-D arrays, text)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐   ┌──────────┐
//!   │   axis   │   │parameter │  GeneralMeta (meta) + values per entry
//!   └──────────┘   └──────────┘
//!        │              ▲
//!        │         ┌──────────┐
//!        │         │  engine  │  engine fields, DATE / TIMESTAMP injection
//!        │         └──────────┘
//!        ▼
//!   correction (CA channels, in place)
//! ```

pub mod axis;
pub mod engine;
pub mod loader;
pub mod meta;
pub mod model;
pub mod parameter;
pub mod raw;
