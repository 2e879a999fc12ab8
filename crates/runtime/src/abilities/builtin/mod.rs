//! Built-in abilities.
//!
//! Each one exercises a different part of the hook contract: passive
//! nullify and redirect, gated active uses, status application,
//! resurrection from a `Death` hook, chained events and permanent variables.

mod berserk;
mod chain_spark;
mod iron_will;
mod mirror;
mod phoenix;
mod silence;
mod veteran;

use std::sync::Arc;

pub use berserk::Berserk;
pub use chain_spark::ChainSpark;
pub use iron_will::IronWill;
pub use mirror::Mirror;
pub use phoenix::Phoenix;
pub use silence::Silence;
pub use veteran::Veteran;

use super::Ability;

pub mod ids {
    pub const IRON_WILL: &str = "iron_will";
    pub const MIRROR: &str = "mirror";
    pub const BERSERK: &str = "berserk";
    pub const SILENCE: &str = "silence";
    pub const PHOENIX: &str = "phoenix";
    pub const CHAIN_SPARK: &str = "chain_spark";
    pub const VETERAN: &str = "veteran";
}

pub fn all() -> Vec<Arc<dyn Ability>> {
    vec![
        Arc::new(IronWill),
        Arc::new(Mirror),
        Arc::new(Berserk),
        Arc::new(Silence),
        Arc::new(Phoenix),
        Arc::new(ChainSpark),
        Arc::new(Veteran),
    ]
}
