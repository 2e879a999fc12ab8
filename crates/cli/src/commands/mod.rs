mod abilities;
mod inspect;
mod run;

pub use abilities::Abilities;
pub use inspect::Inspect;
pub use run::Run;
